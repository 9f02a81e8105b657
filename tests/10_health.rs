mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_storeless_server() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/api/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store_configured"], false);
    Ok(())
}

#[tokio::test]
async fn health_needs_no_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .get(format!("{}/api/health", server.base_url))
        .header("Authorization", "Bearer not-a-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
