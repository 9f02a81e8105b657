mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .get(format!("{}/api/clients", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["detail"], "Not authenticated");
    Ok(())
}

#[tokio::test]
async fn token_signed_elsewhere_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let claims = kpca_portal_api::auth::Claims::new("user-1", Some("PARTNER".into()), 1);
    let forged = kpca_portal_api::auth::issue_token(&claims, "some-other-secret")?;

    let res = reqwest::Client::new()
        .get(format!("{}/api/clients", server.base_url))
        .bearer_auth(forged)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn valid_token_without_store_is_unavailable() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .get(format!("{}/api/clients", server.base_url))
        .bearer_auth(common::token("user-1", Some("PARTNER")))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn manager_cannot_create_assignments() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(format!("{}/api/assignments", server.base_url))
        .bearer_auth(common::token("user-2", Some("MANAGER")))
        .json(&json!({
            "assignment_code": "AS-1",
            "client_code": "CL0001",
            "title": "Audit",
            "start_date": "2026-01-01"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<Value>().await?;
    assert_eq!(body["detail"], "Role MANAGER does not have access to this resource");
    Ok(())
}
