#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use kpca_portal_api::auth::{issue_token, Claims};
use reqwest::StatusCode;

/// Secret the spawned server verifies tokens with
pub const SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Empty store credentials keep the server storeless so data routes answer 503
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kpca-portal-api"));
        cmd.args(["serve", "--bind", "127.0.0.1", "--port", &port.to_string()])
            .env("APP_ENV", "development")
            .env("SUPABASE_URL", "")
            .env("SUPABASE_KEY", "")
            .env("SUPABASE_JWT_SECRET", SECRET)
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/api/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Bearer token signed with the server's secret
pub fn token(subject: &str, role: Option<&str>) -> String {
    let claims = Claims::new(subject, role.map(str::to_string), 1);
    issue_token(&claims, SECRET).expect("sign test token")
}
