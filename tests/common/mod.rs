#![allow(dead_code)]

use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const ADMIN_PASSWORD: &str = "test-admin-password";

/// A spawned server binary, killed when dropped
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(extra_env: &[(&str, &str)]) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_student-registry"));
        // Empty DATABASE_URL keeps the server on the in-memory store even if a .env sets one
        cmd.env("REGISTRY_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("DATABASE_URL", "")
            .env("ADMIN_PASSWORD", ADMIN_PASSWORD)
            .env("JWT_SECRET", "integration-test-secret")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (key, value) in extra_env {
            cmd.env(key, value);
        }

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
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Reap the child so no server outlives the test binary
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Server with the default (open) dashboard routes
pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn(&[])?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Server that requires an admin token on the dashboard routes
pub async fn start_gated_server() -> Result<TestServer> {
    let server = TestServer::spawn(&[("SECURITY_REQUIRE_ADMIN_TOKEN", "true")])?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Run the `registry` CLI against `server` with its own config directory
pub fn run_cli(server: &TestServer, config_dir: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_registry"))
        .args(args)
        .env("REGISTRY_CLI_CONFIG_DIR", config_dir)
        .env("REGISTRY_SERVER_URL", &server.base_url)
        .env("RUST_LOG", "error")
        .stdin(Stdio::null())
        .output()
        .context("failed to run registry CLI")
}
