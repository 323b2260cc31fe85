// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `dashgate` binary as a subprocess, plus stub dashboard
//! origins for it to proxy to.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Once;
use std::time::Duration;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times — only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `dashgate` binary.
pub fn dashgate_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("dashgate")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Spawn a stub dashboard origin that echoes what it receives: the request
/// URI and `Authorization` header come back in a JSON body.
pub async fn spawn_stub_dashboard() -> anyhow::Result<String> {
    use axum::response::IntoResponse;

    async fn echo(req: axum::extract::Request) -> impl IntoResponse {
        let uri = req.uri().to_string();
        let authorization = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        axum::Json(serde_json::json!({ "uri": uri, "authorization": authorization }))
    }

    let app = axum::Router::new().fallback(echo);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// Write a route-table config file mapping slugs to upstream origins.
pub fn write_routes(
    dir: &tempfile::TempDir,
    routes: &[(&str, &str)],
) -> anyhow::Result<PathBuf> {
    let dashboards: Vec<serde_json::Value> = routes
        .iter()
        .map(|(slug, upstream)| {
            serde_json::json!({ "slug": slug, "name": slug, "upstream": upstream })
        })
        .collect();
    let path = dir.path().join("routes.json");
    std::fs::write(&path, serde_json::json!({ "dashboards": dashboards }).to_string())?;
    Ok(path)
}

/// A running `dashgate` process that is killed on drop.
pub struct GatewayProcess {
    child: Child,
    port: u16,
}

impl GatewayProcess {
    /// Spawn dashgate on a free port with the given route config.
    pub fn start(routes_path: &Path) -> anyhow::Result<Self> {
        ensure_crypto();
        let binary = dashgate_binary();
        anyhow::ensure!(binary.exists(), "dashgate binary not found at {}", binary.display());

        let port = free_port()?;
        let child = Command::new(&binary)
            .args([
                "--host",
                "127.0.0.1",
                "--port",
                &port.to_string(),
                "--routes",
                &routes_path.to_string_lossy(),
                "--connect-timeout-ms",
                "1000",
            ])
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll health until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("dashgate did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for GatewayProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
