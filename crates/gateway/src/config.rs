// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the dashgate server.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "dashgate", about = "Tenant-scoped gateway for embedded dashboards")]
pub struct GatewayConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "DASHGATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8040, env = "DASHGATE_PORT")]
    pub port: u16,

    /// Path to the dashboard route table JSON file.
    #[arg(long, env = "DASHGATE_ROUTES")]
    pub routes: Option<std::path::PathBuf>,

    /// Upstream request timeout in milliseconds.
    #[arg(long, default_value_t = 30_000, env = "DASHGATE_UPSTREAM_TIMEOUT_MS")]
    pub upstream_timeout_ms: u64,

    /// Upstream connect timeout in milliseconds.
    #[arg(long, default_value_t = 3_000, env = "DASHGATE_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: u64,

    /// Maximum buffered request body size in bytes.
    #[arg(long, default_value_t = 10 * 1024 * 1024, env = "DASHGATE_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,
}

impl GatewayConfig {
    pub fn upstream_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8040,
            routes: None,
            upstream_timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}
