// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::routes::RouteTable;

/// Shared gateway state. Everything here is read-only after startup, so
/// concurrent proxy requests proceed without locks.
pub struct GatewayState {
    pub routes: RouteTable,
    pub config: GatewayConfig,
    /// Pooled client for upstream dashboard calls.
    pub http: reqwest::Client,
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, routes: RouteTable, shutdown: CancellationToken) -> Self {
        // In unit tests the process has not gone through `run()`, which installs
        // the rustls crypto provider that `reqwest` (built with
        // `rustls-no-provider`) requires. Install it here under test only;
        // stripped from production builds, where `run()` owns the install.
        #[cfg(test)]
        let _ = rustls::crypto::ring::default_provider().install_default();
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_default();
        Self { routes, config, http, shutdown }
    }
}
