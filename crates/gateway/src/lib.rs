// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashgate: tenant-scoped authentication gateway for embedded dashboards.
//!
//! A reverse proxy that injects tenant-scoped bearer credentials into
//! dashboard requests server-side, plus the token-exchange/refresh lifecycle
//! that keeps those credentials fresh for the lifetime of a shell session.
//! Multi-tenant user credentials never reach a dashboard origin.

pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod token;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::proxy::build_router;
use crate::routes::RouteTable;
use crate::state::GatewayState;

/// Run the gateway server until shutdown.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    // reqwest is built with `rustls-no-provider`; install the ring provider
    // once for the whole process.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let routes = match config.routes {
        Some(ref path) => RouteTable::load(path)?,
        None => RouteTable::default(),
    };
    if routes.is_empty() {
        tracing::warn!("no dashboard routes configured; every proxy request will 404");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let state = Arc::new(GatewayState::new(config, routes, shutdown.clone()));
    tracing::info!(dashboards = state.routes.len(), "dashgate listening on {addr}");

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
