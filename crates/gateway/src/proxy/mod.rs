// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface of the gateway: router assembly and shell API handlers.

pub mod classify;
pub mod handler;
pub mod upstream;

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::state::GatewayState;

/// `GET /api/health`
async fn health(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "running", "dashboards": state.routes.len() }))
}

/// Listing entry for `GET /api/dashboards`.
#[derive(Debug, Serialize)]
struct DashboardInfo {
    slug: String,
    name: String,
}

/// `GET /api/dashboards` — slugs and display names from the route table.
/// Upstream origins stay internal.
async fn list_dashboards(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let mut list: Vec<DashboardInfo> = state
        .routes
        .entries()
        .map(|entry| DashboardInfo { slug: entry.slug.clone(), name: entry.name.clone() })
        .collect();
    list.sort_by(|a, b| a.slug.cmp(&b.slug));
    Json(list)
}

/// Build the axum `Router` with all gateway routes.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/dashboards", get(list_dashboards))
        .route("/proxy/{slug}", get(handler::proxy_root).post(handler::proxy_root))
        .route("/proxy/{slug}/{*path}", get(handler::proxy_path).post(handler::proxy_path))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
