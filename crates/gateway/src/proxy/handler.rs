// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reverse-proxy request handler.
//!
//! Stateless per request: classify, resolve the credential from the channel
//! the classification dictates, consult the allow-list, forward with the
//! credential injected server-side. Session state never enters this path —
//! the credential arrives on the request envelope itself.

use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::proxy::classify::{self, RequestClass};
use crate::proxy::upstream;
use crate::state::GatewayState;

/// Header carrying the tenant credential on direct page-load fetches.
/// Iframe navigations cannot set it and fall back to the token query param.
pub const TENANT_TOKEN_HEADER: &str = "x-tenant-token";

/// Everything derived from one inbound request; dropped when the response
/// goes out.
struct ProxyRequestContext {
    slug: String,
    path: String,
    /// Inbound query with the token parameter stripped.
    query: String,
    class: RequestClass,
    credential: Option<String>,
    upstream_url: String,
}

/// `GET|POST /proxy/{slug}` — dashboard root.
pub async fn proxy_root(
    State(state): State<Arc<GatewayState>>,
    Path(slug): Path<String>,
    req: Request,
) -> Response {
    handle(state, slug, String::new(), req).await
}

/// `GET|POST /proxy/{slug}/{*path}` — everything under a dashboard.
pub async fn proxy_path(
    State(state): State<Arc<GatewayState>>,
    Path((slug, path)): Path<(String, String)>,
    req: Request,
) -> Response {
    handle(state, slug, path, req).await
}

async fn handle(state: Arc<GatewayState>, slug: String, path: String, req: Request) -> Response {
    let request_id = uuid::Uuid::new_v4();

    // Allow-list lookup comes first: unknown slugs fail closed before any
    // upstream URL exists.
    let Some(route) = state.routes.resolve(&slug) else {
        debug!(%request_id, dashboard = %slug, "unknown dashboard slug");
        return ErrorCode::InvalidDashboard
            .to_http_response(format!("Dashboard '{slug}' not found"))
            .into_response();
    };

    let raw_query = req.uri().query().unwrap_or("").to_owned();
    let class = classify::classify(&path);

    let credential = match class {
        RequestClass::Asset => None,
        RequestClass::InternalApi => {
            // Iframe AJAX can set neither headers nor its own query string;
            // the page token rides in the Referer URL.
            let token = req
                .headers()
                .get(header::REFERER)
                .and_then(|v| v.to_str().ok())
                .and_then(classify::token_from_referer);
            match token {
                Some(token) => Some(token),
                None => {
                    debug!(%request_id, dashboard = %slug, "no token in Referer for internal API call");
                    return ErrorCode::Unauthorized
                        .to_http_response("Tenant token required")
                        .into_response();
                }
            }
        }
        RequestClass::PageLoad => {
            let from_header = req
                .headers()
                .get(TENANT_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            match from_header.or_else(|| classify::token_from_query(&raw_query)) {
                Some(token) => Some(token),
                None => {
                    debug!(%request_id, dashboard = %slug, "no token in header or query for page load");
                    return ErrorCode::Unauthorized
                        .to_http_response("Tenant token required")
                        .into_response();
                }
            }
        }
    };

    let query = classify::strip_token_param(&raw_query);
    let ctx = ProxyRequestContext {
        upstream_url: upstream::upstream_url(&route.upstream, &slug, &path, &query),
        slug,
        path,
        query,
        class,
        credential,
    };

    let method = req.method().clone();
    let inbound_headers = req.headers().clone();
    let body = match axum::body::to_bytes(req.into_body(), state.config.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%request_id, dashboard = %ctx.slug, err = %e, "failed to buffer request body");
            return ErrorCode::ProxyError
                .to_http_response("Failed to proxy request to dashboard")
                .into_response();
        }
    };

    // The credential itself is never logged.
    debug!(
        %request_id,
        dashboard = %ctx.slug,
        class = ?ctx.class,
        method = %method,
        path = %ctx.path,
        query = %ctx.query,
        has_token = ctx.credential.is_some(),
        url = %ctx.upstream_url,
        "forwarding dashboard request"
    );

    upstream::forward(
        &state.http,
        method,
        &ctx.upstream_url,
        &inbound_headers,
        ctx.credential.as_deref(),
        body,
        &ctx.slug,
    )
    .await
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
