// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream dashboard forwarding: request construction, header whitelists in
//! both directions, and response/error translation into the gateway's
//! external contract.

use axum::body::Body;
use axum::http::header::HeaderName;
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::error;

use crate::error::ErrorCode;

/// Proxy mount prefix. Re-included in upstream URLs because the dashboards
/// themselves are configured to serve under the same prefix.
pub const PROXY_PREFIX: &str = "/proxy";

/// Inbound headers copied to the upstream request. Everything else —
/// cookies, infrastructure headers, the credential header — stays behind.
const INBOUND_HEADERS: &[&str] = &["content-type", "accept"];

/// Upstream response headers copied back to the caller.
const OUTBOUND_HEADERS: &[&str] = &["content-type", "content-length", "cache-control"];

/// Build the upstream URL for a proxied request. `query` must already have
/// the token parameter stripped.
pub fn upstream_url(base: &str, slug: &str, path: &str, query: &str) -> String {
    let mut url = format!("{base}{PROXY_PREFIX}/{slug}/{path}");
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Forward a request upstream and translate the outcome. The credential, if
/// any, travels only as a bearer `Authorization` header.
pub async fn forward(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    inbound: &HeaderMap,
    credential: Option<&str>,
    body: Bytes,
    slug: &str,
) -> Response {
    let mut req = client.request(method, url);
    for name in INBOUND_HEADERS {
        if let Some(value) = inbound.get(*name) {
            req = req.header(*name, value.clone());
        }
    }
    if let Some(token) = credential {
        req = req.bearer_auth(token);
    }
    if !body.is_empty() {
        req = req.body(body);
    }

    match req.send().await {
        Ok(resp) => translate_response(resp, slug).await,
        Err(e) => translate_error(&e, slug),
    }
}

/// Map an upstream response to the caller-facing one: 401 becomes the
/// distinct expired-credential contract, everything else passes through with
/// whitelisted headers and the raw body.
async fn translate_response(resp: reqwest::Response, slug: &str) -> Response {
    let status = resp.status();

    if status.as_u16() == 401 {
        return ErrorCode::TokenExpired
            .to_http_response_for(slug, "Your session has expired. Please select your tenant again.")
            .into_response();
    }

    let mut headers = HeaderMap::new();
    for name in OUTBOUND_HEADERS {
        if let Some(value) = resp.headers().get(*name) {
            headers.insert(HeaderName::from_static(*name), value.clone());
        }
    }

    match resp.bytes().await {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(e) => translate_error(&e, slug),
    }
}

/// Map transport failures: unreachable vs slow vs everything else, so the
/// caller is never told to log in again when the backend is simply down.
fn translate_error(err: &reqwest::Error, slug: &str) -> Response {
    if err.is_connect() {
        return ErrorCode::ServiceUnavailable
            .to_http_response(format!("Dashboard service '{slug}' is unavailable"))
            .into_response();
    }
    if err.is_timeout() {
        return ErrorCode::GatewayTimeout
            .to_http_response("Dashboard request timed out")
            .into_response();
    }
    // The log line keeps the detail; the caller gets a generic envelope.
    error!(dashboard = %slug, err = %err, "proxy forwarding failed");
    ErrorCode::ProxyError
        .to_http_response("Failed to proxy request to dashboard")
        .into_response()
}

#[cfg(test)]
#[path = "upstream_tests.rs"]
mod tests;
