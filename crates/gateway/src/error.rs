// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes surfaced by the gateway to proxy callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Unknown dashboard slug — fails closed, no upstream call is made.
    InvalidDashboard,
    /// No credential where one was required.
    Unauthorized,
    /// The caller was authenticated once, but the upstream rejected the
    /// credential it was given.
    TokenExpired,
    /// The identity service refused tenant access for this user.
    AccessDenied,
    /// The user credential itself was rejected — full re-login needed.
    InvalidToken,
    /// Upstream dashboard unreachable.
    ServiceUnavailable,
    /// Upstream dashboard took too long.
    GatewayTimeout,
    /// Anything else that went wrong while proxying.
    ProxyError,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidDashboard => 404,
            Self::Unauthorized => 401,
            Self::TokenExpired => 401,
            Self::AccessDenied => 403,
            Self::InvalidToken => 401,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::ProxyError => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDashboard => "INVALID_DASHBOARD",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
            Self::ProxyError => "PROXY_ERROR",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorResponse {
        ErrorResponse {
            error: self.as_str().to_owned(),
            message: message.into(),
            dashboard_slug: None,
        }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_error_body(message)))
    }

    /// Like [`to_http_response`](Self::to_http_response), with the dashboard
    /// slug echoed in the envelope.
    pub fn to_http_response_for(
        &self,
        slug: &str,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut body = self.to_error_body(message);
        body.dashboard_slug = Some(slug.to_owned());
        (status, Json(body))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON error envelope returned to proxy callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(
        rename = "dashboardSlug",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dashboard_slug: Option<String>,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
