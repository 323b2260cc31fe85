// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the external identity service: token exchange and user
//! info. The identity service is the only party that verifies signatures and
//! authorizes tenant access; this client just speaks its wire contract.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credential::UserInfo;

/// Default timeout for identity-service calls. Bounded so a hung endpoint
/// surfaces as a transport failure instead of stalling the scheduler.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Typed failure from the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// The user credential itself was rejected (401) — re-login required.
    InvalidToken,
    /// The user may not access the requested tenant (403).
    AccessDenied,
    /// Endpoint unreachable, timed out, or answered something unusable.
    Transport(String),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => f.write_str("user credential rejected"),
            Self::AccessDenied => f.write_str("tenant access denied"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
        }
    }
}

/// Wire body for `POST /api/token/exchange`.
#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    tenant_id: &'a str,
}

/// Success body from the exchange endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangedCredential {
    pub access_token: String,
    pub token_type: String,
    /// Credential lifetime in seconds.
    pub expires_in: u64,
}

/// Client for the identity service.
pub struct ExchangeClient {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        // In unit tests the process has not gone through `run()`, which installs
        // the rustls crypto provider that `reqwest` (built with
        // `rustls-no-provider`) requires. Install it here under test only;
        // stripped from production builds, where `run()` owns the install.
        #[cfg(test)]
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client =
            reqwest::Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { base_url: base_url.into().trim_end_matches('/').to_owned(), client }
    }

    /// Trade a user credential plus tenant id for a tenant-scoped credential.
    pub async fn exchange(
        &self,
        user_token: &str,
        tenant_id: &str,
    ) -> Result<ExchangedCredential, ExchangeError> {
        let url = format!("{}/api/token/exchange", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(user_token)
            .json(&ExchangeRequest { tenant_id })
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status.as_u16() == 401 {
            return Err(ExchangeError::InvalidToken);
        }
        if status.as_u16() == 403 {
            return Err(ExchangeError::AccessDenied);
        }
        if !status.is_success() {
            return Err(ExchangeError::Transport(format!("exchange returned HTTP {status}")));
        }

        resp.json()
            .await
            .map_err(|e| ExchangeError::Transport(format!("invalid exchange response: {e}")))
    }

    /// Fetch the logged-in user's profile and tenant list.
    pub async fn user_info(&self, user_token: &str) -> Result<UserInfo, ExchangeError> {
        let url = format!("{}/api/me", self.base_url);
        let resp =
            self.client.get(&url).bearer_auth(user_token).send().await.map_err(transport)?;

        let status = resp.status();
        if status.as_u16() == 401 {
            return Err(ExchangeError::InvalidToken);
        }
        if !status.is_success() {
            return Err(ExchangeError::Transport(format!("user info returned HTTP {status}")));
        }

        resp.json()
            .await
            .map_err(|e| ExchangeError::Transport(format!("invalid user info response: {e}")))
    }
}

fn transport(e: reqwest::Error) -> ExchangeError {
    if e.is_timeout() {
        ExchangeError::Transport("identity service timed out".to_owned())
    } else {
        ExchangeError::Transport(format!("identity service unreachable: {e}"))
    }
}

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;
