// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unverified bearer-credential claim decoding.
//!
//! Reads the claim set out of the three-segment token structure for display
//! and refresh scheduling. Signature verification belongs to the identity
//! service; nothing decoded here may feed an authorization decision.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Claim set shared by user and tenant credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiry, seconds since Unix epoch.
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Single tenant id — tenant-scoped credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Tenant id list — multi-tenant user credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Which kind of credential a claim set represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScope {
    /// Multi-tenant user credential. The list is never empty.
    User { tenant_ids: Vec<String> },
    /// Tenant-scoped credential: exactly one tenant id, never a list.
    Tenant { tenant_id: String, role: Option<String> },
}

impl Claims {
    /// Classify the credential. A claim set carrying both a tenant id and a
    /// tenant list (or neither, or an empty list) is malformed.
    pub fn scope(&self) -> anyhow::Result<TokenScope> {
        match (&self.tenant_id, &self.tenant_ids) {
            (Some(_), Some(_)) => {
                anyhow::bail!("credential carries both tenant_id and tenant_ids")
            }
            (Some(id), None) => {
                Ok(TokenScope::Tenant { tenant_id: id.clone(), role: self.role.clone() })
            }
            (None, Some(ids)) if !ids.is_empty() => {
                Ok(TokenScope::User { tenant_ids: ids.clone() })
            }
            (None, Some(_)) => anyhow::bail!("user credential has an empty tenant list"),
            (None, None) => anyhow::bail!("credential carries no tenant claims"),
        }
    }

    /// Seconds until expiry measured from `now` (epoch seconds). Negative
    /// when already expired.
    pub fn remaining_secs(&self, now: u64) -> i64 {
        self.exp as i64 - now as i64
    }
}

/// Decode the claim set of a three-segment bearer credential without
/// verifying its signature. Pure and side-effect-free.
pub fn decode(credential: &str) -> anyhow::Result<Claims> {
    let mut segments = credential.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => anyhow::bail!("credential is not a three-segment token"),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| anyhow::anyhow!("invalid claim encoding: {e}"))?;
    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| anyhow::anyhow!("invalid claim set: {e}"))?;
    Ok(claims)
}

/// Current time as seconds since Unix epoch.
pub fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
