// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token lifecycle: session-scoped credential state, token exchange against
//! the identity service, and proactive refresh ahead of expiry.
//!
//! The multi-tenant user credential never leaves this layer toward a
//! dashboard origin; only tenant-scoped credentials produced by exchange do.

pub mod exchange;
pub mod refresh;
pub mod session;
pub mod store;

use serde::{Deserialize, Serialize};

/// A tenant the logged-in user may select.
///
/// Fetched from the identity service after login; immutable for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: String,
    /// URL-safe, globally unique.
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<TenantPresentation>,
}

/// Tenant presentation config with an enumerated set of recognized keys.
/// Unrecognized keys ride along in `extra` but are never consulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantPresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// User profile returned by the identity service after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub tenants: Vec<Tenant>,
}
