// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle events and the notifier fan-out.
//!
//! The [`Notifier`] is an explicit observer registry: one instance per
//! session, injected into the refresh scheduler and anything else that wants
//! to surface lifecycle changes (toasts, redirects, logging). Never global.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the token lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A fresh tenant-scoped credential is active.
    TenantTokenRefreshed { tenant_id: String, expires_in_secs: u64 },
    /// A refresh attempt failed.
    RefreshFailed { tenant_id: String, error: String },
    /// The user credential was rejected — a full re-login is needed.
    ReloginRequired { reason: String },
    /// Tenant scope was reset — the user must pick a tenant again.
    TenantReselectRequired { reason: String },
    /// The whole session was cleared.
    SessionCleared,
}

/// Broadcast fan-out for [`SessionEvent`]s.
#[derive(Debug, Clone)]
pub struct Notifier {
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self { event_tx }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Emit an event. Dropped silently when nobody is listening.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
