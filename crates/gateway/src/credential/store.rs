// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session credential store.
//!
//! Holds at most one multi-tenant user credential, at most one tenant-scoped
//! credential, and the currently selected tenant. Mutated only by the refresh
//! scheduler and explicit user actions; a single async lock gives atomic
//! replace semantics, nothing more is needed.

use tokio::sync::RwLock;

use crate::credential::Tenant;

/// Point-in-time copy of the store contents.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub user_token: Option<String>,
    pub tenant_token: Option<String>,
    pub selected_tenant: Option<Tenant>,
}

#[derive(Debug, Default)]
struct Slots {
    user_token: Option<String>,
    tenant_token: Option<String>,
    selected_tenant: Option<Tenant>,
    /// Bumped on every tenant-credential change. Lets the scheduler detect a
    /// timer that was armed against a credential since replaced or cleared.
    generation: u64,
}

/// In-memory credential holder for one session.
#[derive(Debug, Default)]
pub struct CredentialStore {
    slots: RwLock<Slots>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_user_token(&self, token: String) {
        self.slots.write().await.user_token = Some(token);
    }

    pub async fn user_token(&self) -> Option<String> {
        self.slots.read().await.user_token.clone()
    }

    /// Replace the tenant-scoped credential. Returns the new generation.
    pub async fn set_tenant_token(&self, token: String) -> u64 {
        let mut slots = self.slots.write().await;
        slots.tenant_token = Some(token);
        slots.generation += 1;
        slots.generation
    }

    pub async fn tenant_token(&self) -> Option<String> {
        self.slots.read().await.tenant_token.clone()
    }

    pub async fn select_tenant(&self, tenant: Tenant) {
        self.slots.write().await.selected_tenant = Some(tenant);
    }

    pub async fn selected_tenant(&self) -> Option<Tenant> {
        self.slots.read().await.selected_tenant.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.slots.read().await.generation
    }

    /// Drop tenant scope: credential and selection together, atomically.
    pub async fn clear_tenant(&self) {
        let mut slots = self.slots.write().await;
        slots.tenant_token = None;
        slots.selected_tenant = None;
        slots.generation += 1;
    }

    /// Wipe the whole session: user credential, tenant credential, selection.
    pub async fn clear(&self) {
        let mut slots = self.slots.write().await;
        slots.user_token = None;
        slots.tenant_token = None;
        slots.selected_tenant = None;
        slots.generation += 1;
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let slots = self.slots.read().await;
        SessionSnapshot {
            user_token: slots.user_token.clone(),
            tenant_token: slots.tenant_token.clone(),
            selected_tenant: slots.selected_tenant.clone(),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
