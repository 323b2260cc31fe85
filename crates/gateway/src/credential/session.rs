// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session context: one user's credential state wired for refresh.
//!
//! An explicit object with a construction/teardown lifecycle — built when a
//! user logs in, torn down on logout. Collaborators get it passed in; there
//! is no module-global session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::credential::exchange::{ExchangeClient, ExchangeError};
use crate::credential::refresh::{RefreshScheduler, DEFAULT_REFRESH_WINDOW};
use crate::credential::store::CredentialStore;
use crate::credential::{Tenant, UserInfo};
use crate::events::{Notifier, SessionEvent};
use crate::token::{self, TokenScope};

pub struct Session {
    store: Arc<CredentialStore>,
    scheduler: Arc<RefreshScheduler>,
    exchange: Arc<ExchangeClient>,
    notifier: Notifier,
    shutdown: CancellationToken,
}

impl Session {
    pub fn new(exchange: Arc<ExchangeClient>, notifier: Notifier) -> Self {
        Self::with_refresh_window(exchange, notifier, DEFAULT_REFRESH_WINDOW)
    }

    pub fn with_refresh_window(
        exchange: Arc<ExchangeClient>,
        notifier: Notifier,
        refresh_window: Duration,
    ) -> Self {
        let store = Arc::new(CredentialStore::new());
        let shutdown = CancellationToken::new();
        let scheduler = RefreshScheduler::new(
            Arc::clone(&store),
            Arc::clone(&exchange),
            notifier.clone(),
            refresh_window,
            shutdown.clone(),
        );
        Self { store, scheduler, exchange, notifier, shutdown }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.scheduler
    }

    /// Subscribe to lifecycle events for this session.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    /// Start the session from a freshly issued user credential and fetch the
    /// user's profile and tenant list. The credential must be multi-tenant
    /// scoped; a tenant-scoped credential here is a caller bug.
    pub async fn login(&self, user_token: &str) -> anyhow::Result<UserInfo> {
        let claims = token::decode(user_token)?;
        match claims.scope()? {
            TokenScope::User { .. } => {}
            TokenScope::Tenant { .. } => {
                anyhow::bail!("expected a multi-tenant user credential, got a tenant-scoped one")
            }
        }

        self.store.set_user_token(user_token.to_owned()).await;
        let info = self
            .exchange
            .user_info(user_token)
            .await
            .map_err(|e| anyhow::anyhow!("user info fetch failed: {e}"))?;
        info!(user = %info.user_id, tenants = info.tenants.len(), "session started");
        Ok(info)
    }

    /// Select a tenant: exchange the user credential for a tenant-scoped one
    /// and arm proactive refresh. Goes through the scheduler so a concurrent
    /// timer-triggered refresh cannot double up.
    pub async fn select_tenant(&self, tenant: Tenant) -> Result<(), ExchangeError> {
        self.scheduler.cancel_timer().await;
        self.store.clear_tenant().await;
        self.store.select_tenant(tenant).await;
        self.scheduler.refresh_now().await
    }

    /// Drop tenant scope only, back to tenant selection.
    pub async fn clear_tenant(&self) {
        self.scheduler.cancel_timer().await;
        self.store.clear_tenant().await;
    }

    /// End the session: cancel timers, wipe all credentials.
    pub async fn logout(&self) {
        self.shutdown.cancel();
        self.scheduler.cancel_timer().await;
        self.store.clear().await;
        self.notifier.emit(SessionEvent::SessionCleared);
        info!("session ended");
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
