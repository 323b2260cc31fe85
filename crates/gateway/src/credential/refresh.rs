// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proactive tenant-credential refresh.
//!
//! One cancellable timer per live tenant credential, armed at
//! `expiry − refresh_window`. A single-flight guard keeps a timer firing
//! during a manual re-selection exchange from producing two outstanding
//! exchange calls for the same credential. Every failure path lands the
//! scheduler back in `Idle` with the session scope reset to match.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::credential::exchange::{ExchangeClient, ExchangeError};
use crate::credential::store::CredentialStore;
use crate::events::{Notifier, SessionEvent};
use crate::token;

/// Default window before expiry in which a refresh is triggered.
pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_secs(300);

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No tenant credential to watch.
    Idle,
    /// A timer is armed ahead of expiry.
    Scheduled,
    /// An exchange call is in flight.
    Refreshing,
    /// A refresh just failed; session scope is being reset.
    Failed,
}

/// What to do for a credential with `remaining` seconds to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    /// Credential already expired.
    Expired,
    /// Inside the refresh window — refresh immediately.
    Immediate,
    /// Arm a timer for this long.
    After(Duration),
}

/// Pure scheduling rule: immediate inside the window, timer at
/// `remaining − window` otherwise.
pub fn refresh_action(remaining_secs: i64, window: Duration) -> RefreshAction {
    if remaining_secs <= 0 {
        return RefreshAction::Expired;
    }
    let window_secs = window.as_secs() as i64;
    if remaining_secs <= window_secs {
        return RefreshAction::Immediate;
    }
    RefreshAction::After(Duration::from_secs((remaining_secs - window_secs) as u64))
}

struct Armed {
    /// Cancels the timer task watching the current credential.
    cancel: CancellationToken,
}

pub struct RefreshScheduler {
    store: Arc<CredentialStore>,
    exchange: Arc<ExchangeClient>,
    notifier: Notifier,
    refresh_window: Duration,
    state: RwLock<RefreshState>,
    armed: RwLock<Option<Armed>>,
    /// Single-flight guard: at most one in-flight exchange per credential.
    refreshing: AtomicBool,
    /// Session teardown token; nothing fires after cancellation.
    shutdown: CancellationToken,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<CredentialStore>,
        exchange: Arc<ExchangeClient>,
        notifier: Notifier,
        refresh_window: Duration,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            exchange,
            notifier,
            refresh_window,
            state: RwLock::new(RefreshState::Idle),
            armed: RwLock::new(None),
            refreshing: AtomicBool::new(false),
            shutdown,
        })
    }

    pub async fn state(&self) -> RefreshState {
        *self.state.read().await
    }

    /// Cancel the armed timer and go idle (teardown or tenant switch).
    pub async fn cancel_timer(&self) {
        if let Some(armed) = self.armed.write().await.take() {
            armed.cancel.cancel();
        }
        *self.state.write().await = RefreshState::Idle;
    }

    /// Arm (or re-arm) refresh for the tenant credential currently in the
    /// store. Replacing a credential always cancels the previous timer.
    pub fn arm<'a>(
        self: &'a Arc<Self>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
        if let Some(prev) = self.armed.write().await.take() {
            prev.cancel.cancel();
        }

        if self.shutdown.is_cancelled() {
            return;
        }

        let Some(tenant_token) = self.store.tenant_token().await else {
            *self.state.write().await = RefreshState::Idle;
            return;
        };

        let claims = match token::decode(&tenant_token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(err = %e, "tenant credential undecodable, dropping tenant scope");
                self.fail_tenant_scope("Tenant credential could not be read").await;
                return;
            }
        };

        let remaining = claims.remaining_secs(token::epoch_secs());
        match refresh_action(remaining, self.refresh_window) {
            RefreshAction::Expired => {
                debug!("tenant credential already expired");
                self.fail_tenant_scope("Your session has expired. Please select your tenant again.")
                    .await;
            }
            RefreshAction::Immediate => {
                info!(remaining_secs = remaining, "tenant credential expiring soon, refreshing now");
                let scheduler = Arc::clone(self);
                tokio::spawn(async move {
                    let _ = scheduler.refresh_now().await;
                });
            }
            RefreshAction::After(delay) => {
                let generation = self.store.generation().await;
                let cancel = CancellationToken::new();
                *self.armed.write().await = Some(Armed { cancel: cancel.clone() });
                *self.state.write().await = RefreshState::Scheduled;
                debug!(delay_secs = delay.as_secs(), "refresh timer armed");

                let scheduler = Arc::clone(self);
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return,
                        _ = shutdown.cancelled() => return,
                    }
                    // The credential may have been replaced while we slept.
                    if scheduler.store.generation().await != generation {
                        debug!("stale refresh timer fired, ignoring");
                        return;
                    }
                    let _ = scheduler.refresh_now().await;
                });
            }
        }
        })
    }

    /// Run one exchange for the selected tenant now. A refresh already in
    /// flight makes this a no-op.
    pub async fn refresh_now(self: &Arc<Self>) -> Result<(), ExchangeError> {
        if self.shutdown.is_cancelled() {
            return Ok(());
        }
        if self.refreshing.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err()
        {
            debug!("refresh already in flight, skipping");
            return Ok(());
        }

        let outcome = self.do_refresh().await;
        self.refreshing.store(false, Ordering::SeqCst);

        match outcome {
            Ok(refreshed) => {
                if refreshed {
                    // Re-arm against the new expiry, outside the guard so an
                    // immediate follow-up refresh is not swallowed.
                    self.arm().await;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// One exchange attempt. `Ok(true)` means a new credential was stored.
    async fn do_refresh(self: &Arc<Self>) -> Result<bool, ExchangeError> {
        *self.state.write().await = RefreshState::Refreshing;

        let snap = self.store.snapshot().await;
        let (user_token, tenant) = match (snap.user_token, snap.selected_tenant) {
            (Some(user_token), Some(tenant)) => (user_token, tenant),
            _ => {
                debug!("no user credential or tenant selection, nothing to refresh");
                *self.state.write().await = RefreshState::Idle;
                return Ok(false);
            }
        };

        match self.exchange.exchange(&user_token, &tenant.tenant_id).await {
            Ok(cred) => {
                self.store.set_tenant_token(cred.access_token).await;
                *self.state.write().await = RefreshState::Scheduled;
                info!(tenant = %tenant.tenant_id, expires_in = cred.expires_in, "tenant credential refreshed");
                self.notifier.emit(SessionEvent::TenantTokenRefreshed {
                    tenant_id: tenant.tenant_id,
                    expires_in_secs: cred.expires_in,
                });
                Ok(true)
            }
            Err(ExchangeError::InvalidToken) => {
                warn!(tenant = %tenant.tenant_id, "user credential rejected during refresh, clearing session");
                self.notifier.emit(SessionEvent::RefreshFailed {
                    tenant_id: tenant.tenant_id,
                    error: ExchangeError::InvalidToken.to_string(),
                });
                self.fail_session("Please log in again.").await;
                Err(ExchangeError::InvalidToken)
            }
            Err(e) => {
                warn!(tenant = %tenant.tenant_id, err = %e, "tenant credential refresh failed");
                self.notifier.emit(SessionEvent::RefreshFailed {
                    tenant_id: tenant.tenant_id,
                    error: e.to_string(),
                });
                self.fail_tenant_scope(
                    "Failed to refresh session. Please select your tenant again.",
                )
                .await;
                Err(e)
            }
        }
    }

    /// Tenant-level recovery: drop tenant scope, keep the user credential.
    async fn fail_tenant_scope(&self, reason: &str) {
        *self.state.write().await = RefreshState::Failed;
        if let Some(armed) = self.armed.write().await.take() {
            armed.cancel.cancel();
        }
        self.store.clear_tenant().await;
        self.notifier.emit(SessionEvent::TenantReselectRequired { reason: reason.to_owned() });
        *self.state.write().await = RefreshState::Idle;
    }

    /// Session-level recovery: wipe everything, full re-login required.
    async fn fail_session(&self, reason: &str) {
        *self.state.write().await = RefreshState::Failed;
        if let Some(armed) = self.armed.write().await.take() {
            armed.cancel.cancel();
        }
        self.store.clear().await;
        self.notifier.emit(SessionEvent::ReloginRequired { reason: reason.to_owned() });
        *self.state.write().await = RefreshState::Idle;
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
