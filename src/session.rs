//! Subscription session: a derived-state wrapper over the latest snapshot.
//!
//! The session is explicitly constructed with an injected backend and
//! passed by reference to consumers — there is no hidden global. It holds
//! exactly one snapshot, refreshed wholesale; derived flags are always
//! computed from the current snapshot and never cached independently of
//! it, so they cannot drift.
//!
//! Consistency model: concurrent reads of the cached snapshot are safe
//! because it is immutable between refetches; a newer fetch supersedes an
//! older one, and a stale response is discarded rather than installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use plangate::{SubscriptionSession, Feature};
//!
//! let session = SubscriptionSession::new(backend);
//! session.bootstrap().await?;
//!
//! if session.has_feature(Feature::AiCodeReview) {
//!     // render the review button
//! }
//!
//! // Billing action: request, then full refetch. Nothing is patched
//! // locally.
//! session.cancel().await?;
//! assert!(session.is_cancelling());
//! ```

use std::sync::RwLock;

use crate::client::{BillingBackend, CheckoutSession};
use crate::entitlements;
use crate::error::{PlangateError, Result};
use crate::features::Feature;
use crate::limits::{LimitKey, UsageKey};
use crate::subscription::{BillingCycle, Subscription};
use crate::tier::PlanTier;
use crate::catalog::PlanCatalog;

/// State of an asynchronous fetch, consumed by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// No result yet (initial state, or cleared on logout).
    Pending,
    /// Latest successful result.
    Ready(T),
    /// Latest attempt failed; the reason is for display and logging.
    Failed(String),
}

impl<T> FetchState<T> {
    /// Check if a result is available.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The result, if available.
    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

struct SessionState {
    snapshot: FetchState<Subscription>,
    catalog: FetchState<PlanCatalog>,
    /// Fetch tickets handed out so far.
    issued: u64,
    /// Ticket of the snapshot currently installed.
    applied: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            snapshot: FetchState::Pending,
            catalog: FetchState::Pending,
            issued: 0,
            applied: 0,
        }
    }
}

/// The current user's live subscription session.
///
/// Construction and teardown are explicit: create one per signed-in user
/// on mount, call [`clear`](Self::clear) on logout.
pub struct SubscriptionSession<B: BillingBackend> {
    backend: B,
    state: RwLock<SessionState>,
}

impl<B: BillingBackend> SubscriptionSession<B> {
    /// Create a session around an injected backend. Starts `Pending`.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: RwLock::new(SessionState::new()),
        }
    }

    // A poisoned lock only means a reader panicked mid-access; the state
    // itself is always a complete snapshot, so recover rather than panic.
    fn state_read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Fetch the snapshot and catalog together (initial mount).
    pub async fn bootstrap(&self) -> Result<()> {
        let ticket = self.take_ticket();
        let fetched = futures::try_join!(
            self.backend.fetch_subscription(),
            self.backend.fetch_catalog(),
        );
        match fetched {
            Ok((subscription, catalog)) => {
                self.install_snapshot(ticket, subscription);
                self.state_write().catalog = FetchState::Ready(catalog);
                Ok(())
            }
            Err(err) => {
                self.install_failure(ticket, &err);
                Err(err)
            }
        }
    }

    /// Refetch the subscription snapshot.
    ///
    /// Call on window focus and after any mutating billing action. If a
    /// newer refresh completed while this one was in flight, the stale
    /// response is discarded.
    pub async fn refresh(&self) -> Result<()> {
        let ticket = self.take_ticket();
        match self.backend.fetch_subscription().await {
            Ok(subscription) => {
                self.install_snapshot(ticket, subscription);
                Ok(())
            }
            Err(err) => {
                self.install_failure(ticket, &err);
                Err(err)
            }
        }
    }

    fn take_ticket(&self) -> u64 {
        let mut state = self.state_write();
        state.issued += 1;
        state.issued
    }

    /// Install a fetched snapshot unless a newer fetch already landed.
    fn install_snapshot(&self, ticket: u64, subscription: Subscription) {
        let mut state = self.state_write();
        if ticket > state.applied {
            tracing::debug!(
                target: "plangate::session",
                plan = %subscription.plan,
                status = %subscription.status,
                "installed subscription snapshot"
            );
            state.applied = ticket;
            state.snapshot = FetchState::Ready(subscription);
        } else {
            tracing::debug!(
                target: "plangate::session",
                "discarded superseded snapshot fetch"
            );
        }
    }

    fn install_failure(&self, ticket: u64, err: &PlangateError) {
        let mut state = self.state_write();
        if ticket > state.applied {
            state.applied = ticket;
            state.snapshot = FetchState::Failed(err.to_string());
        }
    }

    /// Tear the session down (logout). Resets to `Pending` and invalidates
    /// any fetch still in flight.
    pub fn clear(&self) {
        let mut state = self.state_write();
        state.applied = state.issued;
        state.snapshot = FetchState::Pending;
        state.catalog = FetchState::Pending;
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current snapshot state, including pending/failed.
    #[must_use]
    pub fn snapshot(&self) -> FetchState<Subscription> {
        self.state_read().snapshot.clone()
    }

    /// Current subscription, if one is loaded.
    #[must_use]
    pub fn subscription(&self) -> Option<Subscription> {
        self.state_read().snapshot.ready().cloned()
    }

    /// Current catalog state.
    #[must_use]
    pub fn catalog(&self) -> FetchState<PlanCatalog> {
        self.state_read().catalog.clone()
    }

    // ------------------------------------------------------------------
    // Derived flags — recomputed from the snapshot on every call
    // ------------------------------------------------------------------

    /// Status is `active` or `trialing`. False while pending or failed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.read_flag(Subscription::is_active)
    }

    /// Status is `trialing`.
    #[must_use]
    pub fn is_trialing(&self) -> bool {
        self.read_flag(Subscription::is_trialing)
    }

    /// Plan is the free tier.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.read_flag(Subscription::is_free)
    }

    /// Subscription cancels at period end.
    #[must_use]
    pub fn is_cancelling(&self) -> bool {
        self.read_flag(Subscription::is_cancelling)
    }

    /// Server-computed days left in the trial, passed through.
    #[must_use]
    pub fn trial_days_remaining(&self) -> Option<u32> {
        let state = self.state_read();
        state.snapshot.ready().and_then(|s| s.trial_days_remaining)
    }

    /// Feature gate on the current snapshot. Fail-closed while pending or
    /// failed.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.read_flag(|s| s.has_feature(feature))
    }

    /// Limit check on the current snapshot. Fail-closed when the snapshot,
    /// its limits, or its usage counters are missing.
    #[must_use]
    pub fn is_within_limit(&self, limit_key: LimitKey, usage_key: UsageKey) -> bool {
        let state = self.state_read();
        let Some(sub) = state.snapshot.ready() else {
            return false;
        };
        match (&sub.limits, &sub.usage) {
            (Some(limits), Some(usage)) => {
                entitlements::is_within_limit(limits, usage, limit_key, usage_key)
            }
            _ => false,
        }
    }

    /// Trial eligibility of the current snapshot.
    #[must_use]
    pub fn can_start_trial(&self) -> bool {
        self.read_flag(|s| entitlements::can_start_trial(s.plan, s.status))
    }

    fn read_flag(&self, f: impl FnOnce(&Subscription) -> bool) -> bool {
        let state = self.state_read();
        state.snapshot.ready().map(f).unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Billing actions — one request, then a full refetch
    // ------------------------------------------------------------------

    /// Start a checkout for a plan change. The returned session carries the
    /// redirect URL; the outcome is observed via the refetched snapshot.
    pub async fn checkout(&self, tier: PlanTier, cycle: BillingCycle) -> Result<CheckoutSession> {
        tracing::info!(target: "plangate::session", plan = %tier, cycle = %cycle, "starting checkout");
        let session = self.backend.create_checkout(tier, cycle).await?;
        self.refresh().await?;
        Ok(session)
    }

    /// Cancel at period end, then refetch.
    pub async fn cancel(&self) -> Result<()> {
        tracing::info!(target: "plangate::session", "cancelling subscription");
        self.backend.cancel_subscription().await?;
        self.refresh().await
    }

    /// Undo a pending cancellation, then refetch.
    pub async fn reactivate(&self) -> Result<()> {
        tracing::info!(target: "plangate::session", "reactivating subscription");
        self.backend.reactivate_subscription().await?;
        self.refresh().await
    }

    /// Start a trial of `tier`, then refetch.
    ///
    /// Fails fast with [`PlangateError::TrialNotEligible`] when the current
    /// snapshot is not eligible, without calling the backend.
    pub async fn start_trial(&self, tier: PlanTier) -> Result<()> {
        let (plan, status) = {
            let state = self.state_read();
            let sub = state.snapshot.ready().ok_or(PlangateError::NoSubscription)?;
            (sub.plan, sub.status)
        };
        if !entitlements::can_start_trial(plan, status) {
            return Err(PlangateError::TrialNotEligible { plan, status });
        }
        tracing::info!(target: "plangate::session", plan = %tier, "starting trial");
        self.backend.start_trial(tier).await?;
        self.refresh().await
    }
}
