//! Backend client trait for subscription and catalog data.
//!
//! The billing backend is the sole writer of subscription state. This
//! crate only reads snapshots and requests transitions; every mutating
//! call is followed by a full snapshot refetch at the session layer.

use async_trait::async_trait;

use crate::catalog::PlanCatalog;
use crate::error::Result;
use crate::subscription::{BillingCycle, Subscription};
use crate::tier::PlanTier;

/// A checkout session created by the backend.
///
/// The UI redirects to `url`; completion is observed via the next snapshot
/// refetch, never computed locally.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CheckoutSession {
    /// Hosted checkout URL to redirect the user to.
    pub url: String,
    /// Backend identifier for the checkout session.
    pub session_id: String,
}

/// Operations exposed by the billing backend.
///
/// No retry/backoff here — retries, if any, are the concern of the
/// transport implementation or the calling layer.
#[async_trait]
pub trait BillingBackend: Send + Sync {
    /// Fetch the current user's subscription snapshot.
    async fn fetch_subscription(&self) -> Result<Subscription>;

    /// Fetch the plan catalog.
    async fn fetch_catalog(&self) -> Result<PlanCatalog>;

    /// Start a checkout for a plan change.
    async fn create_checkout(&self, tier: PlanTier, cycle: BillingCycle)
        -> Result<CheckoutSession>;

    /// Cancel the subscription at period end.
    async fn cancel_subscription(&self) -> Result<()>;

    /// Undo a pending cancellation.
    async fn reactivate_subscription(&self) -> Result<()>;

    /// Start a trial of a paid tier.
    async fn start_trial(&self, tier: PlanTier) -> Result<()>;
}

/// Mock backend for tests.
#[cfg(any(test, feature = "test-backend"))]
pub mod test {
    use std::collections::VecDeque;
    use std::sync::{Arc, RwLock};

    use super::*;
    use crate::error::PlangateError;

    /// A recorded mutating call, for asserting on request flows.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RecordedAction {
        Checkout(PlanTier, BillingCycle),
        Cancel,
        Reactivate,
        StartTrial(PlanTier),
    }

    #[derive(Default)]
    struct MockState {
        snapshots: VecDeque<Subscription>,
        current: Option<Subscription>,
        catalog: Option<PlanCatalog>,
        actions: Vec<RecordedAction>,
        fetch_count: u64,
        fail_next_fetch: bool,
    }

    /// Scriptable in-memory backend.
    ///
    /// Queue snapshots with [`push_snapshot`](Self::push_snapshot); each
    /// fetch consumes the queue head, and the last snapshot repeats once
    /// the queue is drained.
    #[derive(Clone, Default)]
    pub struct MockBillingBackend {
        state: Arc<RwLock<MockState>>,
    }

    impl MockBillingBackend {
        /// Create an empty mock. Fetching before any snapshot is queued
        /// returns an error.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a snapshot for the next fetch.
        pub fn push_snapshot(&self, subscription: Subscription) {
            self.state.write().unwrap().snapshots.push_back(subscription);
        }

        /// Set the catalog returned by `fetch_catalog`.
        pub fn set_catalog(&self, catalog: PlanCatalog) {
            self.state.write().unwrap().catalog = Some(catalog);
        }

        /// Make the next `fetch_subscription` fail with a 503.
        pub fn fail_next_fetch(&self) {
            self.state.write().unwrap().fail_next_fetch = true;
        }

        /// Mutating calls recorded so far, in order.
        #[must_use]
        pub fn actions(&self) -> Vec<RecordedAction> {
            self.state.read().unwrap().actions.clone()
        }

        /// Number of snapshot fetches served (including failures).
        #[must_use]
        pub fn fetch_count(&self) -> u64 {
            self.state.read().unwrap().fetch_count
        }
    }

    #[async_trait]
    impl BillingBackend for MockBillingBackend {
        async fn fetch_subscription(&self) -> Result<Subscription> {
            let mut state = self.state.write().unwrap();
            state.fetch_count += 1;
            if state.fail_next_fetch {
                state.fail_next_fetch = false;
                return Err(PlangateError::Backend {
                    status: Some(503),
                    message: "mock backend unavailable".to_string(),
                });
            }
            if let Some(next) = state.snapshots.pop_front() {
                state.current = Some(next);
            }
            state
                .current
                .clone()
                .ok_or(PlangateError::NoSubscription)
        }

        async fn fetch_catalog(&self) -> Result<PlanCatalog> {
            Ok(self
                .state
                .read()
                .unwrap()
                .catalog
                .clone()
                .unwrap_or_else(PlanCatalog::standard))
        }

        async fn create_checkout(
            &self,
            tier: PlanTier,
            cycle: BillingCycle,
        ) -> Result<CheckoutSession> {
            let mut state = self.state.write().unwrap();
            state.actions.push(RecordedAction::Checkout(tier, cycle));
            Ok(CheckoutSession {
                url: format!("https://billing.example.com/checkout/{tier}"),
                session_id: format!("cs_mock_{}", state.actions.len()),
            })
        }

        async fn cancel_subscription(&self) -> Result<()> {
            self.state.write().unwrap().actions.push(RecordedAction::Cancel);
            Ok(())
        }

        async fn reactivate_subscription(&self) -> Result<()> {
            self.state
                .write()
                .unwrap()
                .actions
                .push(RecordedAction::Reactivate);
            Ok(())
        }

        async fn start_trial(&self, tier: PlanTier) -> Result<()> {
            self.state
                .write()
                .unwrap()
                .actions
                .push(RecordedAction::StartTrial(tier));
            Ok(())
        }
    }
}
