//! End-to-end session flows against a scripted backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use plangate::{
    can_start_trial, usage_level, usage_percentage, BillingBackend, BillingCycle, CheckoutSession,
    Feature, FetchState, LimitKey, PlanCatalog, PlanFeatures, PlanLimits, PlanTier, PlangateError,
    Subscription, SubscriptionSession, SubscriptionStatus, UsageKey, UsageLevel, UsageThresholds,
    UsageTracking, UNLIMITED,
};

/// Scripted backend: each `fetch_subscription` pops the next response and,
/// when a gate is attached, waits for the test to release it. Cloning
/// shares the script, so the test keeps a control handle.
#[derive(Clone, Default)]
struct ScriptedBackend {
    inner: Arc<ScriptedInner>,
}

#[derive(Default)]
struct ScriptedInner {
    responses: Mutex<VecDeque<(Subscription, Option<oneshot::Receiver<()>>)>>,
    fetches_started: AtomicU32,
    actions: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn push(&self, subscription: Subscription) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back((subscription, None));
    }

    /// Queue a response that is held until the returned sender fires.
    fn push_gated(&self, subscription: Subscription) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back((subscription, Some(rx)));
        tx
    }

    async fn wait_for_fetches(&self, n: u32) {
        while self.inner.fetches_started.load(Ordering::SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }

    fn actions(&self) -> Vec<String> {
        self.inner.actions.lock().unwrap().clone()
    }

    fn record(&self, action: &str) {
        self.inner.actions.lock().unwrap().push(action.to_string());
    }
}

#[async_trait]
impl BillingBackend for ScriptedBackend {
    async fn fetch_subscription(&self) -> plangate::Result<Subscription> {
        let (subscription, gate) = self
            .inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(PlangateError::NoSubscription)?;
        self.inner.fetches_started.fetch_add(1, Ordering::SeqCst);
        if let Some(rx) = gate {
            rx.await.ok();
        }
        Ok(subscription)
    }

    async fn fetch_catalog(&self) -> plangate::Result<PlanCatalog> {
        Ok(PlanCatalog::standard())
    }

    async fn create_checkout(
        &self,
        tier: PlanTier,
        cycle: BillingCycle,
    ) -> plangate::Result<CheckoutSession> {
        self.record(&format!("checkout:{tier}:{cycle}"));
        Ok(CheckoutSession {
            url: "https://billing.example.com/cs_1".to_string(),
            session_id: "cs_1".to_string(),
        })
    }

    async fn cancel_subscription(&self) -> plangate::Result<()> {
        self.record("cancel");
        Ok(())
    }

    async fn reactivate_subscription(&self) -> plangate::Result<()> {
        self.record("reactivate");
        Ok(())
    }

    async fn start_trial(&self, tier: PlanTier) -> plangate::Result<()> {
        self.record(&format!("trial:{tier}"));
        Ok(())
    }
}

fn base_snapshot(plan: PlanTier, status: SubscriptionStatus) -> Subscription {
    Subscription {
        id: "sub_42".to_string(),
        plan,
        trial_plan: None,
        billing_cycle: BillingCycle::Monthly,
        status,
        trial_end: None,
        trial_days_remaining: None,
        current_period_end: Some(1_735_689_600),
        cancel_at_period_end: false,
        limits: None,
        features: None,
        usage: None,
        updated_at: 1_700_000_000,
    }
}

fn free_snapshot() -> Subscription {
    let mut sub = base_snapshot(PlanTier::Free, SubscriptionStatus::Active);
    sub.limits = Some(PlanLimits {
        projects: 3,
        repositories: 3,
        team_members: 1,
        ai_requests_per_day: 10,
        code_reviews_per_month: 5,
        workspaces: 1,
        storage_mb: 512,
        concurrent_sessions: 1,
    });
    sub.features = Some(PlanFeatures::none());
    sub.usage = Some(UsageTracking {
        projects_count: Some(2),
        repositories_count: Some(3),
        ..UsageTracking::default()
    });
    sub
}

fn team_snapshot() -> Subscription {
    let mut sub = base_snapshot(PlanTier::Team, SubscriptionStatus::Active);
    let mut limits = PlanLimits::unlimited();
    limits.projects = 100;
    limits.team_members = 25;
    sub.limits = Some(limits);
    sub.features = Some(PlanFeatures {
        github_integration: true,
        ai_code_review: true,
        team_collaboration: true,
        priority_support: true,
        advanced_analytics: true,
        custom_workflows: true,
        ..PlanFeatures::none()
    });
    sub.usage = Some(UsageTracking {
        projects_count: Some(92),
        team_members_count: Some(12),
        ..UsageTracking::default()
    });
    sub
}

#[tokio::test]
async fn upgrade_journey_from_free_to_team() {
    let backend = ScriptedBackend::default();
    backend.push(free_snapshot());
    let session = SubscriptionSession::new(backend.clone());

    // Mount: snapshot + catalog land together.
    session.bootstrap().await.unwrap();
    assert!(session.is_active());
    assert!(session.is_free());
    assert!(session.catalog().is_ready());

    // Free tier gates: repos are exactly at the cap, projects are not.
    assert!(!session.has_feature(Feature::TeamCollaboration));
    assert!(session.is_within_limit(LimitKey::Projects, UsageKey::ProjectsCount));
    assert!(!session.is_within_limit(LimitKey::Repositories, UsageKey::RepositoriesCount));

    // Upgrade: checkout, then the refetched snapshot flips the gates.
    backend.push(team_snapshot());
    let checkout = session
        .checkout(PlanTier::Team, BillingCycle::Yearly)
        .await
        .unwrap();
    assert_eq!(checkout.session_id, "cs_1");
    assert_eq!(backend.actions(), vec!["checkout:team:yearly"]);

    assert_eq!(session.subscription().unwrap().plan, PlanTier::Team);
    assert!(session.has_feature(Feature::TeamCollaboration));
    assert!(!session.has_feature(Feature::Sso));
    assert!(session.is_within_limit(LimitKey::Repositories, UsageKey::RepositoriesCount));
}

#[tokio::test]
async fn usage_meter_on_live_snapshot() {
    let backend = ScriptedBackend::default();
    backend.push(team_snapshot());
    let session = SubscriptionSession::new(backend);
    session.refresh().await.unwrap();

    let sub = session.subscription().unwrap();
    let limits = sub.limits.unwrap();
    let usage = sub.usage.unwrap();

    // 92 of 100 projects: danger band at default thresholds.
    let pct = usage_percentage(&limits, &usage, LimitKey::Projects, UsageKey::ProjectsCount);
    assert_eq!(pct, 92.0);
    assert_eq!(
        usage_level(pct, &UsageThresholds::default()),
        UsageLevel::Danger
    );

    // Unlimited storage renders as 0%, not 100%.
    let pct = usage_percentage(&limits, &usage, LimitKey::StorageMb, UsageKey::StorageUsedMb);
    assert_eq!(pct, 0.0);
    assert_eq!(limits.get(LimitKey::StorageMb), UNLIMITED);
}

#[tokio::test]
async fn trial_journey_for_free_user() {
    let backend = ScriptedBackend::default();
    backend.push(free_snapshot());
    let session = SubscriptionSession::new(backend.clone());
    session.refresh().await.unwrap();

    let sub = session.subscription().unwrap();
    assert!(can_start_trial(sub.plan, sub.status));

    let mut trialing = base_snapshot(PlanTier::FreeTrial, SubscriptionStatus::Trialing);
    trialing.trial_plan = Some(PlanTier::Team);
    trialing.trial_days_remaining = Some(14);
    backend.push(trialing);

    session.start_trial(PlanTier::Team).await.unwrap();
    assert_eq!(backend.actions(), vec!["trial:team"]);
    assert!(session.is_trialing());
    assert_eq!(session.trial_days_remaining(), Some(14));
    assert_eq!(
        session.subscription().unwrap().effective_plan(),
        PlanTier::Team
    );
    // Already trialing: not eligible again.
    assert!(!session.can_start_trial());
}

#[tokio::test]
async fn cancel_and_reactivate_round_trip() {
    let backend = ScriptedBackend::default();
    backend.push(team_snapshot());
    let session = SubscriptionSession::new(backend.clone());
    session.refresh().await.unwrap();

    let mut cancelling = team_snapshot();
    cancelling.cancel_at_period_end = true;
    backend.push(cancelling);
    session.cancel().await.unwrap();
    assert!(session.is_cancelling());
    // Still active until the period ends.
    assert!(session.is_active());

    backend.push(team_snapshot());
    session.reactivate().await.unwrap();
    assert!(!session.is_cancelling());

    assert_eq!(backend.actions(), vec!["cancel", "reactivate"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn newer_refresh_supersedes_older() {
    let backend = ScriptedBackend::default();
    let release_old = backend.push_gated(free_snapshot());
    let release_new = backend.push_gated(team_snapshot());

    let session = Arc::new(SubscriptionSession::new(backend.clone()));

    let old_task = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.refresh().await }
    });
    backend.wait_for_fetches(1).await;

    let new_task = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.refresh().await }
    });
    backend.wait_for_fetches(2).await;

    // The newer fetch resolves first, the older one afterwards.
    release_new.send(()).unwrap();
    new_task.await.unwrap().unwrap();
    assert_eq!(session.subscription().unwrap().plan, PlanTier::Team);

    release_old.send(()).unwrap();
    old_task.await.unwrap().unwrap();

    // The stale free-plan response was discarded.
    assert_eq!(session.subscription().unwrap().plan, PlanTier::Team);
}

#[tokio::test]
async fn logout_clears_session() {
    let backend = ScriptedBackend::default();
    backend.push(team_snapshot());
    let session = SubscriptionSession::new(backend);
    session.refresh().await.unwrap();
    assert!(session.is_active());

    session.clear();
    assert_eq!(session.snapshot(), FetchState::Pending);
    assert!(!session.is_active());
    assert!(!session.has_feature(Feature::GithubIntegration));
}
