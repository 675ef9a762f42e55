//! The subscription snapshot and its lifecycle states.
//!
//! A [`Subscription`] is a read-only snapshot owned by the billing backend.
//! The client never computes a new one — it only derives flags from the
//! latest fetched copy, and triggers transitions indirectly via billing
//! actions followed by a full refetch.

use serde::{Deserialize, Serialize};

use crate::features::{Feature, PlanFeatures};
use crate::limits::{PlanLimits, UsageTracking};
use crate::tier::PlanTier;

/// Lifecycle status of a subscription, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and in good standing.
    Active,
    /// In a trial period.
    Trialing,
    /// Payment failed; access may continue during the grace period.
    PastDue,
    /// Cancelled; terminal until a new checkout.
    Cancelled,
    /// Lapsed without renewal; terminal until a new checkout.
    Expired,
    /// Created but awaiting the first payment.
    Incomplete,
    /// First payment never completed.
    IncompleteExpired,
}

impl SubscriptionStatus {
    /// All statuses.
    pub const ALL: [SubscriptionStatus; 7] = [
        Self::Active,
        Self::Trialing,
        Self::PastDue,
        Self::Cancelled,
        Self::Expired,
        Self::Incomplete,
        Self::IncompleteExpired,
    ];

    /// Parse from the backend's wire form.
    ///
    /// Unknown strings map to `Cancelled`, the most restrictive state that
    /// a gate can safely assume.
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "active" => Self::Active,
            "trialing" => Self::Trialing,
            "past_due" => Self::PastDue,
            "cancelled" | "canceled" => Self::Cancelled,
            "expired" => Self::Expired,
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            _ => Self::Cancelled,
        }
    }

    /// Wire form of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
        }
    }

    /// Check if `next` is a transition the backend can report from this
    /// state.
    ///
    /// The client never drives this state machine; it only reflects the
    /// server's current state. `Cancelled` and `Expired` are terminal from
    /// the client's perspective — only a new checkout leaves them, which
    /// creates a fresh subscription rather than transitioning the old one.
    #[must_use]
    pub fn can_transition_to(self, next: SubscriptionStatus) -> bool {
        match self {
            Self::Incomplete => matches!(next, Self::Active | Self::IncompleteExpired),
            Self::Trialing => matches!(next, Self::Active | Self::Expired | Self::Cancelled),
            Self::Active => matches!(next, Self::PastDue | Self::Cancelled),
            Self::PastDue => matches!(next, Self::Active | Self::Expired | Self::Cancelled),
            Self::Cancelled | Self::Expired | Self::IncompleteExpired => false,
        }
    }

    /// Check if this status grants access (`active` or `trialing`).
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing interval for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    /// Billed monthly.
    Monthly,
    /// Billed yearly.
    Yearly,
}

impl BillingCycle {
    /// Wire form of the cycle.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subscription snapshot as last fetched from the billing backend.
///
/// The backend is the sole writer; this type is never mutated locally
/// except by replacing it wholesale with a newer fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Backend subscription ID.
    pub id: String,
    /// Current plan tier.
    pub plan: PlanTier,
    /// The paid tier being trialed while `plan == FreeTrial`.
    #[serde(default)]
    pub trial_plan: Option<PlanTier>,
    /// Billing interval.
    pub billing_cycle: BillingCycle,
    /// Lifecycle status.
    pub status: SubscriptionStatus,
    /// Trial end (unix seconds), if a trial is or was running.
    #[serde(default)]
    pub trial_end: Option<u64>,
    /// Days left in the trial, computed by the server.
    ///
    /// Passed through verbatim — the server is the time authority and this
    /// is never recomputed from `trial_end` locally.
    #[serde(default)]
    pub trial_days_remaining: Option<u32>,
    /// End of the current billing period (unix seconds).
    #[serde(default)]
    pub current_period_end: Option<u64>,
    /// Whether the subscription cancels at period end.
    #[serde(default)]
    pub cancel_at_period_end: bool,
    /// Resolved quota set for the current plan.
    #[serde(default)]
    pub limits: Option<PlanLimits>,
    /// Resolved feature flags for the current plan.
    #[serde(default)]
    pub features: Option<PlanFeatures>,
    /// Current consumption counters.
    #[serde(default)]
    pub usage: Option<UsageTracking>,
    /// Last updated (unix seconds), set by the backend.
    #[serde(default)]
    pub updated_at: u64,
}

impl Subscription {
    /// Check if the subscription grants access (`active` or `trialing`).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Check if the subscription is in a trial period.
    #[must_use]
    pub fn is_trialing(&self) -> bool {
        self.status == SubscriptionStatus::Trialing
    }

    /// Check if the user is on the free tier.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.plan == PlanTier::Free
    }

    /// Check if the subscription is scheduled to cancel at period end.
    #[must_use]
    pub fn is_cancelling(&self) -> bool {
        self.cancel_at_period_end
    }

    /// Check if a feature is granted by this snapshot.
    ///
    /// Fail-closed: a missing features object denies every feature. There
    /// is no hierarchy fallback — the snapshot already encodes the full
    /// resolved flag set for the current plan.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.map(|f| f.enabled(feature)).unwrap_or(false)
    }

    /// The tier whose entitlements are in effect.
    ///
    /// While trialing a paid tier this is `trial_plan`; otherwise `plan`.
    #[must_use]
    pub fn effective_plan(&self) -> PlanTier {
        if self.is_trialing() {
            self.trial_plan.unwrap_or(self.plan)
        } else {
            self.plan
        }
    }
}
