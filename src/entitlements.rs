//! The entitlement evaluator.
//!
//! Pure, synchronous functions over a subscription snapshot: no suspension
//! points, no shared mutable state, safe to call repeatedly from many
//! rendering contexts. Every function is total and fails closed — missing
//! data denies access, it never throws and never defaults to permissive.

use crate::features::{Feature, FeatureGates};
use crate::limits::{LimitKey, PlanLimits, UsageKey, UsageTracking, UNLIMITED};
use crate::subscription::{Subscription, SubscriptionStatus};
use crate::tier::PlanTier;

/// Result of checking a quota against usage.
///
/// Rich form for callers that render detail; [`is_within_limit`] is the
/// boolean contract and the two always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCheckResult {
    /// The quota is unlimited.
    Unlimited,
    /// Usage is strictly below the quota.
    WithinLimit { current: i64, max: i64 },
    /// Usage has reached or exceeded the quota.
    AtLimit { current: i64, max: i64 },
    /// The usage counter is missing; treated as at limit.
    UsageUnknown { max: i64 },
}

impl LimitCheckResult {
    /// Check if more usage is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Unlimited | Self::WithinLimit { .. })
    }
}

/// Check whether usage is strictly within a quota.
///
/// - Unlimited quota (`-1`): always within.
/// - Missing usage counter: not within (at limit, never "ok").
/// - Otherwise `usage < limit` — usage equal to the limit counts as
///   exhausted.
#[must_use]
pub fn is_within_limit(
    limits: &PlanLimits,
    usage: &UsageTracking,
    limit_key: LimitKey,
    usage_key: UsageKey,
) -> bool {
    let limit = limits.get(limit_key);
    if limit == UNLIMITED {
        return true;
    }
    match usage.get(usage_key) {
        Some(current) => current < limit,
        None => false,
    }
}

/// Rich form of [`is_within_limit`].
#[must_use]
pub fn check_limit(
    limits: &PlanLimits,
    usage: &UsageTracking,
    limit_key: LimitKey,
    usage_key: UsageKey,
) -> LimitCheckResult {
    let max = limits.get(limit_key);
    if max == UNLIMITED {
        return LimitCheckResult::Unlimited;
    }
    match usage.get(usage_key) {
        None => LimitCheckResult::UsageUnknown { max },
        Some(current) if current < max => LimitCheckResult::WithinLimit { current, max },
        Some(current) => LimitCheckResult::AtLimit { current, max },
    }
}

/// Quota still available.
///
/// Returns `-1` for unlimited, `0` when the usage counter is missing,
/// otherwise `max(0, limit - usage)` — never negative.
#[must_use]
pub fn remaining_quota(
    limits: &PlanLimits,
    usage: &UsageTracking,
    limit_key: LimitKey,
    usage_key: UsageKey,
) -> i64 {
    let limit = limits.get(limit_key);
    if limit == UNLIMITED {
        return UNLIMITED;
    }
    match usage.get(usage_key) {
        Some(current) => (limit - current).max(0),
        None => 0,
    }
}

/// Usage as a percentage of the quota, for display.
///
/// Unlimited quotas always render as `0.0` — not 100, not hidden. A quota
/// of zero also yields `0.0` (no division by zero), as does a missing
/// usage counter. Gating must go through [`is_within_limit`], never
/// through this display value.
#[must_use]
pub fn usage_percentage(
    limits: &PlanLimits,
    usage: &UsageTracking,
    limit_key: LimitKey,
    usage_key: UsageKey,
) -> f64 {
    let limit = limits.get(limit_key);
    if limit == UNLIMITED || limit <= 0 {
        return 0.0;
    }
    match usage.get(usage_key) {
        Some(current) => current as f64 / limit as f64 * 100.0,
        None => 0.0,
    }
}

/// Warning thresholds for usage meters, as percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageThresholds {
    /// At or above this percentage the meter shows a warning.
    pub warning: f64,
    /// At or above this percentage the meter shows danger.
    pub danger: f64,
}

impl Default for UsageThresholds {
    fn default() -> Self {
        Self {
            warning: 75.0,
            danger: 90.0,
        }
    }
}

/// Severity bucket for a usage meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Normal,
    Warning,
    Danger,
}

/// Bucket a display percentage against thresholds.
#[must_use]
pub fn usage_level(percentage: f64, thresholds: &UsageThresholds) -> UsageLevel {
    if percentage >= thresholds.danger {
        UsageLevel::Danger
    } else if percentage >= thresholds.warning {
        UsageLevel::Warning
    } else {
        UsageLevel::Normal
    }
}

/// Check if a subscription snapshot grants a feature.
///
/// Fail-closed: a snapshot without a features object denies everything.
#[must_use]
pub fn has_feature(subscription: &Subscription, feature: Feature) -> bool {
    subscription.has_feature(feature)
}

/// Trial eligibility.
///
/// True for exactly one combination: plan `Free` AND status `Active`. The
/// conjunction is deliberate — a free user in `past_due` or `incomplete`
/// is not eligible, and no paid or trialing user ever is.
#[must_use]
pub fn can_start_trial(plan: PlanTier, status: SubscriptionStatus) -> bool {
    plan == PlanTier::Free && status == SubscriptionStatus::Active
}

/// The upgrade target needed to unlock a feature, if any.
///
/// `None` when the current snapshot already grants the feature; otherwise
/// the minimum tier from the gate table (falling back to `Enterprise` for
/// unmapped keys).
#[must_use]
pub fn upgrade_needed_for(
    subscription: &Subscription,
    gates: &FeatureGates,
    feature: Feature,
) -> Option<PlanTier> {
    if subscription.has_feature(feature) {
        None
    } else {
        Some(gates.minimum_plan_for(feature))
    }
}
