//! Feature flags and minimum-plan resolution.
//!
//! `PlanFeatures` is a fixed-shape struct so feature lookups are checked at
//! compile time. The minimum-plan table is the one place that stays
//! string-keyed: it is open-ended metadata used to label locked features in
//! the UI, and unmapped keys deliberately resolve to the most restrictive
//! tier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tier::PlanTier;

/// A capability that a plan may grant.
///
/// Closed set; a feature is either granted by the active plan snapshot or
/// not. There is no partial or tiered feature state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Connect and browse GitHub repositories.
    GithubIntegration,
    /// AI-assisted code review.
    AiCodeReview,
    /// Shared projects and member management.
    TeamCollaboration,
    /// Single sign-on.
    Sso,
    /// Organization audit logs.
    AuditLogs,
    /// Priority support channel.
    PrioritySupport,
    /// Advanced analytics dashboards.
    AdvancedAnalytics,
    /// Custom workflow automation.
    CustomWorkflows,
}

impl Feature {
    /// All features, in display order.
    pub const ALL: [Feature; 8] = [
        Self::GithubIntegration,
        Self::AiCodeReview,
        Self::TeamCollaboration,
        Self::Sso,
        Self::AuditLogs,
        Self::PrioritySupport,
        Self::AdvancedAnalytics,
        Self::CustomWorkflows,
    ];

    /// Wire key for this feature.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::GithubIntegration => "github_integration",
            Self::AiCodeReview => "ai_code_review",
            Self::TeamCollaboration => "team_collaboration",
            Self::Sso => "sso",
            Self::AuditLogs => "audit_logs",
            Self::PrioritySupport => "priority_support",
            Self::AdvancedAnalytics => "advanced_analytics",
            Self::CustomWorkflows => "custom_workflows",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Resolved capability flags for one plan.
///
/// The snapshot already encodes the full flag set for the current plan;
/// lower-tier flags are never inherited implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanFeatures {
    #[serde(default)]
    pub github_integration: bool,
    #[serde(default)]
    pub ai_code_review: bool,
    #[serde(default)]
    pub team_collaboration: bool,
    #[serde(default)]
    pub sso: bool,
    #[serde(default)]
    pub audit_logs: bool,
    #[serde(default)]
    pub priority_support: bool,
    #[serde(default)]
    pub advanced_analytics: bool,
    #[serde(default)]
    pub custom_workflows: bool,
}

impl PlanFeatures {
    /// No capabilities at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Every capability enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            github_integration: true,
            ai_code_review: true,
            team_collaboration: true,
            sso: true,
            audit_logs: true,
            priority_support: true,
            advanced_analytics: true,
            custom_workflows: true,
        }
    }

    /// Check if a feature flag is set.
    #[must_use]
    pub fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::GithubIntegration => self.github_integration,
            Feature::AiCodeReview => self.ai_code_review,
            Feature::TeamCollaboration => self.team_collaboration,
            Feature::Sso => self.sso,
            Feature::AuditLogs => self.audit_logs,
            Feature::PrioritySupport => self.priority_support,
            Feature::AdvancedAnalytics => self.advanced_analytics,
            Feature::CustomWorkflows => self.custom_workflows,
        }
    }

    /// Features currently enabled, in display order.
    #[must_use]
    pub fn enabled_features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.enabled(*f))
            .collect()
    }
}

/// Minimum-plan table for locked-feature UI.
///
/// Maps a feature key to the lowest tier that unlocks it. Unmapped keys
/// resolve to [`PlanTier::Enterprise`]: under-promise availability rather
/// than over-promise.
#[derive(Debug, Clone)]
pub struct FeatureGates {
    gates: HashMap<String, PlanTier>,
}

impl FeatureGates {
    /// Build an empty table. Every lookup resolves to `Enterprise`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            gates: HashMap::new(),
        }
    }

    /// The standard table for the product's feature set.
    #[must_use]
    pub fn standard() -> Self {
        let mut gates = HashMap::new();
        gates.insert("github_integration".to_string(), PlanTier::FreeTrial);
        gates.insert("ai_code_review".to_string(), PlanTier::FreeTrial);
        gates.insert("priority_support".to_string(), PlanTier::Individual);
        gates.insert("team_collaboration".to_string(), PlanTier::Team);
        gates.insert("advanced_analytics".to_string(), PlanTier::Team);
        gates.insert("custom_workflows".to_string(), PlanTier::Team);
        gates.insert("sso".to_string(), PlanTier::Enterprise);
        gates.insert("audit_logs".to_string(), PlanTier::Enterprise);
        Self { gates }
    }

    /// Add or override a gate.
    pub fn set(&mut self, key: impl Into<String>, tier: PlanTier) {
        self.gates.insert(key.into(), tier);
    }

    /// Lowest tier that unlocks `key`; `Enterprise` for unmapped keys.
    #[must_use]
    pub fn minimum_plan(&self, key: &str) -> PlanTier {
        self.gates.get(key).copied().unwrap_or(PlanTier::Enterprise)
    }

    /// Typed variant of [`minimum_plan`](Self::minimum_plan).
    #[must_use]
    pub fn minimum_plan_for(&self, feature: Feature) -> PlanTier {
        self.minimum_plan(feature.key())
    }
}

impl Default for FeatureGates {
    fn default() -> Self {
        Self::standard()
    }
}
