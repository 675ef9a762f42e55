//! Plan tiers and the upgrade/downgrade hierarchy.
//!
//! The five tiers form a total order. Declaration order is the single
//! source of truth: every comparison in the crate goes through the derived
//! `Ord`, never through string tricks.

use serde::{Deserialize, Serialize};

/// A subscription plan tier.
///
/// Ordered from least to most capable: `Free < FreeTrial < Individual <
/// Team < Enterprise`. The variant order defines the hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// Free tier with minimal quotas.
    Free,
    /// Time-boxed trial of a paid tier.
    FreeTrial,
    /// Paid single-user tier.
    Individual,
    /// Paid multi-user tier.
    Team,
    /// Full-featured organization tier.
    Enterprise,
}

/// Direction of a plan change between two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanChange {
    /// The target tier is higher than the current one.
    Upgrade,
    /// The target tier is lower than the current one.
    Downgrade,
    /// Current and target are the same tier.
    Same,
}

impl PlanTier {
    /// All tiers in hierarchy order.
    pub const ALL: [PlanTier; 5] = [
        Self::Free,
        Self::FreeTrial,
        Self::Individual,
        Self::Team,
        Self::Enterprise,
    ];

    /// Classify a change from this tier to `target`.
    #[must_use]
    pub fn compare_to(self, target: PlanTier) -> PlanChange {
        match target.cmp(&self) {
            std::cmp::Ordering::Greater => PlanChange::Upgrade,
            std::cmp::Ordering::Less => PlanChange::Downgrade,
            std::cmp::Ordering::Equal => PlanChange::Same,
        }
    }

    /// Check if moving to `target` is a strict upgrade.
    ///
    /// Use this to filter which plans an upgrade flow may offer.
    #[must_use]
    pub fn can_upgrade_to(self, target: PlanTier) -> bool {
        self.compare_to(target) == PlanChange::Upgrade
    }

    /// Check if moving to `target` is a strict downgrade.
    #[must_use]
    pub fn can_downgrade_to(self, target: PlanTier) -> bool {
        self.compare_to(target) == PlanChange::Downgrade
    }

    /// Check if this is a paid tier (individual and above).
    #[must_use]
    pub fn is_paid(self) -> bool {
        self >= Self::Individual
    }

    /// Wire/storage form of the tier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::FreeTrial => "free_trial",
            Self::Individual => "individual",
            Self::Team => "team",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parse from the wire/storage form.
    ///
    /// The hierarchy is a closed enumeration, so unknown strings are not
    /// coerced to a tier.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "free_trial" => Some(Self::FreeTrial),
            "individual" => Some(Self::Individual),
            "team" => Some(Self::Team),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Human-readable name for plan comparison UI.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::FreeTrial => "Trial",
            Self::Individual => "Individual",
            Self::Team => "Team",
            Self::Enterprise => "Enterprise",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
