//! Plan quotas and usage counters.
//!
//! `PlanLimits` and `UsageTracking` are fixed-shape structs rather than
//! string-keyed maps, so every quota key is checked at compile time. The
//! evaluator always receives a `(LimitKey, UsageKey)` pair explicitly —
//! there is no name-guessing between the two records.

use serde::{Deserialize, Serialize};

/// Sentinel quota value meaning "no limit".
///
/// Unlimited short-circuits every comparison and percentage computation.
pub const UNLIMITED: i64 = -1;

/// Named numeric quotas for a plan.
///
/// Any value of [`UNLIMITED`] (-1) means the resource is not capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Maximum number of projects.
    pub projects: i64,
    /// Maximum number of linked repositories.
    pub repositories: i64,
    /// Maximum number of team members.
    pub team_members: i64,
    /// Maximum AI requests per day.
    pub ai_requests_per_day: i64,
    /// Maximum AI code reviews per month.
    pub code_reviews_per_month: i64,
    /// Maximum number of workspaces.
    pub workspaces: i64,
    /// Maximum storage in megabytes.
    pub storage_mb: i64,
    /// Maximum concurrent sessions.
    pub concurrent_sessions: i64,
}

/// Key selecting one quota out of [`PlanLimits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKey {
    Projects,
    Repositories,
    TeamMembers,
    AiRequestsPerDay,
    CodeReviewsPerMonth,
    Workspaces,
    StorageMb,
    ConcurrentSessions,
}

impl PlanLimits {
    /// A fully unlimited quota set (enterprise-style).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            projects: UNLIMITED,
            repositories: UNLIMITED,
            team_members: UNLIMITED,
            ai_requests_per_day: UNLIMITED,
            code_reviews_per_month: UNLIMITED,
            workspaces: UNLIMITED,
            storage_mb: UNLIMITED,
            concurrent_sessions: UNLIMITED,
        }
    }

    /// Get the quota value for a key.
    #[must_use]
    pub fn get(&self, key: LimitKey) -> i64 {
        match key {
            LimitKey::Projects => self.projects,
            LimitKey::Repositories => self.repositories,
            LimitKey::TeamMembers => self.team_members,
            LimitKey::AiRequestsPerDay => self.ai_requests_per_day,
            LimitKey::CodeReviewsPerMonth => self.code_reviews_per_month,
            LimitKey::Workspaces => self.workspaces,
            LimitKey::StorageMb => self.storage_mb,
            LimitKey::ConcurrentSessions => self.concurrent_sessions,
        }
    }

    /// Check if a quota is unlimited.
    #[must_use]
    pub fn is_unlimited(&self, key: LimitKey) -> bool {
        self.get(key) == UNLIMITED
    }
}

/// Current consumption counters, mirroring the quota names in [`PlanLimits`].
///
/// Counters are optional: the backend may omit any of them, and a missing
/// counter must be treated as "at limit" by the evaluator, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageTracking {
    /// Current number of projects.
    #[serde(default)]
    pub projects_count: Option<i64>,
    /// Current number of linked repositories.
    #[serde(default)]
    pub repositories_count: Option<i64>,
    /// Current number of team members.
    #[serde(default)]
    pub team_members_count: Option<i64>,
    /// AI requests made today.
    #[serde(default)]
    pub ai_requests_today: Option<i64>,
    /// AI code reviews used this month.
    #[serde(default)]
    pub code_reviews_this_month: Option<i64>,
    /// Current number of workspaces.
    #[serde(default)]
    pub workspaces_count: Option<i64>,
    /// Storage currently used, in megabytes.
    #[serde(default)]
    pub storage_used_mb: Option<i64>,
    /// Currently active sessions.
    #[serde(default)]
    pub active_sessions: Option<i64>,
}

/// Key selecting one counter out of [`UsageTracking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageKey {
    ProjectsCount,
    RepositoriesCount,
    TeamMembersCount,
    AiRequestsToday,
    CodeReviewsThisMonth,
    WorkspacesCount,
    StorageUsedMb,
    ActiveSessions,
}

impl UsageTracking {
    /// Get the counter value for a key, `None` when the backend omitted it.
    #[must_use]
    pub fn get(&self, key: UsageKey) -> Option<i64> {
        match key {
            UsageKey::ProjectsCount => self.projects_count,
            UsageKey::RepositoriesCount => self.repositories_count,
            UsageKey::TeamMembersCount => self.team_members_count,
            UsageKey::AiRequestsToday => self.ai_requests_today,
            UsageKey::CodeReviewsThisMonth => self.code_reviews_this_month,
            UsageKey::WorkspacesCount => self.workspaces_count,
            UsageKey::StorageUsedMb => self.storage_used_mb,
            UsageKey::ActiveSessions => self.active_sessions,
        }
    }
}

impl LimitKey {
    /// The usage counter that pairs with this quota.
    ///
    /// Call sites still pass both keys to the evaluator explicitly; this
    /// mapping exists so UI code listing all quotas doesn't restate it.
    #[must_use]
    pub fn usage_key(self) -> UsageKey {
        match self {
            Self::Projects => UsageKey::ProjectsCount,
            Self::Repositories => UsageKey::RepositoriesCount,
            Self::TeamMembers => UsageKey::TeamMembersCount,
            Self::AiRequestsPerDay => UsageKey::AiRequestsToday,
            Self::CodeReviewsPerMonth => UsageKey::CodeReviewsThisMonth,
            Self::Workspaces => UsageKey::WorkspacesCount,
            Self::StorageMb => UsageKey::StorageUsedMb,
            Self::ConcurrentSessions => UsageKey::ActiveSessions,
        }
    }

    /// All quota keys.
    pub const ALL: [LimitKey; 8] = [
        Self::Projects,
        Self::Repositories,
        Self::TeamMembers,
        Self::AiRequestsPerDay,
        Self::CodeReviewsPerMonth,
        Self::Workspaces,
        Self::StorageMb,
        Self::ConcurrentSessions,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capped() -> PlanLimits {
        PlanLimits {
            projects: 5,
            repositories: 3,
            team_members: 1,
            ai_requests_per_day: 50,
            code_reviews_per_month: 10,
            workspaces: 1,
            storage_mb: 512,
            concurrent_sessions: 2,
        }
    }

    #[test]
    fn test_get_by_key() {
        let limits = capped();
        assert_eq!(limits.get(LimitKey::Projects), 5);
        assert_eq!(limits.get(LimitKey::StorageMb), 512);
        assert!(!limits.is_unlimited(LimitKey::Projects));
    }

    #[test]
    fn test_unlimited() {
        let limits = PlanLimits::unlimited();
        for key in LimitKey::ALL {
            assert_eq!(limits.get(key), UNLIMITED);
            assert!(limits.is_unlimited(key));
        }
    }

    #[test]
    fn test_usage_defaults_to_missing() {
        let usage = UsageTracking::default();
        assert_eq!(usage.get(UsageKey::ProjectsCount), None);
        assert_eq!(usage.get(UsageKey::StorageUsedMb), None);
    }

    #[test]
    fn test_usage_deserializes_partial_payload() {
        // Backend omits counters it doesn't track for this account.
        let usage: UsageTracking =
            serde_json::from_str(r#"{"projects_count": 3, "storage_used_mb": 100}"#).unwrap();
        assert_eq!(usage.get(UsageKey::ProjectsCount), Some(3));
        assert_eq!(usage.get(UsageKey::StorageUsedMb), Some(100));
        assert_eq!(usage.get(UsageKey::TeamMembersCount), None);
    }

    #[test]
    fn test_limit_usage_pairing_is_total() {
        // Every quota maps to exactly one counter.
        let mut seen = std::collections::HashSet::new();
        for key in LimitKey::ALL {
            assert!(seen.insert(key.usage_key()));
        }
        assert_eq!(seen.len(), LimitKey::ALL.len());
    }
}
