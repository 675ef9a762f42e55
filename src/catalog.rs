//! Plan catalog: per-tier descriptive configuration.
//!
//! Catalog metadata is independent of any specific user's subscription and
//! drives plan-comparison UI. It is normally fetched from the backend, but
//! a [`PlanCatalog::standard`] definition exists for offline rendering and
//! tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use plangate::{PlanCatalog, PlanTier};
//!
//! let catalog = PlanCatalog::builder()
//!     .plan(PlanTier::Free)
//!         .name("Free")
//!         .tagline("Get started")
//!         .monthly_price_cents(0)
//!         .done()
//!     .plan(PlanTier::Team)
//!         .name("Team")
//!         .tagline("For growing teams")
//!         .monthly_price_cents(4900)
//!         .yearly_price_cents(49900)
//!         .popular(true)
//!         .done()
//!     .build();
//!
//! let upgrades = catalog.upgrades_from(PlanTier::Free);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::features::PlanFeatures;
use crate::limits::{PlanLimits, UNLIMITED};
use crate::tier::PlanTier;

/// Catalog entry for a single tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// The tier this entry describes.
    pub tier: PlanTier,
    /// Display name.
    pub name: String,
    /// Short marketing line.
    #[serde(default)]
    pub tagline: String,
    /// Monthly price in cents.
    pub monthly_price_cents: i64,
    /// Yearly price in cents (for the whole year).
    pub yearly_price_cents: i64,
    /// Quotas granted by this tier.
    pub limits: PlanLimits,
    /// Features granted by this tier.
    pub features: PlanFeatures,
    /// Highlighted as the recommended choice.
    #[serde(default)]
    pub popular: bool,
    /// Pricing is negotiated; checkout routes to sales.
    #[serde(default)]
    pub contact_sales: bool,
}

impl PlanConfig {
    /// Percentage saved by paying yearly instead of twelve monthly cycles.
    ///
    /// Zero when the plan is free or yearly isn't cheaper.
    #[must_use]
    pub fn yearly_saving_percent(&self) -> u8 {
        let full_year = self.monthly_price_cents * 12;
        if full_year <= 0 || self.yearly_price_cents >= full_year {
            return 0;
        }
        let saving = (full_year - self.yearly_price_cents) as f64 / full_year as f64 * 100.0;
        saving.round() as u8
    }
}

/// The full set of plan configurations, keyed by tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanCatalog {
    plans: BTreeMap<PlanTier, PlanConfig>,
}

impl PlanCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing a catalog.
    #[must_use]
    pub fn builder() -> PlanCatalogBuilder {
        PlanCatalogBuilder::default()
    }

    /// Build a catalog from a fetched list of configs.
    ///
    /// Later entries for the same tier overwrite earlier ones.
    #[must_use]
    pub fn from_configs(configs: Vec<PlanConfig>) -> Self {
        let plans = configs.into_iter().map(|c| (c.tier, c)).collect();
        Self { plans }
    }

    /// Get the config for a tier.
    #[must_use]
    pub fn get(&self, tier: PlanTier) -> Option<&PlanConfig> {
        self.plans.get(&tier)
    }

    /// Check if a tier is present.
    #[must_use]
    pub fn contains(&self, tier: PlanTier) -> bool {
        self.plans.contains_key(&tier)
    }

    /// Number of configured tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Iterate configs in hierarchy order.
    pub fn iter(&self) -> impl Iterator<Item = &PlanConfig> {
        self.plans.values()
    }

    /// Configs a user on `current` could upgrade to, in hierarchy order.
    #[must_use]
    pub fn upgrades_from(&self, current: PlanTier) -> Vec<&PlanConfig> {
        self.plans
            .values()
            .filter(|c| current.can_upgrade_to(c.tier))
            .collect()
    }

    /// Configs a user on `current` could downgrade to, in hierarchy order.
    #[must_use]
    pub fn downgrades_from(&self, current: PlanTier) -> Vec<&PlanConfig> {
        self.plans
            .values()
            .filter(|c| current.can_downgrade_to(c.tier))
            .collect()
    }

    /// The standard five-tier catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .plan(PlanTier::Free)
                .name("Free")
                .tagline("Try the basics, no card required")
                .monthly_price_cents(0)
                .yearly_price_cents(0)
                .limits(PlanLimits {
                    projects: 3,
                    repositories: 3,
                    team_members: 1,
                    ai_requests_per_day: 10,
                    code_reviews_per_month: 5,
                    workspaces: 1,
                    storage_mb: 512,
                    concurrent_sessions: 1,
                })
                .features(PlanFeatures::none())
                .done()
            .plan(PlanTier::FreeTrial)
                .name("Trial")
                .tagline("Everything in the trialed plan, for two weeks")
                .monthly_price_cents(0)
                .yearly_price_cents(0)
                .limits(PlanLimits {
                    projects: 10,
                    repositories: 10,
                    team_members: 5,
                    ai_requests_per_day: 100,
                    code_reviews_per_month: 50,
                    workspaces: 3,
                    storage_mb: 5_120,
                    concurrent_sessions: 3,
                })
                .features(PlanFeatures {
                    github_integration: true,
                    ai_code_review: true,
                    ..PlanFeatures::none()
                })
                .done()
            .plan(PlanTier::Individual)
                .name("Individual")
                .tagline("For solo developers")
                .monthly_price_cents(1_200)
                .yearly_price_cents(12_000)
                .limits(PlanLimits {
                    projects: 25,
                    repositories: 25,
                    team_members: 1,
                    ai_requests_per_day: 200,
                    code_reviews_per_month: 100,
                    workspaces: 5,
                    storage_mb: 20_480,
                    concurrent_sessions: 3,
                })
                .features(PlanFeatures {
                    github_integration: true,
                    ai_code_review: true,
                    priority_support: true,
                    ..PlanFeatures::none()
                })
                .done()
            .plan(PlanTier::Team)
                .name("Team")
                .tagline("For teams shipping together")
                .monthly_price_cents(4_900)
                .yearly_price_cents(49_900)
                .popular(true)
                .limits(PlanLimits {
                    projects: 100,
                    repositories: 100,
                    team_members: 25,
                    ai_requests_per_day: 1_000,
                    code_reviews_per_month: 500,
                    workspaces: 20,
                    storage_mb: 102_400,
                    concurrent_sessions: 10,
                })
                .features(PlanFeatures {
                    github_integration: true,
                    ai_code_review: true,
                    team_collaboration: true,
                    priority_support: true,
                    advanced_analytics: true,
                    custom_workflows: true,
                    ..PlanFeatures::none()
                })
                .done()
            .plan(PlanTier::Enterprise)
                .name("Enterprise")
                .tagline("Security, scale, and support for organizations")
                .monthly_price_cents(19_900)
                .yearly_price_cents(199_000)
                .contact_sales(true)
                .limits(PlanLimits {
                    projects: UNLIMITED,
                    repositories: UNLIMITED,
                    team_members: UNLIMITED,
                    ai_requests_per_day: UNLIMITED,
                    code_reviews_per_month: UNLIMITED,
                    workspaces: UNLIMITED,
                    storage_mb: UNLIMITED,
                    concurrent_sessions: UNLIMITED,
                })
                .features(PlanFeatures::all())
                .done()
            .build()
    }
}

/// Builder for a [`PlanCatalog`].
#[derive(Debug, Default)]
pub struct PlanCatalogBuilder {
    plans: BTreeMap<PlanTier, PlanConfig>,
}

impl PlanCatalogBuilder {
    /// Start defining a plan for `tier`.
    #[must_use]
    pub fn plan(self, tier: PlanTier) -> PlanConfigBuilder {
        PlanConfigBuilder {
            parent: self,
            tier,
            name: tier.display_name().to_string(),
            tagline: String::new(),
            monthly_price_cents: 0,
            yearly_price_cents: 0,
            limits: PlanLimits::unlimited(),
            features: PlanFeatures::none(),
            popular: false,
            contact_sales: false,
        }
    }

    /// Finish the catalog.
    #[must_use]
    pub fn build(self) -> PlanCatalog {
        PlanCatalog { plans: self.plans }
    }

    fn add(mut self, config: PlanConfig) -> Self {
        self.plans.insert(config.tier, config);
        self
    }
}

/// Builder for a single [`PlanConfig`].
#[derive(Debug)]
pub struct PlanConfigBuilder {
    parent: PlanCatalogBuilder,
    tier: PlanTier,
    name: String,
    tagline: String,
    monthly_price_cents: i64,
    yearly_price_cents: i64,
    limits: PlanLimits,
    features: PlanFeatures,
    popular: bool,
    contact_sales: bool,
}

impl PlanConfigBuilder {
    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the tagline.
    #[must_use]
    pub fn tagline(mut self, tagline: &str) -> Self {
        self.tagline = tagline.to_string();
        self
    }

    /// Set the monthly price in cents.
    #[must_use]
    pub fn monthly_price_cents(mut self, cents: i64) -> Self {
        self.monthly_price_cents = cents;
        self
    }

    /// Set the yearly price in cents.
    #[must_use]
    pub fn yearly_price_cents(mut self, cents: i64) -> Self {
        self.yearly_price_cents = cents;
        self
    }

    /// Set the quota set.
    #[must_use]
    pub fn limits(mut self, limits: PlanLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the feature flags.
    #[must_use]
    pub fn features(mut self, features: PlanFeatures) -> Self {
        self.features = features;
        self
    }

    /// Mark as the recommended plan.
    #[must_use]
    pub fn popular(mut self, popular: bool) -> Self {
        self.popular = popular;
        self
    }

    /// Route checkout to sales.
    #[must_use]
    pub fn contact_sales(mut self, contact_sales: bool) -> Self {
        self.contact_sales = contact_sales;
        self
    }

    /// Finish this plan and return to the catalog builder.
    #[must_use]
    pub fn done(self) -> PlanCatalogBuilder {
        let config = PlanConfig {
            tier: self.tier,
            name: self.name,
            tagline: self.tagline,
            monthly_price_cents: self.monthly_price_cents,
            yearly_price_cents: self.yearly_price_cents,
            limits: self.limits,
            features: self.features,
            popular: self.popular,
            contact_sales: self.contact_sales,
        };
        self.parent.add(config)
    }
}
