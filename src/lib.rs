//! Plangate - subscription entitlements for SaaS applications
//!
//! Plangate is the decision layer between a billing backend and the UI:
//! given a subscription snapshot, it answers which plan a user is on,
//! which features and quotas apply, whether usage is within limits,
//! whether a plan change is an upgrade or a downgrade, and whether the
//! user may start a trial.
//!
//! # Design
//!
//! - **Pure evaluation**: every entitlement check is a synchronous, total
//!   function over the snapshot. Missing data fails closed.
//! - **Snapshots, not state**: the backend is the sole writer of
//!   subscription state. The client fetches, derives, and refetches; it
//!   never computes a new subscription locally.
//! - **One session per user**: [`SubscriptionSession`] wraps the latest
//!   snapshot, exposes derived flags, and runs billing actions as a
//!   request followed by a full refetch.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use plangate::{
//!     Feature, HttpBackendConfig, HttpBillingBackend, LimitKey, SubscriptionSession, UsageKey,
//! };
//!
//! #[tokio::main]
//! async fn main() -> plangate::Result<()> {
//!     plangate::init_tracing();
//!
//!     let backend = HttpBillingBackend::new(
//!         "https://api.example.com",
//!         std::env::var("PLANGATE_API_TOKEN").unwrap_or_default(),
//!         HttpBackendConfig::default(),
//!     )?;
//!
//!     let session = SubscriptionSession::new(backend);
//!     session.bootstrap().await?;
//!
//!     if session.has_feature(Feature::AiCodeReview)
//!         && session.is_within_limit(LimitKey::CodeReviewsPerMonth, UsageKey::CodeReviewsThisMonth)
//!     {
//!         // run the review
//!     }
//!     Ok(())
//! }
//! ```

mod catalog;
mod client;
mod entitlements;
mod error;
mod features;
mod format;
#[cfg(feature = "http-backend")]
mod http;
mod limits;
mod session;
mod subscription;
mod tier;

// Re-exports for public API
pub use catalog::{PlanCatalog, PlanCatalogBuilder, PlanConfig, PlanConfigBuilder};
pub use client::{BillingBackend, CheckoutSession};
pub use entitlements::{
    can_start_trial, check_limit, has_feature, is_within_limit, remaining_quota,
    upgrade_needed_for, usage_level, usage_percentage, LimitCheckResult, UsageLevel,
    UsageThresholds,
};
pub use error::{PlangateError, Result};
pub use features::{Feature, FeatureGates, PlanFeatures};
pub use format::{format_limit, format_price_cents, format_quota, format_storage_mb};
#[cfg(feature = "http-backend")]
pub use http::{HttpBackendConfig, HttpBillingBackend};
pub use limits::{LimitKey, PlanLimits, UsageKey, UsageTracking, UNLIMITED};
pub use session::{FetchState, SubscriptionSession};
pub use subscription::{BillingCycle, Subscription, SubscriptionStatus};
pub use tier::{PlanChange, PlanTier};

// Test exports
#[cfg(any(test, feature = "test-backend"))]
pub use client::test::MockBillingBackend;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, before constructing a
/// session.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "plangate=debug")
/// - `PLANGATE_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("PLANGATE_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
