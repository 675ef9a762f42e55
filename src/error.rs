//! Error types for the entitlement engine.
//!
//! The pure evaluation functions never return errors — they are total over
//! their documented input domain and fail closed. Errors only exist at the
//! async boundary: fetching the subscription snapshot, fetching the plan
//! catalog, and the mutating billing actions.

use crate::subscription::SubscriptionStatus;
use crate::tier::PlanTier;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlangateError>;

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" [HTTP {code}]"),
        None => String::new(),
    }
}

/// The main error type for backend and session operations.
#[derive(Debug, thiserror::Error)]
pub enum PlangateError {
    /// The billing backend rejected a request.
    #[error("Backend error{}: {message}", fmt_status(.status))]
    Backend {
        /// HTTP status, when the failure came from a response.
        status: Option<u16>,
        /// Backend-provided or transport-level description.
        message: String,
    },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The configured backend base URL is not usable.
    #[error("Invalid backend base URL: {0}")]
    InvalidBaseUrl(String),

    /// A response body could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// No subscription snapshot is loaded yet.
    #[error("No subscription snapshot available")]
    NoSubscription,

    /// A trial was requested but the current snapshot is not eligible.
    #[error("Trial not available for plan '{plan}' with status '{status}'")]
    TrialNotEligible {
        plan: PlanTier,
        status: SubscriptionStatus,
    },

    /// A tier was requested that the fetched catalog does not carry.
    #[error("Plan '{0}' is not present in the catalog")]
    PlanNotInCatalog(PlanTier),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl PlangateError {
    /// Check if this error is retryable by a generic calling layer.
    ///
    /// Rate limiting (429) and server errors (5xx) are retryable; everything
    /// else reflects request content or local state and is not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { status, .. } => {
                matches!(status, Some(429) | Some(500..=599))
            }
            Self::Transport(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlangateError::Backend {
            status: Some(402),
            message: "payment required".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error [HTTP 402]: payment required");

        let err = PlangateError::Backend {
            status: None,
            message: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error: connection reset");

        let err = PlangateError::TrialNotEligible {
            plan: PlanTier::Team,
            status: SubscriptionStatus::Active,
        };
        assert_eq!(
            err.to_string(),
            "Trial not available for plan 'team' with status 'active'"
        );
    }

    #[test]
    fn test_retryable_classification() {
        let rate_limited = PlangateError::Backend {
            status: Some(429),
            message: "slow down".to_string(),
        };
        assert!(rate_limited.is_retryable());

        let server_err = PlangateError::Backend {
            status: Some(503),
            message: "maintenance".to_string(),
        };
        assert!(server_err.is_retryable());

        let bad_request = PlangateError::Backend {
            status: Some(400),
            message: "bad plan".to_string(),
        };
        assert!(!bad_request.is_retryable());

        assert!(PlangateError::Transport("timed out".to_string()).is_retryable());
        assert!(!PlangateError::NoSubscription.is_retryable());
    }
}
