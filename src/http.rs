//! HTTP implementation of the billing backend.
//!
//! Production transport with retry logic for transient failures, secure
//! token handling, and idempotency keys on mutating requests.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::catalog::{PlanCatalog, PlanConfig};
use crate::client::{BillingBackend, CheckoutSession};
use crate::error::{PlangateError, Result};
use crate::subscription::{BillingCycle, Subscription};
use crate::tier::PlanTier;

/// Configuration for the HTTP backend client.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Maximum number of retry attempts for transient failures.
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            timeout_seconds: 30,
        }
    }
}

impl HttpBackendConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set base delay for exponential backoff.
    #[must_use]
    pub fn base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Set maximum delay between retries.
    #[must_use]
    pub fn max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// Set request timeout.
    #[must_use]
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// HTTP billing backend client.
///
/// The access token is held in a [`SecretString`] and never appears in
/// debug output. Transient failures (429, 5xx) are retried with
/// exponential backoff; mutating requests carry an `Idempotency-Key`
/// header so a retried request cannot double-apply.
///
/// # Example
///
/// ```rust,ignore
/// use plangate::{HttpBillingBackend, HttpBackendConfig, SubscriptionSession};
///
/// let backend = HttpBillingBackend::new(
///     "https://api.example.com",
///     token,
///     HttpBackendConfig::default(),
/// )?;
/// let session = SubscriptionSession::new(backend);
/// ```
pub struct HttpBillingBackend {
    http: reqwest::Client,
    base_url: url::Url,
    token: SecretString,
    config: HttpBackendConfig,
}

impl HttpBillingBackend {
    /// Create a new HTTP backend client.
    ///
    /// # Errors
    ///
    /// Returns [`PlangateError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, and [`PlangateError::Transport`] if the
    /// underlying client cannot be built.
    pub fn new(
        base_url: &str,
        token: impl Into<SecretString>,
        config: HttpBackendConfig,
    ) -> Result<Self> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| PlangateError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(PlangateError::InvalidBaseUrl(format!(
                "{base_url}: scheme must be http or https"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PlangateError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
            config,
        })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        self.base_url
            .join(path)
            .map_err(|e| PlangateError::InvalidBaseUrl(format!("{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        self.with_retries(path, || {
            self.http
                .get(url.clone())
                .bearer_auth(self.token.expose_secret())
        })
        .await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        // One key per logical operation: a retried attempt re-sends the
        // same key, so the backend can deduplicate.
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        self.with_retries(path, || {
            self.http
                .post(url.clone())
                .bearer_auth(self.token.expose_secret())
                .header("Idempotency-Key", &idempotency_key)
                .json(&body)
        })
        .await
    }

    async fn with_retries<T: DeserializeOwned>(
        &self,
        operation: &str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            match self.execute(build()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(
                        target: "plangate::http",
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying backend request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PlangateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(PlangateError::Backend {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PlangateError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self.config.base_delay_ms.saturating_mul(1_u64 << attempt.min(16));
        Duration::from_millis(exp.min(self.config.max_delay_ms))
    }
}

impl std::fmt::Debug for HttpBillingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBillingBackend")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BillingBackend for HttpBillingBackend {
    async fn fetch_subscription(&self) -> Result<Subscription> {
        self.get_json("/billing/subscription").await
    }

    async fn fetch_catalog(&self) -> Result<PlanCatalog> {
        let configs: Vec<PlanConfig> = self.get_json("/billing/plans").await?;
        Ok(PlanCatalog::from_configs(configs))
    }

    async fn create_checkout(
        &self,
        tier: PlanTier,
        cycle: BillingCycle,
    ) -> Result<CheckoutSession> {
        self.post_json(
            "/billing/checkout",
            serde_json::json!({ "plan": tier, "billing_cycle": cycle }),
        )
        .await
    }

    async fn cancel_subscription(&self) -> Result<()> {
        let _: serde_json::Value = self
            .post_json("/billing/cancel", serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn reactivate_subscription(&self) -> Result<()> {
        let _: serde_json::Value = self
            .post_json("/billing/reactivate", serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn start_trial(&self, tier: PlanTier) -> Result<()> {
        let _: serde_json::Value = self
            .post_json("/billing/trial", serde_json::json!({ "plan": tier }))
            .await?;
        Ok(())
    }
}
