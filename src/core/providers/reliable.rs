use super::response::{ModelRequest, ModelResponse};
use super::traits::Provider;
use crate::config::ReliabilityConfig;
use crate::error::ProviderError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF_MS: u64 = 60_000;

/// Provider wrapper that retries transient HTTP failures with exponential
/// backoff (`initial_delay_ms * exp_base^attempt`).
pub struct ReliableProvider {
    inner: Box<dyn Provider>,
    config: ReliabilityConfig,
}

impl ReliableProvider {
    pub fn new(inner: Box<dyn Provider>, config: ReliabilityConfig) -> Self {
        Self { inner, config }
    }

    fn is_retryable(&self, err: &anyhow::Error) -> bool {
        err.downcast_ref::<ProviderError>()
            .and_then(ProviderError::status)
            .is_some_and(|status| self.config.retry_status_codes.contains(&status))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.config.exp_base.max(1)).saturating_pow(attempt);
        let millis = self
            .config
            .initial_delay_ms
            .saturating_mul(factor)
            .min(MAX_BACKOFF_MS);
        Duration::from_millis(millis)
    }
}

impl Provider for ReliableProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn generate<'a>(
        &'a self,
        request: &'a ModelRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ModelResponse>> + Send + 'a>> {
        Box::pin(async move {
            let attempts = self.config.attempts.max(1);
            let mut attempt = 0_u32;

            loop {
                match self.inner.generate(request).await {
                    Ok(response) => {
                        if attempt > 0 {
                            tracing::info!(
                                provider = self.inner.name(),
                                attempt,
                                "provider recovered after retries"
                            );
                        }
                        return Ok(response);
                    }
                    Err(err) => {
                        attempt += 1;
                        if attempt >= attempts || !self.is_retryable(&err) {
                            return Err(err);
                        }
                        let delay = self.backoff(attempt - 1);
                        tracing::warn!(
                            provider = self.inner.name(),
                            attempt,
                            max_attempts = attempts,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            error = %err,
                            "retrying provider request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::response::Content;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        failures: Mutex<Vec<u16>>,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn failing_with(statuses: &[u16]) -> Self {
            Self {
                failures: Mutex::new(statuses.iter().rev().copied().collect()),
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate<'a>(
            &'a self,
            _request: &'a ModelRequest,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<ModelResponse>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::Relaxed);
                let next = self.failures.lock().unwrap().pop();
                match next {
                    Some(status) => Err(ProviderError::Http {
                        provider: "scripted".into(),
                        status,
                        message: "boom".into(),
                    }
                    .into()),
                    None => Ok(ModelResponse::text_only("ok")),
                }
            })
        }
    }

    fn fast_config(attempts: u32) -> ReliabilityConfig {
        ReliabilityConfig {
            attempts,
            initial_delay_ms: 1,
            exp_base: 2,
            retry_status_codes: vec![429, 500, 503, 504],
        }
    }

    fn request() -> ModelRequest {
        ModelRequest::new("m", vec![Content::user("hi")])
    }

    #[tokio::test]
    async fn retries_listed_statuses_until_success() {
        let inner = ScriptedProvider::failing_with(&[503, 429]);
        let provider = ReliableProvider::new(Box::new(inner), fast_config(5));
        let response = provider.generate(&request()).await.unwrap();
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let provider =
            ReliableProvider::new(Box::new(ScriptedProvider::failing_with(&[400])), fast_config(5));
        let err = provider.generate(&request()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ProviderError>().and_then(ProviderError::status),
            Some(400)
        );
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let provider = ReliableProvider::new(
            Box::new(ScriptedProvider::failing_with(&[500, 500, 500, 500])),
            fast_config(3),
        );
        assert!(provider.generate(&request()).await.is_err());
    }

    #[test]
    fn backoff_grows_exponentially_and_is_capped() {
        let config = ReliabilityConfig {
            attempts: 5,
            initial_delay_ms: 1000,
            exp_base: 7,
            retry_status_codes: vec![],
        };
        let provider =
            ReliableProvider::new(Box::new(ScriptedProvider::failing_with(&[])), config);
        assert_eq!(provider.backoff(0), Duration::from_millis(1000));
        assert_eq!(provider.backoff(1), Duration::from_millis(7000));
        assert_eq!(provider.backoff(2), Duration::from_millis(49_000));
        assert_eq!(provider.backoff(3), Duration::from_millis(MAX_BACKOFF_MS));
    }
}
