//! Retentativa limitada com backoff exponencial em volta de um backend de completação.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::base::CompletionService;
use crate::conversation::Message;
use crate::types::config::RetryConfig;
use crate::SupportResult;

/// Tenta de novo falhas transitórias do backend envolvido.
pub struct RetryingCompletion<T: CompletionService> {
    inner: T,
    config: RetryConfig,
}

impl<T: CompletionService> RetryingCompletion<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Espera antes da retentativa número `attempt` (a partir de 0), com até 10% de jitter.
    fn compute_delay(&self, attempt: u32) -> Duration {
        let base =
            self.config.initial_delay_ms as f64 * self.config.backoff_multiplier.powi(attempt as i32);
        let jitter = base * 0.1 * rand::thread_rng().gen_range(0.0..=1.0);
        let delay = (base + jitter) as u64;
        Duration::from_millis(delay.min(self.config.max_delay_ms))
    }
}

#[async_trait]
impl<T: CompletionService> CompletionService for RetryingCompletion<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn complete(&self, history: &[Message]) -> SupportResult<String> {
        let mut attempt = 0;

        loop {
            match self.inner.complete(history).await {
                Ok(reply) => return Ok(reply),
                Err(e) if attempt < self.config.max_retries && e.is_transient() => {
                    let delay = self.compute_delay(attempt);
                    tracing::warn!(
                        backend = self.inner.name(),
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying completion request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SupportError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Falha `failures` vezes com o erro dado, depois tem sucesso.
    struct FlakyBackend {
        failures: u32,
        transient: bool,
        calls: AtomicU32,
    }

    impl FlakyBackend {
        fn new(failures: u32, transient: bool) -> Self {
            Self {
                failures,
                transient,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionService for FlakyBackend {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, _history: &[Message]) -> SupportResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                if self.transient {
                    Err(SupportError::CompletionTimeout("flaky".into()))
                } else {
                    Err(SupportError::CompletionMalformed("flaky".into(), "{}".into()))
                }
            } else {
                Ok("recovered".to_string())
            }
        }
    }

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let client = RetryingCompletion::new(FlakyBackend::new(2, true), fast_config(3));

        let reply = client.complete(&[]).await.unwrap();

        assert_eq!(reply, "recovered");
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let client = RetryingCompletion::new(FlakyBackend::new(10, true), fast_config(2));

        let result = client.complete(&[]).await;

        assert!(matches!(result, Err(SupportError::CompletionTimeout(_))));
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_permanent_failures() {
        let client = RetryingCompletion::new(FlakyBackend::new(1, false), fast_config(3));

        let result = client.complete(&[]).await;

        assert!(matches!(result, Err(SupportError::CompletionMalformed(_, _))));
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_is_capped() {
        let client = RetryingCompletion::new(
            FlakyBackend::new(0, true),
            RetryConfig {
                max_retries: 10,
                initial_delay_ms: 500,
                max_delay_ms: 2_000,
                backoff_multiplier: 2.0,
            },
        );

        assert!(client.compute_delay(0) >= Duration::from_millis(500));
        assert!(client.compute_delay(0) <= Duration::from_millis(550));
        assert_eq!(client.compute_delay(8), Duration::from_millis(2_000));
    }
}
