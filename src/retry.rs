//! Bounded fixed-interval polling.
//!
//! Cancel-all confirmation is a poll-until-accepted wait against the store.
//! The policy is injectable so tests can run it under a paused clock and real
//! deployments can tune the window (default 20 x 100ms, ~2s).

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Poll `probe` until it reports true or attempts run out. Probe errors
    /// are logged and count as a failed attempt; the poll keeps going.
    pub async fn wait_until<F, Fut, E>(&self, mut probe: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
        E: Display,
    {
        let mut attempts = 0;
        loop {
            match probe().await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(err) => error!(alert = "crit", %err, "confirmation probe failed"),
            }
            attempts += 1;
            if attempts > self.max_attempts {
                return false;
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_probe_turns_true() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let accepted = policy
            .wait_until(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<bool, String>(n >= 2) }
            })
            .await;
        assert!(accepted);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 5,
            interval: Duration::from_millis(100),
        };
        let accepted = policy
            .wait_until(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<bool, String>(false) }
            })
            .await;
        assert!(!accepted);
        // initial attempt plus max_attempts retries
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_errors_count_as_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            interval: Duration::from_millis(100),
        };
        let accepted = policy
            .wait_until(|| async { Err::<bool, String>("store offline".into()) })
            .await;
        assert!(!accepted);
    }
}
