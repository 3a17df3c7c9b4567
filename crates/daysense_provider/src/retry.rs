use rand::{RngExt, rng};
use std::time::Duration;

/// A simple retry policy with exponential backoff and jitter.
///
/// Only errors the caller classifies as transient are retried; terminal
/// errors (authorization, unavailable store) are returned immediately.
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub async fn retry_async<F, Fut, T, E, P>(&self, mut f: F, mut transient: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        P: FnMut(&E) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries || !transient(&e) {
                        return Err(e);
                    }
                    // exponential backoff with jitter; the thread-local RNG
                    // must not be held across the await
                    let max_delay = self.base_delay * (1u32 << attempt);
                    let jitter = rng().random_range(0..max_delay.as_millis() as u64);
                    tokio::time::sleep(Duration::from_millis(jitter)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn retry_succeeds_after_transient_failures() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        };
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = policy
            .retry_async(
                move || {
                    let c = c.clone();
                    async move {
                        let prev = c.fetch_add(1, Ordering::SeqCst) + 1;
                        if prev < 3 { Err("fail") } else { Ok(42) }
                    }
                },
                |_| true,
            )
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    // Spawning moves the retrying future onto the runtime, which requires
    // it to be Send even across the backoff sleeps.
    #[tokio::test]
    async fn retrying_future_can_cross_task_boundaries() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let handle = tokio::spawn(async move {
            let policy = RetryPolicy {
                max_retries: 3,
                base_delay: Duration::from_millis(1),
            };
            policy
                .retry_async(
                    move || {
                        let c = c.clone();
                        async move {
                            if c.fetch_add(1, Ordering::SeqCst) < 2 {
                                Err("fail")
                            } else {
                                Ok(7)
                            }
                        }
                    },
                    |_| true,
                )
                .await
        });
        assert_eq!(handle.await.unwrap().unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_errors_are_not_retried() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        };
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, &str> = policy
            .retry_async(
                move || {
                    let c = c.clone();
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err("denied")
                    }
                },
                |_| false,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
