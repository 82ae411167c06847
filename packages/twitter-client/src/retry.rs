//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, TwitterError};

/// Maximum number of attempts for any single API call.
pub const API_RETRY_MAX: u32 = 15;

/// Delay before the attempt that follows the `attempt`-th failure
/// (0-based): 1s, 2s, 4s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Run `op` up to `max_attempts` times.
///
/// A transient failure (see [`TwitterError::is_transient`]) sleeps
/// `backoff_delay(i)` and tries again; exhausting the ceiling returns
/// [`TwitterError::RetriesExhausted`] wrapping the final failure. A fatal
/// error aborts without retrying.
pub(crate) async fn with_backoff<T, F, Fut>(max_attempts: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < max_attempts => {
                let delay = backoff_delay(attempt);
                tracing::debug!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "retrying api call"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) if err.is_transient() => {
                return Err(TwitterError::RetriesExhausted {
                    attempts: max_attempts,
                    source: Box::new(err),
                });
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> TwitterError {
        TwitterError::Api {
            status: 503,
            message: "over capacity".into(),
        }
    }

    #[test]
    fn backoff_doubles_from_one_second() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(4), Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(API_RETRY_MAX, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n + 1 < API_RETRY_MAX {
                    Err(transient())
                } else {
                    Ok("fetched")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "fetched");
        assert_eq!(calls.load(Ordering::SeqCst), API_RETRY_MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_the_ceiling_is_fatal() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_backoff(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(TwitterError::RetriesExhausted { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_backoff(5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TwitterError::Decode("bad body".into())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(TwitterError::Decode(_))));
    }
}
