//! Async retry with exponential backoff

use std::future::Future;
use std::time::Duration;

/// Default attempts for outbound catalog requests
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay in milliseconds, doubled after every failed attempt
pub const DEFAULT_BASE_DELAY_MS: u64 = 250;

/// Run `operation` until it succeeds, fails with an error `is_transient`
/// rejects, or `max_attempts` is reached. The last error is returned.
pub async fn retry_transient<T, E, F, Fut, P>(
    max_attempts: u32,
    base_delay_ms: u64,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts || !is_transient(&e) => return Err(e),
            Err(e) => {
                let delay = Duration::from_millis(
                    base_delay_ms.saturating_mul(2_u64.saturating_pow(attempt - 1)),
                );
                tracing::warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after transient error"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn always(_: &&str) -> bool {
        true
    }

    #[tokio::test]
    async fn returns_first_success() {
        let result = retry_transient(3, 1, always, || async { Ok::<_, &str>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(3, 1, always, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err("timeout") } else { Ok(n) } }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_on_permanent_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = retry_transient(
            5,
            1,
            |e: &&str| *e != "unauthorized",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("unauthorized") }
            },
        )
        .await;

        assert_eq!(result, Err("unauthorized"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = retry_transient(3, 1, always, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("unavailable") }
        })
        .await;

        assert_eq!(result, Err("unavailable"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
