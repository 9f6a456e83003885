//! Retry with exponential backoff for JSON-RPC HTTP calls.
//!
//! Retries only on transport errors (connection failures, timeouts).
//! HTTP status and JSON-RPC errors are returned to the caller unretried,
//! since a reverted call or a rejected transaction will not succeed on
//! a second attempt.

use std::time::Duration;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Send an HTTP request, retrying transport failures up to `max_retries` times.
///
/// The closure `f` is called at most `max_retries + 1` times.
pub(crate) async fn retry_send<F, Fut>(
    max_retries: u32,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..max_retries {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS.saturating_mul(1 << attempt.min(16)));
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    "JSON-RPC request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    f().await
}
