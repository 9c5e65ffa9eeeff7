//! Retry logic with exponential backoff for upstream HTTP calls.
//!
//! Retries only on transport errors. A request that may have reached the
//! server (timeout, broken connection) is retried only when it is
//! idempotent: replaying a credential issuance could mint a second credential.
//! Non-2xx responses are returned to the caller without retry.

use std::time::Duration;

/// Maximum number of retry attempts after the initial request.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Whether replaying a request is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Any transport failure may be retried.
    Safe,
    /// Only failures where the request never left (connect errors) may be
    /// retried.
    ConnectOnly,
}

impl Replay {
    fn allows(self, err: &reqwest::Error) -> bool {
        match self {
            Self::Safe => true,
            Self::ConnectOnly => err.is_connect(),
        }
    }
}

/// Send an HTTP request with exponential backoff retry on transport errors.
///
/// The closure `f` is called up to `MAX_RETRIES + 1` times.
pub(crate) async fn retry_send<F, Fut>(
    endpoint: &str,
    replay: Replay,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) if replay.allows(&e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    endpoint,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "upstream request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
    f().await
}
