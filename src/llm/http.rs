//! Shared request plumbing for provider clients: status classification,
//! JSON decoding and retry with linear backoff.

use crate::llm::{LlmError, LlmProvider};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Delay unit between retries; attempt `n` waits `n` units
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Longest error body kept in `LlmError::Status`
const MAX_ERROR_BODY: usize = 512;

/// Sends a request built by `build`, retrying transient failures
///
/// `build` is called once per attempt because a `RequestBuilder` is consumed
/// by `send`. At most `max_retries + 1` requests are made.
pub(crate) async fn send_with_retries<T, F>(
    provider: LlmProvider,
    max_retries: u32,
    build: F,
) -> Result<T, LlmError>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        match send_once(provider, build()).await {
            Ok(reply) => return Ok(reply),
            Err(err) if err.is_transient() && attempt < max_retries => {
                attempt += 1;
                let delay = RETRY_BACKOFF * attempt;
                tracing::warn!(
                    "{} request failed (attempt {}/{}): {}; retrying in {:?}",
                    provider,
                    attempt,
                    max_retries + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn send_once<T: DeserializeOwned>(
    provider: LlmProvider,
    request: RequestBuilder,
) -> Result<T, LlmError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        return Err(LlmError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| LlmError::Decode {
        provider,
        message: e.to_string(),
    })
}
