use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{config, error::DiscoveryError};

/// Retry budget and timing for one call path.
///
/// A single bounded budget covers both kinds of retry: every attempt counts,
/// whether it ended in a 429 or in a transient failure.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of requests this call may issue, first one included.
    pub max_attempts: u32,
    /// Retry 5xx responses and transport errors with exponential back-off.
    pub retry_transient: bool,
    /// Attempt `k` waits `backoff_unit * 2^k` before the next one.
    pub backoff_unit: Duration,
    /// Wait used when a 429 carries no usable `Retry-After`.
    pub default_retry_after: Duration,
    /// A `Retry-After` above this gives up instead of sleeping.
    pub max_retry_after: Duration,
}

impl RetryPolicy {
    /// Genre seeds: a few 429 retries, everything else degrades to "no seeds".
    pub fn genre_seeds() -> Self {
        Self {
            max_attempts: 3,
            retry_transient: false,
            backoff_unit: Duration::from_secs(1),
            default_retry_after: Duration::from_secs(5),
            max_retry_after: Duration::from_secs(120),
        }
    }

    /// Per-track audio features: 429 and transient failures retried, back-off
    /// 2, 4, 8, 16 seconds across five attempts.
    pub fn audio_features() -> Self {
        Self {
            max_attempts: 5,
            retry_transient: true,
            backoff_unit: Duration::from_secs(1),
            default_retry_after: Duration::from_secs(1),
            max_retry_after: Duration::from_secs(120),
        }
    }

    /// Search pages, analysis and track details: only 429 is retried.
    pub fn pagination() -> Self {
        Self {
            max_attempts: 5,
            retry_transient: false,
            backoff_unit: Duration::from_secs(1),
            default_retry_after: Duration::from_secs(1),
            max_retry_after: Duration::from_secs(120),
        }
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Classification of a single request.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Response),
    RateLimited { retry_after: Option<Duration> },
    Transient(DiscoveryError),
    Fatal(DiscoveryError),
}

/// Bearer-authorized access to the catalog API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for the API configured in `SPOTIFY_API_URL`.
    pub fn from_env() -> Self {
        Self::new(config::spotify_apiurl())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issues one GET and classifies the result. Never retries.
    pub async fn fetch(&self, url: &str, token: &str) -> FetchOutcome {
        let response = match self.http.get(url).bearer_auth(token).send().await {
            Ok(response) => response,
            Err(err) if err.is_builder() => {
                return FetchOutcome::Fatal(DiscoveryError::NetworkFailure(err));
            }
            Err(err) => return FetchOutcome::Transient(DiscoveryError::NetworkFailure(err)),
        };

        let status = response.status();
        if status.is_success() {
            return FetchOutcome::Success(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return FetchOutcome::RateLimited {
                retry_after: retry_after(&response),
            };
        }

        let err = DiscoveryError::RemoteError {
            status: status.as_u16(),
            url: url.to_string(),
        };
        if err.is_transient() {
            FetchOutcome::Transient(err)
        } else {
            FetchOutcome::Fatal(err)
        }
    }

    /// Fetches `url` and decodes the body as `T`, retrying per `policy`.
    ///
    /// # Errors
    ///
    /// - `RateLimited` when the budget runs out on a 429, or the server asks
    ///   for a wait longer than `policy.max_retry_after`
    /// - `NetworkFailure` / `RemoteError` for failures that are not retried or
    ///   that outlived the budget
    /// - `MalformedPayload` when the body does not match `T`
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        policy: &RetryPolicy,
    ) -> Result<T, DiscoveryError> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let wait = match self.fetch(url, token).await {
                FetchOutcome::Success(response) => return decode(url, response).await,
                FetchOutcome::Fatal(err) => return Err(err),
                FetchOutcome::RateLimited { retry_after } => {
                    let wait = retry_after.unwrap_or(policy.default_retry_after);
                    if wait > policy.max_retry_after {
                        warn!(
                            url,
                            retry_after_secs = wait.as_secs(),
                            "retry-after is abnormally high, giving up"
                        );
                        return Err(DiscoveryError::RateLimited { attempts: attempt });
                    }
                    if attempt >= max_attempts {
                        return Err(DiscoveryError::RateLimited { attempts: attempt });
                    }
                    warn!(
                        url,
                        attempt,
                        retry_after_ms = wait.as_millis() as u64,
                        "rate limited, retrying"
                    );
                    wait
                }
                FetchOutcome::Transient(err) => {
                    if !policy.retry_transient || attempt >= max_attempts {
                        return Err(err);
                    }
                    let wait = policy.backoff(attempt);
                    warn!(
                        url,
                        attempt,
                        backoff_ms = wait.as_millis() as u64,
                        error = %err,
                        "request failed, backing off"
                    );
                    wait
                }
            };

            sleep(wait).await;
        }
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    let seconds = response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()?;

    if seconds.is_finite() && seconds >= 0.0 {
        // too large to represent still has to trip `max_retry_after`
        Some(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX))
    } else {
        None
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, DiscoveryError> {
    let body = response.text().await?;
    debug!(url, bytes = body.len(), "response received");

    serde_json::from_str(&body).map_err(|e| DiscoveryError::MalformedPayload {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
