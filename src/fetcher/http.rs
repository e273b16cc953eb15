use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, info};

use crate::errors::ExploitDbError;

const USER_AGENT: &str = concat!("exploitdb/", env!("CARGO_PKG_VERSION"));

/// HTTP retrieval for the fetchers. Honors an optional proxy and GitHub's
/// rate-limit headers.
#[derive(Clone)]
pub struct FetchClient {
    client: reqwest::Client,
}

impl FetchClient {
    pub fn new(http_proxy: Option<&str>) -> Result<Self, ExploitDbError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60));
        if let Some(proxy) = http_proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ExploitDbError::Config(format!("Invalid http proxy {}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| ExploitDbError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// GET `url` and return the body. Non-200 responses are errors.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExploitDbError> {
        debug!(url, "Fetching");
        let resp = self.client.get(url).send().await
            .map_err(|e| ExploitDbError::Network(format!("HTTP error. err: {}, url: {}", e, url)))?;

        let header = |name: &str| resp.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

        let status = resp.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ExploitDbError::RateLimit {
                message: format!("status code: {}, url: {}", status, url),
                retry_after: announced_retry_after(
                    header("retry-after").as_deref(),
                    header("x-ratelimit-reset").as_deref(),
                    chrono::Utc::now().timestamp(),
                ),
            });
        }
        if status != StatusCode::OK {
            return Err(ExploitDbError::Network(format!("HTTP error. status code: {}, url: {}", status, url)));
        }

        if url.contains("github") {
            let wait = rate_limit_wait(
                header("x-ratelimit-remaining").as_deref(),
                header("x-ratelimit-reset").as_deref(),
                chrono::Utc::now().timestamp(),
            )?;
            if let Some(wait) = wait {
                info!(duration_secs = wait.as_secs(), "Sleep for GitHub rate limit");
                tokio::time::sleep(wait).await;
            }
        }

        let body = resp.bytes().await
            .map_err(|e| ExploitDbError::Network(format!("Failed to read body. err: {}, url: {}", e, url)))?;
        Ok(body.to_vec())
    }
}

/// Wait announced by a rate-limited response: `Retry-After` seconds, or the
/// `X-RateLimit-Reset` time. Unreadable values count as unannounced.
pub fn announced_retry_after(retry_after: Option<&str>, reset: Option<&str>, now: i64) -> Option<Duration> {
    if let Some(secs) = retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
        return Some(Duration::from_secs(secs));
    }
    reset
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|reset| Duration::from_secs((reset - now).max(0) as u64))
}

/// How long to pause given GitHub's rate-limit headers, if at all.
///
/// Pauses only when at most one request remains, until the reset time
/// (unix seconds). Unparseable headers are errors.
pub fn rate_limit_wait(
    remaining: Option<&str>,
    reset: Option<&str>,
    now: i64,
) -> Result<Option<Duration>, ExploitDbError> {
    if let Some(remaining) = remaining {
        let remaining: i64 = remaining.trim().parse().map_err(|_| {
            ExploitDbError::InvalidResponse(format!("Wrong http header X-Ratelimit-Remaining: {}", remaining))
        })?;
        if remaining > 1 {
            return Ok(None);
        }
    }
    match reset {
        Some(reset) => {
            let reset: i64 = reset.trim().parse().map_err(|_| {
                ExploitDbError::InvalidResponse(format!("Wrong http header X-Ratelimit-Reset: {}", reset))
            })?;
            Ok(Some(Duration::from_secs((reset - now).max(0) as u64)))
        }
        None => Ok(None),
    }
}
