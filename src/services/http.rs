use isahc::{config::Configurable, prelude::*, HttpClient};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

use crate::constants::{MAX_RETRIES, REQUEST_DELAY_MS, REQUEST_TIMEOUT_SECS};
use crate::error::{Error, Result};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15",
];

/// HTTP session shared by both source clients
///
/// Requests are strictly sequential: a politeness delay is enforced
/// between consecutive requests, and transient failures (429, 5xx,
/// network errors) are retried with exponential backoff plus jitter.
/// Other client errors fail immediately so a broken security does not
/// burn the retry budget.
pub struct HttpSession {
    client: HttpClient,
    delay: Duration,
    random_agent: bool,
}

impl HttpSession {
    pub fn new() -> Result<Self> {
        Self::with_delay(Duration::from_millis(REQUEST_DELAY_MS))
    }

    pub fn with_delay(delay: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect_policy(isahc::config::RedirectPolicy::Limit(5))
            .build()?;

        Ok(Self {
            client,
            delay,
            random_agent: true,
        })
    }

    fn user_agent(&self) -> &'static str {
        if self.random_agent {
            let idx = rand::random::<usize>() % USER_AGENTS.len();
            USER_AGENTS[idx]
        } else {
            USER_AGENTS[0]
        }
    }

    /// GET a page and return its body as text
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let body = self
            .send_with_retry(url, || {
                isahc::Request::builder()
                    .uri(url)
                    .method("GET")
                    .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
                    .header("Accept-Language", "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7")
                    .header("User-Agent", self.user_agent())
                    .body(())
                    .map_err(|e| Error::Network(format!("Request build error: {}", e)))
            })
            .await?;
        Ok(body)
    }

    /// POST a JSON payload and parse the JSON response
    pub async fn post_json(&self, url: &str, payload: &Value) -> Result<Value> {
        let body_text = serde_json::to_string(payload)?;
        let body = self
            .send_with_retry(url, || {
                isahc::Request::builder()
                    .uri(url)
                    .method("POST")
                    .header("Accept", "application/json, text/plain, */*")
                    .header("Accept-Language", "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7")
                    .header("Content-Type", "application/json")
                    .header("User-Agent", self.user_agent())
                    .body(body_text.clone())
                    .map_err(|e| Error::Network(format!("Request build error: {}", e)))
            })
            .await?;

        serde_json::from_str(&body).map_err(|e| Error::Parse(format!("JSON response error: {}", e)))
    }

    async fn send_with_retry<B, F>(&self, url: &str, build: F) -> Result<String>
    where
        B: Into<isahc::AsyncBody>,
        F: Fn() -> Result<isahc::Request<B>>,
    {
        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let backoff = 2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>();
                let backoff = Duration::from_secs_f64(backoff).min(Duration::from_secs(30));
                let reason = last_error.as_deref().unwrap_or("unknown error");
                tracing::info!(
                    "Retry {}/{} for {} - reason: {}, waiting {:.1}s",
                    attempt + 1,
                    MAX_RETRIES,
                    url,
                    reason,
                    backoff.as_secs_f64()
                );
                sleep(backoff).await;
            }

            // Politeness delay between consecutive requests
            sleep(self.delay).await;

            let request = build()?;
            match self.client.send_async(request).await {
                Ok(mut resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        return resp
                            .text()
                            .await
                            .map_err(|e| Error::Network(format!("Response body error: {}", e)));
                    }

                    let reason = status.canonical_reason().unwrap_or("Unknown");
                    if status == 429 || status == 403 || status.is_server_error() {
                        last_error = Some(format!("HTTP {} - {}", status.as_u16(), reason));
                        continue;
                    }

                    // Remaining 4xx: the request itself is wrong, do not retry
                    return Err(Error::Network(format!(
                        "HTTP {} - {} for {}",
                        status.as_u16(),
                        reason,
                        url
                    )));
                }
                Err(e) => {
                    last_error = Some(format!("Network error: {}", e));
                    continue;
                }
            }
        }

        Err(Error::Network(format!(
            "Max retries exceeded for {}: {}",
            url,
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}
