//! Rate-limited HTTP fetcher
//!
//! This module handles all HTTP traffic for the crawlers:
//! - Building the session-carrying HTTP clients
//! - Fixed self-throttling before every attempt
//! - Indefinite retry on HTTP 429 and transport failures
//! - Manual redirect observation for sale-id resolution
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 429 | Extra fixed delay, retry, no cap |
//! | Timeout / connection failure | Log at warn, retry, no cap |
//! | Body read failure | Log at warn, retry, no cap |
//! | HTTP 200, 301, 404, 5xx (and any other status) | Return to caller |
//! | Request construction failure | Return error immediately |
//!
//! The unbounded retry loop is deliberate: the platform rate-limits
//! aggressively and a scheduled run prefers to outwait it. The only way
//! to stop a wedged fetch is to stop the process.

use crate::config::FetcherConfig;
use reqwest::cookie::Jar;
use reqwest::header::LOCATION;
use reqwest::{redirect::Policy, Client, Method as HttpMethod};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// HTTP methods the crawlers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully received response, after any internal retries.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status of the final response.
    pub status: u16,

    /// URL the response was served from, after any followed redirects.
    pub final_url: String,

    /// Response body, decoded as text.
    pub body: String,

    /// `Location` header, when the response is an unfollowed redirect.
    pub location: Option<String>,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Non-retryable fetch failures.
///
/// Transport-level problems are retried inside the fetcher and never
/// surface here; what remains is request construction (an invalid URL,
/// a client build failure), which no retry can fix.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid request for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Rate-limited, retrying request wrapper.
///
/// Holds two clients over one cookie jar: reqwest fixes the redirect
/// policy per client, and sale-id resolution needs to observe `Location`
/// headers while every other request follows redirects to the end.
pub struct Fetcher {
    following: Client,
    direct: Client,
    request_delay: Duration,
    retry_delay: Duration,
}

impl Fetcher {
    /// Builds the fetcher and its underlying clients.
    ///
    /// The jar carries the authenticated session cookie; both clients
    /// share it so claims stay logged in across redirect hops.
    pub fn new(config: &FetcherConfig, jar: Arc<Jar>) -> Result<Self, FetchError> {
        let base = || {
            Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .cookie_provider(jar.clone())
                .gzip(true)
                .brotli(true)
        };

        let following = base().build().map_err(FetchError::Client)?;
        let direct = base()
            .redirect(Policy::none())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            following,
            direct,
            request_delay: Duration::from_millis(config.request_delay_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// GET with redirects followed.
    pub async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.fetch(Method::Get, url, None, true).await
    }

    /// GET without following redirects, exposing the `Location` header.
    pub async fn get_no_redirect(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.fetch(Method::Get, url, None, false).await
    }

    /// POST with an optional form payload, redirects followed.
    pub async fn post(
        &self,
        url: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<FetchResponse, FetchError> {
        self.fetch(Method::Post, url, form, true).await
    }

    /// Performs a request, retrying until a terminal status arrives.
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        form: Option<&[(&str, &str)]>,
        follow_redirects: bool,
    ) -> Result<FetchResponse, FetchError> {
        let client = if follow_redirects {
            &self.following
        } else {
            &self.direct
        };
        let http_method = match method {
            Method::Get => HttpMethod::GET,
            Method::Post => HttpMethod::POST,
        };

        loop {
            // Fixed self-throttle, independent of server feedback.
            tokio::time::sleep(self.request_delay).await;

            let mut request = client.request(http_method.clone(), url);
            if let Some(form) = form {
                request = request.form(form);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_builder() => {
                    return Err(FetchError::Request {
                        url: url.to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    tracing::warn!("Transport failure for {}: {} (retrying)", url, e);
                    continue;
                }
            };

            let status = response.status().as_u16();
            if status == 429 {
                tracing::debug!("Rate limited on {}, backing off", url);
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }

            let final_url = response.url().to_string();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match response.text().await {
                Ok(body) => {
                    return Ok(FetchResponse {
                        status,
                        final_url,
                        body,
                        location,
                    });
                }
                Err(e) => {
                    tracing::warn!("Body read failure for {}: {} (retrying)", url, e);
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fetcher() -> Fetcher {
        let config = FetcherConfig {
            request_delay_ms: 1,
            retry_delay_ms: 1,
            timeout_secs: 5,
            user_agent: "test-gleaner/0.0".to_string(),
        };
        Fetcher::new(&config, Arc::new(Jar::default())).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_retried() {
        let fetcher = test_fetcher();
        let result = fetcher.get("not a url at all").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_retries_429_until_success() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        // Two rate-limit responses, then success.
        Mock::given(method("GET"))
            .and(path("/game"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/game"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let response = fetcher.get(&format!("{}/game", server.uri())).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn test_terminal_statuses_return_immediately() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let response = fetcher
            .get(&format!("{}/missing", server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_unfollowed_redirect_exposes_location() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s/42"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", "https://itch.io/s/42/spring-sale"),
            )
            .mount(&server)
            .await;

        let fetcher = test_fetcher();
        let response = fetcher
            .get_no_redirect(&format!("{}/s/42", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 301);
        assert_eq!(
            response.location.as_deref(),
            Some("https://itch.io/s/42/spring-sale")
        );
    }
}
