//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("iptv-player-core/", env!("CARGO_PKG_VERSION"));

/// Playlist servers disagree on the MIME type, so accept all the usual ones.
const PLAYLIST_ACCEPT: &str = "application/x-mpegurl, audio/x-mpegurl, audio/mpegurl, text/plain, */*";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Desktop HTTP client backed by `reqwest` with rustls.
///
/// Features:
/// - Connection pooling
/// - Automatic retries with exponential backoff
/// - Configurable timeouts
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the default 30 second timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// If the TLS backend cannot be initialised with these settings, falls
    /// back to reqwest's stock client.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });

        Self { client }
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    fn build_request(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(Self::convert_method(request.method), &request.url);

        if !request.headers.keys().any(|k| k.eq_ignore_ascii_case("accept")) {
            builder = builder.header(reqwest::header::ACCEPT, PLAYLIST_ACCEPT);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| BridgeError::Network(describe_error(&e, &request.url)))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::Network(describe_error(&e, &request.url)))?;

        debug!(
            url = %redacted(&request.url),
            status,
            bytes = body.len(),
            "HTTP response received"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    async fn execute_with_retry_internal(
        &self,
        request: HttpRequest,
        policy: &RetryPolicy,
    ) -> Result<HttpResponse> {
        let attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let outcome = self.send(&request).await;
            let last_attempt = attempt + 1 >= attempts;

            match outcome {
                Ok(response) if !should_retry(response.status) || last_attempt => {
                    return Ok(response)
                }
                Ok(response) => {
                    warn!(
                        url = %redacted(&request.url),
                        status = response.status,
                        attempt = attempt + 1,
                        "Retryable HTTP status"
                    );
                }
                Err(e) if last_attempt => return Err(e),
                Err(e) => {
                    warn!(
                        url = %redacted(&request.url),
                        error = %e,
                        attempt = attempt + 1,
                        "HTTP request failed, retrying"
                    );
                }
            }

            tokio::time::sleep(policy.delay_for(attempt)).await;
            attempt += 1;
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReqwestHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestHttpClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(
            method = ?request.method,
            url = %redacted(&request.url),
            "Executing HTTP request"
        );
        self.send(&request).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, &policy).await
    }
}

/// 5xx and 429 are worth another attempt; everything else is final.
fn should_retry(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// URL without its query string, which may carry access tokens.
fn redacted(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

fn describe_error(error: &reqwest::Error, url: &str) -> String {
    let url = redacted(url);
    if error.is_timeout() {
        format!("request to {url} timed out")
    } else if error.is_connect() {
        format!("could not connect to {url}")
    } else if error.is_body() || error.is_decode() {
        format!("failed to read response from {url}")
    } else {
        format!("request to {url} failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_method() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Head),
            reqwest::Method::HEAD
        );
    }

    #[test]
    fn test_build_request_adds_playlist_accept() {
        let client = ReqwestHttpClient::new();
        let request = client
            .build_request(&HttpRequest::get("https://lists.example.org/tv.m3u"))
            .build()
            .unwrap();

        assert_eq!(*request.method(), reqwest::Method::GET);
        assert_eq!(
            request.headers()[reqwest::header::ACCEPT].to_str().unwrap(),
            PLAYLIST_ACCEPT
        );
    }

    #[test]
    fn test_build_request_keeps_caller_accept_and_timeout() {
        let client = ReqwestHttpClient::new();
        let request = client
            .build_request(
                &HttpRequest::get("https://lists.example.org/tv.m3u")
                    .header("Accept", "text/plain")
                    .timeout(Duration::from_secs(5)),
            )
            .build()
            .unwrap();

        let accepts: Vec<_> = request
            .headers()
            .get_all(reqwest::header::ACCEPT)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(accepts, ["text/plain"]);
        assert_eq!(request.timeout(), Some(&Duration::from_secs(5)));
    }

    #[test]
    fn test_should_retry() {
        assert!(should_retry(503));
        assert!(should_retry(429));
        assert!(!should_retry(404));
        assert!(!should_retry(200));
    }

    #[test]
    fn test_redacted_strips_query() {
        assert_eq!(
            redacted("https://lists.example.org/tv.m3u?token=secret"),
            "https://lists.example.org/tv.m3u"
        );
        assert_eq!(redacted("http://host/a.m3u"), "http://host/a.m3u");
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let client = ReqwestHttpClient::with_timeout(Duration::from_secs(2));
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            ..RetryPolicy::default()
        };

        // Port 9 on loopback is the discard service; nothing listens there in CI.
        let err = client
            .execute_with_retry(HttpRequest::get("http://127.0.0.1:9/tv.m3u?token=x"), policy)
            .await
            .unwrap_err();

        assert!(err.is_network());
        assert!(!err.to_string().contains("token"));
    }
}
