//! HTTP Transport Layer
//!
//! Executes JSON requests against the optimization service with a per-request
//! timeout, API-key header injection and automatic retries.
//!
//! # Example
//!
//! ```ignore
//! use optimization_mcp::client::{HttpTransport, RetryConfig};
//!
//! let transport = HttpTransport::new("http://localhost:8000")?
//!     .with_api_key("secret")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_retry(RetryConfig::default().max_retries(3));
//!
//! let response: SolveResponse = transport.post("/api/solve/lp", &problem).await?;
//! ```

use crate::client::retry::{retry_with_backoff, RetryConfig};
use crate::error::{NetworkFailure, TransportError};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the configured credential
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport for the optimization service
///
/// Cloning is cheap: the underlying reqwest client shares its connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Reqwest HTTP client
    client: reqwest::Client,

    /// Service base URL without trailing slash
    base_url: String,

    /// Credential sent in [`API_KEY_HEADER`]
    api_key: Option<String>,

    /// Request timeout
    timeout: Duration,

    /// Retry configuration for transient failures
    retry: RetryConfig,

    /// Log request and response bodies
    debug: bool,
}

impl HttpTransport {
    /// Create a new transport for the given service base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: base_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            debug: false,
        })
    }

    /// Set the credential sent with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Log requests and responses at debug level
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Get the service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the retry configuration
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Whether a credential is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL for a service path such as `/api/solve/lp`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(TransportError::Encode)?;
        let text = self.request(Method::POST, path, Some(&body)).await?;
        self.decode(path, &text)
    }

    /// GET a path and decode the JSON response
    pub async fn get<R>(&self, path: &str) -> Result<R, TransportError>
    where
        R: DeserializeOwned,
    {
        let text = self.request(Method::GET, path, None).await?;
        self.decode(path, &text)
    }

    /// GET a path and return the raw response body
    pub async fn get_text(&self, path: &str) -> Result<String, TransportError> {
        self.request(Method::GET, path, None).await
    }

    /// Execute a request with retries, returning the response body
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<String, TransportError> {
        let url = self.url(path);
        let policy = self
            .retry
            .clone()
            .max_delay(self.retry.max_delay.min(self.timeout));

        retry_with_backoff(&policy, &method, || {
            self.send_once(method.clone(), &url, body)
        })
        .await
    }

    /// Execute a single attempt
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<String, TransportError> {
        if self.debug {
            match body {
                Some(body) => tracing::debug!("{} {} body={}", method, url, body),
                None => tracing::debug!("{} {}", method, url),
            }
        }

        let mut request = self
            .client
            .request(method.clone(), url)
            .timeout(self.timeout);

        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let network_error = |e: reqwest::Error| TransportError::Network {
            method: method.to_string(),
            url: url.to_string(),
            kind: NetworkFailure::classify(&e),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let text = response.text().await.map_err(network_error)?;

        if self.debug {
            tracing::debug!("{} {} -> {} body={}", method, url, status.as_u16(), text);
        }

        if !status.is_success() {
            return Err(TransportError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    fn decode<R: DeserializeOwned>(&self, path: &str, text: &str) -> Result<R, TransportError> {
        serde_json::from_str(text).map_err(|source| TransportError::Decode {
            url: self.url(path),
            source,
        })
    }
}
