//! HTTP transport for Elasticsearch-compatible clusters
//!
//! Provides a client that handles:
//! - Automatic retries with configurable backoff
//! - Retry-After handling on throttled responses
//! - Error classification (missing index vs transport failure)
//! - JSON request/response plumbing against a validated base URL

use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::SearchIndex;

/// Configuration for the search backend transport
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    /// Base URL of the cluster, e.g. `http://localhost:9200`
    pub base_url: Url,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries per request
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Headers sent on every request; injected credentials land here
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl ElasticConfig {
    /// Create a config with defaults for the given base URL
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: HashMap::new(),
            user_agent: format!("deeppage/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Create a new config builder
    pub fn builder(base_url: impl Into<String>) -> ElasticConfigBuilder {
        ElasticConfigBuilder::new(base_url)
    }
}

/// Builder for `ElasticConfig`
pub struct ElasticConfigBuilder {
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    backoff_type: BackoffType,
    default_headers: HashMap<String, String>,
    user_agent: String,
}

impl ElasticConfigBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: HashMap::new(),
            user_agent: format!("deeppage/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.backoff_type = backoff_type;
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the config, validating the base URL
    pub fn build(self) -> Result<ElasticConfig> {
        Ok(ElasticConfig {
            base_url: Url::parse(&self.base_url)?,
            timeout: self.timeout,
            max_retries: self.max_retries,
            initial_backoff: self.initial_backoff,
            max_backoff: self.max_backoff,
            backoff_type: self.backoff_type,
            default_headers: self.default_headers,
            user_agent: self.user_agent,
        })
    }
}

/// Client for an Elasticsearch-compatible cluster
///
/// Stateless and cheap to clone; one instance can serve many concurrent
/// paginators.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: Client,
    config: ElasticConfig,
}

impl ElasticClient {
    /// Create a client from a config
    pub fn new(config: ElasticConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client with default configuration for the given base URL
    pub fn from_url(base_url: impl AsRef<str>) -> Result<Self> {
        Self::new(ElasticConfig::new(base_url)?)
    }

    /// Get the active configuration
    pub fn config(&self) -> &ElasticConfig {
        &self.config
    }

    /// Fetch the cluster info document from the root endpoint
    pub async fn ping(&self) -> Result<JsonValue> {
        self.execute(Method::GET, "", &[], None).await
    }

    /// Issue one logical request, retrying transient failures
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&JsonValue>,
    ) -> Result<JsonValue> {
        let url = self.endpoint(path)?;
        let max_retries = self.config.max_retries;

        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= max_retries {
            let mut req = self.client.request(method.clone(), url.clone());

            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            if !query.is_empty() {
                req = req.query(query);
            }

            if let Some(body) = body {
                req = req.json(body);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    // Throttled: honor Retry-After when the server names a wait
                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < max_retries {
                        let delay =
                            retry_after(&response).unwrap_or_else(|| self.calculate_backoff(attempt));
                        warn!(
                            "Throttled (429), attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::status(429, String::new()));
                        continue;
                    }

                    if is_retryable_status(status) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::status(status.as_u16(), String::new()));
                        continue;
                    }

                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::status(status.as_u16(), body));
                    }

                    debug!("Request succeeded: {} {}", method, url);
                    return response.json::<JsonValue>().await.map_err(Error::Http);
                }
                Err(e) => {
                    if e.is_timeout() {
                        if attempt < max_retries {
                            let delay = self.calculate_backoff(attempt);
                            warn!(
                                "Request timeout, attempt {}/{}, retrying in {:?}",
                                attempt + 1,
                                max_retries + 1,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            last_error = Some(Error::Timeout {
                                timeout_ms: self.config.timeout.as_millis() as u64,
                            });
                            continue;
                        }
                        return Err(Error::Timeout {
                            timeout_ms: self.config.timeout.as_millis() as u64,
                        });
                    }

                    if e.is_connect() && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Connection error, attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::Http(e));
                        continue;
                    }

                    return Err(Error::Http(e));
                }
            }
        }

        // Exhausted all retries
        Err(last_error.unwrap_or_else(|| Error::RetriesExhausted { max_retries }))
    }

    /// Join a path onto the base URL
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

#[async_trait]
impl SearchIndex for ElasticClient {
    async fn search(&self, index: Option<&str>, body: &JsonValue) -> Result<JsonValue> {
        let path = match index {
            Some(index) => format!("{index}/_search"),
            None => "_search".to_string(),
        };
        let result = self.execute(Method::POST, &path, &[], Some(body)).await;
        match index {
            Some(index) => result.map_err(|e| classify_missing_index(index, e)),
            None => result,
        }
    }

    async fn open_pit(&self, index: &str, keep_alive: &str) -> Result<String> {
        let path = format!("{index}/_pit");
        let response = self
            .execute(Method::POST, &path, &[("keep_alive", keep_alive)], None)
            .await
            .map_err(|e| classify_missing_index(index, e))?;

        response
            .get("id")
            .and_then(JsonValue::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| Error::decode("open point-in-time response has no id"))
    }

    async fn close_pit(&self, pit_id: &str) -> Result<()> {
        let body = json!({ "id": pit_id });
        match self.execute(Method::DELETE, "_pit", &[], Some(&body)).await {
            Ok(_) => Ok(()),
            // An unknown or already expired id frees nothing; not a failure
            Err(Error::Status { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Check if an HTTP status is retryable
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Extract a Retry-After wait from the response headers
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

/// Map a 404 carrying an `index_not_found_exception` body to `IndexNotFound`
fn classify_missing_index(index: &str, err: Error) -> Error {
    match err {
        Error::Status {
            status: 404,
            ref body,
        } if body.contains("index_not_found_exception") => Error::index_not_found(index),
        other => other,
    }
}
