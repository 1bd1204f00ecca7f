//! Daily-content API client.
//!
//! ### Endpoint
//!
//! - `GET {base}/content/daily?date=YYYY-MM-DD&cohort=<string>`
//! - Success: `{ ok: true, data: { date, cohort, resolvedFrom, category, priority, content, updatedAt } }`
//! - `404` or `content: null` means no content for the pair.
//! - Any other non-2xx status, `ok: false`, or an unparseable body is an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use url::Url;

use super::response::{DailyApiResponse, ResolvedFrom, normalize_record};
use super::{ContentSource, Lookup, ResolveError};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "knowledge-refill/0.1";

/// HTTP source configuration.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// API base, e.g. `https://host/api`.
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpSourceConfig {
    pub fn from_app_config(config: &refill_core::AppConfig) -> Self {
        Self { base_url: config.api_base_url.clone(), timeout: config.timeout(), user_agent: config.user_agent.clone() }
    }
}

/// Content source backed by the hosted daily-content API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    endpoint: String,
    user_agent: String,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, ResolveError> {
        let base = Url::parse(&config.base_url).map_err(|e| ResolveError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ResolveError::InvalidBaseUrl(format!("unsupported scheme: {}", base.scheme())));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ResolveError::Network(Arc::new(e)))?;

        let endpoint = format!("{}/content/daily", base.as_str().trim_end_matches('/'));
        Ok(Self { http, endpoint, user_agent: config.user_agent })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn lookup(&self, date: &str, cohort: &str) -> Result<Lookup, ResolveError> {
        let start = Instant::now();
        tracing::debug!(date, cohort, "fetching daily content");

        let http_response = self
            .http
            .get(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[("date", date), ("cohort", cohort)])
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(%status, "daily content response status");

        if status == StatusCode::NOT_FOUND {
            return Ok(Lookup::none());
        }
        if !status.is_success() {
            return Err(ResolveError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let api_response: DailyApiResponse =
            serde_json::from_slice(&bytes).map_err(|e| ResolveError::Parse(e.to_string()))?;

        if !api_response.ok {
            return Err(ResolveError::Upstream(api_response.error.unwrap_or_else(|| "ok=false".to_string())));
        }

        let Some(data) = api_response.data else {
            return Ok(Lookup::none());
        };

        let lookup = match normalize_record(&data) {
            Some(content) => {
                let wire = data.get("resolvedFrom").and_then(serde_json::Value::as_str);
                Lookup::found(content, ResolvedFrom::from_wire(wire))
            }
            None => Lookup::none(),
        };

        tracing::debug!(elapsed = ?start.elapsed(), found = lookup.content.is_some(), "daily content fetched");
        Ok(lookup)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
