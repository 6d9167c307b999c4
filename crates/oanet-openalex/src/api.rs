//! OpenAlex listing endpoint client

use anyhow::Context;
use oanet_core::{EntityRecord, HttpResponse, StreamError, retry_with_backoff};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{ApiConfig, Query};
use crate::error::FetchError;
use crate::pager::EntityPager;
use crate::state::Entity;

/// Longest body excerpt carried in an error message
const ERROR_BODY_EXCERPT: usize = 200;

/// Issues one GET and returns status + body.
pub trait Transport {
    fn get(&self, url: &str, params: &[(String, String)]) -> Result<HttpResponse, StreamError>;
}

/// Transport over a reqwest client on the shared runtime
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, StreamError> {
        Ok(Self {
            client: oanet_core::build_client(user_agent)?,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, params: &[(String, String)]) -> Result<HttpResponse, StreamError> {
        oanet_core::http_get(&self.client, url, params)
    }
}

/// `meta` object of a listing response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Total results matching the query
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl PageMeta {
    /// Next cursor token, treating null and "" as exhausted
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Deserialize)]
struct RawPage {
    results: Vec<Value>,
    meta: PageMeta,
}

/// One decoded listing page
#[derive(Debug, Clone)]
pub struct Page {
    pub results: Vec<EntityRecord>,
    pub meta: PageMeta,
}

/// Client for the OpenAlex listing endpoints.
pub struct ApiClient<T = HttpTransport> {
    config: ApiConfig,
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Client over HTTP, with the courtesy email in the `User-Agent`
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let transport =
            HttpTransport::new(&config.user_agent()).context("Failed to build HTTP client")?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ApiConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Listing URL for an entity type
    pub fn endpoint(&self, entity: Entity) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), entity.api_path())
    }

    /// Start a lazy retrieval session. No request is made until the
    /// first record is pulled.
    pub fn entities(&self, query: &Query) -> EntityPager<'_, T> {
        EntityPager::new(self, query)
    }

    /// Fetch and decode one page, honoring rate interval and retry policy.
    pub fn fetch_page(
        &self,
        entity: Entity,
        params: &[(String, String)],
    ) -> Result<Page, FetchError> {
        let url = self.endpoint(entity);
        let label = format!("{entity} {}", describe_position(params));
        let interval = self.config.rate_interval();

        retry_with_backoff(&label, &self.config.retry_policy(), || {
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
            let response = self
                .transport
                .get(&url, params)
                .map_err(|source| FetchError::Transport { entity, source })?;
            decode_page(entity, response)
        })
    }
}

/// "page=3" / "cursor=abc" for log lines
fn describe_position(params: &[(String, String)]) -> String {
    params
        .iter()
        .find(|(k, _)| k == "page" || k == "cursor")
        .map_or_else(String::new, |(k, v)| format!("{k}={v}"))
}

/// Validate status and decode a listing body.
pub fn decode_page(entity: Entity, response: HttpResponse) -> Result<Page, FetchError> {
    if !response.is_success() {
        return Err(FetchError::Retrieval {
            entity,
            status: response.status,
            message: api_error_message(&response.body),
        });
    }

    let value: Value = serde_json::from_str(&response.body).map_err(|e| FetchError::Decode {
        entity,
        message: format!("invalid JSON: {e}"),
    })?;
    if value.get("error").is_some() {
        return Err(FetchError::Decode {
            entity,
            message: format!("API error: {}", api_error_message(&response.body)),
        });
    }

    let raw: RawPage = serde_json::from_value(value).map_err(|e| FetchError::Decode {
        entity,
        message: format!("unexpected response shape: {e}"),
    })?;
    let results = raw
        .results
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            EntityRecord::from_value(v).ok_or_else(|| FetchError::Decode {
                entity,
                message: format!("result {i} is not an object"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        results,
        meta: raw.meta,
    })
}

/// `error -- message` from an API error body, else a body excerpt
fn api_error_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        let error = v.get("error").and_then(Value::as_str);
        let message = v.get("message").and_then(Value::as_str);
        match (error, message) {
            (Some(e), Some(m)) => return format!("{e} -- {m}"),
            (Some(s), None) | (None, Some(s)) => return s.to_string(),
            (None, None) => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty body".to_string();
    }
    match trimmed.char_indices().nth(ERROR_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
