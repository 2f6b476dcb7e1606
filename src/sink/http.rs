//! Elasticsearch `_bulk` sink
//!
//! Renders each batch as an NDJSON body (one metadata line and one source
//! line per action) and maps the per-item answers back to action identities.

use super::traits::{BulkResponse, BulkSink, ItemFailure, SinkError, SinkResult};
use crate::config::DestinationConfig;
use crate::load::Action;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Environment variable consulted when no password is configured
pub const PASSWORD_ENV: &str = "BULKLOAD_PASSWORD";

/// Bulk sink talking to an Elasticsearch-compatible cluster
#[derive(Debug)]
pub struct ElasticsearchSink {
    client: Client,
    bulk_url: Url,
    username: Option<String>,
    password: Option<String>,
}

/// `_bulk` response body
#[derive(Debug, Deserialize)]
struct BulkResponseBody {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItemResult>>,
}

/// Metadata line of an `index` operation
#[derive(Debug, Serialize)]
struct IndexOperation<'a> {
    index: BulkMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct BulkMetadata<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    doc_type: Option<&'a str>,
    #[serde(rename = "_id")]
    id: &'a str,
}

/// Per-item result, keyed by operation type in the response
#[derive(Debug, Deserialize)]
struct BulkItemResult {
    #[serde(rename = "_id")]
    id: Option<String>,
    status: u16,
    error: Option<Value>,
}

impl ElasticsearchSink {
    /// Create a sink from destination configuration
    pub fn new(config: &DestinationConfig) -> SinkResult<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| SinkError::Config(format!("Invalid destination url: {}", e)))?;
        let bulk_url = bulk_endpoint(&base)?;

        info!("Initializing bulk sink: endpoint={}", bulk_url);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-ndjson"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SinkError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let password = config
            .password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok());

        if config.username.is_some() && password.is_none() {
            warn!("Username configured without a password for {}", bulk_url);
        }

        Ok(Self {
            client,
            bulk_url,
            username: config.username.clone(),
            password,
        })
    }

    pub fn bulk_url(&self) -> &Url {
        &self.bulk_url
    }
}

impl BulkSink for ElasticsearchSink {
    fn submit(&mut self, actions: &[Action]) -> SinkResult<BulkResponse> {
        if actions.is_empty() {
            return Ok(BulkResponse::Success);
        }

        let body = render_bulk_body(actions)?;
        debug!(
            "Sending bulk request to {} ({} actions, {} bytes)",
            self.bulk_url,
            actions.len(),
            body.len()
        );

        let mut request = self.client.post(self.bulk_url.clone()).body(body);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(SinkError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_bulk_response(&text, actions)
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

/// `{base}/_bulk`, keeping any path prefix of the base URL
fn bulk_endpoint(base: &Url) -> SinkResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("_bulk")
        .map_err(|e| SinkError::Config(format!("Invalid bulk endpoint: {}", e)))
}

/// Render actions as an NDJSON `_bulk` body
pub fn render_bulk_body(actions: &[Action]) -> SinkResult<String> {
    let mut body = String::new();
    for action in actions {
        let meta = IndexOperation {
            index: BulkMetadata {
                index: &action.index,
                doc_type: Some(action.doc_type.as_str()).filter(|t| !t.is_empty()),
                id: &action.id,
            },
        };

        body.push_str(&serde_json::to_string(&meta)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&action.source)?);
        body.push('\n');
    }
    Ok(body)
}

/// Map a `_bulk` response onto the submitted actions.
///
/// Items answer in request order, so an item without `_id` is attributed to
/// the action at the same position.
pub fn parse_bulk_response(body: &str, actions: &[Action]) -> SinkResult<BulkResponse> {
    let parsed: BulkResponseBody = serde_json::from_str(body)
        .map_err(|e| SinkError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if !parsed.errors {
        return Ok(BulkResponse::Success);
    }

    let mut failures = Vec::new();
    for (position, item) in parsed.items.into_iter().enumerate() {
        let Some(result) = item.into_values().next() else {
            continue;
        };
        if (200..300).contains(&result.status) {
            continue;
        }

        let id = match result.id {
            Some(id) => id,
            None => match actions.get(position) {
                Some(action) => action.id.clone(),
                None => {
                    return Err(SinkError::InvalidResponse(format!(
                        "Item {} has no _id and no matching action",
                        position
                    )))
                }
            },
        };

        failures.push(ItemFailure {
            id,
            status: result.status,
            reason: describe_error(result.error.as_ref()),
        });
    }

    if failures.is_empty() {
        warn!("Bulk response flagged errors but no item failed");
        return Ok(BulkResponse::Success);
    }

    Ok(BulkResponse::PartialFailure(failures))
}

fn describe_error(error: Option<&Value>) -> String {
    match error {
        Some(Value::Object(obj)) => {
            let kind = obj.get("type").and_then(Value::as_str);
            let reason = obj.get("reason").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
                (Some(kind), None) => kind.to_string(),
                (None, Some(reason)) => reason.to_string(),
                (None, None) => Value::Object(obj.clone()).to_string(),
            }
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "unknown error".to_string(),
    }
}
