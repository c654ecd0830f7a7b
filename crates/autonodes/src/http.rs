use async_trait::async_trait;
use autocore::{NodeError, Parameters};
use autoengine::NodeExecutor;
use serde_json::{json, Map, Value};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP request node.
///
/// Parameters: `url` (required), `method` (default GET), `headers`
/// (merged over a `Content-Type: application/json` baseline), `body`
/// (sent for non-GET/HEAD methods, falling back to the upstream
/// payload, then `{}`).
///
/// On success returns `{ statusCode, statusText, headers, data }`,
/// with `data` parsed as JSON when the response says it is JSON. A
/// non-2xx status or transport failure is an error whose message names
/// the target URL.
pub struct HttpRequestExecutor {
    client: reqwest::Client,
}

impl HttpRequestExecutor {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Request timeout is a property of this executor; the scheduler
    /// itself never times nodes out.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpRequestExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeExecutor for HttpRequestExecutor {
    async fn execute(&self, parameters: &Parameters, input: Value) -> Result<Value, NodeError> {
        let url = parameters
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| NodeError::MissingParameter("url".to_string()))?;

        let method_name = parameters
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("GET")
            .to_uppercase();
        let method = reqwest::Method::from_bytes(method_name.as_bytes()).map_err(|_| {
            NodeError::InvalidParameter {
                name: "method".to_string(),
                reason: format!("unsupported method: {}", method_name),
            }
        })?;

        tracing::info!("Executing HTTP {} request to {}", method_name, url);

        let mut request = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");

        if let Some(Value::Object(headers)) = parameters.get("headers") {
            for (name, value) in headers {
                if let Some(value) = value.as_str() {
                    request = request.header(name, value);
                }
            }
        }

        // Body falls back to the upstream payload so a bare POST node
        // forwards whatever the previous node produced.
        if method_name != "GET" && method_name != "HEAD" {
            let body = match parameters.get("body") {
                Some(body) => body.clone(),
                None if !input.is_null() => input,
                None => json!({}),
            };
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            NodeError::ExecutionFailed(format!("HTTP request to {} failed: {}", url, e))
        })?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let headers: Map<String, Value> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    Value::String(value.to_str().unwrap_or("").to_string()),
                )
            })
            .collect();

        let is_json = headers
            .get("content-type")
            .and_then(Value::as_str)
            .is_some_and(|ct| ct.contains("application/json"));

        let text = response.text().await.map_err(|e| {
            NodeError::ExecutionFailed(format!("HTTP request to {} failed: {}", url, e))
        })?;

        if !status.is_success() {
            return Err(NodeError::ExecutionFailed(format!(
                "HTTP request to {} failed: HTTP request failed with status {}: {}",
                url,
                status.as_u16(),
                status_text
            )));
        }

        let data = if is_json {
            serde_json::from_str(&text).map_err(|e| {
                NodeError::ExecutionFailed(format!(
                    "HTTP request to {} failed: invalid JSON response: {}",
                    url, e
                ))
            })?
        } else {
            Value::String(text)
        };

        tracing::info!("HTTP request successful: {}", status.as_u16());

        Ok(json!({
            "statusCode": status.as_u16(),
            "statusText": status_text,
            "headers": headers,
            "data": data,
        }))
    }
}
