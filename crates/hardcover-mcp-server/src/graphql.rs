//! Execute GraphQL operations against the Hardcover API

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::errors::{ServerError, UpstreamError};
use crate::queries::QueryDocument;

/// The public Hardcover GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.hardcover.app/v1/graphql";

/// Reported for an `errors` entry that carries no message
const UNKNOWN_GRAPHQL_ERROR: &str = "unknown GraphQL error";

/// Upper bound on the response body quoted in a status error
const STATUS_SUMMARY_LEN: usize = 200;

/// A client bound to a single GraphQL endpoint.
///
/// Cloning is cheap and shares the underlying connection pool; configuration
/// never changes after construction.
#[derive(Clone, Debug)]
pub struct GraphQLClient {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Deserialize)]
struct GraphQLError {
    #[serde(default)]
    message: Option<String>,
}

impl GraphQLClient {
    /// Build a client that authenticates with `api_key` and gives up on any
    /// request after `timeout`.
    #[allow(clippy::result_large_err)]
    pub fn new(
        endpoint: Url,
        api_key: &SecretString,
        timeout: Duration,
        extra_headers: HeaderMap,
    ) -> Result<Self, ServerError> {
        let mut headers = extra_headers;
        headers.insert(AUTHORIZATION, authorization(api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("hardcover-mcp-server/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Execute `document` with `variables`, returning the `data` member of the response
    pub async fn execute(
        &self,
        document: &QueryDocument,
        variables: Map<String, Value>,
    ) -> Result<Value, UpstreamError> {
        debug!(
            operation = document.operation_name,
            variables = ?variables,
            "Sending GraphQL request"
        );

        let request_body = json!({
            "query": document.document,
            "variables": variables,
            "operationName": document.operation_name,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| self.transport_error(error))?;

        if !status.is_success() {
            warn!(operation = document.operation_name, %status, "GraphQL request failed");
            return Err(status_error(status, &body));
        }

        let response: GraphQLResponse = serde_json::from_str(&body)
            .map_err(|error| UpstreamError::InvalidResponse(error.to_string()))?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            warn!(
                operation = document.operation_name,
                count = errors.len(),
                "GraphQL response contained errors"
            );
            return Err(UpstreamError::GraphQL(
                errors
                    .into_iter()
                    .map(|error| {
                        error
                            .message
                            .unwrap_or_else(|| UNKNOWN_GRAPHQL_ERROR.to_string())
                    })
                    .collect(),
            ));
        }

        match response.data {
            Some(Value::Null) | None => Err(UpstreamError::InvalidResponse(
                "response contained no data".to_string(),
            )),
            Some(data) => Ok(data),
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(error.without_url().to_string())
        }
    }
}

/// `Bearer <key>`, tolerating keys that were copied with the scheme already attached
#[allow(clippy::result_large_err)]
fn authorization(api_key: &SecretString) -> Result<HeaderValue, ServerError> {
    let key = api_key.expose_secret().trim();
    let key = key
        .strip_prefix("Bearer")
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .map(str::trim)
        .unwrap_or(key);
    if key.is_empty() {
        return Err(ServerError::EmptyApiKey);
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {key}"))?;
    value.set_sensitive(true);
    Ok(value)
}

fn status_error(status: StatusCode, body: &str) -> UpstreamError {
    let summary: String = body.trim().chars().take(STATUS_SUMMARY_LEN).collect();
    UpstreamError::Status {
        status: status.as_u16(),
        summary: if summary.is_empty() {
            status.canonical_reason().unwrap_or("no response body").to_string()
        } else {
            summary
        },
    }
}
