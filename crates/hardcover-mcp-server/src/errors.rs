use std::time::Duration;

use reqwest::header::InvalidHeaderValue;
use rmcp::model::ErrorCode;
use serde_json::json;
use tokio::task::JoinError;

use crate::tools::ToolName;

/// An error in server initialization
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Missing environment variable: {0}")]
    EnvironmentVariable(String),

    #[error("The Hardcover API key must not be empty")]
    EmptyApiKey,

    #[error("invalid header value: {0}")]
    HeaderValue(#[from] InvalidHeaderValue),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize MCP service: {0}")]
    McpInitializeError(String),

    #[error("Failed to start server")]
    StartupError(#[from] JoinError),
}

/// A failure talking to the upstream GraphQL service
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    #[error("request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {status}: {summary}")]
    Status { status: u16, summary: String },

    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// A failed tool call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameters { field: &'static str, reason: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Tool {0} not found")]
    MethodNotFound(String),

    #[error("Error executing tool {tool}: {source}")]
    Upstream {
        tool: ToolName,
        source: UpstreamError,
    },

    #[error("Error executing tool {tool}: {message}")]
    Execution { tool: ToolName, message: String },
}

impl ToolError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn execution(tool: ToolName, message: impl Into<String>) -> Self {
        Self::Execution {
            tool,
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidParameters { .. } => "invalid_parameters",
            ToolError::NotFound(_) => "not_found",
            ToolError::MethodNotFound(_) => "method_not_found",
            ToolError::Upstream { .. } => "upstream_error",
            ToolError::Execution { .. } => "execution_error",
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            ToolError::InvalidParameters { .. } => ErrorCode::INVALID_PARAMS,
            ToolError::NotFound(_) => ErrorCode::INVALID_REQUEST,
            ToolError::MethodNotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            ToolError::Upstream { .. } | ToolError::Execution { .. } => ErrorCode::INTERNAL_ERROR,
        }
    }
}

impl From<ToolError> for McpError {
    fn from(error: ToolError) -> Self {
        let data = match &error {
            ToolError::InvalidParameters { field, .. } => {
                json!({ "kind": error.kind(), "field": field })
            }
            ToolError::Upstream { tool, .. } | ToolError::Execution { tool, .. } => {
                json!({ "kind": error.kind(), "tool": tool.as_str() })
            }
            ToolError::NotFound(_) | ToolError::MethodNotFound(_) => {
                json!({ "kind": error.kind() })
            }
        };
        McpError::new(error.code(), error.to_string(), Some(data))
    }
}

/// An MCP tool error
pub type McpError = rmcp::model::ErrorData;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ToolError::invalid("limit", "must be between 1 and 50"), ErrorCode::INVALID_PARAMS)]
    #[case(ToolError::NotFound("Book with ID 7 not found".into()), ErrorCode::INVALID_REQUEST)]
    #[case(ToolError::MethodNotFound("frobnicate".into()), ErrorCode::METHOD_NOT_FOUND)]
    #[case(
        ToolError::Upstream { tool: ToolName::SearchBooks, source: UpstreamError::Transport("connection refused".into()) },
        ErrorCode::INTERNAL_ERROR
    )]
    #[case(ToolError::execution(ToolName::AddToLibrary, "empty result"), ErrorCode::INTERNAL_ERROR)]
    fn it_maps_tool_errors_to_mcp_codes(#[case] error: ToolError, #[case] code: ErrorCode) {
        let kind = error.kind();
        let mcp_error = McpError::from(error);

        assert_eq!(mcp_error.code, code);
        assert_eq!(
            mcp_error.data.as_ref().and_then(|data| data.get("kind")),
            Some(&json!(kind))
        );
    }

    #[test]
    fn invalid_parameters_message_names_the_field() {
        let error = McpError::from(ToolError::invalid("rating", "must be between 1 and 5"));

        assert_eq!(
            error.message,
            "invalid parameter `rating`: must be between 1 and 5"
        );
    }

    #[test]
    fn upstream_errors_are_tagged_with_the_tool_name() {
        let error = ToolError::Upstream {
            tool: ToolName::GetUserLibrary,
            source: UpstreamError::GraphQL(vec!["field not found".into(), "bad".into()]),
        };

        assert_eq!(
            error.to_string(),
            "Error executing tool get_user_library: GraphQL errors: field not found; bad"
        );
    }
}
