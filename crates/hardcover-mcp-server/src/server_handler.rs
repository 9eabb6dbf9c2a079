use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, ErrorCode, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{McpError, ToolError};
use crate::graphql::GraphQLClient;
use crate::tools::{ToolCall, ToolName, ToolSettings, descriptor};

/// Serves the Hardcover tools over any rmcp transport
#[derive(Clone)]
pub struct HardcoverMcpServerHandler {
    client: GraphQLClient,
    settings: ToolSettings,
    tools: Arc<Vec<Tool>>,
}

impl HardcoverMcpServerHandler {
    pub fn new(client: GraphQLClient, settings: ToolSettings) -> Self {
        let tools = ToolName::ALL
            .into_iter()
            .map(|name| descriptor(name, &settings))
            .collect();
        Self {
            client,
            settings,
            tools: Arc::new(tools),
        }
    }

    /// The tool catalog, identical on every call
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// The full, unpaginated listing sent for `tools/list`
    pub fn catalog(&self) -> ListToolsResult {
        ListToolsResult {
            next_cursor: None,
            tools: self.tools.to_vec(),
        }
    }

    /// Look up, validate and execute a single tool call
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ToolError> {
        let tool: ToolName = name.parse().inspect_err(|_| {
            warn!(tool = name, "Call to unknown tool");
        })?;
        let arguments = arguments.unwrap_or_default();

        let call = ToolCall::validate(tool, &arguments, &self.settings).inspect_err(|error| {
            debug!(%tool, %error, "Rejected tool arguments");
        })?;

        debug!(%tool, "Executing tool call");
        call.execute(&self.client).await.inspect_err(|error| {
            warn!(%tool, kind = error.kind(), %error, "Tool call failed");
        })
    }

    /// Dispatch `request`, abandoning it as soon as `ct` is cancelled.
    ///
    /// Dropping the dispatch future also drops any in-flight HTTP request.
    pub async fn dispatch_until_cancelled(
        &self,
        request: CallToolRequestParam,
        ct: CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        tokio::select! {
            result = self.dispatch(&request.name, request.arguments) => result.map_err(McpError::from),
            () = ct.cancelled() => {
                info!(tool = %request.name, "Tool call cancelled by the client");
                Err(McpError::new(
                    ErrorCode::INTERNAL_ERROR,
                    format!("Tool {} was cancelled", request.name),
                    None,
                ))
            }
        }
    }
}

impl ServerHandler for HardcoverMcpServerHandler {
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_until_cancelled(request, context.ct).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.catalog())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "Hardcover MCP Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Search the Hardcover book catalog and manage the user's reading library."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UpstreamError;
    use crate::queries::SEARCH_BOOKS;
    use mockito::Matcher;
    use rmcp::model::RawContent;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use url::Url;

    fn handler_for(url: &str, timeout: Duration) -> HardcoverMcpServerHandler {
        let client = GraphQLClient::new(
            Url::parse(url).unwrap(),
            &SecretString::from("test-key"),
            timeout,
            Default::default(),
        )
        .unwrap();
        HardcoverMcpServerHandler::new(client, ToolSettings::default())
    }

    fn arguments(value: Value) -> Option<JsonObject> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn text(result: &CallToolResult) -> &str {
        match result.content.first().map(|content| &content.raw) {
            Some(RawContent::Text(text)) => &text.text,
            other => panic!("expected text content, got {other:?}"),
        }
    }

    #[test]
    fn the_catalog_is_fixed() {
        let handler = handler_for("http://localhost:1", Duration::from_secs(1));

        let listed: Vec<_> = handler
            .tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "read_only": tool.annotations.as_ref().and_then(|a| a.read_only_hint),
                })
            })
            .collect();

        insta::assert_json_snapshot!(listed, @r#"
        [
          {
            "name": "search_books",
            "read_only": true
          },
          {
            "name": "get_book_details",
            "read_only": true
          },
          {
            "name": "get_user_library",
            "read_only": true
          },
          {
            "name": "add_to_library",
            "read_only": false
          },
          {
            "name": "update_reading_status",
            "read_only": false
          }
        ]
        "#);
    }

    #[test]
    fn listing_is_identical_on_every_call() {
        let handler = handler_for("http://localhost:1", Duration::from_secs(1));
        let rebuilt = handler_for("http://localhost:1", Duration::from_secs(1));

        let first = serde_json::to_value(handler.catalog()).unwrap();
        let second = serde_json::to_value(handler.catalog()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, serde_json::to_value(rebuilt.catalog()).unwrap());
        assert_eq!(handler.catalog().next_cursor, None);
        assert_eq!(handler.catalog().tools.len(), ToolName::ALL.len());
    }

    #[tokio::test]
    async fn unknown_tools_never_reach_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;
        let handler = handler_for(&server.url(), Duration::from_secs(5));

        let error = handler
            .dispatch("frobnicate", arguments(json!({})))
            .await
            .unwrap_err();

        assert_eq!(error, ToolError::MethodNotFound("frobnicate".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;
        let handler = handler_for(&server.url(), Duration::from_secs(5));

        let calls = [
            ("search_books", json!({ "query": "x", "limit": 100 })),
            ("search_books", json!({ "query": "" })),
            ("get_book_details", json!({})),
            ("add_to_library", json!({ "bookId": 42, "status": "someday" })),
            (
                "update_reading_status",
                json!({ "id": 5, "status": "read", "rating": 6 }),
            ),
            (
                "update_reading_status",
                json!({ "id": 5, "status": "read", "progress": 150 }),
            ),
        ];
        for (name, raw) in calls {
            let error = handler.dispatch(name, arguments(raw)).await.unwrap_err();
            assert_eq!(error.kind(), "invalid_parameters", "{name}: {error}");
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_arguments_are_an_empty_object() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "GetMyLibrary",
                "variables": {},
            })))
            .with_body(r#"{"data":{"me":[{"user_books":[]}]}}"#)
            .expect(1)
            .create_async()
            .await;
        let handler = handler_for(&server.url(), Duration::from_secs(5));

        let result = handler.dispatch("get_user_library", None).await.unwrap();

        assert_eq!(text(&result), "[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_sends_the_wrapped_query_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Json(json!({
                "query": SEARCH_BOOKS.document,
                "variables": { "query": "%Dune%", "limit": 5 },
                "operationName": "SearchBooks",
            })))
            .with_body(r#"{"data":{"books":[{"id":1,"title":"Dune"}]}}"#)
            .expect(1)
            .create_async()
            .await;
        let handler = handler_for(&server.url(), Duration::from_secs(5));

        let result = handler
            .dispatch("search_books", arguments(json!({ "query": "Dune", "limit": 5 })))
            .await
            .unwrap();

        assert_eq!(
            serde_json::from_str::<Value>(text(&result)).unwrap(),
            json!([{ "id": 1, "title": "Dune" }])
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn an_absent_book_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"data":{"books_by_pk":null}}"#)
            .create_async()
            .await;
        let handler = handler_for(&server.url(), Duration::from_secs(5));

        let error = handler
            .dispatch("get_book_details", arguments(json!({ "id": 999999999 })))
            .await
            .unwrap_err();

        assert_eq!(
            error,
            ToolError::NotFound("Book with ID 999999999 not found".to_string())
        );
        assert_eq!(McpError::from(error).code, ErrorCode::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn adding_a_book_confirms_the_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "AddBookToLibrary",
                "variables": { "bookId": 42, "status": "WANT_TO_READ" },
            })))
            .with_body(r#"{"data":{"insert_user_books_one":{"id":7,"status":"WANT_TO_READ"}}}"#)
            .expect(1)
            .create_async()
            .await;
        let handler = handler_for(&server.url(), Duration::from_secs(5));

        let result = handler
            .dispatch(
                "add_to_library",
                arguments(json!({ "bookId": 42, "status": "want to read" })),
            )
            .await
            .unwrap();

        assert!(text(&result).contains("42"));
        assert!(text(&result).contains("want to read"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_errors_carry_the_tool_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"errors":[{"message":"permission denied"}]}"#)
            .create_async()
            .await;
        let handler = handler_for(&server.url(), Duration::from_secs(5));

        let error = handler
            .dispatch(
                "update_reading_status",
                arguments(json!({ "id": 5, "status": "read" })),
            )
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Error executing tool update_reading_status: GraphQL errors: permission denied"
        );
        assert_eq!(McpError::from(error).code, ErrorCode::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn a_silent_backend_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let timeout = Duration::from_millis(200);
        let handler = handler_for(&format!("http://{address}"), timeout);

        let error = handler
            .dispatch("get_user_library", arguments(json!({ "userId": 3 })))
            .await
            .unwrap_err();

        assert_eq!(
            error,
            ToolError::Upstream {
                tool: ToolName::GetUserLibrary,
                source: UpstreamError::Timeout(timeout),
            }
        );
        silent.abort();
    }

    #[tokio::test]
    async fn a_cancelled_call_returns_promptly() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let handler = handler_for(&format!("http://{address}"), Duration::from_secs(30));
        let ct = CancellationToken::new();
        let canceller = ct.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let started = tokio::time::Instant::now();
        let error = handler
            .dispatch_until_cancelled(
                CallToolRequestParam {
                    name: "get_book_details".into(),
                    arguments: arguments(json!({ "id": 1 })),
                },
                ct,
            )
            .await
            .unwrap_err();

        assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(error.message, "Tool get_book_details was cancelled");
        assert!(started.elapsed() < Duration::from_secs(5));
        silent.abort();
    }
}
