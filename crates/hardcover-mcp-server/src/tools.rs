//! The Hardcover tools exposed to MCP clients
//!
//! Each tool turns a raw argument object into a validated input, binds that
//! input to one GraphQL document, and renders the response for the caller.
//! Validation and binding are separate steps so that invalid input can never
//! reach the network.

pub mod add_to_library;
pub(crate) mod arguments;
pub mod book_details;
pub mod search_books;
pub mod update_status;
pub mod user_library;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::ToolError;
use crate::graphql::GraphQLClient;
use crate::queries::QueryDocument;

use arguments::Arguments;
pub use arguments::{GRAPHQL_INT_MAX, ID_RANGE};

/// Results returned by `search_books` when no limit is given
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Default upper bound accepted for the `search_books` limit
pub const DEFAULT_MAX_SEARCH_LIMIT: u32 = 50;

/// The closed set of tools this server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    SearchBooks,
    GetBookDetails,
    GetUserLibrary,
    AddToLibrary,
    UpdateReadingStatus,
}

impl ToolName {
    /// Every tool, in the order they are listed to clients
    pub const ALL: [ToolName; 5] = [
        ToolName::SearchBooks,
        ToolName::GetBookDetails,
        ToolName::GetUserLibrary,
        ToolName::AddToLibrary,
        ToolName::UpdateReadingStatus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::SearchBooks => "search_books",
            ToolName::GetBookDetails => "get_book_details",
            ToolName::GetUserLibrary => "get_user_library",
            ToolName::AddToLibrary => "add_to_library",
            ToolName::UpdateReadingStatus => "update_reading_status",
        }
    }
}

impl Display for ToolName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| ToolError::MethodNotFound(name.to_string()))
    }
}

/// Server-wide settings that shape validation and binding
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    /// Largest `limit` accepted by `search_books`
    pub max_search_limit: u32,

    /// Library owner used when `get_user_library` is called without `userId`
    pub default_user_id: Option<i64>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            max_search_limit: DEFAULT_MAX_SEARCH_LIMIT,
            default_user_id: None,
        }
    }
}

/// Build the descriptor advertised for `name`
pub fn descriptor(name: ToolName, settings: &ToolSettings) -> Tool {
    match name {
        ToolName::SearchBooks => search_books::tool(settings),
        ToolName::GetBookDetails => book_details::tool(),
        ToolName::GetUserLibrary => user_library::tool(),
        ToolName::AddToLibrary => add_to_library::tool(),
        ToolName::UpdateReadingStatus => update_status::tool(),
    }
}

/// A validated tool input, bound to a single GraphQL operation
pub(crate) trait Executable {
    /// The tool this input belongs to
    const NAME: ToolName;

    /// The document to execute
    fn document(&self) -> &'static QueryDocument;

    /// The variables to execute the document with
    fn variables(&self) -> Map<String, Value>;

    /// Render the `data` member of a successful response
    fn render(&self, data: Value) -> Result<String, ToolError>;

    /// Execute the bound document and render the result
    async fn execute(&self, client: &GraphQLClient) -> Result<CallToolResult, ToolError> {
        let document = self.document();
        let variables = self.variables();
        document
            .check_variables(&variables)
            .map_err(|error| ToolError::execution(Self::NAME, error.to_string()))?;

        let data = client
            .execute(document, variables)
            .await
            .map_err(|source| ToolError::Upstream {
                tool: Self::NAME,
                source,
            })?;

        let text = self.render(data)?;
        debug!(tool = %Self::NAME, bytes = text.len(), "Tool call succeeded");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// The validated input of any tool
#[derive(Debug, PartialEq)]
pub enum ToolCall {
    SearchBooks(search_books::Input),
    GetBookDetails(book_details::Input),
    GetUserLibrary(user_library::Input),
    AddToLibrary(add_to_library::Input),
    UpdateReadingStatus(update_status::Input),
}

impl ToolCall {
    /// Validate raw arguments for `name`. Never touches the network.
    pub fn validate(
        name: ToolName,
        arguments: &Map<String, Value>,
        settings: &ToolSettings,
    ) -> Result<Self, ToolError> {
        let arguments = Arguments::new(arguments);
        Ok(match name {
            ToolName::SearchBooks => {
                ToolCall::SearchBooks(search_books::Input::validate(&arguments, settings)?)
            }
            ToolName::GetBookDetails => {
                ToolCall::GetBookDetails(book_details::Input::validate(&arguments)?)
            }
            ToolName::GetUserLibrary => {
                ToolCall::GetUserLibrary(user_library::Input::validate(&arguments, settings)?)
            }
            ToolName::AddToLibrary => {
                ToolCall::AddToLibrary(add_to_library::Input::validate(&arguments)?)
            }
            ToolName::UpdateReadingStatus => {
                ToolCall::UpdateReadingStatus(update_status::Input::validate(&arguments)?)
            }
        })
    }

    /// The document and variables this call will send
    pub fn binding(&self) -> (&'static QueryDocument, Map<String, Value>) {
        match self {
            ToolCall::SearchBooks(input) => (input.document(), input.variables()),
            ToolCall::GetBookDetails(input) => (input.document(), input.variables()),
            ToolCall::GetUserLibrary(input) => (input.document(), input.variables()),
            ToolCall::AddToLibrary(input) => (input.document(), input.variables()),
            ToolCall::UpdateReadingStatus(input) => (input.document(), input.variables()),
        }
    }

    pub(crate) async fn execute(&self, client: &GraphQLClient) -> Result<CallToolResult, ToolError> {
        match self {
            ToolCall::SearchBooks(input) => input.execute(client).await,
            ToolCall::GetBookDetails(input) => input.execute(client).await,
            ToolCall::GetUserLibrary(input) => input.execute(client).await,
            ToolCall::AddToLibrary(input) => input.execute(client).await,
            ToolCall::UpdateReadingStatus(input) => input.execute(client).await,
        }
    }
}

/// Pretty print response data for the caller
pub(crate) fn pretty(tool: ToolName, value: &Value) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value)
        .map_err(|error| ToolError::execution(tool, format!("unable to serialize result: {error}")))
}

/// Take `field` out of the response data
pub(crate) fn take_field(data: Value, field: &str) -> Value {
    match data {
        Value::Object(mut object) => object.remove(field).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
