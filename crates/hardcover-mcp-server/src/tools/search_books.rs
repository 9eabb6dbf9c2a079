use std::ops::RangeInclusive;

use rmcp::model::{Tool, ToolAnnotations};
use rmcp::schemars::{self, JsonSchema};
use serde_json::{Map, Value, json};

use super::arguments::Arguments;
use super::{DEFAULT_SEARCH_LIMIT, Executable, ToolName, ToolSettings, pretty, take_field};
use crate::errors::ToolError;
use crate::json_schema::{schema_from_type, set_property_range};
use crate::queries::{QueryDocument, SEARCH_BOOKS};

/// Input for the search_books tool.
#[derive(Debug, PartialEq, JsonSchema)]
pub struct Input {
    /// The book title or author name to search for
    query: String,

    /// Maximum number of results to return
    #[schemars(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

/// Accepted `limit` values
fn limit_range(settings: &ToolSettings) -> RangeInclusive<i64> {
    1..=i64::from(settings.max_search_limit)
}

pub(crate) fn tool(settings: &ToolSettings) -> Tool {
    let mut schema = schema_from_type::<Input>();
    set_property_range(&mut schema, "limit", &limit_range(settings));
    Tool::new(
        ToolName::SearchBooks.as_str(),
        "Search for books on Hardcover by title or author. Results are ordered by popularity.",
        schema,
    )
    .annotate(ToolAnnotations::new().read_only(true))
}

impl Input {
    pub(crate) fn validate(
        arguments: &Arguments<'_>,
        settings: &ToolSettings,
    ) -> Result<Self, ToolError> {
        let query = arguments.required_string("query")?.trim();
        if query.is_empty() {
            return Err(ToolError::invalid("query", "must not be empty"));
        }
        let limit = arguments
            .optional_integer("limit", limit_range(settings))?
            .map(u32::try_from)
            .transpose()
            .map_err(|_| ToolError::invalid("limit", "is out of range"))?
            .unwrap_or_else(default_limit);

        Ok(Self {
            query: query.to_string(),
            limit,
        })
    }
}

/// Wrap `query` for a substring `_ilike` match.
///
/// `%` and `_` in the caller's text are escaped so they match literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Executable for Input {
    const NAME: ToolName = ToolName::SearchBooks;

    fn document(&self) -> &'static QueryDocument {
        &SEARCH_BOOKS
    }

    fn variables(&self) -> Map<String, Value> {
        let mut variables = Map::new();
        variables.insert("query".to_string(), json!(like_pattern(&self.query)));
        variables.insert("limit".to_string(), json!(self.limit));
        variables
    }

    fn render(&self, data: Value) -> Result<String, ToolError> {
        let books = match take_field(data, "books") {
            Value::Null => Value::Array(Vec::new()),
            books => books,
        };
        pretty(Self::NAME, &books)
    }
}
