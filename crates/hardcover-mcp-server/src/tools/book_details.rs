use rmcp::model::{Tool, ToolAnnotations};
use rmcp::schemars::{self, JsonSchema};
use serde_json::{Map, Value, json};

use super::arguments::{Arguments, ID_RANGE};
use super::{Executable, ToolName, pretty, take_field};
use crate::errors::ToolError;
use crate::json_schema::{schema_from_type, set_property_range};
use crate::queries::{GET_BOOK_DETAILS, QueryDocument};

/// Input for the get_book_details tool.
#[derive(Debug, PartialEq, JsonSchema)]
pub struct Input {
    /// The Hardcover book ID
    id: i64,
}

pub(crate) fn tool() -> Tool {
    let mut schema = schema_from_type::<Input>();
    set_property_range(&mut schema, "id", &ID_RANGE);
    Tool::new(
        ToolName::GetBookDetails.as_str(),
        "Get detailed information about a specific book, including authors, series and recent reviews.",
        schema,
    )
    .annotate(ToolAnnotations::new().read_only(true))
}

impl Input {
    pub(crate) fn validate(arguments: &Arguments<'_>) -> Result<Self, ToolError> {
        Ok(Self {
            id: arguments.required_integer("id", ID_RANGE)?,
        })
    }
}

impl Executable for Input {
    const NAME: ToolName = ToolName::GetBookDetails;

    fn document(&self) -> &'static QueryDocument {
        &GET_BOOK_DETAILS
    }

    fn variables(&self) -> Map<String, Value> {
        let mut variables = Map::new();
        variables.insert("id".to_string(), json!(self.id));
        variables
    }

    fn render(&self, data: Value) -> Result<String, ToolError> {
        match take_field(data, "books_by_pk") {
            Value::Null => Err(ToolError::NotFound(format!(
                "Book with ID {} not found",
                self.id
            ))),
            book => pretty(Self::NAME, &book),
        }
    }
}
