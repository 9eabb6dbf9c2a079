use rmcp::model::{Tool, ToolAnnotations};
use rmcp::schemars::{self, JsonSchema};
use serde_json::{Map, Value, json};

use super::arguments::{Arguments, ID_RANGE};
use super::{Executable, ToolName, take_field};
use crate::errors::ToolError;
use crate::json_schema::{schema_from_type, set_property_range};
use crate::queries::{ADD_BOOK_TO_LIBRARY, QueryDocument};
use crate::reading_status::ReadingStatus;

/// Input for the add_to_library tool.
#[derive(Debug, PartialEq, JsonSchema)]
pub struct Input {
    /// The Hardcover book ID to add
    #[schemars(rename = "bookId")]
    book_id: i64,

    /// Reading status for the new library entry
    status: ReadingStatus,
}

pub(crate) fn tool() -> Tool {
    let mut schema = schema_from_type::<Input>();
    set_property_range(&mut schema, "bookId", &ID_RANGE);
    Tool::new(
        ToolName::AddToLibrary.as_str(),
        "Add a book to the user's library with a reading status.",
        schema,
    )
    .annotate(ToolAnnotations::new().read_only(false))
}

impl Input {
    pub(crate) fn validate(arguments: &Arguments<'_>) -> Result<Self, ToolError> {
        Ok(Self {
            book_id: arguments.required_integer("bookId", ID_RANGE)?,
            status: arguments.required_status("status")?,
        })
    }
}

impl Executable for Input {
    const NAME: ToolName = ToolName::AddToLibrary;

    fn document(&self) -> &'static QueryDocument {
        &ADD_BOOK_TO_LIBRARY
    }

    fn variables(&self) -> Map<String, Value> {
        let mut variables = Map::new();
        variables.insert("bookId".to_string(), json!(self.book_id));
        variables.insert("status".to_string(), json!(self.status.wire_value()));
        variables
    }

    fn render(&self, data: Value) -> Result<String, ToolError> {
        let entry = take_field(data, "insert_user_books_one");
        if entry.is_null() {
            return Err(ToolError::execution(
                Self::NAME,
                format!("book {} was not added to the library", self.book_id),
            ));
        }

        let mut text = format!(
            "Added book {} to library with status: {}",
            self.book_id,
            self.status.label()
        );
        if let Some(id) = entry.get("id").filter(|id| !id.is_null()) {
            text.push_str(&format!(" (library entry {id})"));
        }
        Ok(text)
    }
}
