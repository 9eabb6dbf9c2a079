use rmcp::model::{Tool, ToolAnnotations};
use rmcp::schemars::{self, JsonSchema};
use serde_json::{Map, Value, json};

use super::arguments::{Arguments, ID_RANGE};
use super::{Executable, ToolName, ToolSettings, pretty, take_field};
use crate::errors::ToolError;
use crate::json_schema::{schema_from_type, set_property_range};
use crate::queries::{GET_MY_LIBRARY, GET_USER_LIBRARY, QueryDocument};

/// Input for the get_user_library tool.
#[derive(Debug, PartialEq, JsonSchema)]
pub struct Input {
    /// The Hardcover user ID whose library to list. Defaults to the configured
    /// user, or the owner of the API key.
    #[schemars(rename = "userId")]
    user_id: Option<i64>,
}

pub(crate) fn tool() -> Tool {
    let mut schema = schema_from_type::<Input>();
    set_property_range(&mut schema, "userId", &ID_RANGE);
    Tool::new(
        ToolName::GetUserLibrary.as_str(),
        "Get a user's book library with reading status, rating and progress, most recently updated first.",
        schema,
    )
    .annotate(ToolAnnotations::new().read_only(true))
}

impl Input {
    pub(crate) fn validate(
        arguments: &Arguments<'_>,
        settings: &ToolSettings,
    ) -> Result<Self, ToolError> {
        let user_id = arguments
            .optional_integer("userId", ID_RANGE)?
            .or(settings.default_user_id);
        Ok(Self { user_id })
    }
}

impl Executable for Input {
    const NAME: ToolName = ToolName::GetUserLibrary;

    fn document(&self) -> &'static QueryDocument {
        match self.user_id {
            Some(_) => &GET_USER_LIBRARY,
            None => &GET_MY_LIBRARY,
        }
    }

    fn variables(&self) -> Map<String, Value> {
        let mut variables = Map::new();
        if let Some(user_id) = self.user_id {
            variables.insert("userId".to_string(), json!(user_id));
        }
        variables
    }

    fn render(&self, data: Value) -> Result<String, ToolError> {
        let entries = match self.user_id {
            Some(_) => entries(take_field(data, "user_books")),
            // `me` is a list of one user on Hardcover, tolerate a bare object too
            None => match take_field(data, "me") {
                Value::Array(users) => users
                    .into_iter()
                    .flat_map(|user| entries(take_field(user, "user_books")))
                    .collect(),
                user => entries(take_field(user, "user_books")),
            },
        };
        pretty(Self::NAME, &Value::Array(entries))
    }
}

fn entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(entries) => entries,
        _ => Vec::new(),
    }
}
