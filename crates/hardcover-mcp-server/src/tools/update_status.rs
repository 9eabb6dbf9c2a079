use rmcp::model::{Tool, ToolAnnotations};
use rmcp::schemars::{self, JsonSchema};
use serde_json::{Map, Value, json};

use super::arguments::{Arguments, ID_RANGE, PROGRESS_RANGE, RATING_RANGE};
use super::{Executable, ToolName, take_field};
use crate::errors::ToolError;
use crate::json_schema::{schema_from_type, set_property_range};
use crate::queries::{QueryDocument, UPDATE_READING_STATUS};
use crate::reading_status::ReadingStatus;

/// Input for the update_reading_status tool.
#[derive(Debug, PartialEq, JsonSchema)]
pub struct Input {
    /// The library entry ID, as returned by get_user_library
    id: i64,

    /// The new reading status
    status: ReadingStatus,

    /// Star rating
    rating: Option<i64>,

    /// Reading progress as a percentage
    progress: Option<i64>,
}

pub(crate) fn tool() -> Tool {
    let mut schema = schema_from_type::<Input>();
    set_property_range(&mut schema, "id", &ID_RANGE);
    set_property_range(&mut schema, "rating", &RATING_RANGE);
    set_property_range(&mut schema, "progress", &PROGRESS_RANGE);
    Tool::new(
        ToolName::UpdateReadingStatus.as_str(),
        "Update the reading status of a library entry, optionally with a rating and progress.",
        schema,
    )
    .annotate(ToolAnnotations::new().read_only(false))
}

impl Input {
    pub(crate) fn validate(arguments: &Arguments<'_>) -> Result<Self, ToolError> {
        Ok(Self {
            id: arguments.required_integer("id", ID_RANGE)?,
            status: arguments.required_status("status")?,
            rating: arguments.optional_integer("rating", RATING_RANGE)?,
            progress: arguments.optional_integer("progress", PROGRESS_RANGE)?,
        })
    }
}

impl Executable for Input {
    const NAME: ToolName = ToolName::UpdateReadingStatus;

    fn document(&self) -> &'static QueryDocument {
        &UPDATE_READING_STATUS
    }

    fn variables(&self) -> Map<String, Value> {
        let mut variables = Map::new();
        variables.insert("id".to_string(), json!(self.id));
        variables.insert("status".to_string(), json!(self.status.wire_value()));
        if let Some(rating) = self.rating {
            variables.insert("rating".to_string(), json!(rating));
        }
        if let Some(progress) = self.progress {
            variables.insert("progress".to_string(), json!(progress));
        }
        variables
    }

    fn render(&self, data: Value) -> Result<String, ToolError> {
        if take_field(data, "update_user_books_by_pk").is_null() {
            return Err(ToolError::NotFound(format!(
                "Library entry with ID {} not found",
                self.id
            )));
        }

        let rating = self
            .rating
            .map_or_else(|| "N/A".to_string(), |rating| rating.to_string());
        let progress = self
            .progress
            .map_or_else(|| "N/A".to_string(), |progress| format!("{progress}%"));
        Ok(format!(
            "Updated library entry {} - Status: {}, Rating: {rating}, Progress: {progress}",
            self.id,
            self.status.label()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn validate(arguments: Value) -> Result<Input, ToolError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Input::validate(&Arguments::new(&arguments))
    }

    #[test]
    fn optional_fields_are_only_bound_when_given() {
        let bare = validate(json!({ "id": 5, "status": "read" })).unwrap();
        let full = validate(json!({
            "id": 5,
            "status": "currently reading",
            "rating": 4,
            "progress": 60,
        }))
        .unwrap();

        assert_eq!(
            Value::Object(bare.variables()),
            json!({ "id": 5, "status": "READ" })
        );
        assert_eq!(
            Value::Object(full.variables()),
            json!({ "id": 5, "status": "CURRENTLY_READING", "rating": 4, "progress": 60 })
        );
    }

    #[rstest]
    #[case(json!({ "status": "read" }), "id")]
    #[case(json!({ "id": 5 }), "status")]
    #[case(json!({ "id": 5, "status": "read", "rating": 0 }), "rating")]
    #[case(json!({ "id": 5, "status": "read", "rating": 6 }), "rating")]
    #[case(json!({ "id": 5, "status": "read", "rating": 4.5 }), "rating")]
    #[case(json!({ "id": 5, "status": "read", "progress": -1 }), "progress")]
    #[case(json!({ "id": 5, "status": "read", "progress": 150 }), "progress")]
    fn invalid_input_names_the_field(#[case] arguments: Value, #[case] expected: &str) {
        match validate(arguments) {
            Err(ToolError::InvalidParameters { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid parameters, got {other:?}"),
        }
    }

    #[rstest]
    #[case(json!({ "id": 5, "status": "read", "rating": 1, "progress": 0 }))]
    #[case(json!({ "id": 5, "status": "read", "rating": 5, "progress": 100 }))]
    #[case(json!({ "id": 5, "status": "read", "rating": null, "progress": null }))]
    fn boundaries_are_accepted(#[case] arguments: Value) {
        assert!(validate(arguments).is_ok());
    }

    #[rstest]
    #[case("id")]
    #[case("rating")]
    #[case("progress")]
    fn the_advertised_bounds_are_the_validated_bounds(#[case] field: &str) {
        let schema = tool().input_schema;
        let property = schema
            .get("properties")
            .and_then(|properties| properties.get(field))
            .unwrap();
        let minimum = property.get("minimum").and_then(Value::as_i64).unwrap();
        let maximum = property.get("maximum").and_then(Value::as_i64).unwrap();

        let with = |value: i64| {
            let mut arguments = json!({ "id": 5, "status": "read" });
            if let Value::Object(map) = &mut arguments {
                map.insert(field.to_string(), json!(value));
            }
            validate(arguments)
        };

        assert!(with(minimum).is_ok());
        assert!(with(maximum).is_ok());
        assert!(with(minimum - 1).is_err());
        assert!(with(maximum + 1).is_err());
    }

    #[test]
    fn confirms_the_update() {
        let input = validate(json!({
            "id": 5,
            "status": "read",
            "rating": 5,
            "progress": 100,
        }))
        .unwrap();

        let text = input
            .render(json!({ "update_user_books_by_pk": { "id": 5 } }))
            .unwrap();

        assert_eq!(
            text,
            "Updated library entry 5 - Status: read, Rating: 5, Progress: 100%"
        );
    }

    #[test]
    fn missing_optional_fields_read_as_not_applicable() {
        let input = validate(json!({ "id": 5, "status": "did not finish" })).unwrap();

        let text = input
            .render(json!({ "update_user_books_by_pk": { "id": 5 } }))
            .unwrap();

        assert_eq!(
            text,
            "Updated library entry 5 - Status: did not finish, Rating: N/A, Progress: N/A"
        );
    }

    #[test]
    fn a_null_update_is_not_found() {
        let input = validate(json!({ "id": 5, "status": "read" })).unwrap();

        assert_eq!(
            input.render(json!({ "update_user_books_by_pk": null })),
            Err(ToolError::NotFound(
                "Library entry with ID 5 not found".to_string()
            ))
        );
    }
}
