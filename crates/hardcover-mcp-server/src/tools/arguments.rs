//! Typed access to a raw tool argument object
//!
//! Every accessor reports failures against the field it was asked for.
//! `null` counts as absent and unknown fields are never looked at.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use crate::errors::ToolError;
use crate::reading_status::ReadingStatus;

/// Largest value a GraphQL `Int` can carry
pub const GRAPHQL_INT_MAX: i64 = i32::MAX as i64;

/// Identifiers are positive GraphQL `Int`s
pub const ID_RANGE: RangeInclusive<i64> = 1..=GRAPHQL_INT_MAX;

/// Star ratings
pub(crate) const RATING_RANGE: RangeInclusive<i64> = 1..=5;

/// Reading progress, in percent
pub(crate) const PROGRESS_RANGE: RangeInclusive<i64> = 0..=100;

pub(crate) struct Arguments<'a>(&'a Map<String, Value>);

impl<'a> Arguments<'a> {
    pub(crate) fn new(arguments: &'a Map<String, Value>) -> Self {
        Self(arguments)
    }

    fn get(&self, field: &'static str) -> Option<&'a Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    pub(crate) fn required_string(&self, field: &'static str) -> Result<&'a str, ToolError> {
        match self.get(field) {
            None => Err(missing(field)),
            Some(Value::String(value)) => Ok(value),
            Some(other) => Err(wrong_type(field, "a string", other)),
        }
    }

    pub(crate) fn optional_integer(
        &self,
        field: &'static str,
        range: RangeInclusive<i64>,
    ) -> Result<Option<i64>, ToolError> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let Some(integer) = value.as_i64() else {
            return Err(wrong_type(field, "an integer", value));
        };
        if range.contains(&integer) {
            Ok(Some(integer))
        } else {
            Err(ToolError::invalid(
                field,
                format!(
                    "must be between {} and {}, got {integer}",
                    range.start(),
                    range.end()
                ),
            ))
        }
    }

    pub(crate) fn required_integer(
        &self,
        field: &'static str,
        range: RangeInclusive<i64>,
    ) -> Result<i64, ToolError> {
        self.optional_integer(field, range)?
            .ok_or_else(|| missing(field))
    }

    pub(crate) fn required_status(&self, field: &'static str) -> Result<ReadingStatus, ToolError> {
        self.required_string(field)?
            .parse()
            .map_err(|error| ToolError::invalid(field, format!("{error}")))
    }
}

fn missing(field: &'static str) -> ToolError {
    ToolError::invalid(field, "is required")
}

fn wrong_type(field: &'static str, expected: &str, found: &Value) -> ToolError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(number) if number.is_f64() => "a fractional number",
        Value::Number(number) if number.as_i64().is_none() => "an out of range number",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    ToolError::invalid(field, format!("must be {expected}, got {found}"))
}
