//! An MCP server exposing the Hardcover book catalog and reading library as tools

pub mod errors;
pub mod graphql;
pub(crate) mod json_schema;
pub mod queries;
pub mod reading_status;
pub mod server;
pub mod server_handler;
pub mod tools;
