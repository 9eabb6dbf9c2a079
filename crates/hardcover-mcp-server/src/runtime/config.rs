use std::num::NonZeroU32;
use std::time::Duration;

use hardcover_mcp_server::server::Transport;
use hardcover_mcp_server::tools::{DEFAULT_MAX_SEARCH_LIMIT, ID_RANGE, ToolSettings};
use reqwest::header::HeaderMap;
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use super::{endpoint::Endpoint, logging::Logging};

/// Configuration for the MCP server
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// The Hardcover GraphQL endpoint
    #[schemars(schema_with = "Url::json_schema")]
    pub endpoint: Endpoint,

    /// Hardcover API key, sent as a bearer token. Usually provided through the
    /// `HARDCOVER_API_KEY` environment variable.
    #[schemars(with = "Option<String>")]
    pub api_key: Option<SecretString>,

    /// Library owner used when `get_user_library` is called without a user
    #[serde(deserialize_with = "parsers::user_id")]
    #[schemars(schema_with = "schemas::user_id")]
    pub user_id: Option<i64>,

    /// How long to wait for the Hardcover API before giving up on a request
    #[serde(deserialize_with = "humantime_serde::deserialize")]
    #[schemars(with = "String")]
    pub timeout: Duration,

    /// List of hard-coded headers to include in all GraphQL requests
    #[serde(deserialize_with = "parsers::map_from_str")]
    #[schemars(schema_with = "schemas::header_map")]
    pub headers: HeaderMap,

    /// Search tool options
    pub search: Search,

    /// Logging configuration
    pub logging: Logging,

    /// The type of server transport to use
    pub transport: Transport,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            api_key: None,
            user_id: None,
            timeout: defaults::timeout(),
            headers: HeaderMap::new(),
            search: Search::default(),
            logging: Logging::default(),
            transport: Transport::default(),
        }
    }
}

impl Config {
    /// Settings shared by every tool call
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            max_search_limit: self.search.max_limit.get(),
            default_user_id: self.user_id,
        }
    }
}

/// Options for the `search_books` tool
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Search {
    /// Largest number of results a single search may request
    pub max_limit: NonZeroU32,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            max_limit: defaults::max_limit(),
        }
    }
}

mod defaults {
    use std::num::NonZeroU32;
    use std::time::Duration;

    use super::DEFAULT_MAX_SEARCH_LIMIT;

    pub(super) const fn timeout() -> Duration {
        Duration::from_secs(30)
    }

    pub(super) fn max_limit() -> NonZeroU32 {
        NonZeroU32::new(DEFAULT_MAX_SEARCH_LIMIT).unwrap_or(NonZeroU32::MIN)
    }
}

mod schemas {
    use std::collections::HashMap;

    use schemars::JsonSchema;
    use serde_json::json;

    use super::ID_RANGE;

    pub(super) fn header_map(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        HashMap::<String, String>::json_schema(generator)
    }

    pub(super) fn user_id(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        let mut schema = Option::<i64>::json_schema(generator);
        schema.insert("minimum".to_string(), json!(ID_RANGE.start()));
        schema.insert("maximum".to_string(), json!(ID_RANGE.end()));
        schema
    }
}

mod parsers {
    use std::str::FromStr;

    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use serde::{Deserialize, Deserializer};

    use super::ID_RANGE;

    /// A positive id that fits a GraphQL `Int`
    pub(super) fn user_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            Some(id) if !ID_RANGE.contains(&id) => Err(serde::de::Error::custom(format!(
                "user_id must be between {} and {}, got {id}",
                ID_RANGE.start(),
                ID_RANGE.end()
            ))),
            id => Ok(id),
        }
    }

    pub(super) fn map_from_str<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapFromStrVisitor;
        impl<'de> serde::de::Visitor<'de> for MapFromStrVisitor {
            type Value = HeaderMap;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of header string keys and values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut parsed = HeaderMap::with_capacity(map.size_hint().unwrap_or(0));

                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    let key = HeaderName::from_str(&key)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
                    let value = HeaderValue::from_str(&value)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;

                    parsed.insert(key, value);
                }

                Ok(parsed)
            }
        }

        deserializer.deserialize_map(MapFromStrVisitor)
    }
}
