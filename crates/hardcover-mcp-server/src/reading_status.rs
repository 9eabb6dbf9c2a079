//! Reading statuses shared by the library tools
//!
//! Callers speak in human labels (`want to read`), the GraphQL mutations take
//! an upper snake case string (`WANT_TO_READ`).

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ReadingStatus {
    #[serde(rename = "want to read")]
    WantToRead,
    #[serde(rename = "currently reading")]
    CurrentlyReading,
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "did not finish")]
    DidNotFinish,
}

impl ReadingStatus {
    /// Every status, in the order they are offered to callers
    pub const ALL: [ReadingStatus; 4] = [
        ReadingStatus::WantToRead,
        ReadingStatus::CurrentlyReading,
        ReadingStatus::Read,
        ReadingStatus::DidNotFinish,
    ];

    /// The label shown to callers
    pub const fn label(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want to read",
            ReadingStatus::CurrentlyReading => "currently reading",
            ReadingStatus::Read => "read",
            ReadingStatus::DidNotFinish => "did not finish",
        }
    }

    /// The value bound to the `$status` GraphQL variable
    pub const fn wire_value(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "WANT_TO_READ",
            ReadingStatus::CurrentlyReading => "CURRENTLY_READING",
            ReadingStatus::Read => "READ",
            ReadingStatus::DidNotFinish => "DID_NOT_FINISH",
        }
    }

    /// Every accepted label, in [`ReadingStatus::ALL`] order
    pub fn labels() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Self::label)
    }
}

/// Letters only, lowercased, so that `want to read`, `WANT_TO_READ` and
/// `wanttoread` compare equal.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("must be one of: {}", ReadingStatus::labels().collect::<Vec<_>>().join(", "))]
pub struct UnknownStatus;

impl FromStr for ReadingStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(value);
        if wanted.is_empty() {
            return Err(UnknownStatus);
        }
        Self::ALL
            .into_iter()
            .find(|status| normalize(status.label()) == wanted)
            .ok_or(UnknownStatus)
    }
}

impl Display for ReadingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
