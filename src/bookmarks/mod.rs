// src/bookmarks/mod.rs
// =============================================================================
// This module defines what a bookmark looks like and how it is read from
// disk or stdin.
//
// Submodules:
// - source: Parses bookmark lists (JSON export or plain text, one URL a line)
//
// The JSON field names follow the bookmark export format:
//   href, description, extended, meta, hash, time,
//   shared ("yes"/"no"), toread ("yes"/"no"), tags (space-joined string)
// plus an optional "failure" object that the JSON reporter fills in.
//
// Rust concepts:
// - serde attributes: Rename fields and plug in custom (de)serializers
// - Option<T>: Fields that may be missing in the input
// =============================================================================

mod source;

pub use source::{parse_json, parse_text, read_bookmarks, InputFormat};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved link and its metadata.
///
/// The checker never mutates a bookmark. The `failure` field is only set by
/// the JSON reporter when it writes out failed lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// The URL that gets checked
    pub href: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extended: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meta: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hash: String,

    /// When the bookmark was saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    #[serde(default, with = "yes_no")]
    pub shared: bool,

    #[serde(default, rename = "toread", with = "yes_no")]
    pub to_read: bool,

    #[serde(default, with = "space_joined")]
    pub tags: Vec<String>,

    /// Why the last check of this bookmark failed
    #[serde(default, rename = "failure", skip_serializing_if = "Option::is_none")]
    pub failure_info: Option<FailureInfo>,
}

impl Bookmark {
    /// Creates a bookmark that only knows its URL (used for plain text input)
    pub fn from_href(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

/// Details about a failed lookup, attached to a bookmark on JSON output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureInfo {
    /// HTTP status of the final response, absent if no response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,

    /// Transport error text, absent if the server did answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

// Booleans are written as the strings "yes" and "no".
// Anything other than "yes" reads back as false.
mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(value == "yes")
    }
}

// Tags travel as one space-separated string. An empty string means no tags.
mod space_joined {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&tags.join(" "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(value.split_whitespace().map(str::to_string).collect())
    }
}
