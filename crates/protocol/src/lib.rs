//! # Pervasive Protocol
//!
//! Shared data types for the pervasive URL tools: the crawl [`Record`] as it
//! arrives from a monthly snapshot, the [`MonthKey`] used to address those
//! snapshots, and the URL helpers every stage uses to split a URL into its
//! origin and path.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod lenient;
pub mod month;
pub mod url_parts;

pub use month::MonthKey;
pub use url_parts::{filename, segment_count, split_url, UrlParts};

/// Header map with lowercased names; repeated headers are comma-joined.
pub type HeaderMap = BTreeMap<String, String>;

/// One (url, content hash) row of a monthly crawl sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Absolute URL without a query string
    #[serde(default)]
    pub url: String,

    /// Fetch destination (`script`, `style`, `empty`, ...)
    #[serde(default, alias = "dest")]
    pub destination_type: Option<String>,

    /// Response body size in bytes
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub size: u64,

    #[serde(default, deserialize_with = "lenient::de_headers")]
    pub request_headers: HeaderMap,

    #[serde(default, deserialize_with = "lenient::de_headers")]
    pub response_headers: HeaderMap,

    /// Opaque body hash; records without one are invalid
    #[serde(default, alias = "body_hash")]
    pub content_hash: Option<String>,

    /// How often this (url, hash) pair was seen in the month's sample
    #[serde(default, alias = "num", deserialize_with = "lenient::de_u64")]
    pub occurrence_count: u64,
}

impl Record {
    pub fn new(
        url: impl Into<String>,
        destination_type: impl Into<String>,
        size: u64,
        content_hash: impl Into<String>,
        occurrence_count: u64,
    ) -> Self {
        Self {
            url: url.into(),
            destination_type: Some(destination_type.into()),
            size,
            request_headers: HeaderMap::new(),
            response_headers: HeaderMap::new(),
            content_hash: Some(content_hash.into()),
            occurrence_count,
        }
    }
}

/// Collapse `(name, value)` pairs into a [`HeaderMap`].
///
/// Names are lowercased; a name seen more than once keeps every value,
/// joined with `", "` in order of appearance.
pub fn normalize_headers<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        merge_header(&mut headers, name, value);
    }
    headers
}

fn merge_header(headers: &mut HeaderMap, name: &str, value: &str) {
    let name = name.to_ascii_lowercase();
    match headers.get_mut(&name) {
        Some(existing) => {
            existing.push_str(", ");
            existing.push_str(value);
        }
        None => {
            headers.insert(name, value.to_string());
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}
