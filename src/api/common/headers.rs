//
//  gitlab-tools
//  api/common/headers.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Response Header Normalization
//!
//! Transport layers hand back headers in different shapes: a `HeaderMap`
//! with repeated entries, or a loose map whose values are either a single
//! string or an array of strings. [`NormalizedHeaders`] flattens all of them
//! into one lowercase-keyed map with a single string per key, joining
//! repeated values with `", "`.
//!
//! Normalization never fails. Values that are not valid UTF-8 are decoded
//! lossily and keys that are missing are simply absent.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::Deserialize;

/// A raw header value as delivered by a loosely-typed transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawHeaderValue {
    /// A single header value
    Single(String),
    /// A repeated header, one entry per occurrence
    Multiple(Vec<String>),
}

impl From<&str> for RawHeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<&str>> for RawHeaderValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(String::from).collect())
    }
}

/// Lowercased header name to single string value.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::common::{NormalizedHeaders, RawHeaderValue};
///
/// let headers = NormalizedHeaders::from_raw([
///     ("X-Next-Page", RawHeaderValue::from("3")),
///     ("Link", RawHeaderValue::from(vec!["<a>", "<b>"])),
/// ]);
/// assert_eq!(headers.get("x-next-page"), Some("3"));
/// assert_eq!(headers.get("link"), Some("<a>, <b>"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedHeaders {
    values: BTreeMap<String, String>,
}

impl NormalizedHeaders {
    /// Flattens a reqwest/http header map.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Self::default();
        for (name, value) in map {
            let value = match value.to_str() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            headers.append(name.as_str(), value);
        }
        headers
    }

    /// Flattens a loosely-typed header collection.
    ///
    /// Keys are matched case-insensitively; two spellings of the same key
    /// are merged in iteration order.
    pub fn from_raw<K, I>(raw: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, RawHeaderValue)>,
    {
        let mut headers = Self::default();
        for (name, value) in raw {
            match value {
                RawHeaderValue::Single(v) => headers.append(name.as_ref(), v),
                RawHeaderValue::Multiple(vs) => {
                    for v in vs {
                        headers.append(name.as_ref(), v);
                    }
                }
            }
        }
        headers
    }

    fn append(&mut self, name: &str, value: String) {
        self.values
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    /// Looks up a header by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns `true` if no headers are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn test_from_header_map_joins_repeated_values() {
        let mut map = HeaderMap::new();
        map.append("x-total", HeaderValue::from_static("120"));
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));

        let headers = NormalizedHeaders::from_header_map(&map);
        assert_eq!(headers.get("x-total"), Some("120"));
        assert_eq!(headers.get("Set-Cookie"), Some("a=1, b=2"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_from_header_map_non_utf8_is_lossy() {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static("x-odd"),
            HeaderValue::from_bytes(b"caf\xe9").unwrap(),
        );
        let headers = NormalizedHeaders::from_header_map(&map);
        assert!(headers.get("x-odd").unwrap().starts_with("caf"));
    }

    #[test]
    fn test_from_raw_mixed_values_and_case() {
        let headers = NormalizedHeaders::from_raw(vec![
            ("X-Total-Pages", RawHeaderValue::from("4")),
            ("Vary", RawHeaderValue::from(vec!["Accept", "Origin"])),
            ("vary", RawHeaderValue::from("Accept-Encoding")),
            ("X-Empty", RawHeaderValue::Multiple(vec![])),
        ]);
        assert_eq!(headers.get("x-total-pages"), Some("4"));
        assert_eq!(headers.get("vary"), Some("Accept, Origin, Accept-Encoding"));
        assert_eq!(headers.get("x-empty"), None);
        assert_eq!(headers.get("missing"), None);
    }

    #[test]
    fn test_raw_value_deserializes_from_json() {
        let raw: BTreeMap<String, RawHeaderValue> =
            serde_json::from_str(r#"{"X-Next-Page":"2","Link":["<a>","<b>"]}"#).unwrap();
        let headers = NormalizedHeaders::from_raw(raw);
        assert_eq!(headers.get("x-next-page"), Some("2"));
        assert_eq!(headers.get("link"), Some("<a>, <b>"));
    }
}
