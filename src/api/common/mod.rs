//
//  gitlab-tools
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the GitLab Gateway
//!
//! This module provides the types shared by every resource module: the error
//! taxonomy, project/user identifiers, and the paginated result wrapper.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all gateway operations
//! - [`ErrorKind`] - The coarse failure class every [`ApiError`] resolves to
//! - [`Identifier`] - Numeric id or path/name used to address an entity
//! - [`Paginated`] - A page of data plus its [`PaginationInfo`]
//! - Header normalization (re-exported from [`headers`])
//! - Pagination types (re-exported from [`pagination`])
//!
//! # Example
//!
//! ```rust
//! use gitlab_tools::api::common::{ApiError, ErrorKind};
//!
//! fn describe(result: Result<(), ApiError>) -> &'static str {
//!     match result {
//!         Ok(()) => "ok",
//!         Err(e) if e.kind() == ErrorKind::NotFound => "missing",
//!         Err(_) => "failed",
//!     }
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod headers;
mod pagination;

pub use headers::*;
pub use pagination::*;

/// Coarse failure classes surfaced to callers.
///
/// Every [`ApiError`] maps onto exactly one kind, so a caller can decide how
/// to react without inspecting transport internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, rejected before or by the remote (HTTP 400).
    Validation,
    /// Missing role or capability (HTTP 401/403 or the read-only gate).
    Permission,
    /// The entity does not exist or is not visible (HTTP 404).
    NotFound,
    /// The write collides with existing state (HTTP 409).
    Conflict,
    /// The request referenced something the remote cannot process (HTTP 422).
    Unprocessable,
    /// Network failures, rate limits, server errors and unexpected statuses.
    Transport,
}

impl ErrorKind {
    /// Returns the stable name used in tool failure envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Permission => "permission",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unprocessable => "unprocessable",
            Self::Transport => "transport",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for all GitLab gateway operations.
///
/// # Variants
///
/// | Variant | Description | Kind |
/// |---------|-------------|------|
/// | `Validation` | Bad input caught before any network call | Validation |
/// | `BadRequest` | Remote rejected the parameters (400) | Validation |
/// | `AuthFailed` | Token missing, expired or revoked (401) | Permission |
/// | `Forbidden` | Role too low for the operation (403) | Permission |
/// | `ReadOnly` | Mutation refused by the read-only gate | Permission |
/// | `NotFound` | Entity does not exist (404) | NotFound |
/// | `Conflict` | Duplicate or conflicting write (409) | Conflict |
/// | `Unprocessable` | Unknown reference or invalid state (422) | Unprocessable |
/// | `RateLimited` | Too many requests (429) | Transport |
/// | `ServerError` | Remote failure (5xx) | Transport |
/// | `Unexpected` | Any other non-success status | Transport |
/// | `Network` | Connection, timeout or decoding failure | Transport |
/// | `Io` | Local file failure while saving a download | Transport |
/// | `Unknown` | Anything else, such as a panicked lookup task | Transport |
///
/// # Notes
///
/// - Nothing in this crate retries on any of these; callers decide.
/// - Messages are human-readable and include the status code or field.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Input failed local validation and no request was issued.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The offending parameter
        field: String,
        /// What was wrong with it
        message: String,
    },

    /// The remote rejected the request parameters (HTTP 400).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication failed due to a missing, invalid or expired token.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The token's role is insufficient (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A mutating operation was refused because read-only mode is on.
    #[error("{0}")]
    ReadOnly(String),

    /// The requested resource was not found (HTTP 404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The write conflicts with existing state (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The remote could not process the request (HTTP 422).
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// API rate limit has been exceeded (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The GitLab instance failed (HTTP 5xx).
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Any other non-success status.
    #[error("Unexpected response ({status}): {message}")]
    Unexpected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// A network-level error occurred during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A local I/O error occurred while writing a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unknown or unexpected error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// Creates a validation error for the given parameter.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classifies a non-success HTTP status and body into a typed error.
    ///
    /// The body is reduced to GitLab's error message when it can be parsed,
    /// see [`extract_error_message`].
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_error_message(status, body);
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(message),
            StatusCode::UNAUTHORIZED => Self::AuthFailed(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => Self::Unprocessable(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            s if s.is_server_error() => Self::ServerError {
                status: s.as_u16(),
                message,
            },
            s => Self::Unexpected {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) => ErrorKind::Validation,
            Self::AuthFailed(_) | Self::Forbidden(_) | Self::ReadOnly(_) => ErrorKind::Permission,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unprocessable(_) => ErrorKind::Unprocessable,
            Self::RateLimited
            | Self::ServerError { .. }
            | Self::Unexpected { .. }
            | Self::Network(_)
            | Self::Io(_)
            | Self::Unknown(_) => ErrorKind::Transport,
        }
    }

    /// Returns the HTTP status behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Unprocessable(_) => Some(422),
            Self::RateLimited => Some(429),
            Self::ServerError { status, .. } | Self::Unexpected { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::Validation { .. } | Self::ReadOnly(_) | Self::Io(_) | Self::Unknown(_) => None,
        }
    }

    /// Returns the offending field for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns `true` when the remote said the entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Extracts a human-readable message from a GitLab error body.
///
/// GitLab answers errors in a few shapes:
///
/// ```json
/// {"message": "404 Project Not Found"}
/// {"message": {"tag_name": ["is invalid"]}}
/// {"error": "insufficient_scope", "error_description": "..."}
/// ```
///
/// Field maps are flattened to `field: first error` pairs. When the body is
/// not JSON (or empty) the status reason is used, followed by the raw body.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        match json.get("message") {
            Some(serde_json::Value::String(message)) => return message.clone(),
            Some(serde_json::Value::Object(fields)) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(field, errors)| {
                        let detail = match errors {
                            serde_json::Value::Array(items) => items
                                .iter()
                                .filter_map(|e| e.as_str())
                                .collect::<Vec<_>>()
                                .join(", "),
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        format!("{field}: {detail}")
                    })
                    .collect();
                if !parts.is_empty() {
                    return parts.join("; ");
                }
            }
            _ => {}
        }

        if let Some(description) = json.get("error_description").and_then(|m| m.as_str()) {
            return description.to_string();
        }

        if let Some(error) = json.get("error").and_then(|m| m.as_str()) {
            return error.to_string();
        }
    }

    let reason = status.canonical_reason().unwrap_or("Unknown status");
    let body = body.trim();
    if body.is_empty() {
        reason.to_string()
    } else {
        format!("{reason}: {body}")
    }
}

/// Addresses a project, group or user either by numeric id or by name.
///
/// Projects and groups accept their full namespaced path as the name
/// (`group/subgroup/project`); users accept their username. When used in an
/// API path the name is percent-encoded as a single segment, so the `/`
/// separators become `%2F`.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::common::Identifier;
///
/// let by_id: Identifier = "42".parse().unwrap();
/// assert_eq!(by_id, Identifier::Numeric(42));
///
/// let by_path: Identifier = "group/project".parse().unwrap();
/// assert_eq!(by_path, Identifier::Named("group/project".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Globally unique numeric id
    Numeric(u64),
    /// Namespaced path or username
    Named(String),
}

impl Identifier {
    /// Returns the raw (not yet encoded) path segment for this identifier.
    pub fn as_segment(&self) -> String {
        match self {
            Self::Numeric(id) => id.to_string(),
            Self::Named(name) => name.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for Identifier {
    type Err = ApiError;

    /// All-digit input becomes [`Identifier::Numeric`], anything else non-blank
    /// becomes [`Identifier::Named`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ApiError::validation("identifier", "must not be empty"));
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<u64>() {
                return Ok(Self::Numeric(id));
            }
        }
        Ok(Self::Named(trimmed.to_string()))
    }
}

impl From<u64> for Identifier {
    fn from(id: u64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// One page of results together with its pagination descriptor.
///
/// # Type Parameters
///
/// - `T` - The page payload, usually a `Vec` of normalized entities
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// The page payload
    pub data: T,
    /// Pagination derived from the response headers
    pub pagination: PaginationInfo,
}

impl<T> Paginated<T> {
    /// Transforms the payload while keeping the pagination descriptor.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Paginated<U> {
        Paginated {
            data: f(self.data),
            pagination: self.pagination,
        }
    }
}

impl<T> Paginated<Vec<T>> {
    /// Converts every item of the page, typically remote into normalized shape.
    pub fn convert<U: From<T>>(self) -> Paginated<Vec<U>> {
        self.map(|items| items.into_iter().map(U::from).collect())
    }
}

/// Checks that `value` is an ISO-8601 date (`2024-05-01`) or RFC 3339
/// timestamp (`2024-05-01T10:00:00Z`), returning it trimmed.
pub fn validate_timestamp(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    let valid = chrono::DateTime::parse_from_rfc3339(value).is_ok()
        || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if valid {
        Ok(value.to_string())
    } else {
        Err(ApiError::validation(
            field,
            format!("'{value}' is not an ISO-8601 date or timestamp"),
        ))
    }
}
