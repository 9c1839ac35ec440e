//
//  gitlab-tools
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Every tool answers with one envelope on stdout:
//!
//! ```json
//! {"success": true, "summary": "Found 3 projects", "payload": {...}}
//! {"success": false, "error": {"kind": "not_found", "message": "...", "status": 404}}
//! ```
//!
//! With structured content disabled (`GITLAB_USE_STRUCTURED_CONTENT=false`)
//! the summary is printed as a plain line followed by the payload, and
//! failures go to stderr as text.
//!
//! Diagnostics (warnings, notes) always go to stderr so stdout stays
//! machine-readable.

mod json;

pub use json::*;

use console::style;
use serde::Serialize;
use serde_json::Value;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Failure details inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// One of `validation`, `permission`, `not_found`, `conflict`,
    /// `unprocessable`, `transport` for gateway errors; `configuration` or
    /// `internal` otherwise
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&ApiError> for ErrorBody {
    fn from(error: &ApiError) -> Self {
        Self {
            kind: error.kind().as_str().to_string(),
            message: error.to_string(),
            status: error.status(),
            field: error.field().map(String::from),
        }
    }
}

impl From<&ConfigError> for ErrorBody {
    fn from(error: &ConfigError) -> Self {
        let field = match error {
            ConfigError::Missing(key) | ConfigError::Invalid { key, .. } => Some(key.to_string()),
            ConfigError::Read { .. } | ConfigError::Parse { .. } => None,
        };
        Self {
            kind: "configuration".to_string(),
            message: error.to_string(),
            status: None,
            field,
        }
    }
}

/// The result of one tool invocation.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::output::ToolResponse;
///
/// let response = ToolResponse::success("Found 1 project", &serde_json::json!([{"id": 1}]))?;
/// let json = serde_json::to_value(&response)?;
/// assert_eq!(json["success"], true);
/// assert_eq!(json["payload"][0]["id"], 1);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    /// Tool completed
    Success {
        success: bool,
        summary: String,
        payload: Value,
    },
    /// Tool failed
    Failure { success: bool, error: ErrorBody },
}

impl ToolResponse {
    /// Wraps a serializable payload.
    pub fn success<T: Serialize + ?Sized>(
        summary: impl Into<String>,
        payload: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self::Success {
            success: true,
            summary: summary.into(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Wraps a gateway error.
    pub fn failure(error: &ApiError) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
        }
    }

    /// Wraps any tool error, keeping the classification of gateway and
    /// configuration errors.
    pub fn from_error(error: &anyhow::Error) -> Self {
        let body = if let Some(api) = error.downcast_ref::<ApiError>() {
            ErrorBody::from(api)
        } else if let Some(config) = error.downcast_ref::<ConfigError>() {
            ErrorBody::from(config)
        } else {
            ErrorBody {
                kind: "internal".to_string(),
                message: format!("{error:#}"),
                status: None,
                field: None,
            }
        };
        Self::Failure {
            success: false,
            error: body,
        }
    }

    /// `true` for [`ToolResponse::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Writes tool results and diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    compact: bool,
    structured: bool,
    color: bool,
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(false, true)
    }
}

impl OutputWriter {
    /// Creates a writer. Colors on stderr follow terminal detection.
    pub fn new(compact: bool, structured: bool) -> Self {
        Self {
            compact,
            structured,
            color: console::colors_enabled_stderr(),
        }
    }

    /// Single-line JSON
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// Envelope output rather than plain text
    pub fn is_structured(&self) -> bool {
        self.structured
    }

    /// Prints a tool result.
    pub fn write(&self, response: &ToolResponse) -> anyhow::Result<()> {
        if self.structured {
            return write_json(response, self.compact);
        }

        match response {
            ToolResponse::Success {
                summary, payload, ..
            } => {
                println!("{summary}");
                if !payload.is_null() {
                    write_json(payload, self.compact)?;
                }
                Ok(())
            }
            ToolResponse::Failure { error, .. } => {
                self.write_error(&error.message);
                Ok(())
            }
        }
    }

    /// Prints an error message to stderr.
    pub fn write_error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", style("✗").red().bold(), msg);
        } else {
            eprintln!("Error: {msg}");
        }
    }

    /// Prints a warning to stderr.
    pub fn write_warning(&self, msg: &str) {
        if self.color {
            eprintln!("{} {}", style("!").yellow().bold(), msg);
        } else {
            eprintln!("Warning: {msg}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_shape() {
        let error = ApiError::NotFound("404 Project Not Found".to_string());
        let json = serde_json::to_value(ToolResponse::failure(&error)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": {
                    "kind": "not_found",
                    "message": "Resource not found: 404 Project Not Found",
                    "status": 404
                }
            })
        );
    }

    #[test]
    fn test_validation_failure_names_field() {
        let error = ApiError::validation("perPage", "must be between 1 and 100, got 101");
        let json = serde_json::to_value(ToolResponse::failure(&error)).unwrap();
        assert_eq!(json["error"]["kind"], "validation");
        assert_eq!(json["error"]["field"], "perPage");
        assert!(json["error"].get("status").is_none());
    }

    #[test]
    fn test_from_error_keeps_classification() {
        let api = anyhow::Error::from(ApiError::Conflict("Tag v1.0.0 already exists".to_string()));
        let json = serde_json::to_value(ToolResponse::from_error(&api)).unwrap();
        assert_eq!(json["error"]["kind"], "conflict");
        assert_eq!(json["error"]["status"], 409);

        let config = anyhow::Error::from(ConfigError::Missing("GITLAB_TOKEN"));
        let json = serde_json::to_value(ToolResponse::from_error(&config)).unwrap();
        assert_eq!(json["error"]["kind"], "configuration");
        assert_eq!(json["error"]["field"], "GITLAB_TOKEN");

        let other = anyhow::anyhow!("disk full");
        let json = serde_json::to_value(ToolResponse::from_error(&other)).unwrap();
        assert_eq!(json["error"]["kind"], "internal");
        assert_eq!(json["error"]["message"], "disk full");
    }

    #[test]
    fn test_success_envelope() {
        let response = ToolResponse::success("ok", &vec![1, 2]).unwrap();
        assert!(response.is_success());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["summary"], "ok");
        assert_eq!(json["payload"], serde_json::json!([1, 2]));
    }
}
