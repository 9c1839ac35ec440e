//
//  gitlab-tools
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GitLab Tools Library
//!
//! A gateway over the GitLab REST API (`/api/v4`) that turns GitLab's
//! responses into a normalized, pagination-aware representation, exposed as
//! a set of tools by the `glt` binary.
//!
//! ## Overview
//!
//! Every tool is one gateway call (or a small bounded group of them) whose
//! result is printed as a JSON envelope. The library does the interesting
//! work:
//!
//! - **Pagination**: GitLab pages by number and reports positions in
//!   `x-*` response headers; these become a [`PaginationInfo`] per page
//! - **Client-side filters**: namespace whitelisting for project listings
//!   and exact-path filtering for merge request diffs
//! - **Bounded batches**: several user lookups at once with a cap on
//!   requests in flight
//! - **Release planning**: the next SemVer tag from an unordered tag list
//! - **Read-only gate**: the one mutating tool (tag creation) is refused
//!   unless explicitly enabled
//!
//! ## Module Structure
//!
//! - [`api`]: HTTP gateway, shared types, filters, batch resolver, deep links and resources
//! - [`auth`]: bearer credential
//! - [`cli`]: command-line interface definitions using clap
//! - [`config`]: layered configuration snapshot
//! - [`output`]: tool result envelope and JSON writer
//! - [`util`]: formatting helpers
//! - [`version`]: SemVer tag planner
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gitlab_tools::api::{GitLabClient, PaginationRequest};
//! use gitlab_tools::api::resources::ProjectQuery;
//! use gitlab_tools::config::ConfigStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = ConfigStore::load()?;
//! let client = GitLabClient::new(store.current())?;
//!
//! let page = client
//!     .list_projects(&ProjectQuery::default(), PaginationRequest::default())
//!     .await?;
//! for project in &page.data {
//!     println!("{}", project.path_with_namespace);
//! }
//! if page.pagination.has_more {
//!     println!("more on page {:?}", page.pagination.next_page);
//! }
//! # Ok(())
//! # }
//! ```

/// GitLab REST API gateway.
///
/// Contains [`GitLabClient`](api::GitLabClient), the error taxonomy, header
/// normalization and pagination, client-side filters, the bounded batch
/// resolver, web deep links and one module per remote resource.
pub mod api;

/// Bearer credential attached to every request.
pub mod auth;

/// Command-line interface definitions using clap.
pub mod cli;

/// Configuration loading.
///
/// Layers built-in defaults, an optional TOML file and `GITLAB_*`
/// environment variables into an immutable snapshot:
/// - Linux: `~/.config/glt/config.toml`
/// - macOS: `~/Library/Application Support/glt/config.toml`
/// - Windows: `%APPDATA%\glt\config.toml`
pub mod config;

/// Tool result envelope and JSON output.
pub mod output;

/// Formatting helpers for sizes, durations and counts.
pub mod util;

/// SemVer release tag planning and tag-name validation.
pub mod version;

/// Re-export of the main CLI struct for convenient access.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use gitlab_tools::Cli;
///
/// let cli = Cli::parse();
/// // Handle cli.command...
/// ```
pub use cli::Cli;

/// Re-export of the configuration snapshot.
pub use config::Config;

/// Application name constant.
///
/// The name of the CLI binary, used for display purposes and configuration paths.
///
/// # Value
///
/// `"glt"`
pub const APP_NAME: &str = "glt";

/// Application version constant.
///
/// Derived from Cargo.toml at compile time.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::VERSION;
///
/// println!("glt version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Standardized exit codes so scripts can tell failures apart without
/// parsing the envelope.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors, usage and validation issues
/// - `4-7`: Authentication and permission issues
/// - `8-15`: Resource-related issues
/// - `32+`: External service issues
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::ApiError;
/// use gitlab_tools::exit_codes;
///
/// let err = anyhow::Error::from(ApiError::NotFound("404 Project Not Found".into()));
/// assert_eq!(exit_codes::for_error(&err), exit_codes::NOT_FOUND);
/// ```
pub mod exit_codes {
    use crate::api::{ApiError, ErrorKind};
    use crate::config::ConfigError;

    /// Successful execution.
    ///
    /// # Value
    ///
    /// `0`
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// Network failures, server errors and anything unclassified.
    ///
    /// # Value
    ///
    /// `1`
    pub const ERROR: i32 = 1;

    /// Usage or validation error.
    ///
    /// Bad arguments, invalid input rejected before or by GitLab (400), or
    /// an unusable configuration.
    ///
    /// # Value
    ///
    /// `2`
    pub const USAGE: i32 = 2;

    /// Authentication or permission error.
    ///
    /// Invalid token (401), insufficient role (403), or the read-only gate.
    ///
    /// # Value
    ///
    /// `4`
    pub const AUTH_ERROR: i32 = 4;

    /// Resource not found (404).
    ///
    /// # Value
    ///
    /// `8`
    pub const NOT_FOUND: i32 = 8;

    /// The write collides with existing state (409).
    ///
    /// # Value
    ///
    /// `9`
    pub const CONFLICT: i32 = 9;

    /// GitLab could not process the request (422).
    ///
    /// # Value
    ///
    /// `10`
    pub const UNPROCESSABLE: i32 = 10;

    /// Rate limit exceeded (429).
    ///
    /// # Value
    ///
    /// `32`
    pub const RATE_LIMIT: i32 = 32;

    /// Exit code for a gateway error.
    pub fn for_api_error(error: &ApiError) -> i32 {
        if matches!(error, ApiError::RateLimited) {
            return RATE_LIMIT;
        }
        match error.kind() {
            ErrorKind::Validation => USAGE,
            ErrorKind::Permission => AUTH_ERROR,
            ErrorKind::NotFound => NOT_FOUND,
            ErrorKind::Conflict => CONFLICT,
            ErrorKind::Unprocessable => UNPROCESSABLE,
            ErrorKind::Transport => ERROR,
        }
    }

    /// Exit code for any tool error.
    pub fn for_error(error: &anyhow::Error) -> i32 {
        if let Some(api) = error.downcast_ref::<ApiError>() {
            for_api_error(api)
        } else if error.downcast_ref::<ConfigError>().is_some() {
            USAGE
        } else {
            ERROR
        }
    }

}
