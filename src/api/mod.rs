//
//  gitlab-tools
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Gateway Layer
//!
//! Everything that talks to the GitLab REST API (`/api/v4`) lives here.
//!
//! ## Architecture
//!
//! - [`client`]: [`GitLabClient`], HTTP plumbing, authentication and error classification
//! - [`common`]: errors, identifiers, header normalization and pagination
//! - [`resources`]: one module per remote resource with its mappers and methods
//! - [`filter`]: client-side namespace and diff-path filters
//! - [`batch`]: bounded-concurrency batch lookups
//! - [`links`]: deep links into the web UI
//!
//! ## Data Flow
//!
//! ```text
//! caller -> GitLabClient method -> HTTP request -> JSON + headers
//!        -> NormalizedHeaders -> PaginationInfo -> (filter) -> Paginated<T>
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ApiError`] that resolves to one [`ErrorKind`]:
//!
//! - `Validation`: bad input, rejected before any request, or HTTP 400
//! - `Permission`: HTTP 401/403 or the read-only gate
//! - `NotFound`: HTTP 404, or an unknown username
//! - `Conflict`: HTTP 409
//! - `Unprocessable`: HTTP 422
//! - `Transport`: anything else

/// Bounded-concurrency batch resolver.
pub mod batch;

/// HTTP gateway: [`GitLabClient`] and its request plumbing.
pub mod client;

/// Shared types: errors, identifiers, headers and pagination.
pub mod common;

/// Client-side result filters.
pub mod filter;

/// Web UI deep links.
pub mod links;

/// Remote resources and their normalized forms.
pub mod resources;

pub use client::GitLabClient;
pub use common::{ApiError, ErrorKind, Identifier, Paginated, PaginationInfo, PaginationRequest};
