//
//  gitlab-tools
//  version/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Release Tag Planning
//!
//! Works out the latest release tag of a project and proposes the next one.
//!
//! ## Algorithm
//!
//! 1. Give every tag a leading `v` (`1.2.3` becomes `v1.2.3`)
//! 2. Drop tags whose body is not a valid SemVer version
//! 3. Pick the highest by SemVer precedence (build metadata ignored)
//! 4. Bump its patch component, dropping pre-release and build metadata
//!
//! Tags whose patch component is already `u64::MAX` cannot be bumped and are
//! left out of step 3.
//!
//! A list without any valid tag yields the fallback pair
//! `v0.1.0` / `v0.1.1`; this is not an error.
//!
//! ## Example
//!
//! ```rust
//! use gitlab_tools::version::plan_next_tag;
//!
//! let plan = plan_next_tag(["v1.2.3", "v1.3.0", "1.2.9", "latest"]);
//! assert_eq!(plan.current_tag, "v1.3.0");
//! assert_eq!(plan.next_tag, "v1.3.1");
//! ```

use semver::Version;
use serde::Serialize;

use crate::api::common::ApiError;

/// Current tag reported when no valid release tag exists.
pub const FALLBACK_CURRENT_TAG: &str = "v0.1.0";

/// Next tag proposed when no valid release tag exists.
pub const FALLBACK_NEXT_TAG: &str = "v0.1.1";

/// Latest release tag and the proposed next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagVersionInfo {
    /// Highest valid tag, always with a leading `v`
    pub current_tag: String,
    /// `current_tag` with its patch component incremented
    pub next_tag: String,
}

impl TagVersionInfo {
    fn fallback() -> Self {
        Self {
            current_tag: FALLBACK_CURRENT_TAG.to_string(),
            next_tag: FALLBACK_NEXT_TAG.to_string(),
        }
    }
}

/// Parses a tag name as SemVer, accepting one optional leading `v`.
///
/// ```rust
/// use gitlab_tools::version::parse_release_tag;
///
/// assert!(parse_release_tag("v1.2.3").is_some());
/// assert!(parse_release_tag("1.2.3-rc.1").is_some());
/// assert!(parse_release_tag("release-1").is_none());
/// ```
pub fn parse_release_tag(tag: &str) -> Option<Version> {
    let body = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(body).ok()
}

/// Computes the latest release tag and the next patch release.
pub fn plan_next_tag<I, S>(tags: I) -> TagVersionInfo
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let latest = tags
        .into_iter()
        .filter_map(|tag| {
            let tag = tag.as_ref();
            let normalized = if tag.starts_with('v') {
                tag.to_string()
            } else {
                format!("v{tag}")
            };
            let version = parse_release_tag(&normalized)?;
            let next = next_patch(&version)?;
            Some((normalized, version, next))
        })
        .max_by(|(_, a, _), (_, b, _)| a.cmp_precedence(b));

    match latest {
        Some((current_tag, _, next)) => TagVersionInfo {
            next_tag: format!("v{next}"),
            current_tag,
        },
        None => TagVersionInfo::fallback(),
    }
}

/// The next patch release of `version`, without pre-release or build metadata.
///
/// `None` when the patch component is already at its maximum.
pub fn next_patch(version: &Version) -> Option<Version> {
    let patch = version.patch.checked_add(1)?;
    Some(Version::new(version.major, version.minor, patch))
}

/// Checks a tag name before creating it on the remote.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] on the `tagName` field when the name
/// (minus one optional leading `v`) is not valid SemVer.
pub fn validate_tag_name(tag_name: &str) -> Result<Version, ApiError> {
    parse_release_tag(tag_name).ok_or_else(|| {
        ApiError::validation(
            "tagName",
            format!(
                "'{tag_name}' must follow SemVer format (e.g. 'v1.2.3' or '1.2.3')"
            ),
        )
    })
}
