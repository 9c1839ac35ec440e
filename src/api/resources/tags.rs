//
//  gitlab-tools
//  api/resources/tags.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository tags: listing and the single mutating operation, tag creation.
//!
//! ## Tag Creation Guards
//!
//! Checks run in this order, and the first two never touch the network:
//!
//! 1. Read-only gate (`GITLAB_READ_ONLY` unset or anything but `false`)
//! 2. SemVer check on the tag name (one leading `v` allowed)
//! 3. `POST projects/:id/repository/tags`
//!
//! Remote failures are rewritten with the tag, project and ref involved so a
//! caller can act on them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::client::{GitLabClient, Query};
use crate::api::common::{ApiError, Identifier, Paginated, PaginationRequest};
use crate::version::validate_tag_name;

/// Message returned when tag creation is attempted in read-only mode.
pub const READ_ONLY_TAG_MESSAGE: &str = "Tag creation is disabled in read-only mode. \
To enable tag creation: \
1. Generate a GitLab token with 'api' scope \
2. Set GITLAB_READ_ONLY=false \
3. Ensure you have at least Developer role in the target project";

/// Commit a tag points at.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabTagCommit {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authored_date: Option<DateTime<Utc>>,
}

/// Release notes attached to a tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Tag as returned by the repository tags API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabTag {
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub commit: Option<GitLabTagCommit>,
    #[serde(default)]
    pub release: Option<Release>,
}

/// Normalized tag for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    pub commit_id: Option<String>,
    pub authored_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<Release>,
}

impl From<GitLabTag> for Tag {
    fn from(t: GitLabTag) -> Self {
        let (commit_id, authored_at) = match t.commit {
            Some(c) => (Some(c.id), c.authored_date.or(c.created_at)),
            None => (None, None),
        };
        Self {
            name: t.name,
            commit_id,
            authored_at,
            release: t.release,
        }
    }
}

/// Commit summary of a freshly created tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCommit {
    pub id: String,
    pub message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Normalized result of tag creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTag {
    pub name: String,
    pub message: Option<String>,
    pub target: Option<String>,
    pub commit: Option<TagCommit>,
    pub release: Option<Release>,
    /// Web page of the tag, known when the project was addressed by path
    pub url: Option<String>,
}

impl From<GitLabTag> for CreatedTag {
    fn from(t: GitLabTag) -> Self {
        Self {
            name: t.name,
            message: t.message.filter(|m| !m.is_empty()),
            target: t.target,
            commit: t.commit.map(|c| TagCommit {
                id: c.id,
                message: c.message,
                created_at: c.created_at,
            }),
            release: t.release,
            url: None,
        }
    }
}

/// Body of a tag creation request.
///
/// The name is sent exactly as given; validation only strips one leading `v`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTag {
    pub tag_name: String,
    /// Branch, tag or commit SHA to tag
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Annotation; omitted for a lightweight tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Release notes created alongside the tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_description: Option<String>,
}

impl GitLabClient {
    /// Lists tags, highest version first.
    pub async fn list_tags(
        &self,
        project: &Identifier,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Tag>>, ApiError> {
        let params = Query::new()
            .push("order_by", "version")
            .push("sort", "desc");
        let page = self
            .get_page::<GitLabTag>(
                self.project_endpoint(project, &["repository", "tags"]),
                params,
                page,
            )
            .await?;
        Ok(page.convert())
    }

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ReadOnly`] in read-only mode, before any request
    /// - [`ApiError::Validation`] on `tagName` for a non-SemVer name, or on
    ///   `ref` for a blank ref, before any request
    /// - 400, 403, 409 and 422 answers with messages naming the tag and project
    pub async fn create_tag(
        &self,
        project: &Identifier,
        request: &CreateTag,
    ) -> Result<CreatedTag, ApiError> {
        if self.config().read_only {
            return Err(ApiError::ReadOnly(READ_ONLY_TAG_MESSAGE.to_string()));
        }
        validate_tag_name(&request.tag_name)?;
        if request.git_ref.trim().is_empty() {
            return Err(ApiError::validation("ref", "must not be empty"));
        }

        let url = self.project_endpoint(project, &["repository", "tags"]);
        let remote: GitLabTag = self
            .post_json(url, request)
            .await
            .map_err(|e| tag_error_context(e, project, request))?;

        info!(tag = %remote.name, project = %project, "tag created");

        let mut created = CreatedTag::from(remote);
        if let Identifier::Named(path) = project {
            created.url = Some(self.links().tag_url(path, &created.name));
        }
        Ok(created)
    }
}

fn tag_error_context(error: ApiError, project: &Identifier, request: &CreateTag) -> ApiError {
    let tag = &request.tag_name;
    match error {
        ApiError::BadRequest(details) => {
            ApiError::BadRequest(format!("Invalid tag parameters. {details}"))
        }
        ApiError::Forbidden(_) => ApiError::Forbidden(format!(
            "Insufficient permissions to create tag '{tag}' in project {project}. \
             Requires at least Developer role."
        )),
        ApiError::Conflict(_) => {
            ApiError::Conflict(format!("Tag '{tag}' already exists in project {project}."))
        }
        ApiError::Unprocessable(_) => ApiError::Unprocessable(format!(
            "Reference '{}' not found in repository for project {project}.",
            request.git_ref
        )),
        other => other,
    }
}
