//
//  gitlab-tools
//  api/resources/commits.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository commits, their diffs and external CI statuses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::merge_requests::{DiffFile, GitLabDiff};
use super::users::{GitLabUserBasic, UserSummary};
use super::SortDirection;
use crate::api::client::{GitLabClient, Query};
use crate::api::common::{
    validate_timestamp, ApiError, Identifier, Paginated, PaginationRequest,
};

/// Line counts of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCommit {
    pub id: String,
    pub short_id: String,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub authored_date: DateTime<Utc>,
    pub committer_name: String,
    pub committed_date: DateTime<Utc>,
    pub web_url: String,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub stats: Option<CommitStats>,
}

/// Normalized commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub title: String,
    pub message: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub authored_date: DateTime<Utc>,
    pub committer_name: String,
    pub committed_date: DateTime<Utc>,
    pub web_url: String,
    pub parent_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CommitStats>,
}

impl From<GitLabCommit> for Commit {
    fn from(c: GitLabCommit) -> Self {
        Self {
            id: c.id,
            short_id: c.short_id,
            title: c.title,
            message: c.message,
            author_name: c.author_name,
            author_email: c.author_email,
            authored_date: c.authored_date,
            committer_name: c.committer_name,
            committed_date: c.committed_date,
            web_url: c.web_url,
            parent_ids: c.parent_ids,
            stats: c.stats,
        }
    }
}

/// A CI status reported against a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabCommitStatus {
    pub id: u64,
    pub sha: String,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    pub status: String,
    pub name: String,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub coverage: Option<f64>,
    #[serde(default)]
    pub pipeline_id: Option<u64>,
    #[serde(default)]
    pub author: Option<GitLabUserBasic>,
}

/// Normalized commit status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStatus {
    pub id: u64,
    pub sha: String,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub status: String,
    pub name: String,
    pub target_url: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub allow_failure: bool,
    pub coverage: Option<f64>,
    pub pipeline_id: Option<u64>,
    pub author: Option<UserSummary>,
}

impl From<GitLabCommitStatus> for CommitStatus {
    fn from(s: GitLabCommitStatus) -> Self {
        Self {
            id: s.id,
            sha: s.sha,
            git_ref: s.git_ref,
            status: s.status,
            name: s.name,
            target_url: s.target_url,
            description: s.description,
            created_at: s.created_at,
            started_at: s.started_at,
            finished_at: s.finished_at,
            allow_failure: s.allow_failure,
            coverage: s.coverage,
            pipeline_id: s.pipeline_id,
            author: s.author.map(UserSummary::from),
        }
    }
}

wire_enum! {
    /// Commit listing order.
    CommitOrder, "order" {
        Default => "default",
        Topo => "topo",
    }
}

wire_enum! {
    /// Sort key for commit statuses.
    StatusOrder, "orderBy" {
        Id => "id",
        Pipeline => "pipeline_id",
    }
}

/// Filters for `GET projects/:id/repository/commits`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitQuery {
    /// Branch, tag or SHA range; default branch if unset
    pub ref_name: Option<String>,
    /// ISO-8601 lower bound on commit date
    pub since: Option<String>,
    /// ISO-8601 upper bound on commit date
    pub until: Option<String>,
    /// Only commits touching this file path
    pub path: Option<String>,
    /// Author name or email
    pub author: Option<String>,
    pub first_parent: bool,
    pub order: Option<CommitOrder>,
    pub with_stats: bool,
}

/// Filters for `GET projects/:id/repository/commits/:sha/statuses`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusQuery {
    /// Include every status, not only the latest per name
    pub all: bool,
    pub name: Option<String>,
    pub order_by: Option<StatusOrder>,
    pub pipeline_id: Option<u64>,
    pub git_ref: Option<String>,
    pub sort: Option<SortDirection>,
}

fn validate_sha(sha: &str) -> Result<&str, ApiError> {
    let sha = sha.trim();
    if sha.is_empty() {
        return Err(ApiError::validation("sha", "must not be empty"));
    }
    Ok(sha)
}

impl GitLabClient {
    /// Lists commits of a project.
    pub async fn list_commits(
        &self,
        project: &Identifier,
        query: &CommitQuery,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Commit>>, ApiError> {
        let since = query
            .since
            .as_deref()
            .map(|v| validate_timestamp("since", v))
            .transpose()?;
        let until = query
            .until
            .as_deref()
            .map(|v| validate_timestamp("until", v))
            .transpose()?;

        let params = Query::new()
            .push_opt("ref_name", query.ref_name.as_deref())
            .push_opt("since", since)
            .push_opt("until", until)
            .push_opt("path", query.path.as_deref())
            .push_opt("author", query.author.as_deref())
            .flag("first_parent", query.first_parent)
            .push_opt("order", query.order)
            .flag("with_stats", query.with_stats);

        let page = self
            .get_page::<GitLabCommit>(
                self.project_endpoint(project, &["repository", "commits"]),
                params,
                page,
            )
            .await?;
        Ok(page.convert())
    }

    /// Fetches one commit by SHA, branch or tag name.
    pub async fn get_commit(
        &self,
        project: &Identifier,
        sha: &str,
        stats: bool,
    ) -> Result<Commit, ApiError> {
        let sha = validate_sha(sha)?;
        let remote: GitLabCommit = self
            .get_json(
                self.project_endpoint(project, &["repository", "commits", sha]),
                Query::new().push("stats", stats),
            )
            .await?;
        Ok(remote.into())
    }

    /// Lists the changed files of a commit.
    pub async fn commit_diff(
        &self,
        project: &Identifier,
        sha: &str,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<DiffFile>>, ApiError> {
        let sha = validate_sha(sha)?;
        let page = self
            .get_page::<GitLabDiff>(
                self.project_endpoint(project, &["repository", "commits", sha, "diff"]),
                Query::new(),
                page,
            )
            .await?;
        Ok(page.convert())
    }

    /// Lists CI statuses reported against a commit.
    pub async fn commit_statuses(
        &self,
        project: &Identifier,
        sha: &str,
        query: &StatusQuery,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<CommitStatus>>, ApiError> {
        let sha = validate_sha(sha)?;
        let params = Query::new()
            .flag("all", query.all)
            .push_opt("name", query.name.as_deref())
            .push_opt("order_by", query.order_by)
            .push_opt("pipeline_id", query.pipeline_id)
            .push_opt("ref", query.git_ref.as_deref())
            .push_opt("sort", query.sort);

        let page = self
            .get_page::<GitLabCommitStatus>(
                self.project_endpoint(project, &["repository", "commits", sha, "statuses"]),
                params,
                page,
            )
            .await?;
        Ok(page.convert())
    }
}
