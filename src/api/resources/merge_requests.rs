//
//  gitlab-tools
//  api/resources/merge_requests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Merge requests and their file diffs.
//!
//! Every normalized merge request carries a `fresh` flag: `true` while it is
//! unmerged, and for 24 hours after it was merged. Diff listings accept an
//! exact-path include/exclude filter applied after the page arrives.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::users::{GitLabUserBasic, UserSummary};
use super::SortDirection;
use crate::api::client::{GitLabClient, Query};
use crate::api::common::{
    validate_timestamp, ApiError, Identifier, Paginated, PaginationRequest,
};
use crate::api::filter::{FilePaths, PathFilter};

/// How long a merged request still counts as fresh.
pub const FRESHNESS_WINDOW_HOURS: i64 = 24;

/// Merge request as returned by the merge requests and search APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabMergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    pub source_branch: String,
    pub target_branch: String,
    #[serde(default)]
    pub author: Option<GitLabUserBasic>,
    #[serde(default)]
    pub assignee: Option<GitLabUserBasic>,
    pub web_url: String,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Normalized merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub source_branch: String,
    pub target_branch: String,
    pub author: Option<UserSummary>,
    pub assignee: Option<UserSummary>,
    pub web_url: String,
    pub draft: bool,
    pub labels: Vec<String>,
    /// Unmerged, or merged within the freshness window
    pub fresh: bool,
}

impl MergeRequest {
    /// Maps a remote merge request, judging freshness against `now`.
    pub fn from_remote(mr: GitLabMergeRequest, now: DateTime<Utc>) -> Self {
        Self {
            fresh: is_fresh(mr.merged_at, now),
            id: mr.id,
            iid: mr.iid,
            project_id: mr.project_id,
            title: mr.title,
            description: mr.description.filter(|d| !d.is_empty()),
            state: mr.state,
            created_at: mr.created_at,
            updated_at: mr.updated_at,
            merged_at: mr.merged_at,
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
            author: mr.author.map(UserSummary::from),
            assignee: mr.assignee.map(UserSummary::from),
            web_url: mr.web_url,
            draft: mr.draft.unwrap_or(false),
            labels: mr.labels,
        }
    }
}

impl From<GitLabMergeRequest> for MergeRequest {
    fn from(mr: GitLabMergeRequest) -> Self {
        Self::from_remote(mr, Utc::now())
    }
}

/// `true` if never merged, or merged no more than 24 hours before `now`.
pub fn is_fresh(merged_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match merged_at {
        None => true,
        Some(merged) => now - merged <= Duration::hours(FRESHNESS_WINDOW_HOURS),
    }
}

/// One changed file of a merge request or commit.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabDiff {
    pub old_path: String,
    pub new_path: String,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
    #[serde(default)]
    pub diff: String,
}

/// Normalized diff file. `diff` is dropped in the brief form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    pub old_path: String,
    pub new_path: String,
    pub new_file: bool,
    pub renamed_file: bool,
    pub deleted_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl From<GitLabDiff> for DiffFile {
    fn from(d: GitLabDiff) -> Self {
        Self {
            old_path: d.old_path,
            new_path: d.new_path,
            new_file: d.new_file,
            renamed_file: d.renamed_file,
            deleted_file: d.deleted_file,
            diff: Some(d.diff),
        }
    }
}

impl DiffFile {
    /// Drops the patch text, keeping only paths and change flags.
    pub fn brief(mut self) -> Self {
        self.diff = None;
        self
    }
}

impl FilePaths for DiffFile {
    fn old_path(&self) -> &str {
        &self.old_path
    }

    fn new_path(&self) -> &str {
        &self.new_path
    }
}

wire_enum! {
    /// Merge request state filter.
    MergeRequestState, "state" {
        Opened => "opened",
        Closed => "closed",
        Locked => "locked",
        Merged => "merged",
        All => "all",
    }
}

impl Default for MergeRequestState {
    fn default() -> Self {
        Self::All
    }
}

wire_enum! {
    /// Sort key for merge request listings.
    MergeRequestOrder, "orderBy" {
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
        MergedAt => "merged_at",
        Title => "title",
    }
}

/// Filters for `GET projects/:id/merge_requests`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRequestQuery {
    pub state: MergeRequestState,
    pub target_branch: Option<String>,
    /// ISO-8601 lower bound on `updated_at`
    pub updated_after: Option<String>,
    /// ISO-8601 upper bound on `updated_at`
    pub updated_before: Option<String>,
    /// Defaults to `updated_at`
    pub order_by: Option<MergeRequestOrder>,
    /// Defaults to `desc`
    pub sort: Option<SortDirection>,
}

/// Parameters for merge request search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestSearch {
    pub term: String,
    /// Restrict to one project; global search otherwise
    pub project: Option<Identifier>,
    pub state: MergeRequestState,
}

impl GitLabClient {
    /// Lists merge requests of a project, most recently updated first.
    pub async fn list_merge_requests(
        &self,
        project: &Identifier,
        query: &MergeRequestQuery,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<MergeRequest>>, ApiError> {
        let updated_after = query
            .updated_after
            .as_deref()
            .map(|v| validate_timestamp("updatedAfter", v))
            .transpose()?;
        let updated_before = query
            .updated_before
            .as_deref()
            .map(|v| validate_timestamp("updatedBefore", v))
            .transpose()?;

        let params = Query::new()
            .push("state", query.state)
            .push(
                "order_by",
                query.order_by.unwrap_or(MergeRequestOrder::UpdatedAt),
            )
            .push("sort", query.sort.unwrap_or(SortDirection::Desc))
            .push_opt("target_branch", query.target_branch.as_deref())
            .push_opt("updated_after", updated_after)
            .push_opt("updated_before", updated_before);

        let page = self
            .get_page::<GitLabMergeRequest>(
                self.project_endpoint(project, &["merge_requests"]),
                params,
                page,
            )
            .await?;
        Ok(page.convert())
    }

    /// Fetches one merge request by its project-scoped iid.
    pub async fn get_merge_request(
        &self,
        project: &Identifier,
        iid: u64,
    ) -> Result<MergeRequest, ApiError> {
        let iid = iid.to_string();
        let remote: GitLabMergeRequest = self
            .get_json(
                self.project_endpoint(project, &["merge_requests", iid.as_str()]),
                Query::new(),
            )
            .await?;
        Ok(remote.into())
    }

    /// Searches merge requests globally or within one project.
    ///
    /// The `state` parameter is omitted when searching all states.
    pub async fn search_merge_requests(
        &self,
        search: &MergeRequestSearch,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<MergeRequest>>, ApiError> {
        let term = search.term.trim();
        if term.is_empty() {
            return Err(ApiError::validation("search", "must not be empty"));
        }

        let url = match &search.project {
            Some(project) => self.project_endpoint(project, &["search"]),
            None => self.endpoint(&["search"]),
        };
        let state = (search.state != MergeRequestState::All).then_some(search.state);
        let params = Query::new()
            .push("scope", "merge_requests")
            .push("search", term)
            .push_opt("state", state);

        let page = self
            .get_page::<GitLabMergeRequest>(url, params, page)
            .await?;
        Ok(page.convert())
    }

    /// Lists the changed files of a merge request.
    ///
    /// `filter` is applied to each page after it arrives.
    pub async fn merge_request_diffs(
        &self,
        project: &Identifier,
        iid: u64,
        filter: &PathFilter,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<DiffFile>>, ApiError> {
        let iid = iid.to_string();
        let page = self
            .get_page::<GitLabDiff>(
                self.project_endpoint(project, &["merge_requests", iid.as_str(), "diffs"]),
                Query::new(),
                page,
            )
            .await?;
        Ok(page.convert().map(|files| filter.apply(files)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn remote(merged_at: Option<&str>) -> GitLabMergeRequest {
        serde_json::from_value(serde_json::json!({
            "id": 1001,
            "iid": 12,
            "project_id": 42,
            "title": "Add retry budget",
            "description": "",
            "state": if merged_at.is_some() { "merged" } else { "opened" },
            "created_at": "2024-05-01T08:00:00Z",
            "updated_at": "2024-05-02T08:00:00Z",
            "merged_at": merged_at,
            "source_branch": "feature/retry",
            "target_branch": "main",
            "author": {"id": 7, "username": "jdoe", "name": "Jane Doe"},
            "assignee": null,
            "web_url": "https://gitlab.example.com/team/api/-/merge_requests/12",
            "labels": ["backend"]
        }))
        .unwrap()
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap();
        assert!(is_fresh(None, now));
        assert!(is_fresh(Some(now - Duration::hours(23)), now));
        assert!(is_fresh(Some(now - Duration::hours(24)), now));
        assert!(!is_fresh(Some(now - Duration::hours(25)), now));
    }

    #[test]
    fn test_merge_request_mapper() {
        let now = Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap();

        let open = MergeRequest::from_remote(remote(None), now);
        assert!(open.fresh);
        assert_eq!(open.description, None);
        assert_eq!(open.author.as_ref().map(|a| a.username.as_str()), Some("jdoe"));
        assert!(!open.draft);

        let stale = MergeRequest::from_remote(remote(Some("2024-05-01T09:00:00Z")), now);
        assert!(!stale.fresh);

        let json = serde_json::to_value(&stale).unwrap();
        assert_eq!(json["iid"], 12);
        assert_eq!(json["sourceBranch"], "feature/retry");
        assert_eq!(json["mergedAt"], "2024-05-01T09:00:00Z");
        assert_eq!(json["assignee"], serde_json::Value::Null);
    }

    #[test]
    fn test_diff_brief_and_filter() {
        let files: Vec<DiffFile> = ["a.ts", "b.ts"]
            .iter()
            .map(|p| {
                DiffFile::from(GitLabDiff {
                    old_path: p.to_string(),
                    new_path: p.to_string(),
                    new_file: false,
                    renamed_file: false,
                    deleted_file: false,
                    diff: "@@ -1 +1 @@".to_string(),
                })
            })
            .collect();

        let kept = PathFilter::single("b.ts").apply(files.clone());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].new_path, "b.ts");

        let json = serde_json::to_value(files[0].clone().brief()).unwrap();
        assert!(json.get("diff").is_none());
        assert_eq!(json["oldPath"], "a.ts");
    }

    #[test]
    fn test_state_default_is_all() {
        assert_eq!(MergeRequestQuery::default().state, MergeRequestState::All);
        assert_eq!("merged".parse::<MergeRequestState>().unwrap(), MergeRequestState::Merged);
    }
}
