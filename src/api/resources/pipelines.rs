//
//  gitlab-tools
//  api/resources/pipelines.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CI pipelines, their variables and test reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::users::{GitLabUserBasic, UserSummary};
use super::SortDirection;
use crate::api::client::{GitLabClient, Query};
use crate::api::common::{
    validate_timestamp, ApiError, Identifier, Paginated, PaginationRequest,
};

/// Status badge details (`detailed_status`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct DetailedStatus {
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub details_path: Option<String>,
}

/// Pipeline as returned by the pipelines API.
///
/// Listings return a subset of these fields; the rest default to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabPipeline {
    pub id: u64,
    #[serde(default)]
    pub iid: Option<u64>,
    pub project_id: u64,
    pub status: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    pub sha: String,
    pub web_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub queued_duration: Option<f64>,
    #[serde(default)]
    pub coverage: Option<String>,
    #[serde(default)]
    pub user: Option<GitLabUserBasic>,
    #[serde(default)]
    pub detailed_status: Option<DetailedStatus>,
}

/// Normalized pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: u64,
    pub iid: Option<u64>,
    pub project_id: u64,
    pub status: String,
    pub source: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub sha: String,
    pub web_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Seconds
    pub duration: Option<f64>,
    /// Seconds
    pub queued_duration: Option<f64>,
    pub coverage: Option<String>,
    pub user: Option<UserSummary>,
    pub detailed_status: Option<DetailedStatus>,
}

impl From<GitLabPipeline> for Pipeline {
    fn from(p: GitLabPipeline) -> Self {
        Self {
            id: p.id,
            iid: p.iid,
            project_id: p.project_id,
            status: p.status,
            source: p.source,
            git_ref: p.git_ref,
            sha: p.sha,
            web_url: p.web_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
            started_at: p.started_at,
            finished_at: p.finished_at,
            duration: p.duration,
            queued_duration: p.queued_duration,
            coverage: p.coverage,
            user: p.user.map(UserSummary::from),
            detailed_status: p.detailed_status,
        }
    }
}

/// A variable a pipeline was run with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PipelineVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_variable_type")]
    pub variable_type: String,
}

fn default_variable_type() -> String {
    "env_var".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabTestReport {
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub test_suites: Vec<serde_json::Value>,
}

/// Normalized test report. Suites are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub total_time: f64,
    pub total_count: u64,
    pub success_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
    pub error_count: u64,
    pub test_suites: Vec<serde_json::Value>,
}

impl From<GitLabTestReport> for TestReport {
    fn from(r: GitLabTestReport) -> Self {
        Self {
            total_time: r.total_time,
            total_count: r.total_count,
            success_count: r.success_count,
            failed_count: r.failed_count,
            skipped_count: r.skipped_count,
            error_count: r.error_count,
            test_suites: r.test_suites,
        }
    }
}

wire_enum! {
    /// Pipeline status filter.
    PipelineStatus, "status" {
        Created => "created",
        WaitingForResource => "waiting_for_resource",
        Preparing => "preparing",
        Pending => "pending",
        Running => "running",
        Success => "success",
        Failed => "failed",
        Canceled => "canceled",
        Skipped => "skipped",
        Manual => "manual",
        Scheduled => "scheduled",
    }
}

wire_enum! {
    /// Sort key for pipeline listings.
    PipelineOrder, "orderBy" {
        Id => "id",
        Status => "status",
        Ref => "ref",
        UpdatedAt => "updated_at",
        UserId => "user_id",
    }
}

/// Filters for `GET projects/:id/pipelines`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineQuery {
    pub git_ref: Option<String>,
    pub status: Option<PipelineStatus>,
    /// Trigger source such as `push`, `schedule` or `merge_request_event`
    pub source: Option<String>,
    pub order_by: Option<PipelineOrder>,
    pub sort: Option<SortDirection>,
    pub updated_after: Option<String>,
    pub updated_before: Option<String>,
    /// Username of the user who triggered the pipeline
    pub username: Option<String>,
    /// Only pipelines with invalid configuration
    pub yaml_errors: bool,
}

impl GitLabClient {
    /// Lists pipelines of a project.
    pub async fn list_pipelines(
        &self,
        project: &Identifier,
        query: &PipelineQuery,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Pipeline>>, ApiError> {
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
            .push_opt("ref", query.git_ref.as_deref())
            .push_opt("status", query.status)
            .push_opt("source", query.source.as_deref())
            .push_opt("order_by", query.order_by)
            .push_opt("sort", query.sort)
            .push_opt("updated_after", updated_after)
            .push_opt("updated_before", updated_before)
            .push_opt("username", query.username.as_deref())
            .flag("yaml_errors", query.yaml_errors);

        let page = self
            .get_page::<GitLabPipeline>(
                self.project_endpoint(project, &["pipelines"]),
                params,
                page,
            )
            .await?;
        Ok(page.convert())
    }

    /// Fetches one pipeline.
    pub async fn get_pipeline(
        &self,
        project: &Identifier,
        pipeline_id: u64,
    ) -> Result<Pipeline, ApiError> {
        let id = pipeline_id.to_string();
        let remote: GitLabPipeline = self
            .get_json(
                self.project_endpoint(project, &["pipelines", id.as_str()]),
                Query::new(),
            )
            .await?;
        Ok(remote.into())
    }

    /// The most recent pipeline for `git_ref`, or for the default branch.
    pub async fn latest_pipeline(
        &self,
        project: &Identifier,
        git_ref: Option<&str>,
    ) -> Result<Pipeline, ApiError> {
        let remote: GitLabPipeline = self
            .get_json(
                self.project_endpoint(project, &["pipelines", "latest"]),
                Query::new().push_opt("ref", git_ref),
            )
            .await?;
        Ok(remote.into())
    }

    /// Variables a pipeline was run with.
    pub async fn pipeline_variables(
        &self,
        project: &Identifier,
        pipeline_id: u64,
    ) -> Result<Vec<PipelineVariable>, ApiError> {
        let id = pipeline_id.to_string();
        self.get_json(
            self.project_endpoint(project, &["pipelines", id.as_str(), "variables"]),
            Query::new(),
        )
        .await
    }

    /// Aggregated unit test results of a pipeline.
    pub async fn pipeline_test_report(
        &self,
        project: &Identifier,
        pipeline_id: u64,
    ) -> Result<TestReport, ApiError> {
        let id = pipeline_id.to_string();
        let remote: GitLabTestReport = self
            .get_json(
                self.project_endpoint(project, &["pipelines", id.as_str(), "test_report"]),
                Query::new(),
            )
            .await?;
        Ok(remote.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_mapper() {
        let remote: GitLabPipeline = serde_json::from_value(serde_json::json!({
            "id": 991,
            "iid": 51,
            "project_id": 42,
            "status": "failed",
            "source": "push",
            "ref": "main",
            "sha": "deadbeef",
            "web_url": "https://gitlab.example.com/team/api/-/pipelines/991",
            "created_at": "2024-05-01T10:00:00Z",
            "duration": 312,
            "queued_duration": 1.5,
            "user": {"id": 7, "username": "jdoe", "name": "Jane Doe"},
            "detailed_status": {"icon": "status_failed", "text": "Failed", "group": "failed",
                                "details_path": "/team/api/-/pipelines/991"}
        }))
        .unwrap();

        let json = serde_json::to_value(Pipeline::from(remote)).unwrap();
        assert_eq!(json["ref"], "main");
        assert_eq!(json["projectId"], 42);
        assert_eq!(json["duration"], 312.0);
        assert_eq!(json["queuedDuration"], 1.5);
        assert_eq!(json["user"]["username"], "jdoe");
        assert_eq!(json["detailedStatus"]["detailsPath"], "/team/api/-/pipelines/991");
    }

    #[test]
    fn test_listing_subset_parses() {
        let remote: GitLabPipeline = serde_json::from_value(serde_json::json!({
            "id": 1, "project_id": 2, "status": "success", "sha": "abc",
            "web_url": "https://gitlab.example.com/p/-/pipelines/1"
        }))
        .unwrap();
        let pipeline = Pipeline::from(remote);
        assert_eq!(pipeline.git_ref, None);
        assert_eq!(pipeline.user, None);
    }

    #[test]
    fn test_variables_and_report() {
        let vars: Vec<PipelineVariable> =
            serde_json::from_str(r#"[{"key":"DEPLOY","value":"true"}]"#).unwrap();
        assert_eq!(vars[0].variable_type, "env_var");
        assert_eq!(serde_json::to_value(&vars[0]).unwrap()["variableType"], "env_var");

        let report: GitLabTestReport = serde_json::from_value(serde_json::json!({
            "total_time": 5.2, "total_count": 10, "success_count": 8,
            "failed_count": 1, "skipped_count": 1, "error_count": 0,
            "test_suites": [{"name": "rspec", "total_count": 10}]
        }))
        .unwrap();
        let json = serde_json::to_value(TestReport::from(report)).unwrap();
        assert_eq!(json["failedCount"], 1);
        assert_eq!(json["testSuites"][0]["name"], "rspec");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            "waiting_for_resource".parse::<PipelineStatus>().unwrap(),
            PipelineStatus::WaitingForResource
        );
        assert!("done".parse::<PipelineStatus>().is_err());
    }
}
