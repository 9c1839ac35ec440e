//
//  gitlab-tools
//  api/resources/jobs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CI jobs and their logs (traces).
//!
//! ## Byte Ranges
//!
//! Job logs can be large, so [`GitLabClient::job_trace`] accepts a
//! [`ByteRange`] that becomes a `Range: bytes=start-end` header. The result
//! is flagged `partial` when GitLab answers `206 Partial Content` or sends a
//! `Content-Range` header, and `totalBytes` is read from the part of
//! `Content-Range` after the `/`.
//!
//! [`GitLabClient::download_job_trace`] streams the same response to a file
//! chunk by chunk instead of buffering it. Downloads accept a `maxBytes`
//! window of 1 KiB to 5 MB, create missing parent directories, and remove the
//! file again if the stream breaks off.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::users::{GitLabUserBasic, UserSummary};
use crate::api::client::{GitLabClient, Query};
use crate::api::common::{ApiError, Identifier, NormalizedHeaders, Paginated, PaginationRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabJobCommit {
    pub id: String,
    #[serde(default)]
    pub short_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabJobPipeline {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

/// Artifact file attached to a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Artifact {
    pub file_type: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_format: Option<String>,
}

/// Runner that picked up a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Runner {
    pub id: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_shared: Option<bool>,
}

/// Job as returned by the jobs API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabJob {
    pub id: u64,
    pub name: String,
    pub stage: String,
    pub status: String,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub tag: bool,
    #[serde(default)]
    pub coverage: Option<f64>,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub queued_duration: Option<f64>,
    #[serde(default)]
    pub user: Option<GitLabUserBasic>,
    #[serde(default)]
    pub commit: Option<GitLabJobCommit>,
    #[serde(default)]
    pub pipeline: Option<GitLabJobPipeline>,
    pub web_url: String,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub runner: Option<Runner>,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// Commit a job ran on, brief form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCommit {
    pub id: String,
    pub short_id: Option<String>,
    pub title: Option<String>,
}

/// Pipeline a job belongs to, brief form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPipeline {
    pub id: u64,
    pub status: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub sha: Option<String>,
}

/// Normalized job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub stage: String,
    pub status: String,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub tag: bool,
    pub coverage: Option<f64>,
    pub allow_failure: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
    pub queued_duration: Option<f64>,
    pub user: Option<UserSummary>,
    pub commit: Option<JobCommit>,
    pub pipeline: Option<JobPipeline>,
    pub web_url: String,
    pub artifacts: Vec<Artifact>,
    pub runner: Option<Runner>,
    pub tag_list: Vec<String>,
}

impl From<GitLabJob> for Job {
    fn from(j: GitLabJob) -> Self {
        Self {
            id: j.id,
            name: j.name,
            stage: j.stage,
            status: j.status,
            git_ref: j.git_ref,
            tag: j.tag,
            coverage: j.coverage,
            allow_failure: j.allow_failure,
            created_at: j.created_at,
            started_at: j.started_at,
            finished_at: j.finished_at,
            duration: j.duration,
            queued_duration: j.queued_duration,
            user: j.user.map(UserSummary::from),
            commit: j.commit.map(|c| JobCommit {
                id: c.id,
                short_id: c.short_id,
                title: c.title,
            }),
            pipeline: j.pipeline.map(|p| JobPipeline {
                id: p.id,
                status: p.status,
                git_ref: p.git_ref,
                sha: p.sha,
            }),
            web_url: j.web_url,
            artifacts: j.artifacts,
            runner: j.runner,
            tag_list: j.tag_list,
        }
    }
}

wire_enum! {
    /// Job status scope filter.
    JobScope, "scope" {
        Created => "created",
        Pending => "pending",
        Running => "running",
        Failed => "failed",
        Success => "success",
        Canceled => "canceled",
        Skipped => "skipped",
        WaitingForResource => "waiting_for_resource",
        Manual => "manual",
    }
}

/// Filters for `GET projects/:id/pipelines/:pid/jobs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    /// Statuses to include; empty means all
    pub scopes: Vec<JobScope>,
    /// Include retried attempts
    pub include_retried: bool,
}

fn scope_params(query: Query, scopes: &[JobScope]) -> Query {
    scopes
        .iter()
        .fold(query, |q, scope| q.push("scope[]", scope))
}

/// Slice of a job log to fetch.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::resources::ByteRange;
///
/// assert_eq!(ByteRange::new(0, Some(1024)).unwrap().header_value(), "bytes=0-1023");
/// assert_eq!(ByteRange::new(2048, None).unwrap().header_value(), "bytes=2048-");
/// assert!(ByteRange::new(0, Some(0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    max_bytes: Option<u64>,
}

impl ByteRange {
    /// Starts at byte `start`, reading at most `max_bytes` bytes (to the end if `None`).
    pub fn new(start: u64, max_bytes: Option<u64>) -> Result<Self, ApiError> {
        if max_bytes == Some(0) {
            return Err(ApiError::validation("maxBytes", "must be greater than zero"));
        }
        Ok(Self { start, max_bytes })
    }

    /// First byte requested.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Upper bound on the bytes requested, `None` to the end of the log.
    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    /// Value for the `Range` request header.
    pub fn header_value(&self) -> String {
        match self.max_bytes {
            Some(max) => format!("bytes={}-{}", self.start, self.start.saturating_add(max - 1)),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// Log content of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTrace {
    pub job_id: u64,
    pub content: String,
    /// Bytes in `content`
    pub bytes: usize,
    /// The remote returned only part of the log
    pub partial: bool,
    /// Full log size, when the remote reported it
    pub total_bytes: Option<u64>,
    /// Raw `Content-Range` header
    pub content_range: Option<String>,
}

/// Outcome of saving a job log to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceDownload {
    pub job_id: u64,
    pub path: PathBuf,
    pub bytes_written: u64,
    pub partial: bool,
    pub total_bytes: Option<u64>,
}

/// Smallest `maxBytes` window accepted for a download.
pub const MIN_DOWNLOAD_BYTES: u64 = 1024;

/// Largest `maxBytes` window accepted for a download.
pub const MAX_DOWNLOAD_BYTES: u64 = 5_000_000;

/// Checks the `maxBytes` window of a download against
/// [`MIN_DOWNLOAD_BYTES`]..=[`MAX_DOWNLOAD_BYTES`].
pub fn validate_download_range(range: Option<ByteRange>) -> Result<(), ApiError> {
    match range.and_then(|r| r.max_bytes()) {
        Some(max) if !(MIN_DOWNLOAD_BYTES..=MAX_DOWNLOAD_BYTES).contains(&max) => {
            Err(ApiError::validation(
                "maxBytes",
                format!(
                    "must be between {MIN_DOWNLOAD_BYTES} and {MAX_DOWNLOAD_BYTES} \
                     for downloads, got {max}"
                ),
            ))
        }
        _ => Ok(()),
    }
}

async fn stream_to_file(response: &mut Response, path: &Path) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut bytes_written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(bytes_written)
}

/// Whether a trace response is partial, and the full size when reported.
fn range_info(status: StatusCode, headers: &NormalizedHeaders) -> (bool, Option<u64>) {
    let content_range = headers.get(CONTENT_RANGE.as_str());
    let partial = status == StatusCode::PARTIAL_CONTENT || content_range.is_some();
    (partial, content_range.and_then(parse_content_range_total))
}

/// Reads the total size from `bytes 0-99/1234`; `*` or garbage yields `None`.
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    value
        .split_once('/')
        .and_then(|(_, total)| total.trim().parse::<u64>().ok())
}

impl GitLabClient {
    /// Lists jobs of one pipeline.
    pub async fn pipeline_jobs(
        &self,
        project: &Identifier,
        pipeline_id: u64,
        query: &JobQuery,
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Job>>, ApiError> {
        let id = pipeline_id.to_string();
        let params = scope_params(
            Query::new().flag("include_retried", query.include_retried),
            &query.scopes,
        );
        let page = self
            .get_page::<GitLabJob>(
                self.project_endpoint(project, &["pipelines", id.as_str(), "jobs"]),
                params,
                page,
            )
            .await?;
        Ok(page.convert())
    }

    /// Lists jobs across all pipelines of a project.
    pub async fn project_jobs(
        &self,
        project: &Identifier,
        scopes: &[JobScope],
        page: PaginationRequest,
    ) -> Result<Paginated<Vec<Job>>, ApiError> {
        let page = self
            .get_page::<GitLabJob>(
                self.project_endpoint(project, &["jobs"]),
                scope_params(Query::new(), scopes),
                page,
            )
            .await?;
        Ok(page.convert())
    }

    /// Fetches one job.
    pub async fn get_job(&self, project: &Identifier, job_id: u64) -> Result<Job, ApiError> {
        let id = job_id.to_string();
        let remote: GitLabJob = self
            .get_json(
                self.project_endpoint(project, &["jobs", id.as_str()]),
                Query::new(),
            )
            .await?;
        Ok(remote.into())
    }

    fn trace_request(
        &self,
        project: &Identifier,
        job_id: u64,
        range: Option<ByteRange>,
    ) -> RequestBuilder {
        let id = job_id.to_string();
        let request = self.request(
            Method::GET,
            self.project_endpoint(project, &["jobs", id.as_str(), "trace"]),
        );
        match range {
            Some(range) => request.header(RANGE, range.header_value()),
            None => request,
        }
    }

    /// Fetches a job log, optionally a byte range of it.
    pub async fn job_trace(
        &self,
        project: &Identifier,
        job_id: u64,
        range: Option<ByteRange>,
    ) -> Result<JobTrace, ApiError> {
        let response = self
            .execute(self.trace_request(project, job_id, range))
            .await?;

        let status = response.status();
        let headers = NormalizedHeaders::from_header_map(response.headers());
        let (partial, total_bytes) = range_info(status, &headers);
        let content_range = headers.get(CONTENT_RANGE.as_str()).map(String::from);
        let content = response.text().await?;

        debug!(job_id, bytes = content.len(), partial, "job trace fetched");

        Ok(JobTrace {
            job_id,
            bytes: content.len(),
            content,
            partial,
            total_bytes,
            content_range,
        })
    }

    /// Streams a job log into `path`, replacing any existing file.
    ///
    /// `path` is resolved against the working directory and reported in
    /// absolute form. Missing parent directories are created once GitLab has
    /// answered; a stream that fails part way leaves no file behind.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] on `maxBytes` outside the download window,
    ///   before any request
    /// - [`ApiError::Io`] when the file cannot be created or written
    pub async fn download_job_trace(
        &self,
        project: &Identifier,
        job_id: u64,
        range: Option<ByteRange>,
        path: &Path,
    ) -> Result<TraceDownload, ApiError> {
        validate_download_range(range)?;
        let path = std::path::absolute(path)?;

        let mut response = self
            .execute(self.trace_request(project, job_id, range))
            .await?;

        let headers = NormalizedHeaders::from_header_map(response.headers());
        let (partial, total_bytes) = range_info(response.status(), &headers);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes_written = match stream_to_file(&mut response, &path).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %cleanup, "could not remove partial job trace");
                }
                return Err(e);
            }
        };

        debug!(job_id, bytes_written, path = %path.display(), "job trace saved");

        Ok(TraceDownload {
            job_id,
            path,
            bytes_written,
            partial,
            total_bytes,
        })
    }
}
