//
//  gitlab-tools
//  cli/job.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Job commands.
//!
//! Job logs can be large. `job trace` returns the log inline, optionally a
//! byte window of it (`--start`, `--max-bytes`), and reports whether the
//! content is partial. `job download` streams the log into a file and only
//! writes when `--confirm` is given.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::resources::{validate_download_range, ByteRange, JobScope};
use crate::api::ApiError;
use crate::util::{format_seconds, format_size};

use super::pipeline::JOB_SCOPES;
use super::{page_summary, GlobalOptions, PageArgs, Scoped, ToolContext};

/// Work with CI jobs
#[derive(Args, Debug)]
pub struct JobCommand {
    #[command(subcommand)]
    pub command: JobSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum JobSubcommand {
    /// List jobs across all pipelines of a project
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one job
    View(ViewArgs),

    /// Print a job log
    Trace(TraceArgs),

    /// Save a job log to a file
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Only jobs with these statuses
    #[arg(long, action = clap::ArgAction::Append, value_parser = JOB_SCOPES)]
    pub scope: Vec<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Job id
    pub job: u64,
}

/// Byte window of a job log.
#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// First byte to fetch
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// Fetch at most this many bytes (1024-5000000 for downloads)
    #[arg(long)]
    pub max_bytes: Option<u64>,
}

impl RangeArgs {
    /// `None` for the whole log.
    fn byte_range(&self) -> Result<Option<ByteRange>, ApiError> {
        if self.start == 0 && self.max_bytes.is_none() {
            return Ok(None);
        }
        ByteRange::new(self.start, self.max_bytes).map(Some)
    }
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Job id
    pub job: u64,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Job id
    pub job: u64,

    /// Destination file (default: job-<id>.log)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Write the file; without this flag nothing is written
    #[arg(long)]
    pub confirm: bool,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceView<T: Serialize> {
    job_url: String,
    raw_trace_url: String,
    #[serde(flatten)]
    trace: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PendingDownload {
    job_id: u64,
    path: PathBuf,
    written: bool,
    note: &'static str,
}

const CONFIRM_NOTE: &str = "Nothing was written. Re-run with --confirm to save the log.";

impl JobCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            JobSubcommand::List(args) => self.list(&ctx, args).await,
            JobSubcommand::View(args) => self.view(&ctx, args).await,
            JobSubcommand::Trace(args) => self.trace(&ctx, args).await,
            JobSubcommand::Download(args) => self.download(&ctx, args).await,
        }
    }

    async fn list(&self, ctx: &ToolContext, args: &ListArgs) -> Result<()> {
        let scopes = args
            .scope
            .iter()
            .map(|s| s.parse::<JobScope>())
            .collect::<Result<Vec<_>, _>>()?;
        let page = args.page.request()?;

        let project = ctx.project(&args.project).await?;
        let result = ctx
            .client
            .project_jobs(&project.identifier(), &scopes, page)
            .await?;

        let summary = page_summary(result.data.len(), "job", &result.pagination);
        ctx.emit(
            summary,
            &Scoped {
                project: &project.path_with_namespace,
                result,
            },
        )
    }

    async fn view(&self, ctx: &ToolContext, args: &ViewArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        let job = ctx.client.get_job(&project.identifier(), args.job).await?;

        let mut summary = format!("Job #{} {} ({}) {}", job.id, job.name, job.stage, job.status);
        if let Some(duration) = job.duration {
            summary.push_str(&format!(" in {}", format_seconds(duration)));
        }
        ctx.emit(
            summary,
            &Scoped {
                project: &project.path_with_namespace,
                result: job,
            },
        )
    }

    async fn trace(&self, ctx: &ToolContext, args: &TraceArgs) -> Result<()> {
        let range = args.range.byte_range()?;

        let project = ctx.project(&args.project).await?;
        let path = project.path_with_namespace.as_str();
        let trace = ctx
            .client
            .job_trace(&project.identifier(), args.job, range)
            .await?;

        let mut summary = format!("Job #{} log: {}", args.job, format_size(trace.bytes as u64));
        if trace.partial {
            match trace.total_bytes {
                Some(total) => summary.push_str(&format!(" of {} (partial)", format_size(total))),
                None => summary.push_str(" (partial)"),
            }
        }

        let links = ctx.client.links();
        ctx.emit(
            summary,
            &Scoped {
                project: path,
                result: TraceView {
                    job_url: links.job_url(path, args.job),
                    raw_trace_url: links.job_raw_trace_url(path, args.job),
                    trace,
                },
            },
        )
    }

    async fn download(&self, ctx: &ToolContext, args: &DownloadArgs) -> Result<()> {
        let range = args.range.byte_range()?;
        validate_download_range(range)?;
        let destination = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("job-{}.log", args.job)));
        let destination = std::path::absolute(destination)?;

        if !args.confirm {
            return ctx.emit(
                format!("Download of job #{} not confirmed", args.job),
                &PendingDownload {
                    job_id: args.job,
                    path: destination,
                    written: false,
                    note: CONFIRM_NOTE,
                },
            );
        }

        let project = ctx.project(&args.project).await?;
        let path = project.path_with_namespace.as_str();
        let download = ctx
            .client
            .download_job_trace(&project.identifier(), args.job, range, &destination)
            .await?;

        let summary = format!(
            "Saved {} of job #{} log to {}",
            format_size(download.bytes_written),
            args.job,
            download.path.display()
        );
        let links = ctx.client.links();
        ctx.emit(
            summary,
            &Scoped {
                project: path,
                result: TraceView {
                    job_url: links.job_url(path, args.job),
                    raw_trace_url: links.job_raw_trace_url(path, args.job),
                    trace: download,
                },
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_log_has_no_range() {
        let args = RangeArgs {
            start: 0,
            max_bytes: None,
        };
        assert_eq!(args.byte_range().unwrap(), None);
    }

    #[test]
    fn test_window_builds_range() {
        let args = RangeArgs {
            start: 100,
            max_bytes: Some(50),
        };
        let range = args.byte_range().unwrap().unwrap();
        assert_eq!(range.header_value(), "bytes=100-149");
    }

    #[test]
    fn test_small_download_window_rejected() {
        let args = RangeArgs {
            start: 0,
            max_bytes: Some(512),
        };
        let range = args.byte_range().unwrap();
        assert_eq!(
            validate_download_range(range).unwrap_err().field(),
            Some("maxBytes")
        );
    }

    #[test]
    fn test_zero_max_bytes_rejected() {
        let args = RangeArgs {
            start: 0,
            max_bytes: Some(0),
        };
        assert_eq!(args.byte_range().unwrap_err().field(), Some("maxBytes"));
    }
}
