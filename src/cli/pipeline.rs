//
//  gitlab-tools
//  cli/pipeline.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pipeline commands.
//!
//! Read-only views over GitLab CI: listings, single pipelines, the latest
//! pipeline of a ref, the jobs of a pipeline, its variables and its test
//! report. Nothing here triggers, retries or cancels.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::resources::{JobQuery, JobScope, Pipeline, PipelineQuery};
use crate::util::{count_noun, format_seconds};

use super::{page_summary, parse_opt, GlobalOptions, PageArgs, Scoped, ToolContext};

/// Work with CI pipelines
#[derive(Args, Debug)]
pub struct PipelineCommand {
    #[command(subcommand)]
    pub command: PipelineSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PipelineSubcommand {
    /// List pipelines of a project
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one pipeline
    View(PipelineArgs),

    /// Show the most recent pipeline of a ref
    Latest(LatestArgs),

    /// List the jobs of a pipeline
    Jobs(JobsArgs),

    /// Show the variables a pipeline ran with
    Variables(PipelineArgs),

    /// Show the test report of a pipeline
    #[command(name = "test-report")]
    TestReport(PipelineArgs),
}

pub(crate) const JOB_SCOPES: [&str; 9] = [
    "created",
    "pending",
    "running",
    "failed",
    "success",
    "canceled",
    "skipped",
    "waiting_for_resource",
    "manual",
];

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Branch or tag
    #[arg(long = "ref", short = 'r')]
    pub git_ref: Option<String>,

    /// Status filter
    #[arg(long, short = 's', value_parser = [
        "created", "waiting_for_resource", "preparing", "pending", "running",
        "success", "failed", "canceled", "skipped", "manual", "scheduled",
    ])]
    pub status: Option<String>,

    /// Trigger source (push, web, schedule, merge_request_event, ...)
    #[arg(long)]
    pub source: Option<String>,

    /// Username of the user who triggered the pipeline
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Updated on or after (ISO-8601)
    #[arg(long)]
    pub updated_after: Option<String>,

    /// Updated on or before (ISO-8601)
    #[arg(long)]
    pub updated_before: Option<String>,

    /// Only pipelines with invalid configuration
    #[arg(long)]
    pub yaml_errors: bool,

    /// Sort key
    #[arg(long, value_parser = ["id", "status", "ref", "updated_at", "user_id"])]
    pub order_by: Option<String>,

    /// Sort direction
    #[arg(long, value_parser = ["asc", "desc"])]
    pub sort: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Pipeline id
    pub pipeline: u64,
}

#[derive(Args, Debug)]
pub struct LatestArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Branch or tag; the default branch when omitted
    #[arg(long = "ref", short = 'r')]
    pub git_ref: Option<String>,
}

#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Pipeline id
    pub pipeline: u64,

    /// Only jobs with these statuses
    #[arg(long, action = clap::ArgAction::Append, value_parser = JOB_SCOPES)]
    pub scope: Vec<String>,

    /// Include retried attempts
    #[arg(long)]
    pub include_retried: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineDetail<T: Serialize> {
    pipeline_id: u64,
    pipeline_url: String,
    #[serde(flatten)]
    detail: T,
}

#[derive(Debug, Serialize)]
struct Variables<T: Serialize> {
    variables: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestReportView<T: Serialize> {
    test_report: T,
}

fn pipeline_summary(pipeline: &Pipeline) -> String {
    let mut summary = format!("Pipeline #{} {}", pipeline.id, pipeline.status);
    if let Some(git_ref) = &pipeline.git_ref {
        summary.push_str(&format!(" on {git_ref}"));
    }
    if let Some(duration) = pipeline.duration {
        summary.push_str(&format!(" in {}", format_seconds(duration)));
    }
    summary
}

impl PipelineCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            PipelineSubcommand::List(args) => self.list(&ctx, args).await,
            PipelineSubcommand::View(args) => self.view(&ctx, args).await,
            PipelineSubcommand::Latest(args) => self.latest(&ctx, args).await,
            PipelineSubcommand::Jobs(args) => self.jobs(&ctx, args).await,
            PipelineSubcommand::Variables(args) => self.variables(&ctx, args).await,
            PipelineSubcommand::TestReport(args) => self.test_report(&ctx, args).await,
        }
    }

    async fn list(&self, ctx: &ToolContext, args: &ListArgs) -> Result<()> {
        let query = PipelineQuery {
            git_ref: args.git_ref.clone(),
            status: parse_opt(args.status.as_deref())?,
            source: args.source.clone(),
            order_by: parse_opt(args.order_by.as_deref())?,
            sort: parse_opt(args.sort.as_deref())?,
            updated_after: args.updated_after.clone(),
            updated_before: args.updated_before.clone(),
            username: args.username.clone(),
            yaml_errors: args.yaml_errors,
        };
        let page = args.page.request()?;

        let project = ctx.project(&args.project).await?;
        let result = ctx
            .client
            .list_pipelines(&project.identifier(), &query, page)
            .await?;

        let summary = page_summary(result.data.len(), "pipeline", &result.pagination);
        ctx.emit(
            summary,
            &Scoped {
                project: &project.path_with_namespace,
                result,
            },
        )
    }

    async fn view(&self, ctx: &ToolContext, args: &PipelineArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        let pipeline = ctx
            .client
            .get_pipeline(&project.identifier(), args.pipeline)
            .await?;

        ctx.emit(
            pipeline_summary(&pipeline),
            &Scoped {
                project: &project.path_with_namespace,
                result: pipeline,
            },
        )
    }

    async fn latest(&self, ctx: &ToolContext, args: &LatestArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        let pipeline = ctx
            .client
            .latest_pipeline(&project.identifier(), args.git_ref.as_deref())
            .await?;

        ctx.emit(
            format!("Latest: {}", pipeline_summary(&pipeline)),
            &Scoped {
                project: &project.path_with_namespace,
                result: pipeline,
            },
        )
    }

    async fn jobs(&self, ctx: &ToolContext, args: &JobsArgs) -> Result<()> {
        let query = JobQuery {
            scopes: args
                .scope
                .iter()
                .map(|s| s.parse::<JobScope>())
                .collect::<Result<_, _>>()?,
            include_retried: args.include_retried,
        };
        let page = args.page.request()?;

        let project = ctx.project(&args.project).await?;
        let path = project.path_with_namespace.as_str();
        let result = ctx
            .client
            .pipeline_jobs(&project.identifier(), args.pipeline, &query, page)
            .await?;

        let summary = format!(
            "{} in pipeline #{}",
            page_summary(result.data.len(), "job", &result.pagination),
            args.pipeline
        );
        ctx.emit(
            summary,
            &Scoped {
                project: path,
                result: PipelineDetail {
                    pipeline_id: args.pipeline,
                    pipeline_url: ctx.client.links().pipeline_url(path, args.pipeline),
                    detail: result,
                },
            },
        )
    }

    async fn variables(&self, ctx: &ToolContext, args: &PipelineArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        let path = project.path_with_namespace.as_str();
        let variables = ctx
            .client
            .pipeline_variables(&project.identifier(), args.pipeline)
            .await?;

        let summary = format!(
            "{} in pipeline #{}",
            count_noun(variables.len(), "variable"),
            args.pipeline
        );
        ctx.emit(
            summary,
            &Scoped {
                project: path,
                result: PipelineDetail {
                    pipeline_id: args.pipeline,
                    pipeline_url: ctx.client.links().pipeline_url(path, args.pipeline),
                    detail: Variables { variables },
                },
            },
        )
    }

    async fn test_report(&self, ctx: &ToolContext, args: &PipelineArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        let path = project.path_with_namespace.as_str();
        let report = ctx
            .client
            .pipeline_test_report(&project.identifier(), args.pipeline)
            .await?;

        let summary = format!(
            "{} passed, {} failed, {} skipped, {} errored of {} in {}",
            report.success_count,
            report.failed_count,
            report.skipped_count,
            report.error_count,
            count_noun(report.total_count as usize, "test"),
            format_seconds(report.total_time)
        );
        ctx.emit(
            summary,
            &Scoped {
                project: path,
                result: PipelineDetail {
                    pipeline_id: args.pipeline,
                    pipeline_url: ctx.client.links().pipeline_url(path, args.pipeline),
                    detail: TestReportView {
                        test_report: report,
                    },
                },
            },
        )
    }
}
