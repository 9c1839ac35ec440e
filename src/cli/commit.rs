//
//  gitlab-tools
//  cli/commit.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Commit commands

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::api::common::DEFAULT_DIFF_PER_PAGE;
use crate::api::resources::{CommitQuery, StatusQuery};

use super::{page_summary, parse_opt, GlobalOptions, PageArgs, Scoped, ToolContext};

/// Work with commits
#[derive(Args, Debug)]
pub struct CommitCommand {
    #[command(subcommand)]
    pub command: CommitSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CommitSubcommand {
    /// List commits of a project
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one commit
    View(ViewArgs),

    /// List files changed by a commit
    Diff(DiffArgs),

    /// List CI statuses of a commit
    Statuses(StatusesArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Branch, tag or revision range; the default branch when omitted
    #[arg(long = "ref", short = 'r')]
    pub ref_name: Option<String>,

    /// Committed on or after (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,

    /// Committed on or before (ISO-8601)
    #[arg(long)]
    pub until: Option<String>,

    /// Only commits touching this file
    #[arg(long)]
    pub path: Option<String>,

    /// Author name or email
    #[arg(long, short = 'a')]
    pub author: Option<String>,

    /// Follow only the first parent of merge commits
    #[arg(long)]
    pub first_parent: bool,

    /// Listing order
    #[arg(long, value_parser = ["default", "topo"])]
    pub order: Option<String>,

    /// Include line counts
    #[arg(long)]
    pub with_stats: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Commit SHA, branch or tag
    pub sha: String,

    /// Omit line counts
    #[arg(long)]
    pub no_stats: bool,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Commit SHA, branch or tag
    pub sha: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct StatusesArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Commit SHA
    pub sha: String,

    /// Every status, not only the latest per name
    #[arg(long)]
    pub all: bool,

    /// Only statuses with this name
    #[arg(long)]
    pub name: Option<String>,

    /// Only statuses of this pipeline
    #[arg(long)]
    pub pipeline_id: Option<u64>,

    /// Branch or tag
    #[arg(long = "ref", short = 'r')]
    pub git_ref: Option<String>,

    /// Sort key
    #[arg(long, value_parser = ["id", "pipeline_id"])]
    pub order_by: Option<String>,

    /// Sort direction
    #[arg(long, value_parser = ["asc", "desc"])]
    pub sort: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

impl CommitCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            CommitSubcommand::List(args) => self.list(&ctx, args).await,
            CommitSubcommand::View(args) => self.view(&ctx, args).await,
            CommitSubcommand::Diff(args) => self.diff(&ctx, args).await,
            CommitSubcommand::Statuses(args) => self.statuses(&ctx, args).await,
        }
    }

    async fn list(&self, ctx: &ToolContext, args: &ListArgs) -> Result<()> {
        let query = CommitQuery {
            ref_name: args.ref_name.clone(),
            since: args.since.clone(),
            until: args.until.clone(),
            path: args.path.clone(),
            author: args.author.clone(),
            first_parent: args.first_parent,
            order: parse_opt(args.order.as_deref())?,
            with_stats: args.with_stats,
        };
        let page = args.page.request()?;

        let project = ctx.project(&args.project).await?;
        let result = ctx
            .client
            .list_commits(&project.identifier(), &query, page)
            .await?;

        let summary = page_summary(result.data.len(), "commit", &result.pagination);
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
        let commit = ctx
            .client
            .get_commit(&project.identifier(), &args.sha, !args.no_stats)
            .await?;

        let mut summary = format!("{} {}", commit.short_id, commit.title);
        if let Some(stats) = commit.stats {
            summary.push_str(&format!(" (+{} -{})", stats.additions, stats.deletions));
        }
        ctx.emit(
            summary,
            &Scoped {
                project: &project.path_with_namespace,
                result: commit,
            },
        )
    }

    async fn diff(&self, ctx: &ToolContext, args: &DiffArgs) -> Result<()> {
        let page = args.page.request_with_default(DEFAULT_DIFF_PER_PAGE)?;

        let project = ctx.project(&args.project).await?;
        let result = ctx
            .client
            .commit_diff(&project.identifier(), &args.sha, page)
            .await?;

        let summary = format!(
            "{} in {}",
            page_summary(result.data.len(), "changed file", &result.pagination),
            args.sha.trim()
        );
        ctx.emit(
            summary,
            &Scoped {
                project: &project.path_with_namespace,
                result,
            },
        )
    }

    async fn statuses(&self, ctx: &ToolContext, args: &StatusesArgs) -> Result<()> {
        let query = StatusQuery {
            all: args.all,
            name: args.name.clone(),
            order_by: parse_opt(args.order_by.as_deref())?,
            pipeline_id: args.pipeline_id,
            git_ref: args.git_ref.clone(),
            sort: parse_opt(args.sort.as_deref())?,
        };
        let page = args.page.request()?;

        let project = ctx.project(&args.project).await?;
        let result = ctx
            .client
            .commit_statuses(&project.identifier(), &args.sha, &query, page)
            .await?;

        let summary = page_summary(result.data.len(), "status", &result.pagination);
        ctx.emit(
            summary,
            &Scoped {
                project: &project.path_with_namespace,
                result,
            },
        )
    }
}
