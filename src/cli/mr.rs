//
//  gitlab-tools
//  cli/mr.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Merge request commands.
//!
//! Every merge request carries a `fresh` flag: `true` while unmerged, or
//! when it was merged within the last 24 hours.
//!
//! `mr changes` lists the changed files without patch text; `mr diff`
//! includes it. Both accept an exact-path filter (`--file`, or
//! `--include`/`--exclude`), applied per page after the page arrives.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::common::DEFAULT_DIFF_PER_PAGE;
use crate::api::filter::PathFilter;
use crate::api::resources::{MergeRequestQuery, MergeRequestSearch, MergeRequestState};
use crate::api::Identifier;

use super::{page_summary, parse_opt, GlobalOptions, PageArgs, Scoped, ToolContext};

/// Work with merge requests
#[derive(Args, Debug)]
pub struct MrCommand {
    #[command(subcommand)]
    pub command: MrSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MrSubcommand {
    /// List merge requests of a project, most recently updated first
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one merge request
    View(ViewArgs),

    /// Search merge requests globally or in one project
    Search(SearchArgs),

    /// List changed files without patch text
    Changes(DiffArgs),

    /// List changed files with patch text
    Diff(DiffArgs),
}

const STATES: [&str; 5] = ["opened", "closed", "locked", "merged", "all"];

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// State filter
    #[arg(long, short = 's', default_value = "all", value_parser = STATES)]
    pub state: String,

    /// Only merge requests into this branch
    #[arg(long, short = 'B')]
    pub target_branch: Option<String>,

    /// Updated on or after (ISO-8601, e.g. 2024-05-01 or 2024-05-01T10:00:00Z)
    #[arg(long)]
    pub updated_after: Option<String>,

    /// Updated on or before (ISO-8601)
    #[arg(long)]
    pub updated_before: Option<String>,

    /// Sort key
    #[arg(long, value_parser = ["created_at", "updated_at", "merged_at", "title"])]
    pub order_by: Option<String>,

    /// Sort direction
    #[arg(long, value_parser = ["asc", "desc"])]
    pub sort: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Merge request number within the project
    pub iid: u64,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search term, matched against titles and descriptions
    pub query: String,

    /// Restrict to one project
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// State filter
    #[arg(long, short = 's', default_value = "all", value_parser = STATES)]
    pub state: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Merge request number within the project
    pub iid: u64,

    /// Only this file; overrides --include and --exclude
    #[arg(long, short = 'f')]
    pub file: Option<String>,

    /// Only these files (exact paths)
    #[arg(long, action = clap::ArgAction::Append)]
    pub include: Vec<String>,

    /// Skip these files (exact paths)
    #[arg(long, action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

impl DiffArgs {
    fn filter(&self) -> PathFilter {
        PathFilter::from_options(self.file.clone(), self.include.clone(), self.exclude.clone())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Changes<T: Serialize> {
    merge_request_url: String,
    #[serde(flatten)]
    files: T,
}

impl MrCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            MrSubcommand::List(args) => self.list(&ctx, args).await,
            MrSubcommand::View(args) => self.view(&ctx, args).await,
            MrSubcommand::Search(args) => self.search(&ctx, args).await,
            MrSubcommand::Changes(args) => self.changes(&ctx, args, false).await,
            MrSubcommand::Diff(args) => self.changes(&ctx, args, true).await,
        }
    }

    async fn list(&self, ctx: &ToolContext, args: &ListArgs) -> Result<()> {
        let query = MergeRequestQuery {
            state: args.state.parse()?,
            target_branch: args.target_branch.clone(),
            updated_after: args.updated_after.clone(),
            updated_before: args.updated_before.clone(),
            order_by: parse_opt(args.order_by.as_deref())?,
            sort: parse_opt(args.sort.as_deref())?,
        };
        let page = args.page.request()?;

        let project = ctx.project(&args.project).await?;
        let result = ctx
            .client
            .list_merge_requests(&project.identifier(), &query, page)
            .await?;

        let summary = page_summary(result.data.len(), "merge request", &result.pagination);
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
        let mr = ctx
            .client
            .get_merge_request(&project.identifier(), args.iid)
            .await?;

        ctx.emit(
            format!("!{} {} ({})", mr.iid, mr.title, mr.state),
            &Scoped {
                project: &project.path_with_namespace,
                result: mr,
            },
        )
    }

    async fn search(&self, ctx: &ToolContext, args: &SearchArgs) -> Result<()> {
        let state: MergeRequestState = args.state.parse()?;
        let page = args.page.request()?;

        let project = match &args.project {
            Some(project) => Some(ctx.project(project).await?),
            None => None,
        };
        let search = MergeRequestSearch {
            term: args.query.clone(),
            project: project.as_ref().map(|p| p.identifier()),
            state,
        };
        let result = ctx.client.search_merge_requests(&search, page).await?;

        let summary = format!(
            "{} matching '{}'",
            page_summary(result.data.len(), "merge request", &result.pagination),
            args.query.trim()
        );
        match &project {
            Some(project) => ctx.emit(
                summary,
                &Scoped {
                    project: &project.path_with_namespace,
                    result,
                },
            ),
            None => ctx.emit(summary, &result),
        }
    }

    async fn changes(&self, ctx: &ToolContext, args: &DiffArgs, with_patch: bool) -> Result<()> {
        let page = args.page.request_with_default(DEFAULT_DIFF_PER_PAGE)?;
        let filter = args.filter();

        let project = ctx.project(&args.project).await?;
        let id: Identifier = project.identifier();
        let mut result = ctx
            .client
            .merge_request_diffs(&id, args.iid, &filter, page)
            .await?;
        if !with_patch {
            result = result.map(|files| files.into_iter().map(|f| f.brief()).collect());
        }

        let path = project.path_with_namespace.as_str();
        let summary = format!(
            "{} in !{}",
            page_summary(result.data.len(), "changed file", &result.pagination),
            args.iid
        );
        ctx.emit(
            summary,
            &Scoped {
                project: path,
                result: Changes {
                    merge_request_url: ctx.client.links().merge_request_url(path, args.iid),
                    files: result,
                },
            },
        )
    }
}
