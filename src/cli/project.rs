//
//  gitlab-tools
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands.
//!
//! Listings and searches are narrowed to the configured namespace whitelist
//! after each page arrives, so a page may hold fewer items than `--per-page`.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::resources::ProjectQuery;

use super::{page_summary, parse_opt, GlobalOptions, PageArgs, Scoped, ToolContext};

/// Work with projects
#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects, most recent activity first
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one project
    View(ViewArgs),

    /// Search projects by name or path
    Search(SearchArgs),

    /// List project members
    Members(MembersArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by name or path
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only projects you are a member of (defaults to GITLAB_MEMBERSHIP_ONLY)
    #[arg(long, value_name = "BOOL")]
    pub membership: Option<bool>,

    /// Archived filter
    #[arg(long, value_name = "BOOL")]
    pub archived: Option<bool>,

    /// Sort key
    #[arg(long, value_parser = ["id", "name", "path", "created_at", "updated_at", "last_activity_at"])]
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
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search term
    pub query: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Only direct members, without those inherited from parent groups
    #[arg(long)]
    pub direct: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberListing<T: Serialize> {
    project_url: String,
    inherited: bool,
    #[serde(flatten)]
    members: T,
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            ProjectSubcommand::List(args) => self.list(&ctx, args).await,
            ProjectSubcommand::View(args) => self.view(&ctx, args).await,
            ProjectSubcommand::Search(args) => self.search(&ctx, args).await,
            ProjectSubcommand::Members(args) => self.members(&ctx, args).await,
        }
    }

    async fn list(&self, ctx: &ToolContext, args: &ListArgs) -> Result<()> {
        let query = ProjectQuery {
            search: args.search.clone(),
            membership: args.membership,
            archived: args.archived,
            order_by: parse_opt(args.order_by.as_deref())?,
            sort: parse_opt(args.sort.as_deref())?,
        };

        let page = ctx.client.list_projects(&query, args.page.request()?).await?;
        let summary = page_summary(page.data.len(), "project", &page.pagination);
        ctx.emit(summary, &page)
    }

    async fn view(&self, ctx: &ToolContext, args: &ViewArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        ctx.emit(format!("Project {}", project.path_with_namespace), &project)
    }

    async fn search(&self, ctx: &ToolContext, args: &SearchArgs) -> Result<()> {
        let page = ctx
            .client
            .search_projects(&args.query, args.page.request()?)
            .await?;
        let summary = format!(
            "{} matching '{}'",
            page_summary(page.data.len(), "project", &page.pagination),
            args.query.trim()
        );
        ctx.emit(summary, &page)
    }

    async fn members(&self, ctx: &ToolContext, args: &MembersArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        let inherited = !args.direct;
        let page = ctx
            .client
            .project_members(&project.identifier(), inherited, args.page.request()?)
            .await?;

        let summary = page_summary(page.data.len(), "member", &page.pagination);
        ctx.emit(
            summary,
            &Scoped {
                project: &project.path_with_namespace,
                result: MemberListing {
                    project_url: ctx.client.links().project_url(&project.path_with_namespace),
                    inherited,
                    members: page,
                },
            },
        )
    }
}
