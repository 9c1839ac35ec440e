//
//  gitlab-tools
//  cli/user.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! User commands

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::resources::{User, UserQuery};
use crate::api::{ApiError, Identifier};
use crate::util::count_noun;

use super::{page_summary, GlobalOptions, PageArgs, ToolContext};

/// Work with users
#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UserSubcommand {
    /// List users
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one user by id or username
    View(ViewArgs),

    /// Look up several users at once
    Batch(BatchArgs),

    /// Show the user the token belongs to
    Me,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Match name, username or public email
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Exact username
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Only active users
    #[arg(long)]
    pub active: bool,

    /// Only blocked users
    #[arg(long)]
    pub blocked: bool,

    /// Only external users
    #[arg(long)]
    pub external: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Numeric id or username
    pub user: String,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Numeric ids or usernames (at most 50)
    #[arg(required = true, num_args = 1..)]
    pub users: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserView {
    #[serde(flatten)]
    user: User,
    profile_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchResult {
    users: Vec<User>,
    not_found: Vec<Identifier>,
}

impl UserCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            UserSubcommand::List(args) => self.list(&ctx, args).await,
            UserSubcommand::View(args) => self.view(&ctx, args).await,
            UserSubcommand::Batch(args) => self.batch(&ctx, args).await,
            UserSubcommand::Me => self.me(&ctx).await,
        }
    }

    async fn list(&self, ctx: &ToolContext, args: &ListArgs) -> Result<()> {
        let query = UserQuery {
            search: args.search.clone(),
            username: args.username.clone(),
            active: args.active,
            blocked: args.blocked,
            external: args.external,
        };
        let page = ctx.client.list_users(&query, args.page.request()?).await?;
        let summary = page_summary(page.data.len(), "user", &page.pagination);
        ctx.emit(summary, &page)
    }

    async fn view(&self, ctx: &ToolContext, args: &ViewArgs) -> Result<()> {
        let key: Identifier = args.user.parse()?;
        let user = ctx.client.get_user(&key).await?;

        ctx.emit(
            format!("{} (@{})", user.name, user.username),
            &UserView {
                profile_url: ctx.client.links().user_url(&user.username),
                user,
            },
        )
    }

    async fn batch(&self, ctx: &ToolContext, args: &BatchArgs) -> Result<()> {
        let keys = args
            .users
            .iter()
            .map(|u| u.parse::<Identifier>())
            .collect::<Result<Vec<_>, ApiError>>()?;
        let requested = keys.len();

        let (users, not_found) = ctx.client.get_users_batch(keys).await?.into_parts();
        if !not_found.is_empty() {
            let missing: Vec<String> = not_found.iter().map(ToString::to_string).collect();
            ctx.warn(&format!("Not found: {}", missing.join(", ")));
        }

        let summary = format!("Resolved {} of {requested}", count_noun(users.len(), "user"));
        ctx.emit(summary, &BatchResult { users, not_found })
    }

    async fn me(&self, ctx: &ToolContext) -> Result<()> {
        let me = ctx.client.current_user().await?;
        ctx.emit(
            format!("Authenticated as @{}", me.user.username),
            &me,
        )
    }
}
