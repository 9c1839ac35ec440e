//
//  gitlab-tools
//  cli/group.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Group commands

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::Identifier;

use super::{page_summary, GlobalOptions, PageArgs, ToolContext};

/// Work with groups
#[derive(Args, Debug)]
pub struct GroupCommand {
    #[command(subcommand)]
    pub command: GroupSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GroupSubcommand {
    /// List group members
    Members(MembersArgs),
}

#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Group id or full path (parent/group)
    pub group: String,

    /// Only direct members, without those inherited from parent groups
    #[arg(long)]
    pub direct: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupMembers<T: Serialize> {
    group: String,
    inherited: bool,
    #[serde(flatten)]
    members: T,
}

impl GroupCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            GroupSubcommand::Members(args) => {
                let group: Identifier = args.group.parse()?;
                let inherited = !args.direct;
                let page = ctx
                    .client
                    .group_members(&group, inherited, args.page.request()?)
                    .await?;

                let summary = page_summary(page.data.len(), "member", &page.pagination);
                ctx.emit(
                    summary,
                    &GroupMembers {
                        group: group.to_string(),
                        inherited,
                        members: page,
                    },
                )
            }
        }
    }
}
