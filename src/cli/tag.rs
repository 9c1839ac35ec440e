//
//  gitlab-tools
//  cli/tag.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Tag commands.
//!
//! `tag list` also proposes the next release: the highest SemVer tag on the
//! page with its patch bumped, plus a pre-filled link to create it on the
//! project's default branch.
//!
//! `tag create` is the only mutating tool. It is refused while read-only
//! mode is on (the default) and requires a SemVer tag name.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::common::PaginationInfo;
use crate::api::links::DEFAULT_TAG_REF;
use crate::api::resources::{CreateTag, Tag};
use crate::api::Identifier;
use crate::version::{plan_next_tag, TagVersionInfo};

use super::{page_summary, GlobalOptions, PageArgs, Scoped, ToolContext};

/// Work with repository tags
#[derive(Args, Debug)]
pub struct TagCommand {
    #[command(subcommand)]
    pub command: TagSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TagSubcommand {
    /// List tags, highest version first, and propose the next one
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Create a tag (requires GITLAB_READ_ONLY=false)
    Create(CreateArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project id or full path (group/project)
    pub project: String,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project id or full path (group/project)
    pub project: String,

    /// Tag name, SemVer with an optional leading 'v' (e.g. v1.2.3)
    pub tag_name: String,

    /// Branch, tag or commit SHA to tag
    #[arg(long = "ref", short = 'r', default_value = DEFAULT_TAG_REF)]
    pub git_ref: String,

    /// Annotation message; a lightweight tag is created without one
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Release notes to publish with the tag
    #[arg(long)]
    pub release_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TagEntry {
    #[serde(flatten)]
    tag: Tag,
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TagListing {
    tags: Vec<TagEntry>,
    pagination: PaginationInfo,
    #[serde(flatten)]
    plan: TagVersionInfo,
    tag_creation_url: String,
}

impl TagCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = ToolContext::load(global)?;

        match &self.command {
            TagSubcommand::List(args) => self.list(&ctx, args).await,
            TagSubcommand::Create(args) => self.create(&ctx, args).await,
        }
    }

    async fn list(&self, ctx: &ToolContext, args: &ListArgs) -> Result<()> {
        let project = ctx.project(&args.project).await?;
        let path = project.path_with_namespace.as_str();
        let page = ctx
            .client
            .list_tags(&project.identifier(), args.page.request()?)
            .await?;

        let plan = plan_next_tag(page.data.iter().map(|t| t.name.as_str()));
        let links = ctx.client.links();
        let tag_creation_url =
            links.tag_creation_url(path, &plan.next_tag, project.default_branch.as_deref());

        let summary = format!(
            "{}; latest {} -> next {}",
            page_summary(page.data.len(), "tag", &page.pagination),
            plan.current_tag,
            plan.next_tag
        );
        let tags = page
            .data
            .into_iter()
            .map(|tag| TagEntry {
                url: links.tag_url(path, &tag.name),
                tag,
            })
            .collect();

        ctx.emit(
            summary,
            &Scoped {
                project: path,
                result: TagListing {
                    tags,
                    pagination: page.pagination,
                    plan,
                    tag_creation_url,
                },
            },
        )
    }

    async fn create(&self, ctx: &ToolContext, args: &CreateArgs) -> Result<()> {
        let mut project: Identifier = args.project.parse()?;

        // The tag link needs the project path, numeric ids are resolved
        // once the gate is known to be open.
        if matches!(project, Identifier::Numeric(_)) && !ctx.config.read_only {
            project = ctx.client.get_project(&project).await?.identifier();
        }

        let request = CreateTag {
            tag_name: args.tag_name.clone(),
            git_ref: args.git_ref.clone(),
            message: args.message.clone(),
            release_description: args.release_description.clone(),
        };
        let created = ctx.client.create_tag(&project, &request).await?;

        ctx.emit(
            format!("Created tag {} in {}", created.name, project),
            &Scoped {
                project: &project.to_string(),
                result: created,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn create_args(argv: &[&str]) -> CreateArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Tag(TagCommand {
                command: TagSubcommand::Create(args),
            }) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_create_ref_defaults_to_master() {
        let args = create_args(&["glt", "tag", "create", "team/api", "v1.2.4"]);
        assert_eq!(args.git_ref, "master");
        assert_eq!(args.release_description, None);
    }

    #[test]
    fn test_create_release_description() {
        let args = create_args(&[
            "glt",
            "tag",
            "create",
            "42",
            "v1.2.4",
            "--ref",
            "main",
            "--release-description",
            "## Changes",
        ]);
        assert_eq!(args.git_ref, "main");
        assert_eq!(args.release_description.as_deref(), Some("## Changes"));
    }
}
