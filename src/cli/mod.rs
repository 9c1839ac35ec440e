//
//  gitlab-tools
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros.
//!
//! Every leaf subcommand is one tool: it loads the configuration, calls the
//! gateway and prints a single JSON envelope (see [`crate::output`]).

mod commit;
mod completion;
mod group;
mod info;
mod job;
mod mr;
mod pipeline;
mod project;
mod tag;
mod user;

pub use commit::CommitCommand;
pub use completion::CompletionCommand;
pub use group::GroupCommand;
pub use info::InfoCommand;
pub use job::JobCommand;
pub use mr::MrCommand;
pub use pipeline::PipelineCommand;
pub use project::ProjectCommand;
pub use tag::TagCommand;
pub use user::UserCommand;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::api::resources::Project;
use crate::api::{ApiError, GitLabClient, Identifier, PaginationInfo, PaginationRequest};
use crate::config::{Config, ConfigStore};
use crate::output::{OutputWriter, ToolResponse};
use crate::util::count_noun;

/// GitLab Tools - GitLab REST API as command-line tools
#[derive(Parser, Debug)]
#[command(
    name = "glt",
    version,
    about = "GitLab REST API as command-line tools",
    long_about = "glt exposes projects, tags, merge requests, users, pipelines, jobs and \
                  commits of a GitLab instance as tools that print JSON.\n\n\
                  Configure it with GITLAB_URL and GITLAB_TOKEN.",
    propagate_version = true,
    after_help = "Use 'glt <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Print single-line JSON
    #[arg(long, global = true, env = "GLT_COMPACT")]
    pub compact: bool,
}

impl GlobalOptions {
    /// Output writer honoring `--compact`.
    pub fn writer(&self, structured: bool) -> OutputWriter {
        OutputWriter::new(self.compact, structured)
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Projects and their members
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Group members
    Group(GroupCommand),

    /// Repository tags and release planning
    Tag(TagCommand),

    /// Merge requests and their changes
    Mr(MrCommand),

    /// Users
    User(UserCommand),

    /// CI pipelines
    #[command(visible_alias = "ci")]
    Pipeline(PipelineCommand),

    /// CI jobs and their logs
    Job(JobCommand),

    /// Commits and commit statuses
    Commit(CommitCommand),

    /// Show the active configuration
    Info(InfoCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}

/// Page selection shared by listing tools.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u32>,

    /// Results per page (1-100)
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl PageArgs {
    /// Validated request with the standard page size.
    pub fn request(&self) -> Result<PaginationRequest, ApiError> {
        PaginationRequest::new(self.page, self.per_page)
    }

    /// Validated request with a resource-specific default page size.
    pub fn request_with_default(&self, per_page: u32) -> Result<PaginationRequest, ApiError> {
        PaginationRequest::with_default(self.page, self.per_page, per_page)
    }
}

/// A tool result scoped to one project, reported by its full path.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Scoped<'a, T: Serialize> {
    pub project: &'a str,
    #[serde(flatten)]
    pub result: T,
}

/// What every tool needs: the configuration snapshot, a gateway client and
/// the output writer.
pub(crate) struct ToolContext {
    pub config: Arc<Config>,
    pub client: GitLabClient,
    output: OutputWriter,
}

impl ToolContext {
    /// Loads the configuration and builds the client.
    pub fn load(global: &GlobalOptions) -> Result<Self> {
        let config = ConfigStore::load()?.current();
        let client = GitLabClient::new(Arc::clone(&config))?;
        let output = global.writer(config.use_structured_content);
        Ok(Self {
            config,
            client,
            output,
        })
    }

    /// Resolves a project id or path through the gateway.
    pub async fn project(&self, project: &str) -> Result<Project> {
        let id: Identifier = project.parse()?;
        Ok(self.client.get_project(&id).await?)
    }

    /// Prints a success envelope.
    pub fn emit<T: Serialize + ?Sized>(&self, summary: impl Into<String>, payload: &T) -> Result<()> {
        let response = ToolResponse::success(summary, payload)?;
        self.output.write(&response)
    }

    /// Prints a diagnostic to stderr.
    pub fn warn(&self, msg: &str) {
        self.output.write_warning(msg);
    }
}

/// Parses an optional command-line value into a wire enum.
pub(crate) fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = ApiError>,
{
    value.map(str::parse).transpose()
}

/// `"Found 3 projects (page 1 of 4)"`; the page count is left out when the
/// remote did not report it.
pub(crate) fn page_summary(count: usize, noun: &str, pagination: &PaginationInfo) -> String {
    let found = format!("Found {}", count_noun(count, noun));
    match pagination.total_pages {
        Some(total) => format!("{found} (page {} of {total})", pagination.page),
        None => format!("{found} (page {})", pagination.page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::NormalizedHeaders;
    use crate::api::resources::MergeRequestState;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_opt() {
        let state: Option<MergeRequestState> = parse_opt(Some("merged")).unwrap();
        assert_eq!(state, Some(MergeRequestState::Merged));
        assert_eq!(parse_opt::<MergeRequestState>(None).unwrap(), None);
        assert!(parse_opt::<MergeRequestState>(Some("bogus")).is_err());
    }

    #[test]
    fn test_page_summary() {
        let headers = NormalizedHeaders::from_raw([
            ("x-total-pages", crate::api::common::RawHeaderValue::from("4")),
        ]);
        let with_total = PaginationInfo::extract(&headers, 2, 20);
        assert_eq!(
            page_summary(20, "project", &with_total),
            "Found 20 projects (page 2 of 4)"
        );

        let without = PaginationInfo::extract(&NormalizedHeaders::default(), 1, 20);
        assert_eq!(page_summary(1, "tag", &without), "Found 1 tag (page 1)");
    }

    #[test]
    fn test_page_args_validation() {
        let args = PageArgs {
            page: None,
            per_page: Some(101),
        };
        assert_eq!(args.request().unwrap_err().field(), Some("perPage"));
        assert_eq!(args.request_with_default(20).unwrap_err().field(), Some("perPage"));

        let defaults = PageArgs::default().request_with_default(20).unwrap();
        assert_eq!(defaults.per_page, 20);
    }
}
