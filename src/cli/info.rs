//
//  gitlab-tools
//  cli/info.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Configuration report. Makes no request to GitLab.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::config::{config_file_path, ConfigStore, FilterConfig};
use crate::output::ToolResponse;

use super::GlobalOptions;

/// Show the active configuration
#[derive(Args, Debug)]
pub struct InfoCommand {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Info {
    name: &'static str,
    version: &'static str,
    gitlab_url: String,
    token_configured: bool,
    read_only: bool,
    timezone: String,
    use_structured_content: bool,
    request_timeout_secs: u64,
    batch_concurrency: usize,
    filters: FilterConfig,
    config_file: Option<PathBuf>,
}

impl InfoCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = ConfigStore::load()?.current();

        let info = Info {
            name: crate::APP_NAME,
            version: crate::VERSION,
            gitlab_url: config.gitlab.url.to_string(),
            token_configured: !config.gitlab.token.is_empty(),
            read_only: config.read_only,
            timezone: config.timezone.clone(),
            use_structured_content: config.use_structured_content,
            request_timeout_secs: config.request_timeout_secs,
            batch_concurrency: config.batch_concurrency,
            filters: config.filters.clone(),
            config_file: config_file_path().filter(|p| p.exists()),
        };

        let mode = if info.read_only { "read-only" } else { "read-write" };
        let response = ToolResponse::success(
            format!("{} {} connected to {} ({mode})", info.name, info.version, info.gitlab_url),
            &info,
        )?;
        global.writer(config.use_structured_content).write(&response)
    }
}
