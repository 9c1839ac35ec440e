//
//  gitlab-tools
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitlab_tools::cli::{Cli, Commands, GlobalOptions};
use gitlab_tools::config::Config;
use gitlab_tools::exit_codes;
use gitlab_tools::output::ToolResponse;

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();
    let global = cli.global.clone();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            report_failure(&global, &e);
            std::process::exit(exit_codes::for_error(&e));
        }
    }
}

/// Initialize logging based on environment. Logs go to stderr so stdout
/// only ever carries tool output.
fn init_logging() {
    let filter = EnvFilter::try_from_env("GLT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Prints the failure envelope, or plain text when structured content is off.
fn report_failure(global: &GlobalOptions, error: &anyhow::Error) {
    let structured = Config::load()
        .map(|c| c.use_structured_content)
        .unwrap_or(true);
    let writer = global.writer(structured);

    if let Err(write_error) = writer.write(&ToolResponse::from_error(error)) {
        eprintln!("Error: {error:#} ({write_error})");
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Project(cmd) => cmd.run(&cli.global).await,
        Commands::Group(cmd) => cmd.run(&cli.global).await,
        Commands::Tag(cmd) => cmd.run(&cli.global).await,
        Commands::Mr(cmd) => cmd.run(&cli.global).await,
        Commands::User(cmd) => cmd.run(&cli.global).await,
        Commands::Pipeline(cmd) => cmd.run(&cli.global).await,
        Commands::Job(cmd) => cmd.run(&cli.global).await,
        Commands::Commit(cmd) => cmd.run(&cli.global).await,
        Commands::Info(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("glt version {}", gitlab_tools::VERSION);
            Ok(())
        }
    }
}
