// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `osconfig` binary entry point (spec.md §6): parse arguments, load
//! configuration, initialize logging, and dispatch to the requested verb.
//! A non-zero exit code on any fatal startup error; per-verb failures after
//! that are handled and logged by the verb itself.

mod cli;
mod commands;
mod control_plane_http;
mod error;
mod inventory_collect;
mod notification_source;
mod recipe_source;
mod wiring;

use clap::Parser;
use cli::{Cli, Verb};
use commands::AgentContext;
use error::StartupError;
use std::process::ExitCode;

fn state_dir() -> std::path::PathBuf {
    dirs::data_local_dir().unwrap_or_else(std::env::temp_dir).join("osconfig-agent")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "fatal startup error");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<(), StartupError> {
    let log_level = args.effective_log_level();
    let config = osconfig_daemon::Config::load(args.config.as_deref())?;

    let _log_guard = match args.verb {
        Verb::Run | Verb::NoService => Some(osconfig_daemon::logging::init_with_file_appender(&log_level, &state_dir())),
        Verb::Inventory | Verb::Policies | Verb::WaitForTaskNotification => {
            osconfig_daemon::logging::init_stderr(&log_level);
            None
        }
    };

    let ctx = AgentContext::new(config, args.config.clone());

    let result = match args.verb {
        Verb::Run | Verb::NoService => commands::run::run(ctx).await,
        Verb::Inventory => commands::inventory::run(&ctx).await,
        Verb::Policies => commands::policies::run(&ctx).await,
        Verb::WaitForTaskNotification => commands::wait_for_task_notification::run(&ctx).await,
    };

    if let Err(err) = result {
        tracing::error!(%err, "verb failed");
    }
    Ok(())
}
