// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (spec.md §2 NEW): a global `tracing_subscriber` registry,
//! env-filter driven, optionally teeing to a daily-rolling file under the
//! agent's state directory.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Initialize stderr-only logging. Returns nothing to keep alive; suitable
/// for short-lived verbs (`inventory`, `policies`) that don't need a file sink.
pub fn init_stderr(log_level: &str) {
    tracing_subscriber::fmt().with_env_filter(filter(log_level)).init();
}

/// Initialize logging that also tees to a daily-rolling file under
/// `state_dir/logs`. The returned [`WorkerGuard`] must be held for the
/// process lifetime — dropping it stops the background flush thread.
pub fn init_with_file_appender(log_level: &str, state_dir: &std::path::Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(state_dir.join("logs"), "osconfig-agent.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt().with_env_filter(filter(log_level)).with_writer(non_blocking).with_ansi(false).init();
    guard
}
