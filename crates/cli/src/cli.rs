// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Argument surface (spec.md §6): one required positional verb, plus global
//! flags that apply regardless of which verb runs.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "osconfig", version, about = "OS Config agent")]
pub struct Cli {
    pub verb: Verb,

    /// Path to an optional TOML config file, overlaid on compiled-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Shorthand for `--log-level debug`.
    #[arg(long, global = true)]
    pub debug: bool,
}

impl Cli {
    pub fn effective_log_level(&self) -> String {
        if self.debug {
            return "debug".to_string();
        }
        self.log_level.clone().unwrap_or_else(|| "info".to_string())
    }
}

/// The agent's verb surface (spec.md §6). `Run` registers with the host's
/// service manager; `NoService` always runs the same loop in the foreground.
/// This repo does not implement service-manager registration (spec.md §1
/// Non-goals exclude a user-facing service layer), so both verbs drive the
/// identical foreground loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Verb {
    Run,
    NoService,
    Inventory,
    #[value(alias = "guestpolicies", alias = "ospackage")]
    Policies,
    #[value(alias = "ospatch")]
    WaitForTaskNotification,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[yare::parameterized(
        guestpolicies = { "guestpolicies", Verb::Policies },
        ospackage     = { "ospackage", Verb::Policies },
        ospatch       = { "ospatch", Verb::WaitForTaskNotification },
        canonical_policies = { "policies", Verb::Policies },
        canonical_run      = { "run", Verb::Run },
    )]
    fn verb_aliases_parse_to_the_canonical_variant(spelling: &str, expected: Verb) {
        let cli = Cli::parse_from(["osconfig", spelling]);
        assert_eq!(cli.verb, expected);
    }

    #[test]
    fn debug_flag_overrides_explicit_log_level() {
        let cli = Cli::parse_from(["osconfig", "run", "--log-level", "warn", "--debug"]);
        assert_eq!(cli.effective_log_level(), "debug");
    }

    #[test]
    fn default_log_level_is_info() {
        let cli = Cli::parse_from(["osconfig", "run"]);
        assert_eq!(cli.effective_log_level(), "info");
    }

    #[test]
    fn unknown_verb_is_a_parse_error() {
        let result = Cli::try_parse_from(["osconfig", "not-a-verb"]);
        assert!(result.is_err());
    }

    #[test]
    fn command_definition_is_well_formed() {
        Cli::command().debug_assert();
    }
}
