// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::StepError;
use osconfig_core::StepInterpreter;
use osconfig_exec::CommandSpec;
use std::collections::HashSet;
use std::path::Path;

/// `FileExec` (spec.md §4.3): `path` is already resolved (artifact-id or
/// explicit path, resolved by the caller against the run's artifact map).
pub async fn run_file(path: &Path, args: &[String], allowed_exit_codes: &HashSet<i32>) -> Result<(), StepError> {
    osconfig_exec::set_executable(path).await?;
    let spec = CommandSpec::new(path).args(args.to_vec());
    osconfig_exec::run_checked(&spec, allowed_exit_codes).await?;
    Ok(())
}

/// `ScriptRun` (spec.md §4.3): write the script body to `step_dir`, set it
/// executable, and invoke it per `interpreter`. `Powershell` is Windows-only.
pub async fn run_script(
    step_dir: &Path,
    body: &str,
    interpreter: StepInterpreter,
    args: &[String],
    allowed_exit_codes: &HashSet<i32>,
) -> Result<(), StepError> {
    let extension = match interpreter {
        StepInterpreter::Powershell => "ps1",
        #[cfg(windows)]
        StepInterpreter::Shell => "bat",
        _ => "sh",
    };
    let script_path = step_dir.join(format!("recipe_script_source.{extension}"));
    osconfig_exec::write_executable_script(&script_path, body).await?;

    let spec = match interpreter {
        StepInterpreter::Powershell => {
            if !cfg!(windows) {
                return Err(StepError::PlatformMismatch {
                    step: "ScriptRun",
                    detail: "powershell interpreter requested on a non-Windows host".to_string(),
                });
            }
            CommandSpec::new("powershell").arg("-File").arg(script_path.display().to_string())
        }
        StepInterpreter::Shell => {
            if cfg!(windows) {
                CommandSpec::new("cmd").arg("/c").arg(script_path.display().to_string())
            } else {
                CommandSpec::new("/bin/sh").arg("-c").arg(script_path.display().to_string())
            }
        }
        StepInterpreter::Unspecified => CommandSpec::new(&script_path),
    }
    .args(args.to_vec());

    osconfig_exec::run_checked(&spec, allowed_exit_codes).await?;
    Ok(())
}
