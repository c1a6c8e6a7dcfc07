// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution primitive shared by the recipe installer's
//! `FileExec`/`ScriptRun` steps (spec.md §4.3) and the package adapters
//! (spec.md §6) that shell out to `dpkg`, `apt-get`, `yum`, `zypper`, and
//! `googet`.
//!
//! Every invocation is local to its own environment map — spec.md §5 is
//! explicit that a subprocess's environment never mutates the agent's own.
//! Cancellation never interrupts a running subprocess once started (spec.md
//! §5): reboots and package managers must not be half-killed.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn { program: String, #[source] source: std::io::Error },
    #[error("failed to wait on {program}: {source}")]
    Wait { program: String, #[source] source: std::io::Error },
    #[error("{program} exited with code {code} (allowed: {allowed:?})")]
    DisallowedExitCode { program: String, code: i32, allowed: Vec<i32> },
    #[error("{program} terminated by signal, no exit code available")]
    NoExitCode { program: String },
}

/// A subprocess invocation spec: program, args, a local environment
/// overlay, and an optional working directory.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new(), env: HashMap::new(), cwd: None }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecOutput {
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run a subprocess to completion, capturing stdout/stderr. The agent's own
/// environment is inherited as a base; `spec.env` entries overlay it and are
/// visible only to this child.
pub async fn run(spec: &CommandSpec) -> Result<ExecOutput, ExecError> {
    let program_name = spec.program.display().to_string();
    tracing::debug!(program = %program_name, args = ?spec.args, "spawning subprocess");
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args).envs(&spec.env).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let mut child =
        cmd.spawn().map_err(|source| ExecError::Spawn { program: program_name.clone(), source })?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_end(&mut stdout).await.ok();
    }
    if let Some(mut err) = child.stderr.take() {
        err.read_to_end(&mut stderr).await.ok();
    }

    let status = child
        .wait()
        .await
        .map_err(|source| ExecError::Wait { program: program_name.clone(), source })?;

    let exit_code = status.code().ok_or_else(|| ExecError::NoExitCode { program: program_name.clone() })?;
    tracing::debug!(program = %program_name, exit_code, "subprocess finished");
    Ok(ExecOutput { exit_code, stdout, stderr })
}

/// Run a subprocess and enforce the allowed-exit-code contract shared by
/// `FileExec`, `ScriptRun`, and the package installation steps (spec.md
/// §4.3): success is exit code 0 or any code in `allowed`.
pub async fn run_checked(spec: &CommandSpec, allowed: &HashSet<i32>) -> Result<ExecOutput, ExecError> {
    let output = run(spec).await?;
    if output.exit_code == 0 || allowed.contains(&output.exit_code) {
        Ok(output)
    } else {
        let program = spec.program.display().to_string();
        let mut codes: Vec<i32> = allowed.iter().copied().collect();
        codes.sort_unstable();
        Err(ExecError::DisallowedExitCode { program, code: output.exit_code, allowed: codes })
    }
}

/// Write a script body to `path`, setting it executable (mode 0755 on Unix).
pub async fn write_executable_script(path: &Path, body: &str) -> std::io::Result<()> {
    tokio::fs::write(path, body).await?;
    set_executable(path).await
}

#[cfg(unix)]
pub async fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)))
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
}

#[cfg(not(unix))]
pub async fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let spec = CommandSpec::new("/bin/echo").arg("hello");
        let out = run(&spec).await.unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout_string().trim(), "hello");
    }

    #[tokio::test]
    async fn env_overlay_is_visible_to_child_only() {
        let spec = CommandSpec::new("/bin/sh").arg("-c").arg("echo $FOO").env("FOO", "bar");
        let out = run(&spec).await.unwrap();
        assert_eq!(out.stdout_string().trim(), "bar");
        assert!(std::env::var("FOO").is_err());
    }

    #[tokio::test]
    async fn disallowed_exit_code_is_an_error() {
        let spec = CommandSpec::new("/bin/sh").arg("-c").arg("exit 7");
        let err = run_checked(&spec, &HashSet::new()).await.unwrap_err();
        assert!(matches!(err, ExecError::DisallowedExitCode { code: 7, .. }));
    }

    #[tokio::test]
    async fn allowed_exit_code_set_permits_nonzero() {
        let spec = CommandSpec::new("/bin/sh").arg("-c").arg("exit 3");
        let allowed: HashSet<i32> = [3].into_iter().collect();
        let out = run_checked(&spec, &allowed).await.unwrap();
        assert_eq!(out.exit_code, 3);
    }

    #[tokio::test]
    async fn write_executable_script_sets_exec_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        write_executable_script(&path, "#!/bin/sh\necho hi\n").await.unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
