// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `osconfig run` / `osconfig noservice` (spec.md §4.7, §6): acquire the
//! singleton lock, start the task queue, and drive the poll loop until
//! cancelled or a restart marker appears. Both verbs share this path —
//! `noservice` differs only in that its caller is expected to run it in the
//! foreground under a supervisor (systemd `Type=simple`, a Windows service
//! wrapper, ...) rather than backgrounding itself.

use super::AgentContext;
use anyhow::{Context, Result};
use osconfig_daemon::supervisor::{run_poll_loop, SingletonLock};
use osconfig_daemon::tasker::Tasker;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub async fn run(ctx: AgentContext) -> Result<()> {
    let lock = SingletonLock::acquire(ctx.lock_path()).context("acquiring singleton lock")?;
    let ctx = Arc::new(ctx);
    let tasker = Tasker::spawn();
    let cancel = CancellationToken::new();

    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received interrupt, beginning shutdown");
            cancel.cancel();
        }
    });

    let config = ctx.config.clone();
    let restart_marker = ctx.restart_marker_path();
    run_poll_loop(config, ctx.config_path.clone(), restart_marker, cancel, |actions| {
        if actions.enqueue_inventory {
            let ctx = ctx.clone();
            let handle = tokio::runtime::Handle::current();
            if let Err(err) = tasker.enqueue_detached("inventory", move || {
                if let Err(err) = handle.block_on(super::inventory::run(&ctx)) {
                    tracing::error!(%err, "inventory tick failed");
                }
            }) {
                tracing::warn!(%err, "failed to enqueue inventory tick");
            }
        }
        if actions.enqueue_policies {
            let ctx = ctx.clone();
            let handle = tokio::runtime::Handle::current();
            if let Err(err) = tasker.enqueue_detached("policies", move || {
                if let Err(err) = handle.block_on(super::policies::run(&ctx)) {
                    tracing::error!(%err, "policy convergence tick failed");
                }
            }) {
                tracing::warn!(%err, "failed to enqueue policy tick");
            }
        }
    })
    .await;

    tasker.close().await;
    signal_task.abort();
    drop(lock);
    Ok(())
}
