// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `osconfig waitfortasknotification` (spec.md §6): long-poll once, then
//! drive any patch job the notification names. Brand-new jobs this
//! instance has never seen need a job-detail fetch this repo's wire
//! surface doesn't define (only `RecipeLookupResponse` and progress
//! reporting are specified) — those notifications are logged and skipped;
//! resuming an already-acked job (spec.md §8 "Patch resumption") works
//! fully from the persisted live state.

use super::AgentContext;
use anyhow::{anyhow, Context, Result};
use osconfig_adapters::fetch::FetcherRegistry;
use osconfig_core::{Clock, JobId, SystemClock};
use osconfig_daemon::PatchRunner;
use osconfig_storage::LiveState;
use osconfig_wire::Notification;
use std::sync::Arc;

const WAIT_SECONDS: u32 = 60;

pub async fn run(ctx: &AgentContext) -> Result<()> {
    let Some(base_url) = ctx.config.control_plane_url.as_deref() else {
        tracing::warn!("no control plane configured (OSCONFIG_CONTROL_PLANE_URL unset), nothing to wait for");
        return Ok(());
    };
    let instance_id = ctx
        .config
        .instance_id
        .clone()
        .ok_or_else(|| anyhow!("OSCONFIG_INSTANCE_ID must be set to poll for notifications"))?;
    let Some(control_plane) = ctx.control_plane_client() else {
        return Err(anyhow!("control plane URL set but client construction failed"));
    };

    let notifications = crate::notification_source::poll_once(&ctx.http_client, base_url, &instance_id, WAIT_SECONDS)
        .await
        .context("notification poll failed")?;

    if notifications.is_empty() {
        tracing::debug!("notification poll returned no work");
        return Ok(());
    }

    let mut live_state = LiveState::load(ctx.live_state_path()).context("loading live state")?;
    let fetchers = Arc::new(FetcherRegistry::default_set());
    let runner = PatchRunner::new(control_plane, ctx.platform.clone(), ctx.package_adapters.clone(), fetchers);
    let clock = SystemClock;

    for notification in notifications {
        match notification {
            Notification::PatchJob { job_id } => {
                handle_patch_job(&runner, &mut live_state, JobId::from(job_id.as_str()), clock.unix_seconds()).await?
            }
            Notification::PolicyUpdate => {
                tracing::info!("policy-update notification received, running policy convergence");
                super::policies::run(ctx).await?;
            }
        }
    }
    Ok(())
}

async fn handle_patch_job(
    runner: &PatchRunner,
    live_state: &mut LiveState,
    job_id: JobId,
    now: i64,
) -> Result<()> {
    let Some(job) = live_state.get(&job_id).map(|run| run.job.clone()) else {
        tracing::warn!(%job_id, "notification for an unrecognized patch job, no local job detail to resume from");
        return Ok(());
    };
    let outcome = runner.run(live_state, job, now).await.context("patch run failed")?;
    tracing::info!(%job_id, ?outcome, "patch job step complete");
    if matches!(outcome, osconfig_daemon::RunOutcome::RebootIssued) {
        std::future::pending::<()>().await;
    }
    Ok(())
}
