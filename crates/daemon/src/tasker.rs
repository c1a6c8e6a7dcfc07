// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide single-consumer task queue (spec.md §4.1): patching, policy
//! application, and inventory all mutate host state and must not interleave.
//! One dedicated consumer task drains an mpsc channel of named thunks;
//! `enqueue` waits for an acceptance acknowledgement, `close` drains and
//! joins the consumer.

use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

type Thunk = Box<dyn FnOnce() + Send>;

struct QueueItem {
    name: String,
    thunk: Thunk,
    accepted: oneshot::Sender<()>,
}

/// A single-consumer, multi-producer task queue (spec.md §8 law 1: FIFO
/// acceptance order; law 2: drain count equals accepted count).
pub struct Tasker {
    sender: Option<mpsc::UnboundedSender<QueueItem>>,
    worker: Option<JoinHandle<()>>,
}

impl Tasker {
    pub fn spawn() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<QueueItem>();
        let worker = tokio::task::spawn_blocking(move || {
            while let Some(item) = receiver.blocking_recv() {
                let _ = item.accepted.send(());
                run_isolated(&item.name, item.thunk);
            }
        });
        Self { sender: Some(sender), worker: Some(worker) }
    }

    /// Append a named unit of work. Returns once the consumer has accepted
    /// it (not once it has run). Errors if the queue has been closed.
    pub async fn enqueue(&self, name: impl Into<String>, thunk: impl FnOnce() + Send + 'static) -> Result<(), QueueClosed> {
        let (accepted_tx, accepted_rx) = oneshot::channel();
        let item = QueueItem { name: name.into(), thunk: Box::new(thunk), accepted: accepted_tx };
        self.sender.as_ref().ok_or(QueueClosed)?.send(item).map_err(|_| QueueClosed)?;
        accepted_rx.await.map_err(|_| QueueClosed)
    }

    /// Append a unit of work without waiting for the acceptance ack. For
    /// callers that are themselves synchronous (a poll-loop tick callback)
    /// and only care that the item was handed off, not when it lands.
    pub fn enqueue_detached(&self, name: impl Into<String>, thunk: impl FnOnce() + Send + 'static) -> Result<(), QueueClosed> {
        let (accepted_tx, _accepted_rx) = oneshot::channel();
        let item = QueueItem { name: name.into(), thunk: Box::new(thunk), accepted: accepted_tx };
        self.sender.as_ref().ok_or(QueueClosed)?.send(item).map_err(|_| QueueClosed)
    }

    /// Stop accepting new work and wait until every accepted thunk has run.
    pub async fn close(mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }
}

fn run_isolated(name: &str, thunk: Thunk) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(thunk));
    if let Err(payload) = result {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(task = name, panic = %message, "task queue item panicked, continuing");
    }
}

#[derive(Debug, thiserror::Error)]
#[error("task queue is closed")]
pub struct QueueClosed;
