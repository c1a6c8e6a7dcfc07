// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire DTOs for the control-plane RPC surface (spec.md §6): the
//! notification long-poll, patch progress/completion reporting, and recipe
//! lookup responses. These are the on-the-wire JSON shapes; the abstract
//! `ControlPlaneClient` contract the patch runner programs against lives in
//! `osconfig-adapters`.

mod notification;
mod progress;
mod recipe_lookup;

pub use notification::{Notification, NotificationPoll, NotificationPollResponse};
pub use progress::{ProgressReportRequest, ProgressReportResponse, TaskCompleteRequest, WireTaskDirective};
pub use recipe_lookup::{RecipeLookupRequest, RecipeLookupResponse};
