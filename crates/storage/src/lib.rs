// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Storage layer for the OS Config agent: the recipe DB and the live
//! patch-run state file, both owned exclusively by the running agent
//! process (spec.md §3 Ownership) and written via temp-file-then-rename.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod atomic;
mod live_state;
mod recipe_db;

pub use atomic::write_atomic;
pub use live_state::{LiveState, LiveStateError, CURRENT_VERSION};
pub use recipe_db::{RecipeDb, RecipeDbError, DEFAULT_POSIX_PATH, DEFAULT_WINDOWS_PATH};
