// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! External collaborators consumed by the agent core (spec.md §6): package
//! manager adapters, reboot probes, the `PlatformOps` capability, the
//! control-plane RPC client, the attributes sink, and artifact fetchers.
//!
//! Everything in this crate is out of scope for the core's own tests —
//! the core depends on the traits here, never the concrete
//! subprocess/HTTP-backed implementations, so it can be exercised against
//! fakes.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod control_plane;
pub mod error;
pub mod fetch;
pub mod package;
pub mod platform;
pub mod reboot;
pub mod sink;

pub use control_plane::{ControlPlaneClient, ControlPlaneError, Progress, TaskDirective};
pub use error::{AdapterError, FetchError, RpcError, RpcStatusCode, SinkError};
pub use fetch::{ArtifactFetcher, FetcherRegistry, GcsFetcher, HttpFetcher};
pub use package::{AptAdapter, GoogetAdapter, PackageAdapter, RpmAdapter, UpdateQueryOptions, YumAdapter};
pub use package::{ZypperAdapter, ZypperPatchQuery};
pub use platform::{current as current_platform, LinuxPlatform, PlatformOps, WindowsPlatform};
pub use reboot::{LinuxRebootProbe, RebootProbe, WindowsRebootProbe};
pub use sink::{AttributesSink, HttpAttributesSink};

#[cfg(feature = "test-support")]
pub use control_plane::FakeControlPlaneClient;
#[cfg(feature = "test-support")]
pub use sink::FakeAttributesSink;
