// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Test infrastructure: a real in-memory engine with snapshot
//! transactions, a fixture entity, and a recording observer.
//!
//! Everything here is test tooling. The recording observer's mutable
//! arming (`fail_on`) is explicitly outside the production observer
//! contract, which is stateless at the call level.

pub mod fixtures;
pub mod recorder;
pub mod store;

pub use fixtures::Item;
pub use recorder::{RecordedCall, RecordedTarget, RecordingObserver};
pub use store::MemoryStore;
