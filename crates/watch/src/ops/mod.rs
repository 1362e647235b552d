// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! The four composable operation bundles.
//!
//! Each module implements the fixed pre → mutate → post sequence for one
//! operation family, per call path. `save` composes `create` and `update`
//! by explicit delegation into their inner sequences.

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod save;
pub(crate) mod update;

use std::sync::Arc;

use vigil_core::{Entity, store::EntityStore};

use crate::observer::Observer;

/// Everything a handler needs for one dispatched operation.
pub(crate) struct OpContext<'a, E: Entity> {
	pub observer: &'a dyn Observer<E>,
	pub store: &'a Arc<dyn EntityStore<E>>,
}
