// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Update bundle: hooks around in-place writes.

use vigil_core::{Entity, EntitySet, MetaParams, Result, Values};

use crate::{
	dispatch::{run_atomic, singleton_set},
	ops::OpContext,
};

/// Instance-level save for an update-composing observer.
///
/// Saving an unsaved entity is a create, not an update: it runs the raw
/// insert with no hooks and no extra transaction.
pub(crate) fn save_instance<E: Entity>(cx: &OpContext<'_, E>, entity: &mut E) -> Result<()> {
	if entity.id().is_none() {
		return cx.store.insert(entity);
	}
	run_atomic(cx.store, || watched_save(cx, entity))
}

fn watched_save<E: Entity>(cx: &OpContext<'_, E>, entity: &mut E) -> Result<()> {
	let set = singleton_set(cx.store, entity);
	let meta = MetaParams::instance(Values::new(), entity.clone());
	cx.observer.pre_update(&set, &meta)?;

	cx.store.update_instance(entity)?;

	cx.observer.post_update(&set, &meta)?;
	Ok(())
}

/// Collection-level update.
pub(crate) fn update_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<u64> {
	run_atomic(cx.store, || watched_update(cx, set, values))
}

/// The inner update sequence, also delegated to by the save bundle.
pub(crate) fn watched_update<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<u64> {
	let meta = MetaParams::query(values.clone());
	cx.observer.pre_update(set, &meta)?;

	let touched = set.update(values)?;

	cx.observer.post_update(set, &meta)?;
	Ok(touched)
}
