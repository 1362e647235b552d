// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Create bundle: hooks around inserts.

use vigil_core::{Entity, EntitySet, Hook, MetaParams, Result, Values};

use crate::{
	dispatch::{run_atomic, singleton_set},
	ops::OpContext,
};

/// Instance-level save for a create-composing observer.
///
/// Whether this is a create is decided by the identity value before the
/// real mutation runs. Saving an already-stored entity is not a create:
/// it runs the raw save with no hooks and no extra transaction.
pub(crate) fn save_instance<E: Entity>(cx: &OpContext<'_, E>, entity: &mut E) -> Result<()> {
	if entity.id().is_some() {
		return cx.store.update_instance(entity);
	}
	run_atomic(cx.store, || watched_save(cx, entity))
}

fn watched_save<E: Entity>(cx: &OpContext<'_, E>, entity: &mut E) -> Result<()> {
	let pre_state = [entity.clone()];
	let meta = MetaParams::instance(Values::new(), entity.clone());
	cx.observer.pre_create(&pre_state, &meta)?;

	cx.store.insert(entity)?;

	let meta = MetaParams::instance(Values::new(), entity.clone());
	cx.observer.post_create(&singleton_set(cx.store, entity), &meta)?;
	Ok(())
}

/// Collection-level create.
pub(crate) fn create_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<E> {
	run_atomic(cx.store, || watched_create(cx, set, values))
}

/// The inner create sequence, also delegated to by the save bundle.
///
/// The real mutation is the handle's raw construct-and-insert primitive,
/// never the watched instance save, so create hooks cannot fire twice for
/// one collection-level create.
pub(crate) fn watched_create<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<E> {
	let meta = MetaParams::query(values.clone());
	if cx.observer.overridden().contains(Hook::PreCreate) {
		let unsaved = [E::from_values(values)?];
		cx.observer.pre_create(&unsaved, &meta)?;
	}

	let created = set.create(values)?;

	cx.observer.post_create(&singleton_set(cx.store, &created), &meta)?;
	Ok(created)
}
