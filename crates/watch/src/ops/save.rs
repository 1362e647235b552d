// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Save bundle: the composition of create and update.
//!
//! The save hooks wrap whichever inner sequence the call resolves to. On
//! the entity level the branch is decided by the identity value before the
//! real save runs; on the collection level there is no unified save verb,
//! so `create` and `update` each get wrapped. Delegation into the create
//! and update bundles is explicit; the inner sequences run exactly once.

use vigil_core::{Entity, EntitySet, MetaParams, Result, Values};

use crate::{
	dispatch::{run_atomic, singleton_set},
	observer::Affected,
	ops::{OpContext, create, update},
};

pub(crate) fn save_instance<E: Entity>(cx: &OpContext<'_, E>, entity: &mut E) -> Result<()> {
	run_atomic(cx.store, || watched_save(cx, entity))
}

fn watched_save<E: Entity>(cx: &OpContext<'_, E>, entity: &mut E) -> Result<()> {
	let creating = entity.id().is_none();
	if creating {
		let pre_state = [entity.clone()];
		let meta = MetaParams::instance(Values::new(), entity.clone());
		cx.observer.pre_save(Affected::Instances(&pre_state), &meta)?;
		cx.observer.pre_create(&pre_state, &meta)?;

		cx.store.insert(entity)?;

		let set = singleton_set(cx.store, entity);
		let meta = MetaParams::instance(Values::new(), entity.clone());
		cx.observer.post_create(&set, &meta)?;
		cx.observer.post_save(&set, &meta)?;
	} else {
		let set = singleton_set(cx.store, entity);
		let meta = MetaParams::instance(Values::new(), entity.clone());
		cx.observer.pre_save(Affected::Set(&set), &meta)?;
		cx.observer.pre_update(&set, &meta)?;

		cx.store.update_instance(entity)?;

		cx.observer.post_update(&set, &meta)?;
		cx.observer.post_save(&set, &meta)?;
	}
	Ok(())
}

pub(crate) fn create_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<E> {
	run_atomic(cx.store, || watched_create(cx, set, values))
}

fn watched_create<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<E> {
	let meta = MetaParams::query(values.clone());
	let pre_state = [E::from_values(values)?];
	cx.observer.pre_save(Affected::Instances(&pre_state), &meta)?;

	let created = create::watched_create(cx, set, values)?;

	cx.observer.post_save(&singleton_set(cx.store, &created), &meta)?;
	Ok(created)
}

pub(crate) fn update_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<u64> {
	run_atomic(cx.store, || watched_update(cx, set, values))
}

fn watched_update<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
) -> Result<u64> {
	let meta = MetaParams::query(values.clone());
	cx.observer.pre_save(Affected::Set(set), &meta)?;

	let touched = update::watched_update(cx, set, values)?;

	cx.observer.post_save(set, &meta)?;
	Ok(touched)
}
