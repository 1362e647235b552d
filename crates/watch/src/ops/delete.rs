// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Delete bundle: hooks around removals.
//!
//! `post_delete` receives the affected instances materialized before the
//! deletion, the only way to still observe them. Materialization is
//! skipped entirely when the hook is not declared overridden, so bulk
//! deletes do not pay for a hook nobody listens to.

use vigil_core::{DeleteOutcome, Entity, EntitySet, Error, Hook, MetaParams, Result, Values};

use crate::{
	dispatch::{run_atomic, singleton_set},
	ops::OpContext,
};

pub(crate) fn delete_instance<E: Entity>(
	cx: &OpContext<'_, E>,
	entity: &mut E,
) -> Result<DeleteOutcome> {
	run_atomic(cx.store, || watched_delete_instance(cx, entity))
}

fn watched_delete_instance<E: Entity>(
	cx: &OpContext<'_, E>,
	entity: &mut E,
) -> Result<DeleteOutcome> {
	if entity.id().is_none() {
		return Err(Error::Unsaved {
			entity: E::NAME,
		});
	}
	let set = singleton_set(cx.store, entity);
	let meta = MetaParams::instance(Values::new(), entity.clone());
	cx.observer.pre_delete(&set, &meta)?;

	let instances = materialize_for_post_delete(cx, &set)?;
	let outcome = set.delete()?;
	entity.clear_id();

	let meta = MetaParams::instance(Values::new(), entity.clone());
	cx.observer.post_delete(&instances, &meta)?;
	Ok(outcome)
}

pub(crate) fn delete_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
) -> Result<DeleteOutcome> {
	run_atomic(cx.store, || watched_delete_set(cx, set))
}

fn watched_delete_set<E: Entity>(cx: &OpContext<'_, E>, set: &EntitySet<E>) -> Result<DeleteOutcome> {
	let meta = MetaParams::query(Values::new());
	cx.observer.pre_delete(set, &meta)?;

	let instances = materialize_for_post_delete(cx, set)?;
	let outcome = set.delete()?;

	cx.observer.post_delete(&instances, &meta)?;
	Ok(outcome)
}

fn materialize_for_post_delete<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
) -> Result<Vec<E>> {
	if cx.observer.overridden().contains(Hook::PostDelete) {
		set.fetch()
	} else {
		Ok(Vec::new())
	}
}
