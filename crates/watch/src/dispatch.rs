// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Operation dispatch: call-path detection, transactional wrapping, and
//! handler lookup.

use std::sync::Arc;

use tracing::{error, trace};
use vigil_core::{
	DeleteOutcome, Entity, EntitySet, Error, Operation, QueryState, Result, Values,
	store::EntityStore,
};

use crate::{
	observer::Observer,
	ops::{self, OpContext},
};

/// Per-call options on every watched mutation method.
///
/// `ignore_hooks` bypasses all hook logic, calling the aliased original
/// mutation directly; the flag itself is never forwarded to the real
/// mutation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct WatchOptions {
	pub ignore_hooks: bool,
}

impl WatchOptions {
	pub const DEFAULT: Self = Self {
		ignore_hooks: false,
	};

	pub const BYPASS: Self = Self {
		ignore_hooks: true,
	};
}

/// A mutation target: either a single entity instance or a collection
/// handle. Determines the call path hooks observe via
/// [`CallSource`](vigil_core::CallSource).
pub enum Target<'a, E: Entity> {
	Instance(&'a mut E),
	Set(&'a EntitySet<E>),
}

impl<'a, E: Entity> Target<'a, E> {
	/// Pure predicate distinguishing a collection handle from a single
	/// entity reference.
	pub fn is_collection(&self) -> bool {
		matches!(self, Target::Set(_))
	}

	/// Normalize into a collection handle: the handle itself, or a
	/// singleton handle filtered to exactly the instance. Side-effect
	/// free; an unsaved instance yields a handle matching nothing.
	pub fn to_set(&self, store: &Arc<dyn EntityStore<E>>) -> EntitySet<E> {
		match self {
			Target::Set(set) => (*set).clone(),
			Target::Instance(entity) => singleton_set(store, &**entity),
		}
	}
}

/// What a dispatched operation produced.
#[derive(Debug)]
pub enum Outcome<E: Entity> {
	Saved,
	Created(E),
	Updated(u64),
	Deleted(DeleteOutcome),
}

/// Handle filtered to exactly one instance (or to nothing, for an
/// unsaved instance).
pub(crate) fn singleton_set<E: Entity>(store: &Arc<dyn EntityStore<E>>, entity: &E) -> EntitySet<E> {
	let state = match entity.id() {
		Some(id) => QueryState::by_id(id),
		None => QueryState::new().filtered(vigil_core::Filter::IdIn(Vec::new())),
	};
	EntitySet::with_state(Arc::clone(store), state)
}

/// Execute `f` with guaranteed atomicity.
///
/// Participates in an already-open transaction (flattened, no savepoints);
/// otherwise opens one scoped to `f`. On `Err` the newly-opened transaction
/// rolls back entirely: partial hook effects and the underlying mutation
/// must not persist.
pub fn run_atomic<E, T>(store: &Arc<dyn EntityStore<E>>, f: impl FnOnce() -> Result<T>) -> Result<T>
where
	E: Entity,
{
	if store.in_transaction() {
		return f();
	}
	store.begin()?;
	match f() {
		Ok(value) => {
			store.commit()?;
			Ok(value)
		}
		Err(err) => {
			if let Err(rollback_err) = store.rollback() {
				error!(entity = E::NAME, %rollback_err, "rollback failed after aborted operation");
			}
			Err(err)
		}
	}
}

// aliased originals, reachable when hooks are bypassed or not intercepted

pub(crate) fn raw_save<E: Entity>(store: &Arc<dyn EntityStore<E>>, entity: &mut E) -> Result<()> {
	if entity.id().is_none() {
		store.insert(entity)
	} else {
		store.update_instance(entity)
	}
}

pub(crate) fn raw_delete_instance<E: Entity>(
	store: &Arc<dyn EntityStore<E>>,
	entity: &mut E,
) -> Result<DeleteOutcome> {
	let Some(id) = entity.id() else {
		return Err(Error::Unsaved {
			entity: E::NAME,
		});
	};
	let outcome = store.delete_where(&QueryState::by_id(id))?;
	entity.clear_id();
	Ok(outcome)
}

// per-(operation, call-path) handler lookup

pub(crate) fn save_instance<E: Entity>(
	cx: &OpContext<'_, E>,
	entity: &mut E,
	options: WatchOptions,
) -> Result<()> {
	if options.ignore_hooks {
		return raw_save(cx.store, entity);
	}
	let capabilities = cx.observer.capabilities();
	if capabilities.contains(Operation::Save) {
		ops::save::save_instance(cx, entity)
	} else if capabilities.contains(Operation::Create) && capabilities.contains(Operation::Update) {
		if entity.id().is_none() {
			ops::create::save_instance(cx, entity)
		} else {
			ops::update::save_instance(cx, entity)
		}
	} else if capabilities.contains(Operation::Create) {
		ops::create::save_instance(cx, entity)
	} else if capabilities.contains(Operation::Update) {
		ops::update::save_instance(cx, entity)
	} else {
		Err(Error::UnhandledOperation {
			operation: Operation::Save,
		})
	}
}

pub(crate) fn delete_instance<E: Entity>(
	cx: &OpContext<'_, E>,
	entity: &mut E,
	options: WatchOptions,
) -> Result<DeleteOutcome> {
	if options.ignore_hooks {
		return raw_delete_instance(cx.store, entity);
	}
	if !cx.observer.capabilities().contains(Operation::Delete) {
		return Err(Error::UnhandledOperation {
			operation: Operation::Delete,
		});
	}
	ops::delete::delete_instance(cx, entity)
}

pub(crate) fn create_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
	options: WatchOptions,
) -> Result<E> {
	if options.ignore_hooks {
		return set.create(values);
	}
	let capabilities = cx.observer.capabilities();
	if capabilities.contains(Operation::Save) {
		ops::save::create_set(cx, set, values)
	} else if capabilities.contains(Operation::Create) {
		ops::create::create_set(cx, set, values)
	} else {
		Err(Error::UnhandledOperation {
			operation: Operation::Create,
		})
	}
}

pub(crate) fn update_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	values: &Values,
	options: WatchOptions,
) -> Result<u64> {
	if options.ignore_hooks {
		return set.update(values);
	}
	let capabilities = cx.observer.capabilities();
	if capabilities.contains(Operation::Save) {
		ops::save::update_set(cx, set, values)
	} else if capabilities.contains(Operation::Update) {
		ops::update::update_set(cx, set, values)
	} else {
		Err(Error::UnhandledOperation {
			operation: Operation::Update,
		})
	}
}

pub(crate) fn delete_set<E: Entity>(
	cx: &OpContext<'_, E>,
	set: &EntitySet<E>,
	options: WatchOptions,
) -> Result<DeleteOutcome> {
	if options.ignore_hooks {
		return set.delete();
	}
	if !cx.observer.capabilities().contains(Operation::Delete) {
		return Err(Error::UnhandledOperation {
			operation: Operation::Delete,
		});
	}
	ops::delete::delete_set(cx, set)
}

/// The dispatch entry point behind every watched wrapper method.
///
/// Routes to the per-(operation, call-path) handler of the observer's
/// composed bundles; an operation with no backing handler is a
/// configuration error and indicates a mismatched rewrite.
pub fn run<E: Entity>(
	observer: &dyn Observer<E>,
	store: &Arc<dyn EntityStore<E>>,
	operation: Operation,
	target: Target<'_, E>,
	params: &Values,
	options: WatchOptions,
) -> Result<Outcome<E>> {
	trace!(
		entity = E::NAME,
		operation = %operation,
		collection = target.is_collection(),
		ignore_hooks = options.ignore_hooks,
		"dispatching watched operation"
	);
	let cx = OpContext {
		observer,
		store,
	};
	match (operation, target) {
		(Operation::Save, Target::Instance(entity)) => {
			save_instance(&cx, entity, options)?;
			Ok(Outcome::Saved)
		}
		(Operation::Delete, Target::Instance(entity)) => {
			Ok(Outcome::Deleted(delete_instance(&cx, entity, options)?))
		}
		(Operation::Create, Target::Set(set)) => {
			Ok(Outcome::Created(create_set(&cx, set, params, options)?))
		}
		(Operation::Update, Target::Set(set)) => {
			Ok(Outcome::Updated(update_set(&cx, set, params, options)?))
		}
		(Operation::Delete, Target::Set(set)) => {
			Ok(Outcome::Deleted(delete_set(&cx, set, options)?))
		}
		(operation, _) => Err(Error::UnhandledOperation {
			operation,
		}),
	}
}
