// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! The type rewriter.
//!
//! Rewriting cannot mutate a Rust type in place; instead it synthesizes
//! wrapper types once, at registration time. [`Watched`] and [`WatchedSet`]
//! expose the original mutation method set, routed through the observer,
//! while the originals stay reachable under the `unwatched` alias. Each
//! registration gets its own wrappers, so interception on one entity type
//! never leaks into a sibling sharing the same store implementation.

use std::{
	fmt::{Debug, Formatter},
	sync::Arc,
};

use tracing::debug;
use vigil_core::{
	DeleteOutcome, Entity, EntityId, EntitySet, Error, Filter, Operation, OperationSet,
	QueryState, Result, SortKey, Values,
	store::EntityStore,
};

use crate::{
	dispatch::{self, Outcome, Target, WatchOptions},
	observer::Observer,
	ops::OpContext,
};

/// Name of the primary collection accessor.
pub const DEFAULT_ACCESSOR: &str = "default";

/// The unwatched entity surface: a store handle plus named collection
/// accessors. Custom accessors may carry pre-filtered query state.
pub struct Model<E: Entity> {
	store: Arc<dyn EntityStore<E>>,
	primary: EntitySet<E>,
	extra: Vec<(String, EntitySet<E>)>,
}

impl<E: Entity> Model<E> {
	pub fn new(store: Arc<dyn EntityStore<E>>) -> Self {
		let primary = EntitySet::new(Arc::clone(&store));
		Self {
			store,
			primary,
			extra: Vec::new(),
		}
	}

	/// Install a named accessor. `default` replaces the primary one.
	pub fn with_accessor(mut self, name: impl Into<String>, set: EntitySet<E>) -> Self {
		let name = name.into();
		if name == DEFAULT_ACCESSOR {
			self.primary = set;
		} else if let Some(slot) = self.extra.iter_mut().find(|(n, _)| *n == name) {
			slot.1 = set;
		} else {
			self.extra.push((name, set));
		}
		self
	}

	pub fn store(&self) -> &Arc<dyn EntityStore<E>> {
		&self.store
	}

	pub fn accessor(&self, name: &str) -> Option<&EntitySet<E>> {
		if name == DEFAULT_ACCESSOR {
			return Some(&self.primary);
		}
		self.extra.iter().find(|(n, _)| n == name).map(|(_, set)| set)
	}

	pub fn default_accessor(&self) -> &EntitySet<E> {
		&self.primary
	}

	pub fn accessor_names(&self) -> impl Iterator<Item = &str> {
		std::iter::once(DEFAULT_ACCESSOR).chain(self.extra.iter().map(|(n, _)| n.as_str()))
	}

	/// The original instance-level save: insert when unsaved, write back
	/// otherwise.
	pub fn save(&self, entity: &mut E) -> Result<()> {
		dispatch::raw_save(&self.store, entity)
	}

	/// The original instance-level delete.
	pub fn delete(&self, entity: &mut E) -> Result<DeleteOutcome> {
		dispatch::raw_delete_instance(&self.store, entity)
	}
}

impl<E: Entity> Debug for Model<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let names: Vec<&str> = self.accessor_names().collect();
		f.debug_struct("Model").field("entity", &E::NAME).field("accessors", &names).finish()
	}
}

/// A collection handle whose mutation methods run observer hooks.
///
/// Refinement methods return new watched handles; the wrapped original is
/// reachable via [`unwatched`](WatchedSet::unwatched). Operations outside
/// the intercepted set forward straight to the original.
pub struct WatchedSet<E: Entity> {
	unwatched: EntitySet<E>,
	observer: Arc<dyn Observer<E>>,
	operations: OperationSet,
}

impl<E: Entity> Clone for WatchedSet<E> {
	fn clone(&self) -> Self {
		Self {
			unwatched: self.unwatched.clone(),
			observer: Arc::clone(&self.observer),
			operations: self.operations,
		}
	}
}

impl<E: Entity> Debug for WatchedSet<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WatchedSet")
			.field("entity", &E::NAME)
			.field("operations", &self.operations)
			.field("state", self.unwatched.state())
			.finish()
	}
}

impl<E: Entity> WatchedSet<E> {
	pub(crate) fn new(
		unwatched: EntitySet<E>,
		observer: Arc<dyn Observer<E>>,
		operations: OperationSet,
	) -> Self {
		Self {
			unwatched,
			observer,
			operations,
		}
	}

	fn rewrap(&self, unwatched: EntitySet<E>) -> Self {
		Self {
			unwatched,
			observer: Arc::clone(&self.observer),
			operations: self.operations,
		}
	}

	fn cx(&self) -> OpContext<'_, E> {
		OpContext {
			observer: self.observer.as_ref(),
			store: self.unwatched.store(),
		}
	}

	/// The original handle, preserved under the reserved alias.
	pub fn unwatched(&self) -> &EntitySet<E> {
		&self.unwatched
	}

	pub fn state(&self) -> &QueryState {
		self.unwatched.state()
	}

	pub fn operations(&self) -> OperationSet {
		self.operations
	}

	// refinement

	pub fn filter(&self, filter: Filter) -> Self {
		self.rewrap(self.unwatched.filter(filter))
	}

	pub fn by_id(&self, id: EntityId) -> Self {
		self.rewrap(self.unwatched.by_id(id))
	}

	pub fn by_ids(&self, ids: Vec<EntityId>) -> Self {
		self.rewrap(self.unwatched.by_ids(ids))
	}

	pub fn order_by(&self, key: SortKey) -> Self {
		self.rewrap(self.unwatched.order_by(key))
	}

	pub fn limit(&self, limit: u64) -> Self {
		self.rewrap(self.unwatched.limit(limit))
	}

	pub fn selecting(&self, fields: Vec<String>) -> Self {
		self.rewrap(self.unwatched.selecting(fields))
	}

	pub fn prefetching(&self, lookup: impl Into<String>) -> Self {
		self.rewrap(self.unwatched.prefetching(lookup))
	}

	pub fn for_write(&self) -> Self {
		self.rewrap(self.unwatched.for_write())
	}

	// terminal reads forward unchanged

	pub fn fetch(&self) -> Result<Vec<E>> {
		self.unwatched.fetch()
	}

	pub fn first(&self) -> Result<Option<E>> {
		self.unwatched.first()
	}

	pub fn count(&self) -> Result<u64> {
		self.unwatched.count()
	}

	pub fn exists(&self) -> Result<bool> {
		self.unwatched.exists()
	}

	// watched mutations

	pub fn create(&self, values: &Values) -> Result<E> {
		self.create_with(values, WatchOptions::DEFAULT)
	}

	pub fn create_with(&self, values: &Values, options: WatchOptions) -> Result<E> {
		if !self.operations.contains(Operation::Create) {
			return self.unwatched.create(values);
		}
		dispatch::create_set(&self.cx(), &self.unwatched, values, options)
	}

	pub fn update(&self, values: &Values) -> Result<u64> {
		self.update_with(values, WatchOptions::DEFAULT)
	}

	pub fn update_with(&self, values: &Values, options: WatchOptions) -> Result<u64> {
		if !self.operations.contains(Operation::Update) {
			return self.unwatched.update(values);
		}
		dispatch::update_set(&self.cx(), &self.unwatched, values, options)
	}

	pub fn delete(&self) -> Result<DeleteOutcome> {
		self.delete_with(WatchOptions::DEFAULT)
	}

	pub fn delete_with(&self, options: WatchOptions) -> Result<DeleteOutcome> {
		if !self.operations.contains(Operation::Delete) {
			return self.unwatched.delete();
		}
		dispatch::delete_set(&self.cx(), &self.unwatched, options)
	}
}

/// The rewritten entity surface.
///
/// Holds the original [`Model`] under the `unwatched` alias, the observer,
/// the per-level operation sets, and the watched accessors. Immutable after
/// rewrite; built once per registration.
pub struct Watched<E: Entity> {
	unwatched: Model<E>,
	observer: Arc<dyn Observer<E>>,
	entity_operations: OperationSet,
	collection_operations: OperationSet,
	accessors: Vec<(String, WatchedSet<E>)>,
}

impl<E: Entity> Debug for Watched<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Watched")
			.field("entity", &E::NAME)
			.field("entity_operations", &self.entity_operations)
			.field("collection_operations", &self.collection_operations)
			.finish()
	}
}

impl<E: Entity> Watched<E> {
	/// The original model, preserved under the reserved alias.
	pub fn unwatched(&self) -> &Model<E> {
		&self.unwatched
	}

	pub fn observer(&self) -> &Arc<dyn Observer<E>> {
		&self.observer
	}

	pub fn entity_operations(&self) -> OperationSet {
		self.entity_operations
	}

	pub fn collection_operations(&self) -> OperationSet {
		self.collection_operations
	}

	/// A watched accessor by name; accessors that were not named at
	/// registration stay unwatched and live on [`unwatched`](Self::unwatched).
	pub fn accessor(&self, name: &str) -> Option<&WatchedSet<E>> {
		self.accessors.iter().find(|(n, _)| n == name).map(|(_, set)| set)
	}

	pub fn accessors(&self) -> impl Iterator<Item = (&str, &WatchedSet<E>)> {
		self.accessors.iter().map(|(name, set)| (name.as_str(), set))
	}

	fn cx(&self) -> OpContext<'_, E> {
		OpContext {
			observer: self.observer.as_ref(),
			store: self.unwatched.store(),
		}
	}

	// watched instance-level mutations

	pub fn save(&self, entity: &mut E) -> Result<()> {
		self.save_with(entity, WatchOptions::DEFAULT)
	}

	pub fn save_with(&self, entity: &mut E, options: WatchOptions) -> Result<()> {
		if !self.entity_operations.contains(Operation::Save) {
			return self.unwatched.save(entity);
		}
		dispatch::save_instance(&self.cx(), entity, options)
	}

	pub fn delete(&self, entity: &mut E) -> Result<DeleteOutcome> {
		self.delete_with(entity, WatchOptions::DEFAULT)
	}

	pub fn delete_with(&self, entity: &mut E, options: WatchOptions) -> Result<DeleteOutcome> {
		if !self.entity_operations.contains(Operation::Delete) {
			return self.unwatched.delete(entity);
		}
		dispatch::delete_instance(&self.cx(), entity, options)
	}

	/// The shared dispatch entry point used by every wrapper method.
	pub fn dispatch(
		&self,
		operation: Operation,
		target: Target<'_, E>,
		params: &Values,
		options: WatchOptions,
	) -> Result<Outcome<E>> {
		dispatch::run(self.observer.as_ref(), self.unwatched.store(), operation, target, params, options)
	}
}

/// Derive the entity-level operations to intercept from the observer's
/// capabilities. Create, update, and save all funnel through the one real
/// `save` method.
fn entity_operations_for(capabilities: OperationSet) -> OperationSet {
	let mut operations = OperationSet::EMPTY;
	if capabilities.contains(Operation::Create)
		|| capabilities.contains(Operation::Update)
		|| capabilities.contains(Operation::Save)
	{
		operations = operations.with(Operation::Save);
	}
	if capabilities.contains(Operation::Delete) {
		operations = operations.with(Operation::Delete);
	}
	operations
}

/// Derive the collection-level operations. The collection API has no
/// unified save verb, so save expands to create + update.
fn collection_operations_for(capabilities: OperationSet) -> OperationSet {
	let mut operations = OperationSet::EMPTY;
	if capabilities.contains(Operation::Create) || capabilities.contains(Operation::Save) {
		operations = operations.with(Operation::Create);
	}
	if capabilities.contains(Operation::Update) || capabilities.contains(Operation::Save) {
		operations = operations.with(Operation::Update);
	}
	if capabilities.contains(Operation::Delete) {
		operations = operations.with(Operation::Delete);
	}
	operations
}

/// Rewrite an entity type for interception.
///
/// Validates the registration (requested accessors exist; declared hook
/// overrides are reachable from the composed operations), then synthesizes
/// watched accessors by cloning each requested accessor's current handle.
/// The full query state survives, so pre-existing filter chains stay
/// intact.
pub fn rewrite<E: Entity>(
	model: Model<E>,
	observer: Arc<dyn Observer<E>>,
	accessor_names: Option<&[&str]>,
) -> Result<Watched<E>> {
	let capabilities = observer.capabilities();
	if capabilities.is_empty() {
		return Err(Error::EmptyCapabilities {
			entity: E::NAME,
		});
	}

	let unreachable = observer.overridden().difference(capabilities.implied_hooks());
	if !unreachable.is_empty() {
		return Err(Error::UnreachableHooks {
			entity: E::NAME,
			hooks: unreachable.iter().collect(),
		});
	}

	let entity_operations = entity_operations_for(capabilities);
	let collection_operations = collection_operations_for(capabilities);

	let requested: Vec<&str> = match accessor_names {
		Some(names) => names.to_vec(),
		None => vec![DEFAULT_ACCESSOR],
	};

	let mut accessors = Vec::with_capacity(requested.len());
	let mut missing = Vec::new();
	for name in &requested {
		match model.accessor(name) {
			Some(set) => accessors.push((
				(*name).to_string(),
				WatchedSet::new(set.clone(), Arc::clone(&observer), collection_operations),
			)),
			None => missing.push((*name).to_string()),
		}
	}
	if !missing.is_empty() {
		return Err(Error::MissingAccessors {
			entity: E::NAME,
			names: missing,
		});
	}

	debug!(
		entity = E::NAME,
		capabilities = %capabilities,
		entity_operations = %entity_operations,
		collection_operations = %collection_operations,
		"rewrote entity type for interception"
	);

	Ok(Watched {
		unwatched: model,
		observer,
		entity_operations,
		collection_operations,
		accessors,
	})
}
