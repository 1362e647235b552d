// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! The collection handle: a lazily-evaluated, filterable reference to
//! zero or more entities of one type.

use std::{
	fmt::{Debug, Formatter},
	sync::Arc,
};

use crate::{
	Result,
	entity::{Entity, EntityId},
	query::{Filter, QueryState, SortKey},
	store::{DeleteOutcome, EntityStore},
	value::Values,
};

/// A filterable handle over one entity type.
///
/// Refinement (`filter`, `order_by`, `limit`, …) produces a new handle;
/// nothing touches the store until a terminal call. These are the
/// *unwatched* originals, the methods the rewriter preserves under its
/// reserved alias.
pub struct EntitySet<E: Entity> {
	store: Arc<dyn EntityStore<E>>,
	state: QueryState,
}

impl<E: Entity> Clone for EntitySet<E> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			state: self.state.clone(),
		}
	}
}

impl<E: Entity> Debug for EntitySet<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EntitySet").field("entity", &E::NAME).field("state", &self.state).finish()
	}
}

impl<E: Entity> EntitySet<E> {
	pub fn new(store: Arc<dyn EntityStore<E>>) -> Self {
		Self {
			store,
			state: QueryState::new(),
		}
	}

	pub fn with_state(store: Arc<dyn EntityStore<E>>, state: QueryState) -> Self {
		Self {
			store,
			state,
		}
	}

	pub fn store(&self) -> &Arc<dyn EntityStore<E>> {
		&self.store
	}

	pub fn state(&self) -> &QueryState {
		&self.state
	}

	// refinement

	pub fn filter(&self, filter: Filter) -> Self {
		Self {
			store: Arc::clone(&self.store),
			state: self.state.clone().filtered(filter),
		}
	}

	pub fn by_id(&self, id: EntityId) -> Self {
		self.filter(Filter::IdEq(id))
	}

	pub fn by_ids(&self, ids: Vec<EntityId>) -> Self {
		self.filter(Filter::IdIn(ids))
	}

	pub fn order_by(&self, key: SortKey) -> Self {
		Self {
			store: Arc::clone(&self.store),
			state: self.state.clone().ordered(key),
		}
	}

	pub fn limit(&self, limit: u64) -> Self {
		Self {
			store: Arc::clone(&self.store),
			state: self.state.clone().limited(limit),
		}
	}

	pub fn selecting(&self, fields: Vec<String>) -> Self {
		Self {
			store: Arc::clone(&self.store),
			state: self.state.clone().selecting(fields),
		}
	}

	pub fn prefetching(&self, lookup: impl Into<String>) -> Self {
		Self {
			store: Arc::clone(&self.store),
			state: self.state.clone().prefetching(lookup),
		}
	}

	pub fn for_write(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			state: self.state.clone().for_write(),
		}
	}

	// terminal reads

	pub fn fetch(&self) -> Result<Vec<E>> {
		self.store.fetch(&self.state)
	}

	pub fn first(&self) -> Result<Option<E>> {
		Ok(self.store.fetch(&self.state.clone().limited(1))?.into_iter().next())
	}

	pub fn count(&self) -> Result<u64> {
		self.store.count(&self.state)
	}

	pub fn exists(&self) -> Result<bool> {
		Ok(self.count()? > 0)
	}

	// terminal mutations (the unwatched originals)

	/// Construct an instance from the assignments and insert it raw.
	/// This is the primitive the rewriter aliases for collection-level
	/// create: it never routes through an instance-level save wrapper.
	pub fn create(&self, values: &Values) -> Result<E> {
		let mut entity = E::from_values(values)?;
		self.store.insert(&mut entity)?;
		Ok(entity)
	}

	/// Apply the assignments to every matching entity.
	pub fn update(&self, values: &Values) -> Result<u64> {
		self.store.update_where(&self.state, values)
	}

	/// Delete every matching entity.
	pub fn delete(&self) -> Result<DeleteOutcome> {
		self.store.delete_where(&self.state)
	}
}
