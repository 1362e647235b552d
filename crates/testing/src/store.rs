// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! BTreeMap-backed store with snapshot transactions.

use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;
use tracing::trace;
use vigil_core::{
	DeleteOutcome, Entity, EntityId, Error, QueryState, Result, SortDir, Values,
	store::EntityStore,
};

/// An in-memory engine for one entity type.
///
/// `begin` snapshots the full state; `rollback` restores it, `commit`
/// discards it. Nesting is the caller's concern: the watch layer
/// participates in an open transaction instead of beginning another, so
/// the snapshot stack stays one deep in practice.
pub struct MemoryStore<E: Entity> {
	inner: Mutex<Inner<E>>,
}

struct Inner<E> {
	rows: BTreeMap<EntityId, E>,
	next_id: u64,
	snapshots: Vec<Snapshot<E>>,
}

struct Snapshot<E> {
	rows: BTreeMap<EntityId, E>,
	next_id: u64,
}

impl<E: Entity> Default for MemoryStore<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: Entity> MemoryStore<E> {
	pub fn new() -> Self {
		Self {
			inner: Mutex::new(Inner {
				rows: BTreeMap::new(),
				next_id: 1,
				snapshots: Vec::new(),
			}),
		}
	}

	pub fn shared() -> Arc<Self> {
		Arc::new(Self::new())
	}

	/// Seed rows directly, bypassing the store contract. Assigns ids.
	pub fn seed(&self, entities: impl IntoIterator<Item = E>) -> Vec<E> {
		let mut inner = self.inner.lock();
		let mut seeded = Vec::new();
		for mut entity in entities {
			let id = EntityId(inner.next_id);
			inner.next_id += 1;
			entity.assign_id(id);
			inner.rows.insert(id, entity.clone());
			seeded.push(entity);
		}
		seeded
	}

	fn matching(inner: &Inner<E>, state: &QueryState) -> Vec<E> {
		let mut rows: Vec<E> =
			inner.rows.values().filter(|row| state.filter.matches(*row)).cloned().collect();
		if !state.order.is_empty() {
			rows.sort_by(|a, b| {
				for key in &state.order {
					let ord = match (a.value_of(&key.field), b.value_of(&key.field)) {
						(Some(l), Some(r)) => l.compare(&r).unwrap_or(Ordering::Equal),
						_ => Ordering::Equal,
					};
					let ord = match key.dir {
						SortDir::Asc => ord,
						SortDir::Desc => ord.reverse(),
					};
					if ord != Ordering::Equal {
						return ord;
					}
				}
				Ordering::Equal
			});
		}
		if let Some(limit) = state.limit {
			rows.truncate(limit as usize);
		}
		rows
	}
}

impl<E: Entity> EntityStore<E> for MemoryStore<E> {
	fn insert(&self, entity: &mut E) -> Result<()> {
		let mut inner = self.inner.lock();
		let id = match entity.id() {
			Some(id) => {
				if inner.rows.contains_key(&id) {
					return Err(Error::store(format!(
						"{} with id {} already exists",
						E::NAME,
						id
					)));
				}
				id
			}
			None => {
				let id = EntityId(inner.next_id);
				inner.next_id += 1;
				entity.assign_id(id);
				id
			}
		};
		inner.rows.insert(id, entity.clone());
		Ok(())
	}

	fn update_instance(&self, entity: &E) -> Result<()> {
		let Some(id) = entity.id() else {
			return Err(Error::Unsaved {
				entity: E::NAME,
			});
		};
		let mut inner = self.inner.lock();
		if !inner.rows.contains_key(&id) {
			return Err(Error::NotFound {
				entity: E::NAME,
				id,
			});
		}
		inner.rows.insert(id, entity.clone());
		Ok(())
	}

	fn update_where(&self, state: &QueryState, values: &Values) -> Result<u64> {
		let mut inner = self.inner.lock();
		let ids: Vec<EntityId> = inner
			.rows
			.iter()
			.filter(|(_, row)| state.filter.matches(*row))
			.map(|(id, _)| *id)
			.collect();
		for id in &ids {
			if let Some(row) = inner.rows.get_mut(id) {
				row.apply(values)?;
			}
		}
		Ok(ids.len() as u64)
	}

	fn delete_where(&self, state: &QueryState) -> Result<DeleteOutcome> {
		let mut inner = self.inner.lock();
		let ids: Vec<EntityId> = inner
			.rows
			.iter()
			.filter(|(_, row)| state.filter.matches(*row))
			.map(|(id, _)| *id)
			.collect();
		for id in &ids {
			inner.rows.remove(id);
		}
		Ok(DeleteOutcome::single(E::NAME, ids.len() as u64))
	}

	fn fetch(&self, state: &QueryState) -> Result<Vec<E>> {
		let inner = self.inner.lock();
		Ok(Self::matching(&inner, state))
	}

	fn count(&self, state: &QueryState) -> Result<u64> {
		let inner = self.inner.lock();
		Ok(Self::matching(&inner, state).len() as u64)
	}

	fn in_transaction(&self) -> bool {
		!self.inner.lock().snapshots.is_empty()
	}

	fn begin(&self) -> Result<()> {
		let mut inner = self.inner.lock();
		let snapshot = Snapshot {
			rows: inner.rows.clone(),
			next_id: inner.next_id,
		};
		inner.snapshots.push(snapshot);
		trace!(entity = E::NAME, depth = inner.snapshots.len(), "began transaction");
		Ok(())
	}

	fn commit(&self) -> Result<()> {
		let mut inner = self.inner.lock();
		if inner.snapshots.pop().is_none() {
			return Err(Error::store("commit without an open transaction"));
		}
		trace!(entity = E::NAME, depth = inner.snapshots.len(), "committed transaction");
		Ok(())
	}

	fn rollback(&self) -> Result<()> {
		let mut inner = self.inner.lock();
		let Some(snapshot) = inner.snapshots.pop() else {
			return Err(Error::store("rollback without an open transaction"));
		};
		inner.rows = snapshot.rows;
		inner.next_id = snapshot.next_id;
		trace!(entity = E::NAME, depth = inner.snapshots.len(), "rolled back transaction");
		Ok(())
	}
}
