// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! The persistence engine's interface boundary.
//!
//! The engine itself is an external collaborator. The interception layer
//! needs exactly this surface from it: mutation primitives, collection
//! materialization, and transaction control with nesting awareness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
	Result,
	entity::Entity,
	query::QueryState,
	value::Values,
};

/// Result of a delete: total rows removed plus a per-entity-name
/// breakdown (cascades may remove rows of several types).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
	pub deleted: u64,
	pub details: BTreeMap<String, u64>,
}

impl DeleteOutcome {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn single(entity: &str, deleted: u64) -> Self {
		let mut details = BTreeMap::new();
		if deleted > 0 {
			details.insert(entity.to_string(), deleted);
		}
		Self {
			deleted,
			details,
		}
	}
}

/// Object-safe store contract for one entity type.
///
/// `begin`/`commit`/`rollback` bracket a transaction; `in_transaction`
/// lets callers participate in an open one instead of nesting. A rollback
/// must discard every write since the matching `begin`.
pub trait EntityStore<E: Entity>: Send + Sync {
	/// Insert an unsaved instance, assigning its identity.
	fn insert(&self, entity: &mut E) -> Result<()>;

	/// Write back an already-stored instance in full.
	fn update_instance(&self, entity: &E) -> Result<()>;

	/// Apply assignments to every entity matching the state's filter.
	/// Returns the number of rows touched.
	fn update_where(&self, state: &QueryState, values: &Values) -> Result<u64>;

	/// Delete every entity matching the state's filter.
	fn delete_where(&self, state: &QueryState) -> Result<DeleteOutcome>;

	/// Materialize the handle into concrete entities, honoring order
	/// and limit.
	fn fetch(&self, state: &QueryState) -> Result<Vec<E>>;

	fn count(&self, state: &QueryState) -> Result<u64>;

	fn in_transaction(&self) -> bool;

	fn begin(&self) -> Result<()>;

	fn commit(&self) -> Result<()>;

	fn rollback(&self) -> Result<()>;
}
