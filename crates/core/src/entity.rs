// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};

use crate::{Result, value::{Value, Values}};

/// Identity of a stored entity.
///
/// Assigned by the persistence engine on the first successful insert;
/// an entity without one has never been stored.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl Deref for EntityId {
	type Target = u64;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<u64> for EntityId {
	fn from(raw: u64) -> Self {
		Self(raw)
	}
}

impl Display for EntityId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Contract every persisted record type implements.
///
/// The interception layer never owns entity storage; it only needs to read
/// and assign identity, construct an instance from operation parameters,
/// apply bulk-update parameters, and read single fields back for filter
/// evaluation.
pub trait Entity: Clone + Send + Sync + 'static {
	/// Stable name of the entity type, used in diagnostics and in
	/// per-entity delete breakdowns.
	const NAME: &'static str;

	/// The identity value, if this instance has been stored.
	fn id(&self) -> Option<EntityId>;

	/// Record the identity assigned by the engine on insert.
	fn assign_id(&mut self, id: EntityId);

	/// Drop the identity, returning the instance to unsaved state.
	/// Called after a successful instance-level delete.
	fn clear_id(&mut self);

	/// Construct an unsaved instance from named operation parameters.
	fn from_values(values: &Values) -> Result<Self>;

	/// Apply named operation parameters to this instance in place.
	fn apply(&mut self, values: &Values) -> Result<()>;

	/// Read a single field back, for filter evaluation and ordering.
	/// Returns `None` for unknown field names.
	fn value_of(&self, field: &str) -> Option<Value>;
}
