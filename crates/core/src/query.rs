// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! The clonable description of a collection handle.
//!
//! A handle's entire behavior is captured here: filter tree, ordering,
//! limit, field selection, prefetch list, and execution hints. Cloning a
//! handle into another handle type must preserve this state verbatim so the
//! resulting query stays equivalent; only the handle's method set changes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId, value::Value};

/// Field comparison operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

impl Cmp {
	pub fn evaluate(&self, left: &Value, right: &Value) -> bool {
		match self {
			Cmp::Eq => left == right,
			Cmp::Ne => left != right,
			Cmp::Lt => matches!(left.compare(right), Some(Ordering::Less)),
			Cmp::Le => {
				matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal))
			}
			Cmp::Gt => matches!(left.compare(right), Some(Ordering::Greater)),
			Cmp::Ge => {
				matches!(left.compare(right), Some(Ordering::Greater | Ordering::Equal))
			}
		}
	}
}

/// Filter tree over one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
	/// Matches every entity.
	All,
	/// Matches the entity with exactly this identity.
	IdEq(EntityId),
	/// Matches entities whose identity is in the list.
	IdIn(Vec<EntityId>),
	/// Matches entities whose field compares against the operand.
	Field {
		field: String,
		cmp: Cmp,
		value: Value,
	},
	/// Conjunction of sub-filters.
	And(Vec<Filter>),
}

impl Filter {
	pub fn field(field: impl Into<String>, cmp: Cmp, value: impl Into<Value>) -> Self {
		Filter::Field {
			field: field.into(),
			cmp,
			value: value.into(),
		}
	}

	/// Combine with another filter; `All` is the identity element.
	pub fn and(self, other: Filter) -> Self {
		match (self, other) {
			(Filter::All, f) | (f, Filter::All) => f,
			(Filter::And(mut fs), f) => {
				fs.push(f);
				Filter::And(fs)
			}
			(l, r) => Filter::And(vec![l, r]),
		}
	}

	pub fn matches<E: Entity>(&self, entity: &E) -> bool {
		match self {
			Filter::All => true,
			Filter::IdEq(id) => entity.id() == Some(*id),
			Filter::IdIn(ids) => entity.id().is_some_and(|id| ids.contains(&id)),
			Filter::Field {
				field,
				cmp,
				value,
			} => entity.value_of(field).is_some_and(|v| cmp.evaluate(&v, value)),
			Filter::And(filters) => filters.iter().all(|f| f.matches(entity)),
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
	Asc,
	Desc,
}

/// One ordering criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
	pub field: String,
	pub dir: SortDir,
}

impl SortKey {
	pub fn asc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			dir: SortDir::Asc,
		}
	}

	pub fn desc(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			dir: SortDir::Desc,
		}
	}
}

/// Execution hints a handle carries to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hints {
	/// Target database alias, when the engine routes between several.
	pub database: Option<String>,
	/// The handle was obtained for a write operation.
	pub for_write: bool,
	/// Filters applied through this handle stick to related lookups.
	pub sticky_filter: bool,
}

/// The full, pure state of a collection handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
	pub filter: Filter,
	pub order: Vec<SortKey>,
	pub limit: Option<u64>,
	/// Restrict materialization to these fields, when set.
	pub fields: Option<Vec<String>>,
	/// Related lookups to prefetch on materialization.
	pub prefetch: Vec<String>,
	pub hints: Hints,
}

impl Default for Filter {
	fn default() -> Self {
		Filter::All
	}
}

impl QueryState {
	pub fn new() -> Self {
		Self::default()
	}

	/// State matching exactly one identity.
	pub fn by_id(id: EntityId) -> Self {
		Self {
			filter: Filter::IdEq(id),
			..Self::default()
		}
	}

	pub fn filtered(mut self, filter: Filter) -> Self {
		self.filter = self.filter.and(filter);
		self
	}

	pub fn ordered(mut self, key: SortKey) -> Self {
		self.order.push(key);
		self
	}

	pub fn limited(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn selecting(mut self, fields: Vec<String>) -> Self {
		self.fields = Some(fields);
		self
	}

	pub fn prefetching(mut self, lookup: impl Into<String>) -> Self {
		self.prefetch.push(lookup.into());
		self
	}

	pub fn for_write(mut self) -> Self {
		self.hints.for_write = true;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Result, Values};

	#[derive(Debug, Clone, PartialEq)]
	struct Row {
		id: Option<EntityId>,
		rank: i64,
	}

	impl Entity for Row {
		const NAME: &'static str = "row";

		fn id(&self) -> Option<EntityId> {
			self.id
		}

		fn assign_id(&mut self, id: EntityId) {
			self.id = Some(id);
		}

		fn clear_id(&mut self) {
			self.id = None;
		}

		fn from_values(values: &Values) -> Result<Self> {
			let rank = match values.get("rank") {
				Some(Value::Int(v)) => *v,
				_ => 0,
			};
			Ok(Self {
				id: None,
				rank,
			})
		}

		fn apply(&mut self, values: &Values) -> Result<()> {
			if let Some(Value::Int(v)) = values.get("rank") {
				self.rank = *v;
			}
			Ok(())
		}

		fn value_of(&self, field: &str) -> Option<Value> {
			match field {
				"rank" => Some(Value::Int(self.rank)),
				_ => None,
			}
		}
	}

	fn create_test_row(id: u64, rank: i64) -> Row {
		Row {
			id: Some(EntityId(id)),
			rank,
		}
	}

	#[test]
	fn test_filter_matches() {
		let row = create_test_row(7, 3);

		assert!(Filter::All.matches(&row));
		assert!(Filter::IdEq(EntityId(7)).matches(&row));
		assert!(!Filter::IdEq(EntityId(8)).matches(&row));
		assert!(Filter::IdIn(vec![EntityId(6), EntityId(7)]).matches(&row));
		assert!(Filter::field("rank", Cmp::Ge, 3i64).matches(&row));
		assert!(!Filter::field("rank", Cmp::Lt, 3i64).matches(&row));
		assert!(!Filter::field("missing", Cmp::Eq, 3i64).matches(&row));
	}

	#[test]
	fn test_and_collapses_all() {
		let filter = Filter::All.and(Filter::IdEq(EntityId(1)));
		assert_eq!(filter, Filter::IdEq(EntityId(1)));

		let chained = filter.and(Filter::field("rank", Cmp::Eq, 1i64));
		let row = create_test_row(1, 1);
		assert!(chained.matches(&row));
	}

	#[test]
	fn test_state_builders_accumulate() {
		let state = QueryState::new()
			.filtered(Filter::IdEq(EntityId(1)))
			.ordered(SortKey::desc("rank"))
			.limited(10)
			.selecting(vec!["rank".to_string()])
			.prefetching("tags")
			.for_write();

		assert_eq!(state.filter, Filter::IdEq(EntityId(1)));
		assert_eq!(state.order.len(), 1);
		assert_eq!(state.limit, Some(10));
		assert_eq!(state.fields.as_deref(), Some(&["rank".to_string()][..]));
		assert_eq!(state.prefetch, vec!["tags".to_string()]);
		assert!(state.hints.for_write);

		// a clone must be indistinguishable from the original
		assert_eq!(state.clone(), state);
	}

	#[test]
	fn test_unmatched_id_on_unsaved_entity() {
		let unsaved = Row {
			id: None,
			rank: 0,
		};
		assert!(!Filter::IdEq(EntityId(1)).matches(&unsaved));
		assert!(!Filter::IdIn(vec![EntityId(1)]).matches(&unsaved));
	}
}
