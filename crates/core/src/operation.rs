// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Operation and hook vocabulary.
//!
//! Observers declare which operation bundles they compose and which hooks
//! they customize as plain sets, replacing runtime reflection with a
//! presence check.

use std::{
	fmt::{Display, Formatter},
	ops::BitOr,
};

use serde::{Deserialize, Serialize};

/// The four interceptable mutation operations.
///
/// `Save` is derived: on the entity level it maps to the real `save`
/// method; on the collection level it expands to `Create` + `Update`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
	Create,
	Update,
	Delete,
	Save,
}

impl Operation {
	const fn bit(self) -> u8 {
		match self {
			Operation::Create => 1 << 0,
			Operation::Update => 1 << 1,
			Operation::Delete => 1 << 2,
			Operation::Save => 1 << 3,
		}
	}
}

impl Display for Operation {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Operation::Create => "create",
			Operation::Update => "update",
			Operation::Delete => "delete",
			Operation::Save => "save",
		};
		write!(f, "{}", name)
	}
}

/// Set of operations, used for observer capabilities and for the
/// operation lists the rewriter installs per level.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSet(u8);

impl OperationSet {
	pub const EMPTY: Self = Self(0);
	pub const CREATE: Self = Self(Operation::Create.bit());
	pub const UPDATE: Self = Self(Operation::Update.bit());
	pub const DELETE: Self = Self(Operation::Delete.bit());
	pub const SAVE: Self = Self(Operation::Save.bit());

	pub const fn contains(self, operation: Operation) -> bool {
		self.0 & operation.bit() != 0
	}

	pub const fn with(self, operation: Operation) -> Self {
		Self(self.0 | operation.bit())
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	pub fn iter(self) -> impl Iterator<Item = Operation> {
		[Operation::Create, Operation::Update, Operation::Delete, Operation::Save]
			.into_iter()
			.filter(move |op| self.contains(*op))
	}

	/// Every hook the operations in this set can ever fire.
	pub const fn implied_hooks(self) -> HookSet {
		let mut hooks = HookSet::EMPTY;
		if self.contains(Operation::Create) {
			hooks = hooks.with(Hook::PreCreate).with(Hook::PostCreate);
		}
		if self.contains(Operation::Update) {
			hooks = hooks.with(Hook::PreUpdate).with(Hook::PostUpdate);
		}
		if self.contains(Operation::Delete) {
			hooks = hooks.with(Hook::PreDelete).with(Hook::PostDelete);
		}
		if self.contains(Operation::Save) {
			hooks = hooks
				.with(Hook::PreSave)
				.with(Hook::PostSave)
				.with(Hook::PreCreate)
				.with(Hook::PostCreate)
				.with(Hook::PreUpdate)
				.with(Hook::PostUpdate);
		}
		hooks
	}
}

impl BitOr for OperationSet {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl Display for OperationSet {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let names: Vec<String> = self.iter().map(|op| op.to_string()).collect();
		write!(f, "{{{}}}", names.join(", "))
	}
}

/// The eight observer hooks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hook {
	PreCreate,
	PostCreate,
	PreUpdate,
	PostUpdate,
	PreDelete,
	PostDelete,
	PreSave,
	PostSave,
}

impl Hook {
	const fn bit(self) -> u8 {
		match self {
			Hook::PreCreate => 1 << 0,
			Hook::PostCreate => 1 << 1,
			Hook::PreUpdate => 1 << 2,
			Hook::PostUpdate => 1 << 3,
			Hook::PreDelete => 1 << 4,
			Hook::PostDelete => 1 << 5,
			Hook::PreSave => 1 << 6,
			Hook::PostSave => 1 << 7,
		}
	}

	pub const ALL: [Hook; 8] = [
		Hook::PreCreate,
		Hook::PostCreate,
		Hook::PreUpdate,
		Hook::PostUpdate,
		Hook::PreDelete,
		Hook::PostDelete,
		Hook::PreSave,
		Hook::PostSave,
	];
}

impl Display for Hook {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Hook::PreCreate => "pre_create",
			Hook::PostCreate => "post_create",
			Hook::PreUpdate => "pre_update",
			Hook::PostUpdate => "post_update",
			Hook::PreDelete => "pre_delete",
			Hook::PostDelete => "post_delete",
			Hook::PreSave => "pre_save",
			Hook::PostSave => "post_save",
		};
		write!(f, "{}", name)
	}
}

/// Set of hooks an observer declares it customizes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSet(u8);

impl HookSet {
	pub const EMPTY: Self = Self(0);
	pub const ALL: Self = Self(u8::MAX);

	pub const fn contains(self, hook: Hook) -> bool {
		self.0 & hook.bit() != 0
	}

	pub const fn with(self, hook: Hook) -> Self {
		Self(self.0 | hook.bit())
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// Hooks present in `self` but not in `other`.
	pub const fn difference(self, other: Self) -> Self {
		Self(self.0 & !other.0)
	}

	pub fn iter(self) -> impl Iterator<Item = Hook> {
		Hook::ALL.into_iter().filter(move |hook| self.contains(*hook))
	}
}

impl BitOr for HookSet {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl From<Hook> for HookSet {
	fn from(hook: Hook) -> Self {
		Self(hook.bit())
	}
}

impl FromIterator<Hook> for HookSet {
	fn from_iter<I: IntoIterator<Item = Hook>>(iter: I) -> Self {
		iter.into_iter().fold(Self::EMPTY, HookSet::with)
	}
}

impl Display for HookSet {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let names: Vec<String> = self.iter().map(|hook| hook.to_string()).collect();
		write!(f, "{{{}}}", names.join(", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_operation_set_membership() {
		let set = OperationSet::SAVE | OperationSet::DELETE;

		assert!(set.contains(Operation::Save));
		assert!(set.contains(Operation::Delete));
		assert!(!set.contains(Operation::Create));
		assert_eq!(set.iter().count(), 2);
	}

	#[test]
	fn test_save_implies_create_and_update_hooks() {
		let hooks = OperationSet::SAVE.implied_hooks();

		assert!(hooks.contains(Hook::PreSave));
		assert!(hooks.contains(Hook::PostSave));
		assert!(hooks.contains(Hook::PreCreate));
		assert!(hooks.contains(Hook::PostUpdate));
		assert!(!hooks.contains(Hook::PreDelete));
	}

	#[test]
	fn test_hook_set_difference() {
		let declared = HookSet::from(Hook::PreDelete).with(Hook::PostSave);
		let allowed = OperationSet::DELETE.implied_hooks();
		let extra = declared.difference(allowed);

		assert!(extra.contains(Hook::PostSave));
		assert!(!extra.contains(Hook::PreDelete));
		assert_eq!(extra.iter().count(), 1);
	}
}
