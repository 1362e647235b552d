// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! The observer contract.

use vigil_core::{
	Entity, EntitySet, HookSet, MetaParams, OperationSet, Result,
};

/// What a hook receives as "the affected rows".
///
/// `pre_save` is the only hook whose argument shape depends on the branch
/// taken: a list of unsaved instances on the create path, a collection
/// handle on the update path. Every other hook has a fixed shape.
pub enum Affected<'a, E: Entity> {
	Instances(&'a [E]),
	Set(&'a EntitySet<E>),
}

/// Policy object defining pre/post hook behavior for one entity type.
///
/// Stateless at the call level: per-call context arrives as parameters and
/// is never stored on the observer. The composed operation bundles are
/// declared through [`capabilities`](Observer::capabilities); the hooks the
/// observer actually customizes through [`overridden`](Observer::overridden).
/// Both are read once, at rewrite time; a hook declared outside the
/// capability set fails registration instead of silently never firing.
///
/// Every hook defaults to a no-op. An `Err` from any hook aborts the whole
/// operation: the enclosing transaction rolls back and the error propagates
/// verbatim to the caller of the mutation.
pub trait Observer<E: Entity>: Send + Sync {
	/// The operation bundles this observer composes.
	fn capabilities(&self) -> OperationSet;

	/// The hooks this observer customizes. Used to skip expensive
	/// argument materialization for hooks nobody listens to.
	fn overridden(&self) -> HookSet {
		HookSet::EMPTY
	}

	/// Before a create. `affected` holds the unsaved instance.
	fn pre_create(&self, _affected: &[E], _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}

	/// After a create. `affected` selects exactly the created entity.
	fn post_create(&self, _affected: &EntitySet<E>, _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}

	fn pre_update(&self, _affected: &EntitySet<E>, _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}

	fn post_update(&self, _affected: &EntitySet<E>, _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}

	fn pre_delete(&self, _affected: &EntitySet<E>, _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}

	/// After a delete. `affected` holds the deleted instances,
	/// materialized before deletion, and only when this hook is
	/// declared overridden.
	fn post_delete(&self, _affected: &[E], _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}

	fn pre_save(&self, _affected: Affected<'_, E>, _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}

	fn post_save(&self, _affected: &EntitySet<E>, _meta: &MetaParams<E>) -> Result<()> {
		Ok(())
	}
}
