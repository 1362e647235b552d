// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! A recording observer for asserting hook order and arguments.

use std::sync::Arc;

use parking_lot::Mutex;
use vigil_core::{
	Entity, EntitySet, Error, Hook, HookSet, MetaParams, OperationSet, QueryState, Result,
};
use vigil_watch::{Affected, Observer};

/// Snapshot of what a hook received as "the affected rows".
///
/// Collection handles are captured by their query state: two handles with
/// the same state denote the same query.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedTarget<E: Entity> {
	Instances(Vec<E>),
	Set(QueryState),
}

/// One hook invocation, captured at call time.
#[derive(Debug, Clone)]
pub struct RecordedCall<E: Entity> {
	pub hook: Hook,
	pub affected: RecordedTarget<E>,
	pub meta: MetaParams<E>,
}

/// Observer test double: records every hook invocation and can be armed
/// to fail on one hook.
///
/// By default it declares every hook its capabilities imply as overridden,
/// so materialization gates stay open and arguments are observable;
/// [`with_overridden`](RecordingObserver::with_overridden) narrows that to
/// exercise the gates themselves.
pub struct RecordingObserver<E: Entity> {
	capabilities: OperationSet,
	overridden: HookSet,
	calls: Mutex<Vec<RecordedCall<E>>>,
	fail_on: Mutex<Option<Hook>>,
}

impl<E: Entity> RecordingObserver<E> {
	pub fn new(capabilities: OperationSet) -> Arc<Self> {
		Self::with_overridden(capabilities, capabilities.implied_hooks())
	}

	pub fn with_overridden(capabilities: OperationSet, overridden: HookSet) -> Arc<Self> {
		Arc::new(Self {
			capabilities,
			overridden,
			calls: Mutex::new(Vec::new()),
			fail_on: Mutex::new(None),
		})
	}

	/// Upcast for registration.
	pub fn observer(self: &Arc<Self>) -> Arc<dyn Observer<E>> {
		Arc::clone(self) as Arc<dyn Observer<E>>
	}

	/// Arm one hook to fail with an observer error after recording.
	pub fn fail_on(&self, hook: Hook) {
		*self.fail_on.lock() = Some(hook);
	}

	pub fn disarm(&self) {
		*self.fail_on.lock() = None;
	}

	pub fn calls(&self) -> Vec<RecordedCall<E>> {
		self.calls.lock().clone()
	}

	/// The hooks invoked so far, in order.
	pub fn hook_sequence(&self) -> Vec<Hook> {
		self.calls.lock().iter().map(|call| call.hook).collect()
	}

	pub fn calls_of(&self, hook: Hook) -> Vec<RecordedCall<E>> {
		self.calls.lock().iter().filter(|call| call.hook == hook).cloned().collect()
	}

	pub fn count_of(&self, hook: Hook) -> usize {
		self.calls.lock().iter().filter(|call| call.hook == hook).count()
	}

	pub fn is_empty(&self) -> bool {
		self.calls.lock().is_empty()
	}

	pub fn clear(&self) {
		self.calls.lock().clear();
	}

	fn record(&self, hook: Hook, affected: RecordedTarget<E>, meta: &MetaParams<E>) -> Result<()> {
		self.calls.lock().push(RecordedCall {
			hook,
			affected,
			meta: meta.clone(),
		});
		if *self.fail_on.lock() == Some(hook) {
			return Err(Error::observer(format!("{} armed to fail", hook)));
		}
		Ok(())
	}
}

impl<E: Entity> Observer<E> for RecordingObserver<E> {
	fn capabilities(&self) -> OperationSet {
		self.capabilities
	}

	fn overridden(&self) -> HookSet {
		self.overridden
	}

	fn pre_create(&self, affected: &[E], meta: &MetaParams<E>) -> Result<()> {
		self.record(Hook::PreCreate, RecordedTarget::Instances(affected.to_vec()), meta)
	}

	fn post_create(&self, affected: &EntitySet<E>, meta: &MetaParams<E>) -> Result<()> {
		self.record(Hook::PostCreate, RecordedTarget::Set(affected.state().clone()), meta)
	}

	fn pre_update(&self, affected: &EntitySet<E>, meta: &MetaParams<E>) -> Result<()> {
		self.record(Hook::PreUpdate, RecordedTarget::Set(affected.state().clone()), meta)
	}

	fn post_update(&self, affected: &EntitySet<E>, meta: &MetaParams<E>) -> Result<()> {
		self.record(Hook::PostUpdate, RecordedTarget::Set(affected.state().clone()), meta)
	}

	fn pre_delete(&self, affected: &EntitySet<E>, meta: &MetaParams<E>) -> Result<()> {
		self.record(Hook::PreDelete, RecordedTarget::Set(affected.state().clone()), meta)
	}

	fn post_delete(&self, affected: &[E], meta: &MetaParams<E>) -> Result<()> {
		self.record(Hook::PostDelete, RecordedTarget::Instances(affected.to_vec()), meta)
	}

	fn pre_save(&self, affected: Affected<'_, E>, meta: &MetaParams<E>) -> Result<()> {
		let affected = match affected {
			Affected::Instances(instances) => RecordedTarget::Instances(instances.to_vec()),
			Affected::Set(set) => RecordedTarget::Set(set.state().clone()),
		};
		self.record(Hook::PreSave, affected, meta)
	}

	fn post_save(&self, affected: &EntitySet<E>, meta: &MetaParams<E>) -> Result<()> {
		self.record(Hook::PostSave, RecordedTarget::Set(affected.state().clone()), meta)
	}
}
