// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Delete bundle behavior, both call paths.

mod common;

use common::{harness, harness_with};
use vigil_core::{CallSource, Entity, Error, Hook, HookSet, OperationSet, QueryState};
use vigil_testing::{Item, RecordedTarget};

#[test]
fn test_hooks_with_instance() {
	let h = harness(OperationSet::DELETE);
	let mut instance = h.first();
	let id = instance.id.unwrap();
	let stored = instance.clone();

	let outcome = h.watched.delete(&mut instance).unwrap();

	assert_eq!(outcome.deleted, 1);
	assert_eq!(h.recorder.hook_sequence(), vec![Hook::PreDelete, Hook::PostDelete]);
	assert_eq!(h.count(), 4);

	// the instance handle is back to unsaved state
	assert_eq!(instance.id, None);

	let pre = &h.recorder.calls_of(Hook::PreDelete)[0];
	assert_eq!(pre.affected, RecordedTarget::Set(QueryState::by_id(id)));
	assert_eq!(pre.meta.source, CallSource::Instance);
	assert_eq!(pre.meta.instance_ref, Some(stored.clone()));

	// post-hook received the rows materialized before deletion, and an
	// instance copy with its identity gone
	let post = &h.recorder.calls_of(Hook::PostDelete)[0];
	assert_eq!(post.affected, RecordedTarget::Instances(vec![stored.clone()]));
	assert_eq!(post.meta.instance_ref, Some(Item::new(stored.text)));
}

#[test]
fn test_hooks_with_collection() {
	let h = harness(OperationSet::DELETE);
	let stored = h.first();
	let id = stored.id.unwrap();

	let outcome = h.objects().by_id(id).delete().unwrap();

	assert_eq!(outcome.deleted, 1);
	assert_eq!(h.recorder.hook_sequence(), vec![Hook::PreDelete, Hook::PostDelete]);
	assert_eq!(h.count(), 4);

	let pre = &h.recorder.calls_of(Hook::PreDelete)[0];
	assert_eq!(pre.affected, RecordedTarget::Set(QueryState::by_id(id)));
	assert_eq!(pre.meta.source, CallSource::Query);
	assert_eq!(pre.meta.instance_ref, None);

	let post = &h.recorder.calls_of(Hook::PostDelete)[0];
	assert_eq!(post.affected, RecordedTarget::Instances(vec![stored]));
}

#[test]
fn test_hooks_with_multiple_objects() {
	let h = harness(OperationSet::DELETE);
	let all = h.objects().fetch().unwrap();

	let outcome = h.objects().delete().unwrap();

	assert_eq!(outcome.deleted, 5);
	assert_eq!(outcome.details.get(Item::NAME), Some(&5));
	assert_eq!(h.count(), 0);

	let pre = &h.recorder.calls_of(Hook::PreDelete)[0];
	assert_eq!(pre.affected, RecordedTarget::Set(QueryState::new()));

	let post = &h.recorder.calls_of(Hook::PostDelete)[0];
	assert_eq!(post.affected, RecordedTarget::Instances(all));
}

#[test]
fn test_post_delete_materialization_skipped_when_not_overridden() {
	let h = harness_with(OperationSet::DELETE, Some(HookSet::from(Hook::PreDelete)));

	h.objects().delete().unwrap();

	assert_eq!(h.count(), 0);
	// the hook still runs in sequence, but with nothing materialized
	let post = &h.recorder.calls_of(Hook::PostDelete)[0];
	assert_eq!(post.affected, RecordedTarget::Instances(Vec::new()));
}

#[test]
fn test_delete_unsaved_instance_fails() {
	let h = harness(OperationSet::DELETE);
	let mut unsaved = Item::new("ghost");

	let err = h.watched.delete(&mut unsaved).unwrap_err();

	assert!(matches!(err, Error::Unsaved { .. }));
	assert_eq!(h.count(), 5);
}

#[test]
fn test_exception_on_pre_delete_rolls_back() {
	let h = harness(OperationSet::DELETE);
	h.recorder.fail_on(Hook::PreDelete);

	let mut instance = h.first();
	assert!(h.watched.delete(&mut instance).is_err());
	assert!(h.objects().delete().is_err());

	assert_eq!(h.count(), 5);
}

#[test]
fn test_exception_on_post_delete_rolls_back() {
	let h = harness(OperationSet::DELETE);
	h.recorder.fail_on(Hook::PostDelete);

	let mut instance = h.first();
	assert!(h.watched.delete(&mut instance).is_err());
	assert!(h.objects().delete().is_err());

	assert_eq!(h.count(), 5);
}
