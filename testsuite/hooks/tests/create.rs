// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Create bundle behavior, both call paths.

mod common;

use common::{harness, harness_with};
use vigil_core::{
	CallSource, Error, Hook, HookSet, OperationSet, QueryState, Values, values,
};
use vigil_testing::{Item, RecordedTarget};

#[test]
fn test_hooks_with_instance() {
	let h = harness(OperationSet::CREATE);
	let mut instance = Item::new("text");

	h.watched.save(&mut instance).unwrap();

	assert_eq!(h.recorder.hook_sequence(), vec![Hook::PreCreate, Hook::PostCreate]);
	assert_eq!(h.count(), 6);

	// pre-hook saw the unsaved copy
	let pre = &h.recorder.calls_of(Hook::PreCreate)[0];
	assert_eq!(pre.affected, RecordedTarget::Instances(vec![Item::new("text")]));
	assert_eq!(pre.meta.source, CallSource::Instance);
	assert_eq!(pre.meta.operation_params, Values::new());
	assert_eq!(pre.meta.instance_ref, Some(Item::new("text")));

	// post-hook saw the stored entity
	let id = instance.id.expect("save assigns identity");
	let post = &h.recorder.calls_of(Hook::PostCreate)[0];
	assert_eq!(post.affected, RecordedTarget::Set(QueryState::by_id(id)));
	assert_eq!(post.meta.source, CallSource::Instance);
	assert_eq!(post.meta.instance_ref.as_ref().and_then(|i| i.id), Some(id));
}

#[test]
fn test_hooks_with_collection() {
	let h = harness(OperationSet::CREATE);

	let created = h.objects().create(&values! { "text" => "text" }).unwrap();

	assert_eq!(h.recorder.hook_sequence(), vec![Hook::PreCreate, Hook::PostCreate]);
	assert_eq!(h.count(), 6);

	let pre = &h.recorder.calls_of(Hook::PreCreate)[0];
	assert_eq!(pre.affected, RecordedTarget::Instances(vec![Item::new("text")]));
	assert_eq!(pre.meta.source, CallSource::Query);
	assert_eq!(pre.meta.operation_params, values! { "text" => "text" });
	assert_eq!(pre.meta.instance_ref, None);

	let id = created.id.expect("create assigns identity");
	let post = &h.recorder.calls_of(Hook::PostCreate)[0];
	assert_eq!(post.affected, RecordedTarget::Set(QueryState::by_id(id)));
}

#[test]
fn test_create_fires_hooks_exactly_once() {
	let h = harness(OperationSet::CREATE);

	h.objects().create(&values! { "text" => "once" }).unwrap();

	assert_eq!(h.recorder.count_of(Hook::PreCreate), 1);
	assert_eq!(h.recorder.count_of(Hook::PostCreate), 1);
}

#[test]
fn test_pre_create_skipped_when_not_overridden() {
	let h = harness_with(OperationSet::CREATE, Some(HookSet::from(Hook::PostCreate)));

	h.objects().create(&values! { "text" => "quiet" }).unwrap();

	assert_eq!(h.recorder.count_of(Hook::PreCreate), 0);
	assert_eq!(h.recorder.count_of(Hook::PostCreate), 1);
	assert_eq!(h.count(), 6);
}

#[test]
fn test_exception_on_pre_create_rolls_back() {
	let h = harness(OperationSet::CREATE);
	h.recorder.fail_on(Hook::PreCreate);

	let err = h.objects().create(&values! { "text" => "fake" }).unwrap_err();
	assert!(matches!(err, Error::Observer { .. }));

	let mut instance = Item::new("fake");
	assert!(h.watched.save(&mut instance).is_err());

	assert_eq!(h.count(), 5);
}

#[test]
fn test_exception_on_post_create_rolls_back() {
	let h = harness(OperationSet::CREATE);
	h.recorder.fail_on(Hook::PostCreate);

	assert!(h.objects().create(&values! { "text" => "fake" }).is_err());

	let mut instance = Item::new("fake");
	assert!(h.watched.save(&mut instance).is_err());

	assert_eq!(h.count(), 5);
}

#[test]
fn test_no_hooks_on_update_with_instance() {
	let h = harness(OperationSet::CREATE);

	let mut first = h.first();
	first.text = "new_text".to_string();
	h.watched.save(&mut first).unwrap();

	assert!(h.recorder.is_empty());
	assert_eq!(h.first().text, "new_text");
}

#[test]
fn test_no_hooks_on_update_with_collection() {
	let h = harness(OperationSet::CREATE);
	let first = h.first();

	h.objects()
		.by_id(first.id.unwrap())
		.update(&values! { "text" => "new_text" })
		.unwrap();

	assert!(h.recorder.is_empty());
	assert_eq!(h.first().text, "new_text");
}
