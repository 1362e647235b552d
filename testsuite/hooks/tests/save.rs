// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Save bundle behavior: the create + update composition.

mod common;

use common::harness;
use vigil_core::{
	CallSource, Cmp, Filter, Hook, OperationSet, QueryState, values,
};
use vigil_testing::{Item, RecordedTarget};

#[test]
fn test_create_hooks_order_with_instance() {
	let h = harness(OperationSet::SAVE);
	let mut instance = Item::new("text");

	h.watched.save(&mut instance).unwrap();

	assert_eq!(
		h.recorder.hook_sequence(),
		vec![Hook::PreSave, Hook::PreCreate, Hook::PostCreate, Hook::PostSave]
	);
	assert_eq!(h.count(), 6);

	let id = instance.id.unwrap();
	let pre_save = &h.recorder.calls_of(Hook::PreSave)[0];
	assert_eq!(pre_save.affected, RecordedTarget::Instances(vec![Item::new("text")]));
	assert_eq!(pre_save.meta.source, CallSource::Instance);
	assert_eq!(pre_save.meta.instance_ref, Some(Item::new("text")));

	let pre_create = &h.recorder.calls_of(Hook::PreCreate)[0];
	assert_eq!(pre_create.affected, RecordedTarget::Instances(vec![Item::new("text")]));

	let post_save = &h.recorder.calls_of(Hook::PostSave)[0];
	assert_eq!(post_save.affected, RecordedTarget::Set(QueryState::by_id(id)));
	assert_eq!(post_save.meta.instance_ref.as_ref().and_then(|i| i.id), Some(id));
}

#[test]
fn test_update_hooks_order_with_instance() {
	let h = harness(OperationSet::SAVE);
	let mut instance = h.first();
	let id = instance.id.unwrap();
	instance.text = "new_text".to_string();

	h.watched.save(&mut instance).unwrap();

	assert_eq!(
		h.recorder.hook_sequence(),
		vec![Hook::PreSave, Hook::PreUpdate, Hook::PostUpdate, Hook::PostSave]
	);
	assert_eq!(h.first().text, "new_text");

	// the update branch hands every hook the singleton handle
	for call in h.recorder.calls() {
		assert_eq!(call.affected, RecordedTarget::Set(QueryState::by_id(id)));
		assert_eq!(call.meta.source, CallSource::Instance);
	}
}

#[test]
fn test_create_hooks_order_with_collection() {
	let h = harness(OperationSet::SAVE);

	let created = h.objects().create(&values! { "text" => "fake" }).unwrap();

	assert_eq!(
		h.recorder.hook_sequence(),
		vec![Hook::PreSave, Hook::PreCreate, Hook::PostCreate, Hook::PostSave]
	);
	assert_eq!(h.count(), 6);

	let id = created.id.unwrap();
	for hook in [Hook::PreSave, Hook::PreCreate] {
		let call = &h.recorder.calls_of(hook)[0];
		assert_eq!(call.affected, RecordedTarget::Instances(vec![Item::new("fake")]));
		assert_eq!(call.meta.source, CallSource::Query);
		assert_eq!(call.meta.operation_params, values! { "text" => "fake" });
		assert_eq!(call.meta.instance_ref, None);
	}
	for hook in [Hook::PostCreate, Hook::PostSave] {
		let call = &h.recorder.calls_of(hook)[0];
		assert_eq!(call.affected, RecordedTarget::Set(QueryState::by_id(id)));
	}
}

#[test]
fn test_update_hooks_order_with_collection() {
	let h = harness(OperationSet::SAVE);
	let id = h.first().id.unwrap();

	let touched = h.objects().by_id(id).update(&values! { "text" => "new_text" }).unwrap();

	assert_eq!(touched, 1);
	assert_eq!(
		h.recorder.hook_sequence(),
		vec![Hook::PreSave, Hook::PreUpdate, Hook::PostUpdate, Hook::PostSave]
	);

	for call in h.recorder.calls() {
		assert_eq!(call.affected, RecordedTarget::Set(QueryState::by_id(id)));
		assert_eq!(call.meta.source, CallSource::Query);
		assert_eq!(call.meta.operation_params, values! { "text" => "new_text" });
	}
	assert_eq!(h.first().text, "new_text");
}

#[test]
fn test_update_hooks_with_multiple_objects() {
	let h = harness(OperationSet::SAVE);

	let touched = h.objects().update(&values! { "text" => "new_text" }).unwrap();

	assert_eq!(touched, 5);
	assert_eq!(
		h.recorder.hook_sequence(),
		vec![Hook::PreSave, Hook::PreUpdate, Hook::PostUpdate, Hook::PostSave]
	);
	for call in h.recorder.calls() {
		assert_eq!(call.affected, RecordedTarget::Set(QueryState::new()));
	}
	let renamed =
		h.objects().filter(Filter::field("text", Cmp::Eq, "new_text")).count().unwrap();
	assert_eq!(renamed, 5);
}

#[test]
fn test_collection_create_does_not_double_fire() {
	let h = harness(OperationSet::SAVE);

	h.objects().create(&values! { "text" => "once" }).unwrap();

	// one collection create saves an instance internally; the create
	// hooks must still fire exactly once each
	assert_eq!(h.recorder.count_of(Hook::PreSave), 1);
	assert_eq!(h.recorder.count_of(Hook::PreCreate), 1);
	assert_eq!(h.recorder.count_of(Hook::PostCreate), 1);
	assert_eq!(h.recorder.count_of(Hook::PostSave), 1);
}

#[test]
fn test_exceptions_on_create_path_roll_back() {
	for hook in [Hook::PreSave, Hook::PreCreate, Hook::PostCreate, Hook::PostSave] {
		let h = harness(OperationSet::SAVE);
		h.recorder.fail_on(hook);

		assert!(h.objects().create(&values! { "text" => "fake" }).is_err());

		let mut instance = Item::new("fake");
		assert!(h.watched.save(&mut instance).is_err());

		assert_eq!(h.count(), 5, "no rows may survive a failing {}", hook);
	}
}

#[test]
fn test_exceptions_on_update_path_roll_back() {
	for hook in [Hook::PreSave, Hook::PreUpdate, Hook::PostUpdate, Hook::PostSave] {
		let h = harness(OperationSet::SAVE);
		h.recorder.fail_on(hook);

		assert!(h.objects().update(&values! { "text" => "new_text" }).is_err());

		let mut instance = h.first();
		instance.text = "new_text".to_string();
		assert!(h.watched.save(&mut instance).is_err());

		let renamed = h
			.objects()
			.filter(Filter::field("text", Cmp::Eq, "new_text"))
			.count()
			.unwrap();
		assert_eq!(renamed, 0, "no writes may survive a failing {}", hook);
	}
}
