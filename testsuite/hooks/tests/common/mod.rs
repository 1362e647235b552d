// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

#![allow(dead_code)]

use std::sync::Arc;

use vigil_core::{HookSet, OperationSet, store::EntityStore};
use vigil_testing::{Item, MemoryStore, RecordingObserver};
use vigil_watch::{DEFAULT_ACCESSOR, Model, ObserverRef, Watched, WatchedSet, register};

pub const SEED: [&str; 5] = ["text1", "text2", "text3", "text4", "text5"];

pub struct Harness {
	pub store: Arc<MemoryStore<Item>>,
	pub recorder: Arc<RecordingObserver<Item>>,
	pub watched: Watched<Item>,
}

impl Harness {
	pub fn objects(&self) -> &WatchedSet<Item> {
		self.watched.accessor(DEFAULT_ACCESSOR).expect("default accessor is watched")
	}

	pub fn count(&self) -> u64 {
		self.objects().count().expect("count")
	}

	pub fn first(&self) -> Item {
		self.objects().first().expect("fetch").expect("at least one row")
	}
}

/// Five seeded items, a recording observer with every reachable hook
/// declared overridden, and the rewritten entity surface.
pub fn harness(capabilities: OperationSet) -> Harness {
	harness_with(capabilities, None)
}

pub fn harness_with(capabilities: OperationSet, overridden: Option<HookSet>) -> Harness {
	let store = MemoryStore::shared();
	store.seed(SEED.map(Item::new));
	let recorder = match overridden {
		Some(hooks) => RecordingObserver::with_overridden(capabilities, hooks),
		None => RecordingObserver::new(capabilities),
	};
	let engine: Arc<dyn EntityStore<Item>> = store.clone();
	let watched = register(Model::new(engine), ObserverRef::Direct(recorder.observer()), None)
		.expect("registration");
	Harness {
		store,
		recorder,
		watched,
	}
}
