// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! The registration facade.

use std::sync::Arc;

use tracing::debug;
use vigil_core::{Entity, Result};

use crate::{
	observer::Observer,
	registry,
	rewrite::{Model, Watched, rewrite},
};

/// An observer given directly or as a textual reference to resolve
/// against the registry.
pub enum ObserverRef<E: Entity> {
	Direct(Arc<dyn Observer<E>>),
	Named(String),
}

impl<E: Entity> From<Arc<dyn Observer<E>>> for ObserverRef<E> {
	fn from(observer: Arc<dyn Observer<E>>) -> Self {
		ObserverRef::Direct(observer)
	}
}

impl<E: Entity> From<&str> for ObserverRef<E> {
	fn from(path: &str) -> Self {
		ObserverRef::Named(path.to_string())
	}
}

impl<E: Entity> From<String> for ObserverRef<E> {
	fn from(path: String) -> Self {
		ObserverRef::Named(path)
	}
}

/// Register an observer on an entity type.
///
/// Derives the operations to intercept from the bundles the observer
/// composes and delegates to the type rewriter. Defaults to intercepting
/// the primary collection accessor when none are named. Textual references
/// resolve against the process-global registry; malformed or unknown
/// references fail here, before anything is rewritten.
pub fn register<E: Entity>(
	model: Model<E>,
	observer: impl Into<ObserverRef<E>>,
	accessor_names: Option<&[&str]>,
) -> Result<Watched<E>> {
	let observer = match observer.into() {
		ObserverRef::Direct(observer) => observer,
		ObserverRef::Named(path) => {
			let resolved = registry::resolve::<E>(&path)?;
			debug!(entity = E::NAME, path = %path, "resolved observer reference");
			resolved
		}
	};
	rewrite(model, observer, accessor_names)
}
