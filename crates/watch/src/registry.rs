// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Process-global observer registry.
//!
//! Textual observer references resolve against this table instead of
//! performing dynamic lookup in the hot path: observers are registered at
//! startup under their dotted path and resolved once per registration.
//!
//! Path format: at least two dotted segments, the last being the observer
//! name. A single-segment module remainder expands to `<segment>.watchers`
//! by convention, so `shop.AuditObserver` and `shop.watchers.AuditObserver`
//! name the same entry.

use std::{any::Any, collections::HashMap, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;
use vigil_core::{Entity, Error, Result};

use crate::observer::Observer;

static REGISTRY: Lazy<RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

fn normalize(path: &str) -> Result<String> {
	let segments: Vec<&str> = path.split('.').collect();
	if segments.len() < 2 || segments.iter().any(|segment| segment.is_empty()) {
		return Err(Error::MalformedReference {
			path: path.to_string(),
		});
	}
	let name = segments[segments.len() - 1];
	let module = &segments[..segments.len() - 1];
	let module = if module.len() == 1 {
		format!("{}.watchers", module[0])
	} else {
		module.join(".")
	};
	Ok(format!("{}.{}", module, name))
}

/// Register an observer under a dotted path. Re-registering a path
/// replaces the earlier entry.
pub fn register_observer<E: Entity>(path: &str, observer: Arc<dyn Observer<E>>) -> Result<()> {
	let key = normalize(path)?;
	debug!(entity = E::NAME, path, key = %key, "registered observer reference");
	REGISTRY.write().insert(key, Box::new(observer));
	Ok(())
}

/// Drop a registered observer reference.
pub fn unregister_observer(path: &str) -> Result<()> {
	let key = normalize(path)?;
	REGISTRY.write().remove(&key);
	Ok(())
}

/// Resolve a dotted path to the observer registered for entity type `E`.
pub fn resolve<E: Entity>(path: &str) -> Result<Arc<dyn Observer<E>>> {
	let key = normalize(path)?;
	REGISTRY
		.read()
		.get(&key)
		.and_then(|entry| entry.downcast_ref::<Arc<dyn Observer<E>>>())
		.cloned()
		.ok_or_else(|| Error::UnresolvedReference {
			path: path.to_string(),
		})
}
