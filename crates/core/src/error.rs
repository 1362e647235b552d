// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Error taxonomy for the interception layer.
//!
//! Configuration and reference errors surface at registration/rewrite time
//! and are never masked. Hook and store failures propagate verbatim to the
//! caller of the mutation after the enclosing transaction rolls back; the
//! dispatcher never catches, translates, or retries them.

use thiserror::Error;

use crate::{
	entity::EntityId,
	operation::{Hook, Operation},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	// configuration (rewrite-time)
	#[error("entity {entity} has no collection accessor named {}", .names.join(", "))]
	MissingAccessors {
		entity: &'static str,
		names: Vec<String>,
	},

	#[error("observer for entity {entity} composes no operation bundles")]
	EmptyCapabilities { entity: &'static str },

	#[error(
		"hooks declared overridden on entity {entity} are never fired by the composed operations: {}",
		.hooks.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
	)]
	UnreachableHooks {
		entity: &'static str,
		hooks: Vec<Hook>,
	},

	#[error("operation {operation} has no handler on this observer")]
	UnhandledOperation { operation: Operation },

	// textual observer references
	#[error("observer reference {path:?} needs at least two dotted segments")]
	MalformedReference { path: String },

	#[error("observer reference {path:?} does not resolve to a registered observer")]
	UnresolvedReference { path: String },

	// data and store boundary
	#[error("{entity} has no field named {field}")]
	UnknownField {
		entity: &'static str,
		field: String,
	},

	#[error("missing value for required field {field} of {entity}")]
	MissingValue {
		entity: &'static str,
		field: &'static str,
	},

	#[error("{entity} with id {id} was not found")]
	NotFound {
		entity: &'static str,
		id: EntityId,
	},

	#[error("cannot mutate an unsaved {entity} through the store")]
	Unsaved { entity: &'static str },

	#[error("store error: {message}")]
	Store { message: String },

	// observer-raised failures
	#[error("observer hook failed: {message}")]
	Observer { message: String },
}

impl Error {
	pub fn store(message: impl Into<String>) -> Self {
		Error::Store {
			message: message.into(),
		}
	}

	/// Conventional carrier for failures raised inside observer hooks.
	pub fn observer(message: impl Into<String>) -> Self {
		Error::Observer {
			message: message.into(),
		}
	}

	/// Rewrite-time failure: the registration itself is invalid.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			Error::MissingAccessors { .. }
				| Error::EmptyCapabilities { .. }
				| Error::UnreachableHooks { .. }
				| Error::UnhandledOperation { .. }
		)
	}

	/// Textual observer reference failure.
	pub fn is_reference(&self) -> bool {
		matches!(self, Error::MalformedReference { .. } | Error::UnresolvedReference { .. })
	}
}
