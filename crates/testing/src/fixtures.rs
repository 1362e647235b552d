// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Fixture entity used across the workspace's tests.

use vigil_core::{Entity, EntityId, Error, Result, Value, Values};

/// A minimal persisted record: one text field plus identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
	pub id: Option<EntityId>,
	pub text: String,
}

impl Item {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			id: None,
			text: text.into(),
		}
	}
}

impl Entity for Item {
	const NAME: &'static str = "item";

	fn id(&self) -> Option<EntityId> {
		self.id
	}

	fn assign_id(&mut self, id: EntityId) {
		self.id = Some(id);
	}

	fn clear_id(&mut self) {
		self.id = None;
	}

	fn from_values(values: &Values) -> Result<Self> {
		let text = match values.get("text") {
			Some(Value::Text(text)) => text.clone(),
			Some(Value::Null) => String::new(),
			Some(other) => other.to_string(),
			None => {
				return Err(Error::MissingValue {
					entity: Self::NAME,
					field: "text",
				});
			}
		};
		Ok(Self {
			id: None,
			text,
		})
	}

	fn apply(&mut self, values: &Values) -> Result<()> {
		for (field, value) in values.iter() {
			match field {
				"text" => {
					self.text = match value {
						Value::Text(text) => text.clone(),
						Value::Null => String::new(),
						other => other.to_string(),
					}
				}
				other => {
					return Err(Error::UnknownField {
						entity: Self::NAME,
						field: other.to_string(),
					});
				}
			}
		}
		Ok(())
	}

	fn value_of(&self, field: &str) -> Option<Value> {
		match field {
			"id" => self.id.map(|id| Value::Int(*id as i64)),
			"text" => Some(Value::Text(self.text.clone())),
			_ => None,
		}
	}
}
