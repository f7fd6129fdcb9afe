// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Human-readable action descriptions used to label permission reports.

use serde::{Deserialize, Serialize};

use crate::ordered::OrderedMap;

/// Ordered resource → action → description table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionDocs(OrderedMap<OrderedMap<String>>);

impl ActionDocs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: describe one action.
	pub fn describe(
		mut self,
		resource: impl Into<String>,
		action: impl Into<String>,
		description: impl Into<String>,
	) -> Self {
		self.insert(resource, action, description);
		self
	}

	pub fn insert(
		&mut self,
		resource: impl Into<String>,
		action: impl Into<String>,
		description: impl Into<String>,
	) {
		let resource = resource.into();
		self
			.0
			.get_or_insert_with(&resource, OrderedMap::new)
			.insert(action, description.into());
	}

	pub fn description(&self, resource: &str, action: &str) -> Option<&str> {
		self.0.get(resource)?.get(action).map(String::as_str)
	}

	/// All `(resource, action, description)` entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
		self.0.iter().flat_map(|(resource, actions)| {
			actions
				.iter()
				.map(move |(action, description)| (resource, action, description.as_str()))
		})
	}

	pub fn len(&self) -> usize {
		self.0.values().map(OrderedMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
