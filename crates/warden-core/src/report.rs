// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission documentation reports.
//!
//! A report is a snapshot of the whole permission table, independent of any
//! principal. It is rebuilt on every request and contains:
//!
//! - `permissions`: resource → action → role → [`PermissionStatus`]
//! - `headers`: three label columns followed by one column per role
//! - `rows`: one flat row per (resource, action) pair found under any role
//!
//! Ordering always follows the table's configuration order.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::action_docs::ActionDocs;
use crate::error::{Result, WardenError};
use crate::ordered::OrderedMap;
use crate::rule::PermissionRule;
use crate::table::PermissionTable;
use crate::types::UserRoleMode;

/// Shown for conditional rules that carry no description of their own.
pub const DEFAULT_CONDITION_DESCRIPTION: &str = "Custom condition";

pub const RESOURCE_AREA_COLUMN: &str = "resourceArea";
pub const PERMISSION_COLUMN: &str = "permission";
pub const PERMISSION_DESCRIPTION_COLUMN: &str = "permissionDescription";

/// Computed access for one role on one (resource, action) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStatus {
	Allowed,
	Denied,
	Conditional(String),
}

impl PermissionStatus {
	/// Status of a table slot; an empty slot is denied.
	pub fn from_rule<P, D>(rule: Option<&PermissionRule<P, D>>) -> Self {
		match rule {
			None | Some(PermissionRule::Denied) => PermissionStatus::Denied,
			Some(PermissionRule::Allowed) => PermissionStatus::Allowed,
			Some(PermissionRule::Conditional(condition)) => PermissionStatus::Conditional(
				condition
					.description()
					.unwrap_or(DEFAULT_CONDITION_DESCRIPTION)
					.to_string(),
			),
		}
	}
}

impl fmt::Display for PermissionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PermissionStatus::Allowed => write!(f, "Allowed"),
			PermissionStatus::Denied => write!(f, "Denied"),
			PermissionStatus::Conditional(description) => write!(f, "Conditional: {description}"),
		}
	}
}

impl Serialize for PermissionStatus {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Header entry. Role columns carry data; the others are labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportColumn {
	pub key: String,
	pub is_role: bool,
}

impl ReportColumn {
	fn label(key: &str) -> Self {
		Self {
			key: key.to_string(),
			is_role: false,
		}
	}

	fn role(key: &str) -> Self {
		Self {
			key: key.to_string(),
			is_role: true,
		}
	}
}

/// One report row. Serializes as
/// `[resource, action, description, status_1, status_2, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
	pub resource: String,
	pub action: String,
	pub description: String,
	/// One status per role, in header order.
	pub statuses: Vec<PermissionStatus>,
}

impl ReportRow {
	pub fn cells(&self) -> Vec<String> {
		let mut cells = Vec::with_capacity(3 + self.statuses.len());
		cells.push(self.resource.clone());
		cells.push(self.action.clone());
		cells.push(self.description.clone());
		cells.extend(self.statuses.iter().map(ToString::to_string));
		cells
	}
}

impl Serialize for ReportRow {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(3 + self.statuses.len()))?;
		seq.serialize_element(&self.resource)?;
		seq.serialize_element(&self.action)?;
		seq.serialize_element(&self.description)?;
		for status in &self.statuses {
			seq.serialize_element(status)?;
		}
		seq.end()
	}
}

/// The full permission documentation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDocs {
	pub user_role_mode: UserRoleMode,
	pub permissions: OrderedMap<OrderedMap<OrderedMap<PermissionStatus>>>,
	pub headers: Vec<ReportColumn>,
	pub rows: Vec<ReportRow>,
}

impl PermissionDocs {
	pub fn status(&self, resource: &str, action: &str, role: &str) -> Option<&PermissionStatus> {
		self.permissions.get(resource)?.get(action)?.get(role)
	}

	pub fn row(&self, resource: &str, action: &str) -> Option<&ReportRow> {
		self
			.rows
			.iter()
			.find(|row| row.resource == resource && row.action == action)
	}

	/// Role names, in column order.
	pub fn roles(&self) -> impl Iterator<Item = &str> {
		self
			.headers
			.iter()
			.filter(|column| column.is_role)
			.map(|column| column.key.as_str())
	}
}

/// Walks the whole table once and renders the report.
pub(crate) fn generate<P, D>(
	user_role_mode: UserRoleMode,
	table: &PermissionTable<P, D>,
	action_docs: Option<&ActionDocs>,
) -> Result<PermissionDocs> {
	let Some(action_docs) = action_docs else {
		warn!("permission docs requested without action descriptions");
		return Err(WardenError::MissingActionDocs);
	};

	let roles: Vec<&str> = table.roles().map(|role| role.as_str()).collect();

	// Union of every (resource, action) pair configured under any role.
	let mut pairs: OrderedMap<Vec<String>> = OrderedMap::new();
	for grants in table.grants() {
		for (resource, actions) in grants.layout() {
			let known = pairs.get_or_insert_with(resource, Vec::new);
			for action in actions {
				if !known.contains(action) {
					known.push(action.clone());
				}
			}
		}
	}

	let mut permissions: OrderedMap<OrderedMap<OrderedMap<PermissionStatus>>> = OrderedMap::new();
	let mut rows = Vec::new();

	for (resource, actions) in pairs.iter() {
		let by_action = permissions.get_or_insert_with(resource, OrderedMap::new);

		for action in actions {
			let description = action_docs
				.description(resource, action)
				.filter(|text| !text.trim().is_empty());
			let Some(description) = description else {
				warn!(resource, action = %action, "no description for configured action");
				return Err(WardenError::MissingActionDescription {
					resource: resource.to_string(),
					action: action.clone(),
				});
			};

			let statuses: Vec<PermissionStatus> = roles
				.iter()
				.map(|role| PermissionStatus::from_rule(table.rule(role, resource, action)))
				.collect();

			by_action.insert(
				action.clone(),
				roles
					.iter()
					.map(|role| role.to_string())
					.zip(statuses.iter().cloned())
					.collect(),
			);

			rows.push(ReportRow {
				resource: resource.to_string(),
				action: action.clone(),
				description: description.to_string(),
				statuses,
			});
		}
	}

	let mut headers = vec![
		ReportColumn::label(RESOURCE_AREA_COLUMN),
		ReportColumn::label(PERMISSION_COLUMN),
		ReportColumn::label(PERMISSION_DESCRIPTION_COLUMN),
	];
	headers.extend(roles.iter().map(|role| ReportColumn::role(role)));

	debug!(
		roles = roles.len(),
		rows = rows.len(),
		"generated permission docs"
	);

	Ok(PermissionDocs {
		user_role_mode,
		permissions,
		headers,
		rows,
	})
}
