// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-based access control over a declarative permission table.
//!
//! This crate provides:
//! - [`PermissionTable`]: role → resource → action → [`PermissionRule`], validated
//!   against declared resources at build time and immutable afterwards
//! - [`PermissionEngine::has_permission`]: fail-closed allow/deny decisions for
//!   single-role or multi-role principals
//! - [`PermissionEngine::generate_permission_docs`]: a serializable matrix of
//!   every role's access to every configured action
//!
//! # Example
//!
//! ```
//! use warden_core::{
//! 	setup_permissions, ActionDocs, PermissionTable, PermissionsConfig, SingleRoleUser,
//! };
//!
//! struct Todo {
//! 	author_id: String,
//! }
//!
//! let table = PermissionTable::<SingleRoleUser, Todo>::builder()
//! 	.resource("todos", ["read", "delete"])
//! 	.role("admin", |g| {
//! 		g.allow("todos", "read").allow("todos", "delete");
//! 	})
//! 	.role("user", |g| {
//! 		g.allow("todos", "read").when_described(
//! 			"todos",
//! 			"delete",
//! 			"Only the author",
//! 			|user: &SingleRoleUser, todo: Option<&Todo>| todo.map(|t| t.author_id == user.id),
//! 		);
//! 	})
//! 	.build()
//! 	.unwrap();
//!
//! let docs = ActionDocs::new()
//! 	.describe("todos", "read", "View todo items")
//! 	.describe("todos", "delete", "Remove todo items");
//!
//! let engine = setup_permissions(PermissionsConfig::single_role(table).with_action_docs(docs));
//!
//! let user = SingleRoleUser::new("u1", "user");
//! let own = Todo { author_id: "u1".into() };
//! assert!(engine.has_permission(Some(&user), "todos", "delete", Some(&own)));
//! assert!(!engine.has_permission(None, "todos", "read", None));
//!
//! let report = engine.generate_permission_docs().unwrap();
//! assert_eq!(report.rows.len(), 2);
//! ```

pub mod action_docs;
pub mod engine;
pub mod error;
pub mod ordered;
pub mod report;
pub mod rule;
pub mod table;
pub mod types;

pub use action_docs::ActionDocs;
pub use engine::{setup_permissions, PermissionEngine, PermissionsConfig};
pub use error::{Result, WardenError};
pub use ordered::OrderedMap;
pub use report::{
	PermissionDocs, PermissionStatus, ReportColumn, ReportRow, DEFAULT_CONDITION_DESCRIPTION,
};
pub use rule::{Condition, PermissionRule, Predicate, PredicateOutcome};
pub use table::{PermissionTable, PermissionTableBuilder, RoleGrants, RoleGrantsBuilder};
pub use types::{AuthUser, MultiRoleUser, Principal, Role, SingleRoleUser, UserRoleMode};

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const ROLES: [&str; 4] = ["r0", "r1", "r2", "r3"];
	const RESOURCES: [&str; 2] = ["alpha", "beta"];
	const ACTIONS: [&str; 3] = ["read", "write", "delete"];
	const CELLS: usize = ROLES.len() * RESOURCES.len() * ACTIONS.len();

	/// `None` leaves the slot unconfigured.
	type Cells = Vec<Option<bool>>;

	fn cell(cells: &Cells, role: usize, resource: usize, action: usize) -> Option<bool> {
		cells[(role * RESOURCES.len() + resource) * ACTIONS.len() + action]
	}

	fn build_table(cells: &Cells) -> PermissionTable<AuthUser, ()> {
		let mut builder = PermissionTable::builder();
		for resource in RESOURCES {
			builder = builder.resource(resource, ACTIONS);
		}
		for (r, role) in ROLES.iter().enumerate() {
			builder = builder.role(*role, |g| {
				for (s, resource) in RESOURCES.iter().enumerate() {
					for (a, action) in ACTIONS.iter().enumerate() {
						if let Some(allowed) = cell(cells, r, s, a) {
							g.set(*resource, *action, allowed);
						}
					}
				}
			});
		}
		builder.build().unwrap()
	}

	fn docs() -> ActionDocs {
		let mut docs = ActionDocs::new();
		for resource in RESOURCES {
			for action in ACTIONS {
				docs.insert(resource, action, format!("{action} {resource}"));
			}
		}
		docs
	}

	fn single(role: &str) -> AuthUser {
		SingleRoleUser::new("u", role).into()
	}

	fn arb_cells() -> impl Strategy<Value = Cells> {
		prop::collection::vec(prop::option::of(any::<bool>()), CELLS)
	}

	proptest! {
		#[test]
		fn absent_principal_never_granted(cells in arb_cells()) {
			let single_engine = PermissionEngine::single_role(build_table(&cells));
			let multi_engine = PermissionEngine::multi_role(build_table(&cells));
			for resource in RESOURCES {
				for action in ACTIONS {
					prop_assert!(!single_engine.has_permission(None, resource, action, None));
					prop_assert!(!multi_engine.has_permission(None, resource, action, None));
				}
			}
		}

		#[test]
		fn single_role_matches_configured_cell(cells in arb_cells()) {
			let engine = PermissionEngine::single_role(build_table(&cells));
			for (r, role) in ROLES.iter().enumerate() {
				let user = single(role);
				for (s, resource) in RESOURCES.iter().enumerate() {
					for (a, action) in ACTIONS.iter().enumerate() {
						let expected = cell(&cells, r, s, a).unwrap_or(false);
						prop_assert_eq!(engine.has_permission(Some(&user), resource, action, None), expected);
					}
				}
			}
		}

		#[test]
		fn unspecified_slots_are_denied_in_report(cells in arb_cells()) {
			let engine = setup_permissions(
				PermissionsConfig::single_role(build_table(&cells)).with_action_docs(docs()),
			);
			let report = engine.generate_permission_docs().unwrap();
			for (r, role) in ROLES.iter().enumerate() {
				for (s, resource) in RESOURCES.iter().enumerate() {
					for (a, action) in ACTIONS.iter().enumerate() {
						let configured = (0..ROLES.len()).any(|other| cell(&cells, other, s, a).is_some());
						let status = report.status(resource, action, role);
						if !configured {
							prop_assert_eq!(status, None);
						} else if cell(&cells, r, s, a) != Some(true) {
							prop_assert_eq!(status, Some(&PermissionStatus::Denied));
						}
					}
				}
			}
		}

		#[test]
		fn multi_role_is_or_of_single_roles(
			cells in arb_cells(),
			first in 0..ROLES.len(),
			second in 0..ROLES.len(),
		) {
			let single_engine = PermissionEngine::single_role(build_table(&cells));
			let multi_engine = PermissionEngine::multi_role(build_table(&cells));
			let both: AuthUser = MultiRoleUser::new("u", [ROLES[first], ROLES[second]]).into();
			for resource in RESOURCES {
				for action in ACTIONS {
					let expected = single_engine.has_permission(Some(&single(ROLES[first])), resource, action, None)
						|| single_engine.has_permission(Some(&single(ROLES[second])), resource, action, None);
					prop_assert_eq!(multi_engine.has_permission(Some(&both), resource, action, None), expected);
				}
			}
		}

		#[test]
		fn report_lists_each_configured_pair_once(cells in arb_cells()) {
			let engine = setup_permissions(
				PermissionsConfig::multi_role(build_table(&cells)).with_action_docs(docs()),
			);
			let report = engine.generate_permission_docs().unwrap();
			for (s, resource) in RESOURCES.iter().enumerate() {
				for (a, action) in ACTIONS.iter().enumerate() {
					let configured = (0..ROLES.len()).any(|r| cell(&cells, r, s, a).is_some());
					let matching = report
						.rows
						.iter()
						.filter(|row| row.resource == *resource && row.action == *action)
						.count();
					prop_assert_eq!(matching, usize::from(configured));
				}
			}
			for row in &report.rows {
				prop_assert_eq!(row.statuses.len(), ROLES.len());
			}
		}

		#[test]
		fn report_is_deterministic(cells in arb_cells()) {
			let engine = setup_permissions(
				PermissionsConfig::single_role(build_table(&cells)).with_action_docs(docs()),
			);
			let first = engine.generate_permission_docs().unwrap();
			let second = engine.generate_permission_docs().unwrap();
			prop_assert_eq!(
				serde_json::to_string(&first).unwrap(),
				serde_json::to_string(&second).unwrap()
			);
			prop_assert_eq!(first, second);
		}
	}
}
