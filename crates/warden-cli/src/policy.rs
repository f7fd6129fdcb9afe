// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The todo application policy served by the `warden` binary.

use warden_core::{AuthUser, PermissionTable, Result};

/// Instance data for the `todos` resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
	pub author_id: String,
}

pub const TODOS: &str = "todos";
pub const BETA_RESOURCE: &str = "betaResource";

pub fn todo_policy() -> Result<PermissionTable<AuthUser, Todo>> {
	PermissionTable::builder()
		.resource(TODOS, ["read", "write", "delete"])
		.resource(BETA_RESOURCE, ["view"])
		.role("admin", |g| {
			g.allow(TODOS, "read")
				.allow(TODOS, "write")
				.allow(TODOS, "delete");
		})
		.role("moderator", |g| {
			g.allow(TODOS, "read")
				.deny(TODOS, "write")
				.deny(TODOS, "delete");
		})
		.role("user", |g| {
			g.allow(TODOS, "read").deny(TODOS, "write").when_described(
				TODOS,
				"delete",
				"Only the author of the todo",
				|user: &AuthUser, todo: Option<&Todo>| todo.map(|t| t.author_id == user.id()),
			);
		})
		.role("betaTester", |g| {
			g.allow(BETA_RESOURCE, "view");
		})
		.build()
}
