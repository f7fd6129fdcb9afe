// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission decision engine.
//!
//! [`setup_permissions`] closes over a role mode, a [`PermissionTable`] and
//! optional [`ActionDocs`], returning a [`PermissionEngine`] that exposes the
//! two operations:
//!
//! 1. [`PermissionEngine::has_permission`]: allow/deny for one principal
//! 2. [`PermissionEngine::generate_permission_docs`]: the full report
//!
//! Both are pure over the captured configuration. The engine is cheap to
//! clone and can be shared across threads without locking.
//!
//! Every gap denies: no principal, no role, an unknown role, resource or
//! action, or a predicate that cannot decide.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::action_docs::ActionDocs;
use crate::error::Result;
use crate::report::{self, PermissionDocs};
use crate::table::PermissionTable;
use crate::types::{Principal, Role, UserRoleMode};

/// Everything the setup call needs.
pub struct PermissionsConfig<P, D> {
	pub user_role_mode: UserRoleMode,
	pub permissions: PermissionTable<P, D>,
	/// Only required by [`PermissionEngine::generate_permission_docs`].
	pub action_docs: Option<ActionDocs>,
}

impl<P, D> PermissionsConfig<P, D> {
	pub fn new(user_role_mode: UserRoleMode, permissions: PermissionTable<P, D>) -> Self {
		Self {
			user_role_mode,
			permissions,
			action_docs: None,
		}
	}

	pub fn single_role(permissions: PermissionTable<P, D>) -> Self {
		Self::new(UserRoleMode::SingleRole, permissions)
	}

	pub fn multi_role(permissions: PermissionTable<P, D>) -> Self {
		Self::new(UserRoleMode::MultiRole, permissions)
	}

	/// Builder: attach action descriptions for report generation.
	pub fn with_action_docs(mut self, action_docs: ActionDocs) -> Self {
		self.action_docs = Some(action_docs);
		self
	}
}

/// Builds an engine over a fixed configuration.
pub fn setup_permissions<P, D>(config: PermissionsConfig<P, D>) -> PermissionEngine<P, D>
where
	P: Principal,
{
	PermissionEngine::from_config(config)
}

struct EngineState<P, D> {
	user_role_mode: UserRoleMode,
	table: PermissionTable<P, D>,
	action_docs: Option<ActionDocs>,
}

/// Stateless decision and report engine bound to one configuration.
pub struct PermissionEngine<P, D> {
	inner: Arc<EngineState<P, D>>,
}

impl<P, D> Clone for PermissionEngine<P, D> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<P, D> fmt::Debug for PermissionEngine<P, D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PermissionEngine")
			.field("user_role_mode", &self.inner.user_role_mode)
			.field("table", &self.inner.table)
			.field("has_action_docs", &self.inner.action_docs.is_some())
			.finish()
	}
}

impl<P, D> PermissionEngine<P, D>
where
	P: Principal,
{
	pub fn from_config(config: PermissionsConfig<P, D>) -> Self {
		debug!(
			mode = %config.user_role_mode,
			roles = config.permissions.roles().count(),
			has_action_docs = config.action_docs.is_some(),
			"permission engine configured"
		);
		Self {
			inner: Arc::new(EngineState {
				user_role_mode: config.user_role_mode,
				table: config.permissions,
				action_docs: config.action_docs,
			}),
		}
	}

	/// Engine whose principals carry exactly one role.
	pub fn single_role(permissions: PermissionTable<P, D>) -> Self {
		Self::from_config(PermissionsConfig::single_role(permissions))
	}

	/// Engine whose principals carry a list of roles.
	pub fn multi_role(permissions: PermissionTable<P, D>) -> Self {
		Self::from_config(PermissionsConfig::multi_role(permissions))
	}

	pub fn user_role_mode(&self) -> UserRoleMode {
		self.inner.user_role_mode
	}

	pub fn table(&self) -> &PermissionTable<P, D> {
		&self.inner.table
	}

	pub fn action_docs(&self) -> Option<&ActionDocs> {
		self.inner.action_docs.as_ref()
	}

	/// Decides whether `user` may perform `action` on `resource`.
	///
	/// # Arguments
	///
	/// * `user` - The authenticated principal, or `None` when unauthenticated
	/// * `resource` - Resource name as declared in the table
	/// * `action` - Action name as declared for that resource
	/// * `data` - Resource instance data, handed to conditional predicates
	///
	/// # Returns
	///
	/// `true` only if a configured rule grants access. In multi-role mode any
	/// single granting role is enough.
	///
	/// # Panics
	///
	/// Panics raised by conditional predicates propagate unchanged.
	#[instrument(
		level = "debug",
		skip(self, user, data),
		fields(mode = %self.inner.user_role_mode)
	)]
	pub fn has_permission(
		&self,
		user: Option<&P>,
		resource: &str,
		action: &str,
		data: Option<&D>,
	) -> bool {
		let Some(user) = user else {
			debug!("denied: no authenticated principal");
			return false;
		};

		let granted = match self.inner.user_role_mode {
			UserRoleMode::MultiRole => {
				let roles = user.roles();
				if roles.is_empty() {
					debug!("denied: principal holds no roles");
					return false;
				}
				roles
					.iter()
					.any(|role| self.evaluate_role(role, user, resource, action, data))
			}
			UserRoleMode::SingleRole => match user.role() {
				Some(role) if !role.as_str().is_empty() => {
					self.evaluate_role(role, user, resource, action, data)
				}
				_ => {
					debug!("denied: principal holds no role");
					return false;
				}
			},
		};

		debug!(granted, "permission decided");
		granted
	}

	fn evaluate_role(
		&self,
		role: &Role,
		user: &P,
		resource: &str,
		action: &str,
		data: Option<&D>,
	) -> bool {
		let Some(rule) = self.inner.table.rule(role.as_str(), resource, action) else {
			trace!(role = %role, "no rule configured");
			return false;
		};
		let granted = rule.evaluate(user, data);
		trace!(role = %role, conditional = rule.is_conditional(), granted, "rule evaluated");
		granted
	}

	/// Renders the whole table as a [`PermissionDocs`] report.
	///
	/// Fails with [`crate::WardenError::MissingActionDocs`] when the engine was
	/// configured without action descriptions.
	pub fn generate_permission_docs(&self) -> Result<PermissionDocs> {
		report::generate(
			self.inner.user_role_mode,
			&self.inner.table,
			self.inner.action_docs.as_ref(),
		)
	}
}
