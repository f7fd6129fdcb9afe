// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission table: role → resource → action → [`PermissionRule`].
//!
//! Tables are assembled with [`PermissionTableBuilder`], which checks every
//! grant against the declared resources and their actions before anything is
//! evaluated. Once built, a table is never mutated.
//!
//! Lookups go through hash maps. The configured order of roles, resources and
//! actions is kept separately because permission reports must reproduce it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::warn;

use crate::error::{Result, WardenError};
use crate::ordered::OrderedMap;
use crate::rule::{Condition, PermissionRule, PredicateOutcome};
use crate::types::Role;

/// Every rule configured for a single role.
pub struct RoleGrants<P, D> {
	role: Role,
	rules: HashMap<String, HashMap<String, PermissionRule<P, D>>>,
	layout: OrderedMap<Vec<String>>,
}

impl<P, D> RoleGrants<P, D> {
	pub fn role(&self) -> &Role {
		&self.role
	}

	pub fn rule(&self, resource: &str, action: &str) -> Option<&PermissionRule<P, D>> {
		self.rules.get(resource)?.get(action)
	}

	/// Configured resources and their actions, in configuration order.
	pub fn layout(&self) -> impl Iterator<Item = (&str, &[String])> {
		self
			.layout
			.iter()
			.map(|(resource, actions)| (resource, actions.as_slice()))
	}
}

/// Immutable permission table.
pub struct PermissionTable<P, D> {
	resources: OrderedMap<Vec<String>>,
	grants: Vec<RoleGrants<P, D>>,
	index: HashMap<Role, usize>,
}

impl<P, D> PermissionTable<P, D> {
	pub fn builder() -> PermissionTableBuilder<P, D> {
		PermissionTableBuilder::new()
	}

	/// Roles in configuration order.
	pub fn roles(&self) -> impl Iterator<Item = &Role> {
		self.grants.iter().map(RoleGrants::role)
	}

	pub fn grants(&self) -> impl Iterator<Item = &RoleGrants<P, D>> {
		self.grants.iter()
	}

	pub fn role_grants(&self, role: &str) -> Option<&RoleGrants<P, D>> {
		self.index.get(role).map(|&idx| &self.grants[idx])
	}

	/// Looks up the configured rule. `None` means no rule, which denies.
	pub fn rule(&self, role: &str, resource: &str, action: &str) -> Option<&PermissionRule<P, D>> {
		self.role_grants(role)?.rule(resource, action)
	}

	/// Declared resources in declaration order.
	pub fn resources(&self) -> impl Iterator<Item = &str> {
		self.resources.keys()
	}

	pub fn declared_actions(&self, resource: &str) -> Option<&[String]> {
		self.resources.get(resource).map(Vec::as_slice)
	}
}

impl<P, D> fmt::Debug for PermissionTable<P, D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PermissionTable")
			.field("resources", &self.resources)
			.field("roles", &self.roles().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

struct Grant<P, D> {
	resource: String,
	action: String,
	rule: PermissionRule<P, D>,
}

/// Collects the grants of one role inside [`PermissionTableBuilder::role`].
pub struct RoleGrantsBuilder<P, D> {
	grants: Vec<Grant<P, D>>,
}

impl<P, D> RoleGrantsBuilder<P, D> {
	fn new() -> Self {
		Self { grants: Vec::new() }
	}

	pub fn set(
		&mut self,
		resource: impl Into<String>,
		action: impl Into<String>,
		rule: impl Into<PermissionRule<P, D>>,
	) -> &mut Self {
		self.grants.push(Grant {
			resource: resource.into(),
			action: action.into(),
			rule: rule.into(),
		});
		self
	}

	pub fn allow(&mut self, resource: impl Into<String>, action: impl Into<String>) -> &mut Self {
		self.set(resource, action, PermissionRule::Allowed)
	}

	pub fn deny(&mut self, resource: impl Into<String>, action: impl Into<String>) -> &mut Self {
		self.set(resource, action, PermissionRule::Denied)
	}

	pub fn when<F, O>(
		&mut self,
		resource: impl Into<String>,
		action: impl Into<String>,
		predicate: F,
	) -> &mut Self
	where
		P: 'static,
		D: 'static,
		F: Fn(&P, Option<&D>) -> O + Send + Sync + 'static,
		O: PredicateOutcome,
	{
		self.set(resource, action, Condition::new(predicate))
	}

	pub fn when_described<F, O>(
		&mut self,
		resource: impl Into<String>,
		action: impl Into<String>,
		description: impl Into<String>,
		predicate: F,
	) -> &mut Self
	where
		P: 'static,
		D: 'static,
		F: Fn(&P, Option<&D>) -> O + Send + Sync + 'static,
		O: PredicateOutcome,
	{
		self.set(
			resource,
			action,
			Condition::new(predicate).describe(description),
		)
	}
}

/// Builder for [`PermissionTable`].
///
/// ```
/// use warden_core::{PermissionTable, SingleRoleUser};
///
/// let table = PermissionTable::<SingleRoleUser, ()>::builder()
/// 	.resource("todos", ["read", "write"])
/// 	.role("admin", |g| {
/// 		g.allow("todos", "read").allow("todos", "write");
/// 	})
/// 	.role("guest", |g| {
/// 		g.allow("todos", "read");
/// 	})
/// 	.build()
/// 	.unwrap();
///
/// assert_eq!(table.roles().count(), 2);
/// ```
pub struct PermissionTableBuilder<P, D> {
	resources: OrderedMap<Vec<String>>,
	roles: Vec<(Role, RoleGrantsBuilder<P, D>)>,
}

impl<P, D> Default for PermissionTableBuilder<P, D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<P, D> PermissionTableBuilder<P, D> {
	pub fn new() -> Self {
		Self {
			resources: OrderedMap::new(),
			roles: Vec::new(),
		}
	}

	/// Declares a resource and the actions valid on it. Declaring the same
	/// resource again adds to its actions.
	pub fn resource<I, S>(mut self, name: impl Into<String>, actions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let name = name.into();
		let declared = self.resources.get_or_insert_with(&name, Vec::new);
		for action in actions {
			let action = action.into();
			if !declared.contains(&action) {
				declared.push(action);
			}
		}
		self
	}

	/// Adds a role. Roles appear in reports in the order they are added.
	pub fn role(
		mut self,
		role: impl Into<Role>,
		configure: impl FnOnce(&mut RoleGrantsBuilder<P, D>),
	) -> Self {
		let mut grants = RoleGrantsBuilder::new();
		configure(&mut grants);
		self.roles.push((role.into(), grants));
		self
	}

	/// Validates every grant against the declared resources and freezes the table.
	pub fn build(self) -> Result<PermissionTable<P, D>> {
		let mut grants = Vec::with_capacity(self.roles.len());
		let mut index = HashMap::with_capacity(self.roles.len());

		for (role, builder) in self.roles {
			if role.as_str().trim().is_empty() {
				warn!("rejecting permission table: empty role name");
				return Err(WardenError::EmptyRole);
			}

			if index.contains_key(&role) {
				warn!(role = %role, "rejecting permission table: duplicate role");
				return Err(WardenError::DuplicateRole(role.into_inner()));
			}

			let mut rules: HashMap<String, HashMap<String, PermissionRule<P, D>>> = HashMap::new();
			let mut layout: OrderedMap<Vec<String>> = OrderedMap::new();
			let mut seen: HashSet<(String, String)> = HashSet::new();

			for grant in builder.grants {
				validate_grant(&self.resources, &role, &grant.resource, &grant.action)?;

				if !seen.insert((grant.resource.clone(), grant.action.clone())) {
					warn!(
						role = %role,
						resource = %grant.resource,
						action = %grant.action,
						"rejecting permission table: duplicate rule"
					);
					return Err(WardenError::DuplicateRule {
						role: role.to_string(),
						resource: grant.resource,
						action: grant.action,
					});
				}

				layout
					.get_or_insert_with(&grant.resource, Vec::new)
					.push(grant.action.clone());
				rules
					.entry(grant.resource)
					.or_default()
					.insert(grant.action, grant.rule);
			}

			index.insert(role.clone(), grants.len());
			grants.push(RoleGrants {
				role,
				rules,
				layout,
			});
		}

		Ok(PermissionTable {
			resources: self.resources,
			grants,
			index,
		})
	}
}

fn validate_grant(
	resources: &OrderedMap<Vec<String>>,
	role: &Role,
	resource: &str,
	action: &str,
) -> Result<()> {
	let Some(actions) = resources.get(resource) else {
		warn!(role = %role, resource, "rejecting permission table: undeclared resource");
		return Err(WardenError::UnknownResource {
			role: role.to_string(),
			resource: resource.to_string(),
		});
	};

	if !actions.iter().any(|a| a == action) {
		warn!(role = %role, resource, action, "rejecting permission table: undeclared action");
		return Err(WardenError::UnknownAction {
			role: role.to_string(),
			resource: resource.to_string(),
			action: action.to_string(),
		});
	}

	Ok(())
}
