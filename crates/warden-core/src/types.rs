// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Principal and role definitions.
//!
//! - [`Role`]: an opaque role name; the permission table's keys are the only
//!   source of truth for which roles exist
//! - [`UserRoleMode`]: whether principals carry one role or a list of roles
//! - [`Principal`]: what the engine needs from an already-authenticated caller
//! - [`SingleRoleUser`], [`MultiRoleUser`], [`AuthUser`]: ready-made principals

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::WardenError;

// =============================================================================
// Roles
// =============================================================================

/// Name of a role, as used for the top-level keys of a permission table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for Role {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for Role {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Role {
	fn from(name: &str) -> Self {
		Self(name.to_string())
	}
}

impl From<String> for Role {
	fn from(name: String) -> Self {
		Self(name)
	}
}

// =============================================================================
// Role mode
// =============================================================================

/// Selects which role accessor of a [`Principal`] the engine consults.
///
/// Fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRoleMode {
	/// Each principal holds exactly one role.
	#[default]
	#[serde(alias = "single_role")]
	SingleRole,
	/// Each principal holds zero or more roles; any granting role wins.
	#[serde(alias = "multi_role")]
	MultiRole,
}

impl fmt::Display for UserRoleMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UserRoleMode::SingleRole => write!(f, "singleRole"),
			UserRoleMode::MultiRole => write!(f, "multiRole"),
		}
	}
}

impl FromStr for UserRoleMode {
	type Err = WardenError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
			"singlerole" | "single" => Ok(UserRoleMode::SingleRole),
			"multirole" | "multi" => Ok(UserRoleMode::MultiRole),
			_ => Err(WardenError::InvalidRoleMode(s.to_string())),
		}
	}
}

// =============================================================================
// Principals
// =============================================================================

/// An authenticated caller, as resolved by the identity provider.
///
/// The engine never authenticates. An unauthenticated caller is represented by
/// passing `None` instead of a principal.
pub trait Principal {
	/// The role consulted in [`UserRoleMode::SingleRole`].
	fn role(&self) -> Option<&Role>;

	/// The roles consulted in [`UserRoleMode::MultiRole`].
	fn roles(&self) -> &[Role];
}

/// Principal holding exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleRoleUser {
	pub id: String,
	pub role: Option<Role>,
}

impl SingleRoleUser {
	pub fn new(id: impl Into<String>, role: impl Into<Role>) -> Self {
		Self {
			id: id.into(),
			role: Some(role.into()),
		}
	}

	/// A principal whose identity resolved but whose role did not.
	pub fn without_role(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			role: None,
		}
	}
}

impl Principal for SingleRoleUser {
	fn role(&self) -> Option<&Role> {
		self.role.as_ref()
	}

	fn roles(&self) -> &[Role] {
		self.role.as_ref().map(std::slice::from_ref).unwrap_or(&[])
	}
}

/// Principal holding an ordered, possibly empty, list of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiRoleUser {
	pub id: String,
	#[serde(default)]
	pub roles: Vec<Role>,
}

impl MultiRoleUser {
	pub fn new<I, R>(id: impl Into<String>, roles: I) -> Self
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		Self {
			id: id.into(),
			roles: roles.into_iter().map(Into::into).collect(),
		}
	}
}

impl Principal for MultiRoleUser {
	/// Multi-role principals expose no single role, so single-role engines deny them.
	fn role(&self) -> Option<&Role> {
		None
	}

	fn roles(&self) -> &[Role] {
		&self.roles
	}
}

/// Either principal shape, for callers that only learn the shape at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthUser {
	Single(SingleRoleUser),
	Multi(MultiRoleUser),
}

impl AuthUser {
	/// The opaque identifier passed through to conditional predicates.
	pub fn id(&self) -> &str {
		match self {
			AuthUser::Single(user) => &user.id,
			AuthUser::Multi(user) => &user.id,
		}
	}
}

impl Principal for AuthUser {
	fn role(&self) -> Option<&Role> {
		match self {
			AuthUser::Single(user) => user.role(),
			AuthUser::Multi(user) => user.role(),
		}
	}

	fn roles(&self) -> &[Role] {
		match self {
			AuthUser::Single(user) => user.roles(),
			AuthUser::Multi(user) => user.roles(),
		}
	}
}

impl From<SingleRoleUser> for AuthUser {
	fn from(user: SingleRoleUser) -> Self {
		AuthUser::Single(user)
	}
}

impl From<MultiRoleUser> for AuthUser {
	fn from(user: MultiRoleUser) -> Self {
		AuthUser::Multi(user)
	}
}
