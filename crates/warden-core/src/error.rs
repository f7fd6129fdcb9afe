// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WardenError>;

/// Errors raised by table construction and report generation.
///
/// Denied permissions are never errors: every lookup gap resolves to `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WardenError {
	#[error("role '{role}' grants on undeclared resource '{resource}'")]
	UnknownResource { role: String, resource: String },

	#[error("role '{role}' grants undeclared action '{action}' on resource '{resource}'")]
	UnknownAction {
		role: String,
		resource: String,
		action: String,
	},

	#[error("role names must not be empty")]
	EmptyRole,

	#[error("role '{0}' is configured more than once")]
	DuplicateRole(String),

	#[error("role '{role}' configures '{resource}.{action}' more than once")]
	DuplicateRule {
		role: String,
		resource: String,
		action: String,
	},

	#[error("invalid user role mode '{0}': expected 'singleRole' or 'multiRole'")]
	InvalidRoleMode(String),

	#[error("action descriptions are required to generate permission docs")]
	MissingActionDocs,

	#[error("no description configured for action '{resource}.{action}'")]
	MissingActionDescription { resource: String, action: String },
}
