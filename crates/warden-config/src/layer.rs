// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;
use warden_core::{ActionDocs, UserRoleMode};

use crate::sections::LoggingConfigLayer;

/// Warden configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WardenConfigLayer {
	#[serde(default)]
	pub user_role_mode: Option<UserRoleMode>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	/// Replaced as a whole by a higher-precedence layer, never merged per action.
	#[serde(default)]
	pub actions: Option<ActionDocs>,
}

impl WardenConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: WardenConfigLayer) {
		if other.user_role_mode.is_some() {
			self.user_role_mode = other.user_role_mode;
		}
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		if other.actions.is_some() {
			self.actions = other.actions;
		}
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
