// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for Warden.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - The role mode and action descriptions handed to `warden_core::setup_permissions`
//! - Logging settings for binaries
//!
//! The permission table itself is code, not configuration.
//!
//! # Usage
//!
//! ```ignore
//! use warden_config::load_config;
//!
//! let config = load_config()?;
//! println!("role mode: {}", config.user_role_mode);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::WardenConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, DEFAULT_CONFIG_PATH,
};

use std::path::PathBuf;

use tracing::{debug, info};
use warden_core::{ActionDocs, UserRoleMode};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WardenConfig {
	pub user_role_mode: UserRoleMode,
	/// `None` when no `[actions]` table was configured anywhere.
	pub action_docs: Option<ActionDocs>,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_*`)
/// 2. Config file (`./warden.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<WardenConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::local()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<WardenConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<WardenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = WardenConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: WardenConfigLayer) -> Result<WardenConfig, ConfigError> {
	let user_role_mode = layer.user_role_mode.unwrap_or_default();
	let logging = layer.logging.unwrap_or_default().finalize();
	let action_docs = layer.actions;

	if let Some(docs) = &action_docs {
		validate_action_docs(docs)?;
	}

	info!(
		user_role_mode = %user_role_mode,
		described_actions = action_docs.as_ref().map(ActionDocs::len).unwrap_or(0),
		log_format = %logging.format,
		"Warden configuration loaded"
	);

	Ok(WardenConfig {
		user_role_mode,
		action_docs,
		logging,
	})
}

/// Descriptions label report rows, so a blank one is as bad as a missing one.
fn validate_action_docs(docs: &ActionDocs) -> Result<(), ConfigError> {
	for (resource, action, description) in docs.iter() {
		if description.trim().is_empty() {
			return Err(ConfigError::Validation(format!(
				"description for action '{resource}.{action}' is empty"
			)));
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	struct FixedSource {
		precedence: Precedence,
		layer: WardenConfigLayer,
	}

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.precedence
		}

		fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
			Ok(self.layer.clone())
		}
	}

	fn fixed(precedence: Precedence, user_role_mode: UserRoleMode) -> Box<dyn ConfigSource> {
		Box::new(FixedSource {
			precedence,
			layer: WardenConfigLayer {
				user_role_mode: Some(user_role_mode),
				..Default::default()
			},
		})
	}

	#[test]
	fn test_sources_applied_by_precedence_not_position() {
		let config = load_from_sources(vec![
			fixed(Precedence::Environment, UserRoleMode::MultiRole),
			fixed(Precedence::Defaults, UserRoleMode::SingleRole),
		])
		.unwrap();
		assert_eq!(config.user_role_mode, UserRoleMode::MultiRole);
	}

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(WardenConfigLayer::default()).unwrap();
		assert_eq!(config, WardenConfig::default());
		assert!(config.action_docs.is_none());
	}

	#[test]
	fn test_blank_description_rejected() {
		let layer = WardenConfigLayer {
			actions: Some(ActionDocs::new().describe("todos", "read", "   ")),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("todos.read")));
	}

	#[test]
	fn test_file_overrides_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("warden.toml");
		std::fs::write(
			&path,
			"user_role_mode = \"multiRole\"\n\n[actions.todos]\nread = \"View todo items\"\n",
		)
		.unwrap();

		let sources: Vec<Box<dyn ConfigSource>> =
			vec![Box::new(DefaultsSource), Box::new(TomlSource::new(&path))];
		let config = load_from_sources(sources).unwrap();
		assert_eq!(config.user_role_mode, UserRoleMode::MultiRole);
		assert_eq!(
			config.action_docs.unwrap().description("todos", "read"),
			Some("View todo items")
		);
	}
}
