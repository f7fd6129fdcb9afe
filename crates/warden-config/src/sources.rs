// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};
use warden_core::UserRoleMode;

use crate::error::ConfigError;
use crate::layer::WardenConfigLayer;
use crate::sections::{LogFormat, LoggingConfigLayer};

pub const DEFAULT_CONFIG_PATH: &str = "warden.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<WardenConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(WardenConfigLayer {
			user_role_mode: Some(UserRoleMode::SingleRole),
			..Default::default()
		})
	}
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `./warden.toml`, relative to the working directory.
	pub fn local() -> Self {
		Self::new(DEFAULT_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(WardenConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: WardenConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: WARDEN_<FIELD>, WARDEN_LOG_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_from_vars(|name| std::env::var(name).ok())
	}
}

fn load_from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<WardenConfigLayer, ConfigError> {
	let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

	let user_role_mode = match var("WARDEN_USER_ROLE_MODE") {
		Some(v) => Some(v.parse::<UserRoleMode>().map_err(|e| ConfigError::InvalidValue {
			key: "WARDEN_USER_ROLE_MODE".to_string(),
			message: e.to_string(),
		})?),
		None => None,
	};

	let format = match var("WARDEN_LOG_FORMAT") {
		Some(v) => Some(v.parse::<LogFormat>().map_err(|message| ConfigError::InvalidValue {
			key: "WARDEN_LOG_FORMAT".to_string(),
			message,
		})?),
		None => None,
	};

	Ok(WardenConfigLayer {
		user_role_mode,
		logging: Some(LoggingConfigLayer {
			level: var("WARDEN_LOG_LEVEL"),
			format,
		}),
		actions: None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name: &str| map.get(name).cloned()
	}

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_defaults_pick_single_role() {
		let layer = DefaultsSource.load().unwrap();
		assert_eq!(layer.user_role_mode, Some(UserRoleMode::SingleRole));
		assert!(layer.actions.is_none());
	}

	#[test]
	fn test_missing_file_is_empty_layer() {
		let dir = tempfile::tempdir().unwrap();
		let layer = TomlSource::new(dir.path().join("absent.toml")).load().unwrap();
		assert!(layer.user_role_mode.is_none());
		assert!(layer.actions.is_none());
	}

	#[test]
	fn test_toml_file_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"user_role_mode = \"multiRole\"\n\n[actions.todos]\nread = \"View todo items\""
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.user_role_mode, Some(UserRoleMode::MultiRole));
		assert_eq!(
			layer.actions.unwrap().description("todos", "read"),
			Some("View todo items")
		);
	}

	#[test]
	fn test_invalid_toml_reports_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "user_role_mode = [").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		match err {
			ConfigError::TomlParse { path, .. } => assert_eq!(path, file.path()),
			other => panic!("expected TomlParse, got {other:?}"),
		}
	}

	#[test]
	fn test_env_values_parsed() {
		let layer = load_from_vars(vars(&[
			("WARDEN_USER_ROLE_MODE", "multi_role"),
			("WARDEN_LOG_LEVEL", "warden=trace"),
			("WARDEN_LOG_FORMAT", "json"),
		]))
		.unwrap();
		assert_eq!(layer.user_role_mode, Some(UserRoleMode::MultiRole));
		let logging = layer.logging.unwrap();
		assert_eq!(logging.level.as_deref(), Some("warden=trace"));
		assert_eq!(logging.format, Some(LogFormat::Json));
	}

	#[test]
	fn test_empty_env_values_ignored() {
		let layer = load_from_vars(vars(&[("WARDEN_USER_ROLE_MODE", "")])).unwrap();
		assert!(layer.user_role_mode.is_none());
	}

	#[test]
	fn test_invalid_env_role_mode() {
		let err = load_from_vars(vars(&[("WARDEN_USER_ROLE_MODE", "everyone")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "WARDEN_USER_ROLE_MODE"));
	}

	#[test]
	fn test_invalid_env_log_format() {
		let err = load_from_vars(vars(&[("WARDEN_LOG_FORMAT", "xml")])).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "WARDEN_LOG_FORMAT"));
	}
}
