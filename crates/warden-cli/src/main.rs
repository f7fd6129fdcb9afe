// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden CLI - permission checks and permission reports
//!
//! This binary evaluates the built-in todo policy against principals given on
//! the command line, and renders the policy's permission report. The role mode
//! and action descriptions come from `warden.toml` and `WARDEN_*` variables.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use warden_config::{load_config, load_config_with_file, WardenConfig};
use warden_core::{
	setup_permissions, AuthUser, MultiRoleUser, PermissionDocs, PermissionEngine, PermissionsConfig,
	SingleRoleUser, UserRoleMode, WardenError,
};

mod logging;
mod policy;

use policy::{todo_policy, Todo};

/// Warden - attribute-based access control for the todo policy
#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long, env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the permission report for every role
	Docs {
		/// Output format
		#[arg(long, value_enum, default_value_t = DocsFormat::Json)]
		format: DocsFormat,
		/// Pretty-print JSON output
		#[arg(long)]
		pretty: bool,
	},
	/// Decide whether a principal may perform an action (exit status 1 when denied)
	Check {
		/// Resource name, e.g. `todos`
		#[arg(long)]
		resource: String,
		/// Action name, e.g. `delete`
		#[arg(long)]
		action: String,
		/// Role held by the principal (repeatable in multi-role mode)
		#[arg(long = "role")]
		roles: Vec<String>,
		/// Principal identifier handed to conditional rules
		#[arg(long, default_value = "cli")]
		user_id: String,
		/// Author of the todo being acted on
		#[arg(long)]
		author_id: Option<String>,
		/// Evaluate without an authenticated principal
		#[arg(long, conflicts_with_all = ["roles", "user_id"])]
		anonymous: bool,
	},
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DocsFormat {
	Json,
	Markdown,
}

fn main() -> Result<ExitCode> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => load_config_with_file(path),
		None => load_config(),
	}
	.context("failed to load configuration")?;

	logging::init(&config.logging);
	debug!(mode = %config.user_role_mode, "configuration resolved");

	let engine = build_engine(&config)?;

	match args.command {
		Command::Docs { format, pretty } => {
			let docs = engine.generate_permission_docs().map_err(docs_error)?;
			println!("{}", render_docs(&docs, format, pretty)?);
			Ok(ExitCode::SUCCESS)
		}
		Command::Check {
			resource,
			action,
			roles,
			user_id,
			author_id,
			anonymous,
		} => {
			let user = if anonymous {
				None
			} else {
				Some(principal(config.user_role_mode, user_id, roles)?)
			};
			let todo = author_id.map(|author_id| Todo { author_id });

			let granted = engine.has_permission(user.as_ref(), &resource, &action, todo.as_ref());
			info!(%resource, %action, granted, "check complete");
			println!("{}", if granted { "allowed" } else { "denied" });

			Ok(if granted {
				ExitCode::SUCCESS
			} else {
				ExitCode::from(1)
			})
		}
	}
}

fn build_engine(config: &WardenConfig) -> Result<PermissionEngine<AuthUser, Todo>> {
	let table = todo_policy().context("todo policy is invalid")?;
	let mut permissions = PermissionsConfig::new(config.user_role_mode, table);
	if let Some(docs) = &config.action_docs {
		permissions = permissions.with_action_docs(docs.clone());
	}
	Ok(setup_permissions(permissions))
}

fn docs_error(err: WardenError) -> anyhow::Error {
	let hint = match err {
		WardenError::MissingActionDocs => "no [actions] descriptions configured; add them to warden.toml",
		_ => "failed to generate permission docs",
	};
	anyhow::Error::new(err).context(hint)
}

/// Builds the principal shape matching the configured role mode.
fn principal(mode: UserRoleMode, user_id: String, roles: Vec<String>) -> Result<AuthUser> {
	match mode {
		UserRoleMode::MultiRole => Ok(MultiRoleUser::new(user_id, roles).into()),
		UserRoleMode::SingleRole => {
			let mut roles = roles.into_iter();
			let user = match roles.next() {
				Some(role) => SingleRoleUser::new(user_id, role),
				None => SingleRoleUser::without_role(user_id),
			};
			if roles.next().is_some() {
				bail!("single-role mode accepts at most one --role");
			}
			Ok(user.into())
		}
	}
}

fn render_docs(docs: &PermissionDocs, format: DocsFormat, pretty: bool) -> Result<String> {
	match format {
		DocsFormat::Json if pretty => Ok(serde_json::to_string_pretty(docs)?),
		DocsFormat::Json => Ok(serde_json::to_string(docs)?),
		DocsFormat::Markdown => Ok(render_markdown(docs)),
	}
}

fn render_markdown(docs: &PermissionDocs) -> String {
	let escape = |cell: &str| cell.replace('|', "\\|");
	let line = |cells: Vec<String>| format!("| {} |", cells.join(" | "));

	let mut lines = Vec::with_capacity(docs.rows.len() + 2);
	lines.push(line(docs.headers.iter().map(|h| escape(&h.key)).collect()));
	lines.push(line(docs.headers.iter().map(|_| "---".to_string()).collect()));
	for row in &docs.rows {
		lines.push(line(row.cells().iter().map(|c| escape(c)).collect()));
	}
	lines.join("\n")
}
