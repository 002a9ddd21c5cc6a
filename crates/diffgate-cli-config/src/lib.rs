// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for diffgate.
//!
//! This crate provides:
//! - XDG Base Directory compliant path resolution
//! - Mailbox directory precedence (explicit override, then per-user data dir)
//! - Layered settings from defaults, TOML file, environment and CLI

pub mod error;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use paths::PathsConfig;
pub use settings::{
	Settings, SettingsLayer, MAILBOX_DIR_ENV, MAX_TIMEOUT_SECS, POLL_INTERVAL_ENV, TIMEOUT_ENV,
};

/// Load settings with default precedence, CLI flags taking priority.
///
/// `config_file` replaces the user config path when given; a missing file is
/// not an error.
pub fn load_settings(
	cli: SettingsLayer,
	config_file: Option<&std::path::Path>,
) -> Result<Settings, ConfigError> {
	let paths = paths::resolve_xdg_paths()?;
	let file_path = config_file
		.map(|p| p.to_path_buf())
		.unwrap_or_else(|| paths.user_config_file.clone());

	let file = settings::file_layer(&file_path)?;
	let env = settings::env_layer()?;

	Settings::resolve(&paths, [file, env, cli])
}
