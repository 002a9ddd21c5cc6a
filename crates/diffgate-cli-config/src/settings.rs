// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered runtime settings.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML config file,
//! environment variables, CLI flags. An explicit mailbox directory at any
//! layer beats the per-user default, so two sessions on one machine can be
//! isolated by pointing them at different directories.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::paths::{expand_home, PathsConfig};
use crate::ConfigError;

/// Session-scoped mailbox directory override.
pub const MAILBOX_DIR_ENV: &str = "DIFFGATE_MAILBOX_DIR";
/// Reviewer deadline in seconds.
pub const TIMEOUT_ENV: &str = "DIFFGATE_APPROVAL_TIMEOUT_SECS";
/// Mailbox poll interval in milliseconds.
pub const POLL_INTERVAL_ENV: &str = "DIFFGATE_POLL_INTERVAL_MS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Longest reviewer deadline accepted from any layer: one day.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;
const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// One source of settings. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
	pub mailbox_dir: Option<PathBuf>,
	pub timeout_secs: Option<u64>,
	pub poll_interval_ms: Option<u64>,
	pub workspace_root: Option<PathBuf>,
}

impl SettingsLayer {
	/// Overlays `higher` on top of `self`.
	pub fn merge(self, higher: SettingsLayer) -> SettingsLayer {
		SettingsLayer {
			mailbox_dir: higher.mailbox_dir.or(self.mailbox_dir),
			timeout_secs: higher.timeout_secs.or(self.timeout_secs),
			poll_interval_ms: higher.poll_interval_ms.or(self.poll_interval_ms),
			workspace_root: higher.workspace_root.or(self.workspace_root),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
	#[serde(default)]
	approval: SettingsLayer,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub mailbox_dir: PathBuf,
	pub approval_timeout: Duration,
	pub poll_interval: Duration,
	pub workspace_root: PathBuf,
}

impl Settings {
	/// Folds `layers` (lowest precedence first) over the defaults and
	/// validates the result.
	pub fn resolve(
		paths: &PathsConfig,
		layers: impl IntoIterator<Item = SettingsLayer>,
	) -> Result<Self, ConfigError> {
		let merged = layers
			.into_iter()
			.fold(SettingsLayer::default(), SettingsLayer::merge);

		let mailbox_dir = merged
			.mailbox_dir
			.map(|dir| expand_home(&dir))
			.unwrap_or_else(|| paths.default_mailbox_dir());
		let workspace_root = match merged.workspace_root {
			Some(root) => expand_home(&root),
			None => std::env::current_dir()?,
		};

		let settings = Settings {
			mailbox_dir,
			approval_timeout: Duration::from_secs(merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
			poll_interval: Duration::from_millis(
				merged.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
			),
			workspace_root,
		};
		settings.validate()?;

		tracing::debug!(
				mailbox_dir = %settings.mailbox_dir.display(),
				timeout_secs = settings.approval_timeout.as_secs(),
				poll_interval_ms = settings.poll_interval.as_millis() as u64,
				workspace_root = %settings.workspace_root.display(),
				"resolved settings"
		);
		Ok(settings)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.approval_timeout.is_zero() {
			return Err(ConfigError::invalid_value("timeout_secs", "must be greater than zero"));
		}
		if self.approval_timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
			return Err(ConfigError::invalid_value(
				"timeout_secs",
				format!("must not exceed {MAX_TIMEOUT_SECS}"),
			));
		}
		if self.poll_interval.is_zero() {
			return Err(ConfigError::invalid_value(
				"poll_interval_ms",
				"must be greater than zero",
			));
		}
		if self.poll_interval > self.approval_timeout {
			return Err(ConfigError::validation(
				"poll interval must not exceed the approval timeout",
			));
		}
		if self.mailbox_dir.as_os_str().is_empty() {
			return Err(ConfigError::invalid_value("mailbox_dir", "must not be empty"));
		}
		Ok(())
	}
}

/// Reads the `[approval]` table of a config file. A missing file yields an
/// empty layer.
pub fn file_layer(path: &Path) -> Result<SettingsLayer, ConfigError> {
	let contents = match std::fs::read_to_string(path) {
		Ok(contents) => contents,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
			tracing::debug!(path = %path.display(), "no config file");
			return Ok(SettingsLayer::default());
		}
		Err(e) => return Err(e.into()),
	};

	let config: FileConfig = toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
		path: path.to_path_buf(),
		source,
	})?;
	tracing::debug!(path = %path.display(), "loaded config file");
	Ok(config.approval)
}

/// Reads the `DIFFGATE_*` variables from the process environment.
pub fn env_layer() -> Result<SettingsLayer, ConfigError> {
	env_layer_from(|key| std::env::var(key).ok())
}

pub fn env_layer_from(env: impl Fn(&str) -> Option<String>) -> Result<SettingsLayer, ConfigError> {
	let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

	let parse_u64 = |key: &str| -> Result<Option<u64>, ConfigError> {
		non_empty(key)
			.map(|raw| {
				raw.trim()
					.parse::<u64>()
					.map_err(|e| ConfigError::Env(format!("{key}={raw}: {e}")))
			})
			.transpose()
	};

	Ok(SettingsLayer {
		mailbox_dir: non_empty(MAILBOX_DIR_ENV).map(PathBuf::from),
		timeout_secs: parse_u64(TIMEOUT_ENV)?,
		poll_interval_ms: parse_u64(POLL_INTERVAL_ENV)?,
		workspace_root: None,
	})
}
