// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::ConfigError;

const APP_DIR: &str = "diffgate";

/// Resolved XDG paths for diffgate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// User config file: ~/.config/diffgate/config.toml
	pub user_config_file: PathBuf,
	/// Data directory: ~/.local/share/diffgate/
	pub data_dir: PathBuf,
	/// State directory: ~/.local/state/diffgate/
	pub state_dir: PathBuf,
}

impl PathsConfig {
	/// Default mailbox shared with the reviewer, used when no override is
	/// configured.
	pub fn default_mailbox_dir(&self) -> PathBuf {
		self.data_dir.join("mailbox")
	}
}

/// Resolve XDG paths according to the Base Directory Specification.
///
/// Uses environment variables if set, otherwise falls back to defaults:
/// - XDG_CONFIG_HOME or ~/.config
/// - XDG_DATA_HOME or ~/.local/share
/// - XDG_STATE_HOME or ~/.local/state
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
	Ok(resolve_xdg_paths_from(&home, |key| std::env::var_os(key)))
}

/// Same as [`resolve_xdg_paths`] with an explicit home directory and
/// environment lookup.
pub fn resolve_xdg_paths_from(home: &Path, env: impl Fn(&str) -> Option<OsString>) -> PathsConfig {
	let xdg = |key: &str, fallback: &str| {
		env(key)
			.filter(|v| !v.is_empty())
			.map(PathBuf::from)
			.unwrap_or_else(|| home.join(fallback))
	};

	let config_home = xdg("XDG_CONFIG_HOME", ".config");
	let data_home = xdg("XDG_DATA_HOME", ".local/share");
	let state_home = xdg("XDG_STATE_HOME", ".local/state");

	tracing::debug!(
			config_home = %config_home.display(),
			data_home = %data_home.display(),
			state_home = %state_home.display(),
			"resolved XDG paths"
	);

	PathsConfig {
		user_config_file: config_home.join(APP_DIR).join("config.toml"),
		data_dir: data_home.join(APP_DIR),
		state_dir: state_home.join(APP_DIR),
	}
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
	match path.strip_prefix("~") {
		Ok(rest) => dirs::home_dir()
			.map(|home| home.join(rest))
			.unwrap_or_else(|| path.to_path_buf()),
		Err(_) => path.to_path_buf(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
		let map: HashMap<String, OsString> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), OsString::from(v)))
			.collect();
		move |key| map.get(key).cloned()
	}

	#[test]
	fn falls_back_to_home_relative_defaults() {
		let paths = resolve_xdg_paths_from(Path::new("/home/ada"), env_of(&[]));
		assert_eq!(
			paths.user_config_file,
			PathBuf::from("/home/ada/.config/diffgate/config.toml")
		);
		assert_eq!(paths.data_dir, PathBuf::from("/home/ada/.local/share/diffgate"));
		assert_eq!(
			paths.default_mailbox_dir(),
			PathBuf::from("/home/ada/.local/share/diffgate/mailbox")
		);
	}

	#[test]
	fn honours_xdg_overrides() {
		let paths = resolve_xdg_paths_from(
			Path::new("/home/ada"),
			env_of(&[("XDG_DATA_HOME", "/data"), ("XDG_CONFIG_HOME", "/cfg")]),
		);
		assert_eq!(paths.data_dir, PathBuf::from("/data/diffgate"));
		assert_eq!(paths.user_config_file, PathBuf::from("/cfg/diffgate/config.toml"));
		assert_eq!(paths.state_dir, PathBuf::from("/home/ada/.local/state/diffgate"));
	}

	#[test]
	fn empty_xdg_variables_are_ignored() {
		let paths = resolve_xdg_paths_from(Path::new("/home/ada"), env_of(&[("XDG_DATA_HOME", "")]));
		assert_eq!(paths.data_dir, PathBuf::from("/home/ada/.local/share/diffgate"));
	}

	#[test]
	fn expand_home_leaves_plain_paths_alone() {
		assert_eq!(expand_home(Path::new("/srv/mailbox")), PathBuf::from("/srv/mailbox"));
		assert_eq!(expand_home(Path::new("rel/dir")), PathBuf::from("rel/dir"));
	}

	/// Test that XDG paths can be resolved without panicking.
	#[test]
	fn test_resolve_xdg_paths_succeeds() {
		let paths = resolve_xdg_paths().unwrap();
		assert!(paths.data_dir.to_string_lossy().contains("diffgate"));
	}
}
