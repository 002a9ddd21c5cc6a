// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use crate::fingerprint::Fingerprint;

/// One candidate edit of a file, awaiting a reviewer decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeProposal {
	path: PathBuf,
	before: String,
	after: String,
	fingerprint: Fingerprint,
}

impl ChangeProposal {
	/// `before` is the empty string when the target file does not exist yet.
	pub fn new(path: impl Into<PathBuf>, before: impl Into<String>, after: impl Into<String>) -> Self {
		let path = path.into();
		let before = before.into();
		let after = after.into();
		let fingerprint = Fingerprint::compute(&path.to_string_lossy(), &before, &after);
		Self {
			path,
			before,
			after,
			fingerprint,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn before(&self) -> &str {
		&self.before
	}

	pub fn after(&self) -> &str {
		&self.after
	}

	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	pub fn is_noop(&self) -> bool {
		self.before == self.after
	}
}
