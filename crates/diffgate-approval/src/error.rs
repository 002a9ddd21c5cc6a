// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

use crate::fingerprint::Fingerprint;

/// Errors raised by the approval machinery.
#[derive(Debug, Error)]
pub enum ApprovalError {
	#[error("a proposal with fingerprint {0} is already pending")]
	DuplicateFingerprint(Fingerprint),

	#[error("invalid fingerprint '{0}': expected 16 lowercase hex characters")]
	InvalidFingerprint(String),

	#[error("mailbox I/O error at {}: {source}", path.display())]
	Mailbox {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed mailbox artifact {}: {source}", path.display())]
	MalformedArtifact {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl ApprovalError {
	pub(crate) fn mailbox(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Mailbox {
			path: path.into(),
			source,
		}
	}
}
