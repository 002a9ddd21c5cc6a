// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Content-derived identifiers for proposed changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ApprovalError;

/// Number of hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 16;

/// Identifier of a proposed change, derived from its path and contents.
///
/// Identical `(path, before, after)` triples always produce the same
/// fingerprint, which makes it usable as an idempotent request key and as the
/// artifact name in the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
	pub fn compute(path: &str, before: &str, after: &str) -> Self {
		let mut hasher = Sha256::new();
		// Each field is length-prefixed so no choice of contents can make two
		// different triples hash the same byte stream.
		for field in [path, before, after] {
			hasher.update((field.len() as u64).to_le_bytes());
			hasher.update(field.as_bytes());
		}
		let digest = hex::encode(hasher.finalize());
		Self(digest[..FINGERPRINT_LEN].to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Fingerprint {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl FromStr for Fingerprint {
	type Err = ApprovalError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let valid = s.len() == FINGERPRINT_LEN
			&& s
				.bytes()
				.all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
		if valid {
			Ok(Self(s.to_string()))
		} else {
			Err(ApprovalError::InvalidFingerprint(s.to_string()))
		}
	}
}
