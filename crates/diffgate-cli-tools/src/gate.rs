// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;

use diffgate_approval::ApprovalOutcome;
use diffgate_common_core::ToolError;

/// Wording for one kind of gated mutation.
pub(crate) struct Verb {
	/// "Edit", "Write"
	pub noun: &'static str,
	/// "edited", "wrote"
	pub past: &'static str,
}

pub(crate) const EDIT: Verb = Verb {
	noun: "Edit",
	past: "edited",
};

pub(crate) const WRITE: Verb = Verb {
	noun: "Write",
	past: "wrote",
};

pub(crate) fn outcome_message(verb: &Verb, path: &Path, outcome: &ApprovalOutcome) -> String {
	let path = path.display();
	match outcome {
		ApprovalOutcome::Approved => format!("Successfully {} {path}", verb.past),
		ApprovalOutcome::Rejected => format!("{} rejected for {path}", verb.noun),
		ApprovalOutcome::TimedOut => {
			format!("{} timed out waiting for approval of {path}", verb.noun)
		}
		ApprovalOutcome::Failed { reason } => format!("{} of {path} failed: {reason}", verb.noun),
	}
}

pub(crate) fn require_path(path: &Path) -> Result<(), ToolError> {
	if path.as_os_str().is_empty() {
		return Err(ToolError::InvalidArguments(
			"file_path must not be empty".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_path() {
		let path = Path::new("/w/a.txt");
		assert_eq!(
			outcome_message(&EDIT, path, &ApprovalOutcome::Approved),
			"Successfully edited /w/a.txt"
		);
		assert_eq!(
			outcome_message(&WRITE, path, &ApprovalOutcome::Rejected),
			"Write rejected for /w/a.txt"
		);
		assert_eq!(
			outcome_message(&EDIT, path, &ApprovalOutcome::TimedOut),
			"Edit timed out waiting for approval of /w/a.txt"
		);
		assert_eq!(
			outcome_message(
				&WRITE,
				path,
				&ApprovalOutcome::Failed {
					reason: "mailbox unavailable".to_string()
				}
			),
			"Write of /w/a.txt failed: mailbox unavailable"
		);
	}

	#[test]
	fn empty_path_is_invalid() {
		assert!(matches!(
			require_path(Path::new("")),
			Err(ToolError::InvalidArguments(_))
		));
		assert!(require_path(Path::new("a.txt")).is_ok());
	}
}
