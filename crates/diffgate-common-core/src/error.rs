// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// None of these escape the tool registry: `ToolRegistry::call` renders every
/// variant into a textual tool result.
#[derive(Clone, Error, Debug)]
pub enum ToolError {
	#[error("Unknown tool: {0}")]
	NotFound(String),

	#[error("Invalid arguments: {0}")]
	InvalidArguments(String),

	#[error("IO error: {0}")]
	Io(String),

	#[error("Could not find the text to replace in {}", .0.display())]
	TargetNotFound(PathBuf),

	#[error("File not found: {}", .0.display())]
	FileNotFound(PathBuf),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl ToolError {
	/// Whether the error was caused by the caller's input rather than the
	/// environment.
	pub fn is_caller_error(&self) -> bool {
		matches!(
			self,
			ToolError::NotFound(_)
				| ToolError::InvalidArguments(_)
				| ToolError::TargetNotFound(_)
				| ToolError::FileNotFound(_)
		)
	}
}

impl From<std::io::Error> for ToolError {
	fn from(err: std::io::Error) -> Self {
		ToolError::Io(err.to_string())
	}
}

impl From<serde_json::Error> for ToolError {
	fn from(err: serde_json::Error) -> Self {
		ToolError::Serialization(err.to_string())
	}
}
