// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use diffgate_approval::ApprovalCoordinator;
use diffgate_common_core::{ToolContext, ToolError};
use serde::Deserialize;

use crate::gate::{outcome_message, require_path, EDIT};
use crate::Tool;

#[derive(Debug, Deserialize)]
struct EditFileArgs {
	file_path: PathBuf,
	old_string: String,
	new_string: String,
	#[serde(default)]
	replace_all: bool,
}

/// Replaces text in an existing file once a reviewer approves the result.
pub struct EditFileTool {
	coordinator: Arc<ApprovalCoordinator>,
}

impl EditFileTool {
	pub fn new(coordinator: Arc<ApprovalCoordinator>) -> Self {
		Self { coordinator }
	}
}

#[async_trait]
impl Tool for EditFileTool {
	fn name(&self) -> &str {
		"Edit"
	}

	fn description(&self) -> &str {
		"Edit a file by replacing text. The change is shown to a reviewer and only applied once approved."
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"file_path": {
								"type": "string",
								"description": "Path to the file to edit"
						},
						"old_string": {
								"type": "string",
								"description": "Text to replace"
						},
						"new_string": {
								"type": "string",
								"description": "Replacement text"
						},
						"replace_all": {
								"type": "boolean",
								"description": "Replace every occurrence instead of the first (default: false)"
						}
				},
				"required": ["file_path", "old_string", "new_string"]
		})
	}

	async fn invoke(
		&self,
		args: serde_json::Value,
		ctx: &ToolContext,
	) -> Result<serde_json::Value, ToolError> {
		let args: EditFileArgs =
			serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
		require_path(&args.file_path)?;
		if args.old_string.is_empty() {
			return Err(ToolError::InvalidArguments(
				"old_string must not be empty".to_string(),
			));
		}

		let path = ctx.resolve_path(&args.file_path);
		let before = match tokio::fs::read_to_string(&path).await {
			Ok(contents) => contents,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ToolError::FileNotFound(path));
			}
			Err(e) => return Err(e.into()),
		};

		if !before.contains(&args.old_string) {
			return Err(ToolError::TargetNotFound(path));
		}

		let after = if args.replace_all {
			before.replace(&args.old_string, &args.new_string)
		} else {
			before.replacen(&args.old_string, &args.new_string, 1)
		};

		tracing::debug!(
				path = %path.display(),
				replace_all = args.replace_all,
				original_bytes = before.len(),
				new_bytes = after.len(),
				"proposing edit"
		);

		let outcome = self.coordinator.propose(path.clone(), before, after.clone()).await;
		if outcome.is_approved() {
			tokio::fs::write(&path, &after).await?;
			tracing::info!(path = %path.display(), "edit applied");
		}

		Ok(serde_json::Value::String(outcome_message(&EDIT, &path, &outcome)))
	}
}
