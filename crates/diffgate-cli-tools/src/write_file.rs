// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use diffgate_approval::ApprovalCoordinator;
use diffgate_common_core::{ToolContext, ToolError};
use serde::Deserialize;

use crate::gate::{outcome_message, require_path, WRITE};
use crate::Tool;

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
	file_path: PathBuf,
	content: String,
}

/// Creates or overwrites a file once a reviewer approves the new contents.
pub struct WriteFileTool {
	coordinator: Arc<ApprovalCoordinator>,
}

impl WriteFileTool {
	pub fn new(coordinator: Arc<ApprovalCoordinator>) -> Self {
		Self { coordinator }
	}
}

#[async_trait]
impl Tool for WriteFileTool {
	fn name(&self) -> &str {
		"Write"
	}

	fn description(&self) -> &str {
		"Write a file. The new contents are shown to a reviewer and only written once approved."
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"file_path": {
								"type": "string",
								"description": "Path to the file to write"
						},
						"content": {
								"type": "string",
								"description": "Full contents of the file"
						}
				},
				"required": ["file_path", "content"]
		})
	}

	async fn invoke(
		&self,
		args: serde_json::Value,
		ctx: &ToolContext,
	) -> Result<serde_json::Value, ToolError> {
		let args: WriteFileArgs =
			serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
		require_path(&args.file_path)?;

		let path = ctx.resolve_path(&args.file_path);
		let before = match tokio::fs::read_to_string(&path).await {
			Ok(contents) => contents,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
			Err(e) => return Err(e.into()),
		};

		tracing::debug!(
				path = %path.display(),
				original_bytes = before.len(),
				new_bytes = args.content.len(),
				"proposing write"
		);

		let outcome = self
			.coordinator
			.propose(path.clone(), before, args.content.clone())
			.await;
		if outcome.is_approved() {
			if let Some(parent) = path.parent() {
				tokio::fs::create_dir_all(parent).await?;
			}
			tokio::fs::write(&path, &args.content).await?;
			tracing::info!(path = %path.display(), bytes = args.content.len(), "write applied");
		}

		Ok(serde_json::Value::String(outcome_message(&WRITE, &path, &outcome)))
	}
}
