// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use diffgate_common_core::{ToolContext, ToolError};
use serde::Deserialize;
use std::path::PathBuf;

use crate::gate::require_path;
use crate::Tool;

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
	file_path: PathBuf,
	offset: Option<usize>,
	limit: Option<usize>,
}

pub struct ReadFileTool;

impl ReadFileTool {
	pub fn new() -> Self {
		Self
	}
}

impl Default for ReadFileTool {
	fn default() -> Self {
		Self::new()
	}
}

/// Renders `contents` like `cat -n`, starting after `offset` lines.
fn number_lines(contents: &str, offset: usize, limit: Option<usize>) -> String {
	let lines = contents.split('\n').skip(offset);
	let lines: Box<dyn Iterator<Item = &str>> = match limit {
		Some(limit) => Box::new(lines.take(limit)),
		None => Box::new(lines),
	};

	lines
		.enumerate()
		.map(|(i, line)| format!("{:>6}→{line}", offset + i + 1))
		.collect::<Vec<_>>()
		.join("\n")
}

#[async_trait]
impl Tool for ReadFileTool {
	fn name(&self) -> &str {
		"Read"
	}

	fn description(&self) -> &str {
		"Read a file with line numbers"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"file_path": {
								"type": "string",
								"description": "Path to the file to read (absolute or relative to workspace)"
						},
						"offset": {
								"type": "integer",
								"description": "Number of lines to skip"
						},
						"limit": {
								"type": "integer",
								"description": "Maximum number of lines to return"
						}
				},
				"required": ["file_path"]
		})
	}

	async fn invoke(
		&self,
		args: serde_json::Value,
		ctx: &ToolContext,
	) -> Result<serde_json::Value, ToolError> {
		let args: ReadFileArgs =
			serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
		require_path(&args.file_path)?;
		let path = ctx.resolve_path(&args.file_path);
		let offset = args.offset.unwrap_or(0);

		tracing::debug!(
				path = %path.display(),
				offset = offset,
				limit = ?args.limit,
				"reading file"
		);

		let contents = match tokio::fs::read_to_string(&path).await {
			Ok(contents) => contents,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ToolError::FileNotFound(path));
			}
			Err(e) => return Err(e.into()),
		};

		Ok(serde_json::Value::String(number_lines(
			&contents, offset, args.limit,
		)))
	}
}
