// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use diffgate_approval::{ApprovalCoordinator, Fingerprint};
use diffgate_common_core::{ToolContext, ToolError};
use serde::Deserialize;

use crate::Tool;

#[derive(Debug, Deserialize)]
struct RespondToDiffArgs {
	hash: String,
	approved: bool,
}

/// Decides a pending proposal from inside the proposing process.
pub struct RespondToDiffTool {
	coordinator: Arc<ApprovalCoordinator>,
}

impl RespondToDiffTool {
	pub fn new(coordinator: Arc<ApprovalCoordinator>) -> Self {
		Self { coordinator }
	}
}

#[async_trait]
impl Tool for RespondToDiffTool {
	fn name(&self) -> &str {
		"respond_to_diff"
	}

	fn description(&self) -> &str {
		"Approve or reject a pending diff"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"hash": {
								"type": "string",
								"description": "Fingerprint of the pending diff"
						},
						"approved": {
								"type": "boolean",
								"description": "Whether to apply the change"
						}
				},
				"required": ["hash", "approved"]
		})
	}

	async fn invoke(
		&self,
		args: serde_json::Value,
		_ctx: &ToolContext,
	) -> Result<serde_json::Value, ToolError> {
		let args: RespondToDiffArgs =
			serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

		let accepted = match args.hash.parse::<Fingerprint>() {
			Ok(fp) => self.coordinator.respond(&fp, args.approved),
			Err(_) => false,
		};

		let text = match (accepted, args.approved) {
			(false, _) => "No pending diff found",
			(true, true) => "Diff approved",
			(true, false) => "Diff rejected",
		};
		Ok(serde_json::Value::String(text.to_string()))
	}
}
