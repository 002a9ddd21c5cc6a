// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use diffgate_approval::{ApprovalCoordinator, Fingerprint};
use diffgate_common_core::{ToolContext, ToolError};
use serde::Deserialize;

use crate::Tool;

#[derive(Debug, Deserialize)]
struct GetDiffArgs {
	hash: String,
}

/// Shows a proposal that is still waiting for a decision in this process.
pub struct GetDiffTool {
	coordinator: Arc<ApprovalCoordinator>,
}

impl GetDiffTool {
	pub fn new(coordinator: Arc<ApprovalCoordinator>) -> Self {
		Self { coordinator }
	}
}

#[async_trait]
impl Tool for GetDiffTool {
	fn name(&self) -> &str {
		"get_diff"
	}

	fn description(&self) -> &str {
		"Get the original and modified contents of a pending diff"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"hash": {
								"type": "string",
								"description": "Fingerprint of the pending diff"
						}
				},
				"required": ["hash"]
		})
	}

	async fn invoke(
		&self,
		args: serde_json::Value,
		_ctx: &ToolContext,
	) -> Result<serde_json::Value, ToolError> {
		let args: GetDiffArgs =
			serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

		let proposal = args
			.hash
			.parse::<Fingerprint>()
			.ok()
			.and_then(|fp| self.coordinator.lookup(&fp));

		Ok(match proposal {
			Some(proposal) => serde_json::json!({
					"filepath": proposal.path().to_string_lossy(),
					"original": proposal.before(),
					"modified": proposal.after(),
			}),
			None => {
				tracing::debug!(hash = %args.hash, "no pending diff");
				serde_json::json!({"error": "Diff not found"})
			}
		})
	}
}
