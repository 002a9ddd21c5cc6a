// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! File tools whose mutations only land after a reviewer approves the diff.

mod edit_file;
mod gate;
mod get_diff;
mod read_file;
mod registry;
mod respond_to_diff;
mod write_file;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use diffgate_approval::ApprovalCoordinator;

pub use edit_file::EditFileTool;
pub use get_diff::GetDiffTool;
pub use read_file::ReadFileTool;
pub use registry::{Tool, ToolOutput, ToolRegistry};
pub use respond_to_diff::RespondToDiffTool;
pub use write_file::WriteFileTool;

/// Registry holding every tool, the mutating ones gated by `coordinator`.
pub fn default_registry(coordinator: Arc<ApprovalCoordinator>) -> ToolRegistry {
	let mut registry = ToolRegistry::new();
	registry.register(Box::new(EditFileTool::new(coordinator.clone())));
	registry.register(Box::new(WriteFileTool::new(coordinator.clone())));
	registry.register(Box::new(ReadFileTool::new()));
	registry.register(Box::new(GetDiffTool::new(coordinator.clone())));
	registry.register(Box::new(RespondToDiffTool::new(coordinator)));
	registry
}
