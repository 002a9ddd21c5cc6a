// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::process::ExitCode;

use anyhow::{Context, Result};
use diffgate_cli_config::Settings;
use diffgate_cli_tools::{default_registry, ToolOutput};
use diffgate_common_core::ToolContext;
use tracing::instrument;

use super::coordinator;

pub fn tools(settings: &Settings) -> Result<ExitCode> {
	let registry = default_registry(coordinator(settings));
	println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
	Ok(ExitCode::SUCCESS)
}

/// Runs one tool, blocking on reviewer approval for mutating tools.
#[instrument(skip(settings, raw_args))]
pub async fn call(settings: &Settings, tool: &str, raw_args: &str) -> Result<ExitCode> {
	let output = run_tool(settings, tool, raw_args).await?;
	println!("{}", serde_json::to_string(&output)?);

	Ok(if output.is_error {
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	})
}

async fn run_tool(settings: &Settings, tool: &str, raw_args: &str) -> Result<ToolOutput> {
	let args: serde_json::Value =
		serde_json::from_str(raw_args).context("tool arguments must be valid JSON")?;

	let registry = default_registry(coordinator(settings));
	let ctx = ToolContext::new(settings.workspace_root.clone());
	Ok(registry.call(tool, args, &ctx).await)
}
