// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use diffgate_common_core::{ToolContext, ToolDefinition, ToolError};
use serde::Serialize;
use std::collections::HashMap;

#[async_trait]
pub trait Tool: Send + Sync {
	fn name(&self) -> &str;

	fn description(&self) -> &str;

	fn input_schema(&self) -> serde_json::Value;

	fn to_definition(&self) -> ToolDefinition {
		ToolDefinition {
			name: self.name().to_string(),
			description: self.description().to_string(),
			input_schema: self.input_schema(),
		}
	}

	async fn invoke(
		&self,
		args: serde_json::Value,
		ctx: &ToolContext,
	) -> Result<serde_json::Value, ToolError>;
}

/// Textual result handed back to the calling agent.
///
/// Serializes as `{"content":[{"type":"text","text":..}],"isError":..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
	pub text: String,
	pub is_error: bool,
}

impl ToolOutput {
	pub fn text(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			is_error: false,
		}
	}

	pub fn error(err: &ToolError) -> Self {
		Self {
			text: format!("Error: {err}"),
			is_error: true,
		}
	}
}

impl Serialize for ToolOutput {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		#[derive(Serialize)]
		struct Content<'a> {
			#[serde(rename = "type")]
			kind: &'static str,
			text: &'a str,
		}

		#[derive(Serialize)]
		#[serde(rename_all = "camelCase")]
		struct Wire<'a> {
			content: [Content<'a>; 1],
			is_error: bool,
		}

		Wire {
			content: [Content {
				kind: "text",
				text: &self.text,
			}],
			is_error: self.is_error,
		}
		.serialize(serializer)
	}
}

pub struct ToolRegistry {
	tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
	pub fn new() -> Self {
		Self {
			tools: HashMap::new(),
		}
	}

	pub fn register(&mut self, tool: Box<dyn Tool>) {
		let name = tool.name().to_string();
		tracing::debug!(tool_name = %name, "registering tool");
		self.tools.insert(name, tool);
	}

	pub fn get(&self, name: &str) -> Option<&dyn Tool> {
		self.tools.get(name).map(|t| t.as_ref())
	}

	/// Definitions of every registered tool, ordered by name.
	pub fn definitions(&self) -> Vec<ToolDefinition> {
		let mut definitions: Vec<_> = self.tools.values().map(|t| t.to_definition()).collect();
		definitions.sort_by(|a, b| a.name.cmp(&b.name));
		definitions
	}

	/// Runs a tool and renders whatever happens as a [`ToolOutput`]. No error
	/// crosses this boundary.
	pub async fn call(&self, name: &str, args: serde_json::Value, ctx: &ToolContext) -> ToolOutput {
		let Some(tool) = self.get(name) else {
			tracing::warn!(tool_name = %name, "unknown tool requested");
			return ToolOutput::error(&ToolError::NotFound(name.to_string()));
		};

		match tool.invoke(args, ctx).await {
			Ok(serde_json::Value::String(text)) => ToolOutput::text(text),
			Ok(value) => match serde_json::to_string_pretty(&value) {
				Ok(text) => ToolOutput::text(text),
				Err(e) => ToolOutput::error(&e.into()),
			},
			Err(err) => {
				if err.is_caller_error() {
					tracing::debug!(tool_name = %name, error = %err, "tool call rejected");
				} else {
					tracing::warn!(tool_name = %name, error = %err, "tool call failed");
				}
				ToolOutput::error(&err)
			}
		}
	}
}

impl Default for ToolRegistry {
	fn default() -> Self {
		Self::new()
	}
}
