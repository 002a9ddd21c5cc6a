// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! End-to-end tool calls against a reviewer that answers through the mailbox.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use diffgate_approval::{ApprovalCoordinator, Mailbox};
use diffgate_cli_tools::{default_registry, ToolOutput, ToolRegistry};
use diffgate_common_core::ToolContext;
use serde_json::json;
use tempfile::TempDir;

struct Harness {
	workspace: TempDir,
	mailbox_dir: TempDir,
	registry: ToolRegistry,
}

impl Harness {
	fn new(deadline: Duration) -> Self {
		let workspace = TempDir::new().unwrap();
		let mailbox_dir = TempDir::new().unwrap();
		let coordinator =
			ApprovalCoordinator::with_mailbox(mailbox(mailbox_dir.path())).with_deadline(deadline);
		let registry = default_registry(Arc::new(coordinator));
		Self {
			workspace,
			mailbox_dir,
			registry,
		}
	}

	fn ctx(&self) -> ToolContext {
		ToolContext::new(self.workspace.path())
	}

	fn mailbox(&self) -> Mailbox {
		mailbox(self.mailbox_dir.path())
	}

	async fn call(&self, tool: &str, args: serde_json::Value) -> ToolOutput {
		self.registry.call(tool, args, &self.ctx()).await
	}
}

fn mailbox(dir: &Path) -> Mailbox {
	Mailbox::new(dir).with_poll_interval(Duration::from_millis(10))
}

/// Decides requests by file name until every listed file has an answer.
fn spawn_reviewer(
	mailbox: Mailbox,
	decisions: HashMap<String, bool>,
) -> tokio::task::JoinHandle<usize> {
	tokio::spawn(async move {
		let mut decided = 0;
		while decided < decisions.len() {
			for request in mailbox.list_requests().await.unwrap() {
				let name = Path::new(&request.filepath)
					.file_name()
					.and_then(|n| n.to_str())
					.unwrap()
					.to_string();
				if let Some(&approved) = decisions.get(&name) {
					if !mailbox.response_path(&request.hash).exists()
						&& mailbox.submit_response(&request.hash, approved).await.unwrap()
					{
						decided += 1;
					}
				}
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		decided
	})
}

#[tokio::test]
async fn approved_edit_is_applied() {
	let h = Harness::new(Duration::from_secs(10));
	let target = h.workspace.path().join("a.txt");
	std::fs::write(&target, "foo bar").unwrap();
	let reviewer = spawn_reviewer(h.mailbox(), HashMap::from([("a.txt".to_string(), true)]));

	let output = h
		.call(
			"Edit",
			json!({"file_path": "a.txt", "old_string": "foo", "new_string": "baz"}),
		)
		.await;

	assert_eq!(reviewer.await.unwrap(), 1);
	assert!(!output.is_error);
	assert_eq!(output.text, format!("Successfully edited {}", target.display()));
	assert_eq!(std::fs::read_to_string(&target).unwrap(), "baz bar");
	assert!(h.mailbox().list_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_text_fails_before_any_handshake() {
	let h = Harness::new(Duration::from_secs(10));
	let target = h.workspace.path().join("a.txt");
	std::fs::write(&target, "foo bar").unwrap();

	let output = h
		.call(
			"Edit",
			json!({"file_path": "a.txt", "old_string": "qux", "new_string": "baz"}),
		)
		.await;

	assert!(output.is_error);
	assert_eq!(
		output.text,
		format!("Error: Could not find the text to replace in {}", target.display())
	);
	assert_eq!(std::fs::read_dir(h.mailbox_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn approved_write_creates_nested_directories() {
	let h = Harness::new(Duration::from_secs(10));
	let reviewer = spawn_reviewer(h.mailbox(), HashMap::from([("c.txt".to_string(), true)]));

	let output = h
		.call("Write", json!({"file_path": "a/b/c.txt", "content": "hello"}))
		.await;

	assert_eq!(reviewer.await.unwrap(), 1);
	let target = h.workspace.path().join("a/b/c.txt");
	assert_eq!(output.text, format!("Successfully wrote {}", target.display()));
	assert_eq!(std::fs::read_to_string(target).unwrap(), "hello");
}

#[tokio::test]
async fn concurrent_proposals_resolve_independently() {
	let h = Arc::new(Harness::new(Duration::from_secs(10)));
	let first = h.workspace.path().join("first.txt");
	let second = h.workspace.path().join("second.txt");
	std::fs::write(&first, "one").unwrap();
	std::fs::write(&second, "two").unwrap();

	let reviewer = spawn_reviewer(
		h.mailbox(),
		HashMap::from([
			("first.txt".to_string(), true),
			("second.txt".to_string(), false),
		]),
	);

	let edit_first = {
		let h = h.clone();
		tokio::spawn(async move {
			h.call(
				"Edit",
				json!({"file_path": "first.txt", "old_string": "one", "new_string": "uno"}),
			)
			.await
		})
	};
	let edit_second = {
		let h = h.clone();
		tokio::spawn(async move {
			h.call(
				"Edit",
				json!({"file_path": "second.txt", "old_string": "two", "new_string": "dos"}),
			)
			.await
		})
	};

	let first_output = edit_first.await.unwrap();
	let second_output = edit_second.await.unwrap();
	assert_eq!(reviewer.await.unwrap(), 2);

	assert_eq!(first_output.text, format!("Successfully edited {}", first.display()));
	assert_eq!(second_output.text, format!("Edit rejected for {}", second.display()));
	assert_eq!(std::fs::read_to_string(&first).unwrap(), "uno");
	assert_eq!(std::fs::read_to_string(&second).unwrap(), "two");
}

#[tokio::test]
async fn unanswered_write_times_out_and_creates_nothing() {
	let h = Harness::new(Duration::from_millis(150));

	let output = h
		.call("Write", json!({"file_path": "late.txt", "content": "x"}))
		.await;

	let target = h.workspace.path().join("late.txt");
	assert_eq!(
		output.text,
		format!("Write timed out waiting for approval of {}", target.display())
	);
	assert!(!target.exists());
	assert!(h.mailbox().list_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn every_tool_is_listed_by_name() {
	let h = Harness::new(Duration::from_secs(1));
	let names: Vec<String> = h
		.registry
		.definitions()
		.into_iter()
		.map(|d| d.name)
		.collect();

	assert_eq!(names, ["Edit", "Read", "Write", "get_diff", "respond_to_diff"]);
}

#[tokio::test]
async fn unknown_tool_is_reported() {
	let h = Harness::new(Duration::from_secs(1));
	let output = h.call("Delete", json!({})).await;
	assert!(output.is_error);
	assert_eq!(output.text, "Error: Unknown tool: Delete");
}
