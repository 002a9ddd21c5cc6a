// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod agent;
mod review;

use std::sync::Arc;

use diffgate_approval::{ApprovalCoordinator, Mailbox};
use diffgate_cli_config::Settings;

pub use agent::{call, tools};
pub use review::{pending, respond, show, RespondArgs};

fn mailbox(settings: &Settings) -> Mailbox {
	Mailbox::new(settings.mailbox_dir.clone()).with_poll_interval(settings.poll_interval)
}

fn coordinator(settings: &Settings) -> Arc<ApprovalCoordinator> {
	Arc::new(ApprovalCoordinator::with_mailbox(mailbox(settings)).with_deadline(settings.approval_timeout))
}

#[cfg(test)]
pub(crate) fn test_settings(workspace: &std::path::Path, mailbox_dir: &std::path::Path) -> Settings {
	Settings {
		mailbox_dir: mailbox_dir.to_path_buf(),
		approval_timeout: std::time::Duration::from_millis(200),
		poll_interval: std::time::Duration::from_millis(10),
		workspace_root: workspace.to_path_buf(),
	}
}
