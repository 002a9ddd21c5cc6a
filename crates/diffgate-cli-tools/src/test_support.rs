// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use diffgate_approval::{ApprovalCoordinator, Mailbox, MailboxRequest};
use tokio::task::JoinHandle;

pub(crate) fn mailbox(dir: &Path) -> Mailbox {
	Mailbox::new(dir).with_poll_interval(Duration::from_millis(10))
}

pub(crate) fn coordinator(dir: &Path, deadline: Duration) -> Arc<ApprovalCoordinator> {
	Arc::new(ApprovalCoordinator::with_mailbox(mailbox(dir)).with_deadline(deadline))
}

/// Answers the first request that shows up in the mailbox.
pub(crate) fn spawn_reviewer(mailbox: Mailbox, approved: bool) -> JoinHandle<MailboxRequest> {
	tokio::spawn(async move {
		loop {
			let requests = mailbox.list_requests().await.unwrap();
			if let Some(request) = requests.into_iter().next() {
				assert!(mailbox
					.submit_response(&request.hash, approved)
					.await
					.unwrap());
				return request;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
	})
}
