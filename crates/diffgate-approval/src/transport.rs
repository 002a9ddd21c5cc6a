// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ApprovalError;
use crate::fingerprint::Fingerprint;
use crate::mailbox::{Mailbox, MailboxDecision, MailboxRequest};
use crate::proposal::ChangeProposal;

/// Channel that carries a proposal to the reviewer and its decision back.
///
/// The handshake only relies on this contract, so the filesystem mailbox can
/// be swapped for a socket or an in-process channel.
#[async_trait]
pub trait ApprovalTransport: Send + Sync {
	fn name(&self) -> &str;

	/// Makes the proposal visible to the reviewer. Must complete before
	/// [`ApprovalTransport::await_response`] is called.
	async fn publish(&self, proposal: &ChangeProposal) -> Result<(), ApprovalError>;

	/// Waits for the reviewer's decision, at most `deadline`.
	async fn await_response(
		&self,
		fingerprint: &Fingerprint,
		deadline: Duration,
	) -> Result<MailboxDecision, ApprovalError>;

	/// Drops anything still published for the fingerprint. Best effort.
	async fn discard(&self, fingerprint: &Fingerprint);
}

#[async_trait]
impl ApprovalTransport for Mailbox {
	fn name(&self) -> &str {
		"mailbox"
	}

	async fn publish(&self, proposal: &ChangeProposal) -> Result<(), ApprovalError> {
		Mailbox::publish(self, &MailboxRequest::from_proposal(proposal)).await
	}

	async fn await_response(
		&self,
		fingerprint: &Fingerprint,
		deadline: Duration,
	) -> Result<MailboxDecision, ApprovalError> {
		Mailbox::await_response(self, fingerprint, deadline).await
	}

	async fn discard(&self, fingerprint: &Fingerprint) {
		Mailbox::discard(self, fingerprint).await
	}
}
