// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Drives one proposal from submission to a single terminal decision.
//!
//! ```text
//! Submitted -> AwaitingDecision -> Approved | Rejected | TimedOut | Failed
//! ```
//!
//! Publishing strictly precedes waiting. The wait races the transport's
//! response against an in-process decision on the registry, and whichever
//! reaches the registry first is the outcome. Anything other than an observed
//! approval leaves the proposal unapplied.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::fingerprint::Fingerprint;
use crate::mailbox::{Mailbox, MailboxDecision};
use crate::proposal::ChangeProposal;
use crate::registry::{
	wait_for_release, wait_for_terminal, HandshakeState, PendingRegistry, Registration,
};
use crate::transport::ApprovalTransport;

/// How long a reviewer has to decide.
pub const DEFAULT_APPROVAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Terminal result of a handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
	Approved,
	Rejected,
	TimedOut,
	/// The handshake could not run; treated as a rejection.
	Failed { reason: String },
}

impl ApprovalOutcome {
	pub fn is_approved(&self) -> bool {
		matches!(self, Self::Approved)
	}

	fn from_state(state: HandshakeState, failure: Option<String>) -> Self {
		match state {
			HandshakeState::Approved => Self::Approved,
			HandshakeState::Rejected => Self::Rejected,
			HandshakeState::TimedOut => Self::TimedOut,
			HandshakeState::Failed => Self::Failed {
				reason: failure.unwrap_or_else(|| "approval handshake failed".to_string()),
			},
			HandshakeState::Submitted | HandshakeState::AwaitingDecision => Self::Failed {
				reason: format!("handshake ended while still {state:?}"),
			},
		}
	}
}

/// Owns the pending registry and the transport for one proposing process.
pub struct ApprovalCoordinator {
	registry: PendingRegistry,
	transport: Arc<dyn ApprovalTransport>,
	deadline: Duration,
}

impl ApprovalCoordinator {
	pub fn new(transport: Arc<dyn ApprovalTransport>) -> Self {
		Self {
			registry: PendingRegistry::new(),
			transport,
			deadline: DEFAULT_APPROVAL_TIMEOUT,
		}
	}

	pub fn with_mailbox(mailbox: Mailbox) -> Self {
		Self::new(Arc::new(mailbox))
	}

	pub fn with_deadline(mut self, deadline: Duration) -> Self {
		self.deadline = deadline;
		self
	}

	pub fn deadline(&self) -> Duration {
		self.deadline
	}

	pub fn registry(&self) -> &PendingRegistry {
		&self.registry
	}

	pub fn transport_name(&self) -> &str {
		self.transport.name()
	}

	/// Proposes replacing the contents of `path` and waits for the decision
	/// under the coordinator's deadline.
	pub async fn propose(
		&self,
		path: impl Into<PathBuf>,
		before: impl Into<String>,
		after: impl Into<String>,
	) -> ApprovalOutcome {
		self
			.submit(ChangeProposal::new(path, before, after), self.deadline)
			.await
	}

	pub async fn propose_with_deadline(
		&self,
		proposal: ChangeProposal,
		deadline: Duration,
	) -> ApprovalOutcome {
		self.submit(proposal, deadline).await
	}

	/// Records a decision from inside this process. Returns `false` when no
	/// pending proposal matches, including ones that already settled.
	pub fn respond(&self, fingerprint: &Fingerprint, approved: bool) -> bool {
		let accepted = self.registry.resolve(fingerprint, approved);
		debug!(fingerprint = %fingerprint, approved, accepted, "in-process response");
		accepted
	}

	pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<ChangeProposal> {
		self.registry.lookup(fingerprint)
	}

	#[instrument(
		skip_all,
		fields(
			fingerprint = %proposal.fingerprint(),
			path = %proposal.path().display(),
			transport = self.transport.name(),
		)
	)]
	async fn submit(&self, proposal: ChangeProposal, deadline: Duration) -> ApprovalOutcome {
		let fingerprint = proposal.fingerprint().clone();

		let handle = loop {
			match self.registry.register_or_join(proposal.clone()) {
				Registration::Owner(handle) => break handle,
				Registration::Joined(mut rx) => {
					debug!("identical proposal already pending, sharing its wait");
					let state = match tokio::time::timeout(deadline, wait_for_terminal(&mut rx)).await {
						Ok(state) => state,
						Err(_) => HandshakeState::TimedOut,
					};
					return ApprovalOutcome::from_state(state, None);
				}
				Registration::Settling(mut rx) => {
					debug!("previous round of this proposal is cleaning up");
					if tokio::time::timeout(deadline, wait_for_release(&mut rx))
						.await
						.is_err()
					{
						return ApprovalOutcome::TimedOut;
					}
				}
			}
		};

		if let Err(e) = self.transport.publish(&proposal).await {
			warn!(error = %e, "failed to publish approval request");
			self.registry.transition(&fingerprint, HandshakeState::Failed);
			self.transport.discard(&fingerprint).await;
			return ApprovalOutcome::Failed {
				reason: e.to_string(),
			};
		}
		self
			.registry
			.transition(&fingerprint, HandshakeState::AwaitingDecision);

		let mut in_process = handle.subscribe();
		let mut failure: Option<String> = None;

		tokio::select! {
			awaited = self.transport.await_response(&fingerprint, deadline) => {
				match awaited {
					Ok(MailboxDecision::Decided { approved }) => {
						self.registry.resolve(&fingerprint, approved);
					}
					Ok(MailboxDecision::TimedOut) => {
						self.registry.transition(&fingerprint, HandshakeState::TimedOut);
					}
					Err(e) => {
						warn!(error = %e, "waiting for approval failed");
						failure = Some(e.to_string());
						self.registry.transition(&fingerprint, HandshakeState::Failed);
					}
				}
			}
			state = wait_for_terminal(&mut in_process) => {
				debug!(?state, "proposal settled in-process");
			}
		}

		// The handle keeps the fingerprint reserved until the artifacts are gone.
		let state = handle.state();
		self.transport.discard(&fingerprint).await;
		drop(handle);

		let outcome = ApprovalOutcome::from_state(state, failure);
		info!(outcome = ?outcome, "approval handshake finished");
		outcome
	}
}
