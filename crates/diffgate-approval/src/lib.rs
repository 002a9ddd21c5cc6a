// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Approval handshake between a proposing process and an out-of-process
//! reviewer.
//!
//! A proposed file change is identified by a [`Fingerprint`], tracked in a
//! [`PendingRegistry`], published through an [`ApprovalTransport`] (the
//! filesystem [`Mailbox`] by default) and resolved exactly once by the
//! [`ApprovalCoordinator`], either by a reviewer decision or by the deadline.

pub mod error;
pub mod fingerprint;
pub mod handshake;
pub mod mailbox;
pub mod proposal;
pub mod registry;
pub mod transport;

pub use error::ApprovalError;
pub use fingerprint::Fingerprint;
pub use handshake::{ApprovalCoordinator, ApprovalOutcome, DEFAULT_APPROVAL_TIMEOUT};
pub use mailbox::{
	Mailbox, MailboxDecision, MailboxRequest, MailboxResponse, DEFAULT_POLL_INTERVAL,
};
pub use proposal::ChangeProposal;
pub use registry::{
	wait_for_release, wait_for_terminal, HandshakeState, PendingHandle, PendingRegistry, PendingSummary,
	Registration,
};
pub use transport::ApprovalTransport;
