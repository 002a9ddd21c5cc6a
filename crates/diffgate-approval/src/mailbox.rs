// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Filesystem mailbox shared with the reviewing process.
//!
//! Each handshake occupies two artifacts named after its fingerprint:
//!
//! - `<hash>.request.json`, written by the proposer
//! - `<hash>.response.json`, written by the reviewer
//!
//! Both are written under a `.tmp` name and renamed into place, so a reader
//! never sees a partial document. Files ending in `.tmp` are never read.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ApprovalError;
use crate::fingerprint::Fingerprint;
use crate::proposal::ChangeProposal;

/// Interval between checks for a response artifact.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const REQUEST_SUFFIX: &str = ".request.json";
const RESPONSE_SUFFIX: &str = ".response.json";
const TMP_SUFFIX: &str = ".tmp";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Request artifact: everything the reviewer needs to render the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxRequest {
	pub hash: Fingerprint,
	pub filepath: String,
	pub original: String,
	pub modified: String,
	/// Milliseconds since the Unix epoch.
	pub timestamp: i64,
}

impl MailboxRequest {
	pub fn from_proposal(proposal: &ChangeProposal) -> Self {
		Self {
			hash: proposal.fingerprint().clone(),
			filepath: proposal.path().to_string_lossy().into_owned(),
			original: proposal.before().to_string(),
			modified: proposal.after().to_string(),
			timestamp: Utc::now().timestamp_millis(),
		}
	}

	pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
		Utc.timestamp_millis_opt(self.timestamp).single()
	}
}

/// Response artifact written by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxResponse {
	pub approved: bool,
}

/// What a wait on the mailbox produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxDecision {
	Decided { approved: bool },
	TimedOut,
}

/// A directory used as a request/response channel.
#[derive(Debug, Clone)]
pub struct Mailbox {
	dir: PathBuf,
	poll_interval: Duration,
}

impl Mailbox {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn poll_interval(&self) -> Duration {
		self.poll_interval
	}

	pub fn request_path(&self, fingerprint: &Fingerprint) -> PathBuf {
		self.dir.join(format!("{fingerprint}{REQUEST_SUFFIX}"))
	}

	pub fn response_path(&self, fingerprint: &Fingerprint) -> PathBuf {
		self.dir.join(format!("{fingerprint}{RESPONSE_SUFFIX}"))
	}

	/// Makes a request visible to reviewers.
	///
	/// A leftover response for the same fingerprint is removed first; it
	/// belongs to an earlier round and must not answer this one.
	pub async fn publish(&self, request: &MailboxRequest) -> Result<(), ApprovalError> {
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| ApprovalError::mailbox(&self.dir, e))?;

		remove_best_effort(&self.response_path(&request.hash)).await;

		let path = self.request_path(&request.hash);
		let json = serde_json::to_string_pretty(request)?;
		write_atomic(&path, &json).await?;

		debug!(
				fingerprint = %request.hash,
				path = %path.display(),
				bytes = json.len(),
				"published approval request"
		);
		Ok(())
	}

	/// Polls until a response for `fingerprint` appears or `deadline` passes.
	///
	/// On a decision both artifacts are removed; on timeout the request is
	/// removed. Removal is best effort. Unreadable or malformed responses are
	/// logged and polling continues, so nothing but a well-formed response
	/// can end the wait early. A deadline too large to represent never
	/// expires.
	pub async fn await_response(
		&self,
		fingerprint: &Fingerprint,
		deadline: Duration,
	) -> Result<MailboxDecision, ApprovalError> {
		let expires_at = Instant::now().checked_add(deadline);
		let response_path = self.response_path(fingerprint);

		loop {
			match read_json::<MailboxResponse>(&response_path).await {
				Ok(Some(response)) => {
					info!(
							fingerprint = %fingerprint,
							approved = response.approved,
							"received reviewer decision"
					);
					self.discard(fingerprint).await;
					return Ok(MailboxDecision::Decided {
						approved: response.approved,
					});
				}
				Ok(None) => {}
				Err(e) => {
					warn!(
							fingerprint = %fingerprint,
							error = %e,
							"ignoring unreadable response artifact"
					);
				}
			}

			let now = Instant::now();
			if expires_at.is_some_and(|expires_at| now >= expires_at) {
				info!(
						fingerprint = %fingerprint,
						deadline_secs = deadline.as_secs_f64(),
						"approval request timed out"
				);
				remove_best_effort(&self.request_path(fingerprint)).await;
				return Ok(MailboxDecision::TimedOut);
			}

			let remaining = expires_at.map_or(self.poll_interval, |expires_at| expires_at - now);
			tokio::time::sleep(self.poll_interval.min(remaining)).await;
		}
	}

	/// Writes a reviewer decision.
	///
	/// Returns `false` without writing when the request is gone, which happens
	/// when the proposer already gave up.
	pub async fn submit_response(
		&self,
		fingerprint: &Fingerprint,
		approved: bool,
	) -> Result<bool, ApprovalError> {
		let request_path = self.request_path(fingerprint);
		let exists = tokio::fs::try_exists(&request_path)
			.await
			.map_err(|e| ApprovalError::mailbox(&request_path, e))?;
		if !exists {
			debug!(fingerprint = %fingerprint, "no request for response, skipping");
			return Ok(false);
		}

		let json = serde_json::to_string(&MailboxResponse { approved })?;
		write_atomic(&self.response_path(fingerprint), &json).await?;

		debug!(fingerprint = %fingerprint, approved, "submitted response");
		Ok(true)
	}

	/// Removes both artifacts of a handshake, ignoring failures.
	pub async fn discard(&self, fingerprint: &Fingerprint) {
		remove_best_effort(&self.request_path(fingerprint)).await;
		remove_best_effort(&self.response_path(fingerprint)).await;
	}

	pub async fn read_request(
		&self,
		fingerprint: &Fingerprint,
	) -> Result<Option<MailboxRequest>, ApprovalError> {
		read_json(&self.request_path(fingerprint)).await
	}

	/// All live requests, oldest first. Artifacts that cannot be parsed are
	/// skipped with a warning.
	pub async fn list_requests(&self) -> Result<Vec<MailboxRequest>, ApprovalError> {
		let mut entries = match tokio::fs::read_dir(&self.dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(ApprovalError::mailbox(&self.dir, e)),
		};

		let mut requests = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| ApprovalError::mailbox(&self.dir, e))?
		{
			let path = entry.path();
			let is_request = path
				.file_name()
				.and_then(|n| n.to_str())
				.is_some_and(|n| n.ends_with(REQUEST_SUFFIX));
			if !is_request {
				continue;
			}

			match read_json::<MailboxRequest>(&path).await {
				Ok(Some(request)) => requests.push(request),
				Ok(None) => {}
				Err(e) => {
					warn!(
							path = %path.display(),
							error = %e,
							"skipping unreadable request artifact"
					);
				}
			}
		}

		requests.sort_by_key(|r| r.timestamp);
		debug!(count = requests.len(), dir = %self.dir.display(), "listed requests");
		Ok(requests)
	}
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), ApprovalError> {
	let file_name = path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_default();
	let tmp_path = path.with_file_name(format!(
		"{file_name}.{}.{}{TMP_SUFFIX}",
		std::process::id(),
		TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
	));

	tokio::fs::write(&tmp_path, contents)
		.await
		.map_err(|e| ApprovalError::mailbox(&tmp_path, e))?;
	if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
		remove_best_effort(&tmp_path).await;
		return Err(ApprovalError::mailbox(path, e));
	}
	Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ApprovalError> {
	let contents = match tokio::fs::read_to_string(path).await {
		Ok(contents) => contents,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(ApprovalError::mailbox(path, e)),
	};

	serde_json::from_str(&contents)
		.map(Some)
		.map_err(|source| ApprovalError::MalformedArtifact {
			path: path.to_path_buf(),
			source,
		})
}

async fn remove_best_effort(path: &Path) {
	match tokio::fs::remove_file(path).await {
		Ok(()) => debug!(path = %path.display(), "removed mailbox artifact"),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => debug!(path = %path.display(), error = %e, "failed to remove mailbox artifact"),
	}
}
