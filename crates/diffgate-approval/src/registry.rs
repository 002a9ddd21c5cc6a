// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory table of proposals awaiting a decision.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::error::ApprovalError;
use crate::fingerprint::Fingerprint;
use crate::proposal::ChangeProposal;

/// Lifecycle of one handshake.
///
/// `Submitted` and `AwaitingDecision` are pending; every other state is
/// terminal and never left again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
	Submitted,
	AwaitingDecision,
	Approved,
	Rejected,
	TimedOut,
	Failed,
}

impl HandshakeState {
	pub fn is_terminal(self) -> bool {
		!matches!(self, Self::Submitted | Self::AwaitingDecision)
	}
}

struct PendingEntry {
	proposal: ChangeProposal,
	created_at: Instant,
	submitted_at: DateTime<Utc>,
	generation: u64,
	state: watch::Sender<HandshakeState>,
}

impl PendingEntry {
	fn current(&self) -> HandshakeState {
		*self.state.borrow()
	}
}

#[derive(Default)]
struct RegistryInner {
	entries: HashMap<Fingerprint, PendingEntry>,
	next_generation: u64,
}

/// Snapshot of one registry entry, for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct PendingSummary {
	pub fingerprint: Fingerprint,
	pub path: PathBuf,
	pub submitted_at: DateTime<Utc>,
	#[serde(skip)]
	pub age: Duration,
	pub state: HandshakeState,
}

/// Result of [`PendingRegistry::register_or_join`].
pub enum Registration {
	/// The caller owns a fresh entry and drives the handshake.
	Owner(PendingHandle),
	/// An identical proposal is already pending; the receiver observes its
	/// state until it turns terminal.
	Joined(watch::Receiver<HandshakeState>),
	/// An identical proposal has settled but its owner is still cleaning up.
	/// Register again once [`wait_for_release`] returns.
	Settling(watch::Receiver<HandshakeState>),
}

/// Registry of outstanding proposals keyed by fingerprint.
///
/// Cheap to clone; clones share the same table. Nothing is persisted, so a
/// restarted process starts empty.
#[derive(Clone, Default)]
pub struct PendingRegistry {
	inner: Arc<Mutex<RegistryInner>>,
}

impl PendingRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a proposal in the `Submitted` state.
	///
	/// Fails with [`ApprovalError::DuplicateFingerprint`] while an entry with
	/// the same fingerprint exists, pending or settled, until its handle is
	/// dropped.
	pub fn register(&self, proposal: ChangeProposal) -> Result<PendingHandle, ApprovalError> {
		let fingerprint = proposal.fingerprint().clone();
		match self.register_or_join(proposal) {
			Registration::Owner(handle) => Ok(handle),
			Registration::Joined(_) | Registration::Settling(_) => {
				Err(ApprovalError::DuplicateFingerprint(fingerprint))
			}
		}
	}

	/// Registers a proposal, or joins the pending entry that already carries
	/// its fingerprint. Both checks happen under one lock.
	///
	/// A settled entry keeps its fingerprint until its handle is dropped, so a
	/// new round cannot publish while the previous owner still removes its
	/// artifacts.
	pub fn register_or_join(&self, proposal: ChangeProposal) -> Registration {
		let fingerprint = proposal.fingerprint().clone();
		let mut inner = self.inner.lock();

		if let Some(existing) = inner.entries.get(&fingerprint) {
			if existing.current().is_terminal() {
				debug!(fingerprint = %fingerprint, "previous round still settling");
				return Registration::Settling(existing.state.subscribe());
			}
			debug!(fingerprint = %fingerprint, "joining pending proposal");
			return Registration::Joined(existing.state.subscribe());
		}

		let generation = inner.next_generation;
		inner.next_generation += 1;

		let (tx, rx) = watch::channel(HandshakeState::Submitted);
		let entry = PendingEntry {
			proposal,
			created_at: Instant::now(),
			submitted_at: Utc::now(),
			generation,
			state: tx,
		};
		inner.entries.insert(fingerprint.clone(), entry);

		debug!(
				fingerprint = %fingerprint,
				pending = inner.entries.len(),
				"registered proposal"
		);

		Registration::Owner(PendingHandle {
			fingerprint,
			generation,
			registry: self.clone(),
			state: rx,
		})
	}

	/// Records a reviewer decision. Returns `false`, changing nothing, when no
	/// pending entry matches.
	pub fn resolve(&self, fingerprint: &Fingerprint, approved: bool) -> bool {
		let next = if approved {
			HandshakeState::Approved
		} else {
			HandshakeState::Rejected
		};
		self.transition(fingerprint, next)
	}

	/// Moves a pending entry to `next`. Terminal entries are left untouched.
	pub(crate) fn transition(&self, fingerprint: &Fingerprint, next: HandshakeState) -> bool {
		let inner = self.inner.lock();
		let Some(entry) = inner.entries.get(fingerprint) else {
			trace!(fingerprint = %fingerprint, ?next, "no entry to transition");
			return false;
		};

		let current = entry.current();
		if current.is_terminal() {
			debug!(
					fingerprint = %fingerprint,
					?current,
					?next,
					"ignoring transition of settled proposal"
			);
			return false;
		}

		entry.state.send_replace(next);
		debug!(
				fingerprint = %fingerprint,
				from = ?current,
				to = ?next,
				elapsed_ms = entry.created_at.elapsed().as_millis() as u64,
				"proposal state changed"
		);
		true
	}

	/// Returns the proposal while it is still pending.
	pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<ChangeProposal> {
		let inner = self.inner.lock();
		inner
			.entries
			.get(fingerprint)
			.filter(|entry| !entry.current().is_terminal())
			.map(|entry| entry.proposal.clone())
	}

	pub fn state(&self, fingerprint: &Fingerprint) -> Option<HandshakeState> {
		self.inner.lock().entries.get(fingerprint).map(PendingEntry::current)
	}

	pub fn subscribe(&self, fingerprint: &Fingerprint) -> Option<watch::Receiver<HandshakeState>> {
		self
			.inner
			.lock()
			.entries
			.get(fingerprint)
			.map(|entry| entry.state.subscribe())
	}

	/// Pending entries, oldest first.
	pub fn pending(&self) -> Vec<PendingSummary> {
		let inner = self.inner.lock();
		let mut summaries: Vec<PendingSummary> = inner
			.entries
			.iter()
			.filter(|(_, entry)| !entry.current().is_terminal())
			.map(|(fingerprint, entry)| PendingSummary {
				fingerprint: fingerprint.clone(),
				path: entry.proposal.path().to_path_buf(),
				submitted_at: entry.submitted_at,
				age: entry.created_at.elapsed(),
				state: entry.current(),
			})
			.collect();
		summaries.sort_by_key(|s| s.submitted_at);
		summaries
	}

	pub fn len(&self) -> usize {
		self.inner.lock().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn remove(&self, fingerprint: &Fingerprint, generation: u64) {
		let mut inner = self.inner.lock();
		let owned = inner
			.entries
			.get(fingerprint)
			.is_some_and(|entry| entry.generation == generation);
		if owned {
			inner.entries.remove(fingerprint);
			debug!(
					fingerprint = %fingerprint,
					pending = inner.entries.len(),
					"removed proposal"
			);
		}
	}
}

/// Ownership of one registry entry. Dropping the handle removes the entry,
/// which also wakes any joined waiters.
pub struct PendingHandle {
	fingerprint: Fingerprint,
	generation: u64,
	registry: PendingRegistry,
	state: watch::Receiver<HandshakeState>,
}

impl PendingHandle {
	pub fn fingerprint(&self) -> &Fingerprint {
		&self.fingerprint
	}

	pub fn state(&self) -> HandshakeState {
		*self.state.borrow()
	}

	pub fn subscribe(&self) -> watch::Receiver<HandshakeState> {
		self.state.clone()
	}
}

impl Drop for PendingHandle {
	fn drop(&mut self) {
		self.registry.remove(&self.fingerprint, self.generation);
	}
}

/// Waits until the observed state is terminal.
///
/// If the owning handshake disappears before settling, the wait ends in
/// `Failed`.
pub async fn wait_for_terminal(rx: &mut watch::Receiver<HandshakeState>) -> HandshakeState {
	loop {
		let state = *rx.borrow_and_update();
		if state.is_terminal() {
			return state;
		}
		if rx.changed().await.is_err() {
			let last = *rx.borrow();
			return if last.is_terminal() {
				last
			} else {
				HandshakeState::Failed
			};
		}
	}
}

/// Waits until the entry behind `rx` has been removed from the registry.
pub async fn wait_for_release(rx: &mut watch::Receiver<HandshakeState>) {
	while rx.changed().await.is_ok() {}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn proposal(after: &str) -> ChangeProposal {
		ChangeProposal::new("/tmp/registry.txt", "before", after)
	}

	#[test]
	fn register_then_lookup() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let handle = registry.register(p.clone()).unwrap();

		assert_eq!(handle.state(), HandshakeState::Submitted);
		assert_eq!(registry.lookup(p.fingerprint()), Some(p));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn duplicate_pending_registration_is_rejected() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let _handle = registry.register(p.clone()).unwrap();

		let err = registry.register(p.clone()).err().unwrap();
		assert!(matches!(err, ApprovalError::DuplicateFingerprint(fp) if &fp == p.fingerprint()));
	}

	#[test]
	fn settled_entry_is_held_until_its_handle_drops() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let first = registry.register(p.clone()).unwrap();
		assert!(registry.resolve(p.fingerprint(), false));

		assert!(matches!(
			registry.register_or_join(p.clone()),
			Registration::Settling(_)
		));
		assert!(registry.register(p.clone()).is_err());

		drop(first);
		let second = registry.register(p.clone()).unwrap();
		assert_eq!(second.state(), HandshakeState::Submitted);
		drop(second);
		assert!(registry.is_empty());
	}

	#[tokio::test]
	async fn release_wakes_when_settled_owner_drops() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let owner = registry.register(p.clone()).unwrap();
		registry.resolve(p.fingerprint(), true);

		let Registration::Settling(mut rx) = registry.register_or_join(p.clone()) else {
			panic!("settled entry should not be replaceable");
		};
		let waiter = tokio::spawn(async move { wait_for_release(&mut rx).await });
		drop(owner);
		waiter.await.unwrap();

		assert!(matches!(registry.register_or_join(p), Registration::Owner(_)));
	}

	#[test]
	fn resolve_is_at_most_once() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let handle = registry.register(p.clone()).unwrap();

		assert!(registry.resolve(p.fingerprint(), true));
		assert!(!registry.resolve(p.fingerprint(), false));
		assert!(!registry.resolve(p.fingerprint(), true));
		assert_eq!(handle.state(), HandshakeState::Approved);
	}

	#[test]
	fn resolve_unknown_fingerprint_is_noop() {
		let registry = PendingRegistry::new();
		let p = proposal("never registered");
		assert!(!registry.resolve(p.fingerprint(), true));
	}

	#[test]
	fn lookup_hides_settled_proposals() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let _handle = registry.register(p.clone()).unwrap();
		registry.transition(p.fingerprint(), HandshakeState::TimedOut);

		assert!(registry.lookup(p.fingerprint()).is_none());
		assert!(registry.pending().is_empty());
	}

	#[test]
	fn dropping_handle_removes_entry() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let handle = registry.register(p.clone()).unwrap();
		drop(handle);

		assert!(registry.is_empty());
		assert!(!registry.resolve(p.fingerprint(), true));
	}

	#[tokio::test]
	async fn joined_waiter_sees_owner_decision() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let _owner = match registry.register_or_join(p.clone()) {
			Registration::Owner(handle) => handle,
			_ => panic!("first registration should own the entry"),
		};
		let mut rx = match registry.register_or_join(p.clone()) {
			Registration::Joined(rx) => rx,
			_ => panic!("second registration should join"),
		};

		let waiter = tokio::spawn(async move { wait_for_terminal(&mut rx).await });
		registry.resolve(p.fingerprint(), true);

		assert_eq!(waiter.await.unwrap(), HandshakeState::Approved);
	}

	#[tokio::test]
	async fn joined_waiter_fails_when_owner_vanishes() {
		let registry = PendingRegistry::new();
		let p = proposal("after");
		let owner = registry.register(p.clone()).unwrap();
		let mut rx = registry.subscribe(p.fingerprint()).unwrap();

		drop(owner);
		assert_eq!(wait_for_terminal(&mut rx).await, HandshakeState::Failed);
	}

	proptest! {
			/// However many decisions arrive, exactly the first one sticks.
			#[test]
			fn first_decision_wins(decisions in prop::collection::vec(any::<bool>(), 1..10)) {
					let registry = PendingRegistry::new();
					let p = proposal("after");
					let handle = registry.register(p.clone()).unwrap();

					let accepted: Vec<bool> = decisions
							.iter()
							.map(|approved| registry.resolve(p.fingerprint(), *approved))
							.collect();

					prop_assert!(accepted[0]);
					prop_assert!(accepted[1..].iter().all(|a| !a));
					let expected = if decisions[0] { HandshakeState::Approved } else { HandshakeState::Rejected };
					prop_assert_eq!(handle.state(), expected);

					let mut rx = handle.subscribe();
					prop_assert_eq!(tokio_test::block_on(wait_for_terminal(&mut rx)), expected);
			}
	}
}
