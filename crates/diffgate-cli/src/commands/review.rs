// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reviewer side of the mailbox.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use diffgate_approval::{Fingerprint, MailboxRequest};
use diffgate_cli_config::Settings;
use similar::{ChangeTag, TextDiff};
use tracing::{info, instrument};

use super::mailbox;

#[derive(Debug, Clone, Args)]
pub struct RespondArgs {
	/// Request fingerprint
	pub hash: String,

	/// Apply the change
	#[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
	pub approve: bool,

	/// Discard the change
	#[arg(long)]
	pub reject: bool,
}

impl RespondArgs {
	pub fn approved(&self) -> bool {
		self.approve && !self.reject
	}
}

fn parse_fingerprint(hash: &str) -> Result<Fingerprint> {
	hash.parse::<Fingerprint>()
		.with_context(|| format!("invalid fingerprint {hash:?}"))
}

/// `(additions, deletions)` in lines.
fn diff_stats(original: &str, modified: &str) -> (usize, usize) {
	TextDiff::from_lines(original, modified)
		.iter_all_changes()
		.fold((0, 0), |(add, del), change| match change.tag() {
			ChangeTag::Insert => (add + 1, del),
			ChangeTag::Delete => (add, del + 1),
			ChangeTag::Equal => (add, del),
		})
}

fn render_diff(request: &MailboxRequest) -> String {
	let diff = TextDiff::from_lines(&request.original, &request.modified);
	let old_header = format!("a/{}", request.filepath.trim_start_matches('/'));
	let new_header = format!("b/{}", request.filepath.trim_start_matches('/'));
	diff
		.unified_diff()
		.context_radius(3)
		.header(&old_header, &new_header)
		.to_string()
}

fn format_age(request: &MailboxRequest) -> String {
	let Some(submitted_at) = request.submitted_at() else {
		return "?".to_string();
	};
	let secs = (Utc::now() - submitted_at).num_seconds().max(0);
	if secs < 60 {
		format!("{secs}s")
	} else {
		format!("{}m{:02}s", secs / 60, secs % 60)
	}
}

fn pending_line(request: &MailboxRequest) -> String {
	let (add, del) = diff_stats(&request.original, &request.modified);
	format!(
		"{}  {:>7}  +{add} -{del}  {}",
		request.hash,
		format_age(request),
		request.filepath
	)
}

pub async fn pending(settings: &Settings, json: bool) -> Result<ExitCode> {
	let requests = mailbox(settings)
		.list_requests()
		.await
		.context("failed to list mailbox requests")?;

	if json {
		println!("{}", serde_json::to_string_pretty(&requests)?);
	} else if requests.is_empty() {
		println!("No pending requests");
	} else {
		for request in &requests {
			println!("{}", pending_line(request));
		}
	}
	Ok(ExitCode::SUCCESS)
}

async fn load_request(settings: &Settings, hash: &str) -> Result<Option<MailboxRequest>> {
	let fingerprint = parse_fingerprint(hash)?;
	mailbox(settings)
		.read_request(&fingerprint)
		.await
		.context("failed to read mailbox request")
}

pub async fn show(settings: &Settings, hash: &str, json: bool) -> Result<ExitCode> {
	let Some(request) = load_request(settings, hash).await? else {
		eprintln!("No pending request {hash}");
		return Ok(ExitCode::FAILURE);
	};

	if json {
		println!("{}", serde_json::to_string_pretty(&request)?);
		return Ok(ExitCode::SUCCESS);
	}

	let (add, del) = diff_stats(&request.original, &request.modified);
	println!("File:      {}", request.filepath);
	if let Some(submitted_at) = request.submitted_at() {
		println!("Submitted: {}", submitted_at.to_rfc3339());
	}
	println!("Changes:   +{add} -{del}");
	println!();
	print!("{}", render_diff(&request));
	Ok(ExitCode::SUCCESS)
}

/// Writes the decision. `false` when no request with that fingerprint is live.
async fn submit(settings: &Settings, args: &RespondArgs) -> Result<bool> {
	let fingerprint = parse_fingerprint(&args.hash)?;
	mailbox(settings)
		.submit_response(&fingerprint, args.approved())
		.await
		.context("failed to write response")
}

#[instrument(skip(settings, args), fields(hash = %args.hash, approved = args.approved()))]
pub async fn respond(settings: &Settings, args: &RespondArgs) -> Result<ExitCode> {
	if !submit(settings, args).await? {
		eprintln!("No pending request {}", args.hash);
		return Ok(ExitCode::FAILURE);
	}

	info!("response written");
	println!(
		"{}",
		if args.approved() {
			"Diff approved"
		} else {
			"Diff rejected"
		}
	);
	Ok(ExitCode::SUCCESS)
}
