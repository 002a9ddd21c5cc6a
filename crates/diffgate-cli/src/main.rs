// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! diffgate - approval-gated file edits
//!
//! The proposing side runs tools through `diffgate call`, which blocks until a
//! reviewer decides. The reviewing side uses `pending`, `show` and `respond`
//! against the same mailbox directory.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use diffgate_cli_config::{load_settings, SettingsLayer};

use commands::RespondArgs;

/// diffgate - approval-gated file edits
#[derive(Parser, Debug)]
#[command(name = "diffgate", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Workspace directory relative tool paths resolve against
	#[arg(short, long)]
	workspace: Option<PathBuf>,

	/// Mailbox directory shared with the reviewer (or set DIFFGATE_MAILBOX_DIR)
	#[arg(long)]
	mailbox_dir: Option<PathBuf>,

	/// Seconds to wait for a reviewer decision
	#[arg(long)]
	timeout_secs: Option<u64>,

	/// Output logs as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print tool definitions as JSON
	Tools,
	/// Run one tool and print its result
	Call {
		/// Tool name, e.g. Edit
		tool: String,
		/// Tool arguments as a JSON object
		#[arg(default_value = "{}")]
		args: String,
	},
	/// List requests waiting for a decision
	Pending {
		/// Output raw JSON
		#[arg(long)]
		json: bool,
	},
	/// Show a pending request and its diff
	Show {
		/// Request fingerprint
		hash: String,
		/// Print the raw request, including full original and modified text
		#[arg(long)]
		json: bool,
	},
	/// Approve or reject a pending request
	Respond(RespondArgs),
}

impl Args {
	fn settings_layer(&self) -> SettingsLayer {
		SettingsLayer {
			mailbox_dir: self.mailbox_dir.clone(),
			timeout_secs: self.timeout_secs,
			poll_interval_ms: None,
			workspace_root: self.workspace.clone(),
		}
	}
}

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	// stdout carries tool output
	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();
	init_tracing(args.json_logs);

	let settings = load_settings(args.settings_layer(), args.config.as_deref())
		.context("failed to load configuration")?;
	debug!(
			mailbox_dir = %settings.mailbox_dir.display(),
			workspace_root = %settings.workspace_root.display(),
			"starting diffgate"
	);

	match args.command {
		Command::Tools => commands::tools(&settings),
		Command::Call { tool, args } => commands::call(&settings, &tool, &args).await,
		Command::Pending { json } => commands::pending(&settings, json).await,
		Command::Show { hash, json } => commands::show(&settings, &hash, json).await,
		Command::Respond(respond) => commands::respond(&settings, &respond).await,
	}
}
