use std::{
	fs, io,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use tally_domain::SourceRecords;
use tally_service::{AccountService, AnswerRequest};

/// Answer one question about an account from its exported records.
#[derive(Debug, Parser)]
#[command(
	version = tally_cli::VERSION,
	rename_all = "kebab",
	styles = tally_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Normalized account records as JSON.
	#[arg(long, short = 'd', value_name = "FILE")]
	pub data: PathBuf,
	/// Query time, e.g. 2025-09-15T12:00:00Z. Defaults to now.
	#[arg(long, value_name = "TIMESTAMP")]
	pub now: Option<String>,
	/// Fail when any detected fact cannot be resolved.
	#[arg(long)]
	pub strict: bool,
	#[arg(long)]
	pub pretty: bool,
	pub query: String,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = tally_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	let now = args.now.as_deref().map(parse_now).transpose()?;
	let records = read_records(&args.data)?;
	let service = AccountService::new(config);
	let version = service.reload(&records).await?;

	tracing::info!(version, data = %args.data.display(), "Loaded account records.");

	let response = service.answer(AnswerRequest { query: args.query, now }).await?;

	if args.strict
		&& let Some(err) = response.first_unresolved()
	{
		return Err(err.into());
	}

	let rendered = if args.pretty {
		serde_json::to_string_pretty(&response)?
	} else {
		serde_json::to_string(&response)?
	};

	println!("{rendered}");

	Ok(())
}

fn read_records(path: &Path) -> color_eyre::Result<SourceRecords> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read records from {}.", path.display()))?;

	serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse records from {}.", path.display()))
}

fn parse_now(raw: &str) -> color_eyre::Result<OffsetDateTime> {
	tally_domain::time_serde::parse_lenient(raw)
		.ok_or_else(|| eyre::eyre!("Invalid --now timestamp {raw:?}."))
}
