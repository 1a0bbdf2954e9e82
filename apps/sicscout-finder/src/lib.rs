pub mod report;

use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use sicscout_domain::CompanyRecord;
use sicscout_service::{SearchPlan, SearchService, export};

use crate::report::ChainSummary;

#[derive(Debug, Parser)]
#[command(
	version = sicscout_cli::VERSION,
	rename_all = "kebab",
	styles = sicscout_cli::styles(),
	after_help = sicscout_cli::AFTER_HELP,
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Overrides `finder.output`.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sicscout_config::load(&args.config)?;

	init_tracing(&config);

	let Some(finder) = config.finder.as_ref() else {
		return Err(eyre::eyre!("The configuration has no [finder] section."));
	};
	let plan = SearchPlan::from_finder(finder);
	let output = args.output.unwrap_or_else(|| PathBuf::from(&finder.output));
	let classify = finder.classify;
	let channel_rules = finder.channel_rules.clone();
	let service = SearchService::new(config)?;
	let mut records = service.search(&plan).await?;

	if records.is_empty() {
		tracing::warn!("No companies found. Check the API key and search criteria.");

		return Ok(());
	}

	report::rank(&mut records);

	if classify {
		service.classify_companies(&mut records, channel_rules.as_deref()).await;
	}

	write_workbook(&records, &output)?;
	log_summary(&records, &output);

	Ok(())
}

fn write_workbook(records: &[CompanyRecord], output: &Path) -> color_eyre::Result<()> {
	let rows = records.iter().map(CompanyRecord::to_row).collect::<Vec<_>>();
	let columns = report::ordered_columns(&rows);
	let bytes = export::export_xlsx(&export::ExportRequest::new(rows).with_columns(columns))?;

	if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}

	fs::write(output, bytes)?;

	Ok(())
}

fn log_summary(records: &[CompanyRecord], output: &Path) {
	let summary = ChainSummary::tally(records);

	tracing::info!(
		total = records.len(),
		likely_chain = summary.yes,
		likely_independent = summary.no,
		unknown = summary.unknown,
		output = %output.display(),
		"Finder run complete."
	);
}

fn init_tracing(config: &sicscout_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
