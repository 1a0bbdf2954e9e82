use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sicscout_finder::Args::parse();

	sicscout_finder::run(args).await
}
