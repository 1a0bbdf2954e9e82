use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sicscout_api::Args::parse();

	sicscout_api::run(args).await
}
