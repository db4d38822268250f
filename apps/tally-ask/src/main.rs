use clap::Parser;

use tally_ask::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	tally_ask::run(Args::parse()).await
}
