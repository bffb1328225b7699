use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = drip_worker::Args::parse();
	drip_worker::run(args).await
}
