pub mod sweeper;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use drip_service::LeadService;

#[derive(Debug, Parser)]
#[command(
	version = drip_cli::VERSION,
	rename_all = "kebab",
	styles = drip_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = drip_config::load(&args.config)?;
	let filter = EnvFilter::try_new(&config.service.log_level)
		.unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = drip_storage::db::Db::connect(&config.storage.postgres).await?;
	db.ensure_schema().await?;

	let service = LeadService::new(config, db)?;

	sweeper::run_sweeper(service).await
}
