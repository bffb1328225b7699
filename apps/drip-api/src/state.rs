use std::sync::Arc;

use drip_service::LeadService;
use drip_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LeadService>,
}
impl AppState {
	pub async fn new(config: drip_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = LeadService::new(config, db)?;

		Ok(Self { service: Arc::new(service) })
	}
}
