pub mod capture;
pub mod list;
pub mod sweep;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

use std::sync::Arc;

pub use capture::{CaptureRequest, CaptureResponse};
pub use list::{LeadSummary, ListRequest, ListResponse, StatsResponse, StatusCount};
pub use sweep::SweepReport;

use drip_config::Config;
use drip_domain::{enrichment::EnrichmentData, templates::RenderedEmail};
use drip_providers::{
	email::{EmailSender, SentEmail},
	scraper::ScraperClient,
	sheet::{SheetClient, SheetRow},
	sitebuilder::{GeneratedSite, SiteBuilderClient, SiteSubject},
};
use drip_storage::db::Db;

pub trait EnrichmentProvider
where
	Self: Send + Sync,
{
	fn enrich<'a>(
		&'a self,
		lead_name: &'a str,
		profile_url: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<EnrichmentData>>;
}

pub trait SiteBuilderProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		subject: &'a SiteSubject,
		enrichment: &'a EnrichmentData,
	) -> BoxFuture<'a, color_eyre::Result<GeneratedSite>>;
}

pub trait EmailProvider
where
	Self: Send + Sync,
{
	fn send<'a>(
		&'a self,
		to: &'a str,
		email: &'a RenderedEmail,
	) -> BoxFuture<'a, color_eyre::Result<SentEmail>>;
}

pub trait SheetProvider
where
	Self: Send + Sync,
{
	fn fetch_rows<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<SheetRow>>>;

	fn write_status<'a>(
		&'a self,
		row_index: i64,
		status: &'a str,
		website_link: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub enrichment: Arc<dyn EnrichmentProvider>,
	pub site_builder: Arc<dyn SiteBuilderProvider>,
	pub email: Arc<dyn EmailProvider>,
	/// `None` until a spreadsheet is wired up; the sweep refuses to run without it.
	pub sheet: Option<Arc<dyn SheetProvider>>,
}
impl Providers {
	pub fn from_config(cfg: &Config) -> color_eyre::Result<Self> {
		let sheet = match &cfg.sheet {
			Some(sheet_cfg) => Some(Arc::new(SheetGateway(SheetClient::new(sheet_cfg.clone())?))
				as Arc<dyn SheetProvider>),
			None => None,
		};

		Ok(Self {
			enrichment: Arc::new(HttpEnrichment(ScraperClient::new(
				cfg.providers.scraper.clone(),
			)?)),
			site_builder: Arc::new(HttpSiteBuilder(SiteBuilderClient::new(
				cfg.providers.site_builder.clone(),
			)?)),
			email: Arc::new(EmailDelivery(EmailSender::from_config(
				&cfg.providers.email,
				&cfg.outreach.from_name,
			)?)),
			sheet,
		})
	}
}

pub struct LeadService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl LeadService {
	pub fn new(cfg: Config, db: Db) -> color_eyre::Result<Self> {
		let providers = Providers::from_config(&cfg)?;

		Ok(Self { cfg, db, providers })
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}
}

struct HttpEnrichment(ScraperClient);

impl EnrichmentProvider for HttpEnrichment {
	fn enrich<'a>(
		&'a self,
		lead_name: &'a str,
		profile_url: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<EnrichmentData>> {
		// The scraper degrades to the canned payload internally, so the default
		// enrichment path never errors.
		Box::pin(async move { Ok(self.0.enrich(lead_name, profile_url).await) })
	}
}

struct HttpSiteBuilder(SiteBuilderClient);

impl SiteBuilderProvider for HttpSiteBuilder {
	fn generate<'a>(
		&'a self,
		subject: &'a SiteSubject,
		enrichment: &'a EnrichmentData,
	) -> BoxFuture<'a, color_eyre::Result<GeneratedSite>> {
		Box::pin(self.0.generate(subject, enrichment))
	}
}

struct EmailDelivery(EmailSender);

impl EmailProvider for EmailDelivery {
	fn send<'a>(
		&'a self,
		to: &'a str,
		email: &'a RenderedEmail,
	) -> BoxFuture<'a, color_eyre::Result<SentEmail>> {
		Box::pin(self.0.send(to, email))
	}
}

struct SheetGateway(SheetClient);

impl SheetProvider for SheetGateway {
	fn fetch_rows<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<SheetRow>>> {
		Box::pin(self.0.fetch_rows())
	}

	fn write_status<'a>(
		&'a self,
		row_index: i64,
		status: &'a str,
		website_link: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(self.0.write_status(row_index, status, website_link))
	}
}
