use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	/// Absent when no spreadsheet is wired up; the pipeline refuses to sweep without it.
	pub sheet: Option<Sheet>,
	pub providers: Providers,
	pub outreach: Outreach,
	#[serde(default)]
	pub pipeline: Pipeline,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Sheet {
	pub api_base: String,
	pub api_key: String,
	pub spreadsheet_id: String,
	#[serde(default = "default_sheet_tab")]
	pub tab: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub scraper: Scraper,
	pub site_builder: SiteBuilder,
	pub email: Email,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scraper {
	pub api_base: String,
	/// Missing or blank key switches enrichment to the canned fallback payload.
	pub api_key: Option<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SiteBuilder {
	/// When present, sites are created as CMS items; otherwise the template fallback
	/// URL is synthesized from lead fields.
	pub cms: Option<Cms>,
	pub template_base: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Cms {
	pub api_base: String,
	pub api_key: String,
	pub collection_id: String,
	pub site_base: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Email {
	pub smtp: Option<Smtp>,
	pub api: Option<EmailApi>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Smtp {
	pub host: String,
	#[serde(default = "default_smtp_port")]
	pub port: u16,
	pub user: String,
	pub password: String,
	pub from: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmailApi {
	pub api_base: String,
	pub api_key: String,
	pub from: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Outreach {
	pub from_name: String,
	pub checkout_url: String,
	/// Plain-text signature; newlines become line breaks in the rendered email.
	pub signature: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Pipeline {
	pub sweep_interval_secs: u64,
}
impl Default for Pipeline {
	fn default() -> Self {
		Self { sweep_interval_secs: 900 }
	}
}

fn default_sheet_tab() -> String {
	"Leads".to_string()
}

fn default_timeout_ms() -> u64 {
	15_000
}

fn default_smtp_port() -> u16 {
	587
}
