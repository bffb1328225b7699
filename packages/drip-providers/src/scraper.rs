use color_eyre::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use drip_domain::enrichment::{self, EnrichmentData};

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
	data: ScrapeData,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
	markdown: Option<String>,
}

/// Profile scraper. Enrichment never fails the pipeline: no key, no URL, or any
/// transport error all degrade to the canned fallback payload.
pub struct ScraperClient {
	cfg: drip_config::Scraper,
	client: Client,
}
impl ScraperClient {
	pub fn new(cfg: drip_config::Scraper) -> Result<Self> {
		let client = crate::http_client(cfg.timeout_ms)?;

		Ok(Self { cfg, client })
	}

	pub async fn enrich(&self, lead_name: &str, profile_url: Option<&str>) -> EnrichmentData {
		let Some(api_key) = self.cfg.api_key.as_deref() else {
			return enrichment::fallback_enrichment(lead_name);
		};
		let Some(url) = profile_url.map(str::trim).filter(|url| !url.is_empty()) else {
			return enrichment::fallback_enrichment(lead_name);
		};

		match self.scrape(api_key, url).await {
			Ok(markdown) => enrichment::from_markdown(lead_name, &markdown),
			Err(e) => {
				tracing::warn!("scrape of {url} failed, using fallback enrichment: {e}");

				enrichment::fallback_enrichment(lead_name)
			},
		}
	}

	async fn scrape(&self, api_key: &str, url: &str) -> Result<String> {
		let endpoint = format!("{}/v1/scrape", self.cfg.api_base.trim_end_matches('/'));
		let response: ScrapeResponse = self
			.client
			.post(endpoint)
			.bearer_auth(api_key)
			.json(&json!({ "url": url, "formats": ["markdown"] }))
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		response
			.data
			.markdown
			.filter(|markdown| !markdown.trim().is_empty())
			.ok_or_else(|| color_eyre::eyre::eyre!("scrape response carried no markdown"))
	}
}
