use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY_COLOR: &str = "#1a365d";
pub const DEFAULT_SECONDARY_COLOR: &str = "#c9a227";

const MAX_BIO_CHARS: usize = 1_200;

/// Specialty vocabulary scanned for in scraped profile text. Matching is
/// case-insensitive on whole phrases.
const SPECIALTY_VOCABULARY: [&str; 10] = [
	"luxury homes",
	"first-time buyers",
	"relocation",
	"investment properties",
	"new construction",
	"condos",
	"waterfront",
	"commercial",
	"foreclosures",
	"property management",
];

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct EnrichmentData {
	pub bio: Option<String>,
	pub headshot_url: Option<String>,
	pub years_experience: Option<u32>,
	pub specialties: Vec<String>,
	pub recent_sales: Vec<RecentSale>,
	pub market_stats: Option<MarketStats>,
	pub brand_colors: Option<BrandColors>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RecentSale {
	pub address: String,
	pub price: String,
	pub date: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MarketStats {
	pub average_price: String,
	pub average_days_on_market: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BrandColors {
	pub primary: String,
	pub secondary: String,
}
impl Default for BrandColors {
	fn default() -> Self {
		Self {
			primary: DEFAULT_PRIMARY_COLOR.to_string(),
			secondary: DEFAULT_SECONDARY_COLOR.to_string(),
		}
	}
}

/// Best-effort extraction from scraped profile markdown. Known-low-precision: the
/// bio comes from a crude "About" heading search and falls back to canned text.
pub fn from_markdown(lead_name: &str, markdown: &str) -> EnrichmentData {
	EnrichmentData {
		bio: Some(extract_bio(markdown).unwrap_or_else(|| canned_bio(lead_name))),
		headshot_url: extract_headshot(markdown),
		years_experience: extract_years_experience(markdown),
		specialties: extract_specialties(markdown),
		recent_sales: Vec::new(),
		market_stats: None,
		brand_colors: Some(BrandColors::default()),
	}
}

/// Fixed mock payload used when the scraper is unconfigured or unreachable.
pub fn fallback_enrichment(lead_name: &str) -> EnrichmentData {
	EnrichmentData {
		bio: Some(canned_bio(lead_name)),
		headshot_url: None,
		years_experience: None,
		specialties: vec!["luxury homes".to_string(), "first-time buyers".to_string()],
		recent_sales: Vec::new(),
		market_stats: None,
		brand_colors: Some(BrandColors::default()),
	}
}

pub fn canned_bio(lead_name: &str) -> String {
	let name = lead_name.trim();

	if name.is_empty() {
		return "A dedicated real estate professional committed to helping clients find \
			the right home and get the best outcome on every transaction."
			.to_string();
	}

	format!(
		"{name} is a dedicated real estate professional committed to helping clients \
		find the right home and get the best outcome on every transaction."
	)
}

/// First paragraph under an "About ..." heading. Returns `None` when no such
/// section is present or the section is blank.
pub fn extract_bio(markdown: &str) -> Option<String> {
	let heading = Regex::new(r"(?mi)^#{1,6}\s*about\b[^\n]*$").ok()?;
	let found = heading.find(markdown)?;
	let rest = &markdown[found.end()..];

	let mut paragraph = Vec::new();

	for line in rest.lines() {
		let trimmed = line.trim();

		if trimmed.starts_with('#') {
			break;
		}
		if trimmed.is_empty() {
			if paragraph.is_empty() {
				continue;
			}

			break;
		}

		paragraph.push(trimmed);
	}

	if paragraph.is_empty() {
		return None;
	}

	let mut bio = paragraph.join(" ");

	if bio.chars().count() > MAX_BIO_CHARS {
		bio = bio.chars().take(MAX_BIO_CHARS).collect();
	}

	Some(bio)
}

pub fn extract_specialties(markdown: &str) -> Vec<String> {
	let lowered = markdown.to_lowercase();

	SPECIALTY_VOCABULARY
		.iter()
		.filter(|phrase| lowered.contains(*phrase))
		.map(|phrase| phrase.to_string())
		.collect()
}

/// Picks up "12 years" / "12+ years of experience" style claims.
pub fn extract_years_experience(markdown: &str) -> Option<u32> {
	let pattern = Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*years?\b").ok()?;
	let captures = pattern.captures(markdown)?;

	captures.get(1)?.as_str().parse().ok()
}

fn extract_headshot(markdown: &str) -> Option<String> {
	let pattern = Regex::new(r"!\[[^\]]*\]\((https?://[^)\s]+)\)").ok()?;
	let captures = pattern.captures(markdown)?;

	Some(captures.get(1)?.as_str().to_string())
}
