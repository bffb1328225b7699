use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use drip_domain::enrichment::EnrichmentData;

const MAX_TEMPLATE_BIO_CHARS: usize = 400;

/// Lead fields the site is generated from.
#[derive(Clone, Debug, Default)]
pub struct SiteSubject {
	pub name: String,
	pub business_name: Option<String>,
	pub city: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedSite {
	pub url: String,
	/// CMS item id when the site was published through the CMS; `None` for
	/// template-URL sites.
	pub deploy_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CmsItemResponse {
	id: String,
}

/// Builds a personalized one-page site per lead. With CMS credentials the lead is
/// published as a collection item; otherwise a prefilled template URL is
/// synthesized locally.
pub struct SiteBuilderClient {
	cfg: drip_config::SiteBuilder,
	client: Client,
}
impl SiteBuilderClient {
	pub fn new(cfg: drip_config::SiteBuilder) -> Result<Self> {
		let client = crate::http_client(cfg.timeout_ms)?;

		Ok(Self { cfg, client })
	}

	pub async fn generate(
		&self,
		subject: &SiteSubject,
		enrichment: &EnrichmentData,
	) -> Result<GeneratedSite> {
		match &self.cfg.cms {
			Some(cms) => self.publish_cms_item(cms, subject, enrichment).await,
			None => Ok(GeneratedSite {
				url: template_url(&self.cfg.template_base, subject, enrichment)?,
				deploy_id: None,
			}),
		}
	}

	async fn publish_cms_item(
		&self,
		cms: &drip_config::Cms,
		subject: &SiteSubject,
		enrichment: &EnrichmentData,
	) -> Result<GeneratedSite> {
		let slug = slugify(&subject.name);

		if slug.is_empty() {
			return Err(eyre::eyre!("Lead name produces an empty site slug."));
		}

		let endpoint = format!(
			"{}/collections/{}/items",
			cms.api_base.trim_end_matches('/'),
			cms.collection_id
		);
		let colors = enrichment.brand_colors.clone().unwrap_or_default();
		let body = json!({
			"fields": {
				"name": subject.name,
				"slug": slug,
				"business-name": subject.business_name,
				"city": subject.city,
				"email": subject.email,
				"phone": subject.phone,
				"bio": enrichment.bio,
				"headshot-url": enrichment.headshot_url,
				"years-experience": enrichment.years_experience,
				"specialties": enrichment.specialties.join(", "),
				"primary-color": colors.primary,
				"secondary-color": colors.secondary,
			},
		});
		let item: CmsItemResponse = self
			.client
			.post(endpoint)
			.bearer_auth(&cms.api_key)
			.json(&body)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		Ok(GeneratedSite {
			url: format!("{}/{slug}", cms.site_base.trim_end_matches('/')),
			deploy_id: Some(item.id),
		})
	}
}

/// Template site URL with lead fields carried as query parameters. The bio is
/// capped so the URL stays within sane length limits.
pub fn template_url(
	template_base: &str,
	subject: &SiteSubject,
	enrichment: &EnrichmentData,
) -> Result<String> {
	let mut url = Url::parse(template_base)?;

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("name", &subject.name);

		if let Some(business) = subject.business_name.as_deref() {
			pairs.append_pair("business", business);
		}
		if let Some(city) = subject.city.as_deref() {
			pairs.append_pair("city", city);
		}
		if let Some(email) = subject.email.as_deref() {
			pairs.append_pair("email", email);
		}
		if let Some(phone) = subject.phone.as_deref() {
			pairs.append_pair("phone", phone);
		}
		if let Some(bio) = enrichment.bio.as_deref() {
			pairs.append_pair("bio", &truncate_chars(bio, MAX_TEMPLATE_BIO_CHARS));
		}
		if !enrichment.specialties.is_empty() {
			pairs.append_pair("specialties", &enrichment.specialties.join(","));
		}
	}

	Ok(url.into())
}

pub fn slugify(name: &str) -> String {
	let mut slug = String::new();
	let mut last_dash = true;

	for c in name.trim().chars() {
		if c.is_ascii_alphanumeric() {
			slug.push(c.to_ascii_lowercase());

			last_dash = false;
		} else if !last_dash {
			slug.push('-');

			last_dash = true;
		}
	}

	slug.trim_end_matches('-').to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
	text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn slugifies_names() {
		assert_eq!(slugify("Jane Doe"), "jane-doe");
		assert_eq!(slugify("  Jane   O'Brien  "), "jane-o-brien");
		assert_eq!(slugify("Ana-María Núñez"), "ana-mar-a-n-ez");
		assert_eq!(slugify("!!!"), "");
	}

	#[test]
	fn template_url_carries_lead_fields() {
		let subject = SiteSubject {
			name: "Jane Doe".to_string(),
			business_name: Some("Acme Realty".to_string()),
			city: Some("Austin".to_string()),
			email: Some("jane@example.com".to_string()),
			phone: None,
		};
		let enrichment = EnrichmentData {
			bio: Some("Short bio.".to_string()),
			specialties: vec!["luxury homes".to_string(), "condos".to_string()],
			..EnrichmentData::default()
		};
		let url = template_url("https://sites.example.com/agent", &subject, &enrichment)
			.expect("template URL");

		assert!(url.starts_with("https://sites.example.com/agent?"));
		assert!(url.contains("name=Jane+Doe"));
		assert!(url.contains("business=Acme+Realty"));
		assert!(url.contains("city=Austin"));
		assert!(url.contains("specialties=luxury+homes%2Ccondos"));
		assert!(!url.contains("phone="));
	}

	#[test]
	fn template_url_caps_the_bio() {
		let subject = SiteSubject { name: "Jane".to_string(), ..SiteSubject::default() };
		let enrichment =
			EnrichmentData { bio: Some("x".repeat(2_000)), ..EnrichmentData::default() };
		let url = template_url("https://sites.example.com/agent", &subject, &enrichment)
			.expect("template URL");
		let parsed = Url::parse(&url).expect("parse");
		let bio = parsed
			.query_pairs()
			.find(|(key, _)| key == "bio")
			.map(|(_, value)| value.into_owned())
			.expect("bio param");

		assert_eq!(bio.chars().count(), MAX_TEMPLATE_BIO_CHARS);
	}
}
