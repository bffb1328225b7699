use drip_domain::enrichment;
use drip_providers::{
	email::EmailSender,
	scraper::ScraperClient,
	sitebuilder::{SiteBuilderClient, SiteSubject},
};

fn email_config(smtp: bool, api: bool) -> drip_config::Email {
	drip_config::Email {
		smtp: smtp.then(|| drip_config::Smtp {
			host: "smtp.example.com".to_string(),
			port: 587,
			user: "mailer".to_string(),
			password: "secret".to_string(),
			from: "Ava <ava@example.com>".to_string(),
		}),
		api: api.then(|| drip_config::EmailApi {
			api_base: "https://mail.example.com".to_string(),
			api_key: "key".to_string(),
			from: "Ava <ava@example.com>".to_string(),
			timeout_ms: 1_000,
		}),
	}
}

#[tokio::test]
async fn email_sender_prefers_smtp_then_api_then_unconfigured() {
	let smtp = EmailSender::from_config(&email_config(true, true), "Ava Reyes").expect("smtp sender");
	let api = EmailSender::from_config(&email_config(false, true), "Ava Reyes").expect("api sender");
	let none =
		EmailSender::from_config(&email_config(false, false), "Ava Reyes").expect("unconfigured");

	assert_eq!(smtp.transport_name(), "smtp");
	assert_eq!(api.transport_name(), "api");
	assert_eq!(none.transport_name(), "unconfigured");
}

#[tokio::test]
async fn unconfigured_sender_refuses_to_send() {
	let sender =
		EmailSender::from_config(&email_config(false, false), "Ava Reyes").expect("unconfigured");
	let email = drip_domain::templates::RenderedEmail {
		subject: "Hello".to_string(),
		html: "<p>Hello</p>".to_string(),
	};
	let result = sender.send("jane@example.com", &email).await;

	assert!(result.is_err());
}

#[tokio::test]
async fn scraper_without_key_uses_fallback_enrichment() {
	let client = ScraperClient::new(drip_config::Scraper {
		api_base: "https://scrape.example.com".to_string(),
		api_key: None,
		timeout_ms: 1_000,
	})
	.expect("scraper client");
	let data = client.enrich("Jane Doe", Some("https://realty.example.com/jane")).await;

	assert_eq!(data, enrichment::fallback_enrichment("Jane Doe"));
}

#[tokio::test]
async fn scraper_without_profile_url_uses_fallback_enrichment() {
	let client = ScraperClient::new(drip_config::Scraper {
		api_base: "https://scrape.example.com".to_string(),
		api_key: Some("key".to_string()),
		timeout_ms: 1_000,
	})
	.expect("scraper client");

	assert_eq!(client.enrich("Jane Doe", None).await, enrichment::fallback_enrichment("Jane Doe"));
	assert_eq!(
		client.enrich("Jane Doe", Some("  ")).await,
		enrichment::fallback_enrichment("Jane Doe")
	);
}

#[tokio::test]
async fn site_builder_without_cms_synthesizes_a_template_url() {
	let client = SiteBuilderClient::new(drip_config::SiteBuilder {
		cms: None,
		template_base: "https://sites.example.com/agent".to_string(),
		timeout_ms: 1_000,
	})
	.expect("site builder");
	let subject = SiteSubject {
		name: "Jane Doe".to_string(),
		city: Some("Austin".to_string()),
		..SiteSubject::default()
	};
	let site = client
		.generate(&subject, &enrichment::fallback_enrichment("Jane Doe"))
		.await
		.expect("generated site");

	assert!(site.url.starts_with("https://sites.example.com/agent?"));
	assert!(site.url.contains("name=Jane+Doe"));
	assert_eq!(site.deploy_id, None);
}
