use std::sync::{Arc, Mutex};

use drip_config::{
	Config, Email, Outreach, Pipeline, Postgres, Providers as ProviderConfig, Scraper, Service,
	Sheet, SiteBuilder, Storage,
};
use drip_domain::{enrichment, enrichment::EnrichmentData, templates::RenderedEmail};
use drip_providers::{
	email::SentEmail,
	sheet::SheetRow,
	sitebuilder::{GeneratedSite, SiteSubject, slugify},
};
use drip_service::{
	BoxFuture, CaptureRequest, EmailProvider, EnrichmentProvider, Error, LeadService, Providers,
	SheetProvider, SiteBuilderProvider, capture, list, sweep,
};
use drip_storage::{db::Db, queries};
use drip_testkit::TestDatabase;

fn test_config(dsn: &str) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage { postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 2 } },
		sheet: Some(Sheet {
			api_base: "https://sheets.example.com/v4".to_string(),
			api_key: "test".to_string(),
			spreadsheet_id: "sheet-1".to_string(),
			tab: "Leads".to_string(),
			timeout_ms: 1_000,
		}),
		providers: ProviderConfig {
			scraper: Scraper {
				api_base: "https://scrape.example.com".to_string(),
				api_key: None,
				timeout_ms: 1_000,
			},
			site_builder: SiteBuilder {
				cms: None,
				template_base: "https://sites.example.com/agent".to_string(),
				timeout_ms: 1_000,
			},
			email: Email { smtp: None, api: None },
		},
		outreach: Outreach {
			from_name: "Ava Reyes".to_string(),
			checkout_url: "https://buy.example.com/checkout".to_string(),
			signature: "Ava Reyes\nDrip".to_string(),
		},
		pipeline: Pipeline::default(),
	}
}

#[derive(Default)]
struct MockSheet {
	rows: Mutex<Vec<SheetRow>>,
	writes: Mutex<Vec<(i64, String, Option<String>)>>,
}
impl SheetProvider for MockSheet {
	fn fetch_rows<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<SheetRow>>> {
		Box::pin(async move { Ok(self.rows.lock().expect("rows lock").clone()) })
	}

	fn write_status<'a>(
		&'a self,
		row_index: i64,
		status: &'a str,
		website_link: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			self.writes.lock().expect("writes lock").push((
				row_index,
				status.to_string(),
				website_link.map(str::to_string),
			));

			Ok(())
		})
	}
}

struct MockEnrichment {
	fail: Mutex<bool>,
}
impl EnrichmentProvider for MockEnrichment {
	fn enrich<'a>(
		&'a self,
		lead_name: &'a str,
		_profile_url: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<EnrichmentData>> {
		Box::pin(async move {
			if *self.fail.lock().expect("fail lock") {
				return Err(color_eyre::eyre::eyre!("scrape quota exhausted"));
			}

			Ok(enrichment::fallback_enrichment(lead_name))
		})
	}
}

struct MockSiteBuilder;

impl SiteBuilderProvider for MockSiteBuilder {
	fn generate<'a>(
		&'a self,
		subject: &'a SiteSubject,
		_enrichment: &'a EnrichmentData,
	) -> BoxFuture<'a, color_eyre::Result<GeneratedSite>> {
		Box::pin(async move {
			Ok(GeneratedSite {
				url: format!("https://sites.example.com/{}", slugify(&subject.name)),
				deploy_id: None,
			})
		})
	}
}

#[derive(Default)]
struct MockEmail {
	sent: Mutex<Vec<(String, String)>>,
}
impl EmailProvider for MockEmail {
	fn send<'a>(
		&'a self,
		to: &'a str,
		email: &'a RenderedEmail,
	) -> BoxFuture<'a, color_eyre::Result<SentEmail>> {
		Box::pin(async move {
			let mut sent = self.sent.lock().expect("sent lock");

			sent.push((to.to_string(), email.subject.clone()));

			Ok(SentEmail { message_id: format!("<msg-{}@drip.local>", sent.len()) })
		})
	}
}

struct Harness {
	service: LeadService,
	sheet: Arc<MockSheet>,
	enrichment: Arc<MockEnrichment>,
	email: Arc<MockEmail>,
}

async fn harness(dsn: &str, rows: Vec<SheetRow>) -> Harness {
	let cfg = test_config(dsn);
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let sheet = Arc::new(MockSheet { rows: Mutex::new(rows), writes: Mutex::new(Vec::new()) });
	let enrichment = Arc::new(MockEnrichment { fail: Mutex::new(false) });
	let email = Arc::new(MockEmail::default());
	let providers = Providers {
		enrichment: enrichment.clone(),
		site_builder: Arc::new(MockSiteBuilder),
		email: email.clone(),
		sheet: Some(sheet.clone()),
	};
	let service = LeadService::with_providers(cfg, db, providers);

	Harness { service, sheet, enrichment, email }
}

fn sheet_row(index: i64, name: &str, email: &str, status: Option<&str>) -> SheetRow {
	SheetRow {
		row_index: index,
		name: Some(name.to_string()),
		email: Some(email.to_string()),
		status: status.map(str::to_string),
		..SheetRow::default()
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DRIP_PG_DSN to run."]
async fn one_sweep_carries_a_new_row_through_to_the_initial_email() {
	let Some(base_dsn) = drip_testkit::env_dsn() else {
		eprintln!(
			"Skipping one_sweep_carries_a_new_row_through_to_the_initial_email; set DRIP_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let h = harness(
		test_db.dsn(),
		vec![
			sheet_row(2, "Jane Doe", "jane@example.com", None),
			sheet_row(3, "Already Done", "done@example.com", Some("Email Sent")),
		],
	)
	.await;
	let report = sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	assert!(!report.logs.is_empty());

	// Only the blank-status row is imported, and the stages cascade in one pass.
	let lead = queries::lead_by_email(&h.service.db, "jane@example.com")
		.await
		.expect("Failed to fetch lead.")
		.expect("Lead should exist.");

	assert_eq!(lead.status, "outreach_active");
	assert_eq!(lead.outreach_stage, 1);
	assert!(lead.website_url.as_deref().unwrap_or("").contains("jane-doe"));
	assert!(lead.next_follow_up_at.is_some());
	assert!(
		queries::lead_by_email(&h.service.db, "done@example.com")
			.await
			.expect("Failed to fetch lead.")
			.is_none()
	);

	let writes = h.sheet.writes.lock().expect("writes lock").clone();

	assert!(writes.contains(&(2, "Processing".to_string(), None)));
	assert!(writes.iter().any(|(row, status, link)| *row == 2
		&& status == "Site Ready"
		&& link.as_deref().unwrap_or("").contains("jane-doe")));
	assert!(writes.contains(&(2, "Email Sent".to_string(), None)));

	let sent = h.email.sent.lock().expect("sent lock").clone();

	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].0, "jane@example.com");

	// A second sweep must not re-import or re-send.
	sweep::run_sweep(&h.service).await.expect("Second sweep failed.");

	assert_eq!(h.email.sent.lock().expect("sent lock").len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DRIP_PG_DSN to run."]
async fn follow_ups_fire_on_the_cadence_and_stop_after_the_final_email() {
	let Some(base_dsn) = drip_testkit::env_dsn() else {
		eprintln!(
			"Skipping follow_ups_fire_on_the_cadence_and_stop_after_the_final_email; set DRIP_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let h = harness(test_db.dsn(), vec![sheet_row(2, "Jane Doe", "jane@example.com", None)]).await;

	sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	// Freshly contacted: the very next sweep sends nothing new.
	sweep::run_sweep(&h.service).await.expect("Sweep failed.");
	assert_eq!(h.email.sent.lock().expect("sent lock").len(), 1);

	// Walk the whole rotation by back-dating the last contact before each sweep.
	for (days_ago, expected_stage) in [(3, 2), (4, 3), (3, 4)] {
		sqlx::query(&format!(
			"UPDATE leads SET last_contacted_at = now() - interval '{days_ago} days'"
		))
		.execute(&h.service.db.pool)
		.await
		.expect("Failed to back-date contact.");
		sweep::run_sweep(&h.service).await.expect("Sweep failed.");

		let lead = queries::lead_by_email(&h.service.db, "jane@example.com")
			.await
			.expect("Failed to fetch lead.")
			.expect("Lead should exist.");

		assert_eq!(lead.outreach_stage, expected_stage);
	}

	// Stage 4 is out of the rotation even a year later.
	sqlx::query("UPDATE leads SET last_contacted_at = now() - interval '365 days'")
		.execute(&h.service.db.pool)
		.await
		.expect("Failed to back-date contact.");
	sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	let sent = h.email.sent.lock().expect("sent lock").clone();

	assert_eq!(sent.len(), 4);

	let lead = queries::lead_by_email(&h.service.db, "jane@example.com")
		.await
		.expect("Failed to fetch lead.")
		.expect("Lead should exist.");

	assert_eq!(lead.outreach_stage, 4);
	assert_eq!(lead.next_follow_up_at, None);
	assert_eq!(lead.outreach_logs.as_array().map(Vec::len), Some(4));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DRIP_PG_DSN to run."]
async fn enrichment_failures_leave_the_lead_retryable() {
	let Some(base_dsn) = drip_testkit::env_dsn() else {
		eprintln!("Skipping enrichment_failures_leave_the_lead_retryable; set DRIP_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let h = harness(test_db.dsn(), vec![sheet_row(2, "Jane Doe", "jane@example.com", None)]).await;

	*h.enrichment.fail.lock().expect("fail lock") = true;
	sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	let lead = queries::lead_by_email(&h.service.db, "jane@example.com")
		.await
		.expect("Failed to fetch lead.")
		.expect("Lead should exist.");

	assert_eq!(lead.status, "new");
	assert!(lead.error_message.as_deref().unwrap_or("").contains("quota"));
	assert_eq!(h.email.sent.lock().expect("sent lock").len(), 0);

	// Provider recovers; the next sweep picks the lead up again and clears the error.
	*h.enrichment.fail.lock().expect("fail lock") = false;
	sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	let lead = queries::lead_by_email(&h.service.db, "jane@example.com")
		.await
		.expect("Failed to fetch lead.")
		.expect("Lead should exist.");

	assert_eq!(lead.status, "outreach_active");
	assert_eq!(lead.error_message, None);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DRIP_PG_DSN to run."]
async fn email_less_rows_are_skipped_and_leads_never_fail_automatically() {
	let Some(base_dsn) = drip_testkit::env_dsn() else {
		eprintln!(
			"Skipping email_less_rows_are_skipped_and_leads_never_fail_automatically; set DRIP_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let phone_only_row = SheetRow {
		row_index: 2,
		name: Some("Phone Only".to_string()),
		phone: Some("+1 555 0100".to_string()),
		..SheetRow::default()
	};
	let h = harness(test_db.dsn(), vec![phone_only_row]).await;

	sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	// Email is the import key; the phone-only row never becomes a lead.
	let stats = list::stats(&h.service).await.expect("Stats failed.");

	assert_eq!(stats.total, 0);
	assert!(h.sheet.writes.lock().expect("writes lock").is_empty());

	// A captured phone-only lead advances to site_built, then waits there.
	let captured = capture::capture(&h.service, CaptureRequest {
		name: Some("Phone Only".to_string()),
		phone: Some("+1 555 0100".to_string()),
		source: "landing_page".to_string(),
		..CaptureRequest::default()
	})
	.await
	.expect("Capture failed.");

	sweep::run_sweep(&h.service).await.expect("Sweep failed.");
	sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	let lead = queries::lead_by_id(&h.service.db, captured.lead_id)
		.await
		.expect("Failed to fetch lead.")
		.expect("Lead should exist.");

	assert_eq!(lead.status, "site_built");
	assert_eq!(lead.error_message, None);
	assert_eq!(h.email.sent.lock().expect("sent lock").len(), 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DRIP_PG_DSN to run."]
async fn leads_stranded_mid_enrichment_are_swept_again() {
	let Some(base_dsn) = drip_testkit::env_dsn() else {
		eprintln!("Skipping leads_stranded_mid_enrichment_are_swept_again; set DRIP_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let h = harness(test_db.dsn(), Vec::new()).await;
	let captured = capture::capture(&h.service, CaptureRequest {
		name: Some("Jane Doe".to_string()),
		email: Some("jane@example.com".to_string()),
		source: "landing_page".to_string(),
		..CaptureRequest::default()
	})
	.await
	.expect("Capture failed.");

	// Simulate a sweep that claimed the lead and died before recording a result.
	queries::update_status(&h.service.db, captured.lead_id, "processing")
		.await
		.expect("Failed to set status.");
	sweep::run_sweep(&h.service).await.expect("Sweep failed.");

	let lead = queries::lead_by_id(&h.service.db, captured.lead_id)
		.await
		.expect("Failed to fetch lead.")
		.expect("Lead should exist.");

	assert_eq!(lead.status, "outreach_active");
	assert_eq!(h.email.sent.lock().expect("sent lock").len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DRIP_PG_DSN to run."]
async fn sweeping_without_a_sheet_is_a_hard_error() {
	let Some(base_dsn) = drip_testkit::env_dsn() else {
		eprintln!("Skipping sweeping_without_a_sheet_is_a_hard_error; set DRIP_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let mut h = harness(test_db.dsn(), Vec::new()).await;

	h.service.providers.sheet = None;

	let result = sweep::run_sweep(&h.service).await;

	assert!(matches!(result, Err(Error::SheetNotConfigured)));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DRIP_PG_DSN to run."]
async fn captured_leads_dedupe_on_email_and_show_up_in_stats() {
	let Some(base_dsn) = drip_testkit::env_dsn() else {
		eprintln!(
			"Skipping captured_leads_dedupe_on_email_and_show_up_in_stats; set DRIP_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let h = harness(test_db.dsn(), Vec::new()).await;
	let first = capture::capture(&h.service, CaptureRequest {
		name: Some("Jane Doe".to_string()),
		email: Some("jane@example.com".to_string()),
		source: "landing_page".to_string(),
		..CaptureRequest::default()
	})
	.await
	.expect("Capture failed.");

	assert!(first.created);

	let second = capture::capture(&h.service, CaptureRequest {
		email: Some("JANE@example.com".to_string()),
		source: "landing_page".to_string(),
		..CaptureRequest::default()
	})
	.await
	.expect("Capture failed.");

	assert!(!second.created);
	assert_eq!(second.lead_id, first.lead_id);

	let contactless = capture::capture(&h.service, CaptureRequest {
		name: Some("No Contact".to_string()),
		source: "landing_page".to_string(),
		..CaptureRequest::default()
	})
	.await;

	assert!(matches!(contactless, Err(Error::InvalidRequest { .. })));

	let stats = list::stats(&h.service).await.expect("Stats failed.");

	assert_eq!(stats.total, 1);
	assert_eq!(stats.by_status.len(), 1);
	assert_eq!(stats.by_status[0].status, "new");
	assert_eq!(stats.by_status[0].count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
