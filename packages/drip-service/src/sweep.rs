use color_eyre::eyre;
use serde::Serialize;
use time::OffsetDateTime;

use drip_domain::{
	enrichment::EnrichmentData,
	followup::{self, MAX_OUTREACH_STAGE},
	status::LeadStatus,
	templates::{self, OutreachTemplate, TemplateContext},
};
use drip_providers::{
	sheet::{self, SheetRow},
	sitebuilder::SiteSubject,
};
use drip_storage::{
	models::{Lead, NewLead, OutreachLogEntry},
	queries,
};

use crate::{Error, LeadService, Result, SheetProvider};

pub const ENRICH_BATCH: i64 = 5;
pub const SITE_BATCH: i64 = 5;
pub const OUTREACH_BATCH: i64 = 5;
pub const FOLLOW_UP_BATCH: i64 = 10;

const SHEET_IMPORT_SOURCE: &str = "sheet_import";

#[derive(Clone, Debug, Serialize)]
pub struct SweepReport {
	pub logs: Vec<String>,
}

#[derive(Default)]
struct SweepLog {
	lines: Vec<String>,
}
impl SweepLog {
	fn push(&mut self, line: impl Into<String>) {
		let line = line.into();

		tracing::info!("{line}");

		self.lines.push(line);
	}
}

/// One pass over the whole lifecycle: import sheet rows, enrich, build sites,
/// send initial emails, send due follow-ups. Per-lead provider failures are
/// logged and the lead is retried on a later sweep; storage failures abort.
pub async fn run_sweep(service: &LeadService) -> Result<SweepReport> {
	let sheet = service.providers.sheet.clone().ok_or(Error::SheetNotConfigured)?;
	let mut log = SweepLog::default();

	import_sheet_rows(service, sheet.as_ref(), &mut log).await?;
	enrich_leads(service, &mut log).await?;
	build_sites(service, sheet.as_ref(), &mut log).await?;
	send_initial_outreach(service, sheet.as_ref(), &mut log).await?;
	send_follow_ups(service, &mut log).await?;

	log.push("Sweep complete.");

	Ok(SweepReport { logs: log.lines })
}

async fn import_sheet_rows(
	service: &LeadService,
	sheet: &dyn SheetProvider,
	log: &mut SweepLog,
) -> Result<()> {
	let rows = match sheet.fetch_rows().await {
		Ok(rows) => rows,
		Err(e) => {
			log.push(format!("Sheet fetch failed, skipping import: {e}"));

			return Ok(());
		},
	};
	let mut imported = 0;

	for row in rows.iter().filter(|row| row.is_new()) {
		// Email is the import key; rows without one are skipped outright.
		let Some(email) = row.email.as_deref() else {
			continue;
		};

		if queries::lead_by_email(&service.db, email).await?.is_some() {
			continue;
		}

		let lead = queries::insert_lead(&service.db, &new_lead_from_row(row)).await?;

		if let Err(e) = sheet.write_status(row.row_index, sheet::STATUS_PROCESSING, None).await {
			tracing::warn!("sheet write-back failed for row {}: {e}", row.row_index);
		}

		log.push(format!("Imported {} from sheet row {}.", display_name(&lead), row.row_index));

		imported += 1;
	}

	if imported > 0 {
		log.push(format!("Imported {imported} new lead(s) from the sheet."));
	}

	Ok(())
}

async fn enrich_leads(service: &LeadService, log: &mut SweepLog) -> Result<()> {
	// Picks up 'processing' claims from earlier interrupted sweeps as well.
	let leads = queries::enrichment_candidates(&service.db, ENRICH_BATCH).await?;

	for lead in leads {
		queries::update_status(&service.db, lead.lead_id, LeadStatus::Processing.as_str()).await?;

		let name = lead.name.as_deref().unwrap_or_default();
		let payload = match service
			.providers
			.enrichment
			.enrich(name, lead.profile_url.as_deref())
			.await
		{
			Ok(enrichment) => serde_json::to_value(&enrichment)
				.map_err(|e| eyre::eyre!("Enrichment payload did not serialize: {e}")),
			Err(e) => Err(e),
		};

		match payload {
			Ok(payload) => {
				queries::record_enrichment(&service.db, lead.lead_id, &payload).await?;
				log.push(format!("Enriched {}.", display_name(&lead)));
			},
			Err(e) => {
				// Back to new so a later sweep retries; the message is kept for operators.
				queries::record_stage_error(
					&service.db,
					lead.lead_id,
					LeadStatus::New.as_str(),
					&e.to_string(),
				)
				.await?;
				log.push(format!("Enrichment failed for {}: {e}", display_name(&lead)));
			},
		}
	}

	Ok(())
}

async fn build_sites(
	service: &LeadService,
	sheet: &dyn SheetProvider,
	log: &mut SweepLog,
) -> Result<()> {
	let leads =
		queries::leads_by_status(&service.db, LeadStatus::Enriched.as_str(), SITE_BATCH).await?;

	for lead in leads {
		let enrichment: EnrichmentData = lead
			.enrichment
			.clone()
			.and_then(|value| serde_json::from_value(value).ok())
			.unwrap_or_default();
		let subject = SiteSubject {
			name: lead.name.clone().unwrap_or_default(),
			business_name: lead.business_name.clone(),
			city: lead.city.clone(),
			email: lead.email.clone(),
			phone: lead.phone.clone(),
		};

		match service.providers.site_builder.generate(&subject, &enrichment).await {
			Ok(site) => {
				queries::record_site(&service.db, lead.lead_id, &site.url, site.deploy_id.as_deref())
					.await?;

				if let Some(row_index) = lead.sheet_row_index
					&& let Err(e) = sheet
						.write_status(row_index, sheet::STATUS_SITE_READY, Some(&site.url))
						.await
				{
					tracing::warn!("sheet write-back failed for row {row_index}: {e}");
				}

				log.push(format!("Built site for {}: {}", display_name(&lead), site.url));
			},
			Err(e) => {
				queries::record_stage_error(
					&service.db,
					lead.lead_id,
					LeadStatus::Enriched.as_str(),
					&e.to_string(),
				)
				.await?;
				log.push(format!("Site build failed for {}: {e}", display_name(&lead)));
			},
		}
	}

	Ok(())
}

async fn send_initial_outreach(
	service: &LeadService,
	sheet: &dyn SheetProvider,
	log: &mut SweepLog,
) -> Result<()> {
	let leads =
		queries::leads_by_status(&service.db, LeadStatus::SiteBuilt.as_str(), OUTREACH_BATCH)
			.await?;

	for lead in leads {
		let Some(email) = lead.email.as_deref() else {
			// Email is the only outreach channel; the lead stays at site_built.
			log.push(format!("Skipped {}: no email address.", display_name(&lead)));

			continue;
		};

		match send_template(service, &lead, email, OutreachTemplate::Initial).await {
			Ok(()) => {
				if let Some(row_index) = lead.sheet_row_index
					&& let Err(e) =
						sheet.write_status(row_index, sheet::STATUS_EMAIL_SENT, None).await
				{
					tracing::warn!("sheet write-back failed for row {row_index}: {e}");
				}

				log.push(format!("Sent initial email to {email}."));
			},
			Err(e) => {
				queries::record_stage_error(
					&service.db,
					lead.lead_id,
					LeadStatus::SiteBuilt.as_str(),
					&e.to_string(),
				)
				.await?;
				log.push(format!("Initial email to {email} failed: {e}"));
			},
		}
	}

	Ok(())
}

async fn send_follow_ups(service: &LeadService, log: &mut SweepLog) -> Result<()> {
	let now = OffsetDateTime::now_utc();
	let leads =
		queries::follow_up_candidates(&service.db, MAX_OUTREACH_STAGE, FOLLOW_UP_BATCH).await?;

	for lead in leads {
		let Some(last_contacted_at) = lead.last_contacted_at else {
			continue;
		};
		let Some(email) = lead.email.as_deref() else {
			continue;
		};
		let Some(template) = followup::next_follow_up(lead.outreach_stage, now - last_contacted_at)
		else {
			continue;
		};

		match send_template(service, &lead, email, template).await {
			Ok(()) => log.push(format!("Sent {} to {email}.", template.name())),
			Err(e) => {
				queries::record_stage_error(
					&service.db,
					lead.lead_id,
					LeadStatus::OutreachActive.as_str(),
					&e.to_string(),
				)
				.await?;
				log.push(format!("Follow-up {} to {email} failed: {e}", template.name()));
			},
		}
	}

	Ok(())
}

async fn send_template(
	service: &LeadService,
	lead: &Lead,
	email: &str,
	template: OutreachTemplate,
) -> Result<()> {
	let website_url = lead.website_url.as_deref().unwrap_or_default();
	let ctx = TemplateContext {
		lead_name: lead.name.as_deref().unwrap_or_default(),
		website_url,
		checkout_url: &service.cfg.outreach.checkout_url,
		signature: &service.cfg.outreach.signature,
	};
	let rendered = templates::render(template, &ctx);
	let sent = service.providers.email.send(email, &rendered).await?;
	let now = OffsetDateTime::now_utc();
	let stage = template.stage();
	let entry = OutreachLogEntry {
		at: now,
		stage,
		action: template.name().to_string(),
		details: Some(format!("to {email}")),
		message_id: Some(sent.message_id.clone()),
	};
	let entry = serde_json::to_value(vec![entry]).map_err(|e| Error::Provider {
		message: format!("Outreach log entry did not serialize: {e}"),
	})?;

	queries::record_outreach(
		&service.db,
		lead.lead_id,
		stage,
		followup::next_follow_up_at(stage, now),
		Some(&sent.message_id),
		&entry,
	)
	.await?;

	Ok(())
}

fn new_lead_from_row(row: &SheetRow) -> NewLead {
	NewLead {
		name: row.name.clone(),
		email: row.email.clone(),
		phone: row.phone.clone(),
		profile_url: row.profile_url.clone(),
		business_name: row.business_name.clone(),
		city: row.city.clone(),
		source: SHEET_IMPORT_SOURCE.to_string(),
		sheet_row_index: Some(row.row_index),
	}
}

fn display_name(lead: &Lead) -> String {
	lead.name
		.clone()
		.or_else(|| lead.email.clone())
		.unwrap_or_else(|| lead.lead_id.to_string())
}
