use color_eyre::Result;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	db::Db,
	models::{Lead, NewLead},
};

const LEAD_COLUMNS: &str = "\
lead_id, name, email, phone, profile_url, business_name, city, source, status, enrichment, \
error_message, website_url, website_deploy_id, outreach_stage, last_contacted_at, \
next_follow_up_at, email_thread_id, outreach_logs, sheet_row_index, created_at, updated_at";

pub async fn insert_lead(db: &Db, new: &NewLead) -> Result<Lead> {
	let sql = format!(
		"\
INSERT INTO leads (lead_id, name, email, phone, profile_url, business_name, city, source, sheet_row_index)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING {LEAD_COLUMNS}"
	);
	let lead = sqlx::query_as::<_, Lead>(&sql)
		.bind(Uuid::new_v4())
		.bind(new.name.as_deref())
		.bind(new.email.as_deref())
		.bind(new.phone.as_deref())
		.bind(new.profile_url.as_deref())
		.bind(new.business_name.as_deref())
		.bind(new.city.as_deref())
		.bind(new.source.as_str())
		.bind(new.sheet_row_index)
		.fetch_one(&db.pool)
		.await?;

	Ok(lead)
}

pub async fn lead_by_id(db: &Db, lead_id: Uuid) -> Result<Option<Lead>> {
	let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE lead_id = $1");
	let lead =
		sqlx::query_as::<_, Lead>(&sql).bind(lead_id).fetch_optional(&db.pool).await?;

	Ok(lead)
}

pub async fn lead_by_email(db: &Db, email: &str) -> Result<Option<Lead>> {
	let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE lower(email) = lower($1)");
	let lead = sqlx::query_as::<_, Lead>(&sql).bind(email).fetch_optional(&db.pool).await?;

	Ok(lead)
}

/// Oldest-first batch of leads in one status. Sweep stages use this to drain
/// backlogs fairly across runs.
pub async fn leads_by_status(db: &Db, status: &str, limit: i64) -> Result<Vec<Lead>> {
	let sql = format!(
		"SELECT {LEAD_COLUMNS} FROM leads WHERE status = $1 ORDER BY created_at ASC LIMIT $2"
	);
	let leads =
		sqlx::query_as::<_, Lead>(&sql).bind(status).bind(limit).fetch_all(&db.pool).await?;

	Ok(leads)
}

/// Leads awaiting enrichment, oldest first. Rows left at 'processing' by a
/// sweep that died mid-stage are picked up again instead of stranded.
pub async fn enrichment_candidates(db: &Db, limit: i64) -> Result<Vec<Lead>> {
	let sql = format!(
		"\
SELECT {LEAD_COLUMNS}
FROM leads
WHERE status IN ('new', 'processing')
ORDER BY created_at ASC
LIMIT $1"
	);
	let leads = sqlx::query_as::<_, Lead>(&sql).bind(limit).fetch_all(&db.pool).await?;

	Ok(leads)
}

/// Leads still inside the follow-up rotation, least recently contacted first.
pub async fn follow_up_candidates(db: &Db, max_stage: i32, limit: i64) -> Result<Vec<Lead>> {
	let sql = format!(
		"\
SELECT {LEAD_COLUMNS}
FROM leads
WHERE status = 'outreach_active' AND outreach_stage >= 1 AND outreach_stage < $1
ORDER BY last_contacted_at ASC NULLS FIRST
LIMIT $2"
	);
	let leads =
		sqlx::query_as::<_, Lead>(&sql).bind(max_stage).bind(limit).fetch_all(&db.pool).await?;

	Ok(leads)
}

pub async fn update_status(db: &Db, lead_id: Uuid, status: &str) -> Result<()> {
	sqlx::query("UPDATE leads SET status = $2, updated_at = now() WHERE lead_id = $1")
		.bind(lead_id)
		.bind(status)
		.execute(&db.pool)
		.await?;

	Ok(())
}

pub async fn record_enrichment(db: &Db, lead_id: Uuid, enrichment: &Value) -> Result<()> {
	sqlx::query(
		"\
UPDATE leads
SET enrichment = $2, status = 'enriched', error_message = NULL, updated_at = now()
WHERE lead_id = $1",
	)
	.bind(lead_id)
	.bind(enrichment)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Stores the failure reason without advancing the status, so the lead is
/// retried by a later sweep.
pub async fn record_stage_error(db: &Db, lead_id: Uuid, status: &str, message: &str) -> Result<()> {
	sqlx::query(
		"UPDATE leads SET status = $2, error_message = $3, updated_at = now() WHERE lead_id = $1",
	)
	.bind(lead_id)
	.bind(status)
	.bind(message)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn record_site(
	db: &Db,
	lead_id: Uuid,
	website_url: &str,
	website_deploy_id: Option<&str>,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE leads
SET status = 'site_built',
	website_url = $2,
	website_deploy_id = $3,
	error_message = NULL,
	updated_at = now()
WHERE lead_id = $1",
	)
	.bind(lead_id)
	.bind(website_url)
	.bind(website_deploy_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Advances the outreach rotation after a send: bumps the stage, stamps contact
/// times, appends the log entry, and keeps the first thread id seen.
pub async fn record_outreach(
	db: &Db,
	lead_id: Uuid,
	stage: i32,
	next_follow_up_at: Option<OffsetDateTime>,
	email_thread_id: Option<&str>,
	log_entry: &Value,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE leads
SET status = 'outreach_active',
	outreach_stage = $2,
	last_contacted_at = now(),
	next_follow_up_at = $3,
	email_thread_id = COALESCE(email_thread_id, $4),
	outreach_logs = outreach_logs || $5::jsonb,
	error_message = NULL,
	updated_at = now()
WHERE lead_id = $1",
	)
	.bind(lead_id)
	.bind(stage)
	.bind(next_follow_up_at)
	.bind(email_thread_id)
	.bind(log_entry)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn status_counts(db: &Db) -> Result<Vec<(String, i64)>> {
	let counts: Vec<(String, i64)> =
		sqlx::query_as("SELECT status, count(*) FROM leads GROUP BY status ORDER BY status")
			.fetch_all(&db.pool)
			.await?;

	Ok(counts)
}

pub async fn list_leads(db: &Db, status: Option<&str>, limit: i64) -> Result<Vec<Lead>> {
	let leads = match status {
		Some(status) => leads_by_status(db, status, limit).await?,
		None => {
			let sql = format!("SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC LIMIT $1");

			sqlx::query_as::<_, Lead>(&sql).bind(limit).fetch_all(&db.pool).await?
		},
	};

	Ok(leads)
}
