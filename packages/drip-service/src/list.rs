use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use drip_domain::status::LeadStatus;
use drip_storage::{models::Lead, queries};

use crate::{Error, LeadService, Result};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListRequest {
	pub status: Option<String>,
	pub limit: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LeadSummary {
	pub lead_id: Uuid,
	pub name: Option<String>,
	pub email: Option<String>,
	pub status: String,
	pub source: String,
	pub website_url: Option<String>,
	pub outreach_stage: i32,
	#[serde(with = "time::serde::rfc3339::option")]
	pub last_contacted_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListResponse {
	pub items: Vec<LeadSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StatusCount {
	pub status: String,
	pub count: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct StatsResponse {
	pub total: i64,
	pub by_status: Vec<StatusCount>,
}

pub async fn list(service: &LeadService, req: ListRequest) -> Result<ListResponse> {
	let status = match req.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
		Some(raw) => Some(
			LeadStatus::parse(raw)
				.ok_or_else(|| Error::InvalidRequest {
					message: format!("Unknown status {raw:?}."),
				})?
				.as_str(),
		),
		None => None,
	};
	let limit = req.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
	let leads = queries::list_leads(&service.db, status, limit).await?;

	Ok(ListResponse { items: leads.into_iter().map(summarize).collect() })
}

pub async fn stats(service: &LeadService) -> Result<StatsResponse> {
	let counts = queries::status_counts(&service.db).await?;
	let total = counts.iter().map(|(_, count)| count).sum();
	let by_status =
		counts.into_iter().map(|(status, count)| StatusCount { status, count }).collect();

	Ok(StatsResponse { total, by_status })
}

fn summarize(lead: Lead) -> LeadSummary {
	LeadSummary {
		lead_id: lead.lead_id,
		name: lead.name,
		email: lead.email,
		status: lead.status,
		source: lead.source,
		website_url: lead.website_url,
		outreach_stage: lead.outreach_stage,
		last_contacted_at: lead.last_contacted_at,
		created_at: lead.created_at,
	}
}
