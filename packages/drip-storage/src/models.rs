use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Lead {
	pub lead_id: Uuid,
	pub name: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub profile_url: Option<String>,
	pub business_name: Option<String>,
	pub city: Option<String>,
	pub source: String,
	pub status: String,
	pub enrichment: Option<Value>,
	pub error_message: Option<String>,
	pub website_url: Option<String>,
	pub website_deploy_id: Option<String>,
	pub outreach_stage: i32,
	pub last_contacted_at: Option<OffsetDateTime>,
	pub next_follow_up_at: Option<OffsetDateTime>,
	pub email_thread_id: Option<String>,
	pub outreach_logs: Value,
	pub sheet_row_index: Option<i64>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// Insertable lead fields; everything else takes its column default.
#[derive(Clone, Debug, Default)]
pub struct NewLead {
	pub name: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub profile_url: Option<String>,
	pub business_name: Option<String>,
	pub city: Option<String>,
	pub source: String,
	pub sheet_row_index: Option<i64>,
}

/// One entry of the per-lead `outreach_logs` JSONB array.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OutreachLogEntry {
	#[serde(with = "time::serde::rfc3339")]
	pub at: OffsetDateTime,
	pub stage: i32,
	pub action: String,
	pub details: Option<String>,
	pub message_id: Option<String>,
}
