use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drip_storage::{models::NewLead, queries};

use crate::{Error, LeadService, Result};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CaptureRequest {
	pub name: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub profile_url: Option<String>,
	pub business_name: Option<String>,
	pub city: Option<String>,
	#[serde(default = "default_source")]
	pub source: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CaptureResponse {
	pub lead_id: Uuid,
	/// False when the email matched an existing lead and no new record was made.
	pub created: bool,
}

/// Registers a lead from an inbound form or API call. Leads entering here start
/// at `new` and are picked up by the next pipeline sweep like any sheet import.
pub async fn capture(service: &LeadService, req: CaptureRequest) -> Result<CaptureResponse> {
	let name = clean(req.name);
	let email = clean(req.email);
	let phone = clean(req.phone);

	if email.is_none() && phone.is_none() {
		return Err(Error::InvalidRequest {
			message: "A lead needs an email or a phone number.".to_string(),
		});
	}
	if req.source.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "source must not be empty.".to_string() });
	}

	if let Some(email) = email.as_deref()
		&& let Some(existing) = queries::lead_by_email(&service.db, email).await?
	{
		return Ok(CaptureResponse { lead_id: existing.lead_id, created: false });
	}

	let lead = queries::insert_lead(&service.db, &NewLead {
		name,
		email,
		phone,
		profile_url: clean(req.profile_url),
		business_name: clean(req.business_name),
		city: clean(req.city),
		source: req.source.trim().to_string(),
		sheet_row_index: None,
	})
	.await?;

	tracing::info!("captured lead {} from {}", lead.lead_id, lead.source);

	Ok(CaptureResponse { lead_id: lead.lead_id, created: true })
}

fn default_source() -> String {
	"api_capture".to_string()
}

fn clean(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
