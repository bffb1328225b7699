use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use drip_service::{
	CaptureRequest, CaptureResponse, Error as ServiceError, ListRequest, ListResponse,
	StatsResponse, capture, list, sweep,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/leads", post(capture_lead))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/pipeline/run", post(run_pipeline))
		.route("/v1/leads", get(list_leads))
		.route("/v1/leads/stats", get(lead_stats))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn capture_lead(
	State(state): State<AppState>,
	Json(payload): Json<CaptureRequest>,
) -> Result<(StatusCode, Json<CaptureResponse>), ApiError> {
	let response = capture::capture(&state.service, payload).await?;
	let status = if response.created { StatusCode::CREATED } else { StatusCode::OK };

	Ok((status, Json(response)))
}

#[derive(Debug, Serialize)]
struct PipelineRunResponse {
	success: bool,
	logs: Vec<String>,
}

async fn run_pipeline(
	State(state): State<AppState>,
) -> Result<Json<PipelineRunResponse>, ApiError> {
	let report = sweep::run_sweep(&state.service).await?;

	Ok(Json(PipelineRunResponse { success: true, logs: report.logs }))
}

async fn list_leads(
	State(state): State<AppState>,
	Query(req): Query<ListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
	let response = list::list(&state.service, req).await?;

	Ok(Json(response))
}

async fn lead_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
	let response = list::stats(&state.service).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let status = match &err {
			ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
			ServiceError::SheetNotConfigured
			| ServiceError::Provider { .. }
			| ServiceError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		};

		Self { status, message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(ErrorBody { error: self.message })).into_response()
	}
}
