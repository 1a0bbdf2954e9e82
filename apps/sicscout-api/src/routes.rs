use axum::{
	Json, Router,
	extract::State,
	http::{
		HeaderValue, StatusCode,
		header::{CONTENT_DISPOSITION, CONTENT_TYPE},
	},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	services::ServeDir,
};

use sicscout_domain::{FlatRecord, sic};
use sicscout_service::{
	Error as ServiceError, SearchPlan, SearchRequest, SearchResponse,
	export::{self, ExportRequest},
};

use crate::state::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
	pub companies: Vec<FlatRecord>,
	#[serde(default)]
	pub channel_definitions: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}

	fn bad_request(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => Self::bad_request(message),
			ServiceError::Provider { message } => {
				tracing::error!(%message, "Provider failure.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_ERROR", message)
			},
			ServiceError::Export { message } => {
				tracing::error!(%message, "Export failure.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR", message)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	let cfg = &state.service.cfg.service;
	let cors = cors_layer(&cfg.cors_origins);
	let static_dir = cfg.static_dir.clone();
	let api = Router::new()
		.route("/health", get(health))
		.route("/api/sic-codes", get(sic_codes))
		.route("/api/search", post(search))
		.route("/api/search/strategies", post(search_strategies))
		.route("/api/export/csv", post(export_csv))
		.route("/api/export/excel", post(export_excel))
		.route("/api/classify", post(classify));
	let app = match static_dir {
		Some(dir) => {
			tracing::info!(%dir, "Serving static files.");

			api.fallback_service(ServeDir::new(dir))
		},
		None => api.route("/", get(root)),
	};

	app.with_state(state).layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	let origins = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(%origin, "Ignoring invalid CORS origin.");

				None
			},
		})
		.collect::<Vec<_>>();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods(Any)
		.allow_headers(Any)
		.expose_headers([CONTENT_DISPOSITION])
}

async fn root() -> Json<Value> {
	Json(json!({ "message": "Company registry search API", "version": sicscout_cli::VERSION }))
}

async fn health() -> Json<Value> {
	Json(json!({ "status": "healthy" }))
}

async fn sic_codes() -> Json<Vec<sic::SicCode>> {
	Json(sic::all())
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	tracing::info!(
		sic_codes = ?payload.sic_codes,
		include_keywords = ?payload.include_keywords,
		"Search request."
	);

	let plan = SearchPlan::from(payload);
	let records = state.service.search(&plan).await?;

	Ok(Json(SearchResponse::from(records.as_slice())))
}

async fn search_strategies(
	State(state): State<AppState>,
	Json(plan): Json<SearchPlan>,
) -> Result<Json<SearchResponse>, ApiError> {
	tracing::info!(strategies = plan.strategies.len(), "Multi-strategy search request.");

	let records = state.service.search(&plan).await?;

	Ok(Json(SearchResponse::from(records.as_slice())))
}

async fn export_csv(Json(payload): Json<ExportRequest>) -> Result<Response, ApiError> {
	if payload.companies.is_empty() {
		return Err(ApiError::bad_request("No companies to export."));
	}

	let bytes = export::export_csv(&payload)?;

	Ok(attachment(CSV_CONTENT_TYPE, "uk_companies.csv", bytes))
}

async fn export_excel(Json(payload): Json<ExportRequest>) -> Result<Response, ApiError> {
	if payload.companies.is_empty() {
		return Err(ApiError::bad_request("No companies to export."));
	}

	let bytes = export::export_xlsx(&payload)?;

	Ok(attachment(XLSX_CONTENT_TYPE, "uk_companies.xlsx", bytes))
}

async fn classify(
	State(state): State<AppState>,
	Json(payload): Json<ClassifyRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	if payload.companies.is_empty() {
		return Err(ApiError::bad_request("No companies to classify."));
	}

	let rules = payload.channel_definitions.as_deref();
	let companies = state.service.classify_rows(payload.companies, rules).await;

	Ok(Json(SearchResponse { count: companies.len(), companies }))
}

fn attachment(content_type: &'static str, filename: &str, bytes: Vec<u8>) -> Response {
	let disposition = format!("attachment; filename={filename}");

	([(CONTENT_TYPE, content_type.to_string()), (CONTENT_DISPOSITION, disposition)], bytes)
		.into_response()
}
