use axum::{
	Json, Router,
	extract::{Path, Request, State, rejection::JsonRejection},
	http::StatusCode,
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use sgw_service::{Error as ServiceError, SearchRequest, SearchResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let protected = Router::new()
		.route("/", post(search_default))
		.route("/search", post(search_default))
		.route("/search/{data_store}", post(search_data_store))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

	Router::new().route("/health", get(health)).merge(protected).with_state(state)
}

async fn health() -> &'static str {
	"OK"
}

async fn search_default(
	State(state): State<AppState>,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search(None, payload).await?;

	Ok(Json(response))
}

async fn search_data_store(
	State(state): State<AppState>,
	Path(data_store): Path<String>,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search(Some(&data_store), payload).await?;

	Ok(Json(response))
}

async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
	if !state.api_keys.is_authorized(req.headers()) {
		tracing::debug!(path = %req.uri().path(), "Rejected request without a valid API key.");

		return json_error(
			StatusCode::UNAUTHORIZED,
			"UNAUTHORIZED",
			"Invalid or missing API key.",
		)
		.into_response();
	}

	next.run(req).await
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
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::ExternalService { message } => {
				tracing::error!(error = %message, "Search call failed.");

				json_error(
					StatusCode::BAD_GATEWAY,
					"EXTERNAL_SERVICE_ERROR",
					"The search service request failed.",
				)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
