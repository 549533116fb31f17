//! HTTP handlers mapping JSON bodies onto the pricing crate.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        DaysSimulationResponse, DemandSimulationResponse, ExplainRequest, ExplainResponse,
        PredictResponse, SearchRequest, SearchResponse, SeatSimulationResponse, StatusResponse,
    },
};
use tracing::{info, warn};

use crate::app_state::AppState;

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub(crate) async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "backend working, model loaded".into(),
    })
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn http_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    let response = pricing::search_flights(&state.pricing, &req).map_err(error_response)?;
    info!(
        route = %response.route,
        flights = response.flights.len(),
        "search served"
    );
    Ok(Json(response))
}

pub(crate) async fn http_predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> ApiResult<PredictResponse> {
    pricing::predict(&state.pricing, &req)
        .map(Json)
        .map_err(error_response)
}

pub(crate) async fn http_simulate_days(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> ApiResult<DaysSimulationResponse> {
    pricing::simulate_days(&state.pricing, &req)
        .map(Json)
        .map_err(error_response)
}

pub(crate) async fn http_simulate_seats(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> ApiResult<SeatSimulationResponse> {
    pricing::simulate_seats(&state.pricing, &req)
        .map(Json)
        .map_err(error_response)
}

pub(crate) async fn http_simulate_demand(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> ApiResult<DemandSimulationResponse> {
    pricing::simulate_demand(&state.pricing, &req)
        .map(Json)
        .map_err(error_response)
}

pub(crate) async fn http_explain(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> Json<ExplainResponse> {
    Json(pricing::explain(&state.pricing, &req))
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = status_for(err.code);
    warn!(%status, message = %err.message, "request rejected");
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
