//! HTTP request handlers for the reservoir readings service.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use reservoir::{catalog, read_with_deadline, Page, ReadingFilter};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::response::{ApiError, DataItem, ReservoirResponse};
use crate::{ApiDoc, AppState};

const INVALID_ID_MSG: &str = "Invalid reservoirId format";
const UNSUPPORTED_ID_MSG: &str = "unsupported reservoirId";
const MISSING_PARAMS_MSG: &str = "Missing required query parameters: date_from, date_to, page, per_page";
const PAGE_RANGE_MSG: &str = "page is out of range";

/// Query parameters for the readings endpoint.
///
/// Every parameter is required. They are kept as raw strings so that a
/// missing or malformed value is reported in the service's own error
/// envelope.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadingsQuery {
    /// First day of the range, inclusive (`YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Last day of the range, inclusive (`YYYY-MM-DD`).
    pub date_to: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Days per page.
    pub per_page: Option<String>,
}

impl ReadingsQuery {
    /// Validate into a storage filter and page cursor.
    ///
    /// Non-numeric `page`/`per_page` count as zero, so they fail the same
    /// positivity check as a missing value.
    pub fn validate(self, reservoir_id: i64) -> Result<(ReadingFilter, Page), ApiError> {
        let date_from = self.date_from.filter(|s| !s.is_empty());
        let date_to = self.date_to.filter(|s| !s.is_empty());
        let page = parse_or_zero(self.page.as_deref());
        let per_page = parse_or_zero(self.per_page.as_deref());

        let (Some(date_from), Some(date_to)) = (date_from, date_to) else {
            return Err(ApiError::bad_request(MISSING_PARAMS_MSG));
        };
        if page <= 0 || per_page <= 0 {
            return Err(ApiError::bad_request(MISSING_PARAMS_MSG));
        }
        let page = Page::new(page, per_page).ok_or_else(|| ApiError::bad_request(PAGE_RANGE_MSG))?;

        Ok((ReadingFilter::new(reservoir_id, date_from, date_to), page))
    }
}

fn parse_or_zero(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Get one page of daily readings for a reservoir.
///
/// # Path Parameters
///
/// - `reservoir_id`: Catalog id of the reservoir (1, 2 or 4)
///
/// # Query Parameters
///
/// - `date_from`, `date_to`: Inclusive date range
/// - `page`: 1-based page number
/// - `per_page`: Days per page
///
/// # Returns
///
/// - `200 OK` with the page of readings, possibly empty
/// - `400 Bad Request` if the id is not a number or a parameter is missing or invalid
/// - `404 Not Found` if the reservoir is not in the catalog
/// - `500 Internal Server Error` if storage fails or times out
#[utoipa::path(
    get,
    path = "/{prefix}/reservoir/{reservoir_id}",
    params(
        ("prefix" = String, Path, description = "Configured route prefix"),
        ("reservoir_id" = i64, Path, description = "Reservoir id"),
        ReadingsQuery
    ),
    responses(
        (status = 200, description = "Page of daily readings", body = ReservoirResponse),
        (status = 400, description = "Invalid request", body = crate::response::ErrorResponse),
        (status = 404, description = "Unknown reservoir", body = crate::response::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::response::ErrorResponse)
    ),
    tag = "reservoir"
)]
pub async fn get_reservoir_readings(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<ReadingsQuery>, QueryRejection>,
) -> Result<Json<ReservoirResponse>, ApiError> {
    let reservoir_id = path
        .ok()
        .and_then(|Path(raw)| raw.parse::<i64>().ok())
        .ok_or_else(|| {
            tracing::warn!("Invalid reservoirId format");
            ApiError::bad_request(INVALID_ID_MSG)
        })?;

    let reservoir = catalog::lookup(reservoir_id).ok_or_else(|| {
        tracing::warn!(reservoir_id, "Unsupported reservoirId");
        ApiError::not_found(UNSUPPORTED_ID_MSG)
    })?;

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed query string");
            return Err(ApiError::bad_request(MISSING_PARAMS_MSG));
        }
    };
    let (filter, page) = query.validate(reservoir_id).inspect_err(|e| {
        tracing::warn!(reservoir_id, error = %e, "Invalid query parameters");
    })?;

    tracing::debug!(
        reservoir_id,
        date_from = %filter.date_from,
        date_to = %filter.date_to,
        page = page.number(),
        per_page = page.per_page(),
        "Readings query"
    );

    let result = read_with_deadline(state.store.as_ref(), &filter, page, state.query_timeout).await?;

    let data: Vec<DataItem> = result
        .readings
        .into_iter()
        .enumerate()
        .map(|(index, reading)| DataItem::new(reservoir, page.item_id(index), reading))
        .collect();

    tracing::info!(
        reservoir_id,
        total_counts = result.total,
        returned = data.len(),
        "Readings served"
    );

    Ok(Json(ReservoirResponse::new(reservoir, result.total, data)))
}

/// Health check endpoint.
///
/// Liveness only; storage is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive")),
    tag = "system"
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// OpenAPI document for the service.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
