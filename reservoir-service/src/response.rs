//! Response envelopes and the error type returned by handlers.
//!
//! Success and failure share the same top-level shape (`success`, `status`,
//! `msg`) so clients only need to branch on `success`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reservoir::{DailyReading, Description, ReadError, ReadStage, Reservoir};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned with every successful readings response.
pub const SUCCESS_MSG: &str = "Сўровга асосан маълумотлар тўлиқ шакллантирилди";

const COUNT_FAILED_MSG: &str = "failed to get data count";
const PAGE_FAILED_MSG: &str = "failed to get daily data";

/// Successful readings response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReservoirResponse {
    /// Always `true`.
    pub success: bool,
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Localized status message.
    pub msg: String,
    /// Title of the reservoir's data feed.
    pub title: String,
    /// Localized label of every field in `data` items.
    #[schema(value_type = Object)]
    pub description: Description,
    /// Distinct days in the requested range, independent of paging.
    pub total_counts: i64,
    /// Readings on the requested page, ascending by day.
    pub data: Vec<DataItem>,
}

impl ReservoirResponse {
    /// Build the envelope for one page of readings.
    pub fn new(reservoir: &Reservoir, total_counts: i64, data: Vec<DataItem>) -> Self {
        Self {
            success: true,
            status: StatusCode::OK.as_u16(),
            msg: SUCCESS_MSG.to_string(),
            title: reservoir.title.to_string(),
            description: reservoir.description(),
            total_counts,
            data,
        }
    }
}

/// One day of readings merged with the reservoir's static metadata.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DataItem {
    /// 1-based position across pages: `(page - 1) * per_page + index + 1`.
    pub id: i64,
    /// Measurement day.
    pub send_datetime: String,
    /// Name of the reservoir facility.
    pub object_name: String,
    /// Taxpayer identification number of the operating organization.
    pub object_tin: String,
    /// Full name of the facility chief.
    pub object_chief: String,
    /// Personal identification number of the facility chief.
    pub chief_pinfl: String,
    /// Upper-bief water level (m).
    pub upper_bef_level: f64,
    /// Lower-bief water level (m), fixed per reservoir.
    pub down_bef_level: f64,
    /// Upper-bief water volume (million m³).
    pub upper_bef_volume: f64,
    /// Upper-bief pressure (kPa). Only present for pressure-bearing reservoirs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bef_pressure: Option<f64>,
}

impl DataItem {
    /// Merge a stored reading with the reservoir's static fields.
    pub fn new(reservoir: &Reservoir, id: i64, reading: DailyReading) -> Self {
        Self {
            id,
            send_datetime: reading.date,
            object_name: reservoir.object_name.to_string(),
            object_tin: reservoir.object_tin.to_string(),
            object_chief: reservoir.object_chief.to_string(),
            chief_pinfl: reservoir.chief_pinfl.to_string(),
            upper_bef_level: reading.level,
            down_bef_level: reservoir.down_bef_level,
            upper_bef_volume: reading.volume,
            upper_bef_pressure: reservoir.pressure_for(reading.level),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// What went wrong.
    pub msg: String,
}

/// Failures a handler can report to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing request input.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Storage failed or missed its deadline. `msg` is shown to the client.
    #[error("{msg}")]
    Storage {
        msg: &'static str,
        #[source]
        source: ReadError,
    },

    /// The request outlived the HTTP timeout.
    #[error("request timed out")]
    RequestTimeout,

    /// A handler panicked or middleware failed.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Storage { .. } | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReadError> for ApiError {
    fn from(source: ReadError) -> Self {
        let msg = match source.stage {
            ReadStage::Count => COUNT_FAILED_MSG,
            ReadStage::Page => PAGE_FAILED_MSG,
        };
        ApiError::Storage { msg, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Storage { source, .. } = &self {
            tracing::error!(stage = %source.stage, error = %source.source, "Storage failure");
        }

        let body = ErrorResponse {
            success: false,
            status: status.as_u16(),
            msg: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reservoir::{catalog, StoreError};
    use std::time::Duration;

    fn reading(level: f64, volume: f64) -> DailyReading {
        DailyReading {
            date: "2024-01-01".to_string(),
            level,
            volume,
        }
    }

    #[test]
    fn test_data_item_without_pressure() {
        let item = DataItem::new(catalog::lookup(1).unwrap(), 1, reading(820.0, 5.2));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["send_datetime"], "2024-01-01");
        assert_eq!(json["object_name"], "Андижон сув омбори");
        assert_eq!(json["down_bef_level"], 822.0);
        assert_eq!(json["upper_bef_volume"], 5.2);
        assert!(json.get("upper_bef_pressure").is_none());
    }

    #[test]
    fn test_data_item_with_pressure() {
        let item = DataItem::new(catalog::lookup(2).unwrap(), 7, reading(100.0, 0.0));
        let pressure = item.upper_bef_pressure.unwrap();
        assert!((pressure - 10.1).abs() < 1e-9);

        let json = serde_json::to_value(&item).unwrap();
        assert!(json["upper_bef_pressure"].is_number());
    }

    #[test]
    fn test_pressure_present_even_for_zero_level() {
        let item = DataItem::new(catalog::lookup(4).unwrap(), 1, reading(0.0, 0.0));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["upper_bef_pressure"], 0.0);
    }

    #[test]
    fn test_item_field_order() {
        let item = DataItem::new(catalog::lookup(2).unwrap(), 1, reading(1.0, 2.0));
        let json = serde_json::to_string(&item).unwrap();
        let keys = [
            "\"id\"",
            "\"send_datetime\"",
            "\"object_name\"",
            "\"object_tin\"",
            "\"object_chief\"",
            "\"chief_pinfl\"",
            "\"upper_bef_level\"",
            "\"down_bef_level\"",
            "\"upper_bef_volume\"",
            "\"upper_bef_pressure\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_reservoir_response_serialize() {
        let response = ReservoirResponse::new(catalog::lookup(1).unwrap(), 3, Vec::new());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["status"], 200);
        assert_eq!(json["msg"], SUCCESS_MSG);
        assert_eq!(json["total_counts"], 3);
        assert_eq!(json["data"], serde_json::json!([]));
        assert_eq!(json["description"]["id"], "id");
    }

    #[test]
    fn test_api_error_status() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);

        assert_eq!(ApiError::RequestTimeout.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_storage_message_per_stage() {
        let count = ApiError::from(ReadError {
            stage: ReadStage::Count,
            source: StoreError::Timeout(Duration::from_secs(5)),
        });
        assert_eq!(count.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The storage cause is logged, not shown.
        assert_eq!(count.to_string(), "failed to get data count");

        let page = ApiError::from(ReadError {
            stage: ReadStage::Page,
            source: StoreError::Database(sqlx::Error::PoolTimedOut),
        });
        assert_eq!(page.to_string(), "failed to get daily data");
    }

    #[test]
    fn test_error_response_serialize() {
        let response = ErrorResponse {
            success: false,
            status: 404,
            msg: "unsupported reservoirId".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"success":false,"status":404,"msg":"unsupported reservoirId"}"#
        );
    }
}
