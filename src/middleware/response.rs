use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::filter::Pagination;
use crate::types::{format_timestamp, now};

/// Success envelope: `{status, message, results, timestamp}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

/// List payload placed under `results`.
#[derive(Debug, Serialize)]
pub struct ListResults<T: Serialize> {
    pub list: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> ApiResponse<T> {
    /// Every success, creation included, is a 200
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> ApiResponse<ListResults<T>> {
    pub fn list(message: impl Into<String>, list: Vec<T>, pagination: Pagination) -> Self {
        Self::success(message, ListResults { list, pagination })
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::OK;

        let results = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to serialize response data" })),
                )
                    .into_response();
            }
        };

        (status, Json(envelope(status, &self.message, results))).into_response()
    }
}

fn envelope(status: StatusCode, message: &str, results: Value) -> Value {
    json!({
        "status": status.canonical_reason().unwrap_or("OK"),
        "message": message,
        "results": results,
        "timestamp": format_timestamp(&now()),
    })
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PageRequest;

    #[test]
    fn list_envelope_shape() {
        let pagination = PageRequest::new(1, 10, None).paginate(2);
        let body = serde_json::to_value(ListResults { list: vec!["a", "b"], pagination }).unwrap();
        let value = envelope(StatusCode::OK, "Successfully get all Contact", body);

        assert_eq!(value["status"], "OK");
        assert_eq!(value["message"], "Successfully get all Contact");
        assert_eq!(value["results"]["list"], json!(["a", "b"]));
        assert_eq!(value["results"]["pagination"]["total_count"], 2);
        assert_eq!(value["results"]["pagination"]["has_next"], false);
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
