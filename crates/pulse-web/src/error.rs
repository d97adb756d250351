//! Error-to-response mapping for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use pulse_core::StoreError;
use pulse_engine::AnalyticsError;

/// API-boundary error: carries the engine error and renders it as a JSON
/// body with the matching status code.
#[derive(Debug)]
pub struct ApiError(AnalyticsError);

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(AnalyticsError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AnalyticsError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AnalyticsError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            AnalyticsError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AnalyticsError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            AnalyticsError::Store(StoreError::InternalConsistency { .. })
            | AnalyticsError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AnalyticsError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_distinct_statuses() {
        assert_eq!(
            status_of(AnalyticsError::InvalidArgument("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StoreError::Validation("bad email".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StoreError::NotFound { entity: "post", id: 7 }.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StoreError::Conflict("already liked".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(
                StoreError::InternalConsistency {
                    post_id: 1,
                    detail: "drift".into()
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
