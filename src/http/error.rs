use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::task::JoinError;

use crate::usecase::ports::repo::RepoError;
use crate::usecase::services::chart_service::ChartError;

pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Failures inside a request. The detail is logged; clients only ever see the
/// generic body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("blocking task failed: {0}")]
    Join(#[from] JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn body_hides_the_underlying_error() {
        let err = ApiError::Repo(RepoError::Message("no such table: school_rolls".into()));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let text = String::from_utf8(body.to_vec()).expect("body should be utf-8");
        assert_eq!(text, r#"{"error":"internal server error"}"#);
    }
}
