//! Mapping of view errors onto HTTP responses
//!
//! Body shape: `{ "error": <kind>, "message": <text> }`. Graph read failures
//! are logged and answered with an opaque message.

use crate::views::ViewError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

pub fn status_code(err: &ViewError) -> StatusCode {
    match err {
        ViewError::NotFound(_) | ViewError::Integrity(_) => StatusCode::NOT_FOUND,
        ViewError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ViewError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let message = match &self {
            ViewError::Read(e) => {
                error!("Graph read failed: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": self.kind(), "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ReadError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_code(&ViewError::not_found("Cluster", "x")), StatusCode::NOT_FOUND);
        assert_eq!(status_code(&ViewError::Integrity("view".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_code(&ViewError::bad_request("mode")), StatusCode::BAD_REQUEST);
        let read = ViewError::from(ReadError::Query("boom".into()));
        assert_eq!(status_code(&read), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
