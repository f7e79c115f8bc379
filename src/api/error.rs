use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::DomainError;

/// Error body returned by every route:
/// `{"error": {"code", "message"}, "request_id"}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            request_id: request_id.into(),
        }
    }

    /// Client errors keep their message. Backend failures are logged in full
    /// and answered with a generic message.
    pub fn from_domain(request_id: impl Into<String>, err: &DomainError) -> Self {
        let request_id = request_id.into();
        if err.is_client_error() {
            warn!(kind = err.kind(), request_id = %request_id, error = %err, "request rejected");
            return Self::new(request_id, err.kind(), err.to_string());
        }

        error!(kind = err.kind(), request_id = %request_id, error = %err, "retrieval failed");
        let message = match err {
            DomainError::RetrievalUnavailable(_) => "retrieval backend unavailable",
            _ => "internal error",
        };
        Self::new(request_id, err.kind(), message)
    }

    pub fn from_rejection(request_id: impl Into<String>, rejection: &JsonRejection) -> Self {
        let request_id = request_id.into();
        warn!(request_id = %request_id, error = %rejection, "malformed request body");
        Self::new(request_id, "bad_request", rejection.body_text())
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "invalid_argument" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_is_bad_request() {
        let err = ApiError::from_domain("req-1", &DomainError::invalid_argument("k must be > 0"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error.message, "Invalid argument: k must be > 0");
    }

    #[test]
    fn test_backend_failure_hides_details() {
        let err = ApiError::from_domain(
            "req-2",
            &DomainError::unavailable("connection refused to 10.0.0.3:6334"),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error.code, "retrieval_unavailable");
        assert!(!err.error.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(ApiError::new("req-3", "bad_request", "oops")).unwrap();
        assert_eq!(body["error"]["code"], "bad_request");
        assert_eq!(body["error"]["message"], "oops");
        assert_eq!(body["request_id"], "req-3");
    }
}
