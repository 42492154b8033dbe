use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use crate::error::CoreError;

/// Error response body: `{"error": <message>, "status": <code>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Like `From<CoreError>`, but missing records are the client's fault
    /// and answer 400 instead of 404. Used by the write routes.
    pub fn not_found_as_bad_request(err: CoreError) -> Self {
        if err.is_not_found() {
            Self::bad_request(err.to_string())
        } else {
            err.into()
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match err {
            CoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CoreError::InvalidId(_) | CoreError::MovieNotFound(_) | CoreError::TheaterNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CoreError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::StoreTimeout => StatusCode::GATEWAY_TIMEOUT,
            CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{}", err);
        } else {
            debug!("{}", err);
        }

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });
        (self.status, Json(body)).into_response()
    }
}
