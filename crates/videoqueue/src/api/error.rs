use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::api::models::ErrorBody;
use crate::queue::QueueError;
use crate::trigger::TriggerError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    /// Request body was not a JSON `Submission`.
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Queue(QueueError::EmptyBatch) => StatusCode::BAD_REQUEST,
            ApiError::Queue(QueueError::InvalidLinks(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Queue(QueueError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Queue(_) | ApiError::Trigger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
            invalid_lines: match &self {
                ApiError::Queue(e) => e.invalid_lines().to_vec(),
                _ => Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}
