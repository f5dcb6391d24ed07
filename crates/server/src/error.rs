use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sheetsift_sheet::SheetError;
use thiserror::Error;

/// Error body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error kind (e.g. "NotFound").
    pub kind: String,
    /// Human-readable description.
    pub message: String,
}

/// A request failure, rendered as a JSON error response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// Body exceeded the configured upload limit
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl ApiError {
    /// Wrap a malformed-request message.
    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        ApiError::Sheet(SheetError::BadRequest(message.to_string()))
    }

    /// Wrap an extractor rejection, keeping a body-limit status.
    pub fn rejected(status: StatusCode, message: impl std::fmt::Display) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(message.to_string())
        } else {
            ApiError::bad_request(message)
        }
    }

    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Sheet(err) => err.kind(),
            ApiError::PayloadTooLarge(_) => "PayloadTooLarge",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Sheet(
                SheetError::InvalidWorkbook(_)
                | SheetError::BadRequest(_)
                | SheetError::UnknownField { .. },
            ) => StatusCode::BAD_REQUEST,
            ApiError::Sheet(SheetError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Sheet(SheetError::NoWorkbookLoaded | SheetError::NoActiveTable) => {
                StatusCode::CONFLICT
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!("Request failed ({}): {}", self.kind(), self);

        let body = ErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
