use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use surgisched_core::CoreError;

/// Structured error body returned by every failing endpoint:
/// `{"error": {"kind": "...", "message": "..."}}`.
///
/// `kind` is stable and machine-readable; clients map it to a status code
/// and pick display text from `message`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                kind: kind.into(),
                message: message.into(),
            },
        }
    }
}

/// High-level API errors mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { kind: &'static str, message: String },
    #[error("Not found: {message}")]
    NotFound { kind: &'static str, message: String },
    #[error("Conflict: {message}")]
    Conflict { kind: &'static str, message: String },
    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity { kind: &'static str, message: String },
    #[error("Internal server error: {message}")]
    Internal { kind: &'static str, message: String },
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest {
            kind: "invalid-request",
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "not-found",
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            kind: "internal",
            message: msg.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest { kind, .. }
            | Self::NotFound { kind, .. }
            | Self::Conflict { kind, .. }
            | Self::UnprocessableEntity { kind, .. }
            | Self::Internal { kind, .. } => kind,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::UnprocessableEntity { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.kind(), self.message())
    }
}

/// Status mapping for the domain error taxonomy: not-found family to 404,
/// conflicts to 409, lifecycle violations to 400, inactive admissions to
/// 422, everything internal to 500.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match &err {
            CoreError::RoomNotFound { .. }
            | CoreError::ProcedureNotFound { .. }
            | CoreError::AdmissionNotFound { .. } => Self::NotFound { kind, message },
            CoreError::DuplicateRoomName { .. }
            | CoreError::RoomConflict { .. }
            | CoreError::HasPendingBookings { .. } => Self::Conflict { kind, message },
            CoreError::InvalidTransition { .. }
            | CoreError::AlreadyCompleted { .. }
            | CoreError::ProcedureCancelled { .. }
            | CoreError::InvalidDateTime(_)
            | CoreError::InvalidRequest(_) => Self::BadRequest { kind, message },
            CoreError::AdmissionNotActive { .. } => Self::UnprocessableEntity { kind, message },
            CoreError::Internal { .. } => Self::Internal { kind, message },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match serde_json::to_vec(&self.to_body()) {
            Ok(b) => b,
            Err(_) => {
                let fallback = ErrorBody::new("internal", "Serialization failure");
                serde_json::to_vec(&fallback).unwrap_or_else(|_| b"{}".to_vec())
            }
        };

        let mut builder = axum::http::Response::builder().status(status);
        builder = builder.header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        builder
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                axum::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    )
                    .body(axum::body::Body::from("{}"))
                    .expect("build fallback response")
            })
    }
}

/// Successful response wrapper carrying a status and optional extra headers.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub value: T,
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl<T> ApiResponse<T> {
    pub fn new(value: T, status: StatusCode) -> Self {
        Self {
            value,
            status,
            headers: Vec::new(),
        }
    }

    pub fn ok(value: T) -> Self {
        Self::new(value, StatusCode::OK)
    }

    pub fn created(value: T) -> Self {
        Self::new(value, StatusCode::CREATED)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = match serde_json::to_vec(&self.value) {
            Ok(b) => b,
            Err(_) => serde_json::to_vec(&ErrorBody::new("internal", "Serialization failure"))
                .unwrap_or_else(|_| b"{}".to_vec()),
        };
        let mut builder = axum::http::Response::builder().status(self.status);
        builder = builder.header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in self.headers.into_iter() {
            builder = builder.header(name, value);
        }
        builder
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                axum::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .header(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    )
                    .body(axum::body::Body::from("{}"))
                    .expect("build fallback response")
            })
    }
}

/// Reads a header value as UTF-8, if present.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
