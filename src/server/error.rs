//! Failure half of the response envelope.
//!
//! Clients only ever see a status code and one of four fixed messages; the
//! detail carried by each variant goes to the log.

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

impl ApiError {
    pub fn not_found(detail: impl Display) -> Self {
        Self::NotFound(detail.to_string())
    }

    pub fn bad_request(detail: impl Display) -> Self {
        Self::BadRequest(detail.to_string())
    }

    pub fn method_not_allowed(detail: impl Display) -> Self {
        Self::MethodNotAllowed(detail.to_string())
    }

    pub fn unprocessable(detail: impl Display) -> Self {
        Self::Unprocessable(detail.to_string())
    }

    pub fn internal(detail: impl Display) -> Self {
        Self::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Resource Not Found",
            Self::BadRequest(_) => "Bad Request",
            Self::MethodNotAllowed(_) => "Method Not Allowed",
            Self::Unprocessable(_) => "Unprocessable",
            Self::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(_) => tracing::error!("{}", self),
            _ => tracing::debug!("{}", self),
        }

        let status = self.status();
        let body = Json(ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => Self::not_found(e),
            StoreError::Validation(_) => Self::bad_request(e),
            StoreError::Database(_) => Self::internal(e),
        }
    }
}
