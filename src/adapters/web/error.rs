//! JSON error responses for the HTTP server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::error::CharitySwapError;
use crate::domain::quote::NO_ROUTE;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const QUOTE_FAILED: &str = "QUOTE_FAILED";
pub const NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub code: &'static str,
    pub detail: Option<String>,
}

impl WebError {
    pub fn new(status: StatusCode, code: &'static str, detail: Option<String>) -> Self {
        Self {
            status,
            code,
            detail,
        }
    }

    pub fn no_route() -> Self {
        Self::new(StatusCode::NOT_FOUND, NO_ROUTE, None)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND, Some(detail.into()))
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, VALIDATION_ERROR, Some(detail.into()))
    }
}

impl From<CharitySwapError> for WebError {
    fn from(err: CharitySwapError) -> Self {
        match &err {
            CharitySwapError::InvalidAmount { .. }
            | CharitySwapError::InvalidFee { .. }
            | CharitySwapError::UnknownFund(_) => Self::bad_request(err.to_string()),
            _ => Self::new(StatusCode::BAD_GATEWAY, QUOTE_FAILED, Some(err.to_string())),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_code: self.code,
            detail: self.detail.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}
