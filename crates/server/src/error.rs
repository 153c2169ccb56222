use std::any::Any;
use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::catch_panic::ResponseForPanic;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Endpoint not found")]
    NotFound,
    /// `detail` is only populated in debug mode and is echoed as `message`.
    #[error("Internal server error")]
    Internal { detail: Option<String> },
}

impl ApiError {
    /// Log `err` and wrap it as a 500, keeping the detail only when `debug` is set.
    pub fn internal(err: impl Display, debug: bool) -> Self {
        let detail = err.to_string();
        tracing::error!("Server error: {detail}");
        ApiError::Internal {
            detail: debug.then_some(detail),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &self {
            ApiError::Internal { detail } => detail.clone(),
            _ => None,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Turns a handler panic into the JSON 500 body.
#[derive(Debug, Clone, Copy)]
pub struct PanicHandler {
    debug: bool,
}

impl PanicHandler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl ResponseForPanic for PanicHandler {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        err: Box<dyn Any + Send + 'static>,
    ) -> Response {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "handler panicked".to_string()
        };
        ApiError::internal(detail, self.debug).into_response()
    }
}
