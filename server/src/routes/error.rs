//! HTTP error mapping
//!
//! Every failure leaves the API as `{"error": {"message", "code"}}`.
//! Internal failures are logged here and answered with a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, warn};

use notetree_domain::{DomainError, DomainResult};

use super::AppState;

const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    error: DomainError,
    /// Message shown instead of the detail of an internal error
    public_message: Option<&'static str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.error {
            ref err if err.is_client_error() => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &str {
        match &self.error {
            DomainError::Internal(_) => self.public_message.unwrap_or(GENERIC_INTERNAL_MESSAGE),
            other => other.message(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self {
            error,
            public_message: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::validation(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        DomainError::validation(rejection.body_text()).into()
    }
}

/// Attach the per-operation message used when a store call fails internally
pub trait OrFail<T> {
    fn or_fail(self, public_message: &'static str) -> Result<T, ApiError>;
}

impl<T> OrFail<T> for DomainResult<T> {
    fn or_fail(self, public_message: &'static str) -> Result<T, ApiError> {
        self.map_err(|error| ApiError {
            error,
            public_message: Some(public_message),
        })
    }
}

/// Error detail carried to `attach_error_detail` through response extensions
#[derive(Debug, Clone)]
struct ErrorDetail(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let DomainError::Internal(detail) = &self.error {
            error!(%detail, status = status.as_u16(), "request failed");
        }

        let body = json!({
            "error": {
                "message": self.public_message(),
                "code": self.error.code(),
            }
        });
        let mut response = (status, Json(body)).into_response();
        response
            .extensions_mut()
            .insert(ErrorDetail(self.error.to_string()));
        response
    }
}

/// Adds `error.stack` to error bodies outside production
pub async fn attach_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.environment.is_development() {
        return response;
    }
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%err, "failed to buffer error body");
            return parts.status.into_response();
        }
    };
    let mut value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return Response::from_parts(parts, axum::body::Body::from(bytes)),
    };
    if let Some(error) = value.get_mut("error").and_then(Value::as_object_mut) {
        error.insert("stack".to_string(), Value::String(detail));
    }

    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Json(value)).into_response()
}

/// JSON body extractor whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

pub async fn route_not_found() -> ApiError {
    DomainError::not_found("Route not found").into()
}
