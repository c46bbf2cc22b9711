//! JSON error responses
//!
//! Every failure leaves the API as `{ "error": string, "details"?: any }`.
//! Server-side failures are logged here and reach the client only as a
//! generic message.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use validator::ValidationErrors;

use crate::application::errors::EncounterError;
use crate::application::services::DiceError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<EncounterError> for ApiError {
    fn from(err: EncounterError) -> Self {
        if !err.is_client_error() {
            tracing::error!(error = %err, "Request failed");
            return Self::internal();
        }

        let status = match err {
            EncounterError::NotFound(_) => StatusCode::NOT_FOUND,
            EncounterError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        Self::bad_request("Validation error").with_details(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body").with_details(Value::String(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query parameters").with_details(Value::String(rejection.body_text()))
    }
}

impl From<DiceError> for ApiError {
    fn from(err: DiceError) -> Self {
        Self::bad_request(err.to_string())
    }
}
