//! JSON error responses

use crate::sequencer::FlowError;
use crate::{Error, ErrorClass};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Error returned by every handler: `{success: false, error, ...details}`
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

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error.class() {
            ErrorClass::Validation => Self::bad_request(error.to_string()),
            ErrorClass::Unauthorized => {
                tracing::debug!(%error, "Rejected session");
                Self::unauthorized(error.to_string())
            }
            ErrorClass::Internal => {
                tracing::error!(%error, "Request failed");
                Self::internal(crate::sequencer::messages::describe(&error))
            }
        }
    }
}

impl From<FlowError> for ApiError {
    fn from(error: FlowError) -> Self {
        let status = match error.source.class() {
            ErrorClass::Validation => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.message,
            details: Some(json!({
                "state": error.state,
                "submitted": error.submitted,
            })),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.message,
        });
        if let (Some(Value::Object(details)), Some(map)) = (self.details, body.as_object_mut()) {
            map.extend(details);
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_classes_to_status() {
        assert_eq!(
            ApiError::from(Error::invalid("walletAddress is required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::Unauthorized("expired".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        let err = ApiError::from(Error::WalletProvider("execution reverted: STF".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Transaction reverted: STF");
    }

    #[tokio::test]
    async fn body_carries_success_flag() {
        let response = ApiError::bad_request("amount is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"success": false, "error": "amount is required"}));
    }
}
