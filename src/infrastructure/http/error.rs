//! HTTP Error Handling
//!
//! ApiError 转换为带真实状态码的统一响应信封；4xx 记 warn，5xx 记 error

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::dto::ApiResponse;
use crate::application::ApplicationError;
use crate::domain::capitalize;

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        errors: Option<Value>,
    },
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    MethodNotAllowed(String),
    RequestTimeout(String),
    TooManyRequests(String),
    Internal {
        message: String,
        errors: Option<Value>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            errors: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            errors: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            ApiError::BadRequest { message, errors } | ApiError::Internal { message, errors } => {
                (message, errors)
            }
            ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::MethodNotAllowed(message)
            | ApiError::RequestTimeout(message)
            | ApiError::TooManyRequests(message) => (message, None),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, detail = ?errors, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(ApiResponse::<()>::error(message, errors))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, .. } => {
                ApiError::NotFound(format!("{} not found", capitalize(resource_type)))
            }
            ApplicationError::ValidationError { errors } => ApiError::BadRequest {
                message: "Validation failed".to_string(),
                errors: serde_json::to_value(errors).ok(),
            },
            ApplicationError::InvalidInput(message) => ApiError::bad_request(message),
            ApplicationError::OperationFailed { message, detail } => ApiError::Internal {
                message,
                errors: detail.map(Value::String),
            },
            ApplicationError::RepositoryError(msg) | ApplicationError::InternalError(msg) => {
                ApiError::Internal {
                    message: "Internal server error".to_string(),
                    errors: Some(Value::String(msg)),
                }
            }
        }
    }
}
