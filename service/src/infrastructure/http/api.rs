use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::error::PlatformError;

// ApiSuccess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ApiError is a wrapper around a response that includes a status code.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    /// The catalog query needs an index an operator has to create first.
    ServiceUnavailable(String),
    /// The media collaborator rejected or errored.
    BadGateway(String),
    Unauthorized { login: String },
    NotFound,
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<PlatformError> for ApiError {
    fn from(value: PlatformError) -> Self {
        match value {
            PlatformError::NotFound => Self::NotFound,
            PlatformError::ValidationFailed(message) => Self::UnprocessableEntity(message),
            PlatformError::IndexMissing(diagnostic) => Self::ServiceUnavailable(format!(
                "the catalog needs a composite index the store does not have yet: {diagnostic}"
            )),
            PlatformError::FetchFailed(cause) => {
                tracing::error!("record store fetch failed: {cause}");
                Self::InternalServerError("the tutorial catalog could not be loaded".to_string())
            }
            PlatformError::UploadFailed(message) => Self::BadGateway(message),
            PlatformError::ConfigMissing(key) => {
                tracing::error!("missing configuration: {key}");
                Self::InternalServerError("service configuration is incomplete".to_string())
            }
            PlatformError::Unexpected(cause) => {
                tracing::error!("{cause}");
                Self::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponseBody::new_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )),
                )
                    .into_response()
            }
            UnprocessableEntity(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponseBody::new_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    message,
                )),
            )
                .into_response(),
            ServiceUnavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponseBody::new_error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    message,
                )),
            )
                .into_response(),
            BadGateway(message) => (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponseBody::new_error(StatusCode::BAD_GATEWAY, message)),
            )
                .into_response(),
            Unauthorized { login } => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponseBody {
                    status_code: StatusCode::UNAUTHORIZED.as_u16(),
                    data: UnauthorizedData {
                        message: "authentication required".to_string(),
                        login,
                    },
                }),
            )
                .into_response(),
            NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

// Generic response structure shared by all API responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub status_code: u16,
    pub data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Denied-access responses also carry where to sign in, preserving the
/// originally requested location for the post-login return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnauthorizedData {
    pub message: String,
    pub login: String,
}
