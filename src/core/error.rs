use crate::clients::{LlmError, RetrievalError, StorageError};
use crate::sanitize::SanitizeError;
use crate::uploads::UploadError;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn payload_too_large(message: &'static str) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::service_unavailable("Database unavailable")
            }

            _ => Self::internal_server_error("Internal server error"),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation error").with_details(err.to_string())
    }
}

impl From<SanitizeError> for AppError {
    fn from(err: SanitizeError) -> Self {
        Self::bad_request("Invalid question").with_details(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        Self::bad_request("Invalid file upload").with_details(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        // il body limit di axum si manifesta come errore di multipart con status 413
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large("File too large").with_details(err.body_text());
        }
        Self::bad_request("Malformed multipart body").with_details(err.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        // 415 (content-type mancante) e 413 restano tali, JSON non valido diventa 400
        let status = match err.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::PAYLOAD_TOO_LARGE => err.status(),
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, "Invalid request body").with_details(err.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        Self::bad_request("Invalid path parameter").with_details(err.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        Self::bad_request("Invalid query string").with_details(err.body_text())
    }
}

// Gli errori dei servizi esterni vengono loggati per intero, al client arriva un messaggio generico
impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        error!("LLM request failed: {}", err);
        Self::service_unavailable("AI service is temporarily unavailable")
    }
}

impl From<RetrievalError> for AppError {
    fn from(err: RetrievalError) -> Self {
        error!("Context retrieval failed: {}", err);
        Self::service_unavailable("Search service is temporarily unavailable")
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        error!("Storage request failed: {}", err);
        Self::internal_server_error("Failed to store the uploaded file")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
