use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Order lines that failed validation, one message per line.
    #[error("Order rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stock moved under a validated order; the client may retry.
    #[error("Stock conflict: {0}")]
    StockConflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RejectionBody {
    pub errors: Vec<String>,
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::Rejected(failures) => {
                AppError::Rejected(failures.iter().map(ToString::to_string).collect())
            }
            DomainError::StockConflict(_) => AppError::StockConflict(e.to_string()),
            DomainError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Forbidden(_) => AppError::Forbidden(e.to_string()),
            AuthError::Issue(msg) => AppError::Internal(msg),
            _ => AppError::Unauthorized(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Rejected(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::StockConflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::Rejected(errors) => response.json(RejectionBody {
                errors: errors.clone(),
            }),
            AppError::StockConflict(msg) => response.json(RejectionBody {
                errors: vec![msg.clone()],
            }),
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                response.json(ErrorBody {
                    error: "Internal server error".to_string(),
                })
            }
            AppError::NotFound => response.json(ErrorBody {
                error: self.to_string(),
            }),
            AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg) => response.json(ErrorBody { error: msg.clone() }),
        }
    }
}
