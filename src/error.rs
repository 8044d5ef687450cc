use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Which pending-ticket cap was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapScope {
    Global,
    PerUser,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin access required")]
    Forbidden,

    #[error("Pending ticket limit reached")]
    CapacityExceeded { scope: CapScope },

    #[error("An unfilled draw already exists")]
    UnfilledDrawExists,

    #[error("Draw not found")]
    DrawNotFound,

    #[error("Storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::CapacityExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UnfilledDrawExists => StatusCode::BAD_REQUEST,
            AppError::DrawNotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the logs, not the response body.
        let body = match &self {
            AppError::Storage(e) => {
                tracing::error!("storage failure: {e}");
                "Internal error".to_string()
            }
            AppError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, body).into_response()
    }
}
