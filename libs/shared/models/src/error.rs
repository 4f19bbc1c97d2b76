use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a non-success HTTP response onto the error taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let err = match status.as_u16() {
            401 | 403 => AppError::Auth(body.to_string()),
            404 => AppError::NotFound(body.to_string()),
            _ => AppError::ExternalService(format!("API error ({}): {}", status, body)),
        };

        match &err {
            AppError::NotFound(_) => tracing::debug!("Remote resource missing: {}", err),
            _ => tracing::error!("Remote call failed: {}", err),
        }
        err
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Validation failures are warnings to the user, not faults.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// Underlying message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::Auth(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::ExternalService(msg)
            | AppError::Config(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::from_status(status, &err.to_string()),
            None => AppError::ExternalService(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Malformed payload: {}", err))
    }
}
