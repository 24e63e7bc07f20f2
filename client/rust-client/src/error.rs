use reqwest::StatusCode;
use thiserror::Error;

use crate::navigator::NavigatorError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid payload: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Failures of a view that cannot render without its data
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("View could not load its data, redirecting to {to}")]
    Redirect {
        to: String,
        #[source]
        cause: ApiError,
    },

    #[error(transparent)]
    Navigator(#[from] NavigatorError),
}

impl SessionError {
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            SessionError::Redirect { to, .. } => Some(to),
            SessionError::Navigator(_) => None,
        }
    }
}
