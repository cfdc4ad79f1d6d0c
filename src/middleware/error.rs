use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

/// Errors surfaced by the page extractors and handlers.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No session on a strict page; redirect to `location`.
    #[error("Not authenticated")]
    Unauthenticated { location: String },

    /// No session on a strict page and the login redirect could not be
    /// issued. The page renders nothing.
    #[error("Login redirect could not be issued")]
    NavigationFailed,

    #[error("Profile not found")]
    NotFound,

    /// User directory lookup failed.
    #[error("User directory error: {0}")]
    Directory(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated { location } => Redirect::to(&location).into_response(),
            Self::NavigationFailed => {
                tracing::error!(error = %self, "Strict page left without redirect");
                StatusCode::NO_CONTENT.into_response()
            }
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            Self::Directory(_) | Self::Config(_) => {
                tracing::error!(error = %self, "Page internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
