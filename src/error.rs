use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::ErrorBody;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("LOVABLE_API_KEY is not configured")]
    #[diagnostic(code(lumacalm::config), help("pass --api-key or set LOVABLE_API_KEY"))]
    MissingApiKey,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Payment required. Please add credits to continue.")]
    QuotaExceeded,

    #[error("AI service unavailable")]
    UpstreamUnavailable { status: u16, body: String },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(help("check --db / DATABASE_URL, or run with --no-store"))]
    Database(#[from] sqlx::Error),

    #[error("sign in required")]
    #[diagnostic(code(lumacalm::session), help("pass --user or set LUMACALM_USER"))]
    NotSignedIn,

    #[error("{0}")]
    Relay(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Longer form for the client log panel. Upstream failures carry the
    /// gateway status and body, which never reach the user-facing message.
    pub fn detail(&self) -> String {
        match self {
            Self::UpstreamUnavailable { status, body } => {
                format!("{self} (gateway status {status}): {body}")
            }
            _ => self.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
