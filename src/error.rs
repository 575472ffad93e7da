use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure while fetching a single page from the scraped site
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unable to connect to {url}: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },
}

impl FetchError {
    /// Classifies a reqwest failure for the given URL
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_string(),
            };
        }

        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            };
        }

        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// True for an upstream 404 (unknown user or private watchlist)
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Http { status: 404, .. })
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] FetchError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No candidates found (genre filter active: {genre_filtered})")]
    NoCandidatesFound { genre_filtered: bool },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and user-facing message for this error
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::NoCandidatesFound { genre_filtered } => {
                let msg = if *genre_filtered {
                    "No films found matching the selected genres."
                } else {
                    "No films found in watchlist."
                };
                (StatusCode::NOT_FOUND, msg.to_string())
            }
            AppError::Upstream(err) => match err {
                FetchError::Timeout { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Request timed out. Please try again.".to_string(),
                ),
                FetchError::Network { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to connect to Letterboxd. Please try again later.".to_string(),
                ),
                FetchError::Http { .. } if err.is_not_found() => (
                    StatusCode::NOT_FOUND,
                    "User not found or watchlist is private.".to_string(),
                ),
                FetchError::Http { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch watchlist.".to_string(),
                ),
            },
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::HttpClient(_) => (
                StatusCode::BAD_GATEWAY,
                "Upstream service request failed.".to_string(),
            ),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Cache(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
