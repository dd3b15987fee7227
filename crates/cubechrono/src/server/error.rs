use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cubechrono_core::ScrambleError;

/// Error returned by a route handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request is malformed or out of range.
    #[error("{0}")]
    BadRequest(String),
    /// Route requires a token cookie and there is none.
    #[error("Unauthorized")]
    Unauthorized,
    /// No such route.
    #[error("Not found")]
    NotFound,
    /// API responded with an error status.
    #[error("{message}")]
    Upstream {
        /// Status from the API.
        status: StatusCode,
        /// Message from the API, or a default for the route.
        message: String,
    },
    /// API could not be reached.
    #[error("API unreachable: {0}")]
    Unreachable(String),
    /// Anything else.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Converts an API client error, using `default_message` if the API did
    /// not supply one.
    pub fn from_api(err: cubechrono_api_client::Error, default_message: &str) -> Self {
        use cubechrono_api_client::Error;

        match err {
            Error::Api { status, message } => AppError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message: message.unwrap_or_else(|| default_message.to_owned()),
            },
            Error::Scramble(e) => e.into(),
            Error::InvalidArgument(message) => AppError::BadRequest(message),
            e if e.is_unreachable() => AppError::Unreachable(e.to_string()),
            e => AppError::Internal(e.to_string()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } => *status,
            AppError::Unreachable(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<cubechrono_api_client::Error> for AppError {
    fn from(err: cubechrono_api_client::Error) -> Self {
        Self::from_api(err, "Request to the API failed")
    }
}

impl From<ScrambleError> for AppError {
    fn from(err: ScrambleError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Unreachable(_) | AppError::Internal(_) => log::error!("{self}"),
            _ => log::debug!("{status}: {self}"),
        }

        let message = match self {
            // don't leak internals to the browser
            AppError::Internal(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        };
        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
