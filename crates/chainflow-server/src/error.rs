//! Server errors and HTTP response conversion

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chainflow_core::ActionResponse;
use thiserror::Error;

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener bind error
    #[error("failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Accept loop failure
    #[error("server error: {0}")]
    Serve(std::io::Error),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// An action envelope with its HTTP status
#[derive(Debug)]
pub struct ApiResponse(pub ActionResponse);

impl From<ActionResponse> for ApiResponse {
    fn from(response: ActionResponse) -> Self {
        Self(response)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_response_status() {
        let response = ApiResponse(ActionResponse {
            status: 403,
            body: json!({ "success": false }),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::Config("bad toml".to_string());
        assert!(err.to_string().contains("config error"));
        assert!(err.to_string().contains("bad toml"));

        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        assert!(matches!(ServerError::from(io_err), ServerError::Bind(_)));
    }
}
