//! Translation of core errors into HTTP responses
//!
//! Every failure body is `{"message": "..."}`. Anything unexpected becomes a
//! bare 500 "Server error"; the detail only goes to the tracing output.

use serde::Serialize;
use thiserror::Error;
use tracing::error;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};

use crate::domain::result::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("Access denied")]
    MissingToken,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// `{"message": ...}` reply with the given status
pub fn message_reply(status: StatusCode, message: impl Into<String>) -> Response {
    reply::with_status(
        reply::json(&ErrorBody {
            message: message.into(),
        }),
        status,
    )
    .into_response()
}

impl ApiError {
    /// Status code and caller-visible message
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Core(e @ Error::Conflict) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Core(Error::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(e @ Error::InvalidCredentials) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Core(e @ Error::InvalidToken) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Core(Error::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "User not found".to_string())
            }
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
            ),
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        message_reply(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(Error::Conflict), StatusCode::BAD_REQUEST),
            (ApiError::from(Error::InvalidCredentials), StatusCode::BAD_REQUEST),
            (ApiError::from(Error::InvalidToken), StatusCode::BAD_REQUEST),
            (ApiError::from(Error::not_found("gone")), StatusCode::NOT_FOUND),
            (ApiError::MissingToken, StatusCode::UNAUTHORIZED),
            (ApiError::from(Error::database("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_and_message().0, expected, "{:?}", err);
        }
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::from(Error::database("connection string postgres://secret"));
        let (_, message) = err.status_and_message();
        assert_eq!(message, "Server error");
    }

    #[test]
    fn test_messages_match_wire_contract() {
        assert_eq!(ApiError::from(Error::Conflict).status_and_message().1, "User already exists");
        assert_eq!(ApiError::MissingToken.status_and_message().1, "Access denied");
        assert_eq!(ApiError::from(Error::InvalidToken).status_and_message().1, "Invalid token");
    }

    #[test]
    fn test_reply_status() {
        let response = ApiError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
