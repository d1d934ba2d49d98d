//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::TokenError;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request field was missing, malformed or out of range.
    ///
    /// The string describes which field was rejected and why, and is shown to the client.
    #[error("{0}")]
    Validation(String),

    /// The email used to register an account already belongs to another account.
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// A category was renamed to a name that the user already uses for another category.
    #[error("A category named \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The request body was larger than the server accepts.
    #[error("The request body is too large")]
    PayloadTooLarge,

    /// The user provided an email and password combination that does not match an account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The session token in the request was missing or could not be verified.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The session token signing secret was not configured.
    #[error("the session token signing secret is not configured")]
    MissingSigningSecret,

    /// The session token could not be signed.
    ///
    /// The error string should only be logged on the server.
    #[error("could not create session token: {0}")]
    TokenCreation(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The configured timezone is not a valid, canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The user referenced by a session token no longer exists.
    #[error("User account no longer exists")]
    UserNotFound,

    /// The category does not exist or belongs to another user.
    #[error("Category not found")]
    CategoryNotFound,

    /// The transaction does not exist or belongs to another user.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    /// Callers that know which resource was requested should convert it into
    /// one of the more specific variants.
    #[error("The requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A request or response body could not be read while logging it.
    #[error("could not read message body: {0}")]
    BodyRead(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            Error::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            Error::DuplicateEmail => (StatusCode::CONFLICT, "email_already_registered"),
            Error::DuplicateCategoryName(_) => (StatusCode::CONFLICT, "category_already_exists"),
            Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, "authentication_failed"),
            Error::Token(token_error) => (StatusCode::UNAUTHORIZED, token_error.code()),
            Error::UserNotFound
            | Error::CategoryNotFound
            | Error::TransactionNotFound
            | Error::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            Error::MissingSigningSecret
            | Error::TokenCreation(_)
            | Error::HashingError(_)
            | Error::InvalidTimezone(_)
            | Error::DatabaseLockError
            | Error::BodyRead(_)
            | Error::SqlError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Any errors that are not handled above are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            match &self {
                Error::Token(token_error) => token_error.message().to_owned(),
                other => other.to_string(),
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use crate::{Error, auth::TokenError};

    async fn into_parts(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        (status, serde_json::from_slice(&body).expect("body is not JSON"))
    }

    #[tokio::test]
    async fn validation_error_is_bad_request() {
        let (status, body) = into_parts(Error::Validation("month must be 1-12".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "validation_failed", "message": "month must be 1-12"})
        );
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() {
        let (status, body) = into_parts(Error::PayloadTooLarge).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "payload_too_large");
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let (status, body) = into_parts(Error::DuplicateEmail).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "email_already_registered");
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let (status, body) = into_parts(Error::Token(TokenError::Expired)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "token_expired");
        assert_eq!(
            body["message"],
            "Your session has expired. Please login again"
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = into_parts(Error::HashingError("secret detail".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert!(!body["message"].as_str().unwrap().contains("secret detail"));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
