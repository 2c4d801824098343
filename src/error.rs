//! Defines the app level error type and its conversion to JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::validation::ValidationErrors;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request parameters or body failed validation.
    ///
    /// The client should fix the fields listed in the error and try again.
    #[error("the given data was invalid: {0}")]
    Validation(ValidationErrors),

    /// The request did not carry a valid auth token.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The user tried to access a record they do not own.
    ///
    /// This is also used for record IDs that do not exist so that clients
    /// cannot discover records owned by other users.
    #[error("the record does not belong to the current user")]
    Forbidden,

    /// The user provided an email and password combination that does not match a user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email address is already registered to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The auth cookie could not be created.
    #[error("could not create the auth cookie: {0}")]
    CookieError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
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

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "message": errors.summary(),
                    "errors": errors,
                })),
            )
                .into_response(),
            Error::Unauthenticated => message_response(StatusCode::UNAUTHORIZED, "Unauthenticated."),
            Error::Forbidden => message_response(StatusCode::FORBIDDEN, "Unauthorized"),
            Error::InvalidCredentials => {
                message_response(StatusCode::UNAUTHORIZED, "Invalid login credentials")
            }
            Error::NotFound => message_response(StatusCode::NOT_FOUND, "Not Found"),
            Error::InvalidTimezoneError(timezone) => {
                tracing::error!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                );
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        }
    }
}

fn message_response(status_code: StatusCode, message: &str) -> Response {
    (status_code, Json(json!({ "message": message }))).into_response()
}
