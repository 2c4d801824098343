//! This file defines the route for handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{
    Error,
    app_state::lock_connection,
    auth::{SessionState, get_user_by_email, set_auth_cookie},
    validation::{ValidationErrors, require},
};

/// The raw data sent by the client to log in.
///
/// The password is a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Debug, Default, Deserialize)]
pub struct LogInData {
    /// Email address entered during log-in.
    pub email: Option<String>,
    /// Password entered during log-in.
    pub password: Option<String>,
}

/// Handler for log-in requests.
///
/// On a successful log-in request, the auth cookie is set and the user is returned.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is missing (422).
/// - The email is not registered or the password is not correct (401).
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    body: Result<Json<LogInData>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(credentials) = body?;

    let mut errors = ValidationErrors::default();
    let email = require(&mut errors, "email", credentials.email.as_deref());
    let password = require(&mut errors, "password", credentials.password.as_deref());
    errors.into_result()?;

    let (Some(email), Some(password)) = (email, password) else {
        return Err(Error::InvalidCredentials);
    };

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_email(email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                tracing::debug!("log in attempted for unregistered email");
                return Err(Error::InvalidCredentials);
            }
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(password)? {
        tracing::debug!("incorrect password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "user": user,
        })),
    ))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::COOKIE_TOKEN,
        endpoints,
        test_utils::{TEST_PASSWORD, get_test_server, get_test_state, insert_test_user},
    };

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "jane@example.com", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "message": "Login successful",
            "user": {"id": user.id.as_i64(), "name": "Jane Doe", "email": "jane@example.com"},
        }));

        let cookie = response.cookie(COOKIE_TOKEN);
        let expires_at = cookie.expires_datetime().expect("cookie should have an expiry");
        let want = OffsetDateTime::now_utc() + Duration::days(1);
        assert!(
            (expires_at - want).abs() < Duration::seconds(2),
            "got expiry {expires_at:?}, want {want:?}"
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com");
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "jane@example.com", "password": "not-the-password"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"message": "Invalid login credentials"}));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "nobody@example.com", "password": TEST_PASSWORD}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let server = get_test_server(get_test_state());

        let response = server.post(endpoints::LOG_IN).json(&json!({})).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["errors"]["email"], json!(["The email field is required."]));
        assert_eq!(
            body["errors"]["password"],
            json!(["The password field is required."])
        );
    }
}
