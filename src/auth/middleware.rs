//! Authentication middleware that validates the auth cookie and extends sessions.

use axum::{
    extract::{FromRef, Request},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::Duration;

use crate::{
    AppState,
    auth::cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
};

/// How close to expiry a session may get before activity pushes the expiry back.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid auth cookie.
///
/// If the cookie is valid, the user ID is placed into the request extensions
/// and the request executed normally, otherwise a 401 JSON response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
///
/// **Note**: The middleware state must provide the `Key` for decrypting and verifying the cookie.
pub async fn auth_guard(jar: PrivateCookieJar, mut request: Request, next: Next) -> Response {
    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(error) => {
            tracing::debug!("rejected request to {}: {error}", request.uri().path());
            return error.into_response();
        }
    };

    request.extensions_mut().insert(token.user_id);
    let response = next.run(request).await;

    // Handlers such as log out set their own cookie, which must not be overwritten.
    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    match extend_auth_cookie_duration_if_needed(jar, SESSION_EXTENSION) {
        Ok(Some(jar)) => (jar, response).into_response(),
        Ok(None) => response,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error}");
            response
        }
    }
}
