//! Defines functions for handling user authentication with private cookies.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{Token, UserID},
};

/// The name of the cookie holding the serialized [Token].
pub const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::days(1);

fn build_token_cookie(token: &Token) -> Result<Cookie<'static>, Error> {
    let token_json =
        serde_json::to_string(token).map_err(|error| Error::CookieError(error.to_string()))?;

    Ok(Cookie::build((COOKIE_TOKEN, token_json))
        .path("/")
        .expires(token.expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build())
}

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// The cookie expires `duration` from the current time.
///
/// # Errors
///
/// Returns [Error::CookieError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = Token::new(user_id, duration);

    Ok(jar.add(build_token_cookie(&token)?))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read and check the token in the auth cookie.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if the cookie is missing, cannot be
/// decrypted or parsed, or holds an expired token.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::Unauthenticated)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::Unauthenticated)?;

    if token.is_expired_at(OffsetDateTime::now_utc()) {
        return Err(Error::Unauthenticated);
    }

    Ok(token)
}

/// Push the expiry of the auth cookie out to `duration` from now if it would
/// expire sooner than that.
///
/// Returns `None` if the cookie does not need to be extended.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if the jar has no valid token, or
/// [Error::CookieError] if the new token cannot be serialized.
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<Option<PrivateCookieJar>, Error> {
    let mut token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc() + duration;

    if token.expires_at >= new_expiry {
        return Ok(None);
    }

    token.expires_at = new_expiry;

    Ok(Some(jar.add(build_token_cookie(&token)?)))
}
