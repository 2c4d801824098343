//! Registers new users and logs them in.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use serde::Deserialize;
use serde_json::json;

use crate::{
    Error,
    app_state::lock_connection,
    auth::{
        NewUser, PasswordHash, SessionState, ValidatedPassword, create_user,
        password::MIN_PASSWORD_LENGTH, set_auth_cookie,
    },
    validation::{ValidationErrors, require, require_text},
};

const MAX_NAME_LENGTH: usize = 255;
const MAX_EMAIL_LENGTH: usize = 255;

/// The JSON body of a registration request.
///
/// Every field is optional so that missing fields are reported as
/// validation errors rather than a rejected body.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

struct ValidRegistration {
    name: String,
    email: String,
    password: ValidatedPassword,
}

fn validate_registration(form: &RegisterForm) -> Result<ValidRegistration, Error> {
    let mut errors = ValidationErrors::default();

    let name = require_text(&mut errors, "name", form.name.as_deref(), MAX_NAME_LENGTH);
    let email = require_text(&mut errors, "email", form.email.as_deref(), MAX_EMAIL_LENGTH);

    if email
        .as_deref()
        .is_some_and(|email| !EmailAddress::is_valid(email))
    {
        errors.add("email", "The email field must be a valid email address.");
    }

    let password = require(&mut errors, "password", form.password.as_deref());

    if let Some(password) = password {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("The password field must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }

        if form.password_confirmation.as_deref().map(str::trim) != Some(password) {
            errors.add("password", "The password field confirmation does not match.");
        }
    }

    // Strength is only worth checking once the cheaper checks have passed.
    let validated_password = match password {
        Some(password) if !errors.has("password") => {
            let user_inputs: Vec<&str> = [name.as_deref(), email.as_deref()]
                .into_iter()
                .flatten()
                .collect();

            match ValidatedPassword::new(password, &user_inputs) {
                Ok(validated) => Some(validated),
                Err(Error::TooWeak(feedback)) => {
                    let message = format!("The password is too weak. {feedback}");
                    errors.add("password", message.trim_end());
                    None
                }
                Err(error) => return Err(error),
            }
        }
        _ => None,
    };

    errors.into_result()?;

    match (name, email, validated_password) {
        (Some(name), Some(email), Some(password)) => Ok(ValidRegistration {
            name,
            email,
            password,
        }),
        // Every missing value records an error above, so this is unreachable in practice.
        _ => Err(ValidationErrors::default().into()),
    }
}

/// Handler for registering a new user via a JSON body.
///
/// On success the new user is logged in and returned with a 201 status.
///
/// # Errors
///
/// Returns a 422 response listing every invalid field, including an email
/// address that is already registered.
pub async fn register_user(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    body: Result<Json<RegisterForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(form) = body?;
    let registration = validate_registration(&form)?;
    let password_hash = PasswordHash::new(registration.password, state.password_hash_cost)?;

    let new_user = NewUser {
        name: registration.name,
        email: registration.email,
        password_hash,
    };

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match create_user(new_user, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                let mut errors = ValidationErrors::default();
                errors.add("email", "The email has already been taken.");
                return Err(errors.into());
            }
            Err(error) => return Err(error),
        }
    };

    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}
