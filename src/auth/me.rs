//! Returns the user that is currently logged in.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    app_state::lock_connection,
    auth::{SessionState, User, UserID, get_user_by_id},
};

/// Return the logged in user.
///
/// A valid cookie for a user that has since been removed is treated as unauthenticated.
pub async fn get_current_user(
    State(state): State<SessionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(Json(user)),
        Err(Error::NotFound) => Err(Error::Unauthenticated),
        Err(error) => Err(error),
    }
}
