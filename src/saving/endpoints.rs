//! Route handlers for creating, reading, updating and deleting savings.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::UserID,
    database_id::SavingId,
    pagination::{Page, PaginationConfig},
    saving::{
        Saving, SavingForm, SavingListQuery, create_saving, delete_saving, get_owned_saving,
        list_savings, update_saving,
    },
};

/// The state needed by the saving endpoints.
#[derive(Debug, Clone)]
pub struct SavingState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for SavingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// List the current user's savings, newest first, one page at a time.
pub async fn list_savings_endpoint(
    State(state): State<SavingState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<SavingListQuery>, QueryRejection>,
) -> Result<Json<Page<Saving>>, Error> {
    let Query(query) = query?;
    let page = query.validate(&state.pagination_config)?;

    let connection = lock_connection(&state.db_connection)?;

    list_savings(user_id, page, &connection).map(Json)
}

/// Record a new saving for the current user.
pub async fn create_saving_endpoint(
    State(state): State<SavingState>,
    Extension(user_id): Extension<UserID>,
    body: Result<Json<SavingForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(form) = body?;
    let new_saving = form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let saving = create_saving(user_id, &new_saving, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Saving created successfully",
            "saving": saving,
        })),
    ))
}

/// Get one of the current user's savings.
pub async fn get_saving_endpoint(
    State(state): State<SavingState>,
    Extension(user_id): Extension<UserID>,
    Path(saving_id): Path<SavingId>,
) -> Result<Json<Saving>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_owned_saving(saving_id, user_id, &connection).map(Json)
}

/// Replace the fields of one of the current user's savings.
pub async fn update_saving_endpoint(
    State(state): State<SavingState>,
    Extension(user_id): Extension<UserID>,
    Path(saving_id): Path<SavingId>,
    body: Result<Json<SavingForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;
    get_owned_saving(saving_id, user_id, &connection)?;

    let Json(form) = body?;
    let saving = update_saving(saving_id, &form.validate()?, &connection)?;

    Ok(Json(json!({
        "message": "Saving updated successfully",
        "saving": saving,
    })))
}

/// Delete one of the current user's savings.
pub async fn delete_saving_endpoint(
    State(state): State<SavingState>,
    Extension(user_id): Extension<UserID>,
    Path(saving_id): Path<SavingId>,
) -> Result<impl IntoResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;
    get_owned_saving(saving_id, user_id, &connection)?;
    delete_saving(saving_id, &connection)?;

    Ok(Json(json!({"message": "Saving deleted successfully"})))
}
