//! Route handlers for creating, reading, updating and deleting expenses.

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
    database_id::ExpenseId,
    expense::{
        Expense, ExpenseForm, ExpenseListQuery, create_expense, delete_expense,
        get_owned_expense, list_expenses, update_expense,
    },
    pagination::{Page, PaginationConfig},
};

/// The state needed by the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// List the current user's expenses, newest first, one page at a time.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<ExpenseListQuery>, QueryRejection>,
) -> Result<Json<Page<Expense>>, Error> {
    let Query(query) = query?;
    let (filter, page) = query.validate(&state.pagination_config)?;

    let connection = lock_connection(&state.db_connection)?;
    let expenses = list_expenses(user_id, &filter, page, &connection)?;

    Ok(Json(expenses))
}

/// Record a new expense for the current user.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    body: Result<Json<ExpenseForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(form) = body?;
    let new_expense = form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let expense = create_expense(user_id, &new_expense, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Expense created successfully",
            "expense": expense,
        })),
    ))
}

/// Get one of the current user's expenses.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_owned_expense(expense_id, user_id, &connection).map(Json)
}

/// Replace the fields of one of the current user's expenses.
///
/// Ownership is checked before the body, so another user's expense is
/// forbidden even when the body is invalid.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    body: Result<Json<ExpenseForm>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;
    get_owned_expense(expense_id, user_id, &connection)?;

    let Json(form) = body?;
    let new_expense = form.validate()?;
    let expense = update_expense(expense_id, &new_expense, &connection)?;

    Ok(Json(json!({
        "message": "Expense updated successfully",
        "expense": expense,
    })))
}

/// Delete one of the current user's expenses.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<impl IntoResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;
    get_owned_expense(expense_id, user_id, &connection)?;
    delete_expense(expense_id, &connection)?;

    tracing::debug!("user {user_id} deleted expense {expense_id}");

    Ok(Json(json!({"message": "Expense deleted successfully"})))
}
