//! Helpers shared by the unit tests: a ready-to-use app state and test
//! server, plus shortcuts for inserting users and records.

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use time::Date;

use crate::{
    AppState, build_router, endpoints,
    app_state::lock_connection,
    auth::{COOKIE_TOKEN, NewUser, PasswordHash, User, UserID, ValidatedPassword, create_user},
    expense::{Expense, NewExpense, create_expense},
    money::Money,
    pagination::PaginationConfig,
    saving::{NewSaving, Saving, create_saving},
};

/// The password of every user created by [insert_test_user].
pub const TEST_PASSWORD: &str = "turquoise-lantern-orbit-93";

/// The lowest cost bcrypt accepts, so tests that hash passwords stay fast.
const TEST_HASH_COST: u32 = 4;

/// An app state backed by a fresh in-memory database.
pub fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database.");
    let mut state = AppState::new(
        connection,
        "foobar",
        "Etc/UTC",
        PaginationConfig::default(),
    )
    .expect("Could not create app state.");
    state.password_hash_cost = TEST_HASH_COST;

    state
}

/// A test server running the full router over `state`.
pub fn get_test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// Insert a user named "Jane Doe" whose password is [TEST_PASSWORD].
pub fn insert_test_user(state: &AppState, email: &str) -> User {
    let connection = lock_connection(&state.db_connection).expect("Could not lock database.");

    insert_user_with_connection(&connection, email)
}

pub fn insert_user_with_connection(connection: &Connection, email: &str) -> User {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_HASH_COST,
    )
    .expect("Could not hash password.");

    create_user(
        NewUser {
            name: "Jane Doe".to_owned(),
            email: email.to_owned(),
            password_hash,
        },
        connection,
    )
    .expect("Could not create user.")
}

/// Log in as `email` with [TEST_PASSWORD] and return the auth cookie.
pub async fn log_in(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .await;
    response.assert_status_ok();

    response.cookie(COOKIE_TOKEN)
}

pub fn insert_expense(
    connection: &Connection,
    user_id: UserID,
    amount: Decimal,
    category: &str,
    date: Date,
) -> Expense {
    let expense = NewExpense {
        amount: Money::new(amount),
        description: format!("{category} on {date}"),
        category: category.to_owned(),
        date,
    };

    create_expense(user_id, &expense, connection).expect("Could not create expense.")
}

pub fn insert_saving(
    connection: &Connection,
    user_id: UserID,
    amount: Decimal,
    date: Date,
) -> Saving {
    let saving = NewSaving {
        amount: Money::new(amount),
        description: format!("Saving on {date}"),
        date,
    };

    create_saving(user_id, &saving, connection).expect("Could not create saving.")
}
