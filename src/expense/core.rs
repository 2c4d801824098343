//! Defines the core data models and database queries for expenses.

use rusqlite::{Connection, Row, named_params};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    database_id::ExpenseId,
    money::Money,
    pagination::{Page, PageRequest},
};

// ============================================================================
// MODELS
// ============================================================================

/// Money a user has spent, filed under a free-text category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user that recorded, and owns, the expense.
    pub user_id: UserID,
    /// How much was spent. Always at least 0.01.
    pub amount: Money,
    pub description: String,
    /// The category, e.g. "Food" or "Transport".
    ///
    /// Categories are compared exactly, so "food" and "Food" are different categories.
    pub category: String,
    /// When the money was spent.
    pub date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields of an expense, used for both creating and updating.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: Money,
    pub description: String,
    pub category: String,
    pub date: Date,
}

/// Optional conditions for narrowing down a list of expenses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Only include expenses in this exact category.
    pub category: Option<String>,
    /// Only include expenses on or after this date.
    pub start_date: Option<Date>,
    /// Only include expenses on or before this date.
    pub end_date: Option<Date>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const EXPENSE_COLUMNS: &str =
    "id, user_id, amount, description, category, date, created_at, updated_at";

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every query filters by user and most filter by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new expense owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. if `user_id` does not refer to a registered user.
pub fn create_expense(
    user_id: UserID,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let now = OffsetDateTime::now_utc();

    let expense = connection
        .prepare(&format!(
            "INSERT INTO expense (user_id, amount, description, category, date, created_at, updated_at)
             VALUES (:user_id, :amount, :description, :category, :date, :now, :now)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_one(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":amount": expense.amount,
                ":description": expense.description,
                ":category": expense.category,
                ":date": expense.date,
                ":now": now,
            },
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Retrieve the expense `id` on behalf of `user_id`.
///
/// # Errors
/// Returns [Error::Forbidden] if the expense belongs to another user or does
/// not exist, so callers cannot tell the two cases apart.
pub fn get_owned_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    match get_expense(id, connection) {
        Ok(expense) if expense.user_id == user_id => Ok(expense),
        Ok(_) | Err(Error::NotFound) => {
            tracing::debug!("user {user_id} denied access to expense {id}");
            Err(Error::Forbidden)
        }
        Err(error) => Err(error),
    }
}

/// Replace the fields of expense `id` and bump its update time.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "UPDATE expense
             SET amount = :amount, description = :description, category = :category,
                 date = :date, updated_at = :now
             WHERE id = :id
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_one(
            named_params! {
                ":id": id,
                ":amount": expense.amount,
                ":description": expense.description,
                ":category": expense.category,
                ":date": expense.date,
                ":now": OffsetDateTime::now_utc(),
            },
            map_expense_row,
        )?;

    Ok(expense)
}

/// Delete expense `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there was no expense to delete.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The conditions shared by the count and page queries in [list_expenses].
const LIST_CONDITIONS: &str = "user_id = :user_id
    AND (:category IS NULL OR category = :category)
    AND (:start_date IS NULL OR date >= :start_date)
    AND (:end_date IS NULL OR date <= :end_date)";

/// Get one page of the expenses owned by `user_id` that match `filter`,
/// newest first.
///
/// Expenses on the same date are ordered by ID so the most recently recorded comes first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_expenses(
    user_id: UserID,
    filter: &ExpenseFilter,
    page: PageRequest,
    connection: &Connection,
) -> Result<Page<Expense>, Error> {
    let total: i64 = connection
        .prepare(&format!(
            "SELECT COUNT(id) FROM expense WHERE {LIST_CONDITIONS}"
        ))?
        .query_one(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":category": filter.category,
                ":start_date": filter.start_date,
                ":end_date": filter.end_date,
            },
            |row| row.get(0),
        )?;

    let expenses = connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
             WHERE {LIST_CONDITIONS}
             ORDER BY date DESC, id DESC
             LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":category": filter.category,
                ":start_date": filter.start_date,
                ":end_date": filter.end_date,
                ":limit": page.sql_limit(),
                ":offset": page.sql_offset(),
            },
            map_expense_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(expenses, page, total))
}

/// Map a database row to an Expense.
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
