//! Creates the application's tables and holds the SQL that differs between storage backends.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, auth::create_user_table, expense::create_expense_table, saving::create_saving_table};

/// The SQL expression that extracts the calendar month (1-12) from the `date` column.
///
/// Dates are stored as ISO 8601 text, so SQLite's `strftime` can read them directly.
/// This is the only backend-specific expression used by the analytics queries.
pub const MONTH_OF_DATE: &str = "CAST(strftime('%m', date) AS INTEGER)";

/// Create all the tables for the application's domain models.
///
/// The tables are created inside a single transaction so a failure leaves the
/// database untouched.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute("PRAGMA foreign_keys = ON", ())?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_saving_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
