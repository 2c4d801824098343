//! Defines the core data models and database queries for savings.

use rusqlite::{Connection, Row, named_params};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    database_id::SavingId,
    money::Money,
    pagination::{Page, PageRequest},
};

/// Money a user has put aside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Saving {
    pub id: SavingId,
    /// The user that recorded, and owns, the saving.
    pub user_id: UserID,
    /// How much was saved. Always at least 0.01.
    pub amount: Money,
    pub description: String,
    /// When the money was saved.
    pub date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields of a saving, used for both creating and updating.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSaving {
    pub amount: Money,
    pub description: String,
    pub date: Date,
}

const SAVING_COLUMNS: &str = "id, user_id, amount, description, date, created_at, updated_at";

/// Create the saving table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_saving_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS saving (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_saving_user_date ON saving(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new saving owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_saving(
    user_id: UserID,
    saving: &NewSaving,
    connection: &Connection,
) -> Result<Saving, Error> {
    let now = OffsetDateTime::now_utc();

    let saving = connection
        .prepare(&format!(
            "INSERT INTO saving (user_id, amount, description, date, created_at, updated_at)
             VALUES (:user_id, :amount, :description, :date, :now, :now)
             RETURNING {SAVING_COLUMNS}"
        ))?
        .query_one(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":amount": saving.amount,
                ":description": saving.description,
                ":date": saving.date,
                ":now": now,
            },
            map_saving_row,
        )?;

    Ok(saving)
}

/// Retrieve the saving `id` on behalf of `user_id`.
///
/// # Errors
/// Returns [Error::Forbidden] if the saving belongs to another user or does not exist.
pub fn get_owned_saving(
    id: SavingId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Saving, Error> {
    let saving = connection
        .prepare(&format!("SELECT {SAVING_COLUMNS} FROM saving WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_saving_row);

    match saving {
        Ok(saving) if saving.user_id == user_id => Ok(saving),
        Ok(_) | Err(rusqlite::Error::QueryReturnedNoRows) => {
            tracing::debug!("user {user_id} denied access to saving {id}");
            Err(Error::Forbidden)
        }
        Err(error) => Err(error.into()),
    }
}

/// Replace the fields of saving `id` and bump its update time.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid saving,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_saving(
    id: SavingId,
    saving: &NewSaving,
    connection: &Connection,
) -> Result<Saving, Error> {
    let saving = connection
        .prepare(&format!(
            "UPDATE saving
             SET amount = :amount, description = :description, date = :date, updated_at = :now
             WHERE id = :id
             RETURNING {SAVING_COLUMNS}"
        ))?
        .query_one(
            named_params! {
                ":id": id,
                ":amount": saving.amount,
                ":description": saving.description,
                ":date": saving.date,
                ":now": OffsetDateTime::now_utc(),
            },
            map_saving_row,
        )?;

    Ok(saving)
}

/// Delete saving `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there was no saving to delete.
pub fn delete_saving(id: SavingId, connection: &Connection) -> Result<(), Error> {
    match connection.execute("DELETE FROM saving WHERE id = :id", &[(":id", &id)])? {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Get one page of the savings owned by `user_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_savings(
    user_id: UserID,
    page: PageRequest,
    connection: &Connection,
) -> Result<Page<Saving>, Error> {
    let total: i64 = connection.query_row(
        "SELECT COUNT(id) FROM saving WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    let savings = connection
        .prepare(&format!(
            "SELECT {SAVING_COLUMNS} FROM saving
             WHERE user_id = :user_id
             ORDER BY date DESC, id DESC
             LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":limit": page.sql_limit(),
                ":offset": page.sql_offset(),
            },
            map_saving_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(savings, page, total))
}

fn map_saving_row(row: &Row) -> Result<Saving, rusqlite::Error> {
    Ok(Saving {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
