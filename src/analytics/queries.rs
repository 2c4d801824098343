//! The grouped aggregate queries that the analytics reports are built from.
//!
//! Every query is scoped to a single user. Queries that take an
//! `Option<DateRange>` cover all of the user's records when given `None`.

use rusqlite::{Connection, Row, named_params};
use time::Date;

use crate::{
    Error,
    analytics::period::DateRange,
    auth::UserID,
    db::MONTH_OF_DATE,
    money::Money,
};

/// The sum and number of a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub total: Money,
    pub count: u32,
}

/// The totals for one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    pub category: String,
    pub total: Money,
    pub count: u32,
}

/// The totals for one month of the year (1-12).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthTotals {
    pub month: u8,
    pub total: Money,
    pub count: u32,
}

/// The fields of a saving shown in summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingSnapshot {
    pub amount: Money,
    pub description: String,
    pub date: Date,
}

const IN_RANGE: &str = "user_id = :user_id
    AND (:start IS NULL OR date >= :start)
    AND (:end IS NULL OR date <= :end)";

fn range_bounds(range: Option<DateRange>) -> (Option<Date>, Option<Date>) {
    match range {
        Some(range) => (Some(range.start), Some(range.end)),
        None => (None, None),
    }
}

fn map_totals_row(row: &Row) -> Result<Totals, rusqlite::Error> {
    Ok(Totals {
        total: row.get(0)?,
        count: row.get(1)?,
    })
}

/// Sum and count the user's expenses in `range`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn expense_totals(
    user_id: UserID,
    range: Option<DateRange>,
    connection: &Connection,
) -> Result<Totals, Error> {
    let (start, end) = range_bounds(range);

    connection
        .prepare(&format!(
            "SELECT COALESCE(SUM(amount), 0), COUNT(id) FROM expense WHERE {IN_RANGE}"
        ))?
        .query_one(
            named_params! {":user_id": user_id.as_i64(), ":start": start, ":end": end},
            map_totals_row,
        )
        .map_err(Error::from)
}

/// Sum and count the user's savings in `range`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn saving_totals(
    user_id: UserID,
    range: Option<DateRange>,
    connection: &Connection,
) -> Result<Totals, Error> {
    let (start, end) = range_bounds(range);

    connection
        .prepare(&format!(
            "SELECT COALESCE(SUM(amount), 0), COUNT(id) FROM saving WHERE {IN_RANGE}"
        ))?
        .query_one(
            named_params! {":user_id": user_id.as_i64(), ":start": start, ":end": end},
            map_totals_row,
        )
        .map_err(Error::from)
}

/// Group the user's expenses in `range` by category, largest total first.
///
/// Categories with equal totals are ordered by name. At most `limit`
/// categories are returned when a limit is given.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn category_totals(
    user_id: UserID,
    range: Option<DateRange>,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<CategoryTotals>, Error> {
    let (start, end) = range_bounds(range);
    // SQLite treats a negative limit as no limit.
    let limit = limit.map_or(-1, i64::from);

    connection
        .prepare(&format!(
            "SELECT category, SUM(amount) AS total, COUNT(id) FROM expense
             WHERE {IN_RANGE}
             GROUP BY category
             ORDER BY total DESC, category ASC
             LIMIT :limit"
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":start": start,
                ":end": end,
                ":limit": limit,
            },
            |row| {
                Ok(CategoryTotals {
                    category: row.get(0)?,
                    total: row.get(1)?,
                    count: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Group the user's expenses in `range` by month of the year, in month order.
///
/// Only months with at least one expense are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn month_totals(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<MonthTotals>, Error> {
    connection
        .prepare(&format!(
            "SELECT {MONTH_OF_DATE} AS month, SUM(amount), COUNT(id) FROM expense
             WHERE {IN_RANGE}
             GROUP BY month
             ORDER BY month"
        ))?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":start": range.start,
                ":end": range.end,
            },
            |row| {
                Ok(MonthTotals {
                    month: row.get(0)?,
                    total: row.get(1)?,
                    count: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get the user's `limit` most recent savings.
///
/// Savings on the same date are ordered by ID, so the most recently recorded comes first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn recent_savings(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<SavingSnapshot>, Error> {
    connection
        .prepare(
            "SELECT amount, description, date FROM saving
             WHERE user_id = :user_id
             ORDER BY date DESC, id DESC
             LIMIT :limit",
        )?
        .query_map(
            named_params! {":user_id": user_id.as_i64(), ":limit": limit},
            |row| {
                Ok(SavingSnapshot {
                    amount: row.get(0)?,
                    description: row.get(1)?,
                    date: row.get(2)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}
