//! Builds the analytics reports from the grouped queries.
//!
//! The arithmetic that does not touch the database (percentage change,
//! savings rate and filling in months without spending) lives in small free
//! functions so it can be tested directly.

use std::collections::BTreeMap;

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Month;

use crate::{
    Error,
    analytics::{
        models::{
            CategoriesSummary, CategoryAmount, CategoryStats, CategorySummary, CategoryTotal,
            MonthBreakdown, MonthlyAnalysis, Period, RecentSaving, SavingsVsExpenses,
            TotalMonthlyExpenses, TotalSavings, TotalYearlyExpenses, YearlyAnalysis,
        },
        period::{DateRange, YearMonth, month_name},
        queries::{
            MonthTotals, category_totals, expense_totals, month_totals, recent_savings,
            saving_totals,
        },
    },
    auth::UserID,
    money::{Money, round_2dp},
};

/// How many recent savings the savings summary lists.
const RECENT_SAVINGS_LIMIT: u32 = 5;
/// How many categories the monthly totals list.
const MONTHLY_TOP_CATEGORIES: u32 = 5;
/// How many categories the yearly totals list.
const YEARLY_TOP_CATEGORIES: u32 = 10;
const MONTHS_PER_YEAR: u32 = 12;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The change from `previous` to `current` as a percentage, rounded to two decimal places.
///
/// Returns zero when `previous` is zero, since there is nothing to compare against.
pub fn percentage_change(current: Money, previous: Money) -> Decimal {
    let previous = previous.as_decimal();

    if previous <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    round_2dp((current.as_decimal() - previous) / previous * HUNDRED)
}

/// Savings as a percentage of savings plus expenses, rounded to two decimal places.
///
/// Returns zero when nothing was saved.
pub fn savings_rate(total_savings: Money, total_expenses: Money) -> Decimal {
    let savings = total_savings.as_decimal();

    if savings <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    round_2dp(savings / (savings + total_expenses.as_decimal()) * HUNDRED)
}

/// Expand the months that had spending into all twelve months of the year,
/// using zero for the months without any.
pub fn fill_months(month_totals: &[MonthTotals]) -> Vec<MonthBreakdown> {
    let mut by_month: BTreeMap<u8, MonthTotals> = month_totals
        .iter()
        .map(|totals| (totals.month, *totals))
        .collect();

    let mut month = Month::January;
    let mut breakdown = Vec::with_capacity(MONTHS_PER_YEAR as usize);

    for _ in 0..MONTHS_PER_YEAR {
        let number = u8::from(month);
        let totals = by_month.remove(&number);

        breakdown.push(MonthBreakdown {
            month: number,
            month_name: month_name(month),
            total: totals.map_or(Money::ZERO, |totals| totals.total),
            count: totals.map_or(0, |totals| totals.count),
        });

        month = month.next();
    }

    breakdown
}

/// Analyse the user's spending in `month`, by category and against the month before.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn monthly_analysis(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<MonthlyAnalysis, Error> {
    let range = month.date_range();
    let totals = expense_totals(user_id, Some(range), connection)?;

    let previous_month_total = match month.previous() {
        Some(previous) => expense_totals(user_id, Some(previous.date_range()), connection)?.total,
        None => Money::ZERO,
    };

    let category_breakdown = category_totals(user_id, Some(range), None, connection)?
        .into_iter()
        .map(|category| {
            let stats = CategoryStats {
                total: category.total,
                count: category.count,
                average: category.total.average(category.count),
            };
            (category.category, stats)
        })
        .collect();

    Ok(MonthlyAnalysis {
        month: month.to_string(),
        total_expenses: totals.total,
        previous_month_total,
        percentage_change: percentage_change(totals.total, previous_month_total),
        category_breakdown,
        expense_count: totals.count,
    })
}

/// Analyse the user's spending in `year`, by month and by category.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, or
/// [Error::NotFound] if `year` cannot be represented as a calendar year.
pub fn yearly_analysis(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<YearlyAnalysis, Error> {
    let range = DateRange::year(year).ok_or(Error::NotFound)?;
    let monthly_breakdown = fill_months(&month_totals(user_id, range, connection)?);
    let total_expenses = expense_totals(user_id, Some(range), connection)?.total;

    let category_breakdown = category_totals(user_id, Some(range), None, connection)?
        .into_iter()
        .map(|category| CategoryTotal {
            category: category.category,
            total: category.total,
            count: category.count,
        })
        .collect();

    Ok(YearlyAnalysis {
        year,
        total_expenses,
        monthly_breakdown,
        category_breakdown,
    })
}

/// Summarise all of the user's spending by category, largest total first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn categories_summary(
    user_id: UserID,
    connection: &Connection,
) -> Result<CategoriesSummary, Error> {
    let categories = category_totals(user_id, None, None, connection)?
        .into_iter()
        .map(|category| CategorySummary {
            average: category.total.average(category.count),
            category: category.category,
            total: category.total,
            count: category.count,
        })
        .collect();

    Ok(CategoriesSummary { categories })
}

/// Compare the user's savings and spending between two dates, inclusive.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn savings_vs_expenses(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<SavingsVsExpenses, Error> {
    let total_savings = saving_totals(user_id, Some(range), connection)?.total;
    let total_expenses = expense_totals(user_id, Some(range), connection)?.total;

    Ok(SavingsVsExpenses {
        period: Period {
            start_date: range.start,
            end_date: range.end,
        },
        total_savings,
        total_expenses,
        net_amount: total_savings - total_expenses,
        savings_rate: savings_rate(total_savings, total_expenses),
    })
}

/// Summarise all of the user's savings.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn total_savings(user_id: UserID, connection: &Connection) -> Result<TotalSavings, Error> {
    let totals = saving_totals(user_id, None, connection)?;

    let recent_savings = recent_savings(user_id, RECENT_SAVINGS_LIMIT, connection)?
        .into_iter()
        .map(|saving| RecentSaving {
            amount: saving.amount,
            description: saving.description,
            date: saving.date,
        })
        .collect();

    Ok(TotalSavings {
        total_savings: totals.total,
        savings_count: totals.count,
        average_saving: totals.total.average(totals.count),
        recent_savings,
    })
}

/// Total the user's spending in `month` and list the largest categories.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn total_monthly_expenses(
    user_id: UserID,
    month: YearMonth,
    connection: &Connection,
) -> Result<TotalMonthlyExpenses, Error> {
    let range = month.date_range();
    let totals = expense_totals(user_id, Some(range), connection)?;

    let top_categories =
        category_totals(user_id, Some(range), Some(MONTHLY_TOP_CATEGORIES), connection)?
            .into_iter()
            .map(|category| CategoryAmount {
                category: category.category,
                total: category.total,
            })
            .collect();

    Ok(TotalMonthlyExpenses {
        month: month.to_string(),
        total_expenses: totals.total,
        expenses_count: totals.count,
        average_expense: totals.total.average(totals.count),
        top_categories,
    })
}

/// Total the user's spending in `year`, by month, with the largest categories.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, or
/// [Error::NotFound] if `year` cannot be represented as a calendar year.
pub fn total_yearly_expenses(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<TotalYearlyExpenses, Error> {
    let range = DateRange::year(year).ok_or(Error::NotFound)?;
    let totals = expense_totals(user_id, Some(range), connection)?;

    let monthly_totals = month_totals(user_id, range, connection)?
        .into_iter()
        .map(|month| (month.month, month.total))
        .collect();

    let top_categories =
        category_totals(user_id, Some(range), Some(YEARLY_TOP_CATEGORIES), connection)?
            .into_iter()
            .map(|category| CategoryTotal {
                category: category.category,
                total: category.total,
                count: category.count,
            })
            .collect();

    Ok(TotalYearlyExpenses {
        year,
        total_expenses: totals.total,
        expenses_count: totals.count,
        average_expense: totals.total.average(totals.count),
        average_monthly_expense: totals.total.average(MONTHS_PER_YEAR),
        monthly_totals,
        top_categories,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, Month, macros::date};

    use crate::{
        analytics::{
            aggregation::{
                fill_months, monthly_analysis, percentage_change, savings_rate,
                total_monthly_expenses, total_yearly_expenses,
            },
            period::YearMonth,
            queries::MonthTotals,
        },
        auth::UserID,
        db::initialize,
        money::Money,
        test_utils::{insert_expense, insert_user_with_connection},
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = insert_user_with_connection(&conn, "jane@example.com");
        (conn, user.id)
    }

    /// Insert one expense into each of `count` categories, "Category 01" being
    /// the largest.
    fn insert_ranked_categories(conn: &Connection, user_id: UserID, count: i64, date: Date) {
        for rank in 1..=count {
            insert_expense(
                conn,
                user_id,
                Decimal::from(100 - rank),
                &format!("Category {rank:02}"),
                date,
            );
        }
    }

    #[test]
    fn percentage_change_is_zero_without_previous_spending() {
        assert_eq!(
            percentage_change(Money::new(dec!(150)), Money::ZERO),
            dec!(0)
        );
    }

    #[test]
    fn percentage_change_is_rounded() {
        assert_eq!(
            percentage_change(Money::new(dec!(150)), Money::new(dec!(100))),
            dec!(50)
        );
        assert_eq!(
            percentage_change(Money::new(dec!(50)), Money::new(dec!(150))),
            dec!(-66.67)
        );
        assert_eq!(
            percentage_change(Money::ZERO, Money::new(dec!(80))),
            dec!(-100)
        );
    }

    #[test]
    fn savings_rate_is_share_of_money_moved() {
        assert_eq!(
            savings_rate(Money::new(dec!(1000)), Money::new(dec!(300))),
            dec!(76.92)
        );
        assert_eq!(
            savings_rate(Money::new(dec!(100)), Money::ZERO),
            dec!(100)
        );
    }

    #[test]
    fn savings_rate_is_zero_without_savings() {
        assert_eq!(savings_rate(Money::ZERO, Money::new(dec!(300))), dec!(0));
        assert_eq!(savings_rate(Money::ZERO, Money::ZERO), dec!(0));
    }

    #[test]
    fn fill_months_always_returns_twelve_ordered_months() {
        let got = fill_months(&[
            MonthTotals {
                month: 2,
                total: Money::new(dec!(20)),
                count: 2,
            },
            MonthTotals {
                month: 12,
                total: Money::new(dec!(5)),
                count: 1,
            },
        ]);

        assert_eq!(got.len(), 12);
        let months: Vec<_> = got.iter().map(|entry| entry.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<u8>>());
        assert_eq!(got[0].month_name, "January");
        assert_eq!(got[0].total, Money::ZERO);
        assert_eq!(got[0].count, 0);
        assert_eq!(got[1].total, Money::new(dec!(20)));
        assert_eq!(got[1].count, 2);
        assert_eq!(got[11].month_name, "December");
        assert_eq!(got[11].total, Money::new(dec!(5)));
        assert_eq!(
            got.iter().map(|entry| entry.total).sum::<Money>(),
            Money::new(dec!(25))
        );
    }

    #[test]
    fn fill_months_of_empty_year_is_all_zero() {
        let got = fill_months(&[]);

        assert_eq!(got.len(), 12);
        assert!(got.iter().all(|entry| entry.total == Money::ZERO && entry.count == 0));
    }

    #[test]
    fn january_is_compared_with_previous_december() {
        let (conn, user_id) = get_test_connection();
        insert_expense(&conn, user_id, dec!(200), "Food", date!(2023 - 12 - 31));
        insert_expense(&conn, user_id, dec!(50), "Food", date!(2024 - 01 - 01));
        insert_expense(&conn, user_id, dec!(999), "Food", date!(2023 - 01 - 15));

        let got = monthly_analysis(
            user_id,
            YearMonth::new(2024, Month::January).unwrap(),
            &conn,
        )
        .unwrap();

        assert_eq!(got.month, "2024-01");
        assert_eq!(got.total_expenses, Money::new(dec!(50)));
        assert_eq!(got.previous_month_total, Money::new(dec!(200)));
        assert_eq!(got.percentage_change, dec!(-75));
    }

    #[test]
    fn monthly_totals_list_only_top_five_categories() {
        let (conn, user_id) = get_test_connection();
        insert_ranked_categories(&conn, user_id, 7, date!(2024 - 03 - 10));

        let got = total_monthly_expenses(
            user_id,
            YearMonth::new(2024, Month::March).unwrap(),
            &conn,
        )
        .unwrap();

        assert_eq!(got.expenses_count, 7);
        let categories: Vec<_> = got
            .top_categories
            .iter()
            .map(|category| category.category.as_str())
            .collect();
        assert_eq!(
            categories,
            [
                "Category 01",
                "Category 02",
                "Category 03",
                "Category 04",
                "Category 05"
            ]
        );
    }

    #[test]
    fn yearly_totals_list_only_top_ten_categories() {
        let (conn, user_id) = get_test_connection();
        insert_ranked_categories(&conn, user_id, 12, date!(2024 - 06 - 01));

        let got = total_yearly_expenses(user_id, 2024, &conn).unwrap();

        assert_eq!(got.expenses_count, 12);
        assert_eq!(got.top_categories.len(), 10);
        assert_eq!(got.top_categories[0].category, "Category 01");
        assert_eq!(got.top_categories[9].category, "Category 10");
        assert_eq!(got.top_categories[9].total, Money::new(dec!(90)));
    }
}
