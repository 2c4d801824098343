//! The JSON bodies returned by the analytics endpoints.
//!
//! Money is serialized as a number with at most two decimal places and dates
//! as "YYYY-MM-DD". Percentages are plain numbers, e.g. `76.92`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::money::Money;

/// Spending in one category of a single month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub total: Money,
    pub count: u32,
    pub average: Money,
}

/// Spending in a month compared to the month before.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAnalysis {
    /// The month analysed as "YYYY-MM".
    pub month: String,
    pub total_expenses: Money,
    pub previous_month_total: Money,
    /// The change from the previous month's total, as a percentage.
    ///
    /// Zero when the previous month had no spending.
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage_change: Decimal,
    /// Keyed by the exact category name.
    pub category_breakdown: BTreeMap<String, CategoryStats>,
    pub expense_count: u32,
}

/// Spending in one month of a year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBreakdown {
    /// The month number, 1 for January through 12 for December.
    pub month: u8,
    pub month_name: String,
    pub total: Money,
    pub count: u32,
}

/// Spending in one category over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
    pub count: u32,
}

/// Spending across a year, by month and by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyAnalysis {
    pub year: i32,
    pub total_expenses: Money,
    /// Always twelve entries, January first, including months without spending.
    pub monthly_breakdown: Vec<MonthBreakdown>,
    /// Largest total first.
    pub category_breakdown: Vec<CategoryTotal>,
}

/// All-time spending in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Money,
    pub count: u32,
    pub average: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoriesSummary {
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Period {
    pub start_date: Date,
    pub end_date: Date,
}

/// How much was saved compared to how much was spent over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsVsExpenses {
    pub period: Period,
    pub total_savings: Money,
    pub total_expenses: Money,
    /// Savings minus expenses, negative when more was spent than saved.
    pub net_amount: Money,
    /// Savings as a percentage of savings plus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub savings_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSaving {
    pub amount: Money,
    pub description: String,
    pub date: Date,
}

/// All-time savings with the most recent entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalSavings {
    pub total_savings: Money,
    pub savings_count: u32,
    pub average_saving: Money,
    /// Newest first, at most five.
    pub recent_savings: Vec<RecentSaving>,
}

/// A category and its total, without the number of expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalMonthlyExpenses {
    pub month: String,
    pub total_expenses: Money,
    pub expenses_count: u32,
    pub average_expense: Money,
    /// The five largest categories.
    pub top_categories: Vec<CategoryAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalYearlyExpenses {
    pub year: i32,
    pub total_expenses: Money,
    pub expenses_count: u32,
    pub average_expense: Money,
    /// The year's total divided by twelve, whether or not every month had spending.
    pub average_monthly_expense: Money,
    /// Keyed by month number, only for months with spending.
    pub monthly_totals: BTreeMap<u8, Money>,
    /// The ten largest categories.
    pub top_categories: Vec<CategoryTotal>,
}
