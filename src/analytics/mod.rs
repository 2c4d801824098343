//! Aggregate reports over a user's expenses and savings: monthly and yearly
//! analyses, category summaries and savings against spending.

mod aggregation;
mod handlers;
mod models;
mod period;
mod queries;

pub use aggregation::{
    categories_summary, fill_months, monthly_analysis, percentage_change, savings_rate,
    savings_vs_expenses, total_monthly_expenses, total_savings, total_yearly_expenses,
    yearly_analysis,
};
pub use handlers::{
    AnalyticsState, DateRangeQuery, MonthQuery, YearQuery, get_categories_summary,
    get_monthly_analysis, get_savings_vs_expenses, get_total_monthly_expenses,
    get_total_savings, get_total_yearly_expenses, get_yearly_analysis,
};
pub use models::{
    CategoriesSummary, CategoryAmount, CategoryStats, CategorySummary, CategoryTotal,
    MonthBreakdown, MonthlyAnalysis, Period, RecentSaving, SavingsVsExpenses,
    TotalMonthlyExpenses, TotalSavings, TotalYearlyExpenses, YearlyAnalysis,
};
pub use period::{DateRange, MIN_YEAR, YearMonth, month_name};
pub use queries::{
    CategoryTotals, MonthTotals, SavingSnapshot, Totals, category_totals, expense_totals,
    month_totals, recent_savings, saving_totals,
};
