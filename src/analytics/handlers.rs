//! Route handlers for the analytics reports.
//!
//! Each handler validates its query string, locks the database and hands off
//! to the matching function in [crate::analytics::aggregation].

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    analytics::{
        aggregation,
        models::{
            CategoriesSummary, MonthlyAnalysis, SavingsVsExpenses, TotalMonthlyExpenses,
            TotalSavings, TotalYearlyExpenses, YearlyAnalysis,
        },
        period::{DateRange, YearMonth, require_month, require_year},
    },
    app_state::lock_connection,
    auth::UserID,
    timezone::local_today,
    validation::{ValidationErrors, require_date},
};

/// The state needed by the analytics endpoints.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// Used to find the current year, which bounds the `year` parameter.
    pub local_timezone: String,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string `?month=YYYY-MM`.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    fn validate(&self) -> Result<YearMonth, Error> {
        let mut errors = ValidationErrors::default();
        let month = require_month(&mut errors, "month", self.month.as_deref());
        errors.into_result()?;

        month.ok_or_else(|| ValidationErrors::default().into())
    }
}

/// The query string `?year=YYYY`.
#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

impl YearQuery {
    /// Years from 2000 up to and including next year are accepted.
    fn validate(&self, local_timezone: &str) -> Result<i32, Error> {
        let max_year = local_today(local_timezone)?.year() + 1;

        let mut errors = ValidationErrors::default();
        let year = require_year(&mut errors, "year", self.year.as_deref(), max_year);
        errors.into_result()?;

        year.ok_or_else(|| ValidationErrors::default().into())
    }
}

/// The query string `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    fn validate(&self) -> Result<DateRange, Error> {
        let mut errors = ValidationErrors::default();

        let start = require_date(&mut errors, "start_date", self.start_date.as_deref());
        let end = require_date(&mut errors, "end_date", self.end_date.as_deref());

        if matches!((start, end), (Some(start), Some(end)) if end < start) {
            errors.add(
                "end_date",
                "The end date field must be a date after or equal to start date.",
            );
        }

        errors.into_result()?;

        match (start, end) {
            (Some(start), Some(end)) => Ok(DateRange { start, end }),
            _ => Err(ValidationErrors::default().into()),
        }
    }
}

/// Spending in a month by category, compared to the month before.
pub async fn get_monthly_analysis(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<MonthlyAnalysis>, Error> {
    let Query(query) = query?;
    let month = query.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    aggregation::monthly_analysis(user_id, month, &connection).map(Json)
}

/// Spending in a year by month and by category.
pub async fn get_yearly_analysis(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<YearQuery>, QueryRejection>,
) -> Result<Json<YearlyAnalysis>, Error> {
    let Query(query) = query?;
    let year = query.validate(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;

    aggregation::yearly_analysis(user_id, year, &connection).map(Json)
}

/// All-time spending by category.
pub async fn get_categories_summary(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<CategoriesSummary>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    aggregation::categories_summary(user_id, &connection).map(Json)
}

pub async fn get_savings_vs_expenses(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<SavingsVsExpenses>, Error> {
    let Query(query) = query?;
    let range = query.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    aggregation::savings_vs_expenses(user_id, range, &connection).map(Json)
}

pub async fn get_total_savings(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<TotalSavings>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    aggregation::total_savings(user_id, &connection).map(Json)
}

pub async fn get_total_monthly_expenses(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<TotalMonthlyExpenses>, Error> {
    let Query(query) = query?;
    let month = query.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    aggregation::total_monthly_expenses(user_id, month, &connection).map(Json)
}

pub async fn get_total_yearly_expenses(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<YearQuery>, QueryRejection>,
) -> Result<Json<TotalYearlyExpenses>, Error> {
    let Query(query) = query?;
    let year = query.validate(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;

    aggregation::total_yearly_expenses(user_id, year, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        AppState,
        app_state::lock_connection,
        auth::UserID,
        endpoints,
        test_utils::{get_test_server, get_test_state, insert_expense, insert_saving, insert_test_user, log_in},
    };

    fn insert_january_expenses(state: &AppState, user_id: UserID) {
        let connection = lock_connection(&state.db_connection).unwrap();
        insert_expense(&connection, user_id, dec!(60), "Food", date!(2024 - 01 - 05));
        insert_expense(&connection, user_id, dec!(40), "Food", date!(2024 - 01 - 20));
        insert_expense(&connection, user_id, dec!(50), "Transport", date!(2024 - 01 - 31));
    }

    #[tokio::test]
    async fn monthly_analysis_groups_by_category() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        insert_january_expenses(&state, user.id);
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            insert_expense(&connection, user.id, dec!(100), "Food", date!(2023 - 12 - 10));
        }
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_MONTHLY)
            .add_query_param("month", "2024-01")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "month": "2024-01",
            "total_expenses": 150.0,
            "previous_month_total": 100.0,
            "percentage_change": 50.0,
            "category_breakdown": {
                "Food": {"total": 100.0, "count": 2, "average": 50.0},
                "Transport": {"total": 50.0, "count": 1, "average": 50.0},
            },
            "expense_count": 3,
        }));
    }

    #[tokio::test]
    async fn monthly_analysis_of_empty_month_is_zero() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com");
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_MONTHLY)
            .add_query_param("month", "2024-06")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "month": "2024-06",
            "total_expenses": 0.0,
            "previous_month_total": 0.0,
            "percentage_change": 0.0,
            "category_breakdown": {},
            "expense_count": 0,
        }));
    }

    #[tokio::test]
    async fn monthly_analysis_rejects_bad_month() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com");
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_MONTHLY)
            .add_query_param("month", "2024-1")
            .add_cookie(cookie.clone())
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        response.assert_json(&json!({
            "message": "The month field must match the format Y-m.",
            "errors": {"month": ["The month field must match the format Y-m."]},
        }));

        let response = server
            .get(endpoints::ANALYTICS_MONTHLY)
            .add_cookie(cookie)
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["errors"]["month"][0], "The month field is required.");
    }

    #[tokio::test]
    async fn yearly_analysis_has_twelve_months() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        insert_january_expenses(&state, user.id);
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            insert_expense(&connection, user.id, dec!(25.5), "Rent", date!(2024 - 07 - 01));
        }
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_YEARLY)
            .add_query_param("year", "2024")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["year"], 2024);
        assert_eq!(body["total_expenses"], json!(175.5));

        let months = body["monthly_breakdown"].as_array().unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(
            months[0],
            json!({"month": 1, "month_name": "January", "total": 150.0, "count": 3})
        );
        assert_eq!(
            months[1],
            json!({"month": 2, "month_name": "February", "total": 0.0, "count": 0})
        );
        let sum: f64 = months.iter().map(|month| month["total"].as_f64().unwrap()).sum();
        assert_eq!(sum, 175.5);

        assert_eq!(
            body["category_breakdown"],
            json!([
                {"category": "Food", "total": 100.0, "count": 2},
                {"category": "Transport", "total": 50.0, "count": 1},
                {"category": "Rent", "total": 25.5, "count": 1},
            ])
        );
    }

    #[tokio::test]
    async fn yearly_analysis_rejects_out_of_range_year() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com");
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        for year in ["1999", "3000", "soon"] {
            server
                .get(endpoints::ANALYTICS_YEARLY)
                .add_query_param("year", year)
                .add_cookie(cookie.clone())
                .await
                .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn categories_summary_is_ordered_by_total() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        insert_january_expenses(&state, user.id);
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_CATEGORIES)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "categories": [
                {"category": "Food", "total": 100.0, "count": 2, "average": 50.0},
                {"category": "Transport", "total": 50.0, "count": 1, "average": 50.0},
            ]
        }));
    }

    #[tokio::test]
    async fn savings_vs_expenses_reports_net_and_rate() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            insert_saving(&connection, user.id, dec!(1000), date!(2024 - 01 - 01));
            insert_expense(&connection, user.id, dec!(300), "Rent", date!(2024 - 01 - 31));
            insert_expense(&connection, user.id, dec!(500), "Rent", date!(2024 - 02 - 01));
        }
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_SAVINGS_VS_EXPENSES)
            .add_query_param("start_date", "2024-01-01")
            .add_query_param("end_date", "2024-01-31")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "period": {"start_date": "2024-01-01", "end_date": "2024-01-31"},
            "total_savings": 1000.0,
            "total_expenses": 300.0,
            "net_amount": 700.0,
            "savings_rate": 76.92,
        }));
    }

    #[tokio::test]
    async fn savings_vs_expenses_rejects_reversed_range() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com");
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_SAVINGS_VS_EXPENSES)
            .add_query_param("start_date", "2024-02-01")
            .add_query_param("end_date", "2024-01-01")
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(
            body["errors"]["end_date"][0],
            "The end date field must be a date after or equal to start date."
        );
    }

    #[tokio::test]
    async fn total_savings_lists_five_most_recent() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            for day in 1..=6 {
                let date = time::Date::from_calendar_date(2024, time::Month::March, day).unwrap();
                insert_saving(&connection, user.id, dec!(10), date);
            }
        }
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_TOTAL_SAVINGS)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total_savings"], json!(60.0));
        assert_eq!(body["savings_count"], 6);
        assert_eq!(body["average_saving"], json!(10.0));
        let recent = body["recent_savings"].as_array().unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0]["date"], "2024-03-06");
        assert_eq!(recent[4]["date"], "2024-03-02");
    }

    #[tokio::test]
    async fn total_monthly_expenses_lists_top_categories() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        insert_january_expenses(&state, user.id);
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_TOTAL_MONTHLY_EXPENSES)
            .add_query_param("month", "2024-01")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "month": "2024-01",
            "total_expenses": 150.0,
            "expenses_count": 3,
            "average_expense": 50.0,
            "top_categories": [
                {"category": "Food", "total": 100.0},
                {"category": "Transport", "total": 50.0},
            ],
        }));
    }

    #[tokio::test]
    async fn total_yearly_expenses_divides_by_twelve() {
        let state = get_test_state();
        let user = insert_test_user(&state, "jane@example.com");
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            insert_expense(&connection, user.id, dec!(100), "Food", date!(2024 - 02 - 01));
        }
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;

        let response = server
            .get(endpoints::ANALYTICS_TOTAL_YEARLY_EXPENSES)
            .add_query_param("year", "2024")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "year": 2024,
            "total_expenses": 100.0,
            "expenses_count": 1,
            "average_expense": 100.0,
            "average_monthly_expense": 8.33,
            "monthly_totals": {"2": 100.0},
            "top_categories": [{"category": "Food", "total": 100.0, "count": 1}],
        }));
    }

    #[tokio::test]
    async fn analytics_only_see_own_records() {
        let state = get_test_state();
        let jane = insert_test_user(&state, "jane@example.com");
        insert_test_user(&state, "john@example.com");
        insert_january_expenses(&state, jane.id);
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            insert_saving(&connection, jane.id, dec!(500), date!(2024 - 01 - 02));
        }
        let server = get_test_server(state);
        let john = log_in(&server, "john@example.com").await;

        let body: Value = server
            .get(endpoints::ANALYTICS_MONTHLY)
            .add_query_param("month", "2024-01")
            .add_cookie(john.clone())
            .await
            .json();
        assert_eq!(body["total_expenses"], json!(0.0));

        let body: Value = server
            .get(endpoints::ANALYTICS_CATEGORIES)
            .add_cookie(john.clone())
            .await
            .json();
        assert_eq!(body, json!({"categories": []}));

        let body: Value = server
            .get(endpoints::ANALYTICS_TOTAL_SAVINGS)
            .add_cookie(john.clone())
            .await
            .json();
        assert_eq!(body["savings_count"], 0);
        assert_eq!(body["recent_savings"], json!([]));

        let body: Value = server
            .get(endpoints::ANALYTICS_SAVINGS_VS_EXPENSES)
            .add_query_param("start_date", "2024-01-01")
            .add_query_param("end_date", "2024-12-31")
            .add_cookie(john)
            .await
            .json();
        assert_eq!(body["total_savings"], json!(0.0));
        assert_eq!(body["savings_rate"], json!(0.0));
    }

    #[tokio::test]
    async fn analytics_require_authentication() {
        let server = get_test_server(get_test_state());

        for path in [
            endpoints::ANALYTICS_MONTHLY,
            endpoints::ANALYTICS_YEARLY,
            endpoints::ANALYTICS_CATEGORIES,
            endpoints::ANALYTICS_SAVINGS_VS_EXPENSES,
            endpoints::ANALYTICS_TOTAL_SAVINGS,
            endpoints::ANALYTICS_TOTAL_MONTHLY_EXPENSES,
            endpoints::ANALYTICS_TOTAL_YEARLY_EXPENSES,
        ] {
            let response = server.get(path).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            response.assert_json(&json!({"message": "Unauthenticated."}));
        }
    }
}
