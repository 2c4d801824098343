//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The route for creating a new user account.
pub const REGISTER: &str = "/api/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/login";
/// The route for logging out a user.
pub const LOG_OUT: &str = "/api/logout";
/// The route for getting the logged in user.
pub const ME: &str = "/api/me";
/// Another route for getting the logged in user.
pub const USER: &str = "/api/user";

/// The route for listing and creating expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for reading, updating and deleting a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route for listing and creating savings.
pub const SAVINGS: &str = "/api/savings";
/// The route for reading, updating and deleting a single saving.
pub const SAVING: &str = "/api/savings/{saving_id}";

pub const ANALYTICS_MONTHLY: &str = "/api/analytics/monthly";
pub const ANALYTICS_YEARLY: &str = "/api/analytics/yearly";
pub const ANALYTICS_CATEGORIES: &str = "/api/analytics/categories";
pub const ANALYTICS_SAVINGS_VS_EXPENSES: &str = "/api/analytics/savings-vs-expenses";
pub const ANALYTICS_TOTAL_SAVINGS: &str = "/api/analytics/total-savings";
pub const ANALYTICS_TOTAL_MONTHLY_EXPENSES: &str = "/api/analytics/total-monthly-expenses";
pub const ANALYTICS_TOTAL_YEARLY_EXPENSES: &str = "/api/analytics/total-yearly-expenses";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// Only the first parameter is replaced, and a path without a parameter is
/// returned unchanged.
///
/// ```
/// use pocket_ledger::endpoints::{EXPENSE, format_endpoint};
///
/// assert_eq!(format_endpoint(EXPENSE, 42), "/api/expenses/42");
/// ```
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
