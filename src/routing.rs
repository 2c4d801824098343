//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    analytics::{
        get_categories_summary, get_monthly_analysis, get_savings_vs_expenses,
        get_total_monthly_expenses, get_total_savings, get_total_yearly_expenses,
        get_yearly_analysis,
    },
    auth::{AuthState, auth_guard, get_current_user, post_log_in, post_log_out, register_user},
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        list_expenses_endpoint, update_expense_endpoint,
    },
    saving::{
        create_saving_endpoint, delete_saving_endpoint, get_saving_endpoint,
        list_savings_endpoint, update_saving_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route except registering and logging in requires a valid auth cookie.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in));

    let protected_routes = Router::new()
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::ME, get(get_current_user))
        .route(endpoints::USER, get(get_current_user))
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .patch(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .route(
            endpoints::SAVINGS,
            get(list_savings_endpoint).post(create_saving_endpoint),
        )
        .route(
            endpoints::SAVING,
            get(get_saving_endpoint)
                .put(update_saving_endpoint)
                .patch(update_saving_endpoint)
                .delete(delete_saving_endpoint),
        )
        .route(endpoints::ANALYTICS_MONTHLY, get(get_monthly_analysis))
        .route(endpoints::ANALYTICS_YEARLY, get(get_yearly_analysis))
        .route(endpoints::ANALYTICS_CATEGORIES, get(get_categories_summary))
        .route(
            endpoints::ANALYTICS_SAVINGS_VS_EXPENSES,
            get(get_savings_vs_expenses),
        )
        .route(endpoints::ANALYTICS_TOTAL_SAVINGS, get(get_total_savings))
        .route(
            endpoints::ANALYTICS_TOTAL_MONTHLY_EXPENSES,
            get(get_total_monthly_expenses),
        )
        .route(
            endpoints::ANALYTICS_TOTAL_YEARLY_EXPENSES,
            get(get_total_yearly_expenses),
        )
        .route_layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The JSON response for routes that do not exist.
async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, get_test_state, insert_test_user, log_in},
    };

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let server = get_test_server(get_test_state());

        let response = server.get("/api/does-not-exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"message": "Not Found"}));
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_cookie() {
        let server = get_test_server(get_test_state());

        for response in [
            server.get(endpoints::ME).await,
            server.get(endpoints::USER).await,
            server.post(endpoints::LOG_OUT).await,
            server.get(endpoints::EXPENSES).await,
            server.get(&format_endpoint(endpoints::EXPENSE, 1)).await,
            server.get(endpoints::SAVINGS).await,
            server.delete(&format_endpoint(endpoints::SAVING, 1)).await,
        ] {
            response.assert_status(StatusCode::UNAUTHORIZED);
            response.assert_json(&json!({"message": "Unauthenticated."}));
        }
    }

    #[tokio::test]
    async fn patch_updates_like_put() {
        let state = get_test_state();
        insert_test_user(&state, "jane@example.com");
        let server = get_test_server(state);
        let cookie = log_in(&server, "jane@example.com").await;
        let created: serde_json::Value = server
            .post(endpoints::EXPENSES)
            .add_cookie(cookie.clone())
            .json(&json!({
                "amount": 12.5,
                "description": "Lunch",
                "category": "Food",
                "date": "2024-01-15",
            }))
            .await
            .json();
        let path = format_endpoint(endpoints::EXPENSE, created["expense"]["id"].as_i64().unwrap());

        let response = server
            .patch(&path)
            .add_cookie(cookie)
            .json(&json!({
                "amount": 20,
                "description": "Dinner",
                "category": "Food",
                "date": "2024-01-15",
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["expense"]["description"], "Dinner");
        assert_eq!(body["expense"]["amount"], json!(20.0));
    }
}
