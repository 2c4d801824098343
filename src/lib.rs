//! Pocket Ledger is a REST API for keeping track of personal finances.
//!
//! Users register and log in, record their expenses and savings, and ask for
//! aggregate reports: monthly and yearly spending, spending by category, and
//! how much they saved compared to how much they spent.
//!
//! All responses are JSON. Every route except registering and logging in
//! requires the auth cookie set by those two routes.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod analytics;
mod app_state;
mod auth;
mod database_id;
mod db;
pub mod endpoints;
mod error;
mod expense;
mod logging;
mod money;
mod pagination;
mod routing;
mod saving;
mod timezone;
mod validation;

#[cfg(test)]
mod test_utils;

pub use analytics::{
    CategoriesSummary, MonthlyAnalysis, SavingsVsExpenses, TotalMonthlyExpenses, TotalSavings,
    TotalYearlyExpenses, YearMonth, YearlyAnalysis,
};
pub use app_state::AppState;
pub use auth::{NewUser, PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{Expense, NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use saving::{NewSaving, Saving, create_saving};
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
