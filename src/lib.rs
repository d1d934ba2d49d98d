//! Moniplan is a personal-finance budgeting service.
//!
//! Users register and log in to receive a signed session token. With that token they
//! can set monthly budgets for spending categories and record income and expense
//! transactions against those categories.
//!
//! This library provides a JSON REST API served with axum over an embedded SQLite store.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod amount;
mod app_state;
mod auth;
mod category;
mod config;
mod database_id;
mod datetime_format;
mod db;
mod endpoints;
mod error;
mod extract;
mod logging;
mod not_found;
mod response;
mod routing;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use auth::{
    Claims, Identity, PasswordHash, SessionKeys, TokenError, User, UserID, ValidatedPassword,
    issue_token, verify_token,
};
pub use category::{
    Budget, Category, CategoryName, Period, PeriodQuery, get_budget_for_period,
    get_category_with_budget, set_budget,
};
pub use config::Config;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::{REQUEST_TIMEOUT, build_router};
pub use transaction::{Transaction, TransactionPatch, TransactionWithCategory};

/// How long the server waits for in-flight requests to finish after a shutdown signal.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    tracing::info!(
        "Shutting down, waiting up to {} seconds for in-flight requests",
        SHUTDOWN_GRACE_PERIOD.as_secs()
    );
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
}
