//! Endpoint for listing a month's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::Identity,
    category::PeriodQuery,
    extract::QueryParams,
    response::Envelope,
    transaction::{TransactionWithCategory, db::get_transactions_for_period},
};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A response body holding a month of transactions.
#[derive(Debug, Serialize)]
pub struct TransactionList {
    data: Vec<TransactionWithCategory>,
}

/// List the user's transactions dated in the month given by the optional `month` and
/// `year` query parameters, which default to the current month.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(identity): Extension<Identity>,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> Result<Envelope<TransactionList>, Error> {
    let period = query.resolve(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transactions = get_transactions_for_period(identity.user_id, period, &connection)?;

    Ok(Envelope::ok(
        "Transactions fetched successfully",
        TransactionList { data: transactions },
    ))
}
