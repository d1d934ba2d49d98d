//! Endpoint for fetching a single transaction.

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
    extract::PathParam,
    response::Envelope,
    transaction::{Transaction, TransactionId, db::get_transaction},
};

/// The state needed for fetching a transaction.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A response body holding one transaction.
#[derive(Debug, Serialize)]
pub struct TransactionData {
    pub data: Transaction,
}

/// Fetch one of the logged in user's transactions by its ID.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    Extension(identity): Extension<Identity>,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<Envelope<TransactionData>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = get_transaction(identity.user_id, transaction_id, &connection)?;

    Ok(Envelope::ok(
        "Transaction fetched successfully",
        TransactionData { data: transaction },
    ))
}
