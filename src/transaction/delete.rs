//! Transaction deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    extract::PathParam,
    response::{Envelope, NoContent},
    transaction::{TransactionId, db::delete_transaction},
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction deletion requests.
///
/// Deleting a transaction that does not exist succeeds, while a database failure is reported
/// as an internal error.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(identity): Extension<Identity>,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<Envelope<NoContent>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_transaction(identity.user_id, transaction_id, &connection)?;

    Ok(Envelope::ok("Transaction deletion successful", NoContent {}))
}
