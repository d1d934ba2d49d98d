//! Endpoint for partially updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::Identity,
    extract::{JsonBody, PathParam},
    response::Envelope,
    transaction::{
        TransactionId, TransactionPatch,
        db::{get_transaction, update_transaction},
        get::TransactionData,
    },
};

/// The state needed for updating a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating the fields of a transaction set in the request body.
///
/// See [TransactionPatch] for which values leave a field unchanged. The update time is
/// always refreshed.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(identity): Extension<Identity>,
    PathParam(transaction_id): PathParam<TransactionId>,
    JsonBody(patch): JsonBody<TransactionPatch>,
) -> Result<Envelope<TransactionData>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let mut transaction = get_transaction(identity.user_id, transaction_id, &connection)?;
    patch.apply(&mut transaction)?;
    transaction.updated_at = OffsetDateTime::now_utc();
    update_transaction(&transaction, &connection)?;

    Ok(Envelope::ok(
        "Transaction successfully updated",
        TransactionData { data: transaction },
    ))
}
