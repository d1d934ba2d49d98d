//! Endpoint for recording a new transaction.

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
    extract::JsonBody,
    response::Envelope,
    timezone::local_now,
    transaction::{TransactionForm, db::create_transaction, get::TransactionData},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used for the default transaction date.
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction owned by the logged in user.
///
/// A missing or unparseable `transaction_date` defaults to the current local time.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(identity): Extension<Identity>,
    JsonBody(form): JsonBody<TransactionForm>,
) -> Result<Envelope<TransactionData>, Error> {
    let new_transaction = form.validate(local_now(&state.local_timezone)?)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(
        identity.user_id,
        &new_transaction,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok(Envelope::created(
        "Transaction creation successful",
        TransactionData { data: transaction },
    ))
}
