//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    category::{CategoryId, db::delete_category},
    extract::PathParam,
    response::{Envelope, NoContent},
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category deletion requests.
///
/// Deleting a category that does not exist succeeds. Its budgets and transactions are kept.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Extension(identity): Extension<Identity>,
    PathParam(category_id): PathParam<CategoryId>,
) -> Result<Envelope<NoContent>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_category(identity.user_id, category_id, &connection)?;

    Ok(Envelope::ok("Category deletion successful", NoContent {}))
}
