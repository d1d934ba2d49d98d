//! Endpoint for listing the user's categories.

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
    category::{Category, db::get_all_categories},
    response::Envelope,
};

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A response body holding the user's categories.
#[derive(Debug, Serialize)]
pub struct CategoryList {
    data: Vec<Category>,
}

/// List the logged in user's categories in alphabetical order.
pub async fn get_categories_endpoint(
    State(state): State<ListCategoriesState>,
    Extension(identity): Extension<Identity>,
) -> Result<Envelope<CategoryList>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let categories = get_all_categories(identity.user_id, &connection)?;

    Ok(Envelope::ok(
        "Categories fetched successfully",
        CategoryList { data: categories },
    ))
}
