//! Endpoint for fetching a category and its budget for a period.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    category::{
        CategoryId, create::CategoryWithBudget, db::get_category_with_budget, domain::PeriodQuery,
    },
    extract::{PathParam, QueryParams},
    response::Envelope,
};

/// The state needed for fetching a category.
#[derive(Debug, Clone)]
pub struct GetCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for GetCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Fetch a category with the budget that applies in the period given by the optional
/// `month` and `year` query parameters, which default to the current month.
pub async fn get_category_endpoint(
    State(state): State<GetCategoryState>,
    Extension(identity): Extension<Identity>,
    PathParam(category_id): PathParam<CategoryId>,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> Result<Envelope<CategoryWithBudget>, Error> {
    let period = query.resolve(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let (category, budget) =
        get_category_with_budget(identity.user_id, category_id, period, &connection)?;

    Ok(Envelope::ok(
        "Category & Budget fetched successfully",
        CategoryWithBudget {
            data_category: category,
            data_budget: budget,
        },
    ))
}
