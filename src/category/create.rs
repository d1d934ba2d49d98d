//! Endpoints for setting a category's budget, by name or by category ID.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    amount::check_amount,
    auth::Identity,
    category::{
        Budget, Category, CategoryId, CategoryName,
        db::{get_category, insert_budget, rename_category, set_budget},
        domain::{BudgetForm, Period},
    },
    extract::{JsonBody, PathParam},
    response::Envelope,
};

/// The state needed for setting a budget.
#[derive(Debug, Clone)]
pub struct SetBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category with the budget that applies to the requested period.
#[derive(Debug, Serialize)]
pub struct CategoryWithBudget {
    pub data_category: Category,
    pub data_budget: Budget,
}

/// Handle a request to set the budget of the category named in the body.
///
/// The category is created if the user does not have one with that name yet.
pub async fn create_category_endpoint(
    State(state): State<SetBudgetState>,
    Extension(identity): Extension<Identity>,
    JsonBody(form): JsonBody<BudgetForm>,
) -> Result<Envelope<CategoryWithBudget>, Error> {
    let name = CategoryName::new(&form.name)?;
    let period = Period::new(form.month, form.year)?;
    let amount = check_amount(form.amount)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let (category, budget) =
        set_budget(identity.user_id, &name, period, amount, &connection)?;

    Ok(Envelope::created(
        "Category & Budget creation successful",
        CategoryWithBudget {
            data_category: category,
            data_budget: budget,
        },
    ))
}

/// Handle a request to update the category with the ID in the path.
///
/// If the name in the body differs from the stored name the category is renamed.
/// A new budget row is appended for the period in the body.
pub async fn update_category_endpoint(
    State(state): State<SetBudgetState>,
    Extension(identity): Extension<Identity>,
    PathParam(category_id): PathParam<CategoryId>,
    JsonBody(form): JsonBody<BudgetForm>,
) -> Result<Envelope<CategoryWithBudget>, Error> {
    let name = CategoryName::new(&form.name)?;
    let period = Period::new(form.month, form.year)?;
    let amount = check_amount(form.amount)?;
    let now = OffsetDateTime::now_utc();

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = connection.unchecked_transaction()?;

    get_category(identity.user_id, category_id, &transaction)?;
    rename_category(identity.user_id, category_id, &name, now, &transaction)?;
    let budget = insert_budget(
        identity.user_id,
        category_id,
        period,
        amount,
        now,
        &transaction,
    )?;
    let category = get_category(identity.user_id, category_id, &transaction)?;

    transaction.commit()?;

    Ok(Envelope::ok(
        "Category & Budget successfully updated",
        CategoryWithBudget {
            data_category: category,
            data_budget: budget,
        },
    ))
}
