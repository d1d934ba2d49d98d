//! Application router configuration with protected and unprotected route definitions.

use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderName, Method, header},
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::{
    AppState,
    auth::{auth_guard, get_profile, post_log_in, post_refresh_token, register_user},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, update_category_endpoint,
    },
    endpoints,
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, get_transactions_endpoint,
    },
};

/// How long a request may take before it is aborted with 408 Request Timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in));

    let protected_routes = Router::new()
        .route(endpoints::PROFILE, get(get_profile))
        .route(endpoints::REFRESH_TOKEN, post(post_refresh_token))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::CREATE_CATEGORY, post(create_category_endpoint))
        .route(endpoints::CATEGORY, get(get_category_endpoint))
        .route(endpoints::UPDATE_CATEGORY, post(update_category_endpoint))
        .route(endpoints::DELETE_CATEGORY, get(delete_category_endpoint))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(
            endpoints::CREATE_TRANSACTION,
            post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint))
        .route(
            endpoints::UPDATE_TRANSACTION,
            post(edit_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            get(delete_transaction_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer())
}

/// Allow cross origin requests from any origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Report that the server is up.
async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "API is running",
    }))
}
