//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/v1/category/{category_id}', use
//! [format_endpoint].

/// The liveness probe.
pub const HEALTH: &str = "/health";
/// The route for registering a new user.
pub const REGISTER: &str = "/api/v1/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/v1/auth/login";
/// The route for reissuing the current user's session token.
pub const REFRESH_TOKEN: &str = "/api/v1/auth/refresh";
/// The route for the current user's profile.
pub const PROFILE: &str = "/api/v1/profile";
/// The route to list categories.
pub const CATEGORIES: &str = "/api/v1/category";
/// The route to create a category or set its budget.
pub const CREATE_CATEGORY: &str = "/api/v1/category/create";
/// The route to fetch a category with its budget.
pub const CATEGORY: &str = "/api/v1/category/{category_id}";
/// The route to update a category and append a budget.
pub const UPDATE_CATEGORY: &str = "/api/v1/category/update/{category_id}";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/api/v1/category/delete/{category_id}";
/// The route to list a month's transactions.
pub const TRANSACTIONS: &str = "/api/v1/transaction";
/// The route to create a transaction.
pub const CREATE_TRANSACTION: &str = "/api/v1/transaction/create";
/// The route to fetch a single transaction.
pub const TRANSACTION: &str = "/api/v1/transaction/{transaction_id}";
/// The route to update a transaction.
pub const UPDATE_TRANSACTION: &str = "/api/v1/transaction/update/{transaction_id}";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/v1/transaction/delete/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/v1/category/{category_id}', '{category_id}' is the
/// parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[track_caller]
    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::REGISTER);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::REFRESH_TOKEN);
        assert_endpoint_is_valid_uri(endpoints::PROFILE);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::CREATE_CATEGORY);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::CATEGORY, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::UPDATE_CATEGORY, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::DELETE_CATEGORY, 1));
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::CREATE_TRANSACTION);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::TRANSACTION, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::UPDATE_TRANSACTION, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::DELETE_TRANSACTION, 1));
    }

    #[test]
    fn format_endpoint_replaces_parameter() {
        assert_eq!(
            format_endpoint(endpoints::UPDATE_TRANSACTION, 42),
            "/api/v1/transaction/update/42"
        );
    }

    #[test]
    fn format_endpoint_without_parameter_is_unchanged() {
        assert_eq!(
            format_endpoint(endpoints::CATEGORIES, 42),
            endpoints::CATEGORIES
        );
    }

    #[test]
    fn format_endpoint_with_unclosed_parameter_replaces_rest() {
        assert_eq!(format_endpoint("/api/{id", 42), "/api/42");
    }
}
