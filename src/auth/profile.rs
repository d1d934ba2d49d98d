//! Endpoints for reading the caller's profile and refreshing their session token.

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
    auth::{
        Identity, SessionKeys, issue_token,
        user::{UserProfile, get_user_by_id},
    },
    response::Envelope,
};

/// The state needed to fetch a user's profile.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A response body holding the logged in user's profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    user: UserProfile,
}

/// A response body holding a newly signed session token.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    token: String,
}

/// A route handler that returns the stored profile of the logged in user.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if the account was removed after the token was issued.
pub async fn get_profile(
    State(state): State<ProfileState>,
    Extension(identity): Extension<Identity>,
) -> Result<Envelope<ProfileResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = get_user_by_id(identity.user_id, &connection)?;

    Ok(Envelope::ok(
        "Profile fetched successfully",
        ProfileResponse {
            user: UserProfile::from(&user),
        },
    ))
}

/// A route handler that issues a new session token for the identity in the current one.
///
/// The store is not consulted.
pub async fn post_refresh_token(
    State(session_keys): State<SessionKeys>,
    Extension(identity): Extension<Identity>,
) -> Result<Envelope<RefreshResponse>, Error> {
    let token = issue_token(&identity, OffsetDateTime::now_utc(), &session_keys)?;

    Ok(Envelope::ok(
        "Token refreshed successfully",
        RefreshResponse { token },
    ))
}

#[cfg(test)]
mod profile_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        Error,
        auth::{
            Email, Identity, PasswordHash, SessionKeys, UserID,
            profile::{ProfileState, get_profile, post_refresh_token},
            user::{create_user, create_user_table},
            verify_token,
        },
    };

    fn get_test_state() -> (ProfileState, Identity) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        let user = create_user(
            "Alice",
            Email::new_unchecked("alice@example.com"),
            PasswordHash::new_unchecked("hunter2"),
            OffsetDateTime::now_utc(),
            &connection,
        )
        .expect("Could not create test user");

        (
            ProfileState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            Identity {
                user_id: user.id,
                email: "alice@example.com".to_owned(),
                name: "Alice".to_owned(),
            },
        )
    }

    #[tokio::test]
    async fn get_profile_succeeds() {
        let (state, identity) = get_test_state();

        let result = get_profile(State(state), Extension(identity)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn get_profile_of_missing_user_is_not_found() {
        let (state, mut identity) = get_test_state();
        identity.user_id = UserID::new(identity.user_id.as_i64() + 42);

        let result = get_profile(State(state), Extension(identity)).await;

        assert!(matches!(result, Err(Error::UserNotFound)));
    }

    #[tokio::test]
    async fn refresh_token_carries_same_identity() {
        let (_, identity) = get_test_state();
        let keys = SessionKeys::from_secret("foobar").unwrap();

        let response = post_refresh_token(State(keys.clone()), Extension(identity.clone()))
            .await
            .expect("Could not refresh token");

        assert_eq!(verify_token(&response.body().token, &keys), Ok(identity));
    }
}
