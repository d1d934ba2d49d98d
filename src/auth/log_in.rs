//! The endpoint for logging in with an email and password.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{
        Email, Identity, PasswordHash, SessionKeys, issue_token,
        register_user::AuthResponse,
        user::{UserProfile, get_user_by_email},
    },
    extract::JsonBody,
    response::Envelope,
};

/// The state needed to log in a user.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The keys for signing session tokens.
    pub session_keys: SessionKeys,
    /// Checked in place of a real hash when the email is not registered.
    pub dummy_password_hash: PasswordHash,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session_keys: state.session_keys.clone(),
            dummy_password_hash: state.dummy_password_hash.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw data entered by the user in the log-in form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email is missing or malformed, or the password is empty.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<LoginState>,
    JsonBody(user_data): JsonBody<LogInData>,
) -> Result<Envelope<AuthResponse>, Error> {
    let email = Email::new(&user_data.email)?;

    if user_data.password.is_empty() {
        return Err(Error::Validation("password is required".to_owned()));
    }

    let user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => Some(user),
            Err(Error::UserNotFound) => None,
            Err(error) => return Err(error),
        }
    };

    // Unknown emails still pay for a bcrypt verification.
    let password_hash = user
        .as_ref()
        .map_or(&state.dummy_password_hash, |user| &user.password_hash);
    let password_is_correct = password_hash
        .verify(&user_data.password)
        .map_err(|error| {
            tracing::error!("Error verifying password: {error}");
            Error::HashingError(error.to_string())
        })?;

    let user = match user {
        Some(user) if password_is_correct => user,
        _ => return Err(Error::InvalidCredentials),
    };

    let identity = Identity {
        user_id: user.id,
        email: user.email.to_string(),
        name: user.name.clone(),
    };
    let token = issue_token(&identity, OffsetDateTime::now_utc(), &state.session_keys)?;

    Ok(Envelope::ok(
        "Login successful",
        AuthResponse {
            user: UserProfile::from(&user),
            token,
        },
    ))
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        Error,
        auth::{
            Email, PasswordHash, SessionKeys, ValidatedPassword,
            log_in::{LogInData, LoginState, post_log_in},
            user::{create_user, create_user_table},
        },
        extract::JsonBody,
    };

    const TEST_PASSWORD: &str = "averysafeandsecurepassword";
    const DUMMY_PASSWORD: &str = "dummypassword";

    fn get_test_state() -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_user(
            "Alice",
            Email::new_unchecked("alice@example.com"),
            PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4).unwrap(),
            OffsetDateTime::now_utc(),
            &connection,
        )
        .expect("Could not create test user");

        LoginState {
            session_keys: SessionKeys::from_secret("foobar").unwrap(),
            dummy_password_hash: PasswordHash::new(
                ValidatedPassword::new_unchecked(DUMMY_PASSWORD),
                4,
            )
            .unwrap(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn log_in_data(email: &str, password: &str) -> LogInData {
        LogInData {
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response = post_log_in(
            State(get_test_state()),
            JsonBody(log_in_data("alice@example.com", TEST_PASSWORD)),
        )
        .await
        .expect("Could not log in")
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn log_in_normalizes_email() {
        let result = post_log_in(
            State(get_test_state()),
            JsonBody(log_in_data("  ALICE@example.com", TEST_PASSWORD)),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let result = post_log_in(
            State(get_test_state()),
            JsonBody(log_in_data("alice@example.com", "wrongpassword")),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let result = post_log_in(
            State(get_test_state()),
            JsonBody(log_in_data("bob@example.com", TEST_PASSWORD)),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn log_in_fails_for_unknown_email_with_dummy_password() {
        let result = post_log_in(
            State(get_test_state()),
            JsonBody(log_in_data("bob@example.com", DUMMY_PASSWORD)),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn log_in_fails_with_empty_password() {
        let result = post_log_in(
            State(get_test_state()),
            JsonBody(log_in_data("alice@example.com", "")),
        )
        .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
