//! The endpoint for creating a new user account.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{
        Email, Identity, PasswordHash, SessionKeys, ValidatedPassword, issue_token,
        user::{UserProfile, create_user, get_user_by_email, validate_user_name},
    },
    extract::JsonBody,
    response::Envelope,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The keys for signing session tokens.
    pub session_keys: SessionKeys,
    /// The bcrypt cost used when hashing the new password.
    pub password_hash_cost: u32,
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session_keys: state.session_keys.clone(),
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data for registering a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The user's chosen password.
    pub password: String,
}

/// The body of a successful registration or log-in response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The user that was registered or logged in.
    pub user: UserProfile,
    /// A fresh session token for the user.
    pub token: String,
}

/// A route handler for registering a new user account.
///
/// On success the user is logged in straight away: the response carries a session token.
///
/// # Errors
///
/// Returns [Error::Validation] if the name, email or password is rejected, and
/// [Error::DuplicateEmail] if the email is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    JsonBody(form): JsonBody<RegisterForm>,
) -> Result<Envelope<AuthResponse>, Error> {
    let name = validate_user_name(&form.name)?;
    let email = Email::new(&form.email)?;
    let password = ValidatedPassword::new(&form.password)?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    match get_user_by_email(&email, &connection) {
        Ok(_) => return Err(Error::DuplicateEmail),
        Err(Error::UserNotFound) => {}
        Err(error) => return Err(error),
    }

    let user = create_user(
        &name,
        email,
        password_hash,
        OffsetDateTime::now_utc(),
        &connection,
    )?;
    drop(connection);

    tracing::info!("Registered user {}", user.id);

    let identity = Identity {
        user_id: user.id,
        email: user.email.to_string(),
        name: user.name.clone(),
    };
    let token = issue_token(&identity, OffsetDateTime::now_utc(), &state.session_keys)?;

    Ok(Envelope::created(
        "Registration successful",
        AuthResponse {
            user: UserProfile::from(&user),
            token,
        },
    ))
}
