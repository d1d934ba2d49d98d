//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    auth::{PasswordHash, SessionKeys, ValidatedPassword},
    db::initialize,
    timezone::get_local_offset,
};

/// The password behind [AppState::dummy_password_hash]. No account can log in with it.
const DUMMY_PASSWORD: &str = "moniplan-dummy-password";

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys for signing and verifying session tokens.
    pub session_keys: SessionKeys,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,

    /// A hash with the same cost as real password hashes.
    ///
    /// Log-in attempts for unknown emails are verified against it so that they take
    /// as long as attempts for registered emails.
    pub dummy_password_hash: PasswordHash,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if:
    /// - `jwt_secret` is empty,
    /// - `local_timezone` is not a known timezone,
    /// - the dummy password hash cannot be created,
    /// - or the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        local_timezone: &str,
        password_hash_cost: u32,
    ) -> Result<Self, Error> {
        let session_keys = SessionKeys::from_secret(jwt_secret)?;

        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezone(local_timezone.to_owned()));
        }

        let dummy_password_hash = PasswordHash::new(
            ValidatedPassword::new_unchecked(DUMMY_PASSWORD),
            password_hash_cost,
        )?;

        initialize(&db_connection)?;

        Ok(Self {
            session_keys,
            local_timezone: local_timezone.to_owned(),
            password_hash_cost,
            dummy_password_hash,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.session_keys.clone()
    }
}
