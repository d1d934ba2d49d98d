//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{Email, PasswordHash},
    datetime_format,
};

/// The shortest display name that can be registered.
pub const MIN_NAME_LENGTH: usize = 3;
/// The longest display name that can be registered.
pub const MAX_NAME_LENGTH: usize = 100;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email, unique across all users.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the account was registered.
    pub created_at: OffsetDateTime,
}

/// The parts of a [User] that are safe to send to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email.
    pub email: Email,
    /// When the account was registered.
    #[serde(with = "datetime_format::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Trim `raw_name` and check its length.
///
/// # Errors
///
/// Returns [Error::Validation] if the trimmed name is shorter than [MIN_NAME_LENGTH] or
/// longer than [MAX_NAME_LENGTH] characters.
pub fn validate_user_name(raw_name: &str) -> Result<String, Error> {
    let name = raw_name.trim();
    let length = name.chars().count();

    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(Error::Validation(format!(
            "name must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(name.to_owned())
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateEmail] if `email` is already registered, or a
/// [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    name: &str,
    email: Email,
    password_hash: PasswordHash,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        (name, email.as_ref(), password_hash.as_ref(), created_at),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_owned(),
        email,
        password_hash,
        created_at,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::UserNotFound,
            error => error,
        })
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, created_at FROM user WHERE email = ?1")?
        .query_row((email.as_ref(),), map_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::UserNotFound,
            error => error,
        })
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        auth::{Email, PasswordHash, UserID},
    };

    use super::{
        create_user, create_user_table, get_user_by_email, get_user_by_id, validate_user_name,
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn created_at() -> OffsetDateTime {
        datetime!(2024-06-01 09:30:00 UTC)
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = create_user(
            "Alice",
            Email::new_unchecked("alice@example.com"),
            password_hash.clone(),
            created_at(),
            &db_connection,
        )
        .unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        let email = Email::new("alice@example.com").unwrap();
        create_user(
            "Alice",
            email,
            PasswordHash::new_unchecked("hunter2"),
            created_at(),
            &db_connection,
        )
        .unwrap();

        let result = create_user(
            "Alice Again",
            Email::new("ALICE@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            created_at(),
            &db_connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::UserNotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_user(
            "Alice",
            Email::new_unchecked("alice@example.com"),
            PasswordHash::new_unchecked("hunter2"),
            created_at(),
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let db_connection = get_db_connection();
        let email = Email::new_unchecked("alice@example.com");
        let test_user = create_user(
            "Alice",
            email.clone(),
            PasswordHash::new_unchecked("hunter2"),
            created_at(),
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_email(&email, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn user_name_is_trimmed_and_length_checked() {
        assert_eq!(validate_user_name("  Bob  "), Ok("Bob".to_owned()));
        assert!(matches!(validate_user_name(" ab "), Err(Error::Validation(_))));
        assert!(matches!(
            validate_user_name(&"a".repeat(101)),
            Err(Error::Validation(_))
        ));
    }
}
