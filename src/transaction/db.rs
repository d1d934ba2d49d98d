//! Database operations for transactions.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    category::Period,
    transaction::domain::{NewTransaction, Transaction, TransactionId, TransactionWithCategory},
};

/// Create a new transaction for the user.
pub fn create_transaction(
    user_id: UserID,
    transaction: &NewTransaction,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, category_id, amount, type, remarks, transaction_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING id, user_id, category_id, amount, type, remarks, transaction_date, created_at, updated_at;",
        )?
        .query_row(
            params![
                user_id.as_i64(),
                transaction.category_id,
                transaction.amount,
                transaction.kind,
                transaction.remarks,
                transaction.transaction_date,
                now,
            ],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve one of the user's transactions by ID.
///
/// # Errors
///
/// Returns [Error::TransactionNotFound] if the transaction does not exist or belongs to
/// another user.
pub fn get_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, type, remarks, transaction_date, created_at, updated_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::TransactionNotFound,
            error => error,
        })
}

/// Write every field of `transaction` except its creation time back to the database.
///
/// # Errors
///
/// Returns [Error::TransactionNotFound] if no transaction of the owner has the ID.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET category_id = ?1, amount = ?2, type = ?3, remarks = ?4, transaction_date = ?5, updated_at = ?6
         WHERE id = ?7 AND user_id = ?8;",
        params![
            transaction.category_id,
            transaction.amount,
            transaction.kind,
            transaction.remarks,
            transaction.transaction_date,
            transaction.updated_at,
            transaction.id,
            transaction.user_id.as_i64(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// Delete one of the user's transactions.
///
/// Deleting a transaction that does not exist is not an error.
pub fn delete_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2;",
        params![transaction_id, user_id.as_i64()],
    )?;

    if rows_affected == 0 {
        tracing::debug!("transaction {transaction_id} of user {user_id} did not exist");
    }

    Ok(())
}

/// Get the user's transactions dated within `period`, newest inserted first.
pub fn get_transactions_for_period(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.user_id, t.category_id, t.amount, t.type, t.remarks,
                    t.transaction_date, t.created_at, t.updated_at, c.name
             FROM \"transaction\" t
             LEFT JOIN category c ON c.id = t.category_id AND c.user_id = t.user_id
             WHERE t.user_id = ?1
               AND CAST(strftime('%Y', t.transaction_date) AS INTEGER) = ?2
               AND CAST(strftime('%m', t.transaction_date) AS INTEGER) = ?3
             ORDER BY t.id DESC;",
        )?
        .query_map(params![user_id.as_i64(), period.year, period.month], |row| {
            let transaction = map_transaction_row(row)?;
            let category_name = row.get(9)?;

            Ok(TransactionWithCategory {
                transaction,
                category_name,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER,
            amount INTEGER NOT NULL CHECK (amount > 0),
            type TEXT NOT NULL,
            remarks TEXT NOT NULL,
            transaction_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, transaction_date);",
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        kind: row.get(4)?,
        remarks: row.get(5)?,
        transaction_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
