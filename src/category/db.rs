//! Database operations for categories and their budgets.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    category::{
        Budget, Category, CategoryId, CategoryName,
        domain::Period,
    },
};

/// Find the user's category called `name`, creating it if it does not exist yet.
///
/// Safe to call concurrently for the same name: the (user, name) pair is unique in the
/// store, so a racing insert is ignored and the existing row is returned.
pub fn find_or_create_category(
    user_id: UserID,
    name: &CategoryName,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(user_id, name) DO NOTHING;",
        params![user_id.as_i64(), name.as_ref(), now],
    )?;

    connection
        .prepare(
            "SELECT id, user_id, name, created_at, updated_at FROM category
             WHERE user_id = ?1 AND name = ?2;",
        )?
        .query_row(params![user_id.as_i64(), name.as_ref()], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve one of the user's categories by ID.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, created_at, updated_at FROM category
             WHERE id = ?1 AND user_id = ?2;",
        )?
        .query_row(params![category_id, user_id.as_i64()], map_category_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CategoryNotFound,
            error => error,
        })
}

/// Retrieve all of the user's categories ordered alphabetically by name.
pub fn get_all_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, created_at, updated_at FROM category
             WHERE user_id = ?1 ORDER BY name ASC;",
        )?
        .query_map([user_id.as_i64()], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename one of the user's categories and mark it as updated.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist or belongs to another
/// user, and [Error::DuplicateCategoryName] if the user already has a category called `new_name`.
pub fn rename_category(
    user_id: UserID,
    category_id: CategoryId,
    new_name: &CategoryName,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![new_name.as_ref(), now, category_id, user_id.as_i64()],
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.name") =>
            {
                Error::DuplicateCategoryName(new_name.to_string())
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

/// Delete one of the user's categories.
///
/// Deleting a category that does not exist, or belongs to another user, does nothing.
/// Budgets and transactions that reference the category are left in place.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        params![category_id, user_id.as_i64()],
    )?;

    if rows_affected == 0 {
        tracing::debug!("Category {category_id} for user {user_id} was already absent");
    }

    Ok(())
}

/// Append a budget row for the category and period.
pub fn insert_budget(
    user_id: UserID,
    category_id: CategoryId,
    period: Period,
    amount: u64,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_id, category_id, month, year, amount, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
        params![
            user_id.as_i64(),
            category_id,
            period.month,
            period.year,
            amount,
            now
        ],
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        user_id,
        category_id,
        month: period.month,
        year: period.year,
        amount,
        created_at: Some(now),
        updated_at: Some(now),
    })
}

/// Set the budget for the user's category called `name` in `period`.
///
/// The name is matched case-insensitively and the category is created if it does not exist.
/// A new budget row is always appended, earlier budgets are kept as history.
pub fn set_budget(
    user_id: UserID,
    name: &CategoryName,
    period: Period,
    amount: u64,
    connection: &Connection,
) -> Result<(Category, Budget), Error> {
    let now = OffsetDateTime::now_utc();
    let transaction = connection.unchecked_transaction()?;

    let category = find_or_create_category(user_id, name, now, &transaction)?;
    let budget = insert_budget(user_id, category.id, period, amount, now, &transaction)?;

    transaction.commit()?;

    Ok((category, budget))
}

/// Resolve the budget that applies to the category in `period`.
///
/// The resolution order is:
/// 1. the most recently set budget for exactly that month and year,
/// 2. otherwise the most recently set budget for the category in any period,
/// 3. otherwise [Budget::unset].
pub fn get_budget_for_period(
    user_id: UserID,
    category_id: CategoryId,
    period: Period,
    connection: &Connection,
) -> Result<Budget, Error> {
    let exact_match = connection
        .prepare(
            "SELECT id, user_id, category_id, month, year, amount, created_at, updated_at
             FROM budget
             WHERE category_id = ?1 AND user_id = ?2 AND year = ?3 AND month = ?4
             ORDER BY id DESC LIMIT 1;",
        )?
        .query_row(
            params![category_id, user_id.as_i64(), period.year, period.month],
            map_budget_row,
        );

    match exact_match {
        Ok(budget) => return Ok(budget),
        Err(rusqlite::Error::QueryReturnedNoRows) => {}
        Err(error) => return Err(error.into()),
    }

    let latest = connection
        .prepare(
            "SELECT id, user_id, category_id, month, year, amount, created_at, updated_at
             FROM budget
             WHERE category_id = ?1 AND user_id = ?2
             ORDER BY id DESC LIMIT 1;",
        )?
        .query_row(params![category_id, user_id.as_i64()], map_budget_row);

    match latest {
        Ok(budget) => Ok(budget),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Budget::unset(
            user_id,
            category_id,
            period.month,
            period.year,
        )),
        Err(error) => Err(error.into()),
    }
}

/// Fetch one of the user's categories along with the budget that applies in `period`.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist or belongs to another user.
/// A category without any budgets is not an error, see [Budget::unset].
pub fn get_category_with_budget(
    user_id: UserID,
    category_id: CategoryId,
    period: Period,
    connection: &Connection,
) -> Result<(Category, Budget), Error> {
    let category = get_category(user_id, category_id, connection)?;
    let budget = get_budget_for_period(user_id, category_id, period, connection)?;

    Ok((category, budget))
}

/// Initialize the category and budget tables and indexes.
pub fn create_category_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, name)
        );

        CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            amount INTEGER NOT NULL CHECK (amount >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_budget_category_period
            ON budget(category_id, user_id, year, month);",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_name: String = row.get(2)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let created_at = row.get(3)?;
    let updated_at = row.get(4)?;

    Ok(Category {
        id,
        user_id,
        name,
        created_at,
        updated_at,
    })
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        month: row.get(3)?,
        year: row.get(4)?,
        amount: row.get(5)?,
        created_at: Some(row.get(6)?),
        updated_at: Some(row.get(7)?),
    })
}


#[cfg(test)]
mod budget_resolution_tests {
    use rusqlite::Connection;

    use crate::{
        auth::UserID,
        category::{
            CategoryName,
            db::{create_category_tables, get_budget_for_period, get_category_with_budget, set_budget},
            domain::Period,
        },
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_tables(&connection).expect("Could not create category tables");
        connection
    }

    #[track_caller]
    fn period(month: u8, year: i32) -> Period {
        Period::new(month, year).unwrap()
    }

    #[test]
    fn set_budget_lowercases_name_and_reuses_category() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);

        let (first, _) = set_budget(
            user_id,
            &CategoryName::new("Food").unwrap(),
            period(6, 2024),
            100,
            &connection,
        )
        .unwrap();
        let (second, _) = set_budget(
            user_id,
            &CategoryName::new("FOOD").unwrap(),
            period(7, 2024),
            200,
            &connection,
        )
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.name.as_ref(), "food");
    }

    #[test]
    fn exact_period_budget_is_returned() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        let (category, _) = set_budget(
            user_id,
            &CategoryName::new_unchecked("food"),
            period(6, 2024),
            50_000,
            &connection,
        )
        .unwrap();

        let (_, budget) =
            get_category_with_budget(user_id, category.id, period(6, 2024), &connection).unwrap();

        assert_eq!(budget.amount, 50_000);
        assert_eq!((budget.month, budget.year), (6, 2024));
    }

    #[test]
    fn falls_back_to_latest_budget_from_other_period() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        let (category, _) = set_budget(
            user_id,
            &CategoryName::new_unchecked("food"),
            period(6, 2024),
            50_000,
            &connection,
        )
        .unwrap();

        let budget = get_budget_for_period(user_id, category.id, period(7, 2024), &connection)
            .unwrap();

        assert_eq!(budget.amount, 50_000);
        assert_eq!((budget.month, budget.year), (6, 2024));
    }

    #[test]
    fn latest_row_wins_within_a_period() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        let name = CategoryName::new_unchecked("food");
        let (category, _) = set_budget(user_id, &name, period(6, 2024), 100, &connection).unwrap();
        set_budget(user_id, &name, period(6, 2024), 300, &connection).unwrap();
        set_budget(user_id, &name, period(5, 2024), 999, &connection).unwrap();

        let june = get_budget_for_period(user_id, category.id, period(6, 2024), &connection)
            .unwrap();
        let august = get_budget_for_period(user_id, category.id, period(8, 2024), &connection)
            .unwrap();

        assert_eq!(june.amount, 300);
        // The fallback picks the most recently set budget, not the closest period.
        assert_eq!(august.amount, 999);
    }

    #[test]
    fn category_without_budget_has_zero_budget() {
        let connection = get_test_db_connection();
        let user_id = UserID::new(1);
        let (category, _) = set_budget(
            user_id,
            &CategoryName::new_unchecked("food"),
            period(6, 2024),
            100,
            &connection,
        )
        .unwrap();
        connection.execute("DELETE FROM budget", ()).unwrap();

        let budget = get_budget_for_period(user_id, category.id, period(6, 2024), &connection)
            .unwrap();

        assert!(budget.is_unset());
        assert_eq!(budget.amount, 0);
    }

    #[test]
    fn other_users_budgets_are_ignored() {
        let connection = get_test_db_connection();
        let (category, _) = set_budget(
            UserID::new(1),
            &CategoryName::new_unchecked("food"),
            period(6, 2024),
            100,
            &connection,
        )
        .unwrap();

        let budget =
            get_budget_for_period(UserID::new(2), category.id, period(6, 2024), &connection)
                .unwrap();

        assert!(budget.is_unset());
    }
}
