//! Core category and budget domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, auth::UserID, database_id::DatabaseId, datetime_format, timezone::current_period,
};

/// The longest category name that can be stored.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// A validated, non-empty, lowercase category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// The name is trimmed and lowercased, so "Food" and " food " name the same category.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is empty after trimming
    /// or longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim().to_lowercase();

        if name.is_empty() {
            return Err(Error::Validation("category name is required".to_owned()));
        }

        if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            return Err(Error::Validation(format!(
                "category name must be at most {MAX_CATEGORY_NAME_LENGTH} characters"
            )));
        }

        Ok(Self(name))
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is lowercase and not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// A named spending bucket owned by one user (e.g., 'food', 'rent').
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The category's ID in the application database.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserID,
    /// The lowercase name of the category, unique per user.
    pub name: CategoryName,
    /// When the category was created.
    #[serde(with = "datetime_format::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the category was last renamed or had a budget set.
    #[serde(with = "datetime_format::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// An amount allocated to a category for one calendar month.
///
/// Budgets are never updated in place: setting a budget appends a new row, and the
/// applicable budget for a period is resolved by [get_budget_for_period](super::get_budget_for_period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The budget's ID, or zero if no budget has been configured.
    pub id: BudgetId,
    /// The user that owns the budget.
    pub user_id: UserID,
    /// The category the budget applies to.
    pub category_id: CategoryId,
    /// The calendar month, 1-12.
    pub month: u8,
    /// The calendar year.
    pub year: i32,
    /// The allocated amount in the smallest currency unit.
    pub amount: u64,
    /// When the budget was set, `None` if no budget has been configured.
    #[serde(with = "datetime_format::rfc3339_option")]
    pub created_at: Option<OffsetDateTime>,
    /// Equal to `created_at` since budgets are never updated.
    #[serde(with = "datetime_format::rfc3339_option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Budget {
    /// The placeholder returned when a category has never had a budget set.
    pub fn unset(user_id: UserID, category_id: CategoryId, month: u8, year: i32) -> Self {
        Self {
            id: 0,
            user_id,
            category_id,
            month,
            year,
            amount: 0,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether this is the [Budget::unset] placeholder.
    pub fn is_unset(&self) -> bool {
        self.id == 0
    }
}

/// A validated calendar month and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// The calendar month, 1-12.
    pub month: u8,
    /// The calendar year, 1-9999.
    pub year: i32,
}

impl Period {
    /// Check that `month` is 1-12 and `year` is 1-9999.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if either is out of range.
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }

        if !(1..=9999).contains(&year) {
            return Err(Error::Validation(format!(
                "year must be between 1 and 9999, got {year}"
            )));
        }

        Ok(Self { month, year })
    }
}

/// Optional `month` and `year` query parameters selecting a period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodQuery {
    /// The calendar month, 1-12.
    pub month: Option<u8>,
    /// The calendar year.
    pub year: Option<i32>,
}

impl PeriodQuery {
    /// Fill in any missing part with the current month or year in `local_timezone` and
    /// validate the result.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the period is out of range, or
    /// [Error::InvalidTimezone] if `local_timezone` is not a known timezone.
    pub fn resolve(&self, local_timezone: &str) -> Result<Period, Error> {
        let (current_month, current_year) = current_period(local_timezone)?;

        Period::new(
            self.month.unwrap_or(current_month),
            self.year.unwrap_or(current_year),
        )
    }
}

/// The request body for creating or updating a category's budget.
///
/// Any `user_id` sent by the client is ignored; the owner is always the logged in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetForm {
    /// The category name, matched case-insensitively.
    pub name: String,
    /// The calendar month, 1-12.
    pub month: u8,
    /// The calendar year.
    pub year: i32,
    /// The allocated amount in the smallest currency unit.
    pub amount: u64,
}


#[cfg(test)]
mod period_tests {
    use crate::{
        Error,
        category::domain::{Period, PeriodQuery},
        timezone::current_period,
    };

    #[test]
    fn accepts_valid_period() {
        assert_eq!(
            Period::new(6, 2024),
            Ok(Period {
                month: 6,
                year: 2024
            })
        );
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(matches!(Period::new(0, 2024), Err(Error::Validation(_))));
        assert!(matches!(Period::new(13, 2024), Err(Error::Validation(_))));
    }

    #[test]
    fn query_defaults_to_current_period() {
        let (month, year) = current_period("Etc/UTC").unwrap();

        let period = PeriodQuery::default().resolve("Etc/UTC").unwrap();

        assert_eq!(period, Period { month, year });
    }

    #[test]
    fn query_keeps_given_parts() {
        let query = PeriodQuery {
            month: Some(2),
            year: None,
        };
        let (_, year) = current_period("Etc/UTC").unwrap();

        assert_eq!(query.resolve("Etc/UTC"), Ok(Period { month: 2, year }));
    }

    #[test]
    fn rejects_out_of_range_year() {
        assert!(matches!(Period::new(6, 0), Err(Error::Validation(_))));
        assert!(matches!(Period::new(6, 10_000), Err(Error::Validation(_))));
    }
}
