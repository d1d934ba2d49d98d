//! Transaction models and the validation applied to client input.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    Error,
    amount::check_amount,
    auth::UserID,
    category::CategoryId,
    database_id::DatabaseId,
    datetime_format::{rfc3339, wall_clock},
};

/// The longest allowed transaction type, in characters.
pub const MAX_TYPE_LENGTH: usize = 100;
/// The longest allowed transaction remark, in characters.
pub const MAX_REMARKS_LENGTH: usize = 255;

pub type TransactionId = DatabaseId;

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The category the transaction counts against, if any.
    ///
    /// This is a weak reference: the category may have been deleted since.
    pub category_id: Option<CategoryId>,
    /// The amount of money in the smallest unit of the currency.
    pub amount: u64,
    /// Free-form label such as "income" or "expense".
    #[serde(rename = "type")]
    pub kind: String,
    /// A description of what the transaction was for.
    pub remarks: String,
    /// When the transaction happened, as a wall clock time in the server's timezone.
    #[serde(with = "wall_clock")]
    pub transaction_date: PrimitiveDateTime,
    /// When the transaction was recorded.
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A transaction together with the name of its category.
///
/// `category_name` is `None` when the transaction has no category or its category was
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithCategory {
    /// The transaction's own fields.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The name of the transaction's category.
    pub category_name: Option<String>,
}

/// The request body for creating a transaction.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransactionForm {
    pub category_id: Option<CategoryId>,
    pub amount: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub remarks: String,
    /// A date in the layout "YYYY-MM-DD HH:MM:SS".
    pub transaction_date: Option<String>,
}

/// A validated [TransactionForm], ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub category_id: Option<CategoryId>,
    pub amount: u64,
    pub kind: String,
    pub remarks: String,
    pub transaction_date: PrimitiveDateTime,
}

impl TransactionForm {
    /// Check the form's fields.
    ///
    /// A missing or unparseable `transaction_date` is replaced with `now`, and a category ID
    /// of zero is treated as no category.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the amount is zero or too large, or if the type or
    /// remarks are empty or too long.
    pub fn validate(self, now: PrimitiveDateTime) -> Result<NewTransaction, Error> {
        if self.amount == 0 {
            return Err(Error::Validation(
                "amount is required and must be greater than zero".to_owned(),
            ));
        }

        let amount = check_amount(self.amount)?;
        let kind = validate_text("type", &self.kind, MAX_TYPE_LENGTH)?;
        let remarks = validate_text("remarks", &self.remarks, MAX_REMARKS_LENGTH)?;
        let transaction_date = self
            .transaction_date
            .as_deref()
            .and_then(wall_clock::parse)
            .unwrap_or(now);

        Ok(NewTransaction {
            category_id: self.category_id.filter(|id| *id > 0),
            amount,
            kind,
            remarks,
            transaction_date,
        })
    }
}

/// The request body for updating a transaction.
///
/// Each field is optional. A field that is absent, null, or holds a value that a new
/// transaction could not have (zero amount, zero category ID, empty text or a date that
/// does not parse) leaves the stored value unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionPatch {
    /// The new category, ignored if zero.
    pub category_id: Option<CategoryId>,
    /// The new amount, ignored if zero.
    pub amount: Option<u64>,
    /// The new type, ignored if empty.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The new remarks, ignored if empty.
    pub remarks: Option<String>,
    /// The new date in the layout "YYYY-MM-DD HH:MM:SS", ignored if it does not parse.
    pub transaction_date: Option<String>,
}

impl TransactionPatch {
    /// Overwrite the fields of `transaction` that this patch sets.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the new amount is too large or a new type or remark is
    /// too long. `transaction` is
    /// left untouched in that case.
    pub fn apply(self, transaction: &mut Transaction) -> Result<(), Error> {
        let amount = self
            .amount
            .filter(|amount| *amount > 0)
            .map(check_amount)
            .transpose()?;
        let kind = match self.kind.as_deref().map(str::trim) {
            Some(kind) if !kind.is_empty() => Some(validate_text("type", kind, MAX_TYPE_LENGTH)?),
            _ => None,
        };
        let remarks = match self.remarks.as_deref().map(str::trim) {
            Some(remarks) if !remarks.is_empty() => {
                Some(validate_text("remarks", remarks, MAX_REMARKS_LENGTH)?)
            }
            _ => None,
        };

        if let Some(category_id) = self.category_id.filter(|id| *id > 0) {
            transaction.category_id = Some(category_id);
        }

        if let Some(amount) = amount {
            transaction.amount = amount;
        }

        if let Some(kind) = kind {
            transaction.kind = kind;
        }

        if let Some(remarks) = remarks {
            transaction.remarks = remarks;
        }

        if let Some(date) = self.transaction_date.as_deref().and_then(wall_clock::parse) {
            transaction.transaction_date = date;
        }

        Ok(())
    }
}

fn validate_text(field: &str, value: &str, max_length: usize) -> Result<String, Error> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }

    if value.chars().count() > max_length {
        return Err(Error::Validation(format!(
            "{field} must be at most {max_length} characters"
        )));
    }

    Ok(value.to_owned())
}


#[cfg(test)]
mod transaction_patch_tests {
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        auth::UserID,
        transaction::domain::{MAX_TYPE_LENGTH, Transaction, TransactionPatch},
    };

    fn transaction() -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            category_id: Some(2),
            amount: 1500,
            kind: "expense".to_owned(),
            remarks: "Lunch".to_owned(),
            transaction_date: datetime!(2024-06-15 12:30:00),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut got = transaction();

        TransactionPatch::default().apply(&mut got).unwrap();

        assert_eq!(got, transaction());
    }

    #[test]
    fn zero_and_empty_values_change_nothing() {
        let mut got = transaction();

        TransactionPatch {
            category_id: Some(0),
            amount: Some(0),
            kind: Some(String::new()),
            remarks: Some("  ".to_owned()),
            transaction_date: Some("not a date".to_owned()),
        }
        .apply(&mut got)
        .unwrap();

        assert_eq!(got, transaction());
    }

    #[test]
    fn overwrites_given_fields() {
        let mut got = transaction();

        TransactionPatch {
            category_id: Some(3),
            amount: Some(2000),
            kind: Some("income".to_owned()),
            remarks: Some("Refund".to_owned()),
            transaction_date: Some("2024-06-20 09:00:00".to_owned()),
        }
        .apply(&mut got)
        .unwrap();

        assert_eq!(got.category_id, Some(3));
        assert_eq!(got.amount, 2000);
        assert_eq!(got.kind, "income");
        assert_eq!(got.remarks, "Refund");
        assert_eq!(got.transaction_date, datetime!(2024-06-20 09:00:00));
    }

    #[test]
    fn long_type_is_rejected_without_partial_update() {
        let mut got = transaction();

        let result = TransactionPatch {
            amount: Some(2000),
            kind: Some("a".repeat(MAX_TYPE_LENGTH + 1)),
            ..Default::default()
        }
        .apply(&mut got);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(got, transaction());
    }
}
