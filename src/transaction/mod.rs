//! Income and expense transactions recorded against categories.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod get;
mod list;

pub use create::create_transaction_endpoint;
pub use db::create_transaction_table;
pub use delete::delete_transaction_endpoint;
pub use domain::{
    Transaction, TransactionForm, TransactionId, TransactionPatch, TransactionWithCategory,
};
pub use edit::edit_transaction_endpoint;
pub use get::get_transaction_endpoint;
pub use list::get_transactions_endpoint;
