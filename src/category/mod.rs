//! Spending categories and their monthly budgets.

mod create;
mod db;
mod delete;
mod domain;
mod get;
mod list;

pub use create::{create_category_endpoint, update_category_endpoint};
pub use db::{
    create_category_tables, delete_category, get_budget_for_period, get_category_with_budget,
    set_budget,
};
pub use delete::delete_category_endpoint;
pub use domain::{Budget, Category, CategoryId, CategoryName, Period, PeriodQuery};
pub use get::get_category_endpoint;
pub use list::get_categories_endpoint;
