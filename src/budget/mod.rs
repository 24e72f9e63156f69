//! Monthly budgets per category.

mod core;
mod delete;
mod page;
mod set;

pub use self::core::{
    Budget, BudgetId, create_budget_table, delete_budget, get_budget, get_budgets_for_month,
    set_budget,
};
pub use delete::delete_budget_endpoint;
pub use page::get_budgets_page;
pub use set::set_budget_endpoint;
