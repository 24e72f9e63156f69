//! The dashboard page: an overview of the month's income, spending, budgets and goals.

mod page;
mod tables;

pub use page::get_dashboard_page;
