//! Keyword rules for categorising transactions automatically.
//! A rule matches transaction descriptions that contain its keyword and assigns a category.

mod categorize;
mod create;
mod db;
mod delete;
mod list;
mod models;

pub use categorize::{
    CategorizeResult, apply_rules_endpoint, categorize_uncategorized_transactions, match_category,
};
pub use create::create_rule_endpoint;
pub use db::{create_rule, create_rule_table, delete_rule, get_all_rules, seed_default_rules};
pub use delete::delete_rule_endpoint;
pub use list::get_rules_page;
pub use models::{Rule, RuleId};
