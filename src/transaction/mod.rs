//! Transactions: creating, editing, deleting and listing them.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;

pub use self::core::{
    CategoryFilter, Transaction, TransactionBuilder, TransactionId, TransactionQuery,
    TransactionType, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, map_transaction_row, query_transactions,
    set_transaction_categories, update_transaction,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::get_transactions_page;
