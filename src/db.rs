//! Schema initialisation for the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    budget::create_budget_table,
    category::{create_category_table, seed_default_categories},
    goal::create_goal_table,
    recurring::create_recurring_transaction_table,
    rule::{create_rule_table, seed_default_rules},
    transaction::create_transaction_table,
};

/// Create the application tables if they do not exist and seed the default
/// categories and keyword rules into an empty database.
///
/// Foreign key enforcement is switched on for `connection`.
///
/// # Errors
/// Returns an error if a table cannot be created or the seed data cannot be inserted.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_recurring_transaction_table(&transaction)?;
    create_rule_table(&transaction)?;

    seed_default_categories(&transaction)?;
    seed_default_rules(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("First initialisation failed");
        let count_categories = |connection: &Connection| -> i64 {
            connection
                .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))
                .unwrap()
        };
        let first_count = count_categories(&connection);

        initialize(&connection).expect("Second initialisation failed");

        assert_eq!(first_count, count_categories(&connection));
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let enabled: bool = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();

        assert!(enabled);
    }

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        for table in [
            "category",
            "transaction",
            "budget",
            "goal",
            "recurring_transaction",
            "category_rule",
        ] {
            let count: i64 = connection
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "table {table} was not created");
        }
    }
}
