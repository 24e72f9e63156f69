//! Monthly budgets: a spending ceiling for one category in one month.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, category::CategoryId, database_id::DatabaseId};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// The amount planned for a category in a calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub category_id: CategoryId,
    pub year: i32,
    /// The month number, 1 for January.
    pub month: u8,
    /// The allocated amount in dollars.
    pub amount: f64,
}

/// Set the budget for a category and month, replacing the amount of any
/// existing budget for the same pair.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidMonth] if `month` is not in 1..=12,
/// - [Error::InvalidAmount] if `amount` is negative or not a number,
/// - [Error::InvalidCategory] if `category_id` does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_budget(
    category_id: CategoryId,
    year: i32,
    month: u8,
    amount: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidMonth(month));
    }

    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    connection
        .prepare(
            "INSERT INTO budget (category_id, year, month, amount) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(category_id, year, month) DO UPDATE SET amount = excluded.amount
            RETURNING id, category_id, year, month, amount",
        )?
        .query_row((category_id, year, month, amount), map_row)
        .map_err(|error| match Error::from(error) {
            Error::InvalidCategory(None) => Error::InvalidCategory(Some(category_id)),
            error => error,
        })
}

/// Retrieve a budget by its ID.
pub fn get_budget(budget_id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare("SELECT id, category_id, year, month, amount FROM budget WHERE id = :id")?
        .query_row(&[(":id", &budget_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the budgets for a month, ordered by category name.
pub fn get_budgets_for_month(
    year: i32,
    month: u8,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT budget.id, budget.category_id, budget.year, budget.month, budget.amount
            FROM budget
            INNER JOIN category ON category.id = budget.category_id
            WHERE budget.year = ?1 AND budget.month = ?2
            ORDER BY category.name ASC",
        )?
        .query_map((year, month), map_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Delete a budget by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingBudget] if the budget does not exist.
pub fn delete_budget(budget_id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1", [budget_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Create the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            amount REAL NOT NULL CHECK (amount >= 0),
            UNIQUE(category_id, year, month),
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_budget_year_month ON budget(year, month);",
    )
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        year: row.get(2)?,
        month: row.get(3)?,
        amount: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        test_utils::get_test_connection,
        transaction::TransactionType,
    };

    use super::{delete_budget, get_budget, get_budgets_for_month, set_budget};

    fn create_test_category(name: &str, connection: &Connection) -> i64 {
        create_category(
            CategoryName::new_unchecked(name),
            TransactionType::Expense,
            "",
            connection,
        )
        .unwrap()
        .id
    }

    #[test]
    fn set_budget_creates_budget() {
        let connection = get_test_connection();
        let category_id = create_test_category("Pets", &connection);

        let budget = set_budget(category_id, 2026, 1, 500.0, &connection).unwrap();

        assert_eq!(budget.category_id, category_id);
        assert_eq!(budget.year, 2026);
        assert_eq!(budget.month, 1);
        assert_eq!(budget.amount, 500.0);
        assert_eq!(get_budget(budget.id, &connection), Ok(budget));
    }

    #[test]
    fn set_budget_twice_replaces_amount() {
        let connection = get_test_connection();
        let category_id = create_test_category("Pets", &connection);
        let first = set_budget(category_id, 2026, 1, 500.0, &connection).unwrap();

        let second = set_budget(category_id, 2026, 1, 650.0, &connection).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.amount, 650.0);
        assert_eq!(
            get_budgets_for_month(2026, 1, &connection).unwrap(),
            vec![second]
        );
    }

    #[test]
    fn set_budget_rejects_invalid_values() {
        let connection = get_test_connection();
        let category_id = create_test_category("Pets", &connection);

        assert_eq!(
            set_budget(category_id, 2026, 13, 1.0, &connection),
            Err(Error::InvalidMonth(13))
        );
        assert_eq!(
            set_budget(category_id, 2026, 1, -1.0, &connection),
            Err(Error::InvalidAmount(-1.0))
        );
        assert_eq!(
            set_budget(9999, 2026, 1, 1.0, &connection),
            Err(Error::InvalidCategory(Some(9999)))
        );
    }

    #[test]
    fn budgets_for_month_only_include_that_month() {
        let connection = get_test_connection();
        let pets = create_test_category("Pets", &connection);
        let gifts = create_test_category("Gifts", &connection);
        let january_pets = set_budget(pets, 2026, 1, 100.0, &connection).unwrap();
        let january_gifts = set_budget(gifts, 2026, 1, 50.0, &connection).unwrap();
        set_budget(pets, 2026, 2, 100.0, &connection).unwrap();
        set_budget(pets, 2025, 1, 100.0, &connection).unwrap();

        let got = get_budgets_for_month(2026, 1, &connection).unwrap();

        assert_eq!(got, vec![january_gifts, january_pets]);
    }

    #[test]
    fn delete_budget_removes_it() {
        let connection = get_test_connection();
        let category_id = create_test_category("Pets", &connection);
        let budget = set_budget(category_id, 2026, 1, 100.0, &connection).unwrap();

        delete_budget(budget.id, &connection).unwrap();

        assert_eq!(get_budget(budget.id, &connection), Err(Error::NotFound));
        assert_eq!(
            delete_budget(budget.id, &connection),
            Err(Error::DeleteMissingBudget)
        );
    }
}
