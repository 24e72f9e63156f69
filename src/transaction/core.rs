//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, category::CategoryId, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// Whether money came in or went out.
///
/// Categories carry a type too, so that income categories can be told apart
/// from expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The name shown to users, e.g. "Income".
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("\"{other}\" is not a transaction type")),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is always a non-negative magnitude, the direction of the money
/// is given by `transaction_type`.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The name of the bank account, may be empty.
    pub account: String,
    /// Free-form notes, may be empty.
    pub notes: String,
}

impl Transaction {
    /// Create a new expense.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: Date, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            category_id: None,
            transaction_type: TransactionType::Expense,
            account: String::new(),
            notes: String::new(),
        }
    }

    /// The amount with income positive and expenses negative.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// The fields of a transaction that is yet to be saved, or the new values
/// for an existing transaction.
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Transaction::build(3250.0, date!(2026 - 01 - 31), "Salary")
///     .transaction_type(TransactionType::Income)
///     .account("Everyday");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub amount: f64,
    pub date: Date,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub transaction_type: TransactionType,
    pub account: String,
    pub notes: String,
}

impl TransactionBuilder {
    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set whether the transaction is income or an expense.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Set the account name.
    pub fn account(mut self, account: &str) -> Self {
        self.account = account.to_owned();
        self
    }

    /// Set the notes.
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_owned();
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        Ok(())
    }
}

/// Which category a transaction query should match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Only transactions without a category.
    Uncategorized,
    /// Only transactions in the given category.
    Category(CategoryId),
}

/// Filters for [query_transactions]. The default matches every transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Inclusive range of transaction dates.
    pub date_range: Option<RangeInclusive<Date>>,
    pub category: Option<CategoryFilter>,
    pub transaction_type: Option<TransactionType>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "id, date, description, amount, category_id, transaction_type, account, notes";

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not a number,
/// - [Error::EmptyDescription] if the description is blank,
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
                (date, description, amount, category_id, transaction_type, account, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                builder.date,
                &builder.description,
                builder.amount,
                builder.category_id,
                builder.transaction_type,
                &builder.account,
                &builder.notes,
            ),
            map_transaction_row,
        )
        .map_err(|error| map_category_error(error, builder.category_id))?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Replace every field except the ID of the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
/// - [Error::InvalidAmount], [Error::EmptyDescription] or [Error::InvalidCategory]
///   for invalid values,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\" \
             SET date = ?1, description = ?2, amount = ?3, category_id = ?4, \
                transaction_type = ?5, account = ?6, notes = ?7 \
             WHERE id = ?8 \
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                builder.date,
                &builder.description,
                builder.amount,
                builder.category_id,
                builder.transaction_type,
                &builder.account,
                &builder.notes,
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => map_category_error(error, builder.category_id),
        })
}

/// Delete the transaction `id`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the transactions matching `query`, newest first.
///
/// Transactions on the same date are ordered by descending ID so that the
/// most recently added comes first.
pub fn query_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = match &query.date_range {
        Some(range) => (Some(*range.start()), Some(*range.end())),
        None => (None, None),
    };
    let (category_id, uncategorized_only) = match query.category {
        Some(CategoryFilter::Category(id)) => (Some(id), false),
        Some(CategoryFilter::Uncategorized) => (None, true),
        None => (None, false),
    };

    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" \
             WHERE (?1 IS NULL OR date >= ?1) \
                AND (?2 IS NULL OR date <= ?2) \
                AND (?3 IS NULL OR category_id = ?3) \
                AND (?4 = 0 OR category_id IS NULL) \
                AND (?5 IS NULL OR transaction_type = ?5) \
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(
            (
                start,
                end,
                category_id,
                uncategorized_only,
                query.transaction_type,
            ),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Set the category of many transactions at once.
///
/// **Note**: If you want transactional integrity (all or nothing), pass in a
/// transaction for `connection`.
pub fn set_transaction_categories(
    updates: &[(TransactionId, CategoryId)],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement =
        connection.prepare("UPDATE \"transaction\" SET category_id = ?1 WHERE id = ?2")?;

    for (transaction_id, category_id) in updates {
        statement
            .execute((category_id, transaction_id))
            .map_err(|error| map_category_error(error, Some(*category_id)))?;
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                category_id INTEGER,
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                account TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_date_category
            ON \"transaction\"(date, category_id);",
    )
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        category_id: row.get(4)?,
        transaction_type: row.get(5)?,
        account: row.get(6)?,
        notes: row.get(7)?,
    })
}

fn map_category_error(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCategory(category_id),
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        db::initialize,
        transaction::{
            CategoryFilter, Transaction, TransactionQuery, TransactionType, count_transactions,
            create_transaction, delete_transaction, get_transaction, query_transactions,
            set_transaction_categories, update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(125.50, date!(2026 - 01 - 15), "Grocery Store")
                .account("Everyday")
                .notes("weekly shop"),
            &conn,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, 125.50);
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.account, "Everyday");
        assert_eq!(transaction.notes, "weekly shop");
        assert_eq!(get_transaction(transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let conn = get_test_connection();

        let result = create_transaction(Transaction::build(-1.0, date!(2026 - 01 - 15), "Test"), &conn);

        assert_eq!(result, Err(Error::InvalidAmount(-1.0)));
    }

    #[test]
    fn create_fails_on_blank_description() {
        let conn = get_test_connection();

        let result =
            create_transaction(Transaction::build(12.0, date!(2026 - 01 - 15), "   "), &conn);

        assert_eq!(result, Err(Error::EmptyDescription));
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn update_fails_on_blank_description() {
        let conn = get_test_connection();
        let original =
            create_transaction(Transaction::build(10.0, date!(2026 - 01 - 15), "Old"), &conn)
                .unwrap();

        let result = update_transaction(
            original.id,
            Transaction::build(10.0, date!(2026 - 01 - 15), ""),
            &conn,
        );

        assert_eq!(result, Err(Error::EmptyDescription));
        assert_eq!(get_transaction(original.id, &conn), Ok(original));
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let conn = get_test_connection();
        let category_id = Some(4242);

        let result = create_transaction(
            Transaction::build(123.45, date!(2026 - 01 - 15), "Test").category_id(category_id),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn signed_amount_is_negative_for_expenses() {
        let conn = get_test_connection();
        let expense =
            create_transaction(Transaction::build(10.0, date!(2026 - 01 - 15), "Test"), &conn).unwrap();
        let income = create_transaction(
            Transaction::build(10.0, date!(2026 - 01 - 15), "Test")
                .transaction_type(TransactionType::Income),
            &conn,
        )
        .unwrap();

        assert_eq!(expense.signed_amount(), -10.0);
        assert_eq!(income.signed_amount(), 10.0);
    }

    #[test]
    fn update_keeps_id() {
        let conn = get_test_connection();
        let original =
            create_transaction(Transaction::build(10.0, date!(2026 - 01 - 15), "Old"), &conn)
                .unwrap();

        let updated = update_transaction(
            original.id,
            Transaction::build(20.0, date!(2026 - 01 - 16), "New")
                .transaction_type(TransactionType::Income),
            &conn,
        )
        .expect("Could not update transaction");

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.description, "New");
        assert_eq!(updated.transaction_type, TransactionType::Income);
        assert_eq!(get_transaction(original.id, &conn), Ok(updated));
    }

    #[test]
    fn update_missing_transaction_fails() {
        let conn = get_test_connection();

        let result = update_transaction(
            999,
            Transaction::build(20.0, date!(2026 - 01 - 16), "New"),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let transaction =
            create_transaction(Transaction::build(10.0, date!(2026 - 01 - 15), "Test"), &conn).unwrap();

        delete_transaction(transaction.id, &conn).expect("Could not delete transaction");

        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
        assert_eq!(
            delete_transaction(transaction.id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(Transaction::build(i as f64, today, "Test"), &conn)
                .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn query_orders_newest_first() {
        let conn = get_test_connection();
        let older =
            create_transaction(Transaction::build(1.0, date!(2026 - 01 - 01), "a"), &conn).unwrap();
        let newer =
            create_transaction(Transaction::build(2.0, date!(2026 - 01 - 02), "b"), &conn).unwrap();
        let newer_same_day =
            create_transaction(Transaction::build(3.0, date!(2026 - 01 - 02), "c"), &conn).unwrap();

        let got = query_transactions(&TransactionQuery::default(), &conn).unwrap();

        assert_eq!(got, vec![newer_same_day, newer, older]);
    }

    #[test]
    fn query_filters_by_date_range_inclusive() {
        let conn = get_test_connection();
        for day in 1..=5 {
            let date = date!(2026 - 01 - 01).replace_day(day).unwrap();
            create_transaction(Transaction::build(day as f64, date, "Test"), &conn).unwrap();
        }

        let got = query_transactions(
            &TransactionQuery {
                date_range: Some(date!(2026 - 01 - 02)..=date!(2026 - 01 - 04)),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let amounts = got.iter().map(|t| t.amount).collect::<Vec<_>>();
        assert_eq!(amounts, vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn query_filters_by_category_and_type() {
        let conn = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Pets"),
            TransactionType::Expense,
            "",
            &conn,
        )
        .unwrap();
        let date = date!(2026 - 01 - 10);
        let in_category = create_transaction(
            Transaction::build(30.0, date, "Vet").category_id(Some(category.id)),
            &conn,
        )
        .unwrap();
        let uncategorized =
            create_transaction(Transaction::build(5.0, date, "Mystery"), &conn).unwrap();
        let income = create_transaction(
            Transaction::build(100.0, date, "Refund").transaction_type(TransactionType::Income),
            &conn,
        )
        .unwrap();

        let by_category = query_transactions(
            &TransactionQuery {
                category: Some(CategoryFilter::Category(category.id)),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();
        let without_category = query_transactions(
            &TransactionQuery {
                category: Some(CategoryFilter::Uncategorized),
                transaction_type: Some(TransactionType::Expense),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();
        let incomes = query_transactions(
            &TransactionQuery {
                transaction_type: Some(TransactionType::Income),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(by_category, vec![in_category]);
        assert_eq!(without_category, vec![uncategorized]);
        assert_eq!(incomes, vec![income]);
    }

    #[test]
    fn set_categories_in_batch() {
        let conn = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Pets"),
            TransactionType::Expense,
            "",
            &conn,
        )
        .unwrap();
        let transaction =
            create_transaction(Transaction::build(5.0, date!(2026 - 01 - 10), "Vet"), &conn)
                .unwrap();

        set_transaction_categories(&[(transaction.id, category.id)], &conn).unwrap();

        let got = get_transaction(transaction.id, &conn).unwrap();
        assert_eq!(got.category_id, Some(category.id));
    }
}
