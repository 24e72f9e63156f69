//! Templates for transactions that repeat on a schedule, e.g. rent or a salary.
//!
//! Templates are stored for reference only, they do not create transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, category::CategoryId, database_id::DatabaseId, transaction::TransactionType,
};

pub type RecurringTransactionId = DatabaseId;

/// How often a recurring transaction happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(format!("\"{other}\" is not a frequency")),
        }
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A transaction that repeats every `frequency` from `start_date` until the
/// optional `end_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: RecurringTransactionId,
    pub description: String,
    pub amount: f64,
    pub category_id: Option<CategoryId>,
    pub transaction_type: TransactionType,
    pub frequency: Frequency,
    pub start_date: Date,
    pub end_date: Option<Date>,
    /// The next date the transaction is expected. Starts as `start_date`.
    pub next_due_date: Date,
    pub account: String,
    pub notes: String,
}

impl RecurringTransaction {
    /// Start describing a new recurring expense.
    pub fn build(
        amount: f64,
        description: &str,
        frequency: Frequency,
        start_date: Date,
    ) -> RecurringTransactionBuilder {
        RecurringTransactionBuilder {
            amount,
            description: description.to_owned(),
            frequency,
            start_date,
            end_date: None,
            category_id: None,
            transaction_type: TransactionType::Expense,
            account: String::new(),
            notes: String::new(),
        }
    }
}

/// The fields of a recurring transaction that is yet to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTransactionBuilder {
    pub amount: f64,
    pub description: String,
    pub frequency: Frequency,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub category_id: Option<CategoryId>,
    pub transaction_type: TransactionType,
    pub account: String,
    pub notes: String,
}

impl RecurringTransactionBuilder {
    pub fn end_date(mut self, end_date: Option<Date>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn account(mut self, account: &str) -> Self {
        account.clone_into(&mut self.account);
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        notes.clone_into(&mut self.notes);
        self
    }
}

/// Save a recurring transaction. Its next due date is its start date.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not a number,
/// - [Error::InvalidDateRange] if the end date is before the start date,
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_recurring_transaction(
    builder: RecurringTransactionBuilder,
    connection: &Connection,
) -> Result<RecurringTransaction, Error> {
    if !builder.amount.is_finite() || builder.amount < 0.0 {
        return Err(Error::InvalidAmount(builder.amount));
    }

    if let Some(end_date) = builder.end_date.filter(|end_date| *end_date < builder.start_date) {
        return Err(Error::InvalidDateRange(builder.start_date, end_date));
    }

    connection
        .prepare(
            "INSERT INTO recurring_transaction
                (description, amount, category_id, type, frequency, start_date, end_date,
                next_due_date, account, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6, ?8, ?9)
            RETURNING id, description, amount, category_id, type, frequency, start_date,
                end_date, next_due_date, account, notes",
        )?
        .query_row(
            (
                builder.description.trim(),
                builder.amount,
                builder.category_id,
                builder.transaction_type,
                builder.frequency,
                builder.start_date,
                builder.end_date,
                builder.account.trim(),
                builder.notes.trim(),
            ),
            map_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::InvalidCategory(None) => Error::InvalidCategory(builder.category_id),
            error => error,
        })
}

/// Retrieve every recurring transaction, soonest due first.
pub fn get_all_recurring_transactions(
    connection: &Connection,
) -> Result<Vec<RecurringTransaction>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, category_id, type, frequency, start_date,
                end_date, next_due_date, account, notes
            FROM recurring_transaction
            ORDER BY next_due_date ASC, id ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_recurring| maybe_recurring.map_err(Error::from))
        .collect()
}

/// Delete a recurring transaction by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingRecurringTransaction] if it does not exist.
pub fn delete_recurring_transaction(
    id: RecurringTransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM recurring_transaction WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecurringTransaction);
    }

    Ok(())
}

pub fn create_recurring_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_transaction (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            category_id INTEGER,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            frequency TEXT NOT NULL CHECK (frequency IN ('daily', 'weekly', 'monthly', 'yearly')),
            start_date TEXT NOT NULL,
            end_date TEXT,
            next_due_date TEXT NOT NULL,
            account TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<RecurringTransaction, rusqlite::Error> {
    Ok(RecurringTransaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category_id: row.get(3)?,
        transaction_type: row.get(4)?,
        frequency: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        next_due_date: row.get(8)?,
        account: row.get(9)?,
        notes: row.get(10)?,
    })
}
