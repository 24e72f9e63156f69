//! Database operations for categories.

use std::collections::HashMap;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    transaction::TransactionType,
};

/// The categories a new database starts with.
const DEFAULT_CATEGORIES: [(&str, TransactionType, &str); 12] = [
    ("Housing", TransactionType::Expense, "Rent, mortgage, utilities"),
    ("Food & Groceries", TransactionType::Expense, "Groceries, dining out"),
    (
        "Transportation",
        TransactionType::Expense,
        "Gas, car maintenance, public transport",
    ),
    ("Healthcare", TransactionType::Expense, "Medical expenses, insurance"),
    ("Entertainment", TransactionType::Expense, "Movies, hobbies, subscriptions"),
    ("Education", TransactionType::Expense, "School fees, books, courses"),
    ("Shopping", TransactionType::Expense, "Clothing, household items"),
    ("Bills & Utilities", TransactionType::Expense, "Phone, internet, electricity"),
    ("Personal Care", TransactionType::Expense, "Haircuts, toiletries"),
    ("Savings", TransactionType::Expense, "Savings contributions"),
    ("Income", TransactionType::Income, "Salary, freelance, other income"),
    ("Other", TransactionType::Expense, "Miscellaneous expenses"),
];

/// Create a category and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateCategoryName] if a category with the same name
/// (ignoring case) already exists.
pub fn create_category(
    name: CategoryName,
    kind: TransactionType,
    description: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, kind, description) VALUES (?1, ?2, ?3);",
            (name.as_ref(), kind, description.trim()),
        )
        .map_err(|error| map_unique_error(error, &name))?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        kind,
        description: description.trim().to_owned(),
    })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, kind, description FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, kind, description FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update every field of a category except its ID.
pub fn update_category(
    category_id: CategoryId,
    name: CategoryName,
    kind: TransactionType,
    description: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, kind = ?2, description = ?3 WHERE id = ?4",
            (name.as_ref(), kind, description.trim(), category_id),
        )
        .map_err(|error| map_unique_error(error, &name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if the category does not exist,
/// - [Error::CategoryInUse] if any transaction, budget, rule or recurring
///   transaction refers to the category.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let category = match get_category(category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    };

    let reference_count: i64 = connection.query_row(
        "SELECT (SELECT COUNT(1) FROM \"transaction\" WHERE category_id = ?1)
            + (SELECT COUNT(1) FROM budget WHERE category_id = ?1)
            + (SELECT COUNT(1) FROM category_rule WHERE category_id = ?1)
            + (SELECT COUNT(1) FROM recurring_transaction WHERE category_id = ?1)",
        [category_id],
        |row| row.get(0),
    )?;

    if reference_count > 0 {
        return Err(Error::CategoryInUse(category.name.to_string()));
    }

    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Count the transactions in each category. Categories without
/// transactions are absent from the map.
pub fn count_transactions_per_category(
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM \"transaction\" \
            WHERE category_id IS NOT NULL GROUP BY category_id",
        )?
        .query_map((), |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

/// Insert the default categories if the category table is empty.
pub fn seed_default_categories(connection: &Connection) -> Result<(), Error> {
    let count: i64 = connection.query_row("SELECT COUNT(1) FROM category", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    let mut statement =
        connection.prepare("INSERT INTO category (name, kind, description) VALUES (?1, ?2, ?3)")?;

    for (name, kind, description) in DEFAULT_CATEGORIES {
        statement.execute((name, kind, description))?;
    }

    tracing::debug!("Seeded {} default categories", DEFAULT_CATEGORIES.len());

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            kind TEXT NOT NULL DEFAULT 'expense' CHECK (kind IN ('income', 'expense')),
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let kind = row.get(2)?;
    let description = row.get(3)?;

    Ok(Category {
        id,
        name,
        kind,
        description,
    })
}

fn map_unique_error(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategoryName(name.to_string()),
        error => error.into(),
    }
}
