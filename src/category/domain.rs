//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId, transaction::TransactionType};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// empty after trimming whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// A label grouping transactions for budgeting and reporting
/// (e.g., 'Food & Groceries', 'Income').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    /// Whether the category groups income or expenses.
    pub kind: TransactionType,
    /// May be empty.
    pub description: String,
}

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub kind: TransactionType,
    #[serde(default)]
    pub description: String,
}

/// Find the category that best matches the free text `name`.
///
/// An exact, case-insensitive match wins. Failing that, the first category
/// whose name contains `name`, or is contained in `name`, is returned.
/// `categories` is searched in order, so pass them sorted by name for
/// predictable results.
pub fn find_category_by_name<'a>(name: &str, categories: &'a [Category]) -> Option<&'a Category> {
    let needle = name.trim().to_lowercase();

    if needle.is_empty() {
        return None;
    }

    let lowercase_names = categories
        .iter()
        .map(|category| category.name.as_ref().to_lowercase())
        .collect::<Vec<_>>();

    if let Some(index) = lowercase_names.iter().position(|name| *name == needle) {
        return categories.get(index);
    }

    lowercase_names
        .iter()
        .position(|name| name.contains(&needle) || needle.contains(name.as_str()))
        .and_then(|index| categories.get(index))
}
