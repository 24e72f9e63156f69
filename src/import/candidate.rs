//! The output of the statement parsers.

use time::Date;

use crate::transaction::TransactionType;

/// A transaction read from a statement that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidate {
    pub date: Date,
    pub description: String,
    /// Always a non-negative magnitude.
    pub amount: f64,
    /// The category text from the statement, if any. Resolved to a category
    /// when the candidate is imported.
    pub category_name: Option<String>,
    pub transaction_type: TransactionType,
    pub account: String,
    pub notes: String,
}

/// A row that could not be turned into a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// The 1-based line in the source text.
    pub line: u64,
    pub reason: String,
}

/// Everything a parser found in a file.
///
/// `diagnostics` holds problems with the file as a whole, e.g. a missing
/// column or an unreadable PDF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    pub transactions: Vec<ImportCandidate>,
    pub rejected: Vec<RejectedRow>,
    pub diagnostics: Vec<String>,
}

impl ImportResult {
    /// A result with no transactions and a single diagnostic.
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![diagnostic.into()],
            ..Default::default()
        }
    }
}

/// Parse a money amount such as "$1,234.50", "-12.00" or "(45.00)".
///
/// Dollar signs, thousands separators and whitespace are ignored. An amount in
/// parentheses is negative. Returns `None` for anything that is not a finite
/// number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    let (cleaned, negate) = match cleaned
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (inner, true),
        None => (cleaned.as_str(), false),
    };

    let amount = cleaned.parse::<f64>().ok().filter(|amount| amount.is_finite())?;

    Some(if negate { -amount } else { amount })
}
