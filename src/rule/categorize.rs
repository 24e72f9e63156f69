//! Keyword auto-categorisation of transaction descriptions.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    Error,
    alert::Alert,
    category::CategoryId,
    rule::{
        db::get_all_rules,
        models::{Rule, RuleState},
    },
    transaction::{
        CategoryFilter, TransactionId, TransactionQuery, query_transactions,
        set_transaction_categories,
    },
};

/// The category of the first rule whose keyword appears in `description`,
/// ignoring case.
///
/// `rules` must be in precedence order.
pub fn match_category(description: &str, rules: &[Rule]) -> Option<CategoryId> {
    let description = description.to_lowercase();

    rules
        .iter()
        .find(|rule| !rule.keyword.is_empty() && description.contains(&rule.keyword.to_lowercase()))
        .map(|rule| rule.category_id)
}

/// Result of applying the rules to stored transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorizeResult {
    /// Number of uncategorised transactions that were checked.
    pub transactions_checked: usize,
    /// Number of transactions that were given a category.
    pub transactions_categorized: usize,
}

/// Assign a category to every uncategorised transaction whose description
/// matches a rule. Transactions that already have a category are left alone.
///
/// # Errors
/// Returns an error if there are database errors during the operation.
pub fn categorize_uncategorized_transactions(
    connection: &Connection,
) -> Result<CategorizeResult, Error> {
    let rules = get_all_rules(connection)?;
    let transactions = query_transactions(
        &TransactionQuery {
            category: Some(CategoryFilter::Uncategorized),
            ..Default::default()
        },
        connection,
    )?;

    let updates: Vec<(TransactionId, CategoryId)> = transactions
        .iter()
        .filter_map(|transaction| {
            match_category(&transaction.description, &rules)
                .map(|category_id| (transaction.id, category_id))
        })
        .collect();

    set_transaction_categories(&updates, connection)?;

    Ok(CategorizeResult {
        transactions_checked: transactions.len(),
        transactions_categorized: updates.len(),
    })
}

/// A route handler for applying the rules to uncategorised transactions.
pub async fn apply_rules_endpoint(State(state): State<RuleState>) -> Response {
    let start_time = std::time::Instant::now();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match categorize_uncategorized_transactions(&connection) {
        Ok(result) => {
            let duration = start_time.elapsed();
            tracing::info!(
                "Auto-categorisation completed in {}ms: {} transactions checked, {} categorised",
                duration.as_millis(),
                result.transactions_checked,
                result.transactions_categorized
            );

            let message = if result.transactions_categorized > 0 {
                "Rules applied successfully!".to_owned()
            } else {
                "Rules applied - no transactions matched.".to_owned()
            };

            let details = format!(
                "Categorised {} of {} uncategorised transactions",
                result.transactions_categorized, result.transactions_checked
            );

            Alert::Success { message, details }.into_response()
        }
        Err(error) => {
            tracing::error!("Failed to apply rules to uncategorised transactions: {error}");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Applying rules failed".to_owned(),
                    details: "Please try again.".to_owned(),
                }
                .into_html(),
            )
                .into_response()
        }
    }
}
