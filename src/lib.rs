//! Family Budget is a web app for tracking a household's transactions,
//! monthly budgets and savings goals.
//!
//! The library serves HTML pages directly. Bank statements can be imported
//! from CSV or PDF files, and the reports page summarises spending per
//! category and over time.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod budget;
mod category;
mod chart;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod html;
mod import;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod recurring;
mod report;
mod routing;
mod rule;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use budget::{Budget, set_budget};
pub use category::{Category, CategoryName, find_category_by_name, get_all_categories};
pub use db::initialize as initialize_db;
pub use goal::{Goal, create_goal, update_goal_progress};
pub use import::{
    ImportCandidate, ImportResult, ImportSummary, RejectedRow, import_candidates, parse_csv,
    parse_csv_bytes, parse_pdf,
};
pub use logging::logging_middleware;
pub use recurring::{
    Frequency, RecurringTransaction, create_recurring_transaction, delete_recurring_transaction,
    get_all_recurring_transactions,
};
pub use report::{
    BudgetComparison, CategoryTotal, DailyTotal, MonthTotal, MonthlySummary, ReportWindow,
    budget_vs_actual, category_totals, daily_trend, export_transactions_csv, monthly_comparison,
    monthly_summary,
};
pub use routing::build_router;
pub use transaction::{Transaction, TransactionType, create_transaction};

use crate::{
    alert::Alert, category::CategoryId, html::error_view,
    internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A category with the same name already exists.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID did not match a category in the database.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The category is still referenced by transactions, budgets, rules or
    /// recurring transactions.
    #[error("the category \"{0}\" is still in use")]
    CategoryInUse(String),

    /// An empty string was used for a rule keyword.
    #[error("Keyword cannot be empty")]
    EmptyRuleKeyword,

    /// An empty string was used for a goal name.
    #[error("Goal name cannot be empty")]
    EmptyGoalName,

    /// A transaction description was empty or only whitespace.
    #[error("Transaction description cannot be empty")]
    EmptyDescription,

    /// An amount was negative, zero where a positive amount is needed, or not a number.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// A month number outside of 1 to 12.
    #[error("{0} is not a valid month")]
    InvalidMonth(u8),

    /// The start of a date range is after its end.
    #[error("the start date {0} is after the end date {1}")]
    InvalidDateRange(Date, Date),

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// An uploaded file was neither a CSV nor a PDF.
    #[error("unsupported file type for \"{0}\"")]
    UnsupportedFileType(String),

    /// Transactions could not be written out as CSV.
    #[error("could not export transactions: {0}")]
    ExportError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to delete a rule that does not exist
    #[error("tried to delete a rule that is not in the database")]
    DeleteMissingRule,

    /// Tried to delete a recurring transaction that does not exist
    #[error("tried to delete a recurring transaction that is not in the database")]
    DeleteMissingRecurringTransaction,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(None),
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::InvalidDateRange(start, end) => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Bad Request",
                    "400",
                    "Invalid date range",
                    &format!("The start date {start} must not be after the end date {end}."),
                ),
            )
                .into_response(),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Bad Request",
                    "400",
                    "Invalid month",
                    &format!("{month} is not a month. Pick a month between 1 and 12."),
                ),
            )
                .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for htmx requests.
    fn into_alert_response(self) -> Response {
        let (status_code, message, details) = match self {
            Error::EmptyCategoryName | Error::EmptyRuleKeyword | Error::EmptyGoalName => (
                StatusCode::BAD_REQUEST,
                "Missing name".to_owned(),
                format!("{self}."),
            ),
            Error::EmptyDescription => (
                StatusCode::BAD_REQUEST,
                "Missing description".to_owned(),
                "Enter a description for the transaction.".to_owned(),
            ),
            Error::DuplicateCategoryName(name) => (
                StatusCode::BAD_REQUEST,
                "Duplicate category name".to_owned(),
                format!(
                    "The category {name} already exists. \
                    Choose a different name, or edit the existing category."
                ),
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                "Invalid category".to_owned(),
                match category_id {
                    Some(id) => format!("Could not find a category with the ID {id}."),
                    None => "The selected category does not exist.".to_owned(),
                },
            ),
            Error::CategoryInUse(name) => (
                StatusCode::CONFLICT,
                "Could not delete category".to_owned(),
                format!(
                    "{name} is still used by transactions, budgets, rules or recurring \
                    transactions. Reassign or delete those first."
                ),
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                "Invalid amount".to_owned(),
                format!("{amount} is not a valid amount. Enter a positive number."),
            ),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                "Invalid month".to_owned(),
                format!("{month} is not a month. Pick a month between 1 and 12."),
            ),
            Error::InvalidDateRange(start, end) => (
                StatusCode::BAD_REQUEST,
                "Invalid date range".to_owned(),
                format!("The start date {start} must not be after the end date {end}."),
            ),
            Error::UnsupportedFileType(file_name) => (
                StatusCode::BAD_REQUEST,
                "Unsupported file type".to_owned(),
                format!("{file_name} is not a CSV or PDF file."),
            ),
            Error::MultipartError(reason) => (
                StatusCode::BAD_REQUEST,
                "Could not read the uploaded files".to_owned(),
                reason,
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings".to_owned(),
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "Not found".to_owned(),
                "The requested item could not be found.".to_owned(),
            ),
            Error::UpdateMissingTransaction => missing("update", "transaction"),
            Error::DeleteMissingTransaction => missing("delete", "transaction"),
            Error::UpdateMissingCategory => missing("update", "category"),
            Error::DeleteMissingCategory => missing("delete", "category"),
            Error::DeleteMissingBudget => missing("delete", "budget"),
            Error::UpdateMissingGoal => missing("update", "goal"),
            Error::DeleteMissingGoal => missing("delete", "goal"),
            Error::DeleteMissingRule => missing("delete", "rule"),
            Error::DeleteMissingRecurringTransaction => missing("delete", "recurring transaction"),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_owned(),
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        (status_code, Alert::Error { message, details }.into_html()).into_response()
    }
}

fn missing(action: &str, item: &str) -> (StatusCode, String, String) {
    let details = if action == "delete" {
        format!(
            "The {item} could not be found. \
            Try refreshing the page to see if the {item} has already been deleted."
        )
    } else {
        format!("The {item} could not be found.")
    };

    (
        StatusCode::NOT_FOUND,
        format!("Could not {action} {item}"),
        details,
    )
}
