//! Download the transactions in a report window as a CSV file.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryId, get_all_categories},
    report::window::ReportWindowParams,
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, query_transactions},
};

/// The columns of an exported file, in order. The CSV importer accepts the same columns.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "date",
    "description",
    "amount",
    "category",
    "type",
    "account",
    "notes",
];

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Write `transactions` as CSV text with a header row.
///
/// Amounts are written as magnitudes with two decimal places and the `type`
/// column carries the sign. Transactions without a known category have an
/// empty category cell.
///
/// # Errors
/// Returns [Error::ExportError] if the CSV writer fails.
pub fn export_transactions_csv(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<String, Error> {
    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for transaction in transactions {
        let category = transaction
            .category_id
            .and_then(|id| category_names.get(&id).copied())
            .unwrap_or_default();

        writer
            .write_record([
                transaction.date.to_string().as_str(),
                transaction.description.as_str(),
                format!("{:.2}", transaction.amount).as_str(),
                category,
                transaction.transaction_type.as_str(),
                transaction.account.as_str(),
                transaction.notes.as_str(),
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::ExportError(error.to_string()))
}

/// Respond with the transactions in the selected window as a CSV attachment.
pub async fn export_transactions_endpoint(
    State(state): State<ExportState>,
    Query(params): Query<ReportWindowParams>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let window = params.window(today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let query = TransactionQuery {
        date_range: Some(window.start()..=window.end()),
        ..Default::default()
    };
    let mut transactions = query_transactions(&query, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    // Oldest first reads more naturally in a spreadsheet.
    transactions.reverse();
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let body = export_transactions_csv(&transactions, &categories)
        .inspect_err(|error| tracing::error!("{error}"))?;
    let file_name = format!("transactions_{}_{}.csv", window.start(), window.end());

    tracing::info!(
        "exported {} transactions for {}",
        transactions.len(),
        window.label()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::State,
        http::{StatusCode, header},
    };
    use axum_extra::extract::Query;
    use time::macros::date;

    use crate::{
        category::get_all_categories,
        report::window::ReportWindowParams,
        test_utils::get_test_connection,
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{ExportState, export_transactions_csv, export_transactions_endpoint};

    #[test]
    fn writes_header_and_rows() {
        let connection = get_test_connection();
        let categories = get_all_categories(&connection).unwrap();
        let groceries = categories
            .iter()
            .find(|category| category.name.as_ref() == "Food & Groceries")
            .unwrap();
        let transactions = [
            Transaction {
                id: 1,
                date: date!(2026 - 01 - 15),
                description: "Grocery Store".to_owned(),
                amount: 125.5,
                category_id: Some(groceries.id),
                transaction_type: TransactionType::Expense,
                account: "Everyday".to_owned(),
                notes: String::new(),
            },
            Transaction {
                id: 2,
                date: date!(2026 - 01 - 31),
                description: "Salary, January".to_owned(),
                amount: 5000.0,
                category_id: None,
                transaction_type: TransactionType::Income,
                account: String::new(),
                notes: "paid early".to_owned(),
            },
        ];

        let got = export_transactions_csv(&transactions, &categories).unwrap();

        assert_eq!(
            got,
            "date,description,amount,category,type,account,notes\n\
            2026-01-15,Grocery Store,125.50,Food & Groceries,expense,Everyday,\n\
            2026-01-31,\"Salary, January\",5000.00,,income,,paid early\n"
        );
    }

    #[tokio::test]
    async fn endpoint_sends_attachment_for_window() {
        let connection = get_test_connection();
        create_transaction(
            Transaction::build(10.0, date!(2026 - 01 - 10), "Coffee"),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(20.0, date!(2026 - 02 - 10), "Lunch"),
            &connection,
        )
        .unwrap();
        let state = ExportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };
        let params = ReportWindowParams {
            year: Some(2026),
            month: Some(1),
            ..Default::default()
        };

        let response = export_transactions_endpoint(State(state), Query(params))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"transactions_2026-01-01_2026-01-31.csv\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Coffee"));
        assert!(!text.contains("Lunch"));
    }
}
