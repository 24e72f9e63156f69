//! The endpoint that imports transactions from uploaded CSV and PDF files.

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    category::{Category, CategoryId, find_category_by_name, get_all_categories},
    html::format_thousands,
    import::{
        candidate::{ImportCandidate, ImportResult},
        csv::parse_csv_bytes,
        pdf::parse_pdf,
    },
    rule::{Rule, get_all_rules, match_category},
    transaction::{Transaction, TransactionBuilder, create_transaction},
};

/// The most problems listed in the alert after an import.
const MAX_LISTED_PROBLEMS: usize = 10;

/// The state needed to import transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Csv,
    Pdf,
}

impl FileKind {
    fn detect(file_name: &str, content_type: &str) -> Option<Self> {
        let file_name = file_name.to_lowercase();

        if content_type == "text/csv" || file_name.ends_with(".csv") {
            Some(FileKind::Csv)
        } else if content_type == "application/pdf" || file_name.ends_with(".pdf") {
            Some(FileKind::Pdf)
        } else {
            None
        }
    }
}

/// An uploaded file after parsing.
pub(super) struct ParsedFile {
    pub file_name: String,
    pub result: ImportResult,
}

/// The candidates of every uploaded file, with the problems found while
/// parsing them prefixed by the file name.
#[derive(Debug, Default)]
pub(super) struct UploadedCandidates {
    pub candidates: Vec<ImportCandidate>,
    pub problems: Vec<String>,
    /// The number of rows that could not be parsed.
    pub rejected: usize,
}

impl UploadedCandidates {
    pub fn from_files(parsed_files: Vec<ParsedFile>) -> Self {
        let mut uploaded = Self::default();

        for ParsedFile { file_name, result } in parsed_files {
            uploaded.problems.extend(
                result
                    .diagnostics
                    .iter()
                    .map(|diagnostic| format!("{file_name}: {diagnostic}")),
            );
            uploaded.problems.extend(
                result
                    .rejected
                    .iter()
                    .map(|row| format!("{file_name}: line {}: {}", row.line, row.reason)),
            );
            uploaded.rejected += result.rejected.len();
            uploaded.candidates.extend(result.transactions);
        }

        uploaded
    }
}

/// The outcome of saving the candidates of one or more files.
#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    /// The number of transactions that were saved.
    pub imported: usize,
    /// Messages for the candidates that could not be saved.
    pub failures: Vec<String>,
}

/// Save `candidates` as transactions, one at a time.
///
/// Category text is resolved with [find_category_by_name]. Candidates with no
/// category, or a category that does not exist, are categorised with the
/// keyword rules. A candidate that fails to save is recorded in
/// [ImportSummary::failures] and the rest are still saved.
///
/// # Errors
/// Returns an error if the categories or rules cannot be loaded.
pub fn import_candidates(
    candidates: Vec<ImportCandidate>,
    connection: &Connection,
) -> Result<ImportSummary, Error> {
    let categories = get_all_categories(connection)?;
    let rules = get_all_rules(connection)?;
    let mut summary = ImportSummary::default();

    for candidate in candidates {
        let description = candidate.description.clone();

        match create_transaction(to_builder(candidate, &categories, &rules), connection) {
            Ok(_) => summary.imported += 1,
            Err(error) => {
                tracing::debug!("could not import transaction \"{description}\": {error}");
                summary
                    .failures
                    .push(format!("Error importing {description}: {error}"));
            }
        }
    }

    Ok(summary)
}

/// The category a candidate is saved with: its own category text if that
/// names a category, otherwise the first matching keyword rule.
pub(super) fn resolve_category_id(
    candidate: &ImportCandidate,
    categories: &[Category],
    rules: &[Rule],
) -> Option<CategoryId> {
    candidate
        .category_name
        .as_deref()
        .and_then(|name| find_category_by_name(name, categories))
        .map(|category| category.id)
        .or_else(|| match_category(&candidate.description, rules))
}

fn to_builder(
    candidate: ImportCandidate,
    categories: &[Category],
    rules: &[Rule],
) -> TransactionBuilder {
    let category_id = resolve_category_id(&candidate, categories, rules);

    Transaction::build(candidate.amount, candidate.date, &candidate.description)
        .category_id(category_id)
        .transaction_type(candidate.transaction_type)
        .account(&candidate.account)
        .notes(&candidate.notes)
}

/// Route handler for importing transactions from one or more CSV or PDF files.
///
/// Responds with an alert listing how many transactions were imported and
/// the first few rows that were skipped.
pub async fn import_transactions_endpoint(
    State(state): State<ImportState>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let start_time = Instant::now();
    let UploadedCandidates {
        candidates,
        mut problems,
        rejected,
    } = UploadedCandidates::from_files(read_uploaded_files(multipart).await?);

    let candidate_count = candidates.len();

    let summary = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError.into_alert_response()
        })?;

        import_candidates(candidates, &connection).map_err(|error| {
            tracing::error!("Failed to import transactions: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Import failed".to_owned(),
                    details: "Check the server logs for more details.".to_owned(),
                }
                .into_html(),
            )
                .into_response()
        })?
    };

    let skipped = rejected + summary.failures.len();
    problems.extend(summary.failures);
    let duration_ms = format_thousands(start_time.elapsed().as_millis() as u64);

    tracing::info!(
        "Import completed in {duration_ms}ms: {} of {candidate_count} transactions imported, {skipped} skipped",
        summary.imported
    );

    let mut details = format!(
        "Imported {} transactions. Skipped {skipped}.",
        format_thousands(summary.imported as u64)
    );
    append_problems(&mut details, &problems);

    if summary.imported == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Alert::Error {
                message: "No transactions were imported".to_owned(),
                details,
            }
            .into_html(),
        )
            .into_response());
    }

    Ok((
        StatusCode::CREATED,
        Alert::Success {
            message: "Import completed successfully!".to_owned(),
            details,
        }
        .into_html(),
    )
        .into_response())
}

/// Append the first few `problems` to the alert `details`.
pub(super) fn append_problems(details: &mut String, problems: &[String]) {
    for problem in problems.iter().take(MAX_LISTED_PROBLEMS) {
        details.push(' ');
        details.push_str(problem);
        details.push('.');
    }
}

/// Read and parse every file in the form.
///
/// # Errors
/// Responds with an error alert if the form cannot be read, a file is not a
/// CSV or PDF, or no files were uploaded.
pub(super) async fn read_uploaded_files(
    mut multipart: Multipart,
) -> Result<Vec<ParsedFile>, Response> {
    let mut parsed_files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|error| {
        tracing::error!("could not read multipart field: {error}");
        Error::MultipartError(error.to_string()).into_alert_response()
    })? {
        let parsed_file = parse_multipart_field(field)
            .await
            .map_err(Error::into_alert_response)?;
        parsed_files.push(parsed_file);
    }

    if parsed_files.is_empty() {
        return Err(
            Error::MultipartError("No files were uploaded.".to_owned()).into_alert_response(),
        );
    }

    Ok(parsed_files)
}

async fn parse_multipart_field(field: Field<'_>) -> Result<ParsedFile, Error> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field.content_type().unwrap_or_default().to_owned();

    let Some(kind) = FileKind::detect(&file_name, &content_type) else {
        tracing::debug!("Rejected file '{file_name}' with content type '{content_type}'");
        return Err(Error::UnsupportedFileType(file_name));
    };

    let bytes = field.bytes().await.map_err(|error| {
        tracing::error!("Could not read file '{file_name}': {error}");
        Error::MultipartError(error.to_string())
    })?;

    tracing::debug!("Received file '{file_name}' that is {} bytes", bytes.len());

    let result = match kind {
        FileKind::Csv => parse_csv_bytes(&bytes),
        FileKind::Pdf => parse_pdf(&bytes),
    };

    Ok(ParsedFile { file_name, result })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Multipart, State},
        http::StatusCode,
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        category::get_all_categories,
        endpoints,
        test_utils::{
            assert_content_type, assert_valid_html, get_test_connection, must_make_multipart,
            parse_html_fragment,
        },
        transaction::{TransactionQuery, TransactionType, count_transactions, query_transactions},
    };

    use super::{ImportState, import_transactions_endpoint};

    const GROCERY_CSV: &str = "date,description,amount,category,type\n\
        2026-01-15,Grocery Store,125.50,Food & Groceries,expense\n";

    const MIXED_CSV: &str = "date,description,amount,category\n\
        2026-01-10,Netflix,15.99,\n\
        2026-01-11,Mystery shop,20.00,Not A Category\n\
        bad date,Broken,1.00,\n\
        2026-01-12,Corner Cafe,4.50,\n";

    fn get_state() -> ImportState {
        ImportState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn imports_csv_row() {
        let state = get_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            upload(&[("statement.csv", "text/csv", GROCERY_CSV)]).await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_content_type(&response, "text/html; charset=utf-8");
        assert_alert_message(response, "Import completed successfully!").await;

        let connection = state.db_connection.lock().unwrap();
        let transactions = query_transactions(&TransactionQuery::default(), &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        let transaction = &transactions[0];
        let categories = get_all_categories(&connection).unwrap();
        let category = categories
            .iter()
            .find(|category| Some(category.id) == transaction.category_id)
            .expect("transaction should have a category");
        assert_eq!(transaction.amount, 125.5);
        assert_eq!(transaction.date, date!(2026 - 01 - 15));
        assert_eq!(category.name.as_ref(), "Food & Groceries");
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
    }

    #[tokio::test]
    async fn skips_bad_rows_and_categorises_with_rules() {
        let state = get_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            upload(&[("bank.CSV", "application/octet-stream", MIXED_CSV)]).await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let html = parse_html_fragment(response).await;
        let details = html
            .select(&Selector::parse("p.text-sm").unwrap())
            .next()
            .expect("No alert details found")
            .text()
            .collect::<String>();
        assert!(details.contains("Imported 3 transactions. Skipped 1."), "got {details}");
        assert!(details.contains("bank.CSV: line 4"), "got {details}");

        let connection = state.db_connection.lock().unwrap();
        let categories = get_all_categories(&connection).unwrap();
        let category_of = |description: &str| {
            let transactions =
                query_transactions(&TransactionQuery::default(), &connection).unwrap();
            let category_id = transactions
                .iter()
                .find(|transaction| transaction.description == description)
                .unwrap()
                .category_id;
            categories
                .iter()
                .find(|category| Some(category.id) == category_id)
                .map(|category| category.name.as_ref().to_owned())
        };
        assert_eq!(category_of("Netflix"), Some("Entertainment".to_owned()));
        assert_eq!(category_of("Mystery shop"), Some("Shopping".to_owned()));
        assert_eq!(category_of("Corner Cafe"), None);
    }

    #[tokio::test]
    async fn importing_twice_creates_two_sets() {
        let state = get_state();

        for _ in 0..2 {
            import_transactions_endpoint(
                State(state.clone()),
                upload(&[("statement.csv", "text/csv", GROCERY_CSV)]).await,
            )
            .await
            .unwrap();
        }

        let count = count_transactions(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn imports_multiple_files() {
        let state = get_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            upload(&[
                ("one.csv", "text/csv", GROCERY_CSV),
                ("two.csv", "text/csv", MIXED_CSV),
            ])
            .await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let count = count_transactions(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn missing_column_imports_nothing() {
        let state = get_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            upload(&[("statement.csv", "text/csv", "when,what\n2026-01-01,x\n")])
                .await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_message(response, "No transactions were imported").await;
        let count = count_transactions(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn unsupported_file_type_is_rejected() {
        let state = get_state();

        let response = import_transactions_endpoint(
            State(state.clone()),
            upload(&[("notes.txt", "text/plain", "hello")]).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_message(response, "Unsupported file type").await;
    }

    #[tokio::test]
    async fn sql_error_renders_error_message() {
        // No tables, so loading the categories fails.
        let state = ImportState {
            db_connection: Arc::new(Mutex::new(Connection::open_in_memory().unwrap())),
        };

        let response = import_transactions_endpoint(
            State(state),
            upload(&[("statement.csv", "text/csv", GROCERY_CSV)]).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_alert_message(response, "Import failed").await;
    }

    async fn upload(files: &[(&str, &str, &str)]) -> Multipart {
        must_make_multipart(endpoints::IMPORT, files).await
    }

    async fn assert_alert_message(response: Response, expected_message: &str) {
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let message = html
            .select(&Selector::parse("p.font-semibold").unwrap())
            .next()
            .expect("No alert message found")
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), expected_message);
    }
}
