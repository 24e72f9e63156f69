//! Shows the transactions in uploaded files without saving them.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    alert::Alert,
    category::{CategoryId, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, format_currency,
        format_thousands,
    },
    import::{
        candidate::ImportCandidate,
        upload::{
            ImportState, UploadedCandidates, append_problems, read_uploaded_files,
            resolve_category_id,
        },
    },
    rule::get_all_rules,
    transaction::TransactionType,
};

/// A candidate and the name of the category it would be saved with.
struct PreviewRow<'a> {
    candidate: &'a ImportCandidate,
    category_name: Option<&'a str>,
}

/// Route handler that parses uploaded files and renders the transactions
/// that would be imported, without saving anything.
///
/// The categories shown are the ones the import would assign, so keyword
/// rules are applied to candidates without a known category.
pub async fn preview_import_endpoint(
    State(state): State<ImportState>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let UploadedCandidates {
        candidates,
        problems,
        ..
    } = UploadedCandidates::from_files(read_uploaded_files(multipart).await?);

    if candidates.is_empty() {
        let mut details = "No transactions were found in the uploaded files.".to_owned();
        append_problems(&mut details, &problems);

        return Err((
            StatusCode::BAD_REQUEST,
            Alert::Error {
                message: "Nothing to import".to_owned(),
                details,
            }
            .into_html(),
        )
            .into_response());
    }

    let (categories, rules) = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError.into_alert_response()
        })?;

        get_all_categories(&connection)
            .and_then(|categories| Ok((categories, get_all_rules(&connection)?)))
            .map_err(|error| {
                tracing::error!("Failed to load categories for import preview: {error}");
                error.into_alert_response()
            })?
    };

    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let rows = candidates
        .iter()
        .map(|candidate| PreviewRow {
            candidate,
            category_name: resolve_category_id(candidate, &categories, &rules)
                .and_then(|id| category_names.get(&id).copied()),
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Previewing {} transactions with {} problems",
        rows.len(),
        problems.len()
    );

    Ok(import_preview_view(&rows, &problems).into_response())
}

fn import_preview_view(rows: &[PreviewRow<'_>], problems: &[String]) -> Markup {
    html! {
        section id="import-preview-results" class="space-y-4"
        {
            h2 class="text-lg font-semibold"
            {
                "Preview: " (format_thousands(rows.len() as u64)) " transactions"
            }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Nothing has been saved yet. Check the transactions below, then import them."
            }

            @if !problems.is_empty() {
                ul id="import-preview-problems" class="list-disc pl-5 text-sm text-red-600 dark:text-red-400"
                {
                    @for problem in problems {
                        li { (problem) }
                    }
                }
            }

            div class="overflow-x-auto"
            {
                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for row in rows {
                            (preview_row(row))
                        }
                    }
                }
            }

            button
                type="button"
                hx-post=(endpoints::IMPORT)
                hx-include="#import-form"
                hx-encoding="multipart/form-data"
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Import " (format_thousands(rows.len() as u64)) " Transactions"
            }
        }
    }
}

fn preview_row(row: &PreviewRow<'_>) -> Markup {
    let candidate = row.candidate;
    let (signed_amount, amount_style) = match candidate.transaction_type {
        TransactionType::Income => (candidate.amount, INCOME_TEXT_STYLE),
        TransactionType::Expense => (-candidate.amount, EXPENSE_TEXT_STYLE),
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-preview-row
        {
            td class="px-6 py-4 whitespace-nowrap" { (candidate.date) }
            td class=(TABLE_CELL_STYLE) { (candidate.description) }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(name) = row.category_name {
                    span class=(CATEGORY_BADGE_STYLE) { (name) }
                } @else {
                    span class="text-gray-400" { "Uncategorized" }
                }
            }
            td class={"px-6 py-4 text-right tabular-nums " (amount_style)}
            {
                (format_currency(signed_amount))
            }
        }
    }
}
