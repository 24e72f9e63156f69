//! The transactions page: a filterable table of every transaction.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// axum_extra's Query treats empty strings from blank filter inputs as None.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, CategoryId, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE, EXPENSE_TEXT_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, INCOME_TEXT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_EMPTY_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, TABLE_STYLE, base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    transaction::core::{
        CategoryFilter, Transaction, TransactionQuery, TransactionType, query_transactions,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The filters submitted from the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilterParams {
    pub start: Option<Date>,
    pub end: Option<Date>,
    /// Either a category ID or "uncategorized".
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

impl TransactionFilterParams {
    fn to_query(&self) -> Result<TransactionQuery, Error> {
        let date_range = match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                return Err(Error::InvalidDateRange(start, end));
            }
            (Some(start), Some(end)) => Some(start..=end),
            (Some(start), None) => Some(start..=Date::MAX),
            (None, Some(end)) => Some(Date::MIN..=end),
            (None, None) => None,
        };

        let category = self
            .category
            .as_deref()
            .and_then(|category| match category {
                "uncategorized" => Some(CategoryFilter::Uncategorized),
                id => id.parse().ok().map(CategoryFilter::Category),
            });

        Ok(TransactionQuery {
            date_range,
            category,
            transaction_type: self.transaction_type,
        })
    }
}

/// Render the transactions page with the filters in the query string applied.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(params): Query<TransactionFilterParams>,
) -> Result<Response, Error> {
    let query = params.to_query()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = query_transactions(&query, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(transactions_view(&transactions, &categories, &params).into_response())
}

fn transactions_view(
    transactions: &[Transaction],
    categories: &[Category],
    params: &TransactionFilterParams,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let income = sum_of_type(transactions, TransactionType::Income);
    let expenses = sum_of_type(transactions, TransactionType::Expense);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (filter_form(categories, params))

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4" id="transaction-summary"
                {
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Income" }
                        p class={"text-xl font-semibold " (INCOME_TEXT_STYLE)} { (format_currency(income)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Expenses" }
                        p class={"text-xl font-semibold " (EXPENSE_TEXT_STYLE)} { (format_currency(expenses)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Net" }
                        p class="text-xl font-semibold" { (format_currency(income - expenses)) }
                    }
                }

                div class="overflow-x-auto dark:bg-gray-800"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction, &category_names))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td colspan="6" class=(TABLE_EMPTY_CELL_STYLE)
                                    {
                                        "No transactions found. "
                                        a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE)
                                        {
                                            "Import a bank statement"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_row(transaction: &Transaction, category_names: &HashMap<CategoryId, &str>) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );
    let category_name = transaction
        .category_id
        .and_then(|id| category_names.get(&id).copied());
    let amount_style = match transaction.transaction_type {
        TransactionType::Income => INCOME_TEXT_STYLE,
        TransactionType::Expense => EXPENSE_TEXT_STYLE,
    };

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class="px-6 py-4 whitespace-nowrap" { (transaction.date) }

            td class=(TABLE_CELL_STYLE)
            {
                (transaction.description)

                @if !transaction.notes.is_empty() {
                    div class="text-xs text-gray-400" { (transaction.notes) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(name) = category_name {
                    span class=(CATEGORY_BADGE_STYLE) { (name) }
                } @else {
                    span class="text-gray-400" { "Uncategorized" }
                }
            }

            td class=(TABLE_CELL_STYLE) { (transaction.account) }

            td class={"px-6 py-4 text-right tabular-nums " (amount_style)}
            {
                (format_currency(transaction.signed_amount()))
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(&edit_url, &delete_url, &confirm_message, "closest tr"))
                }
            }
        }
    )
}

fn filter_form(categories: &[Category], params: &TransactionFilterParams) -> Markup {
    let selected_category = params.category.as_deref().unwrap_or_default();

    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-1 md:grid-cols-5 gap-4 items-end"
        {
            div
            {
                label for="start" class=(FORM_LABEL_STYLE) { "From" }
                input
                    id="start"
                    name="start"
                    type="date"
                    value=[params.start]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end" class=(FORM_LABEL_STYLE) { "To" }
                input
                    id="end"
                    name="end"
                    type="date"
                    value=[params.end]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                select id="category" name="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All categories" }
                    option value="uncategorized" selected[selected_category == "uncategorized"]
                    {
                        "Uncategorized"
                    }

                    @for category in categories {
                        @let value = category.id.to_string();
                        option value=(value) selected[selected_category == value]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select id="type" name="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Income and expenses" }

                    @for transaction_type in [TransactionType::Income, TransactionType::Expense] {
                        option
                            value=(transaction_type)
                            selected[params.transaction_type == Some(transaction_type)]
                        {
                            (transaction_type.label())
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    )
}

fn sum_of_type(transactions: &[Transaction], transaction_type: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == transaction_type)
        .map(|transaction| transaction.amount)
        .sum()
}
