//! The budgets page: plan a month and compare it with what was spent.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    budget::core::get_budgets_for_month,
    category::{Category, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, EXPENSE_TEXT_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, INCOME_TEXT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_EMPTY_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, delete_button, dollar_input_styles, format_currency,
        format_percentage,
    },
    navigation::NavBar,
    report::{BudgetComparison, ReportWindow, budget_vs_actual},
    timezone::local_today,
    transaction::{TransactionQuery, TransactionType, query_transactions},
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The month shown on the budgets page. Defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetMonthParams {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

/// The URL of the budgets page for the month of `window`.
pub(super) fn budgets_page_url(year: i32, month: u8) -> String {
    format!("{}?year={year}&month={month}", endpoints::BUDGETS_VIEW)
}

/// Render the budgets page for the selected month.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Query(params): Query<BudgetMonthParams>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let window = ReportWindow::month(
        params.year.unwrap_or(today.year()),
        params.month.unwrap_or(u8::from(today.month())),
    )?;
    let year = window.start().year();
    let month = u8::from(window.start().month());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_for_month(year, month, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let transactions = query_transactions(
        &TransactionQuery {
            date_range: Some(window.start()..=window.end()),
            transaction_type: Some(TransactionType::Expense),
            ..Default::default()
        },
        &connection,
    )
    .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let comparisons = budget_vs_actual(&budgets, &transactions, &categories);

    Ok(budgets_view(&window, &comparisons, &categories).into_response())
}

fn budgets_view(
    window: &ReportWindow,
    comparisons: &[BudgetComparison],
    categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let year = window.start().year();
    let month = u8::from(window.start().month());
    let previous = window.previous_month().start();
    let next = window.next_month().start();

    let total_allocated: f64 = comparisons.iter().map(|c| c.allocated).sum();
    let total_spent: f64 = comparisons.iter().map(|c| c.actual).sum();
    let expense_categories = categories
        .iter()
        .filter(|category| category.kind == TransactionType::Expense);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" id="budget-month" { "Budgets for " (window.label()) }

                    div class="flex gap-4"
                    {
                        a
                            href=(budgets_page_url(previous.year(), u8::from(previous.month())))
                            class=(LINK_STYLE)
                        {
                            "Previous month"
                        }
                        a
                            href=(budgets_page_url(next.year(), u8::from(next.month())))
                            class=(LINK_STYLE)
                        {
                            "Next month"
                        }
                    }
                }

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Budgeted" }
                        p class="text-xl font-semibold" { (format_currency(total_allocated)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Spent" }
                        p class={"text-xl font-semibold " (EXPENSE_TEXT_STYLE)} { (format_currency(total_spent)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Remaining" }
                        p class="text-xl font-semibold" { (format_currency(total_allocated - total_spent)) }
                    }
                }

                form
                    hx-post=(endpoints::BUDGETS_API)
                    hx-target-error="#alert-container"
                    class={"flex flex-wrap gap-4 items-end " (CARD_STYLE)}
                {
                    input type="hidden" name="year" value=(year);
                    input type="hidden" name="month" value=(month);

                    div class="grow"
                    {
                        label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                        select id="category_id" name="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for category in expense_categories {
                                option value=(category.id) { (category.name) }
                            }
                        }
                    }

                    div class="grow"
                    {
                        label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                        div class="input-wrapper"
                        {
                            input
                                id="amount"
                                type="number"
                                name="amount"
                                min="0"
                                step="0.01"
                                placeholder="0.00"
                                required
                                class=(FORM_TEXT_INPUT_STYLE);
                        }
                    }

                    div
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Set Budget" }
                    }
                }

                div class="overflow-x-auto dark:bg-gray-800"
                {
                    table class=(TABLE_STYLE) id="budget-table"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class="px-6 py-4 text-right" { "Budget" }
                                th scope="col" class="px-6 py-4 text-right" { "Spent" }
                                th scope="col" class="px-6 py-4 text-right" { "Remaining" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Progress" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for comparison in comparisons {
                                (budget_row(comparison))
                            }

                            @if comparisons.is_empty() {
                                tr
                                {
                                    td colspan="6" class=(TABLE_EMPTY_CELL_STYLE)
                                    {
                                        "No budgets set for this month."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Budgets", &[dollar_input_styles()], &content)
}

fn budget_row(comparison: &BudgetComparison) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::BUDGET, comparison.budget_id);
    let confirm_message = format!(
        "Are you sure you want to delete the budget for '{}'?",
        comparison.category_name
    );
    let bar_width = comparison.percentage_used.clamp(0.0, 100.0);
    let (bar_style, remaining_style) = if comparison.is_over_budget() {
        ("bg-red-500", EXPENSE_TEXT_STYLE)
    } else if comparison.percentage_used >= 80.0 {
        ("bg-yellow-400", "")
    } else {
        ("bg-green-500", INCOME_TEXT_STYLE)
    };

    html!(
        tr class=(TABLE_ROW_STYLE) data-budget-id=(comparison.budget_id)
        {
            td class=(TABLE_CELL_STYLE) { (comparison.category_name) }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(comparison.allocated)) }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(comparison.actual)) }
            td class={"px-6 py-4 text-right tabular-nums " (remaining_style)}
            {
                (format_currency(comparison.difference))
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="w-full h-2 rounded bg-gray-200 dark:bg-gray-700"
                {
                    div class={"h-2 rounded " (bar_style)} style={"width: " (format!("{bar_width:.0}")) "%"} {}
                }
                span class="text-xs" { (format_percentage(comparison.percentage_used)) " used" }
            }
            td class=(TABLE_CELL_STYLE)
            {
                (delete_button(&delete_url, &confirm_message, "closest tr"))
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error,
        budget::set_budget,
        category::get_all_categories,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_select, assert_hx_endpoint, assert_valid_html,
            get_test_connection, must_get_form, parse_html_document,
        },
        transaction::{Transaction, create_transaction},
    };

    use super::{BudgetMonthParams, BudgetsPageState, get_budgets_page};

    fn params(year: i32, month: u8) -> BudgetMonthParams {
        BudgetMonthParams {
            year: Some(year),
            month: Some(month),
        }
    }

    #[tokio::test]
    async fn shows_budget_against_spending() {
        let connection = get_test_connection();
        let groceries = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .find(|category| category.name.as_ref() == "Food & Groceries")
            .unwrap();
        set_budget(groceries.id, 2026, 1, 500.0, &connection).unwrap();
        create_transaction(
            Transaction::build(125.5, date!(2026 - 01 - 15), "Grocery Store")
                .category_id(Some(groceries.id)),
            &connection,
        )
        .unwrap();
        let state = BudgetsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_budgets_page(State(state), Query(params(2026, 1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::BUDGETS_API, "hx-post");
        assert_form_select(&form, "category_id");
        assert_form_input(&form, "amount", "number");

        let rows = document
            .select(&Selector::parse("#budget-table tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 1);
        let text = rows[0].text().collect::<String>();
        assert!(text.contains("Food & Groceries"));
        assert!(text.contains("$500.00"));
        assert!(text.contains("$125.50"));
        assert!(text.contains("$374.50"));
    }

    #[tokio::test]
    async fn shows_empty_state_for_month_without_budgets() {
        let state = BudgetsPageState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_budgets_page(State(state), Query(params(2026, 2)))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let heading = document
            .select(&Selector::parse("#budget-month").unwrap())
            .next()
            .unwrap();
        assert_eq!(heading.text().collect::<String>(), "Budgets for February 2026");
        let row = document
            .select(&Selector::parse("#budget-table tbody tr").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            row.text().collect::<String>().trim(),
            "No budgets set for this month."
        );
    }

    #[tokio::test]
    async fn rejects_invalid_month() {
        let state = BudgetsPageState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_budgets_page(State(state), Query(params(2026, 0))).await;

        assert!(matches!(result, Err(Error::InvalidMonth(0))));
    }
}
