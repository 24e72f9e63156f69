//! The reports page: summary, charts and category totals for a window.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::{Budget, get_budgets_for_month},
    category::get_all_categories,
    chart::{ChartView, charts_script, charts_view},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, EXPENSE_TEXT_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, INCOME_TEXT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_EMPTY_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, format_currency, format_percentage,
    },
    navigation::NavBar,
    report::{
        aggregation::{
            CategoryTotal, MonthlySummary, budget_vs_actual, category_totals, daily_trend,
            monthly_comparison, monthly_summary,
        },
        charts::{
            budget_vs_actual_chart, category_comparison_chart, category_share_chart,
            daily_trend_chart, monthly_comparison_chart,
        },
        window::{ReportWindow, ReportWindowParams},
    },
    timezone::local_today,
    transaction::{TransactionQuery, TransactionType, query_transactions},
};

/// How many months the monthly comparison chart covers, ending with the
/// last month of the report window.
const COMPARISON_MONTHS: usize = 6;

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the reports page for the window selected by the query string.
pub async fn get_reports_page(
    State(state): State<ReportsPageState>,
    Query(params): Query<ReportWindowParams>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let window = params.window(today)?;

    let mut first_compared_month = ReportWindow::month_of(window.end());
    for _ in 1..COMPARISON_MONTHS {
        first_compared_month = first_compared_month.previous_month();
    }
    let query_start = first_compared_month.start().min(window.start());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = query_transactions(
        &TransactionQuery {
            date_range: Some(query_start..=window.end()),
            ..Default::default()
        },
        &connection,
    )
    .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let budgets = budgets_in_window(&window, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    drop(connection);

    let summary = monthly_summary(&transactions, &window);
    let expense_totals = category_totals(
        &transactions,
        &categories,
        &window,
        Some(TransactionType::Expense),
    );
    let comparisons = budget_vs_actual(&budgets, &transactions, &categories);
    let trend = daily_trend(&transactions, &window);
    let months = monthly_comparison(
        &transactions,
        first_compared_month.start(),
        COMPARISON_MONTHS,
    );

    let label = window.label();
    let charts = [
        ChartView::new(
            "category-share-chart",
            category_share_chart(&expense_totals, &label),
        ),
        ChartView::new(
            "budget-vs-actual-chart",
            budget_vs_actual_chart(&comparisons, &label),
        ),
        ChartView::new("daily-trend-chart", daily_trend_chart(&trend, &label)),
        ChartView::new(
            "category-comparison-chart",
            category_comparison_chart(&expense_totals, &label),
        ),
        ChartView::new(
            "monthly-comparison-chart",
            monthly_comparison_chart(&months, &format!("Last {COMPARISON_MONTHS} months")),
        ),
    ];

    Ok(reports_view(&window, &summary, &expense_totals, &charts).into_response())
}

fn budgets_in_window(window: &ReportWindow, connection: &Connection) -> Result<Vec<Budget>, Error> {
    let mut budgets = Vec::new();
    let mut month = ReportWindow::month_of(window.start());

    while month.start() <= window.end() {
        let start = month.start();
        budgets.extend(get_budgets_for_month(
            start.year(),
            u8::from(start.month()),
            connection,
        )?);

        let next = month.next_month();
        if next == month {
            break;
        }
        month = next;
    }

    Ok(budgets)
}

fn reports_view(
    window: &ReportWindow,
    summary: &MonthlySummary,
    expense_totals: &[CategoryTotal],
    charts: &[ChartView],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let previous = window.previous_month().start();
    let next = window.next_month().start();
    let previous_url = format!(
        "{}?year={}&month={}",
        endpoints::REPORTS_VIEW,
        previous.year(),
        u8::from(previous.month())
    );
    let next_url = format!(
        "{}?year={}&month={}",
        endpoints::REPORTS_VIEW,
        next.year(),
        u8::from(next.month())
    );
    let export_url = format!("{}?{}", endpoints::EXPORT, window.query_string());
    let total_expenses: f64 = expense_totals.iter().map(|total| total.total).sum();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Reports" }
                        p class="text-gray-500 dark:text-gray-400" id="report-window" { (window.label()) }
                    }

                    div class="flex gap-4"
                    {
                        a href=(previous_url) class=(LINK_STYLE) { "Previous month" }
                        a href=(next_url) class=(LINK_STYLE) { "Next month" }
                        a href=(export_url) class=(LINK_STYLE) download { "Export CSV" }
                    }
                }

                form
                    method="get"
                    action=(endpoints::REPORTS_VIEW)
                    class="flex flex-wrap gap-4 items-end"
                {
                    div
                    {
                        label for="start" class=(FORM_LABEL_STYLE) { "From" }
                        input type="date" name="start" id="start" value=(window.start()) class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="end" class=(FORM_LABEL_STYLE) { "To" }
                        input type="date" name="end" id="end" value=(window.end()) class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
                    }
                }

                div class="grid grid-cols-1 sm:grid-cols-4 gap-4" id="report-summary"
                {
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Income" }
                        p class={"text-xl font-semibold " (INCOME_TEXT_STYLE)} { (format_currency(summary.income)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Expenses" }
                        p class={"text-xl font-semibold " (EXPENSE_TEXT_STYLE)} { (format_currency(summary.expenses)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Net" }
                        p class="text-xl font-semibold" { (format_currency(summary.net)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        h3 class="text-sm text-gray-500 dark:text-gray-400" { "Transactions" }
                        p class="text-xl font-semibold" { (summary.transaction_count) }
                    }
                }

                (charts_view(charts))

                div class="overflow-x-auto dark:bg-gray-800"
                {
                    h2 class="text-lg font-semibold mb-2" { "Spending by Category" }

                    table class=(TABLE_STYLE) id="category-totals"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                                th scope="col" class="px-6 py-4 text-right" { "Total" }
                                th scope="col" class="px-6 py-4 text-right" { "Share" }
                            }
                        }

                        tbody
                        {
                            @for total in expense_totals {
                                @let share = if total_expenses > 0.0 {
                                    total.total / total_expenses * 100.0
                                } else {
                                    0.0
                                };

                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (total.name) }
                                    td class=(TABLE_CELL_STYLE) { (total.transaction_count) }
                                    td class="px-6 py-4 text-right tabular-nums" { (format_currency(total.total)) }
                                    td class="px-6 py-4 text-right tabular-nums" { (format_percentage(share)) }
                                }
                            }

                            @if expense_totals.is_empty() {
                                tr
                                {
                                    td colspan="4" class=(TABLE_EMPTY_CELL_STYLE)
                                    {
                                        "No expenses in this period."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Reports", &charts_script(charts), &content)
}
