//! The dashboard: an overview of a single month.

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
    budget::get_budgets_for_month,
    category::{Category, get_all_categories},
    chart::{ChartView, charts_script, charts_view},
    dashboard::tables::{
        budget_status_table, category_totals_table, goals_overview, recent_transactions_table,
    },
    endpoints,
    goal::{Goal, get_all_goals},
    html::{
        CARD_STYLE, EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    report::{
        BudgetComparison, CategoryTotal, MonthlySummary, ReportWindow, budget_vs_actual,
        budget_vs_actual_chart, category_share_chart, category_totals, monthly_summary,
    },
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, TransactionType, query_transactions},
};

/// How many of the month's transactions are listed on the dashboard.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The month shown on the dashboard. Defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

struct DashboardData {
    window: ReportWindow,
    summary: MonthlySummary,
    income_totals: Vec<CategoryTotal>,
    expense_totals: Vec<CategoryTotal>,
    comparisons: Vec<BudgetComparison>,
    recent_transactions: Vec<Transaction>,
    categories: Vec<Category>,
    goals: Vec<Goal>,
}

/// Display a page with an overview of the user's finances for a month.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let window = ReportWindow::month(
        params.year.unwrap_or(today.year()),
        params.month.unwrap_or(u8::from(today.month())),
    )?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = load_dashboard_data(window, &connection)?;
    drop(connection);

    Ok(dashboard_view(&data).into_response())
}

fn load_dashboard_data(
    window: ReportWindow,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let transactions = query_transactions(
        &TransactionQuery {
            date_range: Some(window.start()..=window.end()),
            ..Default::default()
        },
        connection,
    )
    .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let categories = get_all_categories(connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let budgets = get_budgets_for_month(
        window.start().year(),
        u8::from(window.start().month()),
        connection,
    )
    .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let goals = get_all_goals(connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve goals: {error}"))?;

    let summary = monthly_summary(&transactions, &window);
    let income_totals = category_totals(
        &transactions,
        &categories,
        &window,
        Some(TransactionType::Income),
    );
    let expense_totals = category_totals(
        &transactions,
        &categories,
        &window,
        Some(TransactionType::Expense),
    );
    let comparisons = budget_vs_actual(&budgets, &transactions, &categories);
    let recent_transactions = transactions
        .into_iter()
        .take(RECENT_TRANSACTION_COUNT)
        .collect();

    Ok(DashboardData {
        window,
        summary,
        income_totals,
        expense_totals,
        comparisons,
        recent_transactions,
        categories,
        goals,
    })
}

fn month_url(window: &ReportWindow) -> String {
    let start = window.start();

    format!(
        "{}?year={}&month={}",
        endpoints::DASHBOARD_VIEW,
        start.year(),
        u8::from(start.month())
    )
}

fn summary_view(summary: &MonthlySummary) -> Markup {
    let net_style = if summary.net < 0.0 {
        EXPENSE_TEXT_STYLE
    } else {
        INCOME_TEXT_STYLE
    };

    html!(
        div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" id="dashboard-summary"
        {
            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-500 dark:text-gray-400" { "Total Income" }
                p class={"text-xl font-semibold " (INCOME_TEXT_STYLE)} { (format_currency(summary.income)) }
            }
            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-500 dark:text-gray-400" { "Total Expenses" }
                p class={"text-xl font-semibold " (EXPENSE_TEXT_STYLE)} { (format_currency(summary.expenses)) }
            }
            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-500 dark:text-gray-400" { "Net Balance" }
                p class={"text-xl font-semibold " (net_style)} { (format_currency(summary.net)) }
            }
            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-500 dark:text-gray-400" { "Transactions" }
                p class="text-xl font-semibold" { (summary.transaction_count) }
            }
        }
    )
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let label = data.window.label();

    let charts = [
        ChartView::new(
            "income-share-chart",
            category_share_chart(&data.income_totals, &format!("Income, {label}")),
        ),
        ChartView::new(
            "expense-share-chart",
            category_share_chart(&data.expense_totals, &format!("Expenses, {label}")),
        ),
        ChartView::new(
            "budget-vs-actual-chart",
            budget_vs_actual_chart(&data.comparisons, &label),
        ),
    ];

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Dashboard" }
                        p class="text-gray-500 dark:text-gray-400" id="dashboard-month" { (label) }
                    }

                    div class="flex gap-4"
                    {
                        a href=(month_url(&data.window.previous_month())) class=(LINK_STYLE) { "Previous month" }
                        a href=(month_url(&data.window.next_month())) class=(LINK_STYLE) { "Next month" }
                    }
                }

                (summary_view(&data.summary))

                (charts_view(&charts))

                div class="grid grid-cols-1 lg:grid-cols-2 gap-4"
                {
                    (category_totals_table(
                        "income-by-category",
                        "Income by Category",
                        &data.income_totals,
                        "No income transactions this month",
                    ))
                    (category_totals_table(
                        "expenses-by-category",
                        "Expenses by Category",
                        &data.expense_totals,
                        "No expense transactions this month",
                    ))
                }

                (budget_status_table(&data.comparisons))

                (recent_transactions_table(&data.recent_transactions, &data.categories))

                (goals_overview(&data.goals))
            }
        }
    );

    base("Dashboard", &charts_script(&charts), &content)
}
