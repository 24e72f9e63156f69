//! Tables shown on the dashboard.

use std::collections::HashMap;

use maud::{Markup, html};

use crate::{
    category::{Category, CategoryId},
    endpoints,
    goal::Goal,
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE, TABLE_CELL_STYLE,
        TABLE_EMPTY_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, format_currency,
        format_percentage, link,
    },
    report::{BudgetComparison, CategoryTotal, UNCATEGORIZED_LABEL},
    transaction::{Transaction, TransactionType},
};

const NUMBER_CELL_STYLE: &str = "px-6 py-4 text-right tabular-nums";

/// Per-category totals with their transaction counts.
pub(super) fn category_totals_table(
    id: &str,
    title: &str,
    totals: &[CategoryTotal],
    empty_message: &str,
) -> Markup {
    html!(
        div class="overflow-x-auto rounded dark:bg-gray-800"
        {
            h3 class="text-lg font-semibold mb-2" { (title) }

            table class=(TABLE_STYLE) id=(id)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class="px-6 py-4 text-right" { "Count" }
                    }
                }

                tbody
                {
                    @for total in totals {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (total.name) }
                            td class=(NUMBER_CELL_STYLE) { (format_currency(total.total)) }
                            td class=(NUMBER_CELL_STYLE) { (total.transaction_count) }
                        }
                    }

                    @if totals.is_empty() {
                        tr
                        {
                            td colspan="3" class=(TABLE_EMPTY_CELL_STYLE) { (empty_message) }
                        }
                    }
                }
            }
        }
    )
}

/// Whether each budget of the month is under or over.
pub(super) fn budget_status_table(comparisons: &[BudgetComparison]) -> Markup {
    html!(
        div class="overflow-x-auto rounded dark:bg-gray-800"
        {
            h3 class="text-lg font-semibold mb-2" { "Budget vs Actual" }

            table class=(TABLE_STYLE) id="budget-status"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-4 text-right" { "Budgeted" }
                        th scope="col" class="px-6 py-4 text-right" { "Actual" }
                        th scope="col" class="px-6 py-4 text-right" { "Difference" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                    }
                }

                tbody
                {
                    @for comparison in comparisons {
                        @let (status, style) = if comparison.is_over_budget() {
                            ("Over budget", EXPENSE_TEXT_STYLE)
                        } else {
                            ("Under budget", INCOME_TEXT_STYLE)
                        };

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (comparison.category_name) }
                            td class=(NUMBER_CELL_STYLE) { (format_currency(comparison.allocated)) }
                            td class=(NUMBER_CELL_STYLE) { (format_currency(comparison.actual)) }
                            td class=(NUMBER_CELL_STYLE) { (format_currency(comparison.difference)) }
                            td class={"px-6 py-4 " (style)}
                            {
                                (status) " (" (format_percentage(comparison.percentage_used)) " used)"
                            }
                        }
                    }

                    @if comparisons.is_empty() {
                        tr
                        {
                            td colspan="5" class=(TABLE_EMPTY_CELL_STYLE)
                            {
                                "No budgets set for this month. Set them on the "
                                (link(endpoints::BUDGETS_VIEW, "budgets page"))
                                "."
                            }
                        }
                    }
                }
            }
        }
    )
}

/// The latest transactions, newest first.
pub(super) fn recent_transactions_table(
    transactions: &[Transaction],
    categories: &[Category],
) -> Markup {
    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    html!(
        div class="overflow-x-auto rounded dark:bg-gray-800"
        {
            h3 class="text-lg font-semibold mb-2" { "Recent Transactions" }

            table class=(TABLE_STYLE) id="recent-transactions"
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
                    @for transaction in transactions {
                        @let category_name = transaction
                            .category_id
                            .and_then(|id| names.get(&id).copied())
                            .unwrap_or(UNCATEGORIZED_LABEL);
                        @let amount_style = match transaction.transaction_type {
                            TransactionType::Income => INCOME_TEXT_STYLE,
                            TransactionType::Expense => EXPENSE_TEXT_STYLE,
                        };

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class="px-6 py-4 whitespace-nowrap" { (transaction.date) }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class=(CATEGORY_BADGE_STYLE) { (category_name) }
                            }
                            td class={(NUMBER_CELL_STYLE) " " (amount_style)}
                            {
                                (format_currency(transaction.signed_amount()))
                            }
                        }
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td colspan="4" class=(TABLE_EMPTY_CELL_STYLE)
                            {
                                "No transactions this month. Add one "
                                (link(endpoints::NEW_TRANSACTION_VIEW, "manually"))
                                " or by "
                                (link(endpoints::IMPORT_VIEW, "importing"))
                                " a statement."
                            }
                        }
                    }
                }
            }
        }
    )
}

/// A compact progress bar for each goal.
pub(super) fn goals_overview(goals: &[Goal]) -> Markup {
    html!(
        section id="goals-overview" class="w-full space-y-2"
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-lg font-semibold" { "Goals" }
                (link(endpoints::GOALS_VIEW, "Manage goals"))
            }

            @if goals.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No goals yet." }
            }

            div class="grid grid-cols-1 md:grid-cols-2 gap-4"
            {
                @for goal in goals {
                    @let percentage = goal.progress_percentage();

                    div class=(CARD_STYLE) data-goal-id=(goal.id)
                    {
                        div class="flex justify-between text-sm"
                        {
                            span class="font-semibold" { (goal.name) }
                            span { (format_percentage(percentage)) }
                        }

                        div class="mt-2 w-full h-2 rounded bg-gray-200 dark:bg-gray-700"
                        {
                            div
                                class={"h-2 rounded " (if goal.is_complete() { "bg-green-500" } else { "bg-blue-500" })}
                                style={"width: " (format!("{:.0}", percentage.clamp(0.0, 100.0))) "%"}
                            {}
                        }

                        p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                        {
                            (format_currency(goal.current_amount)) " of " (format_currency(goal.target_amount))
                        }
                    }
                }
            }
        }
    )
}
