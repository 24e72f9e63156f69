//! Aggregation of transactions for reports.
//!
//! Every function here is pure: it takes a snapshot of transactions (and
//! budgets or categories where needed) and computes totals without touching
//! the database.

use std::collections::HashMap;

use time::Date;

use crate::{
    budget::{Budget, BudgetId},
    category::{Category, CategoryId},
    report::window::ReportWindow,
    transaction::{Transaction, TransactionType},
};

/// The bucket name for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Income and expense totals for a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlySummary {
    pub income: f64,
    pub expenses: f64,
    /// Income minus expenses.
    pub net: f64,
    pub transaction_count: usize,
}

/// Sum the income and expenses of the transactions inside `window`.
pub fn monthly_summary(transactions: &[Transaction], window: &ReportWindow) -> MonthlySummary {
    let mut summary = MonthlySummary::default();

    for transaction in transactions
        .iter()
        .filter(|transaction| window.contains(transaction.date))
    {
        match transaction.transaction_type {
            TransactionType::Income => summary.income += transaction.amount,
            TransactionType::Expense => summary.expenses += transaction.amount,
        }
        summary.transaction_count += 1;
    }

    summary.net = summary.income - summary.expenses;
    summary
}

/// The total for one category bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// `None` for the uncategorized bucket.
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub total: f64,
    pub transaction_count: usize,
}

/// Sum the transactions in `window` per category, optionally only those of
/// `transaction_type`.
///
/// Transactions without a known category go into the [UNCATEGORIZED_LABEL]
/// bucket, so the bucket totals always add up to the total of the matching
/// transactions. Buckets are sorted by total, largest first, then by name.
pub fn category_totals(
    transactions: &[Transaction],
    categories: &[Category],
    window: &ReportWindow,
    transaction_type: Option<TransactionType>,
) -> Vec<CategoryTotal> {
    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();
    let mut buckets: HashMap<Option<CategoryId>, CategoryTotal> = HashMap::new();

    let matching = transactions.iter().filter(|transaction| {
        window.contains(transaction.date)
            && transaction_type.is_none_or(|wanted| transaction.transaction_type == wanted)
    });

    for transaction in matching {
        let known_category = transaction
            .category_id
            .and_then(|id| names.get(&id).map(|name| (id, *name)));
        let (key, name) = match known_category {
            Some((id, name)) => (Some(id), name),
            None => (None, UNCATEGORIZED_LABEL),
        };

        let bucket = buckets.entry(key).or_insert_with(|| CategoryTotal {
            category_id: key,
            name: name.to_owned(),
            total: 0.0,
            transaction_count: 0,
        });
        bucket.total += transaction.amount;
        bucket.transaction_count += 1;
    }

    let mut totals = buckets.into_values().collect::<Vec<_>>();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    totals
}

/// How a month's spending in a category compares to its budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetComparison {
    pub budget_id: BudgetId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub allocated: f64,
    /// The total of the expenses in the category during the budget's month.
    pub actual: f64,
    /// Allocated minus actual, negative when over budget.
    pub difference: f64,
    /// Actual as a percentage of allocated, 0 when nothing was allocated.
    pub percentage_used: f64,
}

impl BudgetComparison {
    pub fn is_over_budget(&self) -> bool {
        self.difference < 0.0
    }
}

/// Compare each budget with the expenses in its category and month.
///
/// The result is in the same order as `budgets`.
pub fn budget_vs_actual(
    budgets: &[Budget],
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<BudgetComparison> {
    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    budgets
        .iter()
        .map(|budget| {
            let actual = match ReportWindow::month(budget.year, budget.month) {
                Ok(window) => transactions
                    .iter()
                    .filter(|transaction| {
                        transaction.transaction_type == TransactionType::Expense
                            && transaction.category_id == Some(budget.category_id)
                            && window.contains(transaction.date)
                    })
                    .map(|transaction| transaction.amount)
                    .sum(),
                Err(_) => 0.0,
            };

            let percentage_used = if budget.amount > 0.0 {
                actual / budget.amount * 100.0
            } else {
                0.0
            };

            BudgetComparison {
                budget_id: budget.id,
                category_id: budget.category_id,
                category_name: names
                    .get(&budget.category_id)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned()),
                allocated: budget.amount,
                actual,
                difference: budget.amount - actual,
                percentage_used,
            }
        })
        .collect()
}

/// The income and expenses on one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotal {
    pub date: Date,
    pub income: f64,
    pub expenses: f64,
}

/// Per-day totals for the days in `window` that have transactions, oldest first.
pub fn daily_trend(transactions: &[Transaction], window: &ReportWindow) -> Vec<DailyTotal> {
    let mut days: HashMap<Date, DailyTotal> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| window.contains(transaction.date))
    {
        let day = days.entry(transaction.date).or_insert(DailyTotal {
            date: transaction.date,
            income: 0.0,
            expenses: 0.0,
        });

        match transaction.transaction_type {
            TransactionType::Income => day.income += transaction.amount,
            TransactionType::Expense => day.expenses += transaction.amount,
        }
    }

    let mut trend = days.into_values().collect::<Vec<_>>();
    trend.sort_by_key(|day| day.date);
    trend
}

/// The totals for one month of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    pub window: ReportWindow,
    pub income: f64,
    pub expenses: f64,
}

/// Income and expense totals for `count` consecutive months, starting with
/// the month containing `first_month`. Months without transactions are
/// included with zero totals.
pub fn monthly_comparison(
    transactions: &[Transaction],
    first_month: Date,
    count: usize,
) -> Vec<MonthTotal> {
    ReportWindow::consecutive_months(first_month, count)
        .into_iter()
        .map(|window| {
            let summary = monthly_summary(transactions, &window);

            MonthTotal {
                window,
                income: summary.income,
                expenses: summary.expenses,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        budget::Budget,
        category::{Category, CategoryName},
        report::window::ReportWindow,
        transaction::{Transaction, TransactionType},
    };

    use super::{
        UNCATEGORIZED_LABEL, budget_vs_actual, category_totals, daily_trend, monthly_comparison,
        monthly_summary,
    };

    const GROCERIES: i64 = 1;
    const TRANSPORT: i64 = 2;
    const INCOME: i64 = 3;

    fn categories() -> Vec<Category> {
        [
            (GROCERIES, "Food & Groceries", TransactionType::Expense),
            (TRANSPORT, "Transportation", TransactionType::Expense),
            (INCOME, "Income", TransactionType::Income),
        ]
        .into_iter()
        .map(|(id, name, kind)| Category {
            id,
            name: CategoryName::new_unchecked(name),
            kind,
            description: String::new(),
        })
        .collect()
    }

    fn transaction(
        id: i64,
        amount: f64,
        date: Date,
        category_id: Option<i64>,
        transaction_type: TransactionType,
    ) -> Transaction {
        Transaction {
            id,
            date,
            description: format!("transaction {id}"),
            amount,
            category_id,
            transaction_type,
            account: String::new(),
            notes: String::new(),
        }
    }

    fn transactions() -> Vec<Transaction> {
        use TransactionType::{Expense, Income};

        vec![
            transaction(1, 125.50, date!(2026 - 01 - 15), Some(GROCERIES), Expense),
            transaction(2, 40.0, date!(2026 - 01 - 15), Some(TRANSPORT), Expense),
            transaction(3, 3250.0, date!(2026 - 01 - 31), Some(INCOME), Income),
            transaction(4, 19.99, date!(2026 - 01 - 20), None, Expense),
            transaction(5, 60.0, date!(2026 - 01 - 22), Some(GROCERIES), Expense),
            transaction(6, 80.0, date!(2026 - 02 - 02), Some(GROCERIES), Expense),
            transaction(7, 12.0, date!(2025 - 12 - 31), Some(GROCERIES), Expense),
        ]
    }

    #[test]
    fn summary_sums_income_and_expenses_in_window() {
        let window = ReportWindow::month(2026, 1).unwrap();

        let summary = monthly_summary(&transactions(), &window);

        assert_eq!(summary.income, 3250.0);
        assert!((summary.expenses - 245.49).abs() < 1e-9);
        assert!((summary.net - 3004.51).abs() < 1e-9);
        assert_eq!(summary.transaction_count, 5);
    }

    #[test]
    fn category_totals_sorted_largest_first_with_uncategorized_bucket() {
        let window = ReportWindow::month(2026, 1).unwrap();

        let totals = category_totals(
            &transactions(),
            &categories(),
            &window,
            Some(TransactionType::Expense),
        );

        let names = totals.iter().map(|total| total.name.as_str()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["Food & Groceries", "Transportation", UNCATEGORIZED_LABEL]
        );
        assert_eq!(totals[0].total, 185.5);
        assert_eq!(totals[0].transaction_count, 2);
        assert_eq!(totals[2].category_id, None);
    }

    #[test]
    fn category_totals_conserve_the_window_total() {
        let all = transactions();
        let categories = categories();
        let windows = [
            ReportWindow::month(2026, 1).unwrap(),
            ReportWindow::month(2026, 2).unwrap(),
            ReportWindow::custom(date!(2025 - 12 - 01), date!(2026 - 02 - 28)).unwrap(),
        ];

        for window in windows {
            for transaction_type in [
                None,
                Some(TransactionType::Income),
                Some(TransactionType::Expense),
            ] {
                let bucket_sum: f64 = category_totals(&all, &categories, &window, transaction_type)
                    .iter()
                    .map(|total| total.total)
                    .sum();
                let raw_sum: f64 = all
                    .iter()
                    .filter(|t| window.contains(t.date))
                    .filter(|t| transaction_type.is_none_or(|wanted| t.transaction_type == wanted))
                    .map(|t| t.amount)
                    .sum();

                assert!(
                    (bucket_sum - raw_sum).abs() < 1e-9,
                    "buckets sum to {bucket_sum}, transactions to {raw_sum} for {}",
                    window.label()
                );
            }
        }
    }

    #[test]
    fn category_totals_for_empty_window_is_empty() {
        let window = ReportWindow::month(2030, 1).unwrap();

        let totals = category_totals(&transactions(), &categories(), &window, None);

        assert!(totals.is_empty());
    }

    #[test]
    fn budget_under_spent_has_positive_difference() {
        let budgets = [Budget {
            id: 1,
            category_id: GROCERIES,
            year: 2026,
            month: 1,
            amount: 500.0,
        }];
        let transactions = vec![transaction(
            1,
            125.50,
            date!(2026 - 01 - 15),
            Some(GROCERIES),
            TransactionType::Expense,
        )];

        let comparisons = budget_vs_actual(&budgets, &transactions, &categories());

        assert_eq!(comparisons.len(), 1);
        let comparison = &comparisons[0];
        assert_eq!(comparison.category_name, "Food & Groceries");
        assert_eq!(comparison.actual, 125.50);
        assert_eq!(comparison.difference, 374.50);
        assert!((comparison.percentage_used - 25.1).abs() < 1e-9);
        assert!(!comparison.is_over_budget());
    }

    #[test]
    fn budget_only_counts_expenses_in_its_month_and_category() {
        let budgets = [
            Budget {
                id: 1,
                category_id: GROCERIES,
                year: 2026,
                month: 1,
                amount: 150.0,
            },
            Budget {
                id: 2,
                category_id: INCOME,
                year: 2026,
                month: 1,
                amount: 0.0,
            },
        ];

        let comparisons = budget_vs_actual(&budgets, &transactions(), &categories());

        assert_eq!(comparisons[0].actual, 185.5);
        assert_eq!(comparisons[0].difference, -35.5);
        assert!(comparisons[0].is_over_budget());
        assert_eq!(comparisons[1].actual, 0.0);
        assert_eq!(comparisons[1].percentage_used, 0.0);
    }

    #[test]
    fn daily_trend_is_sorted_and_merges_days() {
        let window = ReportWindow::month(2026, 1).unwrap();

        let trend = daily_trend(&transactions(), &window);

        let dates = trend.iter().map(|day| day.date).collect::<Vec<_>>();
        assert_eq!(
            dates,
            vec![
                date!(2026 - 01 - 15),
                date!(2026 - 01 - 20),
                date!(2026 - 01 - 22),
                date!(2026 - 01 - 31)
            ]
        );
        assert_eq!(trend[0].expenses, 165.5);
        assert_eq!(trend[3].income, 3250.0);
    }

    #[test]
    fn monthly_comparison_includes_empty_months() {
        let comparison = monthly_comparison(&transactions(), date!(2025 - 12 - 05), 4);

        let expenses = comparison
            .iter()
            .map(|month| month.expenses)
            .collect::<Vec<_>>();
        assert_eq!(comparison.len(), 4);
        assert_eq!(expenses[0], 12.0);
        assert!((expenses[1] - 245.49).abs() < 1e-9);
        assert_eq!(expenses[2], 80.0);
        assert_eq!(expenses[3], 0.0);
    }
}
