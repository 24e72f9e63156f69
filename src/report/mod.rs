//! Reports: aggregation of transactions over a window, charts and CSV export.

mod aggregation;
mod charts;
mod export;
mod page;
mod window;

pub use aggregation::{
    BudgetComparison, CategoryTotal, DailyTotal, MonthTotal, MonthlySummary, UNCATEGORIZED_LABEL,
    budget_vs_actual, category_totals, daily_trend, monthly_comparison, monthly_summary,
};
pub use charts::{budget_vs_actual_chart, category_share_chart};
pub use export::{export_transactions_csv, export_transactions_endpoint};
pub use page::get_reports_page;
pub use window::ReportWindow;
