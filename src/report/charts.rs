//! ECharts options for the reports page.
//!
//! Each builder takes the output of an aggregation function and returns a
//! [Chart]. Empty input gives a chart titled "No data available".

use charming::{
    Chart,
    component::{Axis, Grid, Legend, LegendType, Title},
    element::{AxisLabel, AxisType, Emphasis, EmphasisFocus, Tooltip, Trigger},
    series::{Line, Pie, bar},
};

use crate::{
    chart::{currency_formatter, currency_tooltip, empty_chart},
    report::aggregation::{BudgetComparison, CategoryTotal, DailyTotal, MonthTotal},
};

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .top("80")
        .contain_label(true)
}

/// A donut chart of each category's share of the total.
pub fn category_share_chart(totals: &[CategoryTotal], subtitle: &str) -> Chart {
    if totals.is_empty() {
        return empty_chart(subtitle);
    }

    let data = totals
        .iter()
        .map(|total| (round_cents(total.total), total.name.clone()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Spending by Category").subtext(subtitle))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("0").type_(LegendType::Scroll))
        .series(
            Pie::new()
                .name("Spending")
                .radius(vec!["40%", "70%"])
                .center(vec!["50%", "45%"])
                .data(data),
        )
}

/// A horizontal bar per category, largest at the top.
pub fn category_comparison_chart(totals: &[CategoryTotal], subtitle: &str) -> Chart {
    if totals.is_empty() {
        return empty_chart(subtitle);
    }

    // ECharts draws the first category at the bottom of a vertical category axis.
    let (names, values): (Vec<String>, Vec<f64>) = totals
        .iter()
        .rev()
        .map(|total| (total.name.clone(), round_cents(total.total)))
        .unzip();

    Chart::new()
        .title(Title::new().text("Category Comparison").subtext(subtitle))
        .tooltip(currency_tooltip())
        .grid(grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .y_axis(Axis::new().type_(AxisType::Category).data(names))
        .series(bar::Bar::new().name("Total").data(values))
}

/// Budgeted and actual amounts side by side for each category.
pub fn budget_vs_actual_chart(comparisons: &[BudgetComparison], subtitle: &str) -> Chart {
    if comparisons.is_empty() {
        return empty_chart(subtitle);
    }

    let names = comparisons
        .iter()
        .map(|comparison| comparison.category_name.clone())
        .collect::<Vec<_>>();
    let allocated = comparisons
        .iter()
        .map(|comparison| round_cents(comparison.allocated))
        .collect::<Vec<_>>();
    let actual = comparisons
        .iter()
        .map(|comparison| round_cents(comparison.actual))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Budget vs Actual").subtext(subtitle))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%").right("4%"))
        .grid(grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(names))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Budget")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(allocated),
        )
        .series(
            bar::Bar::new()
                .name("Actual")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(actual),
        )
}

/// Daily income and expenses as two lines.
pub fn daily_trend_chart(trend: &[DailyTotal], subtitle: &str) -> Chart {
    if trend.is_empty() {
        return empty_chart(subtitle);
    }

    let labels = trend
        .iter()
        .map(|day| day.date.to_string())
        .collect::<Vec<_>>();
    let income = trend
        .iter()
        .map(|day| round_cents(day.income))
        .collect::<Vec<_>>();
    let expenses = trend
        .iter()
        .map(|day| round_cents(day.expenses))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Daily Trend").subtext(subtitle))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%").right("4%"))
        .grid(grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Income").data(income))
        .series(Line::new().name("Expenses").data(expenses))
}

/// Total expenses for each month, with income for context.
pub fn monthly_comparison_chart(months: &[MonthTotal], subtitle: &str) -> Chart {
    let has_data = months
        .iter()
        .any(|month| month.income != 0.0 || month.expenses != 0.0);

    if !has_data {
        return empty_chart(subtitle);
    }

    let labels = months
        .iter()
        .map(|month| {
            let start = month.window.start();
            format!("{} {}", &start.month().to_string()[..3], start.year())
        })
        .collect::<Vec<_>>();
    let expenses = months
        .iter()
        .map(|month| round_cents(month.expenses))
        .collect::<Vec<_>>();
    let income = months
        .iter()
        .map(|month| round_cents(month.income))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Monthly Comparison").subtext(subtitle))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%").right("4%"))
        .grid(grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(bar::Bar::new().name("Expenses").data(expenses))
        .series(Line::new().name("Income").data(income))
}
