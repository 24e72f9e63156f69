//! Rendering of ECharts charts built with `charming`.
//!
//! A chart is sent to the browser as its JSON options plus a container div.
//! The script from [charts_script] initialises every chart once the page has
//! loaded.

use charming::{
    Chart,
    component::Title,
    element::{AxisPointer, AxisPointerType, JsFunction, Tooltip, Trigger},
};
use maud::{Markup, PreEscaped, html};

use crate::html::HeadElement;

const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@5.6.0/dist/echarts.min.js";

/// A chart with its HTML container ID and ECharts configuration.
pub struct ChartView {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl ChartView {
    pub fn new(id: &'static str, chart: Chart) -> Self {
        Self {
            id,
            options: chart.to_string(),
        }
    }
}

/// Renders a grid of containers for `charts`.
pub fn charts_view(charts: &[ChartView]) -> Markup {
    html!(
        section
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded bg-white dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// The head elements needed to draw `charts`: the ECharts library and a
/// script that initialises each chart with dark mode support and responsive
/// resizing.
pub fn charts_script(charts: &[ChartView]) -> [HeadElement; 2] {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const isDarkMode = window.matchMedia('(prefers-color-scheme: dark)').matches;
                    const chart = echarts.init(chartDom, isDarkMode ? 'dark' : null);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        HeadElement::ScriptSource(PreEscaped(wrapped_script)),
    ]
}

/// A chart that only shows the title "No data available".
pub fn empty_chart(subtitle: &str) -> Chart {
    Chart::new().title(
        Title::new()
            .text("No data available")
            .subtext(subtitle)
            .left("center")
            .top("middle"),
    )
}

#[inline]
pub fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values on an axis chart.
pub fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use charming::Chart;

    use crate::html::HeadElement;

    use super::{ChartView, charts_script, empty_chart};

    #[test]
    fn script_initialises_each_chart() {
        let charts = [
            ChartView::new("first-chart", Chart::new()),
            ChartView::new("second-chart", empty_chart("January 2026")),
        ];

        let [library, script] = charts_script(&charts);

        assert!(matches!(library, HeadElement::ScriptLink(url) if url.contains("echarts")));
        let HeadElement::ScriptSource(script) = script else {
            panic!("want a script source for the chart initialisation");
        };
        assert!(script.0.contains("document.getElementById(\"first-chart\")"));
        assert!(script.0.contains("document.getElementById(\"second-chart\")"));
        assert!(script.0.contains("No data available"));
    }
}
