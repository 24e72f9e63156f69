use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    category::{Category, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_EMPTY_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base, delete_button, loading_spinner,
    },
    navigation::NavBar,
    rule::{
        db::get_all_rules_with_categories,
        models::{RuleState, RuleWithCategory},
    },
};

/// Route handler for the rules listing page.
pub async fn get_rules_page(State(state): State<RuleState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rules = get_all_rules_with_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve rules: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(rules_view(&rules, &categories).into_response())
}

fn rules_view(rules: &[RuleWithCategory], categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::RULES_VIEW).into_html();
    let spinner = loading_spinner();

    let table_row = |rule: &RuleWithCategory| {
        let delete_url = endpoints::format_endpoint(endpoints::RULE, rule.rule.id);

        html!(
            tr class=(TABLE_ROW_STYLE) data-rule-id=(rule.rule.id)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    code class="bg-gray-100 dark:bg-gray-700 px-2.5 py-0.5 rounded-sm text-xs"
                    {
                        (rule.rule.keyword)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE)
                    {
                        (rule.category_name)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (delete_button(
                        &delete_url,
                        &format!(
                            "Are you sure you want to delete the rule '{}' → '{}'?",
                            rule.rule.keyword, rule.category_name
                        ),
                        "closest tr",
                    ))
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Categorisation Rules" }

                aside class="p-4 bg-blue-50 dark:bg-blue-900/20 rounded"
                {
                    h3 class="text-sm font-medium text-blue-800 dark:text-blue-200 mb-2"
                    {
                        "How Rules Work"
                    }

                    p class="text-xs text-blue-700 dark:text-blue-300"
                    {
                        r#"When importing, transactions without a category get the category of
                        the first rule whose keyword appears anywhere in the description
                        (case-insensitive). Rules are checked from top to bottom.
                        For example, the keyword "netflix" matches "NETFLIX.COM 1234"."#
                    }
                }

                section class="flex gap-4"
                {
                    button
                        hx-post=(endpoints::APPLY_RULES)
                        hx-confirm="Apply the rules to every transaction that has no category?"
                        hx-indicator="#loading-apply-indicator"
                        hx-target="#alert-container"
                        hx-target-error="#alert-container"
                        class="px-4 py-2 bg-green-600 hover:bg-green-700
                            active:enabled:bg-green-800 disabled:opacity-50
                            text-white text-sm font-medium rounded transition-colors
                            focus:outline-hidden focus:ring-2
                            focus:ring-green-500 focus:ring-offset-2 flex
                            items-center"
                    {
                        span
                            id="loading-apply-indicator"
                            class="htmx-indicator"
                            style="display: none;"
                        {
                            (spinner)
                        }

                        span class="button-text" { "Categorise Uncategorised Transactions" }
                    }
                }

                (new_rule_form_view(categories))

                section class="overflow-x-auto dark:bg-gray-800"
                {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Keyword" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for rule in rules {
                                (table_row(rule))
                            }

                            @if rules.is_empty() {
                                tr
                                {
                                    td colspan="3" class=(TABLE_EMPTY_CELL_STYLE)
                                    {
                                        "No rules created yet. Add a keyword above to categorise transactions automatically."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Rules", &[], &content)
}

fn new_rule_form_view(categories: &[Category]) -> Markup {
    html! {
        form
            hx-post=(endpoints::RULES_API)
            hx-target-error="#alert-container"
            class={"flex flex-wrap gap-4 items-end " (CARD_STYLE)}
        {
            div class="grow"
            {
                label for="keyword" class=(FORM_LABEL_STYLE) { "Keyword" }

                input
                    id="keyword"
                    type="text"
                    name="keyword"
                    placeholder="e.g., netflix"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="grow"
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    id="category_id"
                    name="category_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select a category" }

                    @for category in categories {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            div
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Rule" }
            }
        }
    }
}
