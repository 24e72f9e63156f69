//! The goals page: every savings goal with its progress, and a form for new goals.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints,
    goal::core::{Goal, get_all_goals},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, delete_button, dollar_input_styles, format_currency,
        format_percentage,
    },
    navigation::NavBar,
};

/// The state needed for the goals page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_goals_page(State(state): State<GoalsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_all_goals(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve goals: {error}"))?;

    Ok(goals_view(&goals).into_response())
}

fn goals_view(goals: &[Goal]) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Savings Goals" }

                (new_goal_form())

                div id="goal-list" class="grid grid-cols-1 md:grid-cols-2 gap-4"
                {
                    @for goal in goals {
                        (goal_card(goal))
                    }
                }

                @if goals.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400" id="no-goals"
                    {
                        "No goals yet. Add one above to start tracking your savings."
                    }
                }
            }
        }
    );

    base("Goals", &[dollar_input_styles()], &content)
}

fn new_goal_form() -> Markup {
    html!(
        form
            id="new-goal-form"
            hx-post=(endpoints::GOALS_API)
            hx-target-error="#alert-container"
            class={"grid grid-cols-1 md:grid-cols-2 gap-4 " (CARD_STYLE)}
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Goal" }
                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Emergency fund"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target Amount" }
                div class="input-wrapper"
                {
                    input
                        id="target_amount"
                        type="number"
                        name="target_amount"
                        min="0.01"
                        step="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="target_date" class=(FORM_LABEL_STYLE) { "Target Date (optional)" }
                input
                    id="target_date"
                    type="date"
                    name="target_date"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description (optional)" }
                input
                    id="description"
                    type="text"
                    name="description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="md:col-span-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Goal" }
            }
        }
    )
}

fn goal_card(goal: &Goal) -> Markup {
    let progress_url = endpoints::format_endpoint(endpoints::GOAL_PROGRESS, goal.id);
    let delete_url = endpoints::format_endpoint(endpoints::GOAL, goal.id);
    let confirm_message = format!(
        "Are you sure you want to delete the goal '{}'? This cannot be undone.",
        goal.name
    );
    let percentage = goal.progress_percentage();
    let bar_style = if goal.is_complete() {
        "bg-green-500"
    } else {
        "bg-blue-500"
    };

    html!(
        article class=(CARD_STYLE) data-goal-id=(goal.id)
        {
            header class="flex justify-between items-start gap-2"
            {
                div
                {
                    h2 class="text-lg font-semibold" { (goal.name) }

                    @if let Some(target_date) = goal.target_date {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "By " (target_date) }
                    }
                }

                (delete_button(&delete_url, &confirm_message, "closest article"))
            }

            @if !goal.description.is_empty() {
                p class="text-sm text-gray-600 dark:text-gray-300" { (goal.description) }
            }

            div class="my-2 w-full h-3 rounded bg-gray-200 dark:bg-gray-700"
            {
                div
                    class={"h-3 rounded " (bar_style)}
                    style={"width: " (format!("{:.0}", percentage.clamp(0.0, 100.0))) "%"}
                {}
            }

            p class="text-sm goal-progress"
            {
                (format_currency(goal.current_amount)) " of " (format_currency(goal.target_amount))
                " (" (format_percentage(percentage)) ")"

                @if goal.is_complete() {
                    " Reached!"
                } @else {
                    ", " (format_currency(goal.remaining())) " to go"
                }
            }

            form
                hx-put=(progress_url)
                hx-target-error="#alert-container"
                class="flex gap-2 items-end mt-2"
            {
                div class="grow input-wrapper"
                {
                    input
                        type="number"
                        name="current_amount"
                        min="0"
                        step="0.01"
                        value=(format!("{:.2}", goal.current_amount))
                        aria-label="Amount saved"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update" }
                }
            }
        }
    )
}
