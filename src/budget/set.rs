//! The endpoint for setting a category's budget for a month.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    budget::{core::set_budget, page::budgets_page_url},
    category::CategoryId,
};

/// The state needed for setting a budget.
#[derive(Debug, Clone)]
pub struct SetBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for setting a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    pub category_id: CategoryId,
    pub year: i32,
    pub month: u8,
    pub amount: f64,
}

/// Create or replace the budget for a category and month, then redirect to
/// the budgets page for that month.
pub async fn set_budget_endpoint(
    State(state): State<SetBudgetState>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_budget(form.category_id, form.year, form.month, form.amount, &connection) {
        Ok(budget) => (
            HxRedirect(budgets_page_url(budget.year, budget.month)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::InvalidMonth(_) | Error::InvalidAmount(_) | Error::InvalidCategory(_)),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while setting a budget: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        budget::core::get_budgets_for_month,
        category::get_all_categories,
        test_utils::{assert_hx_redirect, get_test_connection},
    };

    use super::{BudgetForm, SetBudgetState, set_budget_endpoint};

    fn get_state() -> (SetBudgetState, i64) {
        let connection = get_test_connection();
        let category_id = get_all_categories(&connection).unwrap()[0].id;

        (
            SetBudgetState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            category_id,
        )
    }

    #[tokio::test]
    async fn sets_budget_and_redirects_to_month() {
        let (state, category_id) = get_state();
        let form = BudgetForm {
            category_id,
            year: 2026,
            month: 3,
            amount: 250.0,
        };

        let response = set_budget_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/budgets?year=2026&month=3");
        let budgets =
            get_budgets_for_month(2026, 3, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 250.0);
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let (state, category_id) = get_state();
        let form = BudgetForm {
            category_id,
            year: 2026,
            month: 3,
            amount: -5.0,
        };

        let response = set_budget_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let (state, _) = get_state();
        let form = BudgetForm {
            category_id: 9999,
            year: 2026,
            month: 3,
            amount: 5.0,
        };

        let response = set_budget_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
