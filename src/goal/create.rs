//! The endpoint for creating a savings goal.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{AppState, Error, endpoints, goal::core::create_goal};

#[derive(Debug, Clone)]
pub struct CreateGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a new goal.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalForm {
    pub name: String,
    pub target_amount: f64,
    pub target_date: Option<Date>,
    #[serde(default)]
    pub description: String,
}

pub async fn create_goal_endpoint(
    State(state): State<CreateGoalState>,
    Form(form): Form<GoalForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_goal(
        &form.name,
        form.target_amount,
        form.target_date,
        &form.description,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::EmptyGoalName | Error::InvalidAmount(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        endpoints,
        goal::core::get_all_goals,
        test_utils::{assert_hx_redirect, get_test_connection},
    };

    use super::{CreateGoalState, GoalForm, create_goal_endpoint};

    fn get_state() -> CreateGoalState {
        CreateGoalState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn creates_goal() {
        let state = get_state();
        let form = GoalForm {
            name: "New bike".to_owned(),
            target_amount: 800.0,
            target_date: Some(date!(2026 - 12 - 25)),
            description: String::new(),
        };

        let response = create_goal_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::GOALS_VIEW);
        let goals = get_all_goals(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].name, "New bike");
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let form = GoalForm {
            name: "   ".to_owned(),
            target_amount: 800.0,
            target_date: None,
            description: String::new(),
        };

        let response = create_goal_endpoint(State(get_state()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_zero_target() {
        let form = GoalForm {
            name: "Bike".to_owned(),
            target_amount: 0.0,
            target_date: None,
            description: String::new(),
        };

        let response = create_goal_endpoint(State(get_state()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
