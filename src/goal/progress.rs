//! The endpoint for recording progress towards a goal.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    goal::core::{GoalId, update_goal_progress},
};

#[derive(Debug, Clone)]
pub struct GoalProgressState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalProgressState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalProgressForm {
    pub current_amount: f64,
}

/// Set the amount saved towards a goal and reload the goals page.
pub async fn update_goal_progress_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<GoalProgressState>,
    Form(form): Form<GoalProgressForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_goal_progress(goal_id, form.current_amount, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidAmount(_) | Error::UpdateMissingGoal)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating goal {goal_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
