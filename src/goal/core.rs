//! Savings goals and their database operations.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseId};

pub type GoalId = DatabaseId;

/// A target amount to save, with the progress recorded so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub target_amount: f64,
    /// The amount saved so far. Updated by hand.
    pub current_amount: f64,
    pub target_date: Option<Date>,
    pub description: String,
}

impl Goal {
    /// The share of the target reached so far, as a percentage.
    ///
    /// May be more than 100 once the goal has been exceeded.
    pub fn progress_percentage(&self) -> f64 {
        if self.target_amount > 0.0 {
            self.current_amount / self.target_amount * 100.0
        } else {
            0.0
        }
    }

    /// The amount still needed to reach the target, never negative.
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

/// Create a goal with no progress.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyGoalName] if `name` is empty or only whitespace,
/// - [Error::InvalidAmount] if `target_amount` is not a positive number,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_goal(
    name: &str,
    target_amount: f64,
    target_date: Option<Date>,
    description: &str,
    connection: &Connection,
) -> Result<Goal, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyGoalName);
    }

    if !target_amount.is_finite() || target_amount <= 0.0 {
        return Err(Error::InvalidAmount(target_amount));
    }

    connection
        .prepare(
            "INSERT INTO goal (name, target_amount, current_amount, target_date, description)
            VALUES (?1, ?2, 0, ?3, ?4)
            RETURNING id, name, target_amount, current_amount, target_date, description",
        )?
        .query_row(
            (name, target_amount, target_date, description.trim()),
            map_row,
        )
        .map_err(|error| error.into())
}

pub fn get_goal(goal_id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "SELECT id, name, target_amount, current_amount, target_date, description
            FROM goal WHERE id = :id",
        )?
        .query_row(&[(":id", &goal_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve every goal, soonest target date first. Goals without a target
/// date come last. Ties are ordered by name.
pub fn get_all_goals(connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, name, target_amount, current_amount, target_date, description
            FROM goal
            ORDER BY target_date IS NULL, target_date ASC, name ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Record the amount saved so far towards a goal.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `current_amount` is negative or not a number,
/// - [Error::UpdateMissingGoal] if the goal does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_goal_progress(
    goal_id: GoalId,
    current_amount: f64,
    connection: &Connection,
) -> Result<Goal, Error> {
    if !current_amount.is_finite() || current_amount < 0.0 {
        return Err(Error::InvalidAmount(current_amount));
    }

    connection
        .prepare(
            "UPDATE goal SET current_amount = ?1 WHERE id = ?2
            RETURNING id, name, target_amount, current_amount, target_date, description",
        )?
        .query_row((current_amount, goal_id), map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingGoal,
            error => error.into(),
        })
}

/// Delete a goal by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingGoal] if the goal does not exist.
pub fn delete_goal(goal_id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM goal WHERE id = ?1", [goal_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL CHECK (target_amount > 0),
            current_amount REAL NOT NULL DEFAULT 0 CHECK (current_amount >= 0),
            target_date TEXT,
            description TEXT NOT NULL DEFAULT ''
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: row.get(2)?,
        current_amount: row.get(3)?,
        target_date: row.get(4)?,
        description: row.get(5)?,
    })
}
