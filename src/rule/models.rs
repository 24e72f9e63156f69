use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, category::CategoryId, database_id::DatabaseId};

pub type RuleId = DatabaseId;

/// A rule that assigns a category to transactions whose descriptions contain
/// a keyword. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Rule {
    pub id: RuleId,

    /// Stored in lowercase.
    pub keyword: String,

    /// The ID of the category to assign when this rule matches.
    pub category_id: CategoryId,
}

/// A rule with the name of its category for display purposes.
#[derive(Debug, Clone)]
pub(super) struct RuleWithCategory {
    pub rule: Rule,
    pub category_name: String,
}

/// Unified state for all rule-related operations.
#[derive(Debug, Clone)]
pub struct RuleState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RuleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Form data for creating rules.
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleFormData {
    pub keyword: String,
    pub category_id: CategoryId,
}
