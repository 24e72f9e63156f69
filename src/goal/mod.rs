//! Savings goals with manually recorded progress.

mod core;
mod create;
mod delete;
mod page;
mod progress;

pub use self::core::{
    Goal, GoalId, create_goal, create_goal_table, delete_goal, get_all_goals, get_goal,
    update_goal_progress,
};
pub use create::create_goal_endpoint;
pub use delete::delete_goal_endpoint;
pub use page::get_goals_page;
pub use progress::update_goal_progress_endpoint;
