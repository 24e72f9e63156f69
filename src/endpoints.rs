//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with an overview of the current month.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing and filtering transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for planning monthly budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for reports and charts.
pub const REPORTS_VIEW: &str = "/reports";
/// The page for savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for importing transactions from CSV and PDF files.
pub const IMPORT_VIEW: &str = "/import";
/// The page for listing all categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for listing the keyword rules used for auto-categorisation.
pub const RULES_VIEW: &str = "/rules";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create or update a budget.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to delete a budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to create a goal.
pub const GOALS_API: &str = "/api/goals";
/// The route to delete a goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to update the progress of a goal.
pub const GOAL_PROGRESS: &str = "/api/goals/{goal_id}/progress";
/// The route to create a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a keyword rule.
pub const RULES_API: &str = "/api/rules";
/// The route to delete a keyword rule.
pub const RULE: &str = "/api/rules/{rule_id}";
/// The route to apply the keyword rules to uncategorised transactions.
pub const APPLY_RULES: &str = "/api/rules/apply";
/// The route to upload CSV and PDF files for importing transactions.
pub const IMPORT: &str = "/api/import";
/// The route to parse uploaded files and show the transactions without saving them.
pub const IMPORT_PREVIEW: &str = "/api/import/preview";
/// The route to download transactions as a CSV file.
pub const EXPORT: &str = "/api/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/goals/{goal_id}', '{goal_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, it is returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::EDIT_TRANSACTION_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::IMPORT_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::NEW_CATEGORY_VIEW,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::RULES_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::STATIC,
            endpoints::TRANSACTIONS_API,
            endpoints::TRANSACTION,
            endpoints::BUDGETS_API,
            endpoints::BUDGET,
            endpoints::GOALS_API,
            endpoints::GOAL,
            endpoints::GOAL_PROGRESS,
            endpoints::CATEGORIES_API,
            endpoints::CATEGORY,
            endpoints::RULES_API,
            endpoints::RULE,
            endpoints::APPLY_RULES,
            endpoints::IMPORT,
            endpoints::IMPORT_PREVIEW,
            endpoints::EXPORT,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::GOAL_PROGRESS, 7);

        assert_eq!(formatted_path, "/api/goals/7/progress");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
