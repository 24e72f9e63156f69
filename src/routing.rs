//! Application router configuration with page and form endpoint definitions.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget::{delete_budget_endpoint, get_budgets_page, set_budget_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, get_new_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, get_goals_page, update_goal_progress_endpoint,
    },
    import::{get_import_page, import_transactions_endpoint, preview_import_endpoint},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::{export_transactions_endpoint, get_reports_page},
    rule::{apply_rules_endpoint, create_rule_endpoint, delete_rule_endpoint, get_rules_page},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
        get_new_transaction_page, get_transactions_page, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::RULES_VIEW, get(get_rules_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::BUDGETS_API, post(set_budget_endpoint))
        .route(endpoints::BUDGET, delete(delete_budget_endpoint))
        .route(endpoints::GOALS_API, post(create_goal_endpoint))
        .route(endpoints::GOAL, delete(delete_goal_endpoint))
        .route(endpoints::GOAL_PROGRESS, put(update_goal_progress_endpoint))
        .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(endpoints::RULES_API, post(create_rule_endpoint))
        .route(endpoints::RULE, delete(delete_rule_endpoint))
        .route(endpoints::APPLY_RULES, post(apply_rules_endpoint))
        .route(endpoints::IMPORT, post(import_transactions_endpoint))
        .route(endpoints::IMPORT_PREVIEW, post(preview_import_endpoint))
        .route(endpoints::EXPORT, get(export_transactions_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;

    use crate::{AppState, endpoints, routing::build_router};

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "Etc/UTC").expect("Could not create app state");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn every_page_renders() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::IMPORT_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::NEW_CATEGORY_VIEW,
            endpoints::RULES_VIEW,
        ] {
            let response = server.get(page).await;

            assert_eq!(response.status_code(), StatusCode::OK, "GET {page}");
        }
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/definitely/not/a/page")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn error_page_is_internal_server_error() {
        let server = get_test_server();

        server
            .get(endpoints::INTERNAL_ERROR_VIEW)
            .await
            .assert_status_internal_server_error();
    }

    #[tokio::test]
    async fn export_downloads_csv() {
        let server = get_test_server();

        let response = server
            .get(endpoints::EXPORT)
            .add_query_param("start", "2026-01-01")
            .add_query_param("end", "2026-01-31")
            .await;

        response.assert_status_ok();
        assert!(
            response
                .text()
                .starts_with("date,description,amount,category,type"),
            "got {}",
            response.text()
        );
    }

    #[tokio::test]
    async fn preview_does_not_save_transactions() {
        let server = get_test_server();
        let csv = "date,description,amount\n2026-01-15,Grocery Store,125.50\n";
        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(csv.as_bytes().to_vec())
                .file_name("statement.csv")
                .mime_type("text/csv"),
        );

        let response = server.post(endpoints::IMPORT_PREVIEW).multipart(form).await;

        response.assert_status_ok();
        assert!(response.text().contains("Grocery Store"));
        let export = server
            .get(endpoints::EXPORT)
            .add_query_param("start", "2026-01-01")
            .add_query_param("end", "2026-01-31")
            .await;
        assert!(
            !export.text().contains("Grocery Store"),
            "got {}",
            export.text()
        );
    }
}
