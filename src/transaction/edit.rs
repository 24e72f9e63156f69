//! The page and endpoint for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    transaction::{
        core::{Transaction, TransactionId, get_transaction, update_transaction},
        form::{TransactionForm, TransactionFormDefaults, transaction_form_fields},
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the form for editing the transaction `transaction_id`.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
        }
    })?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(edit_transaction_view(&transaction, &categories).into_response())
}

/// Replaces the transaction `transaction_id` with the submitted values.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = form
        .into_builder()
        .and_then(|builder| update_transaction(transaction_id, builder, &connection));

    match result {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::UpdateMissingTransaction) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_transaction_view(transaction: &Transaction, available_categories: &[Category]) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let update_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let nav_bar = NavBar::new(&edit_url).into_html();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            transaction_type: transaction.transaction_type,
            amount: Some(transaction.amount),
            date: transaction.date,
            description: Some(&transaction.description),
            category_id: transaction.category_id,
            account: Some(&transaction.account),
            notes: Some(&transaction.notes),
            autofocus_amount: false,
        },
        available_categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (fields)

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Transaction" }
            }
        }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        Error, endpoints,
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, get_test_connection, must_get_form,
            parse_html_document,
        },
        transaction::{
            Transaction, TransactionType, create_transaction, form::TransactionForm,
            get_edit_transaction_page, get_transaction, update_transaction_endpoint,
        },
    };

    use super::EditTransactionState;

    fn get_state() -> EditTransactionState {
        EditTransactionState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn render_page_with_current_values() {
        let state = get_state();
        let transaction = create_transaction(
            Transaction::build(12.5, date!(2026 - 01 - 15), "Coffee beans"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_edit_transaction_page(Path(transaction.id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "12.50");
        assert_form_input_with_value(&form, "date", "date", "2026-01-15");
        assert_form_input_with_value(&form, "description", "text", "Coffee beans");
        assert_form_submit_button_with_text(&form, "Update Transaction");
    }

    #[tokio::test]
    async fn page_for_missing_transaction_is_not_found() {
        let result = get_edit_transaction_page(Path(42), State(get_state())).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let state = get_state();
        let transaction = create_transaction(
            Transaction::build(12.5, date!(2026 - 01 - 15), "Coffee beans"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = TransactionForm {
            transaction_type: TransactionType::Income,
            amount: 20.0,
            date: date!(2026 - 01 - 16),
            description: "Refund".to_owned(),
            category_id: None,
            account: String::new(),
            notes: "returned the beans".to_owned(),
        };

        let response =
            update_transaction_endpoint(Path(transaction.id), State(state.clone()), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let got = get_transaction(transaction.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.description, "Refund");
        assert_eq!(got.transaction_type, TransactionType::Income);
        assert_eq!(got.notes, "returned the beans");
    }

    #[tokio::test]
    async fn update_rejects_zero_amount_and_keeps_transaction() {
        let state = get_state();
        let transaction = create_transaction(
            Transaction::build(12.5, date!(2026 - 01 - 15), "Coffee beans"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = TransactionForm {
            transaction_type: TransactionType::Expense,
            amount: 0.0,
            date: date!(2026 - 01 - 16),
            description: "Coffee beans".to_owned(),
            category_id: None,
            account: String::new(),
            notes: String::new(),
        };

        let response =
            update_transaction_endpoint(Path(transaction.id), State(state.clone()), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let got = get_transaction(transaction.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got, transaction);
    }

    #[tokio::test]
    async fn update_missing_transaction_returns_not_found() {
        let form = TransactionForm {
            transaction_type: TransactionType::Expense,
            amount: 20.0,
            date: date!(2026 - 01 - 16),
            description: "Nothing".to_owned(),
            category_id: None,
            account: String::new(),
            notes: String::new(),
        };

        let response = update_transaction_endpoint(Path(42), State(get_state()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
