//! Defines the endpoint for creating a new transaction.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, endpoints,
    html::error_view,
    render,
    session::Session,
    transaction::{TransactionDraft, TransactionKind, TransactionLedger},
};

/// The state needed to create a transaction.
#[derive(Clone)]
pub struct CreateTransactionState {
    /// The store accessor for transactions.
    pub ledger: TransactionLedger,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct NewTransactionForm {
    /// Text detailing the transaction.
    pub description: String,
    /// The value of the transaction. Must be positive.
    pub amount: f64,
    /// The category of the transaction. Must belong to the selected kind's
    /// category set.
    pub category: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
}

fn invalid_form_response(fix: &str) -> Response {
    render(
        StatusCode::UNPROCESSABLE_ENTITY,
        error_view("Invalid Transaction", "422", "That transaction is not valid.", fix),
    )
}

/// A route handler for creating a new transaction, redirects to the
/// transactions view on success.
///
/// The transaction goes to the remote store when one is reachable and to
/// the local snapshot otherwise. Either way the client sees the same
/// redirect.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(session): Extension<Session>,
    Form(form): Form<NewTransactionForm>,
) -> Response {
    if form.description.trim().is_empty() {
        return invalid_form_response("Enter a description.");
    }

    if !(form.amount > 0.0) {
        return invalid_form_response("The amount must be greater than zero.");
    }

    if !form.kind.categories().contains(&form.category.as_str()) {
        return invalid_form_response("Pick a category that matches the transaction type.");
    }

    let draft = TransactionDraft {
        owner: session.user_id.clone(),
        description: form.description,
        amount: form.amount,
        category: form.category,
        date: form.date,
        kind: form.kind,
    };

    if let Err(error) = state.ledger.create(&session, draft).await {
        return error.into_response();
    }

    Redirect::to(endpoints::TRANSACTIONS_VIEW).into_response()
}
