//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, endpoints, session::Session, transaction::TransactionLedger};

/// The state needed to delete a transaction.
#[derive(Clone)]
pub struct DeleteTransactionState {
    /// The store accessor for transactions.
    pub ledger: TransactionLedger,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// A route handler for deleting a transaction, redirects to the
/// transactions view.
///
/// Deletion is idempotent: deleting an ID that no store holds still
/// succeeds and still redirects, so a double-submitted form never shows the
/// user an error.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(session): Extension<Session>,
    Path(transaction_id): Path<String>,
) -> Response {
    if let Err(error) = state.ledger.delete(&session, &transaction_id).await {
        return error.into_response();
    }

    Redirect::to(endpoints::TRANSACTIONS_VIEW).into_response()
}
