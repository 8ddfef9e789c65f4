//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde_json::json;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    envelope::add_to_balance,
    transaction::get_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Deleting a transaction returns its amount to the owning envelope.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Transaction deleted" })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// Delete a transaction, returning its amount to the owning envelope.
///
/// The balance adjustment and the row deletion run in a single database
/// transaction and commit or roll back together.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    // Using unchecked_transaction because we only have &Connection from the
    // MutexGuard. This is safe because we hold the mutex lock and won't have
    // nested transactions.
    let tx = connection.unchecked_transaction()?;

    let transaction = get_transaction(id, &tx)?;
    add_to_balance(transaction.envelope_id, transaction.amount, &tx)?;
    tx.execute("DELETE FROM \"transaction\" WHERE id = ?1", params![id])?;

    tx.commit()?;

    Ok(())
}
