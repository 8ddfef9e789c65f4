//! Defines the endpoint for transferring money between two envelopes.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    envelope::{add_to_balance, subtract_from_balance},
};

/// The state needed to transfer money between envelopes.
#[derive(Debug, Clone)]
pub struct TransferState {
    /// The database connection for managing envelopes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// The amount of money to move from the source to the destination
    /// envelope.
    pub amount: i64,
}

/// A route handler for transferring money between two envelopes.
///
/// A transfer moves money without recording a transaction: the source is
/// decremented and the destination incremented in one atomic unit, so either
/// both changes persist or neither does.
pub async fn transfer_endpoint(
    State(state): State<TransferState>,
    Path((from_id, to_id)): Path<(DatabaseId, DatabaseId)>,
    Json(data): Json<TransferRequest>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match transfer_between_envelopes(from_id, to_id, data.amount, &connection) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message":
                    format!("Transferred {} from envelope {from_id} to {to_id}", data.amount),
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// Move `amount` from one envelope to another.
///
/// Both balance updates run in a single database transaction and commit or
/// roll back together.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if `amount` is zero or negative,
/// - [Error::NotFound] if either envelope does not exist,
/// - [Error::InsufficientFunds] if the source envelope holds less than
///   `amount`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn transfer_between_envelopes(
    from_id: DatabaseId,
    to_id: DatabaseId,
    amount: i64,
    connection: &Connection,
) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::NonPositiveAmount(amount));
    }

    // Using unchecked_transaction because we only have &Connection from the
    // MutexGuard. This is safe because we hold the mutex lock and won't have
    // nested transactions.
    let tx = connection.unchecked_transaction()?;

    subtract_from_balance(from_id, amount, &tx)?;
    add_to_balance(to_id, amount, &tx)?;

    tx.commit()?;

    Ok(())
}
