//! Defines the endpoint for recording a new transaction against an envelope.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    envelope::subtract_from_balance,
    transaction::{Transaction, map_row_to_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct NewTransaction {
    /// The ID of the envelope to withdraw the money from.
    pub envelope_id: DatabaseId,
    /// Who the money goes to.
    pub recipient: String,
    /// The amount of money to withdraw.
    pub amount: i64,
    /// When the transaction happened. Defaults to today (UTC) if omitted.
    pub date: Option<Date>,
}

/// A route handler for recording a new transaction, responds with the created
/// transaction as JSON.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Json(data): Json<NewTransaction>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_transaction(&data, &connection) {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Record a withdrawal from an envelope.
///
/// The envelope's balance is decremented and the transaction row inserted in
/// a single database transaction; either both changes persist or neither
/// does.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyRecipient] if `data.recipient` is empty,
/// - [Error::NonPositiveAmount] if `data.amount` is zero or negative,
/// - [Error::EnvelopeNotFound] if `data.envelope_id` does not refer to a
///   valid envelope,
/// - [Error::InsufficientFunds] if the envelope holds less than
///   `data.amount`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    data: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if data.recipient.trim().is_empty() {
        return Err(Error::EmptyRecipient);
    }

    if data.amount <= 0 {
        return Err(Error::NonPositiveAmount(data.amount));
    }

    let date = data
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());

    // Using unchecked_transaction because we only have &Connection from the
    // MutexGuard. This is safe because we hold the mutex lock and won't have
    // nested transactions.
    let tx = connection.unchecked_transaction()?;

    subtract_from_balance(data.envelope_id, data.amount, &tx).map_err(|error| match error {
        Error::NotFound => Error::EnvelopeNotFound,
        error => error,
    })?;

    let transaction = tx
        .prepare(
            "INSERT INTO \"transaction\" (envelope_id, recipient, amount, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, envelope_id, recipient, amount, date",
        )?
        .query_row(
            params![data.envelope_id, data.recipient, data.amount, date],
            map_row_to_transaction,
        )?;

    tx.commit()?;

    Ok(transaction)
}
