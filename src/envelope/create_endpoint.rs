//! Defines the endpoint for creating a new envelope.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    envelope::{Envelope, map_row_to_envelope},
};

/// The state needed to create an envelope.
#[derive(Debug, Clone)]
pub struct CreateEnvelopeState {
    /// The database connection for managing envelopes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateEnvelopeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an envelope.
#[derive(Debug, Deserialize)]
pub struct NewEnvelope {
    /// The name of the budget the envelope is for.
    pub name: String,
    /// The amount of money to fund the envelope with.
    pub amount: i64,
}

/// A route handler for creating a new envelope, responds with the created
/// envelope as JSON.
pub async fn create_envelope_endpoint(
    State(state): State<CreateEnvelopeState>,
    Json(data): Json<NewEnvelope>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_envelope(&data, &connection) {
        Ok(envelope) => (StatusCode::CREATED, Json(envelope)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Insert a new envelope with the given starting balance.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyEnvelopeName] if `data.name` is empty,
/// - [Error::NegativeAmount] if `data.amount` is negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_envelope(data: &NewEnvelope, connection: &Connection) -> Result<Envelope, Error> {
    if data.name.trim().is_empty() {
        return Err(Error::EmptyEnvelopeName);
    }

    if data.amount < 0 {
        return Err(Error::NegativeAmount(data.amount));
    }

    let envelope = connection
        .prepare("INSERT INTO envelope (name, amount) VALUES (?1, ?2) RETURNING id, name, amount")?
        .query_row(params![data.name, data.amount], map_row_to_envelope)?;

    Ok(envelope)
}
