//! Defines the endpoint for listing all envelopes.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    envelope::{Envelope, map_row_to_envelope},
};

/// The state needed to list envelopes.
#[derive(Debug, Clone)]
pub struct ListEnvelopesState {
    /// The database connection for managing envelopes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListEnvelopesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all envelopes as JSON.
pub async fn list_envelopes_endpoint(State(state): State<ListEnvelopesState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match list_envelopes(&connection) {
        Ok(envelopes) => (StatusCode::OK, Json(envelopes)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Retrieve all envelopes from the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is a SQL error.
pub fn list_envelopes(connection: &Connection) -> Result<Vec<Envelope>, Error> {
    connection
        .prepare("SELECT id, name, amount FROM envelope")?
        .query_map([], map_row_to_envelope)?
        .map(|envelope_result| envelope_result.map_err(Error::SqlError))
        .collect()
}
