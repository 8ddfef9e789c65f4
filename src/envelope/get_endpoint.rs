//! Defines the endpoint for getting a single envelope.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::DatabaseId, envelope::get_envelope};

/// The state needed to get an envelope.
#[derive(Debug, Clone)]
pub struct GetEnvelopeState {
    /// The database connection for managing envelopes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetEnvelopeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for getting an envelope by its database ID.
///
/// This function will return the status code 404 if the requested resource
/// does not exist (e.g., not created yet).
pub async fn get_envelope_endpoint(
    State(state): State<GetEnvelopeState>,
    Path(envelope_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_envelope(envelope_id, &connection) {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(error) => error.into_response(),
    }
}
