//! Defines the endpoint for deleting an envelope.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::DatabaseId};

/// The state needed to delete an envelope.
#[derive(Debug, Clone)]
pub struct DeleteEnvelopeState {
    /// The database connection for managing envelopes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteEnvelopeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an envelope.
///
/// Deleting an envelope also deletes its transactions, via the foreign key
/// cascade set up in the schema.
pub async fn delete_envelope_endpoint(
    State(state): State<DeleteEnvelopeState>,
    Path(envelope_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_envelope(envelope_id, &connection) {
        Ok(rows_affected) if rows_affected != 0 => StatusCode::OK.into_response(),
        Ok(_) => Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!("Could not delete envelope {envelope_id}: {error}");
            error.into_response()
        }
    }
}

type RowsAffected = usize;

fn delete_envelope(id: DatabaseId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM envelope WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}
