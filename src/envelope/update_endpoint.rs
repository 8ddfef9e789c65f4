//! Defines the endpoint for updating an envelope.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    envelope::{Envelope, map_row_to_envelope},
};

/// The state needed to update an envelope.
#[derive(Debug, Clone)]
pub struct UpdateEnvelopeState {
    /// The database connection for managing envelopes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateEnvelopeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating an envelope.
#[derive(Debug, Deserialize)]
pub struct EditEnvelope {
    /// The new name for the envelope.
    pub name: String,
    /// The new balance for the envelope.
    pub amount: i64,
}

/// A route handler for updating an envelope, responds with the updated
/// envelope as JSON.
///
/// The name and amount are overwritten directly; the balance is not derived
/// from the envelope's transactions.
pub async fn update_envelope_endpoint(
    State(state): State<UpdateEnvelopeState>,
    Path(envelope_id): Path<DatabaseId>,
    Json(data): Json<EditEnvelope>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_envelope(envelope_id, &data, &connection) {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Overwrite an envelope's name and amount.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyEnvelopeName] if `data.name` is empty,
/// - [Error::NegativeAmount] if `data.amount` is negative,
/// - [Error::NotFound] if `id` does not refer to a valid envelope,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_envelope(
    id: DatabaseId,
    data: &EditEnvelope,
    connection: &Connection,
) -> Result<Envelope, Error> {
    if data.name.trim().is_empty() {
        return Err(Error::EmptyEnvelopeName);
    }

    if data.amount < 0 {
        return Err(Error::NegativeAmount(data.amount));
    }

    let envelope = connection
        .prepare(
            "UPDATE envelope SET name = ?1, amount = ?2 WHERE id = ?3 RETURNING id, name, amount",
        )?
        .query_row(params![data.name, data.amount, id], map_row_to_envelope)?;

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        envelope::{
            create_endpoint::{NewEnvelope, create_envelope},
            get_envelope,
        },
        initialize_db,
    };

    use super::{EditEnvelope, update_envelope};

    fn must_create_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        connection
    }

    #[test]
    fn overwrites_name_and_amount() {
        let connection = must_create_test_connection();
        let envelope = create_envelope(
            &NewEnvelope {
                name: "Groceries".to_owned(),
                amount: 200,
            },
            &connection,
        )
        .unwrap();

        let updated = update_envelope(
            envelope.id,
            &EditEnvelope {
                name: "Food".to_owned(),
                amount: 350,
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.name, "Food");
        assert_eq!(updated.amount, 350);
        assert_eq!(updated, get_envelope(envelope.id, &connection).unwrap());
    }

    #[test]
    fn returns_not_found_for_unknown_id() {
        let connection = must_create_test_connection();

        let result = update_envelope(
            999,
            &EditEnvelope {
                name: "Food".to_owned(),
                amount: 350,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn rejects_invalid_fields_before_touching_the_database() {
        let connection = must_create_test_connection();
        let envelope = create_envelope(
            &NewEnvelope {
                name: "Groceries".to_owned(),
                amount: 200,
            },
            &connection,
        )
        .unwrap();

        let empty_name = update_envelope(
            envelope.id,
            &EditEnvelope {
                name: String::new(),
                amount: 100,
            },
            &connection,
        );
        let negative_amount = update_envelope(
            envelope.id,
            &EditEnvelope {
                name: "Groceries".to_owned(),
                amount: -10,
            },
            &connection,
        );

        assert_eq!(empty_name, Err(Error::EmptyEnvelopeName));
        assert_eq!(negative_amount, Err(Error::NegativeAmount(-10)));
        let got_envelope = get_envelope(envelope.id, &connection).unwrap();
        assert_eq!(got_envelope, envelope);
    }
}
