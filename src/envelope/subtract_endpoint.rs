//! Defines the endpoint for subtracting money from an envelope.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    envelope::{Envelope, get_envelope, map_row_to_envelope},
};

/// The state needed to subtract money from an envelope.
#[derive(Debug, Clone)]
pub struct SubtractState {
    /// The database connection for managing envelopes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SubtractState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for subtracting money from an envelope.
#[derive(Debug, Deserialize)]
pub struct SubtractQuery {
    /// The amount of money to take out of the envelope.
    pub subtract: i64,
}

/// A route handler for subtracting money from an envelope, responds with the
/// updated envelope as JSON.
pub async fn subtract_endpoint(
    State(state): State<SubtractState>,
    Path(envelope_id): Path<DatabaseId>,
    Query(query): Query<SubtractQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match subtract_from_envelope(envelope_id, query.subtract, &connection) {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Subtract `amount` from an envelope's balance and return the updated
/// envelope.
///
/// The balance check and the decrement are a single guarded statement, so
/// concurrent subtractions serialize at the database and the balance can
/// never go negative.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if `amount` is zero or negative,
/// - [Error::NotFound] if `id` does not refer to a valid envelope,
/// - [Error::InsufficientFunds] if the envelope holds less than `amount`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn subtract_from_envelope(
    id: DatabaseId,
    amount: i64,
    connection: &Connection,
) -> Result<Envelope, Error> {
    if amount <= 0 {
        return Err(Error::NonPositiveAmount(amount));
    }

    let result = connection
        .prepare(
            "UPDATE envelope SET amount = amount - ?1
             WHERE id = ?2 AND amount >= ?1
             RETURNING id, name, amount",
        )?
        .query_row(params![amount, id], map_row_to_envelope);

    match result {
        Ok(envelope) => Ok(envelope),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            // The guard filtered the row out: either the envelope does not
            // exist or it does not hold enough money.
            get_envelope(id, connection)?;
            Err(Error::InsufficientFunds)
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        envelope::{
            create_endpoint::{NewEnvelope, create_envelope},
            get_envelope,
        },
        initialize_db,
    };

    use super::subtract_from_envelope;

    fn must_create_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        connection
    }

    fn must_create_envelope(name: &str, amount: i64, connection: &Connection) -> crate::Envelope {
        create_envelope(
            &NewEnvelope {
                name: name.to_owned(),
                amount,
            },
            connection,
        )
        .expect("could not create test envelope")
    }

    #[test]
    fn subtracts_and_returns_updated_envelope() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 100, &connection);

        let updated = subtract_from_envelope(envelope.id, 30, &connection).unwrap();

        assert_eq!(updated.amount, 70);
    }

    #[test]
    fn subtracting_exact_balance_leaves_zero() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 100, &connection);

        let updated = subtract_from_envelope(envelope.id, 100, &connection).unwrap();

        assert_eq!(updated.amount, 0);
    }

    #[test]
    fn subtracting_more_than_balance_fails_and_leaves_balance_unchanged() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 100, &connection);

        let result = subtract_from_envelope(envelope.id, 101, &connection);

        assert_eq!(result, Err(Error::InsufficientFunds));
        assert_eq!(get_envelope(envelope.id, &connection).unwrap().amount, 100);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 100, &connection);

        assert_eq!(
            subtract_from_envelope(envelope.id, 0, &connection),
            Err(Error::NonPositiveAmount(0))
        );
        assert_eq!(
            subtract_from_envelope(envelope.id, -5, &connection),
            Err(Error::NonPositiveAmount(-5))
        );
    }

    #[test]
    fn unknown_envelope_fails_with_not_found() {
        let connection = must_create_test_connection();

        let result = subtract_from_envelope(999, 10, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn concurrent_subtractions_do_not_lose_updates() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 100, &connection);
        let connection = Arc::new(Mutex::new(connection));

        let handles: Vec<_> = (0..150)
            .map(|_| {
                let connection = Arc::clone(&connection);
                let envelope_id = envelope.id;
                std::thread::spawn(move || {
                    let connection = connection.lock().unwrap();
                    subtract_from_envelope(envelope_id, 1, &connection).is_ok()
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .filter(|handle| handle.join().unwrap())
            .count();

        // Exactly 100 of the 150 requests fit in the envelope; the final
        // balance is the initial balance minus the accepted amounts.
        assert_eq!(accepted, 100);
        let connection = connection.lock().unwrap();
        assert_eq!(get_envelope(envelope.id, &connection).unwrap().amount, 0);
    }
}
