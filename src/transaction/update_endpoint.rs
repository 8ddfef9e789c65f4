//! Defines the endpoint for amending a recorded transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    envelope::get_envelope,
    transaction::{Transaction, get_transaction, map_row_to_transaction},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for amending a transaction.
#[derive(Debug, Deserialize)]
pub struct EditTransaction {
    /// The ID of the envelope the balance adjustment is applied to.
    pub envelope_id: DatabaseId,
    /// Who the money goes to.
    pub recipient: String,
    /// The new amount of money withdrawn.
    pub amount: i64,
    /// When the transaction happened. Defaults to today (UTC) if omitted.
    pub date: Option<Date>,
}

/// A route handler for amending a transaction, responds with the updated
/// transaction as JSON.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Path(transaction_id): Path<DatabaseId>,
    Json(data): Json<EditTransaction>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_transaction(transaction_id, &data, &connection) {
        Ok(transaction) => (StatusCode::OK, Json(transaction)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Amend a transaction, re-deriving the envelope balance.
///
/// The old amount is reversed and the new amount applied, both against the
/// envelope id supplied in `data`. When the supplied envelope differs from
/// the transaction's original owner, the original owner is left untouched
/// and the supplied envelope absorbs both adjustments. This matches the
/// behavior the API has always had for reassignment; callers are responsible
/// for supplying the correct target envelope.
///
/// The balance adjustment and the row update run in a single database
/// transaction and commit or roll back together. An adjustment that would
/// drive the supplied envelope's balance negative is rejected by the schema
/// and surfaces as an SQL error.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyRecipient] if `data.recipient` is empty,
/// - [Error::NonPositiveAmount] if `data.amount` is zero or negative,
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::EnvelopeNotFound] if `data.envelope_id` does not refer to a
///   valid envelope,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: DatabaseId,
    data: &EditTransaction,
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

    let existing = get_transaction(id, &tx)?;

    get_envelope(data.envelope_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::EnvelopeNotFound,
        error => error,
    })?;

    tx.execute(
        "UPDATE envelope SET amount = amount + ?1 - ?2 WHERE id = ?3",
        params![existing.amount, data.amount, data.envelope_id],
    )?;

    let transaction = tx
        .prepare(
            "UPDATE \"transaction\"
             SET envelope_id = ?1, recipient = ?2, amount = ?3, date = ?4
             WHERE id = ?5
             RETURNING id, envelope_id, recipient, amount, date",
        )?
        .query_row(
            params![data.envelope_id, data.recipient, data.amount, date, id],
            map_row_to_transaction,
        )?;

    tx.commit()?;

    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        envelope::{NewEnvelope, create_envelope, get_envelope},
        initialize_db,
        transaction::{NewTransaction, Transaction, create_transaction, get_transaction},
    };

    use super::{EditTransaction, update_transaction};

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

    fn must_create_transaction(
        envelope_id: i64,
        recipient: &str,
        amount: i64,
        connection: &Connection,
    ) -> Transaction {
        create_transaction(
            &NewTransaction {
                envelope_id,
                recipient: recipient.to_owned(),
                amount,
                date: Some(date!(2025 - 03 - 14)),
            },
            connection,
        )
        .expect("could not create test transaction")
    }

    #[test]
    fn amending_amount_re_derives_the_envelope_balance() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 200, &connection);
        let transaction = must_create_transaction(envelope.id, "Store", 75, &connection);
        assert_eq!(get_envelope(envelope.id, &connection).unwrap().amount, 125);

        let updated = update_transaction(
            transaction.id,
            &EditTransaction {
                envelope_id: envelope.id,
                recipient: "Store".to_owned(),
                amount: 100,
                date: Some(transaction.date),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.amount, 100);
        assert_eq!(get_envelope(envelope.id, &connection).unwrap().amount, 100);
    }

    #[test]
    fn amending_fields_overwrites_the_row() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 200, &connection);
        let transaction = must_create_transaction(envelope.id, "Store", 75, &connection);

        let updated = update_transaction(
            transaction.id,
            &EditTransaction {
                envelope_id: envelope.id,
                recipient: "Market".to_owned(),
                amount: 75,
                date: Some(date!(2025 - 04 - 01)),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.recipient, "Market");
        assert_eq!(updated.date, date!(2025 - 04 - 01));
        assert_eq!(
            updated,
            get_transaction(transaction.id, &connection).unwrap()
        );
    }

    #[test]
    fn reassignment_applies_both_adjustments_to_the_supplied_envelope() {
        let connection = must_create_test_connection();
        let original = must_create_envelope("Groceries", 200, &connection);
        let other = must_create_envelope("Eating Out", 100, &connection);
        let transaction = must_create_transaction(original.id, "Store", 75, &connection);
        assert_eq!(get_envelope(original.id, &connection).unwrap().amount, 125);

        let updated = update_transaction(
            transaction.id,
            &EditTransaction {
                envelope_id: other.id,
                recipient: "Store".to_owned(),
                amount: 50,
                date: Some(transaction.date),
            },
            &connection,
        )
        .unwrap();

        // The original envelope keeps the deduction; the supplied envelope
        // absorbs the reversal of the old amount and the new charge.
        assert_eq!(updated.envelope_id, other.id);
        assert_eq!(get_envelope(original.id, &connection).unwrap().amount, 125);
        assert_eq!(get_envelope(other.id, &connection).unwrap().amount, 125);
    }

    #[test]
    fn adjustment_that_would_go_negative_is_rejected_by_the_schema() {
        let connection = must_create_test_connection();
        let original = must_create_envelope("Groceries", 200, &connection);
        let other = must_create_envelope("Eating Out", 10, &connection);
        let transaction = must_create_transaction(original.id, "Store", 20, &connection);

        // +20 - 100 against an envelope holding 10 would go negative.
        let result = update_transaction(
            transaction.id,
            &EditTransaction {
                envelope_id: other.id,
                recipient: "Store".to_owned(),
                amount: 100,
                date: Some(transaction.date),
            },
            &connection,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
        assert_eq!(get_envelope(other.id, &connection).unwrap().amount, 10);
        assert_eq!(
            get_transaction(transaction.id, &connection).unwrap(),
            transaction
        );
    }

    #[test]
    fn unknown_transaction_fails_with_not_found() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 200, &connection);

        let result = update_transaction(
            999,
            &EditTransaction {
                envelope_id: envelope.id,
                recipient: "Store".to_owned(),
                amount: 10,
                date: None,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn unknown_envelope_fails_with_envelope_not_found() {
        let connection = must_create_test_connection();
        let envelope = must_create_envelope("Groceries", 200, &connection);
        let transaction = must_create_transaction(envelope.id, "Store", 75, &connection);

        let result = update_transaction(
            transaction.id,
            &EditTransaction {
                envelope_id: 999,
                recipient: "Store".to_owned(),
                amount: 10,
                date: None,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::EnvelopeNotFound));
        assert_eq!(get_envelope(envelope.id, &connection).unwrap().amount, 125);
    }
}
