use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// A named budget bucket holding a non-negative amount of money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The id for the envelope.
    pub id: DatabaseId,
    /// The name of the budget the envelope is for.
    pub name: String,
    /// The amount of money left in the envelope.
    pub amount: i64,
}

pub fn create_envelope_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS envelope (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount >= 0)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_envelope(row: &Row) -> Result<Envelope, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let amount = row.get(2)?;

    Ok(Envelope { id, name, amount })
}

/// Retrieve an envelope from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid envelope,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_envelope(id: DatabaseId, connection: &Connection) -> Result<Envelope, Error> {
    let envelope = connection
        .prepare("SELECT id, name, amount FROM envelope WHERE id = ?1")?
        .query_row(params![id], map_row_to_envelope)?;

    Ok(envelope)
}

/// Subtract `amount` from an envelope's balance.
///
/// The balance check and the decrement are a single guarded statement, so two
/// concurrent subtractions can never both pass the check against a stale
/// balance and jointly drive the balance negative.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid envelope,
/// - [Error::InsufficientFunds] if the envelope holds less than `amount`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn subtract_from_balance(
    id: DatabaseId,
    amount: i64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE envelope SET amount = amount - ?1 WHERE id = ?2 AND amount >= ?1",
        params![amount, id],
    )?;

    if rows_affected == 0 {
        // The guard filtered the row out: either the envelope does not exist
        // or it does not hold enough money.
        get_envelope(id, connection)?;
        return Err(Error::InsufficientFunds);
    }

    Ok(())
}

/// Add `amount` to an envelope's balance.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid envelope,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_to_balance(id: DatabaseId, amount: i64, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE envelope SET amount = amount + ?1 WHERE id = ?2",
        params![amount, id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
