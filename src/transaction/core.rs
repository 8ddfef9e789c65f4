use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseId};

/// A recorded withdrawal of money from an envelope to a recipient.
///
/// A transaction's existence means its amount has already been subtracted
/// from the owning envelope's balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The ID of the envelope the money was taken out of.
    pub envelope_id: DatabaseId,
    /// Who the money went to.
    pub recipient: String,
    /// The amount of money withdrawn from the envelope.
    pub amount: i64,
    /// When the transaction happened.
    pub date: Date,
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            envelope_id INTEGER NOT NULL REFERENCES envelope (id) ON DELETE CASCADE,
            recipient TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let envelope_id = row.get(1)?;
    let recipient = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;

    Ok(Transaction {
        id,
        envelope_id,
        recipient,
        amount,
        date,
    })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: DatabaseId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, envelope_id, recipient, amount, date FROM \"transaction\" WHERE id = ?1",
        )?
        .query_row(params![id], map_row_to_transaction)?;

    Ok(transaction)
}
