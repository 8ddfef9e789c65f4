//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{envelope::create_envelope_table, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not exist.
///
/// Table creation runs inside an exclusive transaction so that two server
/// processes starting against the same database file cannot observe a
/// partially created schema.
///
/// Foreign key enforcement is off by default in SQLite and is enabled here,
/// per connection. Deleting an envelope relies on it to cascade to the
/// envelope's transactions.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_envelope_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn initialize_twice_is_a_no_op() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        initialize(&connection).unwrap();

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = connection.execute(
            "INSERT INTO \"transaction\" (envelope_id, recipient, amount, date)
             VALUES (999, 'nobody', 1, '2025-01-01')",
            (),
        );

        assert!(result.is_err());
    }
}
