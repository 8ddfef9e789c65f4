//! The API endpoints URIs.

/// The route to list envelopes or create a new one.
pub const ENVELOPES: &str = "/envelopes";
/// The route to get, update, delete, or subtract from a single envelope.
pub const ENVELOPE: &str = "/envelopes/{envelope_id}";
/// The route to transfer money between two envelopes.
pub const TRANSFER: &str = "/envelopes/transfer/{from_id}/{to_id}";
/// The route to list transactions or create a new one.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to get, update, or delete a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
