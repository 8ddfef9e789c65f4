mod core;
mod create_endpoint;
mod delete_endpoint;
mod get_endpoint;
mod list_endpoint;
mod update_endpoint;

pub use core::{Transaction, create_transaction_table, get_transaction, map_row_to_transaction};
pub use create_endpoint::{NewTransaction, create_transaction, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use update_endpoint::update_transaction_endpoint;
