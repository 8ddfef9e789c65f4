mod core;
mod create_endpoint;
mod delete_endpoint;
mod get_endpoint;
mod list_endpoint;
mod subtract_endpoint;
mod transfer_endpoint;
mod update_endpoint;

pub use core::{
    Envelope, add_to_balance, create_envelope_table, get_envelope, map_row_to_envelope,
    subtract_from_balance,
};
pub use create_endpoint::{NewEnvelope, create_envelope, create_envelope_endpoint};
pub use delete_endpoint::delete_envelope_endpoint;
pub use get_endpoint::get_envelope_endpoint;
pub use list_endpoint::list_envelopes_endpoint;
pub use subtract_endpoint::subtract_endpoint;
pub use transfer_endpoint::transfer_endpoint;
pub use update_endpoint::update_envelope_endpoint;
