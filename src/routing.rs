//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    envelope::{
        create_envelope_endpoint, delete_envelope_endpoint, get_envelope_endpoint,
        list_envelopes_endpoint, subtract_endpoint, transfer_endpoint, update_envelope_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::ENVELOPES,
            get(list_envelopes_endpoint).post(create_envelope_endpoint),
        )
        .route(
            endpoints::ENVELOPE,
            get(get_envelope_endpoint)
                .put(update_envelope_endpoint)
                .delete(delete_envelope_endpoint)
                .post(subtract_endpoint),
        )
        .route(endpoints::TRANSFER, post(transfer_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .with_state(state)
}
