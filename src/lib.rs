//! Envelopeur is a personal budgeting API built around the envelope method:
//! money is split across named envelopes, and every withdrawal is recorded as
//! a transaction against the envelope it came out of.
//!
//! This library provides a REST API that serves JSON. Envelope balances are
//! kept consistent with the recorded transactions: creating, amending, or
//! deleting a transaction adjusts the owning envelope's balance in the same
//! atomic unit of work, and no operation may drive a balance below zero.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod envelope;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use envelope::Envelope;
pub use routing::build_router;
pub use transaction::Transaction;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used for an envelope name.
    #[error("envelope name cannot be empty")]
    EmptyEnvelopeName,

    /// An empty string was used for a transaction recipient.
    #[error("recipient cannot be empty")]
    EmptyRecipient,

    /// A negative amount was used to fund an envelope.
    #[error("{0} is a negative amount of money, which is not allowed")]
    NegativeAmount(i64),

    /// A zero or negative amount was used where money must actually move.
    #[error("{0} is not a positive amount of money")]
    NonPositiveAmount(i64),

    /// The operation would drive an envelope's balance below zero.
    ///
    /// This is an expected, user-facing outcome: the client asked to move
    /// more money than the envelope holds.
    #[error("the envelope does not hold enough money")]
    InsufficientFunds,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The envelope ID supplied for a transaction does not refer to an
    /// existing envelope.
    #[error("the envelope ID does not refer to a valid envelope")]
    EnvelopeNotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::EnvelopeNotFound
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, category) = match &self {
            Error::EmptyEnvelopeName
            | Error::EmptyRecipient
            | Error::NegativeAmount(_)
            | Error::NonPositiveAmount(_) => (StatusCode::BAD_REQUEST, "validation"),
            Error::InsufficientFunds => (StatusCode::BAD_REQUEST, "insufficient_funds"),
            Error::NotFound | Error::EnvelopeNotFound => (StatusCode::NOT_FOUND, "not_found"),
            Error::SqlError(_) | Error::DatabaseLockError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage")
            }
        };

        // Storage errors are logged where they occur and must not leak
        // internal detail to the client.
        let message = match &self {
            Error::SqlError(_) | Error::DatabaseLockError => "Internal server error".to_owned(),
            error => error.to_string(),
        };

        (
            status,
            Json(json!({
                "error": category,
                "message": message,
            })),
        )
            .into_response()
    }
}
