//! EAZZY is a web app for tracking personal income and expenses against a
//! monthly summary.
//!
//! The authoritative data store is a managed, Supabase-compatible backend
//! (authentication plus a REST record store). This library implements the
//! client side of that protocol and a local snapshot fallback that keeps the
//! app usable when the remote store is unreachable or unconfigured.
//!
//! The library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_server::Handle;
use maud::Markup;
use tokio::signal;

mod app_state;
mod auth_middleware;
mod endpoints;
mod export;
mod fallback;
mod html;
mod log_in;
mod log_out;
mod not_found;
mod register_user;
mod remote;
mod routing;
mod session;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use fallback::SnapshotStore;
pub use remote::{
    REMOTE_KEY_VAR, REMOTE_URL_VAR, RemoteConfig, RemoteError, RemoteStore, http::HttpRemote,
};
pub use routing::build_router;
pub use user::{PaymentSchedule, ProfileData, UserId};

use crate::{html::error_view, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
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

/// Render maud markup as an HTML response with `status_code`.
#[inline]
pub(crate) fn render(status_code: StatusCode, markup: Markup) -> Response {
    (status_code, Html(markup.into_string())).into_response()
}

/// The errors that may occur in the application.
///
/// Remote store failures never appear here: the transaction ledger catches
/// and logs them, then serves the request from the local snapshot. Only
/// conditions the caller must act on are surfaced.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The local snapshot file could not be read or parsed.
    #[error("could not read the fallback snapshot: {0}")]
    SnapshotRead(String),

    /// The local snapshot file could not be written.
    #[error("could not write the fallback snapshot: {0}")]
    SnapshotWrite(String),

    /// A CSV row could not be serialized during export.
    #[error("could not serialize CSV: {0}")]
    CsvError(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A date-time could not be formatted, e.g. for the session expiry cookie.
    #[error("could not format a date-time: {0}")]
    DateFormat(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Server Error",
                        "500",
                        "Sorry, something went wrong.",
                        "Try again later or check the server logs.",
                    ),
                )
            }
        }
    }
}
