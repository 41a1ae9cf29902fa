//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    fallback::SnapshotStore, remote::RemoteStore, session::DEFAULT_SESSION_DURATION,
    transaction::TransactionLedger,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which session cookies are valid.
    pub session_duration: Duration,

    /// The remote store, or `None` when running in local-only mode.
    pub remote: Option<Arc<dyn RemoteStore>>,

    /// The transaction store accessor.
    pub ledger: TransactionLedger,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `remote` is `None` when the remote store credentials are missing, in
    /// which case the app serves the anonymous local session only.
    pub fn new(
        cookie_secret: &str,
        remote: Option<Arc<dyn RemoteStore>>,
        snapshot: SnapshotStore,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            session_duration: DEFAULT_SESSION_DURATION,
            remote: remote.clone(),
            ledger: TransactionLedger::new(remote, snapshot),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
