//! The client side of the managed remote store.
//!
//! The remote store is a Supabase-compatible service: a password auth
//! endpoint plus a REST record store holding the `users` and `transactions`
//! collections. [RemoteStore] is the seam the rest of the app talks through,
//! so tests can substitute a scripted fake and the transaction ledger can
//! treat "no remote configured" and "remote unreachable" uniformly.

use async_trait::async_trait;

use crate::{
    transaction::{Transaction, TransactionDraft},
    user::{ProfileData, UserId},
};

pub mod http;

/// The base URL and anonymous API key for the remote store, typically read
/// from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// The base URL of the remote store, without a trailing slash.
    pub base_url: String,
    /// The anonymous (publishable) API key sent with every request.
    pub anon_key: String,
}

/// The environment variable holding the remote store's base URL.
pub const REMOTE_URL_VAR: &str = "EAZZY_REMOTE_URL";
/// The environment variable holding the remote store's anonymous API key.
pub const REMOTE_KEY_VAR: &str = "EAZZY_REMOTE_KEY";

impl RemoteConfig {
    /// Read the remote store credentials from the environment.
    ///
    /// Returns `None` if either variable is unset, empty, or still holds a
    /// placeholder value from a template env file. The caller then runs the
    /// app in local-only mode instead of failing at start-up.
    pub fn from_env() -> Option<Self> {
        Self::from_parts(
            std::env::var(REMOTE_URL_VAR).ok()?,
            std::env::var(REMOTE_KEY_VAR).ok()?,
        )
    }

    /// Validate a base URL and key pair.
    ///
    /// Returns `None` for empty or placeholder values.
    pub fn from_parts(base_url: impl Into<String>, anon_key: impl Into<String>) -> Option<Self> {
        let base_url: String = base_url.into();
        let anon_key: String = anon_key.into();

        if base_url.is_empty()
            || anon_key.is_empty()
            || base_url.contains("placeholder")
            || anon_key.contains("placeholder")
        {
            return None;
        }

        let base_url = base_url.trim_end_matches('/').to_owned();

        Some(Self { base_url, anon_key })
    }
}

/// The errors a remote store call can produce.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never got a response, e.g. DNS failure, refused
    /// connection, timeout.
    #[error("could not reach the remote store: {0}")]
    Network(String),

    /// The remote store answered with a non-success status.
    #[error("the remote store returned {status}: {message}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message from the response body, if any.
        message: String,
    },

    /// The response body could not be parsed.
    #[error("could not decode the remote store response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether the error means the credentials were rejected rather than the
    /// service being unavailable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RemoteError::Api { status, .. } if *status == 400 || *status == 401)
    }
}

/// An authenticated session with the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    /// The remote store's ID for the signed-in user.
    pub user_id: UserId,
    /// The bearer token for subsequent record-store calls.
    pub access_token: String,
}

/// The operations the app needs from the remote store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create an auth account for `profile.email` and return a session for
    /// it.
    async fn sign_up(
        &self,
        password: &str,
        profile: &ProfileData,
    ) -> Result<RemoteSession, RemoteError>;

    /// Exchange an email and password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<RemoteSession, RemoteError>;

    /// Invalidate `access_token` on the remote store.
    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError>;

    /// Store the registration profile in the `users` collection.
    async fn insert_profile(
        &self,
        access_token: &str,
        user_id: &UserId,
        profile: &ProfileData,
    ) -> Result<(), RemoteError>;

    /// Store a transaction and return the stored record, including the ID
    /// and creation timestamp the remote store assigned.
    async fn insert_transaction(
        &self,
        access_token: &str,
        draft: &TransactionDraft,
    ) -> Result<Transaction, RemoteError>;

    /// Delete the transaction with `transaction_id`.
    async fn delete_transaction(
        &self,
        access_token: &str,
        transaction_id: &str,
    ) -> Result<(), RemoteError>;

    /// Fetch all of `owner`'s transactions, most recent date first.
    async fn transactions_for(
        &self,
        access_token: &str,
        owner: &UserId,
    ) -> Result<Vec<Transaction>, RemoteError>;
}

#[cfg(test)]
mod config_tests {
    // Environment variables are process-global, so these tests exercise
    // [RemoteConfig::from_parts] directly instead of mutating the environment
    // under a parallel test runner.

    use super::RemoteConfig;

    #[test]
    fn accepts_real_credentials() {
        let config = RemoteConfig::from_parts("https://example.supabase.co", "anon-key")
            .expect("valid credentials should produce a config");

        assert_eq!(config.base_url, "https://example.supabase.co");
        assert_eq!(config.anon_key, "anon-key");
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let config = RemoteConfig::from_parts("https://example.supabase.co/", "anon-key").unwrap();

        assert_eq!(config.base_url, "https://example.supabase.co");
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(RemoteConfig::from_parts("", "anon-key"), None);
        assert_eq!(RemoteConfig::from_parts("https://example.supabase.co", ""), None);
    }

    #[test]
    fn rejects_placeholder_values() {
        assert_eq!(
            RemoteConfig::from_parts("https://placeholder.supabase.co", "anon-key"),
            None
        );
        assert_eq!(
            RemoteConfig::from_parts("https://example.supabase.co", "placeholder-key"),
            None
        );
    }
}
