//! The store accessor for transactions.
//!
//! The ledger prefers the remote store and degrades to the local snapshot
//! when the remote store fails or is unconfigured. Handlers never talk to
//! either store directly, they go through the ledger so the degradation
//! rule lives in exactly one place.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::{
    Error,
    fallback::SnapshotStore,
    remote::RemoteStore,
    session::Session,
    transaction::{Transaction, TransactionDraft},
};

/// Which store served or persisted a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The managed remote store.
    Remote,
    /// The local snapshot file.
    Local,
}

/// A transaction together with the store that persisted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted {
    /// Where the record landed.
    pub backend: Backend,
    /// The stored record, with its assigned ID.
    pub transaction: Transaction,
}

/// The transaction store accessor.
///
/// Cloning is cheap, both fields are handles.
#[derive(Clone)]
pub struct TransactionLedger {
    remote: Option<Arc<dyn RemoteStore>>,
    snapshot: SnapshotStore,
}

impl TransactionLedger {
    /// Create a ledger over `remote` (when configured) and the snapshot
    /// file at `snapshot`.
    pub fn new(remote: Option<Arc<dyn RemoteStore>>, snapshot: SnapshotStore) -> Self {
        Self { remote, snapshot }
    }

    /// Whether a configured remote store is available to this session.
    fn remote_for(&self, session: &Session) -> Option<(&Arc<dyn RemoteStore>, String)> {
        let remote = self.remote.as_ref()?;
        let access_token = session.access_token.clone()?;

        Some((remote, access_token))
    }

    /// Persist `draft`, preferring the remote store.
    ///
    /// On remote success the record is NOT mirrored into the snapshot; the
    /// remote store stays the single source of truth for it. On remote
    /// failure, or with no remote store configured, the record is given a
    /// locally synthesized ID and appended to the snapshot instead.
    ///
    /// # Errors
    /// Returns [Error::SnapshotRead] or [Error::SnapshotWrite] if the
    /// fallback path cannot use the snapshot file. Remote errors never
    /// surface, they only divert the record to the snapshot.
    pub async fn create(
        &self,
        session: &Session,
        draft: TransactionDraft,
    ) -> Result<Persisted, Error> {
        if let Some((remote, access_token)) = self.remote_for(session) {
            match remote.insert_transaction(&access_token, &draft).await {
                Ok(transaction) => {
                    return Ok(Persisted {
                        backend: Backend::Remote,
                        transaction,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        "Falling back to the local snapshot, the remote store rejected the \
                         insert: {error}"
                    );
                }
            }
        }

        let mut transactions = self.snapshot.read()?;
        let id = synthesize_id(&transactions);
        let transaction = draft.into_transaction(id, None);
        transactions.push(transaction.clone());
        self.snapshot.write(&transactions)?;

        Ok(Persisted {
            backend: Backend::Local,
            transaction,
        })
    }

    /// Delete the transaction with `transaction_id` from both stores.
    ///
    /// The remote delete is attempted when a remote store is available, but
    /// its outcome never blocks the local removal: a record that only ever
    /// existed in the snapshot has nothing to delete remotely, and a remote
    /// outage must not leave the row stuck on the page.
    ///
    /// # Errors
    /// Returns [Error::SnapshotRead] or [Error::SnapshotWrite] if the
    /// snapshot file cannot be rewritten.
    pub async fn delete(&self, session: &Session, transaction_id: &str) -> Result<(), Error> {
        if let Some((remote, access_token)) = self.remote_for(session) {
            if let Err(error) = remote.delete_transaction(&access_token, transaction_id).await {
                tracing::warn!("The remote store rejected the delete: {error}");
            }
        }

        let mut transactions = self.snapshot.read()?;
        transactions.retain(|transaction| transaction.id != transaction_id);
        self.snapshot.write(&transactions)?;

        Ok(())
    }

    /// Load all of the session user's transactions, with the backend that
    /// served them.
    ///
    /// The snapshot file is a single unpartitioned slot, so the local
    /// branch returns every locally cached record regardless of owner. On a
    /// shared device this can show one user another user's outage-era
    /// entries.
    ///
    /// # Errors
    /// Returns [Error::SnapshotRead] if the fallback path cannot read the
    /// snapshot file.
    pub async fn load(&self, session: &Session) -> Result<(Vec<Transaction>, Backend), Error> {
        if let Some((remote, access_token)) = self.remote_for(session) {
            match remote.transactions_for(&access_token, &session.user_id).await {
                Ok(transactions) => return Ok((transactions, Backend::Remote)),
                Err(error) => {
                    tracing::warn!(
                        "Falling back to the local snapshot, the remote store rejected the \
                         query: {error}"
                    );
                }
            }
        }

        Ok((self.snapshot.read()?, Backend::Local))
    }
}

/// Synthesize an ID for a locally persisted transaction.
///
/// Uses the current unix time in milliseconds, rendered as a decimal
/// string, which cannot collide with the remote store's UUIDs. Rapid
/// successive creates can land in the same millisecond, so the value is
/// bumped until it is unused within the snapshot.
fn synthesize_id(existing: &[Transaction]) -> String {
    let mut candidate = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64;

    while existing
        .iter()
        .any(|transaction| transaction.id == candidate.to_string())
    {
        candidate += 1;
    }

    candidate.to_string()
}
