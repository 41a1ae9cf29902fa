//! Shared test doubles.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    remote::{RemoteError, RemoteSession, RemoteStore},
    transaction::{Transaction, TransactionDraft},
    user::{ProfileData, UserId},
};

/// A scripted in-memory [RemoteStore].
///
/// By default every call succeeds: sign-in and sign-up hand out a fixed
/// session, and transactions live in an in-memory list with sequential IDs.
/// Individual failure flags make the next calls fail with a network error,
/// which is how the degradation tests force the fallback path.
pub struct FakeRemote {
    pub transactions: Mutex<Vec<Transaction>>,
    next_id: AtomicUsize,
    pub fail_inserts: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_queries: AtomicBool,
    pub reject_credentials: AtomicBool,
    pub delete_calls: AtomicUsize,
    pub profile: Mutex<Option<ProfileData>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            transactions: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            fail_inserts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
            reject_credentials: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
            profile: Mutex::new(None),
        }
    }

    pub fn session() -> RemoteSession {
        RemoteSession {
            user_id: UserId::new("remote-user"),
            access_token: "remote-token".to_owned(),
        }
    }

    fn network_error() -> RemoteError {
        RemoteError::Network("connection refused".to_owned())
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn sign_up(
        &self,
        _password: &str,
        _profile: &ProfileData,
    ) -> Result<RemoteSession, RemoteError> {
        if self.reject_credentials.load(Ordering::SeqCst) {
            return Err(RemoteError::Api {
                status: 400,
                message: "User already registered".to_owned(),
            });
        }

        Ok(Self::session())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<RemoteSession, RemoteError> {
        if self.reject_credentials.load(Ordering::SeqCst) {
            return Err(RemoteError::Api {
                status: 400,
                message: "Invalid login credentials".to_owned(),
            });
        }

        Ok(Self::session())
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn insert_profile(
        &self,
        _access_token: &str,
        _user_id: &UserId,
        profile: &ProfileData,
    ) -> Result<(), RemoteError> {
        *self.profile.lock().unwrap() = Some(profile.clone());

        Ok(())
    }

    async fn insert_transaction(
        &self,
        _access_token: &str,
        draft: &TransactionDraft,
    ) -> Result<Transaction, RemoteError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Self::network_error());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let transaction = draft.clone().into_transaction(
            format!("remote-{id}"),
            Some("2024-03-10T12:00:00Z".to_owned()),
        );
        self.transactions.lock().unwrap().push(transaction.clone());

        Ok(transaction)
    }

    async fn delete_transaction(
        &self,
        _access_token: &str,
        transaction_id: &str,
    ) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::network_error());
        }

        self.transactions
            .lock()
            .unwrap()
            .retain(|transaction| transaction.id != transaction_id);

        Ok(())
    }

    async fn transactions_for(
        &self,
        _access_token: &str,
        owner: &UserId,
    ) -> Result<Vec<Transaction>, RemoteError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(Self::network_error());
        }

        let mut transactions: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|transaction| &transaction.owner == owner)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(transactions)
    }
}
