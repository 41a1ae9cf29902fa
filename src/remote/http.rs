//! The HTTP implementation of [RemoteStore].
//!
//! Auth calls go to `{base_url}/auth/v1/...`, record-store calls to
//! `{base_url}/rest/v1/...`. Every request carries the anonymous API key in
//! the `apikey` header plus a bearer token, which is the anonymous key for
//! auth calls and the user's access token afterwards.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::{
    remote::{RemoteConfig, RemoteError, RemoteSession, RemoteStore},
    transaction::{Transaction, TransactionDraft},
    user::{ProfileData, UserId},
};

/// A [RemoteStore] backed by the managed HTTP service.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    config: RemoteConfig,
    client: reqwest::Client,
}

/// The fields of an auth response the app cares about.
#[derive(Deserialize)]
struct AuthResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
}

/// The error body the service returns on auth failures. The field name
/// varies between endpoint versions, so both are tried.
#[derive(Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl HttpRemote {
    /// Create a client for the remote store at `config.base_url`.
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.config.base_url)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{path}", self.config.base_url)
    }

    /// Attach the `apikey` and `Authorization` headers common to every call.
    fn with_keys(&self, request: reqwest::RequestBuilder, bearer: &str) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    /// Convert a non-success response into a [RemoteError::Api], pulling the
    /// message out of the error body when one is present.
    async fn api_error(response: reqwest::Response) -> RemoteError {
        let status = response.status().as_u16();
        let body: ApiErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .msg
            .or(body.message)
            .or(body.error_description)
            .unwrap_or_else(|| "no error message".to_owned());

        RemoteError::Api { status, message }
    }

    async fn send_auth(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<RemoteSession, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|error| RemoteError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|error| RemoteError::Decode(error.to_string()))?;

        Ok(RemoteSession {
            user_id: UserId::new(auth.user.id),
            access_token: auth.access_token,
        })
    }

    /// Send a request expected to return no useful body.
    async fn send_unit(&self, request: reqwest::RequestBuilder) -> Result<(), RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|error| RemoteError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn sign_up(
        &self,
        password: &str,
        profile: &ProfileData,
    ) -> Result<RemoteSession, RemoteError> {
        let request = self
            .with_keys(self.client.post(self.auth_url("signup")), &self.config.anon_key)
            .json(&json!({
                "email": profile.email,
                "password": password,
                "data": { "nome": profile.name },
            }));

        self.send_auth(request).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<RemoteSession, RemoteError> {
        let request = self
            .with_keys(
                self.client
                    .post(self.auth_url("token"))
                    .query(&[("grant_type", "password")]),
                &self.config.anon_key,
            )
            .json(&json!({ "email": email, "password": password }));

        self.send_auth(request).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError> {
        let request = self.with_keys(self.client.post(self.auth_url("logout")), access_token);

        self.send_unit(request).await
    }

    async fn insert_profile(
        &self,
        access_token: &str,
        user_id: &UserId,
        profile: &ProfileData,
    ) -> Result<(), RemoteError> {
        let (day_2, amount_2) = match profile.second_payment {
            Some(payment) => (Some(payment.day), Some(payment.amount)),
            None => (None, None),
        };

        let request = self
            .with_keys(self.client.post(self.rest_url("users")), access_token)
            .json(&json!({
                "id": user_id,
                "nome": profile.name,
                "email": profile.email,
                "telefone": profile.phone,
                "profissao": profile.profession,
                "salario": profile.salary,
                "dia_pagamento_1": profile.first_payment.day,
                "valor_pagamento_1": profile.first_payment.amount,
                "dia_pagamento_2": day_2,
                "valor_pagamento_2": amount_2,
                "renda_total": profile.total_income,
            }));

        self.send_unit(request).await
    }

    async fn insert_transaction(
        &self,
        access_token: &str,
        draft: &TransactionDraft,
    ) -> Result<Transaction, RemoteError> {
        let response = self
            .with_keys(self.client.post(self.rest_url("transactions")), access_token)
            // Without this header the record store answers 201 with an empty
            // body and the assigned ID is lost.
            .header("Prefer", "return=representation")
            .json(draft)
            .send()
            .await
            .map_err(|error| RemoteError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        // Inserts answer with a one-element array of the stored records.
        let mut records: Vec<Transaction> = response
            .json()
            .await
            .map_err(|error| RemoteError::Decode(error.to_string()))?;

        records
            .pop()
            .ok_or_else(|| RemoteError::Decode("insert returned no record".to_owned()))
    }

    async fn delete_transaction(
        &self,
        access_token: &str,
        transaction_id: &str,
    ) -> Result<(), RemoteError> {
        let request = self
            .with_keys(self.client.delete(self.rest_url("transactions")), access_token)
            .query(&[("id", format!("eq.{transaction_id}"))]);

        self.send_unit(request).await
    }

    async fn transactions_for(
        &self,
        access_token: &str,
        owner: &UserId,
    ) -> Result<Vec<Transaction>, RemoteError> {
        let response = self
            .with_keys(self.client.get(self.rest_url("transactions")), access_token)
            .query(&[
                ("user_id", format!("eq.{owner}")),
                ("select", "*".to_owned()),
                ("order", "data.desc".to_owned()),
            ])
            .send()
            .await
            .map_err(|error| RemoteError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|error| RemoteError::Decode(error.to_string()))
    }
}
