//! Defines the endpoint for logging out the current user.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState, endpoints,
    remote::RemoteStore,
    session::{clear_session_cookies, session_from_jar},
};

/// The state needed to log out.
#[derive(Clone)]
pub struct LogOutState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The remote store, or `None` when running in local-only mode.
    pub remote: Option<Arc<dyn RemoteStore>>,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            remote: state.remote.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handler for log-out requests via the POST method.
///
/// The remote session is invalidated on a best-effort basis, the session
/// cookies are cleared, and the client is redirected to the auth page. A
/// remote failure never blocks the log-out, clearing the cookies is what
/// signs the client out.
pub async fn post_log_out(State(state): State<LogOutState>, jar: PrivateCookieJar) -> Response {
    if let (Some(remote), Some(session)) = (&state.remote, session_from_jar(&jar)) {
        if let Some(access_token) = session.access_token {
            if let Err(error) = remote.sign_out(&access_token).await {
                tracing::warn!("Could not invalidate the remote session: {error}");
            }
        }
    }

    (
        clear_session_cookies(jar),
        Redirect::to(endpoints::AUTH_VIEW),
    )
        .into_response()
}

#[cfg(test)]
mod log_out_tests {
    use std::sync::Arc;

    use axum_test::TestServer;

    use crate::{AppState, SnapshotStore, routing::build_router, test_utils::FakeRemote};

    fn get_test_server(directory: &tempfile::TempDir) -> TestServer {
        let snapshot = SnapshotStore::new(directory.path().join("transactions.json"));
        let state = AppState::new("42", Some(Arc::new(FakeRemote::new())), snapshot);

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn log_out_clears_the_session() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory);
        let log_in_response = server
            .post("/api/log_in")
            .form(&[("email", "maria@example.com"), ("password", "hunter22")])
            .await;
        let jar = log_in_response.cookies();

        let response = server.post("/api/log_out").add_cookies(jar).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/auth");

        // The cleared cookies must no longer grant access.
        let jar = response.cookies();
        let response = server.get("/transactions").add_cookies(jar).await;
        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/auth");
    }

    #[tokio::test]
    async fn log_out_without_a_session_still_redirects() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory);

        let response = server.post("/api/log_out").await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/auth");
    }
}
