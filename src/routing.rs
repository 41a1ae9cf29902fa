//! Application router configuration with protected and unprotected route
//! definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    auth_middleware::auth_guard,
    endpoints,
    export::get_export,
    log_in::{get_auth_page, post_log_in},
    log_out::post_log_out,
    not_found::get_404_not_found,
    register_user::register_user,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::AUTH_VIEW, get(get_auth_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::USERS, post(register_user));

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::EXPORT, get(get_export))
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            post(delete_transaction_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the transactions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use std::sync::Arc;

    use axum_test::TestServer;

    use crate::{AppState, RemoteStore, SnapshotStore, test_utils::FakeRemote};

    use super::build_router;

    fn get_test_server(directory: &tempfile::TempDir, configured: bool) -> TestServer {
        let snapshot = SnapshotStore::new(directory.path().join("transactions.json"));
        let remote = configured.then(|| Arc::new(FakeRemote::new()) as Arc<dyn RemoteStore>);
        let state = AppState::new("42", remote, snapshot);

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn root_redirects_to_transactions() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory, false);

        let response = server.get("/").await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/transactions");
    }

    #[tokio::test]
    async fn protected_routes_redirect_anonymous_clients_to_auth() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory, true);

        for path in ["/", "/transactions", "/transactions/export"] {
            let response = server.get(path).await;

            response.assert_status_see_other();
            assert_eq!(response.header("location"), "/auth", "for path {path}");
        }
    }

    #[tokio::test]
    async fn unknown_path_returns_404_page() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory, false);

        let response = server.get("/no-such-page").await;

        response.assert_status_not_found();
        response.assert_text_contains("404");
    }
}
