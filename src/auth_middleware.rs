//! Authentication middleware that validates the session cookies and handles
//! redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState,
    endpoints,
    session::{Session, session_from_jar},
};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// Whether a remote store is configured. When it is not, signing in is
    /// impossible and the guard admits the anonymous local session instead.
    pub remote_configured: bool,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            remote_configured: state.remote.is_some(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid session.
///
/// The [Session] is placed into the request and then the request executed
/// normally if the session cookies are valid, otherwise a redirect to the
/// auth page is returned. With no remote store configured the anonymous
/// local session is used and the request always proceeds.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<Session>` to receive the session.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    if !state.remote_configured {
        let (mut parts, body) = request.into_parts();
        parts.extensions.insert(Session::local());

        return next.run(Request::from_parts(parts, body)).await;
    }

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to auth page.");
            return Redirect::to(endpoints::AUTH_VIEW).into_response();
        }
    };

    let session = match session_from_jar(&jar) {
        Some(session) => session,
        None => return Redirect::to(endpoints::AUTH_VIEW).into_response(),
    };

    parts.extensions.insert(session);

    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router,
        extract::State,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use axum_test::TestServer;
    use sha2::Digest;

    use crate::{
        Error, endpoints,
        session::{COOKIE_USER_ID, DEFAULT_SESSION_DURATION, Session, set_session_cookies},
        user::UserId,
    };

    use super::{AuthState, auth_guard};

    async fn test_handler(Extension(session): Extension<Session>) -> Html<String> {
        Html(format!("<h1>Hello, {}!</h1>", session.user_id))
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let _ = state;
        set_session_cookies(
            jar,
            &UserId::new("user-1"),
            "token-abc",
            DEFAULT_SESSION_DURATION,
        )
    }

    const TEST_LOG_IN_ROUTE: &str = "/log_in";
    const TEST_PROTECTED_ROUTE: &str = "/protected";

    fn get_test_server(remote_configured: bool) -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let state = AuthState {
            cookie_key: Key::from(&hash),
            remote_configured,
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(state.clone());

        TestServer::new(app)
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_session() {
        let server = get_test_server(true);
        let response = server.post(TEST_LOG_IN_ROUTE).await;

        response.assert_status_ok();
        let jar = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        response.assert_status_ok();
        response.assert_text_contains("user-1");
    }

    #[tokio::test]
    async fn get_protected_route_with_no_session_redirects_to_auth() {
        let server = get_test_server(true);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::AUTH_VIEW);
    }

    #[tokio::test]
    async fn get_protected_route_with_tampered_cookie_redirects_to_auth() {
        let server = get_test_server(true);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_USER_ID, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::AUTH_VIEW);
    }

    #[tokio::test]
    async fn unconfigured_remote_admits_local_session() {
        let server = get_test_server(false);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_ok();
        response.assert_text_contains("local");
    }
}
