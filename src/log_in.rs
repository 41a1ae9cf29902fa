//! The auth page, which combines the log-in and registration forms, and the
//! log-in endpoint.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, auth_card, base, link,
        local_mode_banner,
    },
    register_user::register_form,
    remote::RemoteStore,
    render,
    session::set_session_cookies,
};

/// The message shown when the email and password do not match an account.
const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

/// The log-in form, with an error message when a previous attempt failed.
fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form method="post" action=(endpoints::LOG_IN_API) class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                input
                    type="email"
                    name="email"
                    id="email"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(email)
                    required;
            }

            div
            {
                label for="log-in-password" class=(FORM_LABEL_STYLE) { "Password" }
                input
                    type="password"
                    name="password"
                    id="log-in-password"
                    placeholder="••••••••"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }
        }
    }
}

fn auth_view(remote_configured: bool, email: &str, error_message: Option<&str>) -> Markup {
    let content = html! {
        @if remote_configured
        {
            (auth_card("Log in", &log_in_form(email, error_message)))
            (auth_card("Register", &register_form(None)))
        }
        @else
        {
            (local_mode_banner())

            p class="text-center mt-4"
            {
                (link(endpoints::TRANSACTIONS_VIEW, "Continue to your transactions"))
            }
        }
    };

    base("Welcome", &content)
}

/// The state needed to display the auth page.
#[derive(Clone)]
pub struct AuthPageState {
    /// Whether a remote store is configured.
    pub remote_configured: bool,
}

impl FromRef<AppState> for AuthPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            remote_configured: state.remote.is_some(),
        }
    }
}

/// Display the combined log-in and registration page.
///
/// In local-only mode the forms are replaced by a notice and a link
/// straight to the transactions page, since there is no account to sign
/// into.
pub async fn get_auth_page(State(state): State<AuthPageState>) -> Response {
    render(StatusCode::OK, auth_view(state.remote_configured, "", None))
}

/// The log-in form data.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The email address of the account.
    pub email: String,
    /// The account password.
    pub password: String,
}

/// The state needed to perform a log-in.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub session_duration: Duration,
    /// The remote store, or `None` when running in local-only mode.
    pub remote: Option<Arc<dyn RemoteStore>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            remote: state.remote.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in the session cookies are set and the client is
/// redirected to the transactions page. Otherwise the auth page is returned
/// with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(log_in_data): Form<LogInData>,
) -> Response {
    let Some(remote) = state.remote else {
        return Redirect::to(endpoints::AUTH_VIEW).into_response();
    };

    let session = match remote
        .sign_in(&log_in_data.email, &log_in_data.password)
        .await
    {
        Ok(session) => session,
        Err(error) if error.is_auth_failure() => {
            return render(
                StatusCode::UNAUTHORIZED,
                auth_view(true, &log_in_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG)),
            );
        }
        Err(error) => {
            tracing::error!("An error occurred while signing in: {error}");
            return render(
                StatusCode::OK,
                auth_view(
                    true,
                    &log_in_data.email,
                    Some("The service could not be reached. Please try again later."),
                ),
            );
        }
    };

    match set_session_cookies(
        jar,
        &session.user_id,
        &session.access_token,
        state.session_duration,
    ) {
        Ok(jar) => (jar, Redirect::to(endpoints::TRANSACTIONS_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the session cookies: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod auth_page_tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use scraper::{Html, Selector};

    use crate::{AppState, SnapshotStore, routing::build_router, test_utils::FakeRemote};

    fn get_test_server(directory: &tempfile::TempDir, remote: Option<Arc<FakeRemote>>) -> TestServer {
        let snapshot = SnapshotStore::new(directory.path().join("transactions.json"));
        let state = AppState::new(
            "42",
            remote.map(|remote| remote as Arc<dyn crate::RemoteStore>),
            snapshot,
        );

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn auth_page_shows_both_forms() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory, Some(Arc::new(FakeRemote::new())));

        let response = server.get("/auth").await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        let forms = Selector::parse("form").unwrap();
        let actions: Vec<&str> = html
            .select(&forms)
            .filter_map(|form| form.value().attr("action"))
            .collect();
        assert!(actions.contains(&"/api/log_in"));
        assert!(actions.contains(&"/api/users"));
    }

    #[tokio::test]
    async fn auth_page_in_local_mode_shows_banner_instead_of_forms() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory, None);

        let response = server.get("/auth").await;

        response.assert_status_ok();
        let text = response.text();
        assert!(text.contains("saved on this device only"));
        let html = Html::parse_document(&text);
        let forms = Selector::parse("form").unwrap();
        assert_eq!(html.select(&forms).count(), 0);
    }

    #[tokio::test]
    async fn successful_log_in_redirects_and_sets_session() {
        let directory = tempfile::tempdir().unwrap();
        let server = get_test_server(&directory, Some(Arc::new(FakeRemote::new())));

        let response = server
            .post("/api/log_in")
            .form(&[
                ("email", "maria@example.com"),
                ("password", "hunter22"),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/transactions");

        let jar = response.cookies();
        server
            .get("/transactions")
            .add_cookies(jar)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn bad_credentials_show_error_message() {
        let directory = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::new());
        remote
            .reject_credentials
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let server = get_test_server(&directory, Some(remote));

        let response = server
            .post("/api/log_in")
            .form(&[("email", "maria@example.com"), ("password", "wrong")])
            .await;

        response.assert_status_unauthorized();
        response.assert_text_contains("Incorrect email or password.");
    }
}
