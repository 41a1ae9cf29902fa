//! Registration: the sign-up form, its validation rules, and the endpoint
//! that creates the account on the remote store.

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
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, auth_card, base,
    },
    remote::RemoteStore,
    render,
    session::set_session_cookies,
    user::{PaymentSchedule, ProfileData},
};

/// The minimum number of characters a password must have.
const PASSWORD_MIN_LENGTH: usize = 6;

/// The reasons a registration form can be rejected.
///
/// The checks run in the order the variants are declared and stop at the
/// first failure, so the user fixes one problem at a time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The confirmation field did not match the password.
    #[error("the passwords do not match")]
    PasswordMismatch,

    /// The password is shorter than [PASSWORD_MIN_LENGTH].
    #[error("the password must be at least 6 characters long")]
    PasswordTooShort,

    /// The salary is zero, negative, or not a number.
    #[error("the salary must be greater than zero")]
    InvalidSalary,

    /// The first payment day is outside [1, 31].
    #[error("the first payment day must be between 1 and 31")]
    InvalidFirstPaymentDay,

    /// The first payment amount is not positive.
    #[error("the first payment amount must be greater than zero")]
    InvalidFirstPaymentAmount,

    /// The second payment day is missing or outside [1, 31].
    #[error("the second payment day must be between 1 and 31")]
    InvalidSecondPaymentDay,

    /// The second payment amount is missing or not positive.
    #[error("the second payment amount must be greater than zero")]
    InvalidSecondPaymentAmount,
}

/// The sign-up form data.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    /// The user's full name.
    pub name: String,
    /// The email address to register.
    pub email: String,
    /// A contact phone number.
    pub phone: String,
    /// The user's profession.
    pub profession: String,
    /// The chosen password.
    pub password: String,
    /// The password repeated.
    pub confirm_password: String,
    /// The stated monthly salary.
    pub salary: f64,
    /// Present ("on") when the user is paid once a month. Unchecked
    /// checkboxes are absent from form submissions.
    #[serde(default)]
    pub single_payment: Option<String>,
    /// The day of the month of the first payment.
    pub first_payment_day: u8,
    /// The amount of the first payment.
    pub first_payment_amount: f64,
    /// The day of the month of the second payment, blank in single-payment
    /// mode.
    #[serde(default)]
    pub second_payment_day: Option<u8>,
    /// The amount of the second payment, blank in single-payment mode.
    #[serde(default)]
    pub second_payment_amount: Option<f64>,
}

impl RegisterForm {
    fn is_single_payment(&self) -> bool {
        self.single_payment.is_some()
    }
}

fn is_valid_day(day: u8) -> bool {
    (1..=31).contains(&day)
}

/// Check the form against the registration rules and build the profile to
/// store.
///
/// The rules short-circuit: only the first violation is reported. The
/// profile's `total_income` is the sum of the payment amounts, with the
/// second payment counting as zero in single-payment mode.
///
/// # Errors
/// Returns the first [RegistrationError] the form violates.
pub fn validate_registration(form: &RegisterForm) -> Result<ProfileData, RegistrationError> {
    if form.password != form.confirm_password {
        return Err(RegistrationError::PasswordMismatch);
    }

    if form.password.len() < PASSWORD_MIN_LENGTH {
        return Err(RegistrationError::PasswordTooShort);
    }

    if !(form.salary > 0.0) {
        return Err(RegistrationError::InvalidSalary);
    }

    if !is_valid_day(form.first_payment_day) {
        return Err(RegistrationError::InvalidFirstPaymentDay);
    }

    if !(form.first_payment_amount > 0.0) {
        return Err(RegistrationError::InvalidFirstPaymentAmount);
    }

    let second_payment = if form.is_single_payment() {
        None
    } else {
        let day = form
            .second_payment_day
            .filter(|&day| is_valid_day(day))
            .ok_or(RegistrationError::InvalidSecondPaymentDay)?;
        let amount = form
            .second_payment_amount
            .filter(|&amount| amount > 0.0)
            .ok_or(RegistrationError::InvalidSecondPaymentAmount)?;

        Some(PaymentSchedule { day, amount })
    };

    let total_income = form.first_payment_amount
        + second_payment.map_or(0.0, |payment| payment.amount);

    Ok(ProfileData {
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        profession: form.profession.clone(),
        salary: form.salary,
        first_payment: PaymentSchedule {
            day: form.first_payment_day,
            amount: form.first_payment_amount,
        },
        second_payment,
        total_income,
    })
}

fn labelled_input(label: &str, name: &str, input_type: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            input
                type=(input_type)
                name=(name)
                id=(name)
                class=(FORM_TEXT_INPUT_STYLE)
                step=[(input_type == "number").then_some("any")]
                required;
        }
    }
}

/// The registration form, with an error message when a previous submission
/// was rejected.
pub fn register_form(error_message: Option<&str>) -> Markup {
    html! {
        form method="post" action=(endpoints::USERS) class="space-y-4 md:space-y-6"
        {
            (labelled_input("Name", "name", "text"))
            (labelled_input("Email", "email", "email"))
            (labelled_input("Phone", "phone", "tel"))
            (labelled_input("Profession", "profession", "text"))
            (labelled_input("Password", "password", "password"))
            (labelled_input("Confirm Password", "confirm_password", "password"))
            (labelled_input("Monthly salary", "salary", "number"))

            label class="flex items-center gap-2"
            {
                input type="checkbox" name="single_payment";
                "I am paid once a month"
            }

            div class="flex gap-2"
            {
                (labelled_input("First payment day", "first_payment_day", "number"))
                (labelled_input("First payment amount", "first_payment_amount", "number"))
            }

            div class="flex gap-2"
            {
                div
                {
                    label for="second_payment_day" class=(FORM_LABEL_STYLE) { "Second payment day" }
                    input
                        type="number"
                        name="second_payment_day"
                        id="second_payment_day"
                        class=(FORM_TEXT_INPUT_STYLE)
                        min="1"
                        max="31";
                }
                div
                {
                    label for="second_payment_amount" class=(FORM_LABEL_STYLE) { "Second payment amount" }
                    input
                        type="number"
                        name="second_payment_amount"
                        id="second_payment_amount"
                        class=(FORM_TEXT_INPUT_STYLE)
                        step="any";
                }
            }

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Register" }
        }
    }
}

/// The state needed for creating a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub session_duration: Duration,
    /// The remote store, or `None` when running in local-only mode.
    pub remote: Option<Arc<dyn RemoteStore>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            remote: state.remote.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

fn registration_error_response(error_message: &str) -> Response {
    let content = auth_card("Register", &register_form(Some(error_message)));

    render(StatusCode::UNPROCESSABLE_ENTITY, base("Register", &content))
}

/// Handler for registration requests via the POST method.
///
/// On success the account is created on the remote store, the profile is
/// stored, the session cookies are set, and the client is redirected to the
/// transactions page. Otherwise the registration form is returned with an
/// error message explaining the problem.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let Some(remote) = state.remote else {
        // No remote store, no accounts. The auth page explains this.
        return Redirect::to(endpoints::AUTH_VIEW).into_response();
    };

    let profile = match validate_registration(&form) {
        Ok(profile) => profile,
        Err(error) => return registration_error_response(&error.to_string()),
    };

    let session = match remote.sign_up(&form.password, &profile).await {
        Ok(session) => session,
        Err(error) if error.is_auth_failure() => {
            return registration_error_response("That email could not be registered.");
        }
        Err(error) => {
            tracing::error!("An error occurred while signing up: {error}");
            return registration_error_response(
                "The service could not be reached. Please try again later.",
            );
        }
    };

    // The profile record is best-effort: the auth account already exists,
    // so failing the whole registration here would strand the user.
    if let Err(error) = remote
        .insert_profile(&session.access_token, &session.user_id, &profile)
        .await
    {
        tracing::warn!("Could not store the registration profile: {error}");
    }

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
mod register_endpoint_tests {
    use std::sync::Arc;

    use axum_test::TestServer;

    use crate::{AppState, SnapshotStore, routing::build_router, test_utils::FakeRemote};

    fn get_test_server(directory: &tempfile::TempDir, remote: Arc<FakeRemote>) -> TestServer {
        let snapshot = SnapshotStore::new(directory.path().join("transactions.json"));
        let state = AppState::new("42", Some(remote), snapshot);

        TestServer::new(build_router(state))
    }

    fn valid_form() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "Maria Silva"),
            ("email", "maria@example.com"),
            ("phone", "11999990000"),
            ("profession", "Designer"),
            ("password", "hunter22"),
            ("confirm_password", "hunter22"),
            ("salary", "5000"),
            ("first_payment_day", "5"),
            ("first_payment_amount", "3000"),
            ("second_payment_day", "20"),
            ("second_payment_amount", "2000"),
        ]
    }

    #[tokio::test]
    async fn successful_registration_stores_profile_and_signs_in() {
        let directory = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::new());
        let server = get_test_server(&directory, remote.clone());

        let response = server.post("/api/users").form(&valid_form()).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/transactions");

        let profile = remote.profile.lock().unwrap().clone().expect("no profile stored");
        assert_eq!(profile.email, "maria@example.com");
        assert_eq!(profile.total_income, 5000.0);

        // The session cookies must admit the new user to protected pages.
        let jar = response.cookies();
        server
            .get("/transactions")
            .add_cookies(jar)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn invalid_form_shows_error_and_skips_remote() {
        let directory = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::new());
        let server = get_test_server(&directory, remote.clone());

        let mut form = valid_form();
        form[5] = ("confirm_password", "different");

        let response = server.post("/api/users").form(&form).await;

        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        response.assert_text_contains("the passwords do not match");
        assert!(remote.profile.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_email_shows_error() {
        let directory = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::new());
        remote
            .reject_credentials
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let server = get_test_server(&directory, remote);

        let response = server.post("/api/users").form(&valid_form()).await;

        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        response.assert_text_contains("could not be registered");
    }
}
