//! User identity and profile types.
//!
//! Profiles are captured once at registration and never edited afterwards,
//! so there is no update path here.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A newtype wrapper for user IDs.
///
/// The remote store assigns opaque string IDs (UUIDs). The wrapper keeps
/// them from being confused with transaction IDs and other strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// The fixed owner ID used for the anonymous session that is admitted
    /// when the remote store is unconfigured.
    pub const LOCAL: &str = "local";

    /// Wrap a raw ID string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw ID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry of a user's monthly payment schedule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    /// Day of the month the payment lands on, in [1, 31].
    pub day: u8,
    /// The payment amount. Always positive.
    pub amount: f64,
}

/// Profile metadata captured at registration.
///
/// `total_income` is derived from the payment schedule at registration time
/// and stored redundantly alongside it, matching the remote `users`
/// collection schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    /// The user's full name.
    pub name: String,
    /// The email address used for authentication.
    pub email: String,
    /// A contact phone number.
    pub phone: String,
    /// The user's profession.
    pub profession: String,
    /// The stated monthly salary. Always positive.
    pub salary: f64,
    /// The first (or only) monthly payment.
    pub first_payment: PaymentSchedule,
    /// The second monthly payment, absent in single-payment mode.
    pub second_payment: Option<PaymentSchedule>,
    /// Sum of the configured payment amounts.
    pub total_income: f64,
}
