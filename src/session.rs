//! Defines functions for handling the session cookies.
//!
//! The session holds the signed-in user's ID and the remote store access
//! token. Both live in the private (encrypted) cookie jar, so the token
//! never reaches the client in readable form.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{Error, user::UserId};

pub(crate) const COOKIE_USER_ID: &str = "user_id";
pub(crate) const COOKIE_ACCESS_TOKEN: &str = "access_token";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";

/// How long a session lasts before the user must sign in again.
pub(crate) const DEFAULT_SESSION_DURATION: Duration = Duration::hours(8);

/// Date time format for the expiry cookie, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

/// A signed-in user, as reconstructed from the session cookies by the auth
/// middleware and attached to the request as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The user the session belongs to.
    pub user_id: UserId,
    /// The remote store bearer token. `None` for the anonymous local
    /// session used when the remote store is unconfigured.
    pub access_token: Option<String>,
}

impl Session {
    /// The anonymous session admitted when the remote store is
    /// unconfigured. Transactions created under it go straight to the
    /// snapshot file.
    pub fn local() -> Self {
        Self {
            user_id: UserId::new(UserId::LOCAL),
            access_token: None,
        }
    }
}

fn session_cookie(name: &'static str, value: String, expiry: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((name, value))
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the session cookies to the cookie jar, indicating that a user is
/// signed in.
///
/// Sets the expiry of the cookies to `duration` from the current time. Use
/// [DEFAULT_SESSION_DURATION] for the default.
///
/// Returns the cookie jar with the cookies added.
///
/// # Errors
/// Returns [Error::DateFormat] if the expiry time cannot be formatted.
pub(crate) fn set_session_cookies(
    jar: PrivateCookieJar,
    user_id: &UserId,
    access_token: &str,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    // Use format instead of to_string to avoid errors at midnight when the
    // hour is printed as a single digit when [DATE_TIME_FORMAT] expects two
    // digits.
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::DateFormat(error.to_string()))?;

    Ok(jar
        .add(session_cookie(
            COOKIE_USER_ID,
            user_id.as_str().to_owned(),
            expiry,
        ))
        .add(session_cookie(
            COOKIE_ACCESS_TOKEN,
            access_token.to_owned(),
            expiry,
        ))
        .add(session_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

fn deleted_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "deleted"))
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(Duration::ZERO)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Set the session cookies to an invalid value and set their max age to
/// zero, which should delete the cookies on the client side.
pub(crate) fn clear_session_cookies(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(deleted_cookie(COOKIE_USER_ID))
        .add(deleted_cookie(COOKIE_ACCESS_TOKEN))
        .add(deleted_cookie(COOKIE_EXPIRY))
}

/// Reconstruct the session from the cookie jar.
///
/// Returns `None` if the cookies are missing, the expiry cookie cannot be
/// parsed, or the session has expired.
pub(crate) fn session_from_jar(jar: &PrivateCookieJar) -> Option<Session> {
    let user_id = jar.get(COOKIE_USER_ID)?;
    let access_token = jar.get(COOKIE_ACCESS_TOKEN)?;
    let expiry_cookie = jar.get(COOKIE_EXPIRY)?;

    let expiry = OffsetDateTime::parse(expiry_cookie.value_trimmed(), DATE_TIME_FORMAT).ok()?;

    if expiry <= OffsetDateTime::now_utc() {
        return None;
    }

    Some(Session {
        user_id: UserId::new(user_id.value_trimmed()),
        access_token: Some(access_token.value_trimmed().to_owned()),
    })
}
