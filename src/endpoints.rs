//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g. '/api/transactions/{id}/delete',
//! use [format_endpoint].

/// The root route which redirects to the transactions page.
pub const ROOT: &str = "/";
/// The combined log-in and registration page.
pub const AUTH_VIEW: &str = "/auth";
/// The monthly transactions page.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The CSV download for the currently displayed month.
pub const EXPORT: &str = "/transactions/export";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a single transaction.
///
/// Plain HTML forms can only submit GET and POST, so deletion is a POST to a
/// dedicated path rather than a DELETE to the transaction resource.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}/delete";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. For
/// example, in '/api/transactions/{transaction_id}/delete',
/// '{transaction_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
