//! The endpoint URIs.
//!
//! For endpoints that take parameters, e.g., '/accounts/screens/{screen_id}/form',
//! use [format_endpoint].

/// The root route which redirects to the account manager.
pub const ROOT: &str = "/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The account manager page.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// Toggles the add form on an account manager screen.
pub const ACCOUNT_FORM: &str = "/accounts/screens/{screen_id}/form";
/// Opens the edit form for an account on an account manager screen.
pub const EDIT_ACCOUNT: &str = "/accounts/screens/{screen_id}/accounts/{account_id}/edit";
/// Submits the form on an account manager screen.
pub const SUBMIT_ACCOUNT: &str = "/accounts/screens/{screen_id}/submit";
/// Deletes an account from an account manager screen.
pub const DELETE_ACCOUNT: &str = "/accounts/screens/{screen_id}/accounts/{account_id}";

/// The transaction manager page.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// Toggles the add form on a transaction manager screen.
pub const TRANSACTION_FORM: &str = "/transactions/screens/{screen_id}/form";
/// Opens the edit form for a transaction on a transaction manager screen.
pub const EDIT_TRANSACTION: &str =
    "/transactions/screens/{screen_id}/transactions/{transaction_id}/edit";
/// Submits the form on a transaction manager screen.
pub const SUBMIT_TRANSACTION: &str = "/transactions/screens/{screen_id}/submit";
/// Deletes a transaction from a transaction manager screen.
pub const DELETE_TRANSACTION: &str =
    "/transactions/screens/{screen_id}/transactions/{transaction_id}";

/// Replace the parameters in `endpoint_path` with `values`, in order.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/accounts/{account_id}', '{account_id}' is the parameter.
///
/// Parameters without a matching value are left as is, and extra values are
/// ignored.
pub fn format_endpoint(endpoint_path: &str, values: &[&dyn std::fmt::Display]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut rest = endpoint_path;
    let mut values = values.iter();

    while let Some(param_start) = rest.find('{') {
        let Some(param_length) = rest[param_start..].find('}') else {
            break;
        };
        let param_end = param_start + param_length + 1;

        formatted.push_str(&rest[..param_start]);
        match values.next() {
            Some(value) => formatted.push_str(&value.to_string()),
            None => formatted.push_str(&rest[param_start..param_end]),
        }
        rest = &rest[param_end..];
    }

    formatted.push_str(rest);
    formatted
}
