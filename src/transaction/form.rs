//! The raw fields of the transaction form and how they are converted before
//! being sent to the store.

use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId,
    transaction::core::{Transaction, TransactionWrite},
};

/// The transaction form fields exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accountid: String,
}

impl TransactionForm {
    /// Convert the raw fields into the values written to the store.
    ///
    /// The amount is read from the longest numeric prefix and becomes `NaN`
    /// if there is none. The account ID is read from the leading digits and
    /// becomes `None` if there are none.
    pub fn to_write(&self) -> TransactionWrite {
        TransactionWrite {
            amount: parse_amount(&self.amount),
            description: self.description.clone(),
            account_id: parse_account_id(&self.accountid),
        }
    }
}

impl From<&Transaction> for TransactionForm {
    fn from(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount.to_string(),
            description: transaction.description.clone(),
            accountid: transaction.account_id.to_string(),
        }
    }
}

/// Parse the leading decimal number in `text`, ignoring leading whitespace
/// and anything after the number.
///
/// Returns `NaN` if `text` does not start with a number.
pub fn parse_amount(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if text[end..].starts_with("Infinity") {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let integer_digits = count_digits(&bytes[end..]);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(&bytes[end + 1..]);
        if integer_digits > 0 || fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }

    if integer_digits == 0 && fraction_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = count_digits(&bytes[exponent_end.min(bytes.len())..]);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

/// Parse the leading base 10 integer in `text`, ignoring leading whitespace
/// and anything after the digits.
///
/// Returns `None` if `text` does not start with an integer or the integer
/// does not fit in an account ID.
pub fn parse_account_id(text: &str) -> Option<AccountId> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = count_digits(&bytes[sign..]);

    if digits == 0 {
        return None;
    }

    text[..sign + digits].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}
