//! Defines the core data models for transactions.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// The store table holding transactions.
pub const TRANSACTIONS_TABLE: &str = "transactions";

/// Selects every transaction column plus the owning account's name under
/// `account`.
pub const TRANSACTION_WITH_ACCOUNT_COLUMNS: &str = "*, account:accounts(name)";

/// Selects the account columns needed for the account picker.
pub const ACCOUNT_OPTION_COLUMNS: &str = "id, name";

pub type TransactionId = i64;

/// A monetary entry belonging to exactly one account, as read from the store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The account the transaction belongs to.
    #[serde(rename = "accountid")]
    pub account_id: AccountId,
    /// The owning account, embedded by the select. Never written back.
    #[serde(default)]
    pub account: Option<EmbeddedAccount>,
}

impl Transaction {
    /// The name of the owning account, if it was embedded.
    pub fn account_name(&self) -> Option<&str> {
        self.account.as_ref().map(|account| account.name.as_str())
    }
}

/// The account columns embedded in a [Transaction].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbeddedAccount {
    pub name: String,
}

/// An entry in the account picker of the transaction form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountOption {
    pub id: AccountId,
    pub name: String,
}

/// The fields sent to the store when creating or updating a transaction.
///
/// A `NaN` amount and a missing account ID serialize to `null`, leaving the
/// store to reject them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWrite {
    pub amount: f64,
    pub description: String,
    #[serde(rename = "accountid")]
    pub account_id: Option<AccountId>,
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            accountid INTEGER NOT NULL REFERENCES accounts(id)
        )",
        (),
    )?;

    Ok(())
}
