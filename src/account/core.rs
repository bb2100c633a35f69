use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// The store table holding accounts.
pub const ACCOUNTS_TABLE: &str = "accounts";

pub type AccountId = i64;

/// A named financial bucket that transactions belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account, assigned by the store.
    pub id: AccountId,
    /// The display name of the account.
    pub name: String,
    /// Free text describing the account.
    #[serde(default)]
    pub description: Option<String>,
}

/// The fields written when creating or updating an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<&Account> for AccountForm {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            description: account.description.clone().unwrap_or_default(),
        }
    }
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT
        )",
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use super::create_account_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_account_table(&connection));
    }
}
