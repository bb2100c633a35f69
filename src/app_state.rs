//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    account::AccountsScreen,
    db::initialize,
    screen::{ScreenConfig, ScreenRegistry},
    store::Store,
    transaction::TransactionsScreen,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the database.
    pub store: Store,

    /// The mounted account manager screens.
    pub account_screens: Arc<ScreenRegistry<AccountsScreen>>,

    /// The mounted transaction manager screens.
    pub transaction_screens: Arc<ScreenRegistry<TransactionsScreen>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, screen_config: ScreenConfig) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            store: Store::new(connection),
            account_screens: Arc::new(ScreenRegistry::new(screen_config)),
            transaction_screens: Arc::new(ScreenRegistry::new(screen_config)),
        })
    }
}
