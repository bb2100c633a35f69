//! A query client for the application's relational database.
//!
//! The client mirrors the shape of hosted database query APIs: pick a table
//! with [Store::from], then `select`, `insert`, `update(..).eq(..)` or
//! `delete().eq(..)`. Rows travel as JSON objects so callers can work with
//! any [Serialize]/[DeserializeOwned] type.
//!
//! ```no_run
//! # async fn example(store: moneypenny::Store) -> Result<(), moneypenny::StoreError> {
//! let rows = store
//!     .from("transactions")
//!     .select(Some("*, account:accounts(name)"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod select;
mod sql;

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params_from_iter};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use select::{SelectItem, parse_select};

/// A row returned by the store, keyed by column name or embed alias.
pub type Row = Map<String, Value>;

/// The errors returned by [Store] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A table or column name contained characters other than ASCII letters,
    /// digits and underscores, or started with a digit.
    #[error("invalid identifier \"{0}\"")]
    InvalidIdentifier(String),

    /// The column list passed to `select` could not be parsed.
    ///
    /// Holds the column list and the reason it was rejected.
    #[error("invalid select \"{0}\": {1}")]
    InvalidSelect(String, String),

    /// The table does not exist.
    #[error("the table \"{0}\" does not exist")]
    UnknownTable(String),

    /// An embedded select named a table that the queried table has no
    /// foreign key to.
    #[error("could not find a relationship between \"{0}\" and \"{1}\"")]
    UnknownRelationship(String, String),

    /// A row passed to `insert` or `update` did not serialize to a JSON object.
    #[error("rows must serialize to JSON objects")]
    NotAnObject,

    /// A row could not be converted to or from JSON.
    #[error("could not convert row: {0}")]
    Json(#[from] serde_json::Error),

    /// The database rejected the query, e.g. a constraint failed.
    #[error("an SQL error occurred: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database connection lock was poisoned.
    #[error("could not acquire the database lock")]
    LockPoisoned,

    /// The background task running the query panicked or was cancelled.
    #[error("the store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A handle to the database, cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    connection: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a store that runs its queries on `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Start a query on `table`.
    pub fn from(&self, table: &str) -> TableQuery {
        TableQuery {
            store: self.clone(),
            table: table.to_owned(),
        }
    }

    /// Run `query` with the connection on tokio's blocking thread pool.
    async fn run<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut connection = connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| StoreError::LockPoisoned)?;

            query(&mut connection)
        })
        .await?
    }
}

/// Operations on a single table.
#[derive(Debug, Clone)]
pub struct TableQuery {
    store: Store,
    table: String,
}

impl TableQuery {
    /// Fetch every row of the table in the order the database returns them.
    ///
    /// `columns` follows the grammar described in the `select` module; `None`
    /// selects every column.
    ///
    /// # Errors
    /// Returns an error if `columns` is malformed, names an unknown column or
    /// relationship, or the query fails.
    pub async fn select(&self, columns: Option<&str>) -> Result<Vec<Row>, StoreError> {
        let items = match columns {
            Some(columns) => parse_select(columns)?,
            None => vec![SelectItem::All],
        };
        let table = self.table.clone();

        self.store
            .run(move |connection| {
                let (query, columns) = sql::build_select(connection, &table, &items)?;
                let mut statement = connection.prepare(&query)?;
                let mut rows = statement.query([])?;
                let mut result = Vec::new();

                while let Some(row) = rows.next()? {
                    result.push(sql::read_row(row, &columns)?);
                }

                Ok(result)
            })
            .await
    }

    /// Like [TableQuery::select], but deserializes each row into `T`.
    pub async fn select_as<T>(&self, columns: Option<&str>) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.select(columns)
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)).map_err(StoreError::from))
            .collect()
    }

    /// Insert `rows` into the table within a single database transaction.
    ///
    /// No data is returned; re-select to observe store-assigned values.
    pub async fn insert<T>(&self, rows: &[T]) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let rows = rows.iter().map(to_row).collect::<Result<Vec<_>, _>>()?;
        let table = self.table.clone();

        self.store
            .run(move |connection| {
                let transaction = connection.transaction()?;

                for row in &rows {
                    let (query, values) = sql::build_insert(&table, row)?;
                    transaction.execute(&query, params_from_iter(values.iter()))?;
                }

                transaction.commit()?;
                tracing::debug!("inserted {} row(s) into {table}", rows.len());

                Ok(())
            })
            .await
    }

    /// Prepare an update that sets every field of `row`.
    ///
    /// Nothing is sent until a filter is applied with [Update::eq].
    pub fn update<T>(&self, row: &T) -> Update
    where
        T: Serialize,
    {
        Update {
            query: self.clone(),
            row: to_row(row),
        }
    }

    /// Prepare a delete. Nothing is sent until a filter is applied with
    /// [Delete::eq].
    pub fn delete(&self) -> Delete {
        Delete { query: self.clone() }
    }
}

/// A pending update, see [TableQuery::update].
#[derive(Debug)]
pub struct Update {
    query: TableQuery,
    row: Result<Row, StoreError>,
}

impl Update {
    /// Apply the update to rows where `column` equals `value`.
    ///
    /// Matching no rows is not an error.
    pub async fn eq(self, column: &str, value: impl Into<Value>) -> Result<(), StoreError> {
        let row = self.row?;
        let table = self.query.table.clone();
        let column = column.to_owned();
        let value = value.into();

        if row.is_empty() {
            return Ok(());
        }

        self.query
            .store
            .run(move |connection| {
                let (query, values) = sql::build_update(&table, &row, &column, &value)?;
                let rows_affected = connection.execute(&query, params_from_iter(values.iter()))?;
                tracing::debug!("updated {rows_affected} row(s) in {table} where {column} = {value}");

                Ok(())
            })
            .await
    }
}

/// A pending delete, see [TableQuery::delete].
#[derive(Debug)]
pub struct Delete {
    query: TableQuery,
}

impl Delete {
    /// Delete rows where `column` equals `value`.
    ///
    /// Matching no rows is not an error.
    pub async fn eq(self, column: &str, value: impl Into<Value>) -> Result<(), StoreError> {
        let table = self.query.table.clone();
        let column = column.to_owned();
        let value = value.into();

        self.query
            .store
            .run(move |connection| {
                let (query, values) = sql::build_delete(&table, &column, &value)?;
                let rows_affected = connection.execute(&query, params_from_iter(values.iter()))?;
                tracing::debug!("deleted {rows_affected} row(s) from {table} where {column} = {value}");

                Ok(())
            })
            .await
    }
}

fn to_row<T: Serialize>(row: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(row)? {
        Value::Object(row) => Ok(row),
        _ => Err(StoreError::NotAnObject),
    }
}
