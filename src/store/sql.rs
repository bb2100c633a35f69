//! Builds SQL for the store's query builders and converts values between
//! SQLite and JSON.

use rusqlite::{
    Connection, OptionalExtension,
    types::{Value as SqlValue, ValueRef},
};
use serde_json::{Map, Number, Value};

use crate::store::{
    Row, StoreError,
    select::{EmbedColumns, SelectItem},
};

const BASE_ALIAS: &str = "\"_base\"";

/// Quote `name` for use as an SQL identifier.
///
/// # Errors
/// Returns [StoreError::InvalidIdentifier] unless `name` is an ASCII letter
/// or underscore followed by ASCII letters, digits or underscores.
pub(crate) fn quote_identifier(name: &str) -> Result<String, StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(format!("\"{name}\""))
    } else {
        Err(StoreError::InvalidIdentifier(name.to_owned()))
    }
}

/// How a column of a select result is converted back to JSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ColumnKind {
    Plain,
    Embedded,
}

/// A column in the result of a select statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OutputColumn {
    pub name: String,
    pub kind: ColumnKind,
}

/// Build the `SELECT` statement for `items` on `table`.
///
/// `connection` is used to look up column names for `*` and the foreign keys
/// that embedded items follow.
pub(crate) fn build_select(
    connection: &Connection,
    table: &str,
    items: &[SelectItem],
) -> Result<(String, Vec<OutputColumn>), StoreError> {
    let quoted_table = quote_identifier(table)?;
    let mut expressions = Vec::new();
    let mut columns = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match item {
            SelectItem::All => {
                for column in table_columns(connection, table)? {
                    let quoted = quote_identifier(&column)?;
                    expressions.push(format!("{BASE_ALIAS}.{quoted} AS {quoted}"));
                    columns.push(OutputColumn {
                        name: column,
                        kind: ColumnKind::Plain,
                    });
                }
            }
            SelectItem::Column(column) => {
                let quoted = quote_identifier(column)?;
                expressions.push(format!("{BASE_ALIAS}.{quoted} AS {quoted}"));
                columns.push(OutputColumn {
                    name: column.clone(),
                    kind: ColumnKind::Plain,
                });
            }
            SelectItem::Embed {
                alias,
                table: embedded_table,
                columns: embedded_columns,
            } => {
                let expression = embed_expression(
                    connection,
                    table,
                    embedded_table,
                    embedded_columns,
                    &format!("\"_embed{index}\""),
                )?;
                expressions.push(format!("{expression} AS {}", quote_identifier(alias)?));
                columns.push(OutputColumn {
                    name: alias.clone(),
                    kind: ColumnKind::Embedded,
                });
            }
        }
    }

    let sql = format!(
        "SELECT {} FROM {quoted_table} AS {BASE_ALIAS}",
        expressions.join(", ")
    );

    Ok((sql, columns))
}

/// A correlated subquery that renders the referenced row as a JSON object.
fn embed_expression(
    connection: &Connection,
    table: &str,
    embedded_table: &str,
    embedded_columns: &EmbedColumns,
    alias: &str,
) -> Result<String, StoreError> {
    let (from_column, to_column) = foreign_key(connection, table, embedded_table)?;

    let column_names = match embedded_columns {
        EmbedColumns::All => table_columns(connection, embedded_table)?,
        EmbedColumns::Named(names) => names.clone(),
    };

    let pairs = column_names
        .iter()
        .map(|column| {
            quote_identifier(column).map(|quoted| format!("'{column}', {alias}.{quoted}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!(
        "(SELECT json_object({}) FROM {} AS {alias} WHERE {alias}.{} = {BASE_ALIAS}.{})",
        pairs.join(", "),
        quote_identifier(embedded_table)?,
        quote_identifier(&to_column)?,
        quote_identifier(&from_column)?,
    ))
}

/// The column names of `table` in declaration order.
///
/// # Errors
/// Returns [StoreError::UnknownTable] if `table` has no columns, i.e. it does
/// not exist.
pub(crate) fn table_columns(connection: &Connection, table: &str) -> Result<Vec<String>, StoreError> {
    let columns = connection
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?
        .query_map([table], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    if columns.is_empty() {
        return Err(StoreError::UnknownTable(table.to_owned()));
    }

    Ok(columns)
}

/// Find the foreign key from `table` to `referenced_table`.
///
/// Returns the referencing column and the referenced column.
fn foreign_key(
    connection: &Connection,
    table: &str,
    referenced_table: &str,
) -> Result<(String, String), StoreError> {
    let key: Option<(String, Option<String>)> = connection
        .prepare(
            "SELECT \"from\", \"to\" FROM pragma_foreign_key_list(?1) \
            WHERE \"table\" = ?2 COLLATE NOCASE ORDER BY id, seq LIMIT 1",
        )?
        .query_row([table, referenced_table], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?;

    let Some((from_column, to_column)) = key else {
        return Err(StoreError::UnknownRelationship(
            table.to_owned(),
            referenced_table.to_owned(),
        ));
    };

    let to_column = match to_column {
        Some(column) => column,
        // A foreign key without a column list references the primary key.
        None => connection
            .query_row(
                "SELECT name FROM pragma_table_info(?1) WHERE pk = 1",
                [referenced_table],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| {
                StoreError::UnknownRelationship(table.to_owned(), referenced_table.to_owned())
            })?,
    };

    Ok((from_column, to_column))
}

/// Read the current row of a select statement into a JSON object.
pub(crate) fn read_row(row: &rusqlite::Row, columns: &[OutputColumn]) -> Result<Row, StoreError> {
    let mut object = Map::new();

    for (index, column) in columns.iter().enumerate() {
        let value = row.get_ref(index)?;

        let value = match (column.kind, value) {
            (ColumnKind::Embedded, ValueRef::Text(text)) => serde_json::from_slice(text)?,
            (_, value) => json_from_sql(value),
        };

        object.insert(column.name.clone(), value);
    }

    Ok(object)
}

/// Build an `INSERT` statement and its parameters for `row`.
pub(crate) fn build_insert(table: &str, row: &Row) -> Result<(String, Vec<SqlValue>), StoreError> {
    let table = quote_identifier(table)?;

    if row.is_empty() {
        return Ok((format!("INSERT INTO {table} DEFAULT VALUES"), Vec::new()));
    }

    let columns = row
        .keys()
        .map(|column| quote_identifier(column))
        .collect::<Result<Vec<_>, _>>()?;
    let placeholders = (1..=columns.len())
        .map(|position| format!("?{position}"))
        .collect::<Vec<_>>();
    let values = row.values().map(sql_from_json).collect();

    Ok((
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        ),
        values,
    ))
}

/// Build an `UPDATE` statement and its parameters that sets every field of
/// `row` where `filter_column` equals `filter_value`.
pub(crate) fn build_update(
    table: &str,
    row: &Row,
    filter_column: &str,
    filter_value: &Value,
) -> Result<(String, Vec<SqlValue>), StoreError> {
    let table = quote_identifier(table)?;

    let assignments = row
        .keys()
        .enumerate()
        .map(|(index, column)| {
            quote_identifier(column).map(|quoted| format!("{quoted} = ?{}", index + 1))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut values: Vec<SqlValue> = row.values().map(sql_from_json).collect();
    values.push(sql_from_json(filter_value));

    Ok((
        format!(
            "UPDATE {table} SET {} WHERE {} = ?{}",
            assignments.join(", "),
            quote_identifier(filter_column)?,
            values.len()
        ),
        values,
    ))
}

/// Build a `DELETE` statement and its parameters for rows where
/// `filter_column` equals `filter_value`.
pub(crate) fn build_delete(
    table: &str,
    filter_column: &str,
    filter_value: &Value,
) -> Result<(String, Vec<SqlValue>), StoreError> {
    Ok((
        format!(
            "DELETE FROM {} WHERE {} = ?1",
            quote_identifier(table)?,
            quote_identifier(filter_column)?
        ),
        vec![sql_from_json(filter_value)],
    ))
}

/// Convert a JSON value into a value SQLite can bind.
///
/// Arrays and objects are stored as JSON text.
pub(crate) fn sql_from_json(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(boolean) => SqlValue::Integer(i64::from(*boolean)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => number
                .as_f64()
                .map(SqlValue::Real)
                .unwrap_or(SqlValue::Null),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Convert a value read from SQLite into JSON.
pub(crate) fn json_from_sql(value: ValueRef) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::from(integer),
        ValueRef::Real(real) => Number::from_f64(real)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().copied().map(Value::from).collect()),
    }
}
