//! SQLite access for the template helpers.
//!
//! # Responsibilities
//! - Own the connection and serialize access to it
//! - Translate between JSON values (template side) and SQLite values
//! - Expose the query shapes the helpers need: exec, rows, one row, one value
//!
//! # Design Decisions
//! - One connection behind a mutex; helpers run inside synchronous template
//!   rendering, so async pooling buys nothing here
//! - The handle outlives template reloads; fragment sets come and go, the
//!   database stays

use std::path::Path;
use std::sync::Mutex;

use serde_json::{Map, Number, Value};
use sqlite::State;

/// Error type for helper-issued database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlite::Error),

    #[error("unsupported SQL parameter: {0}")]
    UnsupportedParam(String),

    #[error("query returned {0} rows, expected exactly 1 row")]
    NotExactlyOneRow(usize),

    #[error("query returned no rows")]
    NoRows,
}

/// Shared handle to the SQLite database backing the to-do pages.
pub struct Db {
    conn: Mutex<sqlite::Connection>,
}

impl Db {
    /// Open (creating if necessary) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = sqlite::open(path.as_ref())?;
        conn.execute("PRAGMA foreign_keys = ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a statement and return the number of rows it changed.
    pub fn exec(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        bind_params(&mut stmt, params)?;
        while let State::Row = stmt.next()? {}
        Ok(conn.change_count() as i64)
    }

    /// Run a query and return every row as an object keyed by column name.
    pub fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        bind_params(&mut stmt, params)?;

        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();

        let mut rows = Vec::new();
        while let State::Row = stmt.next()? {
            let mut row = Map::new();
            for (i, column) in columns.iter().enumerate() {
                let value: sqlite::Value = stmt.read(i)?;
                row.insert(column.clone(), to_json(value));
            }
            rows.push(Value::Object(row));
        }
        Ok(rows)
    }

    /// Run a query expected to return exactly one row.
    pub fn query_row(&self, sql: &str, params: &[Value]) -> Result<Value, DbError> {
        let mut rows = self.query_rows(sql, params)?;
        if rows.len() != 1 {
            return Err(DbError::NotExactlyOneRow(rows.len()));
        }
        Ok(rows.remove(0))
    }

    /// Run a query and return the first column of the first row.
    pub fn query_val(&self, sql: &str, params: &[Value]) -> Result<Value, DbError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        bind_params(&mut stmt, params)?;

        match stmt.next()? {
            State::Row => {
                let value: sqlite::Value = stmt.read(0)?;
                Ok(to_json(value))
            }
            State::Done => Err(DbError::NoRows),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, sqlite::Connection> {
        // A poisoned lock only means another render panicked mid-query;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn bind_params(stmt: &mut sqlite::Statement<'_>, params: &[Value]) -> Result<(), DbError> {
    for (i, param) in params.iter().enumerate() {
        let value = to_sqlite(param)?;
        stmt.bind((i + 1, &value))?;
    }
    Ok(())
}

fn to_sqlite(value: &Value) -> Result<sqlite::Value, DbError> {
    match value {
        Value::Null => Ok(sqlite::Value::Null),
        Value::Bool(b) => Ok(sqlite::Value::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(sqlite::Value::Integer(i))
            } else {
                Ok(sqlite::Value::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        Value::String(s) => Ok(sqlite::Value::String(s.clone())),
        other => Err(DbError::UnsupportedParam(other.to_string())),
    }
}

fn to_json(value: sqlite::Value) -> Value {
    match value {
        sqlite::Value::Null => Value::Null,
        sqlite::Value::Integer(i) => Value::Number(i.into()),
        sqlite::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        sqlite::Value::String(s) => Value::String(s),
        sqlite::Value::Binary(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
    }
}
