//! SQL helpers callable from fragments.
//!
//! All four take the same named arguments: `sql` (required string) and
//! `params` (optional array of scalars, bound positionally to `?`
//! placeholders). They differ only in result shape:
//!
//! - `exec`    → number of rows changed
//! - `queryrows` → array of row objects
//! - `queryrow`  → exactly one row object, error otherwise
//! - `queryval`  → first column of the first row

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tera::{Error, Function, Result};

use crate::db::Db;

fn sql_arg(args: &HashMap<String, Value>) -> Result<String> {
    match args.get("sql") {
        Some(Value::String(sql)) => Ok(sql.clone()),
        Some(other) => Err(Error::msg(format!(
            "`sql` must be a string, got {other}"
        ))),
        None => Err(Error::msg("missing required argument `sql`")),
    }
}

fn params_arg(args: &HashMap<String, Value>) -> Result<Vec<Value>> {
    match args.get("params") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(params)) => Ok(params.clone()),
        Some(other) => Err(Error::msg(format!(
            "`params` must be an array, got {other}"
        ))),
    }
}

pub fn exec(db: Arc<Db>) -> impl Function {
    move |args: &HashMap<String, Value>| -> Result<Value> {
        let sql = sql_arg(args)?;
        let changed = db
            .exec(&sql, &params_arg(args)?)
            .map_err(|e| Error::msg(format!("exec: {e}")))?;
        Ok(Value::from(changed))
    }
}

pub fn queryrows(db: Arc<Db>) -> impl Function {
    move |args: &HashMap<String, Value>| -> Result<Value> {
        let sql = sql_arg(args)?;
        let rows = db
            .query_rows(&sql, &params_arg(args)?)
            .map_err(|e| Error::msg(format!("queryrows: {e}")))?;
        Ok(Value::Array(rows))
    }
}

pub fn queryrow(db: Arc<Db>) -> impl Function {
    move |args: &HashMap<String, Value>| -> Result<Value> {
        let sql = sql_arg(args)?;
        db.query_row(&sql, &params_arg(args)?)
            .map_err(|e| Error::msg(format!("queryrow: {e}")))
    }
}

pub fn queryval(db: Arc<Db>) -> impl Function {
    move |args: &HashMap<String, Value>| -> Result<Value> {
        let sql = sql_arg(args)?;
        db.query_val(&sql, &params_arg(args)?)
            .map_err(|e| Error::msg(format!("queryval: {e}")))
    }
}
