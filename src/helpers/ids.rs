//! Identifier helpers.

use std::collections::HashMap;

use serde_json::Value;
use tera::{Function, Result};
use uuid::Uuid;

/// `uuid()` → a fresh random v4 UUID string, for new to-do row ids.
pub fn uuid() -> impl Function {
    move |_args: &HashMap<String, Value>| -> Result<Value> {
        Ok(Value::String(Uuid::new_v4().to_string()))
    }
}
