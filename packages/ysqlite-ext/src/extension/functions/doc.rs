use rusqlite::functions::Context;
use rusqlite::types::Value;

/// Crate version, handy for checking the functions are installed on a connection.
pub(super) fn version(_ctx: &Context<'_>) -> rusqlite::Result<Value> {
    Ok(Value::Text(env!("CARGO_PKG_VERSION").to_string()))
}

pub(super) fn new_doc(_ctx: &Context<'_>) -> rusqlite::Result<Value> {
    Ok(Value::Blob(ysqlite_core::new_doc()))
}
