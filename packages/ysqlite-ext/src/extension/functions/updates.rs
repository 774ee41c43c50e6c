use rusqlite::functions::Context;
use rusqlite::types::Value;

use super::util::{core_error, read_bytes, user_error};

/// `apply_update(doc, update)`: merge without garbage collection.
pub(super) fn apply_update(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    let stored = read_bytes(ctx, 0, "doc")?;
    let incoming = read_bytes(ctx, 1, "update")?;
    ysqlite_core::apply_update(stored, incoming)
        .map(Value::Blob)
        .map_err(core_error)
}

/// `apply_update_gc(doc, update)`: apply through a document, collecting deleted content.
pub(super) fn apply_update_gc(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    let stored = read_bytes(ctx, 0, "doc")?;
    let incoming = read_bytes(ctx, 1, "update")?;
    ysqlite_core::apply_update_gc(stored, incoming)
        .map(Value::Blob)
        .map_err(core_error)
}

/// `merge_updates(u1, u2, ...)`: the arguments, in order, are the updates to merge.
pub(super) fn merge_updates(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    if ctx.is_empty() {
        return Err(user_error("merge_updates expects at least one update".to_string()));
    }
    let updates = (0..ctx.len())
        .map(|idx| read_bytes(ctx, idx, "update"))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    ysqlite_core::merge_updates(&updates)
        .map(Value::Blob)
        .map_err(core_error)
}

/// `diff_update(doc, state_vector)`
pub(super) fn diff_update(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    let stored = read_bytes(ctx, 0, "doc")?;
    let state_vector = read_bytes(ctx, 1, "state_vector")?;
    ysqlite_core::diff_update(stored, state_vector)
        .map(Value::Blob)
        .map_err(core_error)
}

pub(super) fn encode_state_vector(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    let stored = read_bytes(ctx, 0, "doc")?;
    ysqlite_core::encode_state_vector(stored)
        .map(Value::Blob)
        .map_err(core_error)
}
