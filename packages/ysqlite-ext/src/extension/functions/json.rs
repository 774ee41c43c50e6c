use rusqlite::functions::Context;
use rusqlite::types::Value;
use ysqlite_core::RootKind;

use super::util::{core_error, read_bytes, read_text};

fn project(ctx: &Context<'_>, kind: RootKind) -> rusqlite::Result<Value> {
    let stored = read_bytes(ctx, 0, "doc")?;
    let key = read_text(ctx, 1, "key")?;
    ysqlite_core::project_json(stored, kind, &key)
        .map(Value::Text)
        .map_err(core_error)
}

pub(super) fn get_map_json(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    project(ctx, RootKind::Map)
}

pub(super) fn get_array_json(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    project(ctx, RootKind::Array)
}

pub(super) fn get_xml_fragment_json(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    project(ctx, RootKind::XmlFragment)
}

/// Always yields `''` for now; see `ysqlite_core::extract_xml_fragment_text`.
pub(super) fn extract_xml_fragment_text(ctx: &Context<'_>) -> rusqlite::Result<Value> {
    let stored = read_bytes(ctx, 0, "doc")?;
    let key = read_text(ctx, 1, "key")?;
    ysqlite_core::extract_xml_fragment_text(stored, &key)
        .map(Value::Text)
        .map_err(core_error)
}
