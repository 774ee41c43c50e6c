use rusqlite::functions::Context;
use rusqlite::types::ValueRef;
use rusqlite::Error;

/// Borrow a BLOB (or TEXT) argument without copying it.
pub(super) fn read_bytes<'a>(
    ctx: &'a Context<'_>,
    idx: usize,
    what: &str,
) -> rusqlite::Result<&'a [u8]> {
    match ctx.get_raw(idx) {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Ok(bytes),
        ValueRef::Null => Err(user_error(format!("{what} (argument {}) is NULL", idx + 1))),
        other => Err(Error::InvalidFunctionParameterType(idx, other.data_type())),
    }
}

pub(super) fn read_text(ctx: &Context<'_>, idx: usize, what: &str) -> rusqlite::Result<String> {
    match ctx.get_raw(idx) {
        ValueRef::Null => Err(user_error(format!("{what} (argument {}) is NULL", idx + 1))),
        _ => ctx.get::<String>(idx),
    }
}

pub(super) fn user_error(msg: String) -> Error {
    Error::UserFunctionError(msg.into())
}

pub(super) fn core_error(err: ysqlite_core::Error) -> Error {
    Error::UserFunctionError(Box::new(err))
}
