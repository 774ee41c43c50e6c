//! Installation of the function table on a SQLite connection.
//!
//! Every entry is registered as deterministic and innocuous: the handlers only decode their
//! arguments, call into the codec and return fresh values, so SQLite may use them inside
//! generated columns and indexes.

mod functions;
pub use functions::{FunctionSpec, FUNCTIONS};

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::Connection;
use tracing::debug;

pub const DEFAULT_PREFIX: &str = "y_";

/// Naming options for the installed functions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Prepended to every operation name, `y_` unless overridden.
    pub prefix: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ExtensionConfig {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// SQL-visible name of `operation` (e.g. `apply_update` -> `y_apply_update`).
    pub fn sql_name(&self, operation: &str) -> String {
        format!("{}{}", self.prefix, operation)
    }
}

fn flags() -> FunctionFlags {
    FunctionFlags::SQLITE_UTF8
        | FunctionFlags::SQLITE_DETERMINISTIC
        | FunctionFlags::SQLITE_INNOCUOUS
}

/// Register every entry of [`FUNCTIONS`] on `conn`. Stops at the first failure.
pub fn register_functions(conn: &Connection, config: &ExtensionConfig) -> rusqlite::Result<()> {
    for spec in FUNCTIONS {
        let name = config.sql_name(spec.name);
        let handler = spec.handler;
        let traced = name.clone();
        conn.create_scalar_function(&name, spec.n_arg, flags(), move |ctx: &Context<'_>| {
            debug!(function = %traced, argc = ctx.len(), "sql function invoked");
            handler(ctx)
        })?;
    }
    debug!(prefix = %config.prefix, count = FUNCTIONS.len(), "registered ysqlite functions");
    Ok(())
}
