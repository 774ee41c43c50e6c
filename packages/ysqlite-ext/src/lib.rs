//! SQLite scalar functions over Yjs update blobs.
//! `register_functions` installs the whole function table on a `rusqlite` connection; once
//! installed, rows holding encoded documents can be merged, diffed and queried in plain SQL,
//! including from generated columns and indexes. A small typed store over a `docs` table is
//! available behind the `rusqlite-storage` feature.

pub mod extension;
pub use extension::{register_functions, ExtensionConfig, FunctionSpec, DEFAULT_PREFIX, FUNCTIONS};

#[cfg(feature = "rusqlite-storage")]
mod storage;
#[cfg(feature = "rusqlite-storage")]
pub use storage::{DocStore, DOCS_TABLE};

pub use ysqlite_core::{Error, Result, RootKind};
