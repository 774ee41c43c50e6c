use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use ysqlite_core::{Error, Result};

use crate::extension::{register_functions, ExtensionConfig};

pub const DOCS_TABLE: &str = "docs";

fn storage_err(e: rusqlite::Error) -> Error {
    Error::Storage(e.to_string())
}

/// Accept `[A-Za-z_][A-Za-z0-9_]*`; anything spliced into DDL goes through here first.
fn check_identifier(ident: &str) -> Result<&str> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(ident)
    } else {
        Err(Error::InvalidIdentifier(ident.to_string()))
    }
}

fn field_path(field: &str) -> Result<String> {
    Ok(format!("$.{}", check_identifier(field)?))
}

/// `docs(id INTEGER PRIMARY KEY, doc BLOB)` table whose writes go through the registered SQL
/// functions, so merges happen inside SQLite rather than in the caller.
pub struct DocStore {
    conn: Connection,
    config: ExtensionConfig,
}

impl DocStore {
    pub fn open_in_memory(config: ExtensionConfig) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::from_connection(conn, config)
    }

    pub fn open(path: impl AsRef<Path>, config: ExtensionConfig) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage_err)?;
        Self::from_connection(conn, config)
    }

    /// Install the functions on `conn` and create the `docs` table if missing.
    pub fn from_connection(conn: Connection, config: ExtensionConfig) -> Result<Self> {
        if !config.prefix.is_empty() {
            check_identifier(&config.prefix)?;
        }
        register_functions(&conn, &config).map_err(storage_err)?;
        let store = Self { conn, config };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS docs (id INTEGER PRIMARY KEY, doc BLOB)",
            )
            .map_err(storage_err)?;
        debug!(table = DOCS_TABLE, "docs schema ready");
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    fn func(&self, operation: &str) -> String {
        self.config.sql_name(operation)
    }

    /// Insert a document and return its row id.
    pub fn insert(&self, update: &[u8]) -> Result<i64> {
        self.conn
            .execute("INSERT INTO docs (doc) VALUES (?1)", params![update])
            .map_err(storage_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_with_id(&self, id: i64, update: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO docs (id, doc) VALUES (?1, ?2)",
                params![id, update],
            )
            .map_err(storage_err)?;
        Ok(())
    }

    /// Insert an empty document created on the SQL side.
    pub fn insert_new_doc(&self) -> Result<i64> {
        let sql = format!("INSERT INTO docs (doc) VALUES ({}())", self.func("new_doc"));
        self.conn.execute(&sql, []).map_err(storage_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite the stored blob as-is.
    pub fn replace(&self, id: i64, update: &[u8]) -> Result<()> {
        let changed = self
            .conn
            .execute("UPDATE docs SET doc = ?1 WHERE id = ?2", params![update, id])
            .map_err(storage_err)?;
        expect_one_row(id, changed)
    }

    /// Merge `update` into the stored document with `apply_update`.
    pub fn apply_update(&self, id: i64, update: &[u8]) -> Result<()> {
        self.update_with("apply_update", id, update)
    }

    /// Like [`DocStore::apply_update`], but through `apply_update_gc`.
    pub fn apply_update_gc(&self, id: i64, update: &[u8]) -> Result<()> {
        self.update_with("apply_update_gc", id, update)
    }

    fn update_with(&self, operation: &str, id: i64, update: &[u8]) -> Result<()> {
        let sql = format!(
            "UPDATE docs SET doc = {}(doc, ?1) WHERE id = ?2",
            self.func(operation)
        );
        let changed = self
            .conn
            .execute(&sql, params![update, id])
            .map_err(storage_err)?;
        expect_one_row(id, changed)
    }

    pub fn load(&self, id: i64) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row("SELECT doc FROM docs WHERE id = ?1", [id], |row| row.get(0))
            .optional()
            .map_err(storage_err)
    }

    pub fn state_vector(&self, id: i64) -> Result<Option<Vec<u8>>> {
        let sql = format!(
            "SELECT {}(doc) FROM docs WHERE id = ?1",
            self.func("encode_state_vector")
        );
        self.conn
            .query_row(&sql, [id], |row| row.get(0))
            .optional()
            .map_err(storage_err)
    }

    /// What a replica at `state_vector` is missing from the stored document.
    pub fn diff(&self, id: i64, state_vector: &[u8]) -> Result<Option<Vec<u8>>> {
        let sql = format!(
            "SELECT {}(doc, ?1) FROM docs WHERE id = ?2",
            self.func("diff_update")
        );
        self.conn
            .query_row(&sql, params![state_vector, id], |row| row.get(0))
            .optional()
            .map_err(storage_err)
    }

    pub fn map_json(&self, id: i64, root: &str) -> Result<Option<String>> {
        let sql = format!(
            "SELECT {}(doc, ?1) FROM docs WHERE id = ?2",
            self.func("get_map_json")
        );
        self.conn
            .query_row(&sql, params![root, id], |row| row.get(0))
            .optional()
            .map_err(storage_err)
    }

    /// One field of a map root, extracted in SQL with `->>`.
    /// `None` means no such row; a row whose map lacks the field yields `Some(Value::Null)`.
    pub fn map_field(
        &self,
        id: i64,
        root: &str,
        field: &str,
    ) -> Result<Option<serde_json::Value>> {
        let sql = format!(
            "SELECT {}(doc, ?1) ->> ?2 FROM docs WHERE id = ?3",
            self.func("get_map_json")
        );
        let value: Option<SqlValue> = self
            .conn
            .query_row(&sql, params![root, field_path(field)?, id], |row| row.get(0))
            .optional()
            .map_err(storage_err)?;
        value.map(sql_to_json).transpose()
    }

    /// Add `column` as a virtual generated column computed from `root.field`.
    pub fn add_map_field_column(
        &self,
        column: &str,
        root: &str,
        field: &str,
        sql_type: &str,
    ) -> Result<()> {
        let sql = format!(
            "ALTER TABLE docs ADD COLUMN {column} {sql_type} \
             GENERATED ALWAYS AS ({func}(doc, '{root}') ->> '{path}') VIRTUAL",
            column = check_identifier(column)?,
            sql_type = check_identifier(sql_type)?,
            func = self.func("get_map_json"),
            root = check_identifier(root)?,
            path = field_path(field)?,
        );
        self.conn.execute_batch(&sql).map_err(storage_err)?;
        debug!(column, root, field, "added generated column");
        Ok(())
    }

    pub fn create_index(&self, name: &str, column: &str) -> Result<()> {
        let sql = format!(
            "CREATE INDEX IF NOT EXISTS {} ON docs ({})",
            check_identifier(name)?,
            check_identifier(column)?
        );
        self.conn.execute_batch(&sql).map_err(storage_err)?;
        debug!(index = name, column, "created index");
        Ok(())
    }

    /// Ids of rows whose `root.field` is below `bound`, evaluated through the function call.
    pub fn ids_where_map_field_below(
        &self,
        root: &str,
        field: &str,
        bound: i64,
    ) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT id FROM docs WHERE {}(doc, ?1) ->> ?2 < ?3 ORDER BY id",
            self.func("get_map_json")
        );
        self.collect_ids(&sql, params![root, field_path(field)?, bound])
    }

    /// Ids of rows whose `column` is below `bound`.
    pub fn ids_where_column_below(&self, column: &str, bound: i64) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT id FROM docs WHERE {} < ?1 ORDER BY id",
            check_identifier(column)?
        );
        self.collect_ids(&sql, params![bound])
    }

    pub fn count_where_map_field_below(
        &self,
        root: &str,
        field: &str,
        bound: i64,
    ) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM docs WHERE {}(doc, ?1) ->> ?2 < ?3",
            self.func("get_map_json")
        );
        self.conn
            .query_row(&sql, params![root, field_path(field)?, bound], |row| {
                row.get(0)
            })
            .map_err(storage_err)
    }

    pub fn count_where_column_below(&self, column: &str, bound: i64) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM docs WHERE {} < ?1",
            check_identifier(column)?
        );
        self.conn
            .query_row(&sql, [bound], |row| row.get(0))
            .map_err(storage_err)
    }

    /// `EXPLAIN QUERY PLAN` detail lines for `sql`.
    pub fn query_plan(&self, sql: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("EXPLAIN QUERY PLAN {sql}"))
            .map_err(storage_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(3))
            .map_err(storage_err)?;

        let mut plan = Vec::new();
        for detail in rows {
            plan.push(detail.map_err(storage_err)?);
        }
        Ok(plan)
    }

    fn collect_ids(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql).map_err(storage_err)?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, i64>(0))
            .map_err(storage_err)?;

        let mut ids = Vec::new();
        for id in rows {
            ids.push(id.map_err(storage_err)?);
        }
        Ok(ids)
    }
}

fn expect_one_row(id: i64, changed: usize) -> Result<()> {
    if changed == 0 {
        return Err(Error::Storage(format!("no document with id {id}")));
    }
    Ok(())
}

fn sql_to_json(value: SqlValue) -> Result<serde_json::Value> {
    Ok(match value {
        SqlValue::Null => serde_json::Value::Null,
        SqlValue::Integer(i) => serde_json::Value::from(i),
        SqlValue::Real(f) => serde_json::Value::from(f),
        SqlValue::Text(s) => serde_json::Value::String(s),
        SqlValue::Blob(_) => {
            return Err(Error::Storage("unexpected blob in json field".to_string()));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_checked() {
        assert!(check_identifier("num").is_ok());
        assert!(check_identifier("_num2").is_ok());
        assert!(check_identifier("").is_err());
        assert!(check_identifier("2num").is_err());
        assert!(check_identifier("num; DROP TABLE docs").is_err());
        assert!(check_identifier("my-map").is_err());
    }

    #[test]
    fn rejects_prefix_that_cannot_be_spliced() {
        let err = DocStore::open_in_memory(ExtensionConfig::with_prefix("y-")).err();
        assert!(matches!(err, Some(Error::InvalidIdentifier(_))));
    }

    #[test]
    fn missing_rows() {
        let store = DocStore::open_in_memory(ExtensionConfig::default()).unwrap();
        assert_eq!(store.load(42).unwrap(), None);
        assert_eq!(store.state_vector(42).unwrap(), None);
        assert!(matches!(store.replace(42, &[0, 0]), Err(Error::Storage(_))));
        assert!(matches!(store.apply_update(42, &[0, 0]), Err(Error::Storage(_))));
    }

    #[test]
    fn new_doc_rows_start_empty() {
        let store = DocStore::open_in_memory(ExtensionConfig::default()).unwrap();
        let id = store.insert_new_doc().unwrap();
        assert_eq!(store.load(id).unwrap(), Some(ysqlite_core::new_doc()));
        assert_eq!(store.map_json(id, "myMap").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn null_doc_rows_are_storable_but_not_readable() {
        let store = DocStore::open_in_memory(ExtensionConfig::default()).unwrap();
        store
            .connection()
            .execute("INSERT INTO docs (id, doc) VALUES (7, NULL)", [])
            .unwrap();
        assert!(matches!(store.load(7), Err(Error::Storage(_))));
        let err = store.apply_update(7, &ysqlite_core::new_doc()).unwrap_err();
        assert!(err.to_string().contains("NULL"), "unexpected error: {err}");
    }
}
