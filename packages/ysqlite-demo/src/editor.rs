//! Application-side document: the demo edits documents the way a client would and only hands
//! encoded updates to SQLite.

use anyhow::{Context, Result};
use yrs::updates::decoder::Decode;
use yrs::{Any, Doc, Map, ReadTxn, StateVector, Transact, Update};

pub const MAP_ROOT: &str = "myMap";

pub struct Editor {
    doc: Doc,
}

impl Editor {
    pub fn new() -> Self {
        Self { doc: Doc::new() }
    }

    /// Rebuild an editor from a stored document blob.
    pub fn from_update(update: &[u8]) -> Result<Self> {
        let editor = Self::new();
        let update = Update::decode_v1(update).context("decoding stored document")?;
        let mut txn = editor.doc.transact_mut();
        txn.apply_update(update).context("applying stored document")?;
        drop(txn);
        Ok(editor)
    }

    pub fn set_str(&self, key: &str, value: &str) {
        self.set(key, Any::from(value));
    }

    pub fn set_num(&self, key: &str, value: i64) {
        self.set(key, Any::BigInt(value));
    }

    fn set(&self, key: &str, value: Any) {
        let map = self.doc.get_or_insert_map(MAP_ROOT);
        let mut txn = self.doc.transact_mut();
        map.insert(&mut txn, key, value);
    }

    /// Whole document as an update.
    pub fn update(&self) -> Vec<u8> {
        self.doc
            .transact()
            .encode_state_as_update_v1(&StateVector::default())
    }

    /// Only what a replica at `state_vector` has not seen yet.
    pub fn diff(&self, state_vector: &[u8]) -> Result<Vec<u8>> {
        let sv = StateVector::decode_v1(state_vector).context("decoding state vector")?;
        Ok(self.doc.transact().encode_state_as_update_v1(&sv))
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
