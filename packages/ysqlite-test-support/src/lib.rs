//! Shared fixtures for the ysqlite test suites.
//!
//! `Client` plays the part of an application holding a live `yrs` document next to the
//! database: it edits locally and hands out full updates, diffs and state vectors in the same
//! v1 encoding the SQL functions consume.

use yrs::updates::decoder::Decode;
use yrs::updates::encoder::Encode;
use yrs::{
    Any, Array, Doc, Map, ReadTxn, StateVector, Transact, Update, XmlElementPrelim, XmlFragment,
    XmlTextPrelim,
};

pub const MAP_ROOT: &str = "myMap";
pub const ARRAY_ROOT: &str = "myArray";
pub const XML_ROOT: &str = "myXml";

/// A local replica with a fixed client id so merge outcomes are reproducible.
pub struct Client {
    doc: Doc,
}

impl Client {
    pub fn new(client_id: u64) -> Self {
        Self {
            doc: Doc::with_client_id(client_id),
        }
    }

    /// Replica seeded from an encoded update (for example a blob read back from a row).
    pub fn from_update(client_id: u64, update: &[u8]) -> Self {
        let client = Self::new(client_id);
        client.apply(update);
        client
    }

    pub fn apply(&self, update: &[u8]) {
        let update = Update::decode_v1(update).expect("decode update");
        let mut txn = self.doc.transact_mut();
        txn.apply_update(update).expect("apply update");
    }

    pub fn set(&self, key: &str, value: impl Into<Any>) {
        let map = self.doc.get_or_insert_map(MAP_ROOT);
        let mut txn = self.doc.transact_mut();
        map.insert(&mut txn, key, value.into());
    }

    pub fn remove(&self, key: &str) {
        let map = self.doc.get_or_insert_map(MAP_ROOT);
        let mut txn = self.doc.transact_mut();
        let _previous = map.remove(&mut txn, key);
    }

    pub fn push(&self, value: impl Into<Any>) {
        let array = self.doc.get_or_insert_array(ARRAY_ROOT);
        let mut txn = self.doc.transact_mut();
        array.push_back(&mut txn, value.into());
    }

    /// Append `<tag>text</tag>` to the XML fragment root.
    pub fn push_xml(&self, tag: &str, text: &str) {
        let fragment = self.doc.get_or_insert_xml_fragment(XML_ROOT);
        let mut txn = self.doc.transact_mut();
        let element = fragment.push_back(&mut txn, XmlElementPrelim::empty(tag));
        element.push_back(&mut txn, XmlTextPrelim::new(text));
    }

    /// Full document state as an update.
    pub fn update(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(&StateVector::default())
    }

    /// What a replica at `state_vector` is missing.
    pub fn diff(&self, state_vector: &[u8]) -> Vec<u8> {
        let sv = StateVector::decode_v1(state_vector).expect("decode state vector");
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(&sv)
    }

    pub fn state_vector(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.state_vector().encode_v1()
    }
}

/// Full update of a fresh document whose map root holds `entries`.
pub fn map_update(client_id: u64, entries: &[(&str, Any)]) -> Vec<u8> {
    let client = Client::new(client_id);
    for (key, value) in entries {
        client.set(key, value.clone());
    }
    client.update()
}

/// Full update of a fresh document whose map root holds `foo` and `num`.
pub fn numbered_doc(client_id: u64, foo: &str, num: i64) -> Vec<u8> {
    map_update(
        client_id,
        &[("foo", Any::from(foo)), ("num", Any::BigInt(num))],
    )
}

/// Bytes no decoder accepts: an unterminated variable-length integer.
pub fn malformed_blob() -> Vec<u8> {
    vec![0xff, 0xff, 0xff]
}
