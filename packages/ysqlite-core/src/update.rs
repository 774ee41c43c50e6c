//! Update-level operations: create, merge, diff and state vectors.
//!
//! `apply_update` and `merge_updates` work purely on the encoded form (no document is
//! materialized), so deleted content survives the merge. `apply_update_gc` goes through a
//! document instance and re-encodes its full state, which lets the engine collect deleted
//! content. Records the document could not integrate yet are kept alongside that state.

use tracing::trace;
use yrs::updates::decoder::Decode;
use yrs::updates::encoder::Encode;
use yrs::{Doc, ReadTxn, StateVector, Transact, Update};

use crate::error::{Error, Result};

/// Encoded form of an empty document.
pub fn new_doc() -> Vec<u8> {
    let doc = Doc::new();
    let txn = doc.transact();
    txn.encode_state_as_update_v1(&StateVector::default())
}

/// Rebuild a document from an encoded update.
pub fn load_doc(update: &[u8]) -> Result<Doc> {
    trace!(bytes = update.len(), "loading document from update");
    let doc = Doc::new();
    apply_to(&doc, update)?;
    Ok(doc)
}

fn apply_to(doc: &Doc, update: &[u8]) -> Result<()> {
    let decoded = Update::decode_v1(update).map_err(|e| Error::Decode(e.to_string()))?;
    let mut txn = doc.transact_mut();
    txn.apply_update(decoded).map_err(|e| Error::Apply(e.to_string()))
}

/// Merge `incoming` into `stored` without materializing a document.
pub fn apply_update(stored: &[u8], incoming: &[u8]) -> Result<Vec<u8>> {
    merge_updates(&[stored, incoming])
}

/// Load `stored`, apply `incoming` and re-encode the resulting document state.
///
/// Records that arrive ahead of their dependencies are parked by the engine and are not part
/// of the re-encoded state, so whatever the merged inputs hold beyond the document's state
/// vector is carried over into the result.
pub fn apply_update_gc(stored: &[u8], incoming: &[u8]) -> Result<Vec<u8>> {
    let doc = load_doc(stored)?;
    apply_to(&doc, incoming)?;
    let (state, integrated) = {
        let txn = doc.transact();
        let state = txn.encode_state_as_update_v1(&StateVector::default());
        (state, txn.state_vector().encode_v1())
    };
    let combined = merge_updates(&[stored, incoming])?;
    let parked =
        yrs::diff_updates_v1(&combined, &integrated).map_err(|e| Error::Decode(e.to_string()))?;
    merge_updates(&[state, parked])
}

/// Merge any number of updates into one, dropping duplicated records.
/// An empty input yields the encoding of an empty document.
pub fn merge_updates<T: AsRef<[u8]>>(updates: &[T]) -> Result<Vec<u8>> {
    if updates.is_empty() {
        return Ok(new_doc());
    }
    let refs: Vec<&[u8]> = updates.iter().map(AsRef::as_ref).collect();
    yrs::merge_updates_v1(&refs).map_err(|e| Error::Decode(e.to_string()))
}

/// Smallest update that brings a replica at `state_vector` up to `stored`.
pub fn diff_update(stored: &[u8], state_vector: &[u8]) -> Result<Vec<u8>> {
    // Checked up front so a bad vector is not reported as a bad update.
    StateVector::decode_v1(state_vector).map_err(|e| Error::StateVector(e.to_string()))?;
    yrs::diff_updates_v1(stored, state_vector).map_err(|e| Error::Decode(e.to_string()))
}

pub fn encode_state_vector(stored: &[u8]) -> Result<Vec<u8>> {
    yrs::encode_state_vector_from_update_v1(stored).map_err(|e| Error::Decode(e.to_string()))
}
