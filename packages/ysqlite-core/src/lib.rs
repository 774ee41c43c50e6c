#![forbid(unsafe_code)]
//! Stateless codec over Yjs (v1) update blobs, backed by `yrs`.
//! Every function takes encoded updates or state vectors, rebuilds whatever document state it
//! needs for the duration of the call, and hands back freshly encoded bytes or JSON text. Nothing
//! is cached between calls, which is what lets the SQLite layer mark these functions
//! deterministic.

pub mod error;
pub mod projection;
pub mod update;

pub use error::{Error, Result};
pub use projection::{
    array_json, extract_xml_fragment_text, map_json, project_json, xml_fragment_json, RootKind,
};
pub use update::{
    apply_update, apply_update_gc, diff_update, encode_state_vector, load_doc, merge_updates,
    new_doc,
};
