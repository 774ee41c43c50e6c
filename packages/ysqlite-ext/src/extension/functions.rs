//! The fixed function table. Each entry pairs an operation name with its argument count and a
//! plain `fn` handler; `register_functions` walks it once per connection.

mod doc;
mod json;
mod updates;
mod util;

use std::os::raw::c_int;

use rusqlite::functions::Context;
use rusqlite::types::Value;

pub type Handler = fn(&Context<'_>) -> rusqlite::Result<Value>;

#[derive(Clone, Copy, Debug)]
pub struct FunctionSpec {
    /// Operation name without the configured prefix.
    pub name: &'static str,
    /// Number of SQL arguments, `-1` for variadic.
    pub n_arg: c_int,
    pub handler: Handler,
}

pub const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "version",
        n_arg: 0,
        handler: doc::version,
    },
    FunctionSpec {
        name: "new_doc",
        n_arg: 0,
        handler: doc::new_doc,
    },
    FunctionSpec {
        name: "apply_update",
        n_arg: 2,
        handler: updates::apply_update,
    },
    FunctionSpec {
        name: "apply_update_gc",
        n_arg: 2,
        handler: updates::apply_update_gc,
    },
    FunctionSpec {
        name: "merge_updates",
        n_arg: -1,
        handler: updates::merge_updates,
    },
    FunctionSpec {
        name: "diff_update",
        n_arg: 2,
        handler: updates::diff_update,
    },
    FunctionSpec {
        name: "encode_state_vector",
        n_arg: 1,
        handler: updates::encode_state_vector,
    },
    FunctionSpec {
        name: "get_map_json",
        n_arg: 2,
        handler: json::get_map_json,
    },
    FunctionSpec {
        name: "get_array_json",
        n_arg: 2,
        handler: json::get_array_json,
    },
    FunctionSpec {
        name: "get_xml_fragment_json",
        n_arg: 2,
        handler: json::get_xml_fragment_json,
    },
    FunctionSpec {
        name: "extract_xml_fragment_text",
        n_arg: 2,
        handler: json::extract_xml_fragment_text,
    },
];
