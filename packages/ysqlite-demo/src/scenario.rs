use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::params;
use tracing::{info, warn};
use ysqlite_ext::DocStore;

use crate::editor::{Editor, MAP_ROOT};

const DOC_ID: i64 = 1;

pub struct ScenarioOptions {
    pub docs: u32,
    pub threshold: i64,
    pub seed: Option<u64>,
}

/// Read row `DOC_ID` back, decode it on the client side and check `foo`.
fn check_foo(store: &DocStore, step: &str, expected: &str) -> Result<Editor> {
    info!("{step}");
    let blob = store
        .load(DOC_ID)?
        .with_context(|| format!("document {DOC_ID} is missing"))?;
    let json: serde_json::Value = serde_json::from_str(&ysqlite_core::map_json(&blob, MAP_ROOT)?)?;
    let foo = json["foo"].as_str().unwrap_or_default();
    info!(r#"Value of "foo": {foo}"#);
    ensure!(foo == expected, "expected foo = {expected:?}, found {foo:?}");
    Editor::from_update(&blob)
}

pub fn run(store: &DocStore, opts: &ScenarioOptions) -> Result<()> {
    let conn = store.connection();
    let func = |operation: &str| store.config().sql_name(operation);

    info!("Create and insert new document");
    let editor = Editor::new();
    editor.set_str("foo", "bar");
    conn.execute(
        "INSERT INTO docs (id, doc) VALUES (?1, ?2)",
        params![DOC_ID, editor.update()],
    )
    .context("inserting the first document")?;
    let editor = check_foo(store, "Get document", "bar")?;

    info!("Update document");
    editor.set_str("foo", "bar2");
    conn.execute(
        "UPDATE docs SET doc = ?1 WHERE id = ?2",
        params![editor.update(), DOC_ID],
    )
    .context("overwriting the document")?;
    let editor = check_foo(store, "Get updated document", "bar2")?;

    let apply_update = func("apply_update");
    info!("Update document using {apply_update} with whole doc");
    editor.set_str("foo", "bar3");
    conn.execute(
        &format!("UPDATE docs SET doc = {apply_update}(doc, ?1) WHERE id = ?2"),
        params![editor.update(), DOC_ID],
    )
    .context("merging the whole document")?;
    let editor = check_foo(store, "Get updated document", "bar3")?;

    let encode_state_vector = func("encode_state_vector");
    info!("Get current state vector from database using {encode_state_vector}");
    let state_vector: Vec<u8> = conn
        .query_row(
            &format!("SELECT {encode_state_vector}(doc) FROM docs WHERE id = ?1"),
            [DOC_ID],
            |row| row.get(0),
        )
        .context("reading the state vector")?;
    info!("State vector: {state_vector:?}");

    info!("Update document using {apply_update} with diff");
    editor.set_str("foo", "bar4");
    let diff = editor.diff(&state_vector)?;
    info!(
        diff_bytes = diff.len(),
        full_bytes = editor.update().len(),
        "encoded diff against stored state vector"
    );
    conn.execute(
        &format!("UPDATE docs SET doc = {apply_update}(doc, ?1) WHERE id = ?2"),
        params![diff, DOC_ID],
    )
    .context("merging the diff")?;
    check_foo(store, "Get updated document", "bar4")?;

    let get_map_json = func("get_map_json");
    info!("Get value of 'foo' directly from database");
    let foo: String = conn
        .query_row(
            &format!("SELECT {get_map_json}(doc, ?1) ->> '$.foo' FROM docs WHERE id = ?2"),
            params![MAP_ROOT, DOC_ID],
            |row| row.get(0),
        )
        .context("projecting foo in SQL")?;
    info!("Value of 'foo': {foo}");
    ensure!(foo == "bar4", "expected foo = \"bar4\" from SQL, found {foo:?}");

    info!("Add {} documents", opts.docs);
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    for i in 1..=opts.docs {
        let editor = Editor::new();
        editor.set_str("foo", &format!("bar{i}"));
        editor.set_num("num", rng.gen_range(0..100));
        store.insert(&editor.update())?;
    }

    let threshold = opts.threshold;
    info!("Count all documents with 'num' below {threshold}");
    let direct = store.count_where_map_field_below(MAP_ROOT, "num", threshold)?;
    info!("Count: {direct}");

    info!("Create an index on the 'num' field by adding a virtual column");
    store.add_map_field_column("num", MAP_ROOT, "num", "INTEGER")?;
    store.create_index("docs_num", "num")?;

    let count_sql = format!("SELECT COUNT(*) FROM docs WHERE num < {threshold}");
    let plan = store.query_plan(&count_sql)?;
    for line in &plan {
        info!("Query plan: {line}");
    }
    if !plan.iter().any(|line| line.contains("docs_num")) {
        warn!("query planner did not pick docs_num");
    }

    for label in ["Count", "Count AGAIN"] {
        info!("{label} all documents with 'num' below {threshold}");
        let indexed = store.count_where_column_below("num", threshold)?;
        info!("Count: {indexed}");
        ensure!(
            indexed == direct,
            "indexed count {indexed} differs from function count {direct}"
        );
    }

    Ok(())
}
