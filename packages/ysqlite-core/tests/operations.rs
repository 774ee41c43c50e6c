use serde::Deserialize;
use ysqlite_core::{
    apply_update, apply_update_gc, array_json, diff_update, encode_state_vector,
    extract_xml_fragment_text, load_doc, map_json, merge_updates, new_doc, xml_fragment_json,
    Error,
};
use ysqlite_test_support::{malformed_blob, map_update, Client, ARRAY_ROOT, MAP_ROOT, XML_ROOT};
use yrs::{Any, ReadTxn, StateVector, Transact};

#[derive(Deserialize, Debug, PartialEq)]
struct MyMap {
    foo: String,
    num: Option<i64>,
}

fn foo_of(update: &[u8]) -> MyMap {
    serde_json::from_str(&map_json(update, MAP_ROOT).unwrap()).unwrap()
}

fn foo_of_json(update: &[u8]) -> serde_json::Value {
    serde_json::from_str(&map_json(update, MAP_ROOT).unwrap()).unwrap()
}

#[test]
fn fresh_doc_round_trips_byte_equal() {
    let update = new_doc();
    let doc = load_doc(&update).unwrap();
    let reencoded = doc.transact().encode_state_as_update_v1(&StateVector::default());
    assert_eq!(reencoded, update);
}

#[test]
fn apply_update_merges_full_documents() {
    let client = Client::new(1);
    client.set("foo", "bar");
    let stored = client.update();

    client.set("foo", "bar2");
    let merged = apply_update(&stored, &client.update()).unwrap();
    assert_eq!(
        foo_of(&merged),
        MyMap {
            foo: "bar2".into(),
            num: None
        }
    );
}

#[test]
fn gc_path_reaches_the_same_visible_state() {
    let client = Client::new(1);
    client.set("foo", "bar");
    client.set("num", Any::BigInt(7));
    let stored = client.update();

    client.set("foo", "bar2");
    client.remove("num");
    let incoming = client.update();

    let plain = apply_update(&stored, &incoming).unwrap();
    let gc = apply_update_gc(&stored, &incoming).unwrap();
    assert_eq!(foo_of(&plain), foo_of(&gc));
    assert_eq!(foo_of(&gc).num, None);
}

#[test]
fn gc_path_drops_overwritten_content_and_plain_path_keeps_it() {
    let long = "x".repeat(1024);
    let client = Client::new(1);
    client.set("foo", long.as_str());
    let stored = client.update();

    client.set("foo", "bar");
    let incoming = client.update();

    let plain = apply_update(&stored, &incoming).unwrap();
    let gc = apply_update_gc(&stored, &incoming).unwrap();

    let needle = &long.as_bytes()[..64];
    let holds_old_value = |bytes: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
    assert!(holds_old_value(&plain));
    assert!(!holds_old_value(&gc));
    assert!(gc.len() < plain.len());
    assert_eq!(foo_of(&gc).foo, "bar");
    assert_eq!(foo_of(&plain).foo, "bar");
}

#[test]
fn gc_path_keeps_updates_that_arrive_early() {
    let client = Client::new(1);
    client.set("a", "first");
    let early = client.update();
    let sv = client.state_vector();
    client.set("c", "later");
    let late = client.diff(&sv);

    let gc_parked = apply_update_gc(&new_doc(), &late).unwrap();
    let gc = apply_update_gc(&gc_parked, &early).unwrap();
    let plain = apply_update(&apply_update(&new_doc(), &late).unwrap(), &early).unwrap();

    let json = foo_of_json(&gc);
    assert_eq!(json["a"], "first");
    assert_eq!(json["c"], "later");
    assert_eq!(json, foo_of_json(&plain));
    assert_eq!(
        encode_state_vector(&gc).unwrap(),
        encode_state_vector(&client.update()).unwrap()
    );
}

#[test]
fn merge_updates_combines_independent_clients() {
    let a = map_update(1, &[("foo", Any::from("a"))]);
    let b = map_update(2, &[("num", Any::BigInt(3))]);
    let merged = merge_updates(&[a.as_slice(), b.as_slice()]).unwrap();

    let json = foo_of_json(&merged);
    assert_eq!(json["foo"], "a");
    assert_eq!(json["num"], 3);
}

#[test]
fn merge_updates_drops_duplicates() {
    let a = map_update(1, &[("foo", Any::from("a"))]);
    let once = merge_updates(&[a.clone()]).unwrap();
    let thrice = merge_updates(&[a.clone(), a.clone(), a]).unwrap();
    assert_eq!(once.len(), thrice.len());
    assert_eq!(foo_of_json(&once), foo_of_json(&thrice));
}

#[test]
fn diff_against_state_vector_catches_up_older_copy() {
    let client = Client::new(1);
    client.set("foo", "bar3");
    let older = client.update();
    let sv = encode_state_vector(&older).unwrap();

    client.set("foo", "bar4");
    let newer = client.update();

    let diff = diff_update(&newer, &sv).unwrap();
    assert!(diff.len() < newer.len());
    let caught_up = apply_update(&older, &diff).unwrap();
    assert_eq!(foo_of(&caught_up).foo, "bar4");
}

#[test]
fn state_vector_matches_the_client_view() {
    let client = Client::new(9);
    client.set("foo", "bar");
    assert_eq!(encode_state_vector(&client.update()).unwrap(), client.state_vector());
}

#[test]
fn array_and_xml_projections() {
    let client = Client::new(4);
    client.push(Any::from("x"));
    client.push(Any::BigInt(2));
    client.push_xml("p", "hello");
    let update = client.update();

    let array: serde_json::Value =
        serde_json::from_str(&array_json(&update, ARRAY_ROOT).unwrap()).unwrap();
    assert_eq!(array, serde_json::json!(["x", 2]));

    let xml: String =
        serde_json::from_str(&xml_fragment_json(&update, XML_ROOT).unwrap()).unwrap();
    assert!(xml.contains("hello"), "unexpected xml: {xml}");

    assert_eq!(extract_xml_fragment_text(&update, XML_ROOT).unwrap(), "");
}

#[test]
fn malformed_updates_are_errors() {
    let bad = malformed_blob();
    assert!(matches!(map_json(&bad, MAP_ROOT), Err(Error::Decode(_))));
    assert!(matches!(array_json(&bad, ARRAY_ROOT), Err(Error::Decode(_))));
    assert!(matches!(xml_fragment_json(&bad, XML_ROOT), Err(Error::Decode(_))));
    assert!(merge_updates(&[new_doc(), bad]).is_err());
}
