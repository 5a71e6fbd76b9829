use docket_domain::constants::{DEFAULT_COLLECTION, DOCUMENT_ID_LEN, POST_DOCUMENT_SCHEMA};
use docket_domain::Document;
use serde_json::json;

#[test]
fn constants_match_expected_values() {
    assert_eq!(POST_DOCUMENT_SCHEMA, "postDocument");
    assert_eq!(DEFAULT_COLLECTION, "documents");
    assert_eq!(DOCUMENT_ID_LEN, 24);
}

#[test]
fn document_deserializes_nested_body() {
    let raw = json!({
        "name": "invoice",
        "doc": { "total": 12.5, "lines": [{ "sku": "a-1", "qty": 2 }], "meta": { "paid": false } }
    });

    let doc: Document = serde_json::from_value(raw).expect("document deserialize");
    assert_eq!(doc.name, "invoice");
    assert_eq!(doc.doc["lines"][0]["qty"], json!(2));
    assert_eq!(doc.doc["meta"]["paid"], json!(false));
}

#[test]
fn missing_body_defaults_to_empty_map() {
    let doc: Document = serde_json::from_value(json!({ "name": "empty-document" })).expect("deserialize");
    assert!(doc.doc.is_empty());
}

#[test]
fn document_serializes_with_wire_field_names() {
    let mut body = serde_json::Map::new();
    body.insert("k".to_owned(), json!("v"));
    let doc = Document::new("a", body);

    let value = serde_json::to_value(&doc).expect("serialize");
    assert_eq!(value, json!({ "name": "a", "doc": { "k": "v" } }));
}

#[test]
fn missing_name_is_rejected() {
    let result = serde_json::from_value::<Document>(json!({ "doc": {} }));
    assert!(result.is_err());
}
