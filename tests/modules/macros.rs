use bsonkit::{bson, doc, oid::ObjectId, Bson, Document};
use pretty_assertions::assert_eq;

#[test]
fn standard_format() {
    let id_string = "thisismyname";
    let string_bytes: Vec<_> = id_string.bytes().collect();
    let mut bytes = [0; 12];
    bytes[..12].clone_from_slice(&string_bytes[..12]);

    let id = ObjectId::from_bytes(bytes);

    let doc = doc! {
        "float": 2.4,
        "string": "hello",
        "array": ["testing", 1, true, [1, 2]],
        "doc": {
            "fish": "in",
            "a": "barrel",
            "!": 1,
        },
        "bool": true,
        "null": null,
        "with_wrapped_parens": (-20),
        "code": Bson::JavaScriptCode("function(x) { return x._id; }".to_owned()),
        "i32": 12_i32,
        "i64": -55_i64,
        "_id": id,
    };

    let keys: Vec<_> = doc.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "float",
            "string",
            "array",
            "doc",
            "bool",
            "null",
            "with_wrapped_parens",
            "code",
            "i32",
            "i64",
            "_id",
        ]
    );

    assert_eq!(doc.get("float"), Some(&Bson::Double(2.4)));
    assert_eq!(
        doc.get("array"),
        Some(&Bson::Array(vec![
            Bson::String("testing".to_owned()),
            Bson::Int32(1),
            Bson::Boolean(true),
            Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)]),
        ]))
    );
    assert_eq!(
        doc.get_document("doc"),
        Some(&doc! { "fish": "in", "a": "barrel", "!": 1 })
    );
    assert_eq!(doc.get("null"), Some(&Bson::Null));
    assert_eq!(doc.get("with_wrapped_parens"), Some(&Bson::Int32(-20)));
    assert_eq!(doc.get("_id"), Some(&Bson::ObjectId(id)));
}

#[test]
fn empty_shapes() {
    assert_eq!(doc! {}, Document::new());
    assert_eq!(bson!([]), Bson::Array(vec![]));
    assert_eq!(bson!({}), Bson::Document(Document::new()));
    assert_eq!(bson!(null), Bson::Null);
}

#[test]
fn trailing_commas() {
    let doc = doc! {
        "a": [1, 2,],
        "b": { "c": 3, },
    };

    assert_eq!(
        doc.get_array("a"),
        Some(&vec![Bson::Int32(1), Bson::Int32(2)])
    );
    assert_eq!(doc.get_document("b"), Some(&doc! { "c": 3 }));
}

#[test]
fn computed_keys_and_values() {
    let key = format!("key-{}", 1);
    let doc = doc! {
        (key.as_str()): (2 + 3),
        "sum": 10_i64 + 4,
    };

    assert_eq!(doc.get_i32("key-1"), Some(5));
    assert_eq!(doc.get_i64("sum"), Some(14));
}

#[test]
fn nested_bson_macro() {
    let value = bson!({
        "list": [{ "inner": null }, 4.5],
    });

    let doc = value.as_document().unwrap();
    let list = doc.get_array("list").unwrap();
    assert_eq!(list[0], Bson::Document(doc! { "inner": null }));
    assert_eq!(list[1], Bson::Double(4.5));
}
