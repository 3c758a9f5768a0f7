use assert_matches::assert_matches;
use bsonkit::{
    doc,
    from_document,
    from_slice,
    spec::BinarySubtype,
    to_bson,
    to_document,
    to_vec,
    Binary,
    Bson,
    DateTime,
    Document,
    ErrorKind,
    JavaScriptCodeWithScope,
    ObjectId,
    Regex,
    Timestamp,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Person {
    name: String,
    age: i32,
    tags: Vec<String>,
    nickname: Option<String>,
}

#[test]
fn struct_to_document_field_order() {
    let person = Person {
        name: "Jane".to_string(),
        age: 37,
        tags: vec!["a".to_string(), "b".to_string()],
        nickname: None,
    };

    let doc = to_document(&person).unwrap();
    assert_eq!(
        doc,
        doc! {
            "name": "Jane",
            "age": 37_i32,
            "tags": ["a", "b"],
            "nickname": null,
        }
    );

    let back: Person = from_document(doc).unwrap();
    assert_eq!(back, person);
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Wrapper {
    id: ObjectId,
    created: DateTime,
    ts: Timestamp,
    pattern: Regex,
    data: Binary,
    code: JavaScriptCodeWithScope,
    anything: Bson,
}

#[test]
fn wrapper_types_pass_through_the_bridge() {
    let wrapper = Wrapper {
        id: ObjectId::parse_str("53e37d08776f724e42000000").unwrap(),
        created: DateTime::from_millis(1_590_972_160_292),
        ts: Timestamp {
            time: 12,
            increment: 5,
        },
        pattern: Regex::from_strings("^a", "im").unwrap(),
        data: Binary {
            subtype: BinarySubtype::UserDefined(0x81),
            bytes: vec![1, 2, 3],
        },
        code: JavaScriptCodeWithScope {
            code: "this.a".to_string(),
            scope: doc! { "a": 1_i32 },
        },
        anything: Bson::MinKey,
    };

    let doc = to_document(&wrapper).unwrap();
    assert_eq!(
        doc.get("id"),
        Some(&Bson::ObjectId(
            ObjectId::parse_str("53e37d08776f724e42000000").unwrap()
        ))
    );
    assert_matches!(doc.get("created"), Some(Bson::DateTime(_)));
    assert_matches!(doc.get("ts"), Some(Bson::Timestamp(_)));
    assert_matches!(doc.get("pattern"), Some(Bson::RegularExpression(_)));
    assert_matches!(doc.get("data"), Some(Bson::Binary(_)));
    assert_matches!(doc.get("code"), Some(Bson::JavaScriptCodeWithScope(_)));
    assert_eq!(doc.get("anything"), Some(&Bson::MinKey));

    let back: Wrapper = from_document(doc).unwrap();
    assert_eq!(back, wrapper);
}

#[test]
fn bridge_round_trips_through_bytes() {
    let person = Person {
        name: "Bob".to_string(),
        age: 7,
        tags: vec![],
        nickname: Some("bo".to_string()),
    };

    let bytes = to_vec(&person).unwrap();
    assert_eq!(Document::from_bytes(&bytes).unwrap().get_str("name"), Some("Bob"));

    let back: Person = from_slice(&bytes).unwrap();
    assert_eq!(back, person);
}

#[test]
fn unsigned_integers_widen() {
    #[derive(Serialize)]
    struct Unsigned {
        small: u8,
        medium: u16,
        large: u32,
        huge: u64,
    }

    let doc = to_document(&Unsigned {
        small: 7,
        medium: 300,
        large: 70_000,
        huge: 5,
    })
    .unwrap();

    assert_eq!(doc.get("small"), Some(&Bson::Int32(7)));
    assert_eq!(doc.get("medium"), Some(&Bson::Int32(300)));
    assert_eq!(doc.get("large"), Some(&Bson::Int64(70_000)));
    assert_eq!(doc.get("huge"), Some(&Bson::Int64(5)));

    let err = to_bson(&u64::MAX).unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidArgument { .. });
}

#[test]
fn type_mismatch_reports_offending_key() {
    let doc = doc! { "name": "Jane", "age": "not a number", "tags": [], "nickname": null };

    let err = from_document::<Person>(doc).unwrap_err();
    assert_matches!(err.kind, ErrorKind::TypeMismatch { .. });
    assert_eq!(err.key.as_deref(), Some("age"));
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
enum Shape {
    Point,
    Circle(f64),
    Rect { w: i32, h: i32 },
}

#[test]
fn enums_round_trip() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Shapes {
        a: Shape,
        b: Shape,
        c: Shape,
    }

    let shapes = Shapes {
        a: Shape::Point,
        b: Shape::Circle(1.5),
        c: Shape::Rect { w: 3, h: 4 },
    };

    let doc = to_document(&shapes).unwrap();
    assert_eq!(doc.get("a"), Some(&Bson::String("Point".to_string())));

    let back: Shapes = from_document(doc).unwrap();
    assert_eq!(back, shapes);
}

#[test]
fn bytes_become_generic_binary() {
    #[derive(Serialize)]
    struct Blob<'a> {
        #[serde(with = "serde_bytes_shim")]
        data: &'a [u8],
    }

    // A minimal serialize_bytes shim; the full serde_bytes crate is not
    // needed for this assertion.
    mod serde_bytes_shim {
        pub fn serialize<S: serde::Serializer>(
            data: &[u8],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(data)
        }
    }

    let doc = to_document(&Blob { data: &[1, 2, 3] }).unwrap();
    assert_eq!(
        doc.get("data"),
        Some(&Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![1, 2, 3],
        }))
    );
}

// The `$`-wrapper interpretation the bridge applies when an untyped map
// arrives. Shapes are tried in a fixed priority order, and unrecognized or
// malformed wrappers stay plain documents.
#[test]
fn extended_wrapper_resolution() {
    let cases: Vec<(serde_json::Value, Bson)> = vec![
        (
            serde_json::json!({ "$numberInt": "5" }),
            Bson::Int32(5),
        ),
        (
            serde_json::json!({ "$numberLong": "-9" }),
            Bson::Int64(-9),
        ),
        (
            serde_json::json!({ "$numberDouble": "2.5" }),
            Bson::Double(2.5),
        ),
        (
            serde_json::json!({ "$oid": "53e37d08776f724e42000000" }),
            Bson::ObjectId(ObjectId::parse_str("53e37d08776f724e42000000").unwrap()),
        ),
        (
            serde_json::json!({ "$binary": { "base64": "AQID", "subType": "05" } }),
            Bson::Binary(Binary {
                subtype: BinarySubtype::Md5,
                bytes: vec![1, 2, 3],
            }),
        ),
        (
            serde_json::json!({ "$regularExpression": { "pattern": "^a", "options": "mi" } }),
            Bson::RegularExpression(Regex::from_strings("^a", "im").unwrap()),
        ),
        (
            serde_json::json!({ "$code": "x", "$scope": {} }),
            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
                code: "x".to_string(),
                scope: Document::new(),
            }),
        ),
        (
            serde_json::json!({ "$code": "x" }),
            Bson::JavaScriptCode("x".to_string()),
        ),
        (
            serde_json::json!({ "$symbol": "sym" }),
            Bson::Symbol("sym".to_string()),
        ),
        (serde_json::json!({ "$minKey": 1 }), Bson::MinKey),
        (serde_json::json!({ "$maxKey": 1 }), Bson::MaxKey),
        (serde_json::json!({ "$undefined": true }), Bson::Undefined),
        (
            serde_json::json!({ "$timestamp": { "t": 1, "i": 2 } }),
            Bson::Timestamp(Timestamp {
                time: 1,
                increment: 2,
            }),
        ),
        (
            serde_json::json!({ "$date": { "$numberLong": "-47" } }),
            Bson::DateTime(DateTime::from_millis(-47)),
        ),
        (
            serde_json::json!({ "$dbPointer": { "$ref": "db.coll", "$id": { "$oid": "53e37d08776f724e42000000" } } }),
            Bson::DbPointer(bsonkit::DbPointer {
                namespace: "db.coll".to_string(),
                id: ObjectId::parse_str("53e37d08776f724e42000000").unwrap(),
            }),
        ),
    ];

    for (json, expected) in cases {
        let parsed: Bson = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(parsed, expected, "wrapper: {}", json);
    }
}

#[test]
fn unrecognized_wrappers_stay_documents() {
    let parsed: Bson = serde_json::from_value(serde_json::json!({ "$wat": 1 })).unwrap();
    assert_eq!(parsed, Bson::Document(doc! { "$wat": 1_i64 }));

    // Extra keys disqualify a wrapper shape.
    let parsed: Bson =
        serde_json::from_value(serde_json::json!({ "$numberInt": "5", "extra": true })).unwrap();
    assert_eq!(
        parsed,
        Bson::Document(doc! { "$numberInt": "5", "extra": true })
    );

    // Malformed payloads fall back too.
    let parsed: Bson =
        serde_json::from_value(serde_json::json!({ "$numberInt": "not a number" })).unwrap();
    assert_eq!(parsed, Bson::Document(doc! { "$numberInt": "not a number" }));
}

#[test]
fn maps_with_non_string_keys_are_rejected() {
    use std::collections::BTreeMap;

    let map: BTreeMap<i32, i32> = [(1, 2)].into_iter().collect();
    let err = to_bson(&map).unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidArgument { .. });
}

#[test]
fn to_document_requires_a_map_shape() {
    let err = to_document(&5_i32).unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidArgument { .. });
}
