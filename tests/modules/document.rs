use bsonkit::{doc, Bson, Document};
use pretty_assertions::assert_eq;

#[test]
fn ordered_insert() {
    let mut doc = Document::new();
    doc.insert("first".to_owned(), Bson::Int32(1));
    doc.insert("second".to_owned(), Bson::String("foo".to_owned()));
    doc.insert("alphanumeric".to_owned(), Bson::String("bar".to_owned()));

    let expected_keys = vec![
        "first".to_owned(),
        "second".to_owned(),
        "alphanumeric".to_owned(),
    ];

    let keys: Vec<_> = doc.iter().map(|(key, _)| key.to_owned()).collect();
    assert_eq!(expected_keys, keys);
}

#[test]
fn ordered_insert_shorthand() {
    let mut doc = Document::new();
    doc.insert("first", 1_i32);
    doc.insert("second", "foo");
    doc.insert("alphanumeric", "bar".to_owned());

    let expected_keys = vec![
        "first".to_owned(),
        "second".to_owned(),
        "alphanumeric".to_owned(),
    ];

    let keys: Vec<_> = doc.iter().map(|(key, _)| key.to_owned()).collect();
    assert_eq!(expected_keys, keys);
}

#[test]
fn insert_on_existing_key_keeps_position() {
    let mut doc = doc! { "a": 1_i32, "b": 2_i32, "c": 3_i32 };
    doc.insert("b", "replaced");

    let entries: Vec<_> = doc
        .iter()
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("a", Bson::Int32(1)),
            ("b", Bson::String("replaced".to_owned())),
            ("c", Bson::Int32(3)),
        ]
    );
}

#[test]
fn remove() {
    let mut doc = doc! { "first": 1_i32, "second": "foo", "third": "bar" };

    assert_eq!(doc.remove("second"), Some(Bson::String("foo".to_owned())));
    assert_eq!(doc.remove("none"), None);

    let keys: Vec<_> = doc.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["first", "third"]);
}

#[test]
fn test_getters() {
    let binary = vec![0, 1, 2, 3, 4];
    let doc = doc! {
        "floating_point": 10.0,
        "string": "a value",
        "array": [10_i32, 20_i32, 30_i32],
        "doc": { "key": 1_i32 },
        "bool": true,
        "i32": 1_i32,
        "i64": 1_i64,
        "binary": bsonkit::Binary {
            subtype: bsonkit::spec::BinarySubtype::Generic,
            bytes: binary.clone(),
        },
    };

    assert_eq!(Some(10.0), doc.get_f64("floating_point"));
    assert_eq!(None, doc.get_f64("string"));
    assert_eq!(Some("a value"), doc.get_str("string"));
    assert_eq!(
        Some(&vec![Bson::Int32(10), Bson::Int32(20), Bson::Int32(30)]),
        doc.get_array("array")
    );
    assert_eq!(Some(&doc! { "key": 1_i32 }), doc.get_document("doc"));
    assert_eq!(Some(true), doc.get_bool("bool"));
    assert_eq!(Some(1), doc.get_i32("i32"));
    assert_eq!(Some(1), doc.get_i64("i64"));
    assert_eq!(Some(&binary), doc.get_binary("binary").map(|b| &b.bytes));
    assert!(doc.get("nonsense").is_none());
    assert!(!doc.contains_key("nonsense"));
    assert!(doc.contains_key("binary"));
}

#[test]
fn duplicate_keys_survive_decoding() {
    // { "a": 1, "a": 2 } built by hand: `doc!`/`insert` can't produce
    // duplicates.
    let mut bytes = vec![0u8; 4];
    for value in [1_i32, 2_i32] {
        bytes.push(0x10);
        bytes.extend_from_slice(b"a\x00");
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.push(0x00);
    let total = bytes.len() as i32;
    bytes[..4].copy_from_slice(&total.to_le_bytes());

    let mut doc = Document::from_bytes(&bytes).unwrap();

    let entries: Vec<_> = doc
        .iter()
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    assert_eq!(
        entries,
        vec![("a", Bson::Int32(1)), ("a", Bson::Int32(2))]
    );

    // Lookup returns the first occurrence, and the byte form round-trips.
    assert_eq!(doc.get_i32("a"), Some(1));
    assert_eq!(doc.bytes().unwrap(), &bytes[..]);

    // Mutation through the first occurrence leaves the second alone.
    doc.insert("a", 9_i32);
    let keys: Vec<_> = doc.values().cloned().collect();
    assert_eq!(keys, vec![Bson::Int32(9), Bson::Int32(2)]);
}

#[test]
fn get_mut_invalidates_cached_bytes() {
    let mut doc = doc! { "a": 1_i32 };
    let before = doc.bytes().unwrap().to_vec();

    if let Some(value) = doc.get_mut("a") {
        *value = Bson::Int32(2);
    }

    assert_ne!(doc.bytes().unwrap(), &before[..]);
    assert_eq!(doc, doc! { "a": 2_i32 });
}

#[test]
fn extend_and_from_iterator() {
    let mut doc: Document = vec![
        ("a".to_owned(), Bson::Int32(1)),
        ("b".to_owned(), Bson::Int32(2)),
    ]
    .into_iter()
    .collect();

    doc.extend(doc! { "b": 20_i32, "c": 30_i32 });

    assert_eq!(doc, doc! { "a": 1_i32, "b": 20_i32, "c": 30_i32 });
}

#[test]
fn display_format() {
    let doc = doc! {
        "a": 1_i32,
        "s": "hello",
        "inner": { "b": true },
        "list": [1_i32, "x"],
    };

    assert_eq!(
        format!("{}", doc),
        "{ a: 1, s: \"hello\", inner: { b: true }, list: [1, \"x\"] }"
    );
    assert_eq!(format!("{}", Document::new()), "{}");
}
