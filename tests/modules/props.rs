use bsonkit::{
    spec::BinarySubtype,
    Binary,
    Bson,
    DateTime,
    DbPointer,
    Document,
    JavaScriptCodeWithScope,
    ObjectId,
    Regex,
    Timestamp,
};
use proptest::prelude::*;

fn arb_binary() -> impl Strategy<Value = Binary> {
    let subtype = prop_oneof![
        Just(BinarySubtype::Generic),
        Just(BinarySubtype::Function),
        Just(BinarySubtype::BinaryOld),
        Just(BinarySubtype::Md5),
        (0x80..=0xFFu8).prop_map(BinarySubtype::UserDefined),
    ];

    (subtype, prop::collection::vec(any::<u8>(), 0..32))
        .prop_map(|(subtype, bytes)| Binary { subtype, bytes })
}

fn arb_regex() -> impl Strategy<Value = Regex> {
    let options = proptest::sample::subsequence(vec!['i', 'l', 'm', 's', 'u', 'x'], 0..=6)
        .prop_map(|chars| chars.into_iter().collect::<String>());

    ("[a-z*^$]{0,8}", options).prop_map(|(pattern, options)| Regex { pattern, options })
}

fn arb_object_id() -> impl Strategy<Value = ObjectId> {
    any::<[u8; 12]>().prop_map(ObjectId::from_bytes)
}

fn arb_document(values: impl Strategy<Value = Bson>) -> impl Strategy<Value = Document> {
    prop::collection::vec(("[a-z0-9_]{0,8}", values), 0..4).prop_map(|entries| {
        let mut doc = Document::new();
        for (key, value) in entries {
            doc.insert(key, value);
        }
        doc
    })
}

fn arb_bson() -> impl Strategy<Value = Bson> {
    let leaf = prop_oneof![
        any::<i32>().prop_map(Bson::Int32),
        any::<i64>().prop_map(Bson::Int64),
        any::<f64>()
            .prop_filter("NaN is not equal to itself", |f| !f.is_nan())
            .prop_map(Bson::Double),
        any::<bool>().prop_map(Bson::Boolean),
        ".{0,16}".prop_map(Bson::String),
        ".{0,16}".prop_map(Bson::JavaScriptCode),
        Just(Bson::Null),
        Just(Bson::Undefined),
        Just(Bson::MinKey),
        Just(Bson::MaxKey),
        any::<i64>().prop_map(|millis| Bson::DateTime(DateTime::from_millis(millis))),
        (any::<u32>(), any::<u32>()).prop_map(|(time, increment)| {
            Bson::Timestamp(Timestamp { time, increment })
        }),
        arb_object_id().prop_map(Bson::ObjectId),
        arb_binary().prop_map(Bson::Binary),
        arb_regex().prop_map(Bson::RegularExpression),
        (".{0,8}", arb_object_id()).prop_map(|(namespace, id)| {
            Bson::DbPointer(DbPointer { namespace, id })
        }),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Bson::Array),
            arb_document(inner.clone()).prop_map(Bson::Document),
            (".{0,8}", arb_document(inner)).prop_map(|(code, scope)| {
                Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope })
            }),
        ]
    })
}

proptest! {
    // decode(encode(v)) == v, and the re-encoded bytes are identical.
    #[test]
    fn documents_round_trip_through_bytes(doc in arb_document(arb_bson())) {
        let bytes = doc.to_vec().unwrap();
        let decoded = Document::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&decoded, &doc);
        prop_assert_eq!(decoded.to_vec().unwrap(), bytes);
    }

    // The length prefix covers the whole byte form and the last byte is NUL.
    #[test]
    fn document_framing_invariants(doc in arb_document(arb_bson())) {
        let bytes = doc.to_vec().unwrap();
        let declared = i32::from_le_bytes(bytes[..4].try_into().unwrap());
        prop_assert_eq!(declared as usize, bytes.len());
        prop_assert_eq!(*bytes.last().unwrap(), 0u8);
    }

    // Arbitrary byte soup never panics and never half-decodes: it either
    // produces a document or a typed error.
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = Document::from_bytes(&bytes);
    }

    // Truncating a valid document always fails cleanly.
    #[test]
    fn truncation_always_errors(doc in arb_document(arb_bson()), cut in 0.0..1.0f64) {
        let bytes = doc.to_vec().unwrap();
        let len = ((bytes.len() - 1) as f64 * cut) as usize;
        prop_assert!(Document::from_bytes(&bytes[..len]).is_err());
    }
}
