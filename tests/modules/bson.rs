use bsonkit::{doc, spec::BinarySubtype, Binary, Bson, DateTime, ObjectId, Regex, Timestamp};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn canonical_extjson_numbers() {
    assert_eq!(
        Bson::Int32(-42).into_canonical_extjson(),
        json!({ "$numberInt": "-42" })
    );
    assert_eq!(
        Bson::Int64(9_223_372_036_854_775_807).into_canonical_extjson(),
        json!({ "$numberLong": "9223372036854775807" })
    );
    assert_eq!(
        Bson::Double(1.5).into_canonical_extjson(),
        json!({ "$numberDouble": "1.5" })
    );
    assert_eq!(
        Bson::Double(1.0).into_canonical_extjson(),
        json!({ "$numberDouble": "1.0" })
    );
    assert_eq!(
        Bson::Double(-0.0).into_canonical_extjson(),
        json!({ "$numberDouble": "-0.0" })
    );
    assert_eq!(
        Bson::Double(f64::NAN).into_canonical_extjson(),
        json!({ "$numberDouble": "NaN" })
    );
    assert_eq!(
        Bson::Double(f64::NEG_INFINITY).into_canonical_extjson(),
        json!({ "$numberDouble": "-Infinity" })
    );
}

#[test]
fn canonical_extjson_scalars() {
    assert_eq!(
        Bson::String("ab\"c".to_string()).into_canonical_extjson(),
        json!("ab\"c")
    );
    assert_eq!(Bson::Boolean(true).into_canonical_extjson(), json!(true));
    assert_eq!(Bson::Null.into_canonical_extjson(), serde_json::Value::Null);
    assert_eq!(Bson::MinKey.into_canonical_extjson(), json!({ "$minKey": 1 }));
    assert_eq!(Bson::MaxKey.into_canonical_extjson(), json!({ "$maxKey": 1 }));
    assert_eq!(
        Bson::Undefined.into_canonical_extjson(),
        json!({ "$undefined": true })
    );
}

#[test]
fn canonical_extjson_datetime_is_always_numeric() {
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(1_590_972_160_292)).into_canonical_extjson(),
        json!({ "$date": { "$numberLong": "1590972160292" } })
    );
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(-47)).into_canonical_extjson(),
        json!({ "$date": { "$numberLong": "-47" } })
    );
}

#[test]
fn relaxed_extjson_datetime_uses_rfc3339_in_range() {
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(1_590_972_160_292)).into_relaxed_extjson(),
        json!({ "$date": "2020-06-01T01:22:40.292Z" })
    );

    // Out-of-range dates fall back to the numeric form.
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(-47)).into_relaxed_extjson(),
        json!({ "$date": { "$numberLong": "-47" } })
    );
}

#[test]
fn extjson_object_id() {
    let oid = ObjectId::parse_str("53e37d08776f724e42000000").unwrap();
    assert_eq!(
        Bson::ObjectId(oid).into_canonical_extjson(),
        json!({ "$oid": "53e37d08776f724e42000000" })
    );
}

#[test]
fn extjson_binary_subtype_is_two_hex_digits() {
    let binary = Binary {
        subtype: BinarySubtype::UserDefined(0x80),
        bytes: vec![1, 2, 3],
    };
    assert_eq!(
        Bson::Binary(binary).into_canonical_extjson(),
        json!({ "$binary": { "base64": "AQID", "subType": "80" } })
    );

    let empty = Binary {
        subtype: BinarySubtype::Generic,
        bytes: vec![],
    };
    assert_eq!(
        Bson::Binary(empty).into_canonical_extjson(),
        json!({ "$binary": { "base64": "", "subType": "00" } })
    );
}

#[test]
fn extjson_regex_options_are_sorted() {
    let regex = Regex {
        pattern: "a*b".to_string(),
        options: "mix".to_string(),
    };
    assert_eq!(
        Bson::RegularExpression(regex).into_canonical_extjson(),
        json!({ "$regularExpression": { "pattern": "a*b", "options": "imx" } })
    );
}

#[test]
fn extjson_code_shapes() {
    assert_eq!(
        Bson::JavaScriptCode("function() {}".to_string()).into_canonical_extjson(),
        json!({ "$code": "function() {}" })
    );

    let code_w_scope = bsonkit::JavaScriptCodeWithScope {
        code: "this.x".to_string(),
        scope: doc! { "x": 5_i32 },
    };
    assert_eq!(
        Bson::JavaScriptCodeWithScope(code_w_scope).into_canonical_extjson(),
        json!({ "$code": "this.x", "$scope": { "x": { "$numberInt": "5" } } })
    );
}

#[test]
fn extjson_timestamp() {
    let ts = Timestamp {
        time: 1_286_036_625,
        increment: 1,
    };
    assert_eq!(
        Bson::Timestamp(ts).into_canonical_extjson(),
        json!({ "$timestamp": { "t": 1_286_036_625_u32, "i": 1_u32 } })
    );
}

#[test]
fn extjson_db_pointer() {
    let oid = ObjectId::parse_str("0102030405060708090a0b0c").unwrap();
    let pointer = bsonkit::DbPointer {
        namespace: "db.coll".to_string(),
        id: oid,
    };
    assert_eq!(
        Bson::DbPointer(pointer).into_canonical_extjson(),
        json!({
            "$dbPointer": {
                "$ref": "db.coll",
                "$id": { "$oid": "0102030405060708090a0b0c" }
            }
        })
    );
}

#[test]
fn extjson_document_preserves_order() {
    let doc = doc! {
        "b": 1_i32,
        "a": "x",
        "nested": { "z": 0.5, "y": [2_i64] },
    };

    let value = Bson::Document(doc).into_canonical_extjson();
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        "{\"b\":{\"$numberInt\":\"1\"},\"a\":\"x\",\"nested\":{\"z\":{\"$numberDouble\":\"0.5\"},\"y\":[{\"$numberLong\":\"2\"}]}}"
    );
}

#[test]
fn relaxed_extjson_plain_numbers() {
    assert_eq!(Bson::Int32(5).into_relaxed_extjson(), json!(5));
    assert_eq!(Bson::Int64(5).into_relaxed_extjson(), json!(5_i64));
    assert_eq!(Bson::Double(2.25).into_relaxed_extjson(), json!(2.25));
    assert_eq!(
        Bson::Double(f64::INFINITY).into_relaxed_extjson(),
        json!({ "$numberDouble": "Infinity" })
    );
}

#[test]
fn bson_display() {
    let doc = doc! {
        "float": 2.4,
        "string": "hello",
        "array": ["testing", 1_i32, true],
        "bool": true,
        "null": null,
        "regexp": Bson::RegularExpression(Regex::from_strings("s[ao]d", "i").unwrap()),
        "i64": -55_i64,
        "timestamp": Timestamp { time: 0, increment: 229_999_444 },
    };

    assert_eq!(
        format!("{}", doc),
        "{ float: 2.4, string: \"hello\", array: [\"testing\", 1, true], bool: true, \
         null: null, regexp: /s[ao]d/i, i64: -55, timestamp: Timestamp(0, 229999444) }"
    );
}
