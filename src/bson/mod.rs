//! BSON definition

mod json;

use std::fmt::{self, Display};

use crate::{
    base64,
    binary::Binary,
    datetime::DateTime,
    document::Document,
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
};

/// Possible BSON value types.
#[derive(Clone, Debug, PartialEq)]
pub enum Bson {
    /// 64-bit binary floating point
    Double(f64),
    /// String
    String(String),
    /// Array
    Array(Array),
    /// Embedded document
    Document(Document),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(Regex),
    /// JavaScript code
    JavaScriptCode(String),
    /// JavaScript code with scope
    JavaScriptCodeWithScope(JavaScriptCodeWithScope),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(Binary),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (deprecated)
    ///
    /// This variant has no constructor shorthand; it is only produced by the
    /// wire decoder, and values read from bytes round-trip faithfully.
    Symbol(String),
    /// Undefined value (deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (deprecated)
    DbPointer(DbPointer),
}

/// Alias for `Vec<Bson>`.
pub type Array = Vec<Bson>;

/// Represents a BSON timestamp value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// The number of seconds since the Unix epoch.
    pub time: u32,

    /// An incrementing value to order timestamps with the same number of
    /// seconds in the `time` field.
    pub increment: u32,
}

/// Represents a BSON regular expression value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    /// The regex pattern to match.
    pub pattern: String,

    /// The options for the regex, stored in ascending alphabetical order.
    ///
    /// Options are identified by characters, which must be stored in
    /// alphabetical order. Valid options are 'i' for case insensitive
    /// matching, 'm' for multiline matching, 'x' for verbose mode, 'l' to
    /// make \w, \W, etc. locale dependent, 's' for dotall mode ('.' matches
    /// everything), and 'u' to make \w, \W, etc. match unicode. Unknown
    /// characters are preserved but not interpreted.
    pub options: String,
}

impl Regex {
    /// Create a new `Regex` from the given pattern and options, sorting the
    /// option characters. Neither string may contain a NUL byte.
    pub fn from_strings(pattern: impl Into<String>, options: impl AsRef<str>) -> Result<Self> {
        let pattern = pattern.into();
        let options = options.as_ref();
        if pattern.contains('\0') || options.contains('\0') {
            return Err(Error::invalid_argument(
                "regular expressions must not contain NUL bytes",
            ));
        }

        Ok(Self {
            pattern,
            options: sorted_options(options),
        })
    }
}

pub(crate) fn sorted_options(options: &str) -> String {
    let mut chars: Vec<_> = options.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

/// Represents a BSON code with scope value.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaScriptCodeWithScope {
    /// The JavaScript code.
    pub code: String,

    /// The scope document containing variable bindings.
    pub scope: Document,
}

/// Represents a DBPointer. (Deprecated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbPointer {
    /// The namespace of the collection the pointer refers to.
    pub namespace: String,

    /// The id of the document the pointer refers to.
    pub id: ObjectId,
}

impl Display for Bson {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bson::Double(d) => write!(fmt, "{}", d),
            Bson::String(s) => write!(fmt, "\"{}\"", s),
            Bson::Array(arr) => {
                fmt.write_str("[")?;

                let mut first = true;
                for bson in arr {
                    if !first {
                        fmt.write_str(", ")?;
                    }

                    write!(fmt, "{}", bson)?;
                    first = false;
                }

                fmt.write_str("]")
            }
            Bson::Document(doc) => write!(fmt, "{}", doc),
            Bson::Boolean(b) => write!(fmt, "{}", b),
            Bson::Null => write!(fmt, "null"),
            Bson::RegularExpression(re) => write!(fmt, "/{}/{}", re.pattern, re.options),
            Bson::JavaScriptCode(code) | Bson::Symbol(code) => fmt.write_str(code),
            Bson::JavaScriptCodeWithScope(code) => fmt.write_str(&code.code),
            Bson::Int32(i) => write!(fmt, "{}", i),
            Bson::Int64(i) => write!(fmt, "{}", i),
            Bson::Timestamp(ts) => write!(fmt, "Timestamp({}, {})", ts.time, ts.increment),
            Bson::Binary(b) => write!(fmt, "{}", b),
            Bson::ObjectId(id) => write!(fmt, "ObjectId(\"{}\")", id),
            Bson::DateTime(dt) => write!(fmt, "DateTime(\"{}\")", dt),
            Bson::Undefined => write!(fmt, "undefined"),
            Bson::MinKey => write!(fmt, "MinKey"),
            Bson::MaxKey => write!(fmt, "MaxKey"),
            Bson::DbPointer(p) => write!(fmt, "DbPointer({}, {})", p.namespace, p.id),
        }
    }
}

impl From<f32> for Bson {
    fn from(a: f32) -> Bson {
        Bson::Double(a.into())
    }
}

impl From<f64> for Bson {
    fn from(a: f64) -> Bson {
        Bson::Double(a)
    }
}

impl From<&str> for Bson {
    fn from(s: &str) -> Bson {
        Bson::String(s.to_owned())
    }
}

impl From<String> for Bson {
    fn from(s: String) -> Bson {
        Bson::String(s)
    }
}

impl From<&String> for Bson {
    fn from(s: &String) -> Bson {
        Bson::String(s.to_owned())
    }
}

impl From<bool> for Bson {
    fn from(b: bool) -> Bson {
        Bson::Boolean(b)
    }
}

impl From<i32> for Bson {
    fn from(i: i32) -> Bson {
        Bson::Int32(i)
    }
}

impl From<i64> for Bson {
    fn from(i: i64) -> Bson {
        Bson::Int64(i)
    }
}

impl From<Document> for Bson {
    fn from(doc: Document) -> Bson {
        Bson::Document(doc)
    }
}

impl From<Binary> for Bson {
    fn from(binary: Binary) -> Bson {
        Bson::Binary(binary)
    }
}

impl From<Regex> for Bson {
    fn from(regex: Regex) -> Bson {
        Bson::RegularExpression(regex)
    }
}

impl From<JavaScriptCodeWithScope> for Bson {
    fn from(code_with_scope: JavaScriptCodeWithScope) -> Bson {
        Bson::JavaScriptCodeWithScope(code_with_scope)
    }
}

impl From<Timestamp> for Bson {
    fn from(ts: Timestamp) -> Bson {
        Bson::Timestamp(ts)
    }
}

impl From<ObjectId> for Bson {
    fn from(id: ObjectId) -> Bson {
        Bson::ObjectId(id)
    }
}

impl From<DateTime> for Bson {
    fn from(dt: DateTime) -> Bson {
        Bson::DateTime(dt)
    }
}

impl From<DbPointer> for Bson {
    fn from(p: DbPointer) -> Bson {
        Bson::DbPointer(p)
    }
}

impl<T: Into<Bson>> From<Vec<T>> for Bson {
    fn from(v: Vec<T>) -> Bson {
        Bson::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Bson>> From<&[T]> for Bson {
    fn from(s: &[T]) -> Bson {
        Bson::Array(s.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Bson>> From<Option<T>> for Bson {
    fn from(a: Option<T>) -> Bson {
        match a {
            None => Bson::Null,
            Some(t) => t.into(),
        }
    }
}

impl Bson {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match self {
            Bson::Double(..) => ElementType::Double,
            Bson::String(..) => ElementType::String,
            Bson::Array(..) => ElementType::Array,
            Bson::Document(..) => ElementType::EmbeddedDocument,
            Bson::Boolean(..) => ElementType::Boolean,
            Bson::Null => ElementType::Null,
            Bson::RegularExpression(..) => ElementType::RegularExpression,
            Bson::JavaScriptCode(..) => ElementType::JavaScriptCode,
            Bson::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            Bson::Int32(..) => ElementType::Int32,
            Bson::Int64(..) => ElementType::Int64,
            Bson::Timestamp(..) => ElementType::Timestamp,
            Bson::Binary(..) => ElementType::Binary,
            Bson::ObjectId(..) => ElementType::ObjectId,
            Bson::DateTime(..) => ElementType::DateTime,
            Bson::Symbol(..) => ElementType::Symbol,
            Bson::Undefined => ElementType::Undefined,
            Bson::MaxKey => ElementType::MaxKey,
            Bson::MinKey => ElementType::MinKey,
            Bson::DbPointer(..) => ElementType::DbPointer,
        }
    }

    /// If this value is a `Bson::Double`, returns the associated `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Bson::String`, returns the associated `&str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    /// If this value is a `Bson::Array`, returns the associated [`Array`].
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Bson::Array`, returns the associated mutable [`Array`].
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Bson::Document`, returns the associated [`Document`].
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// If this value is a `Bson::Document`, returns the associated mutable [`Document`].
    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// If this value is a `Bson::Boolean`, returns the associated `bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Bson::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Bson::Int32`, returns the associated `i32`.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Bson::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Bson::Int64`, returns the associated `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Bson::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Bson::ObjectId`, returns the associated [`ObjectId`].
    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Bson::ObjectId(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Bson::DateTime`, returns the associated [`DateTime`].
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Bson::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Bson::Timestamp`, returns the associated [`Timestamp`].
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Bson::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Bson::Binary`, returns the associated [`Binary`].
    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Bson::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Bson::Null`, returns `()`.
    pub fn as_null(&self) -> Option<()> {
        match self {
            Bson::Null => Some(()),
            _ => None,
        }
    }

    /// Converts this value into its extended document form, used when a typed
    /// value has to travel through a plain key/value representation.
    pub(crate) fn to_extended_document(&self) -> Document {
        match self {
            Bson::RegularExpression(re) => {
                doc! {
                    "$regularExpression": {
                        "pattern": re.pattern.clone(),
                        "options": sorted_options(&re.options),
                    }
                }
            }
            Bson::JavaScriptCode(code) => {
                doc! { "$code": code.clone() }
            }
            Bson::JavaScriptCodeWithScope(code_w_scope) => {
                doc! {
                    "$code": code_w_scope.code.clone(),
                    "$scope": code_w_scope.scope.clone(),
                }
            }
            Bson::Timestamp(ts) => {
                doc! {
                    "$timestamp": {
                        "t": ts.time as i64,
                        "i": ts.increment as i64,
                    }
                }
            }
            Bson::Binary(binary) => {
                doc! {
                    "$binary": {
                        "base64": base64::encode(&binary.bytes),
                        "subType": hex::encode([u8::from(binary.subtype)]),
                    }
                }
            }
            Bson::ObjectId(id) => {
                doc! { "$oid": id.to_hex() }
            }
            Bson::DateTime(dt) => {
                doc! {
                    "$date": { "$numberLong": dt.timestamp_millis().to_string() }
                }
            }
            Bson::Symbol(s) => {
                doc! { "$symbol": s.clone() }
            }
            Bson::Undefined => {
                doc! { "$undefined": true }
            }
            Bson::MinKey => {
                doc! { "$minKey": 1 }
            }
            Bson::MaxKey => {
                doc! { "$maxKey": 1 }
            }
            Bson::DbPointer(p) => {
                doc! {
                    "$dbPointer": {
                        "$ref": p.namespace.clone(),
                        "$id": { "$oid": p.id.to_hex() },
                    }
                }
            }
            _ => panic!("Attempted conversion of invalid data type: {}", self),
        }
    }

    /// Interprets a document as a typed value if its keys form one of the
    /// `$`-prefixed extended wrappers, falling back to a plain embedded
    /// document otherwise.
    ///
    /// Candidate wrappers are tried in a fixed order so that documents
    /// satisfying more than one shape resolve deterministically.
    pub(crate) fn from_extended_document(doc: Document) -> Bson {
        if doc.len() == 1 {
            if let Some(body) = doc.get_document("$binary") {
                if let Some(binary) = binary_from_extended_body(body) {
                    return Bson::Binary(binary);
                }
            }

            if let Some(hex) = doc.get_str("$oid") {
                if let Ok(oid) = ObjectId::parse_str(hex) {
                    return Bson::ObjectId(oid);
                }
            }

            if let Some(body) = doc.get_document("$regularExpression") {
                if body.len() == 2 {
                    if let (Some(pattern), Some(options)) =
                        (body.get_str("pattern"), body.get_str("options"))
                    {
                        if let Ok(regex) = Regex::from_strings(pattern, options) {
                            return Bson::RegularExpression(regex);
                        }
                    }
                }
            }
        }

        if doc.len() == 2 {
            if let (Some(code), Some(scope)) = (doc.get_str("$code"), doc.get_document("$scope")) {
                return Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
                    code: code.to_owned(),
                    scope: scope.clone(),
                });
            }
        }

        if doc.len() == 1 {
            if let Some(i) = doc.get_str("$numberInt") {
                if let Ok(i) = i.parse::<i32>() {
                    return Bson::Int32(i);
                }
            }

            if let Some(i) = doc.get_str("$numberLong") {
                if let Ok(i) = i.parse::<i64>() {
                    return Bson::Int64(i);
                }
            }

            if let Some(d) = doc.get_str("$numberDouble") {
                match d {
                    "Infinity" => return Bson::Double(f64::INFINITY),
                    "-Infinity" => return Bson::Double(f64::NEG_INFINITY),
                    "NaN" => return Bson::Double(f64::NAN),
                    "-NaN" => return Bson::Double(-f64::NAN),
                    other => {
                        if let Ok(d) = other.parse::<f64>() {
                            return Bson::Double(d);
                        }
                    }
                }
            }

            if extended_key_is_one(&doc, "$minKey") {
                return Bson::MinKey;
            }

            if extended_key_is_one(&doc, "$maxKey") {
                return Bson::MaxKey;
            }

            if let Some(body) = doc.get_document("$timestamp") {
                if body.len() == 2 {
                    if let (Some(t), Some(i)) = (
                        body.get("t").and_then(int_as_u32),
                        body.get("i").and_then(int_as_u32),
                    ) {
                        return Bson::Timestamp(Timestamp {
                            time: t,
                            increment: i,
                        });
                    }
                }
            }

            if doc.get("$undefined") == Some(&Bson::Boolean(true)) {
                return Bson::Undefined;
            }

            if let Some(body) = doc.get_document("$dbPointer") {
                if body.len() == 2 {
                    // The $id wrapper may already have resolved to an
                    // ObjectId on the way in.
                    let id = match body.get("$id") {
                        Some(Bson::ObjectId(id)) => Some(*id),
                        Some(Bson::Document(id)) if id.len() == 1 => id
                            .get_str("$oid")
                            .and_then(|hex| ObjectId::parse_str(hex).ok()),
                        _ => None,
                    };

                    if let (Some(namespace), Some(id)) = (body.get_str("$ref"), id) {
                        return Bson::DbPointer(DbPointer {
                            namespace: namespace.to_owned(),
                            id,
                        });
                    }
                }
            }

            if let Some(code) = doc.get_str("$code") {
                return Bson::JavaScriptCode(code.to_owned());
            }

            if let Some(symbol) = doc.get_str("$symbol") {
                return Bson::Symbol(symbol.to_owned());
            }

            match doc.get("$date") {
                Some(Bson::Document(body)) => {
                    if body.len() == 1 {
                        if let Some(millis) = body.get_str("$numberLong") {
                            if let Ok(millis) = millis.parse::<i64>() {
                                return Bson::DateTime(DateTime::from_millis(millis));
                            }
                        }
                    }
                }
                // The inner $numberLong wrapper may already have resolved.
                Some(Bson::Int64(millis)) => {
                    return Bson::DateTime(DateTime::from_millis(*millis));
                }
                Some(Bson::String(s)) => {
                    if let Ok(dt) = DateTime::parse_rfc3339_str(s) {
                        return Bson::DateTime(dt);
                    }
                }
                _ => {}
            }
        }

        Bson::Document(doc)
    }
}

fn binary_from_extended_body(body: &Document) -> Option<Binary> {
    if body.len() != 2 {
        return None;
    }

    let bytes = base64::decode(body.get_str("base64")?).ok()?;
    let subtype = hex::decode(body.get_str("subType")?).ok()?;
    if subtype.len() != 1 {
        return None;
    }

    Some(Binary {
        subtype: BinarySubtype::from_u8(subtype[0])?,
        bytes,
    })
}

fn extended_key_is_one(doc: &Document, key: &str) -> bool {
    matches!(doc.get(key), Some(Bson::Int32(1)) | Some(Bson::Int64(1)))
}

fn int_as_u32(value: &Bson) -> Option<u32> {
    match *value {
        Bson::Int32(i) => u32::try_from(i).ok(),
        Bson::Int64(i) => u32::try_from(i).ok(),
        _ => None,
    }
}
