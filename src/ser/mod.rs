//! Serializer

mod serde;

pub use self::serde::Serializer;

use ::serde::Serialize;

use crate::{
    bson::Bson,
    document::Document,
    error::{Error, Result},
};

/// Encode a `T` Serializable into a [`Bson`] value.
pub fn to_bson<T>(value: &T) -> Result<Bson>
where
    T: Serialize + ?Sized,
{
    value.serialize(Serializer::new())
}

/// Encode a `T` Serializable into a BSON [`Document`].
pub fn to_document<T>(value: &T) -> Result<Document>
where
    T: Serialize + ?Sized,
{
    match to_bson(value)? {
        Bson::Document(doc) => Ok(doc),
        bson => Err(Error::invalid_argument(format!(
            "value could not be serialized to a document, got {:?} instead",
            bson.element_type()
        ))),
    }
}

/// Encode a `T` Serializable as a BSON document byte vector.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize,
{
    to_document(value)?.to_vec()
}

pub(crate) fn document_to_vec(doc: &Document) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_document(&mut buf, doc)?;
    Ok(buf)
}

#[inline]
fn write_i32(buf: &mut Vec<u8>, val: i32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

#[inline]
fn write_i64(buf: &mut Vec<u8>, val: i64) {
    buf.extend_from_slice(&val.to_le_bytes());
}

#[inline]
fn write_u32(buf: &mut Vec<u8>, val: u32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

#[inline]
fn write_f64(buf: &mut Vec<u8>, val: f64) {
    buf.extend_from_slice(&val.to_le_bytes());
}

fn write_cstring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(Error::invalid_argument(format!(
            "c-strings cannot contain a NUL byte: {:?}",
            s
        )));
    }

    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_i32(buf, s.len() as i32 + 1);
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

/// Frame a fully built element body: total length first, trailing NUL last.
fn write_framed(buf: &mut Vec<u8>, body: Vec<u8>) {
    write_i32(buf, (body.len() + 4 + 1) as i32);
    buf.extend_from_slice(&body);
    buf.push(0);
}

fn write_document(buf: &mut Vec<u8>, doc: &Document) -> Result<()> {
    let mut body = Vec::new();
    for (key, val) in doc {
        encode_bson(&mut body, key, val)?;
    }

    write_framed(buf, body);
    Ok(())
}

fn write_array(buf: &mut Vec<u8>, arr: &[Bson]) -> Result<()> {
    let mut body = Vec::new();
    for (index, val) in arr.iter().enumerate() {
        encode_bson(&mut body, &index.to_string(), val)?;
    }

    write_framed(buf, body);
    Ok(())
}

fn encode_bson(buf: &mut Vec<u8>, key: &str, val: &Bson) -> Result<()> {
    buf.push(val.element_type() as u8);
    write_cstring(buf, key)?;

    match val {
        Bson::Double(v) => write_f64(buf, *v),
        Bson::String(v) => write_string(buf, v),
        Bson::Array(v) => write_array(buf, v)?,
        Bson::Document(v) => write_document(buf, v)?,
        Bson::Boolean(v) => buf.push(u8::from(*v)),
        Bson::Null | Bson::Undefined | Bson::MinKey | Bson::MaxKey => {}
        Bson::RegularExpression(re) => {
            write_cstring(buf, &re.pattern)?;
            write_cstring(buf, &re.options)?;
        }
        Bson::JavaScriptCode(code) => write_string(buf, code),
        Bson::JavaScriptCodeWithScope(code_w_scope) => {
            let mut body = Vec::new();
            write_string(&mut body, &code_w_scope.code);
            write_document(&mut body, &code_w_scope.scope)?;

            write_i32(buf, body.len() as i32 + 4);
            buf.extend_from_slice(&body);
        }
        Bson::Int32(v) => write_i32(buf, *v),
        Bson::Int64(v) => write_i64(buf, *v),
        Bson::Timestamp(ts) => {
            write_u32(buf, ts.increment);
            write_u32(buf, ts.time);
        }
        Bson::Binary(binary) => {
            write_i32(buf, binary.bytes.len() as i32);
            buf.push(u8::from(binary.subtype));
            buf.extend_from_slice(&binary.bytes);
        }
        Bson::ObjectId(id) => buf.extend_from_slice(&id.bytes()),
        Bson::DateTime(dt) => write_i64(buf, dt.timestamp_millis()),
        Bson::Symbol(s) => write_string(buf, s),
        Bson::DbPointer(p) => {
            write_string(buf, &p.namespace);
            buf.extend_from_slice(&p.id.bytes());
        }
    }

    Ok(())
}
