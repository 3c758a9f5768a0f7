//! Deserializer

mod serde;

pub use self::serde::Deserializer;

use std::io::Read;

use ::serde::de::DeserializeOwned;

use crate::{
    binary::Binary,
    bson::{sorted_options, Bson, DbPointer, JavaScriptCodeWithScope, Regex, Timestamp},
    datetime::DateTime,
    document::Document,
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
};

pub(crate) const MIN_BSON_DOCUMENT_SIZE: i32 = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MAX_BSON_SIZE: i32 = i32::MAX;

/// Deserialize a `T` from the provided [`Bson`] value.
pub fn from_bson<T>(bson: Bson) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(Deserializer::new(bson))
}

/// Deserialize a `T` from the provided [`Document`].
pub fn from_document<T>(doc: Document) -> Result<T>
where
    T: DeserializeOwned,
{
    from_bson(Bson::Document(doc))
}

/// Deserialize an instance of type `T` from a slice of BSON bytes.
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_document(Document::from_bytes(bytes)?)
}

/// Deserialize an instance of type `T` from an I/O stream of BSON.
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    T: DeserializeOwned,
    R: Read,
{
    from_document(Document::from_reader(reader)?)
}

/// A head-consuming view over a byte buffer.
///
/// Every operation checks the remaining length before slicing and fails with
/// an invalid-BSON error on truncated or malformed input; no operation reads
/// beyond the buffer.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Reader { buf }
    }

    /// Consume and return the next `n` bytes.
    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(Error::invalid_bson(format!(
                "expected {} more bytes, but only {} remain",
                n,
                self.buf.len()
            )));
        }

        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.fixed::<4>()?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.fixed::<4>()?))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.fixed::<8>()?))
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.fixed::<8>()?))
    }

    /// Read the next four bytes as a little-endian `i32` without consuming
    /// them.
    fn peek_i32(&self) -> Result<i32> {
        let bytes = self.buf.get(..4).ok_or_else(|| {
            Error::invalid_bson(format!(
                "expected 4 more bytes, but only {} remain",
                self.buf.len()
            ))
        })?;

        // Unreachable: the slice is 4 bytes long.
        let bytes = bytes.try_into().map_err(|e| Error::internal(e))?;
        Ok(i32::from_le_bytes(bytes))
    }

    /// Read a UTF-8 string terminated by (and not containing) a NUL byte,
    /// consuming the terminator.
    pub(crate) fn read_cstring(&mut self) -> Result<&'a str> {
        let end = self
            .buf
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::invalid_bson("c-string is missing a null terminator"))?;

        let s = validate_utf8(self.take(end)?)?;
        self.read_u8()?; // the terminator
        Ok(s)
    }

    /// Read a length-prefixed UTF-8 string: the prefix counts the bytes that
    /// follow it, including a mandatory trailing NUL.
    pub(crate) fn read_string(&mut self) -> Result<&'a str> {
        let length = self.read_i32()?;
        if length < 1 {
            return Err(Error::invalid_bson(format!(
                "invalid string length: {}",
                length
            )));
        }

        let bytes = self.take(length as usize)?;
        match bytes.split_last() {
            Some((0, rest)) => validate_utf8(rest),
            _ => Err(Error::invalid_bson("string is missing a null terminator")),
        }
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        // Unreachable: take returns exactly N bytes.
        self.take(N)?.try_into().map_err(|e| Error::internal(e))
    }
}

fn validate_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::invalid_bson(format!("invalid UTF-8: {}", e)))
}

fn read_bool(reader: &mut Reader<'_>) -> Result<bool> {
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        b => Err(Error::invalid_bson(format!(
            "invalid boolean value: {:#04x}",
            b
        ))),
    }
}

/// An iterator over the elements of a serialized document, yielding one
/// key/value pair per step.
///
/// The iterator is single-pass: it cannot be restarted, and the first error
/// ends the iteration.
pub struct Elements<'a> {
    reader: Reader<'a>,
    valid: bool,
}

impl<'a> Elements<'a> {
    /// Positions an iterator past the leading length prefix of `bytes`,
    /// validating the document framing.
    pub fn new(bytes: &'a [u8]) -> Result<Elements<'a>> {
        let mut reader = Reader::new(bytes);

        let length = reader.read_i32()?;
        if length < MIN_BSON_DOCUMENT_SIZE {
            return Err(Error::invalid_bson(format!(
                "document too small: {} bytes",
                length
            )));
        }
        if length as usize != bytes.len() {
            return Err(Error::invalid_bson(format!(
                "document declares {} bytes, buffer holds {}",
                length,
                bytes.len()
            )));
        }
        if bytes[bytes.len() - 1] != 0 {
            return Err(Error::invalid_bson("document not null terminated"));
        }

        Ok(Elements {
            reader,
            valid: true,
        })
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = Result<(&'a str, Bson)>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.valid {
            return None;
        }

        let tag = match self.reader.read_u8() {
            Ok(tag) => tag,
            Err(e) => {
                self.valid = false;
                return Some(Err(e));
            }
        };

        // The end-of-document marker. A marker before the final byte still
        // ends iteration; the document's declared length has already framed
        // how many bytes this element list occupies in its parent.
        if tag == 0 {
            self.valid = false;
            return None;
        }

        let key = match self.reader.read_cstring() {
            Ok(key) => key,
            Err(e) => {
                self.valid = false;
                return Some(Err(e));
            }
        };

        let result = ElementType::from(tag)
            .ok_or_else(|| Error::invalid_bson(format!("unrecognized BSON type {}", tag)))
            .and_then(|element_type| decode_bson(&mut self.reader, element_type));

        match result {
            Ok(value) => Some(Ok((key, value))),
            Err(e) => {
                self.valid = false;
                Some(Err(e.with_key(key)))
            }
        }
    }
}

pub(crate) fn decode_document_bytes(bytes: &[u8]) -> Result<Document> {
    let mut doc = Document::new();

    for entry in Elements::new(bytes)? {
        let (key, value) = entry?;
        // Duplicate keys are preserved as-is.
        doc.push(key.to_owned(), value);
    }

    Ok(doc)
}

pub(crate) fn decode_document_reader<R: Read>(mut reader: R) -> Result<Document> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;

    let length = i32::from_le_bytes(len_bytes);
    if !(MIN_BSON_DOCUMENT_SIZE..=MAX_BSON_SIZE).contains(&length) {
        return Err(Error::invalid_bson(format!(
            "document length {} out of bounds",
            length
        )));
    }

    let mut bytes = Vec::with_capacity(length as usize);
    bytes.extend_from_slice(&len_bytes);
    reader
        .take(length as u64 - 4)
        .read_to_end(&mut bytes)
        .map_err(Error::from)?;

    if bytes.len() != length as usize {
        return Err(Error::invalid_bson(format!(
            "expected a document of {} bytes, stream ended after {}",
            length,
            bytes.len()
        )));
    }

    decode_document_bytes(&bytes)
}

/// Consume a document's framed bytes (length prefix included) from the
/// reader, advancing it by exactly the declared length.
fn take_framed<'a>(reader: &mut Reader<'a>) -> Result<&'a [u8]> {
    let length = reader.peek_i32()?;
    if length < MIN_BSON_DOCUMENT_SIZE {
        return Err(Error::invalid_bson(format!(
            "document too small: {} bytes",
            length
        )));
    }

    reader.take(length as usize)
}

fn decode_embedded_document(reader: &mut Reader<'_>) -> Result<Document> {
    decode_document_bytes(take_framed(reader)?)
}

fn decode_array(reader: &mut Reader<'_>) -> Result<Vec<Bson>> {
    let mut array = Vec::new();

    for entry in Elements::new(take_framed(reader)?)? {
        // Element keys are ignored: positions come from iteration order, so
        // degenerate encodings with missing or out-of-order keys still decode.
        let (_key, value) = entry?;
        array.push(value);
    }

    Ok(array)
}

fn decode_binary(reader: &mut Reader<'_>) -> Result<Binary> {
    let length = reader.read_i32()?;
    if length < 0 {
        return Err(Error::invalid_bson(format!(
            "binary length {} is negative",
            length
        )));
    }

    let subtype_byte = reader.read_u8()?;
    let subtype = BinarySubtype::from_u8(subtype_byte).ok_or_else(|| {
        Error::invalid_bson(format!("unrecognized binary subtype {:#04x}", subtype_byte))
    })?;

    Ok(Binary {
        subtype,
        bytes: reader.take(length as usize)?.to_vec(),
    })
}

fn decode_object_id(reader: &mut Reader<'_>) -> Result<ObjectId> {
    let bytes = reader.take(12)?;

    // Unreachable: take returns exactly 12 bytes.
    let bytes: [u8; 12] = bytes.try_into().map_err(|e| Error::internal(e))?;
    Ok(ObjectId::from_bytes(bytes))
}

pub(crate) fn decode_bson(reader: &mut Reader<'_>, tag: ElementType) -> Result<Bson> {
    Ok(match tag {
        ElementType::Double => Bson::Double(reader.read_f64()?),
        ElementType::String => Bson::String(reader.read_string()?.to_owned()),
        ElementType::EmbeddedDocument => Bson::Document(decode_embedded_document(reader)?),
        ElementType::Array => Bson::Array(decode_array(reader)?),
        ElementType::Binary => Bson::Binary(decode_binary(reader)?),
        ElementType::Undefined => Bson::Undefined,
        ElementType::ObjectId => Bson::ObjectId(decode_object_id(reader)?),
        ElementType::Boolean => Bson::Boolean(read_bool(reader)?),
        ElementType::DateTime => Bson::DateTime(DateTime::from_millis(reader.read_i64()?)),
        ElementType::Null => Bson::Null,
        ElementType::RegularExpression => {
            let pattern = reader.read_cstring()?.to_owned();
            let options = reader.read_cstring()?;
            Bson::RegularExpression(Regex {
                pattern,
                options: sorted_options(options),
            })
        }
        ElementType::DbPointer => Bson::DbPointer(DbPointer {
            namespace: reader.read_string()?.to_owned(),
            id: decode_object_id(reader)?,
        }),
        ElementType::JavaScriptCode => Bson::JavaScriptCode(reader.read_string()?.to_owned()),
        ElementType::Symbol => Bson::Symbol(reader.read_string()?.to_owned()),
        ElementType::JavaScriptCodeWithScope => {
            // The leading total is informational: the code string and the
            // scope document are each self-delimiting.
            let _total = reader.read_i32()?;
            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
                code: reader.read_string()?.to_owned(),
                scope: decode_embedded_document(reader)?,
            })
        }
        ElementType::Int32 => Bson::Int32(reader.read_i32()?),
        ElementType::Timestamp => {
            let increment = reader.read_u32()?;
            let time = reader.read_u32()?;
            Bson::Timestamp(Timestamp { time, increment })
        }
        ElementType::Int64 => Bson::Int64(reader.read_i64()?),
        ElementType::Decimal128 => {
            return Err(Error::unsupported_type(
                "decimal128 values are not representable by this crate",
            ));
        }
        ElementType::MinKey => Bson::MinKey,
        ElementType::MaxKey => Bson::MaxKey,
    })
}
