//! A BSON document represented as an ordered list of key/value pairs.

use std::{
    fmt::{self, Debug, Display, Formatter},
    io::{Read, Write},
    iter::{Extend, FromIterator, IntoIterator},
};

use crate::{
    binary::Binary,
    bson::{Array, Bson, Timestamp},
    datetime::DateTime,
    de,
    error::{Error, Result},
    oid::ObjectId,
    ser,
};

/// A BSON document, i.e. an ordered sequence of key/value pairs.
///
/// Keys may repeat: BSON permits the same key to appear more than once in a
/// document, and decoding preserves every occurrence in order. The accessors
/// that take a key ([`get`](Document::get), [`insert`](Document::insert),
/// [`remove`](Document::remove)) operate on the first occurrence.
///
/// A document caches its serialized byte form; any mutation invalidates the
/// cache and the bytes are rebuilt on the next serialization.
#[derive(Clone)]
pub struct Document {
    entries: Vec<(String, Bson)>,

    /// The serialized form of `entries`, populated lazily.
    cached_bytes: Option<Vec<u8>>,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str("{")?;

        let mut first = true;
        for (k, v) in self {
            if first {
                first = false;
                fmt.write_str(" ")?;
            } else {
                fmt.write_str(", ")?;
            }

            write!(fmt, "{}: {}", k, v)?;
        }

        write!(fmt, "{}}}", if !first { " " } else { "" })
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// An owning iterator over Document entries.
pub struct IntoIter {
    inner: std::vec::IntoIter<(String, Bson)>,
}

/// An iterator over Document entries.
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (String, Bson)>,
}

/// An iterator over a Document's keys.
pub struct Keys<'a> {
    inner: Iter<'a>,
}

/// An iterator over a Document's values.
pub struct Values<'a> {
    inner: Iter<'a>,
}

impl Iterator for IntoIter {
    type Item = (String, Bson);

    fn next(&mut self) -> Option<(String, Bson)> {
        self.inner.next()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a String, &'a Bson);

    fn next(&mut self) -> Option<(&'a String, &'a Bson)> {
        self.inner.next().map(|(k, v)| (k, v))
    }
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a String;

    fn next(&mut self) -> Option<&'a String> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a Bson;

    fn next(&mut self) -> Option<&'a Bson> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl IntoIterator for Document {
    type Item = (String, Bson);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Bson);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

impl FromIterator<(String, Bson)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Bson)>>(iter: T) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl Extend<(String, Bson)> for Document {
    fn extend<T: IntoIterator<Item = (String, Bson)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Document {
    /// Creates a new empty Document.
    pub fn new() -> Document {
        Document {
            entries: Vec::new(),
            cached_bytes: None,
        }
    }

    /// Gets an iterator over the entries of the document.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Clears the document, removing all values.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cached_bytes = None;
    }

    /// Returns a reference to the value corresponding to the first occurrence
    /// of the key.
    pub fn get(&self, key: &str) -> Option<&Bson> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Gets a mutable reference to the value corresponding to the first
    /// occurrence of the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Bson> {
        // The caller can write through the returned reference.
        self.cached_bytes = None;
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get a floating point value for this key if it exists and has the
    /// correct type.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    /// Get a string slice for this key if it exists and has the correct type.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Get a reference to an array for this key if it exists and has the
    /// correct type.
    pub fn get_array(&self, key: &str) -> Option<&Array> {
        self.get(key)?.as_array()
    }

    /// Get a reference to an embedded document for this key if it exists and
    /// has the correct type.
    pub fn get_document(&self, key: &str) -> Option<&Document> {
        self.get(key)?.as_document()
    }

    /// Get a bool value for this key if it exists and has the correct type.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    /// Returns whether this key has a null value.
    pub fn is_null(&self, key: &str) -> bool {
        self.get(key) == Some(&Bson::Null)
    }

    /// Get an i32 value for this key if it exists and has the correct type.
    pub fn get_i32(&self, key: &str) -> Option<i32> {
        self.get(key)?.as_i32()
    }

    /// Get an i64 value for this key if it exists and has the correct type.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    /// Get a timestamp value for this key if it exists and has the correct type.
    pub fn get_timestamp(&self, key: &str) -> Option<Timestamp> {
        self.get(key)?.as_timestamp()
    }

    /// Get a reference to a binary value for this key if it exists and has
    /// the correct type.
    pub fn get_binary(&self, key: &str) -> Option<&Binary> {
        self.get(key)?.as_binary()
    }

    /// Get an object id value for this key if it exists and has the correct type.
    pub fn get_object_id(&self, key: &str) -> Option<ObjectId> {
        self.get(key)?.as_object_id()
    }

    /// Get a datetime value for this key if it exists and has the correct type.
    pub fn get_datetime(&self, key: &str) -> Option<DateTime> {
        self.get(key)?.as_datetime()
    }

    /// Returns true if the document contains an entry with the specified key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Gets a collection of all keys in the document, in insertion order.
    pub fn keys(&self) -> Keys<'_> {
        Keys { inner: self.iter() }
    }

    /// Gets a collection of all values in the document, in insertion order.
    pub fn values(&self) -> Values<'_> {
        Values { inner: self.iter() }
    }

    /// Returns the number of entries in the document.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets the value of the entry with the given key: if the key is already
    /// present, the first occurrence is replaced in place and its old value
    /// returned; otherwise the entry is appended. Accepts any type that can be
    /// converted into [`Bson`].
    pub fn insert<KT: Into<String>, BT: Into<Bson>>(&mut self, key: KT, val: BT) -> Option<Bson> {
        self.cached_bytes = None;

        let key = key.into();
        let val = val.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, val)),
            None => {
                self.entries.push((key, val));
                None
            }
        }
    }

    /// Removes the first occurrence of the key from the document, returning
    /// its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Bson> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        self.cached_bytes = None;
        Some(self.entries.remove(index).1)
    }

    /// Appends an entry without looking for an existing occurrence of the key.
    ///
    /// This is how the decoder preserves duplicate keys.
    pub(crate) fn push(&mut self, key: String, val: Bson) {
        self.cached_bytes = None;
        self.entries.push((key, val));
    }

    /// The serialized form of this document. The bytes are cached; a document
    /// that has not been mutated since the last call returns the cache.
    pub fn bytes(&mut self) -> Result<&[u8]> {
        if self.cached_bytes.is_none() {
            self.cached_bytes = Some(ser::document_to_vec(self)?);
        }

        match self.cached_bytes {
            Some(ref bytes) => Ok(bytes),
            None => Err(Error::internal("document byte cache not populated")),
        }
    }

    /// Serializes this document to a freshly allocated byte vector.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        match self.cached_bytes {
            Some(ref bytes) => Ok(bytes.clone()),
            None => ser::document_to_vec(self),
        }
    }

    /// Attempts to serialize the `Document` into a byte stream.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let buf = self.to_vec()?;
        writer.write_all(&buf)?;
        Ok(())
    }

    /// Attempts to decode a `Document` from raw BSON bytes. The declared
    /// length of the document must match the length of the byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
        de::decode_document_bytes(bytes)
    }

    /// Attempts to decode a `Document` from a byte stream, consuming exactly
    /// the document's declared length.
    pub fn from_reader<R: Read>(reader: R) -> Result<Document> {
        de::decode_document_reader(reader)
    }
}
