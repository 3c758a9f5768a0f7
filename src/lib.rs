#![doc = include_str!("../README.md")]
#![allow(clippy::cognitive_complexity, clippy::derive_partial_eq_without_eq)]

#[doc(inline)]
pub use self::{
    binary::Binary,
    bson::{Array, Bson, DbPointer, JavaScriptCodeWithScope, Regex, Timestamp},
    datetime::DateTime,
    de::{from_bson, from_document, from_reader, from_slice, Deserializer, Elements},
    document::Document,
    error::{Error, ErrorKind, Result},
    oid::ObjectId,
    ser::{to_bson, to_document, to_vec, Serializer},
};

#[macro_use]
mod macros;
mod base64;
pub mod binary;
mod bson;
pub mod datetime;
pub mod de;
pub mod document;
pub mod error;
pub mod oid;
pub mod ser;
pub mod spec;
