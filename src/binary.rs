//! Module containing functionality related to BSON binary values.

use std::fmt::{self, Display};

use crate::{
    base64,
    error::{Error, Result},
    spec::BinarySubtype,
};

/// Represents a BSON binary value.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#x}, {})",
            u8::from(self.subtype),
            base64::encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a [`Binary`] with the given bytes and subtype, enforcing the
    /// subtype's length invariants: UUID subtypes require exactly 16 bytes.
    pub fn new(bytes: impl Into<Vec<u8>>, subtype: BinarySubtype) -> Result<Self> {
        let bytes = bytes.into();
        if matches!(subtype, BinarySubtype::Uuid | BinarySubtype::UuidOld) && bytes.len() != 16 {
            return Err(Error::invalid_argument(format!(
                "UUID binary values must contain exactly 16 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Binary { subtype, bytes })
    }

    /// Creates a [`Binary`] from a base64 string and optional [`BinarySubtype`]. If the
    /// `subtype` argument is [`None`], the [`Binary`] constructed will default to
    /// [`BinarySubtype::Generic`].
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = base64::decode(input.as_ref())
            .map_err(|e| Error::invalid_argument(format!("invalid base64: {}", e)))?;
        let subtype = subtype.into().unwrap_or(BinarySubtype::Generic);
        Binary::new(bytes, subtype)
    }

    /// Creates a [`Binary`] holding the bytes of the given UUID with subtype
    /// [`BinarySubtype::Uuid`].
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        }
    }

    /// Interprets this binary value as a UUID. Errors if the subtype is not
    /// [`BinarySubtype::Uuid`].
    pub fn to_uuid(&self) -> Result<uuid::Uuid> {
        if self.subtype != BinarySubtype::Uuid {
            return Err(Error::invalid_argument(format!(
                "expected binary subtype 4, got {:?}",
                self.subtype
            )));
        }

        uuid::Uuid::from_slice(&self.bytes).map_err(|e| {
            Error::invalid_argument(format!("binary value is not a valid UUID: {}", e))
        })
    }
}
