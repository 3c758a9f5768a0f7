//! Module containing functionality related to BSON ObjectIds.
//! For more information, see the documentation for the [`ObjectId`] type.

use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
    time::SystemTime,
};

use once_cell::sync::Lazy;
use rand::{random, rng, Rng};

use crate::error::{Error, Result};

const TIMESTAMP_SIZE: usize = 4;
const PROCESS_UNIQUE_SIZE: usize = 5;
const COUNTER_SIZE: usize = 3;

const TIMESTAMP_OFFSET: usize = 0;
const PROCESS_UNIQUE_OFFSET: usize = TIMESTAMP_OFFSET + TIMESTAMP_SIZE;
const COUNTER_OFFSET: usize = PROCESS_UNIQUE_OFFSET + PROCESS_UNIQUE_SIZE;

const MAX_U24: u32 = 0xFF_FFFF;

static OID_COUNTER: Lazy<AtomicU32> =
    Lazy::new(|| AtomicU32::new(rng().random_range(0..=MAX_U24)));

/// A wrapper around a raw 12-byte ObjectId.
///
/// The layout is 4 bytes of big-endian seconds since the epoch, 5 random
/// bytes fixed for the life of the process, and a 3-byte big-endian counter
/// that wraps to zero after `0xFFFFFF`.
///
/// When serialized via the record bridge, this type produces a BSON ObjectId;
/// in non-BSON formats it takes the shape of its extended JSON representation,
/// `{ "$oid": "<24-char hex>" }`.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ObjectId {
    id: [u8; 12],
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self { id: bytes }
    }
}

impl ObjectId {
    /// Generates a new [`ObjectId`], represented in bytes.
    /// See the [docs](http://www.mongodb.com/docs/manual/reference/object-id/)
    /// for more information.
    pub fn new() -> Self {
        Self::from_parts(
            Self::gen_timestamp(),
            Self::process_unique(),
            Self::gen_count(),
        )
    }

    /// Constructs a new ObjectId wrapper around the raw byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> ObjectId {
        ObjectId { id: bytes }
    }

    /// Construct an `ObjectId` from its parts.
    pub fn from_parts(seconds_since_epoch: u32, process_unique: [u8; 5], counter: [u8; 3]) -> Self {
        let mut bytes = [0; 12];

        bytes[TIMESTAMP_OFFSET..(TIMESTAMP_OFFSET + TIMESTAMP_SIZE)]
            .clone_from_slice(&u32::to_be_bytes(seconds_since_epoch));
        bytes[PROCESS_UNIQUE_OFFSET..(PROCESS_UNIQUE_OFFSET + PROCESS_UNIQUE_SIZE)]
            .clone_from_slice(&process_unique);
        bytes[COUNTER_OFFSET..(COUNTER_OFFSET + COUNTER_SIZE)].clone_from_slice(&counter);

        Self::from_bytes(bytes)
    }

    /// Creates an ObjectId using a 12-byte (24-char) hexadecimal string.
    pub fn parse_str(s: impl AsRef<str>) -> Result<ObjectId> {
        let s = s.as_ref();

        if s.len() != 24 {
            return Err(Error::invalid_argument(format!(
                "expected a 24-character hex string, got {} characters",
                s.len()
            )));
        }

        let bytes: Vec<u8> = hex::decode(s.as_bytes())
            .map_err(|e| Error::invalid_argument(format!("invalid hex string \"{}\": {}", s, e)))?;

        let mut byte_array: [u8; 12] = [0; 12];
        byte_array[..].copy_from_slice(&bytes[..]);
        Ok(ObjectId::from_bytes(byte_array))
    }

    /// Retrieves the timestamp from an [`ObjectId`].
    pub fn timestamp(&self) -> crate::DateTime {
        let mut buf = [0; 4];
        buf.copy_from_slice(&self.id[0..4]);
        let seconds_since_epoch = u32::from_be_bytes(buf);

        // This doesn't overflow since u32::MAX * 1000 < i64::MAX
        crate::DateTime::from_millis(seconds_since_epoch as i64 * 1000)
    }

    /// Returns the raw byte representation of an ObjectId.
    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// Convert this [`ObjectId`] to its hex string representation.
    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }

    /// Generates a new timestamp representing the current seconds since epoch.
    fn gen_timestamp() -> u32 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0)
    }

    /// The 5 random bytes identifying this process, drawn once.
    fn process_unique() -> [u8; 5] {
        static BUF: Lazy<[u8; 5]> = Lazy::new(random);

        *BUF
    }

    /// Gets an incremental 3-byte count, represented in big endian.
    fn gen_count() -> [u8; 3] {
        // AtomicU32 wraps at 2^32, which is divisible by 2^24, so the masked
        // sequence stays continuous across the intrinsic overflow.
        let count = OID_COUNTER.fetch_add(1, Ordering::SeqCst) & MAX_U24;

        let buf = count.to_be_bytes();
        [buf[1], buf[2], buf[3]]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}
