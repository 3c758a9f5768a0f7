//! Module containing functionality related to BSON DateTimes.

use std::{
    fmt::{self, Display},
    time::{Duration, SystemTime},
};

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::{Error, Result};

/// Struct representing a BSON datetime.
/// Note: BSON datetimes have millisecond precision.
///
/// This type serializes to and deserializes from a BSON datetime through the
/// record bridge; in non-BSON formats it takes the shape of its extended JSON
/// representation, `{ "$date": { "$numberLong": "<millis>" } }`.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub struct DateTime(i64);

impl DateTime {
    /// The latest possible date that can be represented in BSON.
    pub const MAX: Self = Self::from_millis(i64::MAX);

    /// The earliest possible date that can be represented in BSON.
    pub const MIN: Self = Self::from_millis(i64::MIN);

    /// Makes a new [`DateTime`] from the number of non-leap milliseconds since
    /// January 1, 1970 0:00:00 UTC (aka "UNIX timestamp").
    pub const fn from_millis(date: i64) -> Self {
        Self(date)
    }

    /// Returns a [`DateTime`] which corresponds to the current date and time.
    pub fn now() -> DateTime {
        Self::from_system_time(SystemTime::now())
    }

    /// Convert the given [`std::time::SystemTime`] to a [`DateTime`].
    ///
    /// If the provided time is too far in the future or too far in the past to
    /// be represented by a BSON datetime, either [`DateTime::MAX`] or
    /// [`DateTime::MIN`] will be returned, whichever is closer.
    pub fn from_system_time(st: SystemTime) -> Self {
        match st.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(d) if d.as_millis() <= i64::MAX as u128 => Self::from_millis(d.as_millis() as i64),
            Ok(_) => Self::MAX,
            Err(e) => {
                let millis = e.duration().as_millis();
                if millis > i64::MAX as u128 {
                    Self::MIN
                } else {
                    Self::from_millis(-(millis as i64))
                }
            }
        }
    }

    /// Convert this [`DateTime`] to a [`std::time::SystemTime`].
    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            SystemTime::UNIX_EPOCH + Duration::from_millis(self.0 as u64)
        } else {
            SystemTime::UNIX_EPOCH - Duration::from_millis(self.0.unsigned_abs())
        }
    }

    /// Returns the number of non-leap milliseconds since January 1, 1970 UTC.
    pub const fn timestamp_millis(self) -> i64 {
        self.0
    }

    /// Convert this [`DateTime`] to an RFC 3339 formatted string.
    pub fn try_to_rfc3339_string(self) -> Result<String> {
        self.to_time_0_3()
            .format(&Rfc3339)
            .map_err(|e| Error::invalid_argument(format!("cannot format DateTime as RFC 3339: {}", e)))
    }

    /// Convert the given RFC 3339 formatted string to a [`DateTime`],
    /// truncating sub-millisecond precision.
    pub fn parse_rfc3339_str(s: impl AsRef<str>) -> Result<Self> {
        let odt = OffsetDateTime::parse(s.as_ref(), &Rfc3339)
            .map_err(|e| Error::invalid_argument(format!("cannot parse RFC 3339 datetime: {}", e)))?;
        Ok(Self::from_time_0_3(odt))
    }

    /// Convert the given [`time::OffsetDateTime`] into a [`DateTime`],
    /// truncating sub-millisecond precision.
    pub fn from_time_0_3(dt: OffsetDateTime) -> Self {
        Self::from_millis((dt.unix_timestamp_nanos() / 1_000_000) as i64)
    }

    /// Convert this [`DateTime`] to a [`time::OffsetDateTime`].
    ///
    /// Datetimes outside the range supported by [`time`] saturate to that
    /// range's boundaries.
    pub fn to_time_0_3(self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp_nanos(self.0 as i128 * 1_000_000).unwrap_or_else(|_| {
            if self.0 < 0 {
                time::PrimitiveDateTime::MIN.assume_utc()
            } else {
                time::PrimitiveDateTime::MAX.assume_utc()
            }
        })
    }

    /// Whether this datetime can be formatted as an RFC 3339 string, i.e. it
    /// falls within years 1970 through 9999.
    pub(crate) fn is_rfc3339_representable(self) -> bool {
        const MAX_RFC3339_MILLIS: i64 = 253_402_300_799_999; // 9999-12-31T23:59:59.999Z

        (0..=MAX_RFC3339_MILLIS).contains(&self.0)
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut tup = f.debug_tuple("DateTime");
        match self.try_to_rfc3339_string() {
            Ok(s) => tup.field(&s),
            _ => tup.field(&self.0),
        };
        tup.finish()
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.try_to_rfc3339_string() {
            Ok(s) => write!(f, "{}", s),
            _ => write!(f, "{} ms", self.0),
        }
    }
}

impl From<SystemTime> for DateTime {
    fn from(st: SystemTime) -> Self {
        Self::from_system_time(st)
    }
}

impl From<DateTime> for SystemTime {
    fn from(dt: DateTime) -> Self {
        dt.to_system_time()
    }
}
