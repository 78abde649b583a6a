//! Instants and ISO-8601 intervals.
//!
//! Task timestamps travel as strings in URLs, JSON bodies and reference
//! documents, often at minute precision (`2024-06-18T09:30Z`), which RFC 3339
//! alone does not accept.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

const MINUTE_PRECISION: &str = "%Y-%m-%dT%H:%M";

/// An instant with the offset it was expressed in.
///
/// Equality, ordering and hashing only consider the instant, so
/// `2024-06-18T11:30+02:00` and `2024-06-18T09:30Z` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Wrap a chrono datetime.
    pub fn new(datetime: DateTime<FixedOffset>) -> Self {
        Self(datetime)
    }

    /// The current instant, in UTC.
    pub fn now() -> Self {
        Self(Utc::now().fixed_offset())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime.fixed_offset())
    }
}

impl FromStr for Timestamp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(datetime));
        }

        let invalid = || CoreError::InvalidTimestamp(s.to_string());

        // Minute precision: "Z" needs to be handled by hand, numeric offsets
        // are understood by `%:z`.
        if let Some(local) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
            let naive = NaiveDateTime::parse_from_str(local, MINUTE_PRECISION).map_err(|_| invalid())?;
            return Ok(Self(naive.and_utc().fixed_offset()));
        }

        DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for Timestamp {
    /// Shortest ISO-8601 form: seconds and fractions are only written when
    /// non-zero, a zero offset is written `Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = &self.0;
        write!(f, "{}", dt.format(MINUTE_PRECISION))?;
        if dt.second() != 0 || dt.nanosecond() != 0 {
            write!(f, ":{:02}", dt.second())?;
            if dt.nanosecond() != 0 {
                write!(f, "{}", dt.format("%.f"))?;
            }
        }
        if dt.offset().local_minus_utc() == 0 {
            f.write_str("Z")
        } else {
            write!(f, "{}", dt.format("%:z"))
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A half-open validity interval `[start, end)`, written `start/end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: Timestamp,
    end: Timestamp,
}

impl Interval {
    /// Create an interval. `end` must not precede `start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvalidInterval(format!("{}/{}", start, end)));
        }
        Ok(Self { start, end })
    }

    /// Returns true if `instant` lies within `[start, end)`.
    pub fn contains(&self, instant: &Timestamp) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidInterval(s.to_string());
        let (start, end) = s.trim().split_once('/').ok_or_else(invalid)?;
        let start = start.parse().map_err(|_| invalid())?;
        let end = end.parse().map_err(|_| invalid())?;
        Self::new(start, end).map_err(|_| invalid())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}
