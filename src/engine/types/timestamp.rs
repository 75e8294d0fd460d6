use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::TypeError;

pub const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Instant stored as signed epoch seconds plus a nanosecond fraction.
///
/// `nanos` is always in `0..1_000_000_000`; negative instants carry the
/// fraction forward from the earlier whole second, as chrono does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimestamp")]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp {
        seconds: 0,
        nanos: 0,
    };

    pub fn new(seconds: i64, nanos: u32) -> Result<Self, TypeError> {
        if nanos >= NANOS_PER_SECOND {
            return Err(TypeError::InvalidTimestamp { seconds, nanos });
        }
        Ok(Self { seconds, nanos })
    }

    /// Builds a timestamp from decoded parts, clamping an out-of-range fraction.
    pub(crate) fn clamped(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds,
            nanos: nanos.min(NANOS_PER_SECOND - 1),
        }
    }

    pub const fn from_epoch_second(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn from_epoch_millis(millis: i64) -> Self {
        Self {
            seconds: millis.div_euclid(1_000),
            nanos: (millis.rem_euclid(1_000) as u32) * 1_000_000,
        }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    pub fn to_epoch_millis(&self) -> i64 {
        self.seconds
            .saturating_mul(1_000)
            .saturating_add(i64::from(self.nanos / 1_000_000))
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }

    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        Self {
            seconds: datetime.timestamp(),
            // chrono encodes leap seconds as nanos >= 1e9
            nanos: datetime.timestamp_subsec_nanos().min(NANOS_PER_SECOND - 1),
        }
    }

    pub fn parse_rfc3339(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| Self::from_datetime(&dt.with_timezone(&Utc)))
    }
}

#[derive(Deserialize)]
struct RawTimestamp {
    seconds: i64,
    nanos: u32,
}

impl TryFrom<RawTimestamp> for Timestamp {
    type Error = TypeError;

    fn try_from(raw: RawTimestamp) -> Result<Self, Self::Error> {
        Timestamp::new(raw.seconds, raw.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => write!(f, "{}.{:09}", self.seconds, self.nanos),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_datetime(&value)
    }
}
