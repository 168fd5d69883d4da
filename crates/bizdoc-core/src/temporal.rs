//! # Creation Stamps
//!
//! Every document records the date and time of its construction. The stamp
//! is taken from the clock when the in-memory object is created and is never
//! restored from serialized content: decoding a document produces a fresh
//! stamp, not the one that was encoded.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Date and time of construction, truncated to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreationStamp(NaiveDateTime);

impl CreationStamp {
    /// Stamp the current local time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Build a stamp from a date-time, discarding sub-seconds.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// The creation date.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// The creation time of day.
    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// The full date-time.
    pub fn as_datetime(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl std::fmt::Display for CreationStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}
