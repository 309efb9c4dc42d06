use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleDateTime(pub OffsetDateTime);

impl ScheduleDateTime {
    pub fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }

    pub fn inner(&self) -> &OffsetDateTime {
        &self.0
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn timestamp(&self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn plus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }

    pub fn minus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 - Duration::minutes(minutes))
    }
}

impl fmt::Display for ScheduleDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for ScheduleDateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
            .map_err(|e| {
                CoreError::InvalidDateTime(format!("failed to parse timestamp '{s}': {e}"))
            })?;
        Ok(ScheduleDateTime(datetime))
    }
}

impl Serialize for ScheduleDateTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for ScheduleDateTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ScheduleDateTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub fn now_utc() -> ScheduleDateTime {
    ScheduleDateTime(OffsetDateTime::now_utc())
}

/// Elapsed whole minutes between two instants, rounded to the nearest minute.
/// The rounding is over milliseconds; the audit trail depends on this exact
/// derivation, so keep it in one place.
pub fn elapsed_minutes(start: &ScheduleDateTime, end: &ScheduleDateTime) -> i64 {
    let millis = (end.0 - start.0).whole_milliseconds();
    ((millis as f64) / 60_000.0).round() as i64
}
