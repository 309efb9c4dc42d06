use crate::time::ScheduleDateTime;
use serde::{Deserialize, Serialize};

/// A half-open time interval `[start, end)`.
///
/// Two slots conflict iff `start1 < end2 && end1 > start2`; a slot ending
/// exactly when another begins does not conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: ScheduleDateTime,
    pub end: ScheduleDateTime,
}

impl TimeSlot {
    pub fn new(start: ScheduleDateTime, end: ScheduleDateTime) -> Self {
        Self { start, end }
    }

    /// Builds the slot `[start, start + duration_minutes)`.
    pub fn from_start(start: ScheduleDateTime, duration_minutes: u32) -> Self {
        Self {
            start,
            end: start.plus_minutes(i64::from(duration_minutes)),
        }
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, instant: &ScheduleDateTime) -> bool {
        self.start <= *instant && *instant < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end.0 - self.start.0).whole_minutes()
    }
}
