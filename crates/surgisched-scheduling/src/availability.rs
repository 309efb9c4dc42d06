use serde::{Deserialize, Serialize};
use std::sync::Arc;

use surgisched_core::{CoreError, Result, ScheduleDateTime, SchedulingDefaults, TimeSlot};
use surgisched_storage::ProcedureRepository;

/// Outcome of a conflict check over a room's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_procedure_id: Option<String>,
}

impl Availability {
    pub fn free() -> Self {
        Self {
            available: true,
            conflicting_procedure_id: None,
        }
    }

    pub fn conflict(procedure_id: impl Into<String>) -> Self {
        Self {
            available: false,
            conflicting_procedure_id: Some(procedure_id.into()),
        }
    }
}

/// Conflict detection over a room's booked intervals.
///
/// Candidate selection looks back `max_plausible_duration_minutes` before
/// the proposed start so that a booking from the previous evening whose
/// duration reaches past midnight is still considered; a calendar-day
/// pre-filter would miss it.
pub struct AvailabilityChecker {
    procedures: Arc<dyn ProcedureRepository>,
    defaults: SchedulingDefaults,
}

impl AvailabilityChecker {
    pub fn new(procedures: Arc<dyn ProcedureRepository>, defaults: SchedulingDefaults) -> Self {
        Self {
            procedures,
            defaults,
        }
    }

    /// Checks whether `[proposed_start, proposed_start + duration_minutes)`
    /// is free in the given room.
    ///
    /// Candidates are the room's procedures in a room-occupying state,
    /// minus `exclude_procedure_id` (so a procedure never conflicts with
    /// itself when rescheduled). Intervals are half-open: a booking ending
    /// exactly at the proposed start does not conflict. Among several
    /// conflicts the earliest-starting one is reported.
    pub async fn check(
        &self,
        room_id: &str,
        proposed_start: ScheduleDateTime,
        duration_minutes: u32,
        exclude_procedure_id: Option<&str>,
    ) -> Result<Availability> {
        if duration_minutes == 0 {
            return Err(CoreError::invalid_request(
                "durationMinutes must be greater than zero",
            ));
        }

        let proposed = TimeSlot::from_start(proposed_start, duration_minutes);
        let window = TimeSlot::new(
            proposed_start.minus_minutes(i64::from(self.defaults.max_plausible_duration_minutes)),
            proposed.end,
        );

        // Candidates come back ordered by scheduled start, so the first hit
        // is the earliest-starting conflict.
        let candidates = self
            .procedures
            .find_active_by_room_in_window(room_id, &window)
            .await?;

        for candidate in &candidates {
            if exclude_procedure_id == Some(candidate.id.as_str()) {
                continue;
            }
            let Some(slot) = candidate.slot(&self.defaults) else {
                continue;
            };
            if proposed.overlaps(&slot) {
                tracing::debug!(
                    room.id = %room_id,
                    conflicting.procedure = %candidate.id,
                    "availability check found conflict"
                );
                return Ok(Availability::conflict(candidate.id.clone()));
            }
        }

        Ok(Availability::free())
    }
}
