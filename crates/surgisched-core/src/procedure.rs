use crate::defaults::SchedulingDefaults;
use crate::error::{CoreError, Result};
use crate::interval::TimeSlot;
use crate::time::{ScheduleDateTime, now_utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a procedure.
///
/// `Completed` and `Cancelled` are terminal. A `Deferred` procedure is
/// parked awaiting a new date and does not block its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProcedureState {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Deferred,
}

impl std::fmt::Display for ProcedureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Deferred => write!(f, "deferred"),
        }
    }
}

/// The lifecycle operations that may change `state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Update,
    Start,
    Complete,
    Cancel,
    Defer,
    Reschedule,
}

impl std::fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Start => write!(f, "start"),
            Self::Complete => write!(f, "complete"),
            Self::Cancel => write!(f, "cancel"),
            Self::Defer => write!(f, "defer"),
            Self::Reschedule => write!(f, "reprogram"),
        }
    }
}

impl ProcedureState {
    /// States that occupy a room's timeline.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scheduled | Self::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The single authority on transition legality. Every lifecycle
    /// operation goes through here before mutating anything; no caller may
    /// compare states on its own.
    pub fn ensure_allows(&self, op: LifecycleOp, procedure_id: &str) -> Result<()> {
        match (self, op) {
            (Self::Completed, _) => Err(CoreError::already_completed(procedure_id)),
            // Re-cancelling an already cancelled procedure only appends the
            // reason; every other operation would leave the terminal state.
            (Self::Cancelled, LifecycleOp::Cancel) => Ok(()),
            (Self::Cancelled, _) => Err(CoreError::procedure_cancelled(procedure_id)),
            (Self::InProgress, LifecycleOp::Start) => {
                Err(CoreError::invalid_transition(op.to_string(), self.to_string()))
            }
            (Self::Scheduled | Self::Deferred, LifecycleOp::Start) => Ok(()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProcedurePriority {
    #[default]
    Routine,
    Urgent,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProcedureComplexity {
    Low,
    #[default]
    Medium,
    High,
}

/// A scheduled clinical act bound to zero-or-one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_id: Option<String>,
    pub patient_id: String,
    pub clinician_id: String,
    pub name: String,
    pub procedure_type: String,
    pub priority: ProcedurePriority,
    pub complexity: ProcedureComplexity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<ScheduleDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<ScheduleDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end: Option<ScheduleDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_duration_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<ScheduleDateTime>,
    pub state: ProcedureState,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: ScheduleDateTime,
    pub updated_at: ScheduleDateTime,
}

impl Procedure {
    pub fn from_new(
        id: String,
        data: NewProcedure,
        defaults: &SchedulingDefaults,
        user_id: &str,
    ) -> Self {
        let now = now_utc();
        Self {
            id,
            admission_id: data.admission_id,
            patient_id: data.patient_id,
            clinician_id: data.clinician_id,
            name: data.name,
            procedure_type: data.procedure_type,
            priority: data.priority.unwrap_or(defaults.default_priority),
            complexity: data.complexity.unwrap_or(defaults.default_complexity),
            room_id: data.room_id,
            scheduled_start: data.scheduled_start,
            estimated_duration_minutes: data.estimated_duration_minutes,
            actual_start: None,
            actual_end: None,
            actual_duration_minutes: None,
            findings: None,
            complications: None,
            observations: data.observations,
            signed_by: None,
            signed_at: None,
            state: ProcedureState::Scheduled,
            created_by: user_id.to_string(),
            updated_by: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when room, start and duration are all present, which is the only
    /// configuration that can collide with other bookings.
    pub fn is_fully_scheduled(&self) -> bool {
        self.room_id.is_some()
            && self.scheduled_start.is_some()
            && self.estimated_duration_minutes.is_some()
    }

    /// The interval this procedure occupies on its room's timeline, with
    /// the duration defaulted through the central policy. `None` when no
    /// start is set.
    pub fn slot(&self, defaults: &SchedulingDefaults) -> Option<TimeSlot> {
        let start = self.scheduled_start?;
        let duration = defaults.duration_or_default(self.estimated_duration_minutes);
        Some(TimeSlot::from_start(start, duration))
    }

    /// Applies a generic field patch. Fields absent from the patch keep
    /// their current value; state is never touched here.
    pub fn apply_patch(&mut self, patch: ProcedurePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(procedure_type) = patch.procedure_type {
            self.procedure_type = procedure_type;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(complexity) = patch.complexity {
            self.complexity = complexity;
        }
        if let Some(room_id) = patch.room_id {
            self.room_id = Some(room_id);
        }
        if let Some(start) = patch.scheduled_start {
            self.scheduled_start = Some(start);
        }
        if let Some(duration) = patch.estimated_duration_minutes {
            self.estimated_duration_minutes = Some(duration);
        }
        if let Some(findings) = patch.findings {
            self.findings = Some(findings);
        }
        if let Some(complications) = patch.complications {
            self.complications = Some(complications);
        }
        if let Some(observations) = patch.observations {
            self.observations = Some(observations);
        }
    }

    /// Appends an audit note to `observations`, preserving existing text.
    pub fn append_observation(&mut self, note: &str) {
        match &mut self.observations {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(note);
            }
            None => self.observations = Some(note.to_string()),
        }
    }

    pub fn touch(&mut self, user_id: &str) {
        self.updated_by = user_id.to_string();
        self.updated_at = now_utc();
    }
}

/// Payload for procedure creation. Room, start and duration are optional; a
/// procedure may exist unscheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProcedure {
    #[serde(default)]
    pub admission_id: Option<String>,
    pub patient_id: String,
    pub clinician_id: String,
    pub name: String,
    pub procedure_type: String,
    #[serde(default)]
    pub priority: Option<ProcedurePriority>,
    #[serde(default)]
    pub complexity: Option<ProcedureComplexity>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub scheduled_start: Option<ScheduleDateTime>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
    #[serde(default)]
    pub observations: Option<String>,
}

/// Generic partial update; `None` means unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedurePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub procedure_type: Option<String>,
    #[serde(default)]
    pub priority: Option<ProcedurePriority>,
    #[serde(default)]
    pub complexity: Option<ProcedureComplexity>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub scheduled_start: Option<ScheduleDateTime>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
    #[serde(default)]
    pub findings: Option<String>,
    #[serde(default)]
    pub complications: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
}

impl ProcedurePatch {
    /// True when the patch touches the room/time/duration triple and a
    /// fresh availability check is required.
    pub fn changes_schedule(&self) -> bool {
        self.room_id.is_some()
            || self.scheduled_start.is_some()
            || self.estimated_duration_minutes.is_some()
    }
}

/// Payload for completing a procedure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProcedure {
    #[serde(default)]
    pub actual_end: Option<ScheduleDateTime>,
    #[serde(default)]
    pub actual_duration_minutes: Option<i64>,
    #[serde(default)]
    pub findings: Option<String>,
    #[serde(default)]
    pub complications: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn new_procedure() -> NewProcedure {
        NewProcedure {
            admission_id: Some("adm-1".to_string()),
            patient_id: "pat-1".to_string(),
            clinician_id: "doc-1".to_string(),
            name: "Appendectomy".to_string(),
            procedure_type: "general-surgery".to_string(),
            priority: None,
            complexity: None,
            room_id: Some("room-1".to_string()),
            scheduled_start: Some(ScheduleDateTime::from_str("2025-01-20T10:00:00Z").unwrap()),
            estimated_duration_minutes: Some(60),
            observations: None,
        }
    }

    #[test]
    fn test_from_new_applies_defaults() {
        let defaults = SchedulingDefaults::default();
        let p = Procedure::from_new("proc-1".to_string(), new_procedure(), &defaults, "user-1");
        assert_eq!(p.state, ProcedureState::Scheduled);
        assert_eq!(p.priority, ProcedurePriority::Routine);
        assert_eq!(p.complexity, ProcedureComplexity::Medium);
        assert_eq!(p.created_by, "user-1");
        assert!(p.is_fully_scheduled());
    }

    #[test]
    fn test_slot_uses_default_duration_when_unset() {
        let defaults = SchedulingDefaults::default();
        let mut data = new_procedure();
        data.estimated_duration_minutes = None;
        let p = Procedure::from_new("proc-1".to_string(), data, &defaults, "user-1");
        let slot = p.slot(&defaults).unwrap();
        assert_eq!(slot.duration_minutes(), 60);
        assert!(!p.is_fully_scheduled());
    }

    #[test]
    fn test_slot_none_without_start() {
        let defaults = SchedulingDefaults::default();
        let mut data = new_procedure();
        data.scheduled_start = None;
        let p = Procedure::from_new("proc-1".to_string(), data, &defaults, "user-1");
        assert!(p.slot(&defaults).is_none());
    }

    #[test]
    fn test_append_observation_is_non_destructive() {
        let defaults = SchedulingDefaults::default();
        let mut p =
            Procedure::from_new("proc-1".to_string(), new_procedure(), &defaults, "user-1");
        p.append_observation("Cancelled: patient unwell");
        p.append_observation("Deferred: room maintenance");
        let obs = p.observations.as_deref().unwrap();
        assert!(obs.contains("patient unwell"));
        assert!(obs.contains("room maintenance"));
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&ProcedureState::InProgress).unwrap(),
            "\"in-progress\""
        );
        let state: ProcedureState = serde_json::from_str("\"deferred\"").unwrap();
        assert_eq!(state, ProcedureState::Deferred);
    }

    #[test]
    fn test_active_and_terminal_predicates() {
        assert!(ProcedureState::Scheduled.is_active());
        assert!(ProcedureState::InProgress.is_active());
        assert!(!ProcedureState::Deferred.is_active());
        assert!(!ProcedureState::Completed.is_active());
        assert!(ProcedureState::Completed.is_terminal());
        assert!(ProcedureState::Cancelled.is_terminal());
        assert!(!ProcedureState::Scheduled.is_terminal());
    }

    #[test]
    fn test_start_allowed_from_scheduled_and_deferred_only() {
        assert!(
            ProcedureState::Scheduled
                .ensure_allows(LifecycleOp::Start, "p")
                .is_ok()
        );
        assert!(
            ProcedureState::Deferred
                .ensure_allows(LifecycleOp::Start, "p")
                .is_ok()
        );
        assert!(matches!(
            ProcedureState::InProgress.ensure_allows(LifecycleOp::Start, "p"),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert!(matches!(
            ProcedureState::Completed.ensure_allows(LifecycleOp::Start, "p"),
            Err(CoreError::AlreadyCompleted { .. })
        ));
        assert!(matches!(
            ProcedureState::Cancelled.ensure_allows(LifecycleOp::Start, "p"),
            Err(CoreError::ProcedureCancelled { .. })
        ));
    }

    #[test]
    fn test_completed_blocks_every_operation() {
        for op in [
            LifecycleOp::Update,
            LifecycleOp::Start,
            LifecycleOp::Complete,
            LifecycleOp::Cancel,
            LifecycleOp::Defer,
            LifecycleOp::Reschedule,
        ] {
            assert!(matches!(
                ProcedureState::Completed.ensure_allows(op, "p"),
                Err(CoreError::AlreadyCompleted { .. })
            ));
        }
    }

    #[test]
    fn test_cancelled_only_allows_repeat_cancel() {
        assert!(
            ProcedureState::Cancelled
                .ensure_allows(LifecycleOp::Cancel, "p")
                .is_ok()
        );
        for op in [
            LifecycleOp::Update,
            LifecycleOp::Start,
            LifecycleOp::Complete,
            LifecycleOp::Defer,
            LifecycleOp::Reschedule,
        ] {
            assert!(matches!(
                ProcedureState::Cancelled.ensure_allows(op, "p"),
                Err(CoreError::ProcedureCancelled { .. })
            ));
        }
    }

    #[test]
    fn test_non_terminal_states_allow_the_rest() {
        for state in [
            ProcedureState::Scheduled,
            ProcedureState::InProgress,
            ProcedureState::Deferred,
        ] {
            for op in [
                LifecycleOp::Update,
                LifecycleOp::Complete,
                LifecycleOp::Cancel,
                LifecycleOp::Defer,
                LifecycleOp::Reschedule,
            ] {
                assert!(state.ensure_allows(op, "p").is_ok(), "{state} {op}");
            }
        }
    }

    #[test]
    fn test_patch_changes_schedule() {
        assert!(!ProcedurePatch::default().changes_schedule());
        assert!(
            ProcedurePatch {
                room_id: Some("room-2".to_string()),
                ..ProcedurePatch::default()
            }
            .changes_schedule()
        );
        assert!(
            ProcedurePatch {
                estimated_duration_minutes: Some(90),
                ..ProcedurePatch::default()
            }
            .changes_schedule()
        );
    }

    #[test]
    fn test_serialization_shape() {
        let defaults = SchedulingDefaults::default();
        let p = Procedure::from_new("proc-1".to_string(), new_procedure(), &defaults, "user-1");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["state"], "scheduled");
        assert_eq!(json["patientId"], "pat-1");
        assert_eq!(json["estimatedDurationMinutes"], 60);
        assert!(json.get("actualStart").is_none());
    }
}
