use std::sync::Arc;

use crate::availability::AvailabilityChecker;
use crate::directory::AdmissionDirectory;
use crate::locks::RoomLocks;
use surgisched_core::{
    CompleteProcedure, CoreError, LifecycleOp, NewProcedure, Procedure, ProcedurePatch,
    ProcedureState, Result, ScheduleDateTime, SchedulingDefaults, elapsed_minutes, generate_id,
    now_utc,
};
use surgisched_storage::{ProcedureRepository, RoomRepository};

/// The procedure lifecycle engine.
///
/// Sole writer of a procedure's `state`: every transition is validated by
/// `ProcedureState::ensure_allows` and every schedule-touching operation
/// re-runs the availability check while holding the destination room's
/// lock, so the check and the write commit as one unit per room.
pub struct ProcedureLifecycle {
    procedures: Arc<dyn ProcedureRepository>,
    rooms: Arc<dyn RoomRepository>,
    admissions: Arc<dyn AdmissionDirectory>,
    checker: AvailabilityChecker,
    locks: Arc<RoomLocks>,
    defaults: SchedulingDefaults,
}

impl ProcedureLifecycle {
    pub fn new(
        procedures: Arc<dyn ProcedureRepository>,
        rooms: Arc<dyn RoomRepository>,
        admissions: Arc<dyn AdmissionDirectory>,
        locks: Arc<RoomLocks>,
        defaults: SchedulingDefaults,
    ) -> Self {
        let checker = AvailabilityChecker::new(procedures.clone(), defaults.clone());
        Self {
            procedures,
            rooms,
            admissions,
            checker,
            locks,
            defaults,
        }
    }

    pub fn checker(&self) -> &AvailabilityChecker {
        &self.checker
    }

    async fn load(&self, id: &str) -> Result<Procedure> {
        self.procedures
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::procedure_not_found(id))
    }

    async fn ensure_room_exists(&self, room_id: &str) -> Result<()> {
        self.rooms
            .find_by_id(room_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| CoreError::room_not_found(room_id))
    }

    async fn ensure_admission_usable(&self, admission_id: &str) -> Result<()> {
        let admission = self
            .admissions
            .get_admission(admission_id)
            .await
            .ok_or_else(|| CoreError::admission_not_found(admission_id))?;
        if !admission.state.is_active() {
            return Err(CoreError::admission_not_active(
                admission_id,
                admission.state.to_string(),
            ));
        }
        Ok(())
    }

    async fn ensure_free(
        &self,
        room_id: &str,
        start: ScheduleDateTime,
        duration_minutes: u32,
        exclude: Option<&str>,
    ) -> Result<()> {
        let availability = self
            .checker
            .check(room_id, start, duration_minutes, exclude)
            .await?;
        match availability.conflicting_procedure_id {
            Some(conflict) => Err(CoreError::room_conflict(room_id, conflict)),
            None => Ok(()),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Procedure> {
        self.load(id).await
    }

    /// Creates a procedure in the `Scheduled` state. Room, start and
    /// duration are optional; when all three are present the interval must
    /// pass the availability check before anything is persisted.
    pub async fn create(&self, data: NewProcedure, user_id: &str) -> Result<Procedure> {
        if data.estimated_duration_minutes == Some(0) {
            return Err(CoreError::invalid_request(
                "estimatedDurationMinutes must be greater than zero",
            ));
        }
        if let Some(admission_id) = data.admission_id.as_deref() {
            self.ensure_admission_usable(admission_id).await?;
        }
        if let Some(room_id) = data.room_id.as_deref() {
            self.ensure_room_exists(room_id).await?;
        }

        let procedure = Procedure::from_new(generate_id(), data, &self.defaults, user_id);

        let _guard = match (
            procedure.room_id.as_deref(),
            procedure.scheduled_start,
            procedure.estimated_duration_minutes,
        ) {
            (Some(room_id), Some(start), Some(duration)) => {
                let guard = self.locks.acquire(room_id).await;
                self.ensure_free(room_id, start, duration, None).await?;
                Some(guard)
            }
            _ => None,
        };

        let procedure = self.procedures.insert(procedure).await?;
        tracing::info!(
            procedure.id = %procedure.id,
            room.id = procedure.room_id.as_deref().unwrap_or("-"),
            "procedure created"
        );
        Ok(procedure)
    }

    /// Generic field patch. When the patch touches room, start or duration,
    /// the availability check runs over the resulting schedule (patch
    /// values falling back to stored ones), excluding the procedure itself.
    pub async fn update(
        &self,
        id: &str,
        patch: ProcedurePatch,
        user_id: &str,
    ) -> Result<Procedure> {
        if patch.estimated_duration_minutes == Some(0) {
            return Err(CoreError::invalid_request(
                "estimatedDurationMinutes must be greater than zero",
            ));
        }

        let mut procedure = self.load(id).await?;
        procedure.state.ensure_allows(LifecycleOp::Update, id)?;

        if let Some(new_room) = patch.room_id.as_deref()
            && procedure.room_id.as_deref() != Some(new_room)
        {
            self.ensure_room_exists(new_room).await?;
        }

        let schedule_changed = patch.changes_schedule();
        let resulting_room = patch.room_id.clone().or_else(|| procedure.room_id.clone());
        let resulting_start = patch.scheduled_start.or(procedure.scheduled_start);
        let resulting_duration = patch
            .estimated_duration_minutes
            .or(procedure.estimated_duration_minutes);

        let _guard = match (schedule_changed, resulting_room.as_deref(), resulting_start) {
            (true, Some(room_id), Some(start)) => {
                let guard = self.locks.acquire(room_id).await;
                let minutes = self.defaults.duration_or_default(resulting_duration);
                self.ensure_free(room_id, start, minutes, Some(id)).await?;
                Some(guard)
            }
            _ => None,
        };

        procedure.apply_patch(patch);
        procedure.touch(user_id);
        Ok(self.procedures.update(procedure).await?)
    }

    /// Moves a scheduled or deferred procedure to `InProgress`, stamping
    /// the actual start.
    pub async fn start(&self, id: &str, user_id: &str) -> Result<Procedure> {
        let mut procedure = self.load(id).await?;
        procedure.state.ensure_allows(LifecycleOp::Start, id)?;

        procedure.state = ProcedureState::InProgress;
        procedure.actual_start = Some(now_utc());
        procedure.touch(user_id);
        let procedure = self.procedures.update(procedure).await?;
        tracing::info!(procedure.id = %id, "procedure started");
        Ok(procedure)
    }

    /// Completes a procedure, deriving the real duration when the caller
    /// did not supply one: `round((actual_end_or_now - actual_start))` in
    /// minutes, or left unset when the procedure was never started.
    pub async fn complete(
        &self,
        id: &str,
        data: CompleteProcedure,
        user_id: &str,
    ) -> Result<Procedure> {
        let mut procedure = self.load(id).await?;
        procedure.state.ensure_allows(LifecycleOp::Complete, id)?;

        let now = now_utc();
        let end = data.actual_end.unwrap_or(now);
        procedure.actual_end = Some(end);
        procedure.actual_duration_minutes = match data.actual_duration_minutes {
            Some(explicit) => Some(explicit),
            None => procedure
                .actual_start
                .as_ref()
                .map(|start| elapsed_minutes(start, &end)),
        };
        if let Some(findings) = data.findings {
            procedure.findings = Some(findings);
        }
        if let Some(complications) = data.complications {
            procedure.complications = Some(complications);
        }
        procedure.state = ProcedureState::Completed;
        procedure.signed_by = Some(user_id.to_string());
        procedure.signed_at = Some(now);
        procedure.touch(user_id);
        let procedure = self.procedures.update(procedure).await?;
        tracing::info!(
            procedure.id = %id,
            duration_minutes = ?procedure.actual_duration_minutes,
            "procedure completed"
        );
        Ok(procedure)
    }

    /// Cancels a procedure. Terminal: the record is retained for audit and
    /// the reason appended to its observations.
    pub async fn cancel(&self, id: &str, reason: &str, user_id: &str) -> Result<Procedure> {
        let mut procedure = self.load(id).await?;
        procedure.state.ensure_allows(LifecycleOp::Cancel, id)?;

        procedure.state = ProcedureState::Cancelled;
        procedure.append_observation(&format!("Cancelled: {reason}"));
        procedure.touch(user_id);
        let procedure = self.procedures.update(procedure).await?;
        tracing::info!(procedure.id = %id, "procedure cancelled");
        Ok(procedure)
    }

    /// Defers a procedure, optionally onto a tentative new date. Deferred
    /// procedures do not occupy their room, so no availability check runs
    /// here; rebooking happens through `reprogram`.
    pub async fn defer(
        &self,
        id: &str,
        new_date: Option<ScheduleDateTime>,
        reason: &str,
        user_id: &str,
    ) -> Result<Procedure> {
        let mut procedure = self.load(id).await?;
        procedure.state.ensure_allows(LifecycleOp::Defer, id)?;

        procedure.state = ProcedureState::Deferred;
        if let Some(date) = new_date {
            procedure.scheduled_start = Some(date);
        }
        procedure.append_observation(&format!("Deferred: {reason}"));
        procedure.touch(user_id);
        let procedure = self.procedures.update(procedure).await?;
        tracing::info!(procedure.id = %id, "procedure deferred");
        Ok(procedure)
    }

    /// Puts a procedure back on the schedule at a new date, re-checking the
    /// room's timeline with the existing room and duration (defaulted when
    /// unset) and excluding the procedure itself.
    pub async fn reprogram(
        &self,
        id: &str,
        new_date: ScheduleDateTime,
        user_id: &str,
    ) -> Result<Procedure> {
        let mut procedure = self.load(id).await?;
        procedure.state.ensure_allows(LifecycleOp::Reschedule, id)?;

        let _guard = match procedure.room_id.as_deref() {
            Some(room_id) => {
                let guard = self.locks.acquire(room_id).await;
                let minutes = self
                    .defaults
                    .duration_or_default(procedure.estimated_duration_minutes);
                self.ensure_free(room_id, new_date, minutes, Some(id)).await?;
                Some(guard)
            }
            None => None,
        };

        procedure.scheduled_start = Some(new_date);
        procedure.state = ProcedureState::Scheduled;
        procedure.touch(user_id);
        let procedure = self.procedures.update(procedure).await?;
        tracing::info!(
            procedure.id = %id,
            scheduled_start = %new_date,
            "procedure reprogrammed"
        );
        Ok(procedure)
    }
}
