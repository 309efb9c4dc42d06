//! Repository traits the scheduling engine depends on.
//!
//! Implementations must be thread-safe (`Send + Sync`); the engine layers
//! its own per-room synchronization on top, so repositories only guarantee
//! the consistency of individual reads and writes.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{Page, RoomFilter};
use surgisched_core::{Procedure, Room, ScheduleDateTime, TimeSlot};

/// Persistence contract for rooms.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Inserts a new room.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the id is taken. Name
    /// uniqueness is the registry's concern, checked via `find_by_name`.
    async fn insert(&self, room: Room) -> Result<Room, StorageError>;

    /// Reads a room by id. Returns `None` if the room does not exist.
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, StorageError>;

    /// Looks a room up by exact (case-sensitive) name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Room>, StorageError>;

    /// Replaces a stored room.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the room does not exist.
    async fn update(&self, room: Room) -> Result<Room, StorageError>;

    /// Lists rooms matching the filter, ordered by name, with the total
    /// match count computed before pagination.
    async fn list(
        &self,
        filter: &RoomFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Room>, StorageError>;
}

/// Persistence contract for procedures.
#[async_trait]
pub trait ProcedureRepository: Send + Sync {
    /// Inserts a new procedure.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the id is taken.
    async fn insert(&self, procedure: Procedure) -> Result<Procedure, StorageError>;

    /// Reads a procedure by id. Returns `None` if it does not exist.
    async fn find_by_id(&self, id: &str) -> Result<Option<Procedure>, StorageError>;

    /// Replaces a stored procedure.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the procedure does not exist.
    async fn update(&self, procedure: Procedure) -> Result<Procedure, StorageError>;

    /// Booking-blocking candidates for a conflict check: procedures in the
    /// given room, in a room-occupying state (scheduled or in progress),
    /// whose scheduled start falls within `window` (half-open).
    async fn find_active_by_room_in_window(
        &self,
        room_id: &str,
        window: &TimeSlot,
    ) -> Result<Vec<Procedure>, StorageError>;

    /// Upcoming non-cancelled procedures for a room, starting at or after
    /// `after`, ordered by scheduled start, at most `limit` entries.
    async fn find_upcoming_by_room(
        &self,
        room_id: &str,
        after: &ScheduleDateTime,
        limit: usize,
    ) -> Result<Vec<Procedure>, StorageError>;

    /// Number of procedures in the `Scheduled` state whose start is at or
    /// after `after` in the given room. Gates room deactivation.
    async fn count_pending_for_room(
        &self,
        room_id: &str,
        after: &ScheduleDateTime,
    ) -> Result<usize, StorageError>;
}
