use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-room mutex registry.
///
/// The availability check is read-then-decide; without synchronization two
/// concurrent bookings for overlapping intervals can both pass it and both
/// be persisted. Every operation that (re)binds a room interval must hold
/// the destination room's lock from before the check until after the write,
/// giving at most one committed booking per room per overlapping interval.
///
/// Locks are created lazily per room id and never removed; the registry
/// grows with the number of distinct rooms, not with traffic.
#[derive(Debug, Default)]
pub struct RoomLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    fn handle(&self, room_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquires the lock for a room, waiting if another booking for the
    /// same room is in flight.
    pub async fn acquire(&self, room_id: &str) -> OwnedMutexGuard<()> {
        self.handle(room_id).lock_owned().await
    }

    /// Acquires the room's lock when an operation targets a room at all;
    /// unscheduled procedures have nothing to serialize against.
    pub async fn acquire_optional(&self, room_id: Option<&str>) -> Option<OwnedMutexGuard<()>> {
        match room_id {
            Some(id) => Some(self.acquire(id).await),
            None => None,
        }
    }
}
