use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use std::sync::Arc;

use surgisched_core::{Procedure, ProcedureState, Room, ScheduleDateTime, TimeSlot};
use surgisched_storage::{Page, ProcedureRepository, RoomFilter, RoomRepository, StorageError};

/// In-memory backend using papaya lock-free HashMaps.
///
/// Rooms and procedures live in separate maps keyed by id. All scans are
/// full-map filters; fine at clinic scale, and the repository traits leave
/// room for an indexed backend later.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rooms: Arc<PapayaHashMap<String, Room>>,
    procedures: Arc<PapayaHashMap<String, Procedure>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(PapayaHashMap::new()),
            procedures: Arc::new(PapayaHashMap::new()),
        }
    }

    pub async fn room_count(&self) -> usize {
        let guard = self.rooms.pin();
        guard.len()
    }

    pub async fn procedure_count(&self) -> usize {
        let guard = self.procedures.pin();
        guard.len()
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn insert(&self, room: Room) -> Result<Room, StorageError> {
        let guard = self.rooms.pin();
        if guard.get(&room.id).is_some() {
            return Err(StorageError::already_exists("room", room.id));
        }
        guard.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, StorageError> {
        let guard = self.rooms.pin();
        Ok(guard.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Room>, StorageError> {
        let guard = self.rooms.pin();
        Ok(guard
            .iter()
            .map(|(_, room)| room)
            .find(|room| room.name == name)
            .cloned())
    }

    async fn update(&self, room: Room) -> Result<Room, StorageError> {
        let guard = self.rooms.pin();
        if guard.get(&room.id).is_none() {
            return Err(StorageError::not_found("room", room.id));
        }
        guard.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn list(
        &self,
        filter: &RoomFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Room>, StorageError> {
        let guard = self.rooms.pin();
        let mut matches: Vec<Room> = guard
            .iter()
            .map(|(_, room)| room)
            .filter(|room| {
                filter.status.is_none_or(|status| room.status == status)
                    && filter
                        .room_type
                        .as_deref()
                        .is_none_or(|t| room.room_type == t)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matches.len();
        let items: Vec<Room> = matches.into_iter().skip(offset).take(limit).collect();
        Ok(Page::new(items, total, limit, offset))
    }
}

#[async_trait]
impl ProcedureRepository for InMemoryStore {
    async fn insert(&self, procedure: Procedure) -> Result<Procedure, StorageError> {
        let guard = self.procedures.pin();
        if guard.get(&procedure.id).is_some() {
            return Err(StorageError::already_exists("procedure", procedure.id));
        }
        guard.insert(procedure.id.clone(), procedure.clone());
        Ok(procedure)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Procedure>, StorageError> {
        let guard = self.procedures.pin();
        Ok(guard.get(id).cloned())
    }

    async fn update(&self, procedure: Procedure) -> Result<Procedure, StorageError> {
        let guard = self.procedures.pin();
        if guard.get(&procedure.id).is_none() {
            return Err(StorageError::not_found("procedure", procedure.id));
        }
        guard.insert(procedure.id.clone(), procedure.clone());
        Ok(procedure)
    }

    async fn find_active_by_room_in_window(
        &self,
        room_id: &str,
        window: &TimeSlot,
    ) -> Result<Vec<Procedure>, StorageError> {
        let guard = self.procedures.pin();
        let mut candidates: Vec<Procedure> = guard
            .iter()
            .map(|(_, p)| p)
            .filter(|p| {
                p.room_id.as_deref() == Some(room_id)
                    && p.state.is_active()
                    && p.scheduled_start
                        .as_ref()
                        .is_some_and(|start| window.contains(start))
            })
            .cloned()
            .collect();
        candidates.sort_by(|a, b| {
            a.scheduled_start
                .cmp(&b.scheduled_start)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(candidates)
    }

    async fn find_upcoming_by_room(
        &self,
        room_id: &str,
        after: &ScheduleDateTime,
        limit: usize,
    ) -> Result<Vec<Procedure>, StorageError> {
        let guard = self.procedures.pin();
        let mut upcoming: Vec<Procedure> = guard
            .iter()
            .map(|(_, p)| p)
            .filter(|p| {
                p.room_id.as_deref() == Some(room_id)
                    && p.state != ProcedureState::Cancelled
                    && p.scheduled_start.as_ref().is_some_and(|start| start >= after)
            })
            .cloned()
            .collect();
        upcoming.sort_by(|a, b| {
            a.scheduled_start
                .cmp(&b.scheduled_start)
                .then_with(|| a.id.cmp(&b.id))
        });
        upcoming.truncate(limit);
        Ok(upcoming)
    }

    async fn count_pending_for_room(
        &self,
        room_id: &str,
        after: &ScheduleDateTime,
    ) -> Result<usize, StorageError> {
        let guard = self.procedures.pin();
        Ok(guard
            .iter()
            .map(|(_, p)| p)
            .filter(|p| {
                p.room_id.as_deref() == Some(room_id)
                    && p.state == ProcedureState::Scheduled
                    && p.scheduled_start.as_ref().is_some_and(|start| start >= after)
            })
            .count())
    }
}
