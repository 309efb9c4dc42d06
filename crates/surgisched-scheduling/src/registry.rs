use serde::{Deserialize, Serialize};
use std::sync::Arc;

use surgisched_core::{
    CoreError, NewRoom, Procedure, Result, Room, RoomPatch, SchedulingDefaults, generate_id,
    now_utc,
};
use surgisched_storage::{Page, ProcedureRepository, RoomFilter, RoomRepository};

/// A room together with its short-term booking outlook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    #[serde(flatten)]
    pub room: Room,
    pub upcoming_procedures: Vec<Procedure>,
}

/// CRUD surface for bookable rooms.
pub struct RoomRegistry {
    rooms: Arc<dyn RoomRepository>,
    procedures: Arc<dyn ProcedureRepository>,
    defaults: SchedulingDefaults,
}

impl RoomRegistry {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        procedures: Arc<dyn ProcedureRepository>,
        defaults: SchedulingDefaults,
    ) -> Self {
        Self {
            rooms,
            procedures,
            defaults,
        }
    }

    /// Creates a room. Names are unique, compared exactly (case-sensitive).
    pub async fn create_room(&self, data: NewRoom) -> Result<Room> {
        if data.name.trim().is_empty() {
            return Err(CoreError::invalid_request("room name must not be empty"));
        }
        if self.rooms.find_by_name(&data.name).await?.is_some() {
            return Err(CoreError::duplicate_room_name(data.name));
        }

        let room = Room::new(generate_id(), data);
        let room = self.rooms.insert(room).await?;
        tracing::info!(room.id = %room.id, room.name = %room.name, "room created");
        Ok(room)
    }

    pub async fn list_rooms(
        &self,
        filter: &RoomFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Page<Room>> {
        Ok(self.rooms.list(filter, limit, offset).await?)
    }

    /// Reads a room with its upcoming non-cancelled procedures, ordered by
    /// scheduled start.
    pub async fn get_room(&self, id: &str) -> Result<RoomDetails> {
        let room = self
            .rooms
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::room_not_found(id))?;
        let upcoming = self
            .procedures
            .find_upcoming_by_room(id, &now_utc(), self.defaults.room_lookahead)
            .await?;
        Ok(RoomDetails {
            room,
            upcoming_procedures: upcoming,
        })
    }

    pub async fn update_room(&self, id: &str, patch: RoomPatch) -> Result<Room> {
        let mut room = self
            .rooms
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::room_not_found(id))?;

        // A renamed room must not collide with another room's name.
        if let Some(new_name) = patch.name.as_deref()
            && new_name != room.name
            && let Some(other) = self.rooms.find_by_name(new_name).await?
            && other.id != room.id
        {
            return Err(CoreError::duplicate_room_name(new_name));
        }

        room.apply_patch(patch);
        Ok(self.rooms.update(room).await?)
    }

    /// Soft-deletes a room by flipping its status to `Inactive`.
    ///
    /// Refused while any procedure in the `Scheduled` state still has a
    /// future start in this room. Existing bookings are never cancelled by
    /// deactivation.
    pub async fn deactivate_room(&self, id: &str) -> Result<Room> {
        let mut room = self
            .rooms
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::room_not_found(id))?;

        let pending = self
            .procedures
            .count_pending_for_room(id, &now_utc())
            .await?;
        if pending > 0 {
            return Err(CoreError::has_pending_bookings(id, pending));
        }

        room.deactivate();
        let room = self.rooms.update(room).await?;
        tracing::info!(room.id = %room.id, "room deactivated");
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use surgisched_core::{NewProcedure, ProcedureState, RoomStatus, ScheduleDateTime};
    use surgisched_db_memory::InMemoryStore;

    fn registry() -> (RoomRegistry, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (
            RoomRegistry::new(
                store.clone(),
                store.clone(),
                SchedulingDefaults::default(),
            ),
            store,
        )
    }

    fn new_room(name: &str) -> NewRoom {
        NewRoom {
            name: name.to_string(),
            room_type: "operating-theatre".to_string(),
            location: "Level 2".to_string(),
            capacity: Some(6),
            equipment: vec!["c-arm".to_string()],
        }
    }

    async fn park_procedure(
        store: &InMemoryStore,
        id: &str,
        room_id: &str,
        start: &str,
        state: ProcedureState,
    ) {
        let defaults = SchedulingDefaults::default();
        let mut p = Procedure::from_new(
            id.to_string(),
            NewProcedure {
                admission_id: None,
                patient_id: "pat-1".to_string(),
                clinician_id: "doc-1".to_string(),
                name: "Osteotomy".to_string(),
                procedure_type: "orthopedics".to_string(),
                priority: None,
                complexity: None,
                room_id: Some(room_id.to_string()),
                scheduled_start: Some(ScheduleDateTime::from_str(start).unwrap()),
                estimated_duration_minutes: Some(60),
                observations: None,
            },
            &defaults,
            "tester",
        );
        p.state = state;
        ProcedureRepository::insert(store, p).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_room_rejects_duplicate_name() {
        let (registry, _) = registry();
        registry.create_room(new_room("Theatre A")).await.unwrap();

        let err = registry.create_room(new_room("Theatre A")).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRoomName { .. }));

        // Different case is a different name.
        assert!(registry.create_room(new_room("theatre a")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_room_rejects_blank_name() {
        let (registry, _) = registry();
        let err = registry.create_room(new_room("   ")).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_get_room_includes_bounded_lookahead() {
        let (registry, store) = registry();
        let room = registry.create_room(new_room("Theatre A")).await.unwrap();

        for i in 0..7 {
            park_procedure(
                &store,
                &format!("p{i}"),
                &room.id,
                &format!("2030-01-0{}T08:00:00Z", i + 1),
                ProcedureState::Scheduled,
            )
            .await;
        }
        park_procedure(&store, "gone", &room.id, "2030-01-01T06:00:00Z", ProcedureState::Cancelled)
            .await;

        let details = registry.get_room(&room.id).await.unwrap();
        assert_eq!(details.upcoming_procedures.len(), 5);
        assert_eq!(details.upcoming_procedures[0].id, "p0");
        assert!(
            details
                .upcoming_procedures
                .iter()
                .all(|p| p.state != ProcedureState::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_get_room_not_found() {
        let (registry, _) = registry();
        let err = registry.get_room("ghost").await.unwrap_err();
        assert!(matches!(err, CoreError::RoomNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_room_patch_and_rename_guard() {
        let (registry, _) = registry();
        let a = registry.create_room(new_room("Theatre A")).await.unwrap();
        registry.create_room(new_room("Theatre B")).await.unwrap();

        let updated = registry
            .update_room(
                &a.id,
                RoomPatch {
                    location: Some("Level 3".to_string()),
                    ..RoomPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location, "Level 3");

        let err = registry
            .update_room(
                &a.id,
                RoomPatch {
                    name: Some("Theatre B".to_string()),
                    ..RoomPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRoomName { .. }));

        // Re-submitting its own name is not a collision.
        assert!(
            registry
                .update_room(
                    &a.id,
                    RoomPatch {
                        name: Some("Theatre A".to_string()),
                        ..RoomPatch::default()
                    },
                )
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_deactivate_blocked_by_future_scheduled_procedure() {
        let (registry, store) = registry();
        let room = registry.create_room(new_room("Theatre A")).await.unwrap();
        park_procedure(&store, "p1", &room.id, "2030-06-01T08:00:00Z", ProcedureState::Scheduled)
            .await;

        let err = registry.deactivate_room(&room.id).await.unwrap_err();
        assert!(matches!(err, CoreError::HasPendingBookings { pending: 1, .. }));
    }

    #[tokio::test]
    async fn test_deactivate_allowed_once_booking_cancelled() {
        let (registry, store) = registry();
        let room = registry.create_room(new_room("Theatre A")).await.unwrap();
        park_procedure(&store, "p1", &room.id, "2030-06-01T08:00:00Z", ProcedureState::Cancelled)
            .await;

        let room = registry.deactivate_room(&room.id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Inactive);
    }

    #[tokio::test]
    async fn test_deactivate_ignores_past_bookings() {
        let (registry, store) = registry();
        let room = registry.create_room(new_room("Theatre A")).await.unwrap();
        park_procedure(&store, "p1", &room.id, "2020-06-01T08:00:00Z", ProcedureState::Scheduled)
            .await;

        assert!(registry.deactivate_room(&room.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_rooms_pagination_contract() {
        let (registry, _) = registry();
        for name in ["A", "B", "C"] {
            registry.create_room(new_room(name)).await.unwrap();
        }
        let page = registry
            .list_rooms(&RoomFilter::new(), 2, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page.limit, 2);
        assert_eq!(page.offset, 0);
    }
}
