use crate::time::{ScheduleDateTime, now_utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoomStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
        }
    }
}

/// A bookable operating room. Rooms are never hard-deleted; deactivation
/// flips `status` and leaves existing bookings untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub room_type: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub equipment: Vec<String>,
    pub status: RoomStatus,
    pub created_at: ScheduleDateTime,
    pub updated_at: ScheduleDateTime,
}

impl Room {
    pub fn new(id: String, data: NewRoom) -> Self {
        let now = now_utc();
        Self {
            id,
            name: data.name,
            room_type: data.room_type,
            location: data.location,
            capacity: data.capacity,
            equipment: data.equipment,
            status: RoomStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, RoomStatus::Active)
    }

    pub fn deactivate(&mut self) {
        self.status = RoomStatus::Inactive;
        self.updated_at = now_utc();
    }

    /// Applies a partial update. Fields absent from the patch keep their
    /// current value.
    pub fn apply_patch(&mut self, patch: RoomPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(room_type) = patch.room_type {
            self.room_type = room_type;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = Some(capacity);
        }
        if let Some(equipment) = patch.equipment {
            self.equipment = equipment;
        }
        self.updated_at = now_utc();
    }
}

/// Payload for room creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub name: String,
    pub room_type: String,
    pub location: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// Partial room update; `None` means unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub equipment: Option<Vec<String>>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.room_type.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.equipment.is_none()
    }
}
