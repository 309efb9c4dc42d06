//! External-collaborator lookups consumed by the engine.
//!
//! Admissions and the patient/clinician directory belong to other
//! subsystems; the engine only needs the narrow read contracts below. The
//! in-memory implementations back the bundled server and the tests.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionState {
    Active,
    Discharged,
    Closed,
}

impl AdmissionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for AdmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Discharged => write!(f, "discharged"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    pub id: String,
    pub state: AdmissionState,
}

/// Read-only admission lookup.
#[async_trait]
pub trait AdmissionDirectory: Send + Sync {
    async fn get_admission(&self, id: &str) -> Option<Admission>;
}

/// Display projection of a patient or clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub id: String,
    pub display_name: String,
}

/// Read-only patient/clinician directory.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get_patient(&self, id: &str) -> Option<PersonRef>;
    async fn get_clinician(&self, id: &str) -> Option<PersonRef>;
}

#[derive(Debug, Default)]
pub struct InMemoryAdmissionDirectory {
    admissions: DashMap<String, Admission>,
}

impl InMemoryAdmissionDirectory {
    pub fn new() -> Self {
        Self {
            admissions: DashMap::new(),
        }
    }

    pub fn put(&self, admission: Admission) {
        self.admissions.insert(admission.id.clone(), admission);
    }
}

#[async_trait]
impl AdmissionDirectory for InMemoryAdmissionDirectory {
    async fn get_admission(&self, id: &str) -> Option<Admission> {
        self.admissions.get(id).map(|entry| entry.value().clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStaffDirectory {
    patients: DashMap<String, PersonRef>,
    clinicians: DashMap<String, PersonRef>,
}

impl InMemoryStaffDirectory {
    pub fn new() -> Self {
        Self {
            patients: DashMap::new(),
            clinicians: DashMap::new(),
        }
    }

    pub fn put_patient(&self, person: PersonRef) {
        self.patients.insert(person.id.clone(), person);
    }

    pub fn put_clinician(&self, person: PersonRef) {
        self.clinicians.insert(person.id.clone(), person);
    }
}

#[async_trait]
impl StaffDirectory for InMemoryStaffDirectory {
    async fn get_patient(&self, id: &str) -> Option<PersonRef> {
        self.patients.get(id).map(|entry| entry.value().clone())
    }

    async fn get_clinician(&self, id: &str) -> Option<PersonRef> {
        self.clinicians.get(id).map(|entry| entry.value().clone())
    }
}
