use std::sync::Arc;

use crate::config::{AppConfig, PaginationConfig};
use surgisched_db_memory::InMemoryStore;
use surgisched_scheduling::{
    InMemoryAdmissionDirectory, InMemoryStaffDirectory, ProcedureLifecycle, RoomLocks,
    RoomRegistry,
};

/// Shared application state handed to every handler.
///
/// The bundled deployment wires the in-memory backend and in-memory
/// collaborator directories; the engine itself only sees the trait objects.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub lifecycle: Arc<ProcedureLifecycle>,
    pub admissions: Arc<InMemoryAdmissionDirectory>,
    pub staff: Arc<InMemoryStaffDirectory>,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let admissions = Arc::new(InMemoryAdmissionDirectory::new());
        let staff = Arc::new(InMemoryStaffDirectory::new());
        let locks = Arc::new(RoomLocks::new());

        let registry = Arc::new(RoomRegistry::new(
            store.clone(),
            store.clone(),
            cfg.scheduling.clone(),
        ));
        let lifecycle = Arc::new(ProcedureLifecycle::new(
            store.clone(),
            store,
            admissions.clone(),
            locks,
            cfg.scheduling.clone(),
        ));

        Self {
            registry,
            lifecycle,
            admissions,
            staff,
            pagination: cfg.pagination,
        }
    }
}
