//! Scheduling engine for SurgiSched: room registry, availability checking
//! and the procedure lifecycle state machine.
//!
//! Everything here works against the repository traits in
//! `surgisched-storage`; the per-room lock registry in [`locks`] is what
//! turns the read-then-decide availability check into an exclusive
//! check-and-write.

pub mod availability;
pub mod directory;
pub mod lifecycle;
pub mod locks;
pub mod registry;

pub use availability::{Availability, AvailabilityChecker};
pub use directory::{
    Admission, AdmissionDirectory, AdmissionState, InMemoryAdmissionDirectory,
    InMemoryStaffDirectory, PersonRef, StaffDirectory,
};
pub use lifecycle::ProcedureLifecycle;
pub use locks::RoomLocks;
pub use registry::{RoomDetails, RoomRegistry};
