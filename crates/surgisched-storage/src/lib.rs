//! Storage abstraction for the SurgiSched scheduling engine.
//!
//! The engine and room registry depend on the narrow repository traits
//! defined here rather than on any concrete query mechanism.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{ProcedureRepository, RoomRepository};
pub use types::{Page, RoomFilter};
