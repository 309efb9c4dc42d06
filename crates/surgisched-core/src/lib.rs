pub mod defaults;
pub mod error;
pub mod id;
pub mod interval;
pub mod procedure;
pub mod room;
pub mod time;

pub use defaults::SchedulingDefaults;
pub use error::{CoreError, ErrorCategory, Result};
pub use id::generate_id;
pub use interval::TimeSlot;
pub use procedure::{
    CompleteProcedure, LifecycleOp, NewProcedure, Procedure, ProcedureComplexity, ProcedurePatch,
    ProcedurePriority, ProcedureState,
};
pub use room::{NewRoom, Room, RoomPatch, RoomStatus};
pub use time::{ScheduleDateTime, elapsed_minutes, now_utc};
