use crate::procedure::{ProcedureComplexity, ProcedurePriority};
use serde::{Deserialize, Serialize};

/// The single table of "if absent, use this" rules consulted by procedure
/// creation, patching, rescheduling and the availability checker. Keeping
/// them in one struct stops the booking and conflict-checking paths from
/// drifting apart on the assumed duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingDefaults {
    /// Assumed procedure length when `estimatedDurationMinutes` is unset.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
    #[serde(default)]
    pub default_priority: ProcedurePriority,
    #[serde(default)]
    pub default_complexity: ProcedureComplexity,
    /// Upper bound on how long any single procedure can plausibly run.
    /// The availability checker looks this far back for candidates whose
    /// interval may still reach into the proposed one.
    #[serde(default = "default_max_plausible_duration_minutes")]
    pub max_plausible_duration_minutes: u32,
    /// How many upcoming procedures a room read includes.
    #[serde(default = "default_room_lookahead")]
    pub room_lookahead: usize,
}

fn default_duration_minutes() -> u32 {
    60
}

fn default_max_plausible_duration_minutes() -> u32 {
    1440
}

fn default_room_lookahead() -> usize {
    5
}

impl Default for SchedulingDefaults {
    fn default() -> Self {
        Self {
            default_duration_minutes: default_duration_minutes(),
            default_priority: ProcedurePriority::default(),
            default_complexity: ProcedureComplexity::default(),
            max_plausible_duration_minutes: default_max_plausible_duration_minutes(),
            room_lookahead: default_room_lookahead(),
        }
    }
}

impl SchedulingDefaults {
    /// Effective duration for a procedure given its optional estimate.
    pub fn duration_or_default(&self, estimated: Option<u32>) -> u32 {
        estimated.unwrap_or(self.default_duration_minutes)
    }
}
