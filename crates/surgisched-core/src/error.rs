use thiserror::Error;

/// Core error types for SurgiSched operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Room not found: {id}")]
    RoomNotFound { id: String },

    #[error("Procedure not found: {id}")]
    ProcedureNotFound { id: String },

    #[error("Admission not found: {id}")]
    AdmissionNotFound { id: String },

    #[error("Room name already in use: {name}")]
    DuplicateRoomName { name: String },

    #[error("Operation '{operation}' is not allowed while the procedure is {state}")]
    InvalidTransition { operation: String, state: String },

    #[error("Procedure {id} is already completed")]
    AlreadyCompleted { id: String },

    #[error("Procedure {id} has been cancelled")]
    ProcedureCancelled { id: String },

    #[error("Room {room_id} is already booked by procedure {conflicting_procedure_id} in the requested interval")]
    RoomConflict {
        room_id: String,
        conflicting_procedure_id: String,
    },

    #[error("Admission {id} is not active (state: {state})")]
    AdmissionNotActive { id: String, state: String },

    #[error("Room {id} has {pending} upcoming scheduled procedure(s) and cannot be deactivated")]
    HasPendingBookings { id: String, pending: usize },

    #[error("Invalid timestamp: {0}")]
    InvalidDateTime(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Create a new RoomNotFound error
    pub fn room_not_found(id: impl Into<String>) -> Self {
        Self::RoomNotFound { id: id.into() }
    }

    /// Create a new ProcedureNotFound error
    pub fn procedure_not_found(id: impl Into<String>) -> Self {
        Self::ProcedureNotFound { id: id.into() }
    }

    /// Create a new AdmissionNotFound error
    pub fn admission_not_found(id: impl Into<String>) -> Self {
        Self::AdmissionNotFound { id: id.into() }
    }

    /// Create a new DuplicateRoomName error
    pub fn duplicate_room_name(name: impl Into<String>) -> Self {
        Self::DuplicateRoomName { name: name.into() }
    }

    /// Create a new InvalidTransition error
    pub fn invalid_transition(operation: impl Into<String>, state: impl Into<String>) -> Self {
        Self::InvalidTransition {
            operation: operation.into(),
            state: state.into(),
        }
    }

    /// Create a new AlreadyCompleted error
    pub fn already_completed(id: impl Into<String>) -> Self {
        Self::AlreadyCompleted { id: id.into() }
    }

    /// Create a new ProcedureCancelled error
    pub fn procedure_cancelled(id: impl Into<String>) -> Self {
        Self::ProcedureCancelled { id: id.into() }
    }

    /// Create a new RoomConflict error carrying the colliding procedure's id
    pub fn room_conflict(
        room_id: impl Into<String>,
        conflicting_procedure_id: impl Into<String>,
    ) -> Self {
        Self::RoomConflict {
            room_id: room_id.into(),
            conflicting_procedure_id: conflicting_procedure_id.into(),
        }
    }

    /// Create a new AdmissionNotActive error
    pub fn admission_not_active(id: impl Into<String>, state: impl Into<String>) -> Self {
        Self::AdmissionNotActive {
            id: id.into(),
            state: state.into(),
        }
    }

    /// Create a new HasPendingBookings error
    pub fn has_pending_bookings(id: impl Into<String>, pending: usize) -> Self {
        Self::HasPendingBookings {
            id: id.into(),
            pending,
        }
    }

    /// Create a new InvalidRequest error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, used by the API layer for status mapping
    /// and by clients for display-text selection.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoomNotFound { .. }
            | Self::ProcedureNotFound { .. }
            | Self::AdmissionNotFound { .. } => "not-found",
            Self::DuplicateRoomName { .. } => "duplicate-name",
            Self::InvalidTransition { .. } => "invalid-state",
            Self::AlreadyCompleted { .. } => "already-completed",
            Self::ProcedureCancelled { .. } => "cancelled",
            Self::RoomConflict { .. } => "room-conflict",
            Self::AdmissionNotActive { .. } => "admission-not-active",
            Self::HasPendingBookings { .. } => "has-pending-bookings",
            Self::InvalidDateTime(_) | Self::InvalidRequest(_) => "invalid-request",
            Self::Internal { .. } => "internal",
        }
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RoomNotFound { .. }
            | Self::ProcedureNotFound { .. }
            | Self::AdmissionNotFound { .. } => ErrorCategory::NotFound,
            Self::DuplicateRoomName { .. }
            | Self::RoomConflict { .. }
            | Self::HasPendingBookings { .. } => ErrorCategory::Conflict,
            Self::InvalidTransition { .. }
            | Self::AlreadyCompleted { .. }
            | Self::ProcedureCancelled { .. } => ErrorCategory::Lifecycle,
            Self::AdmissionNotActive { .. }
            | Self::InvalidDateTime(_)
            | Self::InvalidRequest(_) => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Lifecycle,
    Validation,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Lifecycle => write!(f, "lifecycle"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
