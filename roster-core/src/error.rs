use thiserror::Error;

/// The error taxonomy surfaced at the crate boundary. Every variant maps to one of the
/// response shapes of the external interface (`validation_error`, `solver_error`, `error`).
#[derive(Error, Debug, Clone)]
pub enum RosterError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("min_N too low: provided {provided}, must be >= {lower_bound} (valid range [{lower_bound}, {upper_bound}])")]
    MinNTooLow { provided: i64, lower_bound: i64, upper_bound: i64 },

    #[error("min_N too high: provided {provided}, must be <= {upper_bound} (valid range [{lower_bound}, {upper_bound}])")]
    MinNTooHigh { provided: i64, lower_bound: i64, upper_bound: i64 },

    #[error("too many low-grade nurses: {count} low-grade nurses exceed the tightest per-day slot of {tightest}")]
    LowGradeOverflow { count: usize, tightest: i64 },

    #[error("solver error: {0}")]
    Solver(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RosterError {
    /// The `status` discriminant used in the JSON error response (spec.md §6).
    pub fn status(&self) -> &'static str {
        match self {
            RosterError::Config(_)
            | RosterError::Validation(_)
            | RosterError::MinNTooLow { .. }
            | RosterError::MinNTooHigh { .. }
            | RosterError::LowGradeOverflow { .. } => "validation_error",
            RosterError::Solver(_) => "solver_error",
            RosterError::Internal(_) => "error",
        }
    }
}

pub type RosterResult<T> = Result<T, RosterError>;
