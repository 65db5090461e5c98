use thiserror::Error;

/// A rejected form field. The display string is shown to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// Failures of the creation flow. Deleting or focusing an unknown id is a
/// silent no-op, and corrupt persisted data is recovered as an empty
/// collection, so neither appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not determine your position")]
    LocationUnavailable,
}
