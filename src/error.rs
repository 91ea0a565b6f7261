// src/error.rs - Planner error taxonomy
use thiserror::Error;

/// Errors returned by input validation, the calculator and the online planner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OtgError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("DOF {dof}: zero limit while motion is required")]
    ZeroLimits { dof: usize },
    #[error("DOF {dof}: positional limits violated")]
    PositionalLimitsViolated { dof: usize },
    #[error("DOF {dof}: no valid minimum-time profile")]
    StepCalculationFailed { dof: usize },
    #[error("DOF {dof}: no profile with duration {duration}")]
    SynchronizationFailed { dof: usize, duration: f64 },
    #[error("DOF mismatch: expected {expected}, got {actual}")]
    DofMismatch { expected: usize, actual: usize },
    #[error("Waypoint planning failed: {0}")]
    Offload(String),
}

/// Fieldless discriminant of [`OtgError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    ZeroLimits,
    PositionalLimitsViolated,
    StepCalculationFailed,
    SynchronizationFailed,
    DofMismatch,
    Offload,
}

impl OtgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OtgError::InvalidInput(_) => ErrorKind::InvalidInput,
            OtgError::ZeroLimits { .. } => ErrorKind::ZeroLimits,
            OtgError::PositionalLimitsViolated { .. } => ErrorKind::PositionalLimitsViolated,
            OtgError::StepCalculationFailed { .. } => ErrorKind::StepCalculationFailed,
            OtgError::SynchronizationFailed { .. } => ErrorKind::SynchronizationFailed,
            OtgError::DofMismatch { .. } => ErrorKind::DofMismatch,
            OtgError::Offload(_) => ErrorKind::Offload,
        }
    }

    /// DOF the error refers to, if any.
    pub fn dof(&self) -> Option<usize> {
        match self {
            OtgError::ZeroLimits { dof }
            | OtgError::PositionalLimitsViolated { dof }
            | OtgError::StepCalculationFailed { dof }
            | OtgError::SynchronizationFailed { dof, .. } => Some(*dof),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_dof() {
        let err = OtgError::SynchronizationFailed { dof: 2, duration: 1.5 };
        assert_eq!(err.kind(), ErrorKind::SynchronizationFailed);
        assert_eq!(err.dof(), Some(2));
        assert_eq!(err.to_string(), "DOF 2: no profile with duration 1.5");
        assert_eq!(OtgError::InvalidInput("x".into()).dof(), None);
    }
}
