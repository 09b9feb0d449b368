use thiserror::Error;

/// Errors reported by the integrators and the Newton solver.
///
/// Every failure is returned to the immediate caller; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// A numeric argument is outside its valid range (non-positive step size,
    /// zero step count, empty or reversed interval, ...).
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A caller-supplied function returned a vector or matrix of the wrong shape.
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// The linear solve for the Newton update could not proceed.
    #[error("Jacobian is singular at iteration {iteration}")]
    SingularJacobian { iteration: usize },

    /// Newton-Raphson used up its iteration budget without meeting the tolerance.
    #[error("Newton solver failed to converge in {max_steps} steps (‖Δ‖ = {step_norm:e})")]
    Convergence { max_steps: usize, step_norm: f64 },
}

impl SolverError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SolverError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::SolverError;

    #[test]
    fn messages_name_the_offending_parameter() {
        let err = SolverError::invalid("h", "step size must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter `h`: step size must be positive"
        );
    }

    #[test]
    fn convergence_message_reports_budget() {
        let err = SolverError::Convergence {
            max_steps: 20,
            step_norm: 0.5,
        };
        assert!(err.to_string().contains("20 steps"));
    }
}
