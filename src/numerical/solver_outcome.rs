//! Outcome of a solver run and the termination policy shared by every iterative method.
use crate::numerical::iteration_trace::MethodId;
use crate::somelinalg::dense_matrix::LinalgError;
use crate::symbolic::symbolic_engine::{DomainError, ParseError};
use log::warn;
use thiserror::Error;

/// Error of a single row of the trace before any iteration has run.
pub const INITIAL_ERROR: f64 = 100.0;
pub const DEFAULT_TOLERANCE: f64 = 1e-7;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Every way a numerical method can fail. The `Display` text is the reason reported to the
/// caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Linalg(#[from] LinalgError),
    #[error("Derivative is zero")]
    ZeroDerivative,
    #[error("Division by zero")]
    ZeroDenominator,
    #[error("Method failed in {niter} iterations")]
    ConvergenceFailure { niter: usize },
    #[error("{0}")]
    Validation(String),
}

impl NumericError {
    pub fn validation(reason: impl Into<String>) -> Self {
        NumericError::Validation(reason.into())
    }

    /// A singular system is reported as a failure of the method that assembled it; other
    /// linear algebra errors pass through.
    pub fn singular_system(method: MethodId, error: LinalgError) -> Self {
        match error {
            LinalgError::Singular { .. } => {
                warn!("{}: {}", method, error);
                NumericError::validation(format!("The {} system is singular", method))
            }
            other => other.into(),
        }
    }
}

/// Result of one method call as seen from outside the engine: a converged value or the
/// reason it failed. Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome<T> {
    Converged(T),
    Failed(NumericError),
}

impl<T> SolverOutcome<T> {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolverOutcome::Converged(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SolverOutcome::Converged(value) => Some(value),
            SolverOutcome::Failed(_) => None,
        }
    }

    /// Human-readable failure reason, `None` on success.
    pub fn reason(&self) -> Option<String> {
        match self {
            SolverOutcome::Converged(_) => None,
            SolverOutcome::Failed(error) => Some(error.to_string()),
        }
    }

    pub fn into_result(self) -> Result<T, NumericError> {
        match self {
            SolverOutcome::Converged(value) => Ok(value),
            SolverOutcome::Failed(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, NumericError>> for SolverOutcome<T> {
    fn from(result: Result<T, NumericError>) -> Self {
        match result {
            Ok(value) => SolverOutcome::Converged(value),
            Err(error) => SolverOutcome::Failed(error),
        }
    }
}

/// Termination policy: stop when the step error drops below `tolerance`, give up after
/// `max_iterations`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationControl {
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Divide the step by the magnitude of the new approximation.
    pub relative_error: bool,
}

impl Default for IterationControl {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            relative_error: false,
        }
    }
}

impl IterationControl {
    pub fn new(tolerance: f64, max_iterations: usize, relative_error: bool) -> Self {
        Self {
            tolerance,
            max_iterations,
            relative_error,
        }
    }

    /// Error of a step whose size is `step` and whose new approximation has magnitude
    /// `scale` (only used in relative mode).
    pub fn measure(&self, step: f64, scale: f64) -> Result<f64, DomainError> {
        if !self.relative_error {
            return Ok(step);
        }
        if scale == 0.0 {
            return Err(DomainError::RelativeErrorAtZero);
        }
        Ok(step / scale)
    }

    /// Error between two consecutive scalar approximations.
    pub fn step_error(&self, new: f64, old: f64) -> Result<f64, DomainError> {
        self.measure((new - old).abs(), new.abs())
    }

    pub fn is_met(&self, error: f64) -> bool {
        error < self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_control() {
        let control = IterationControl::default();
        assert_eq!(control.tolerance, 1e-7);
        assert_eq!(control.max_iterations, 100);
        assert!(!control.relative_error);
    }

    #[test]
    fn test_absolute_and_relative_error() {
        let absolute = IterationControl::new(1e-6, 10, false);
        assert_eq!(absolute.step_error(2.0, 1.5).unwrap(), 0.5);
        let relative = IterationControl::new(1e-6, 10, true);
        assert_eq!(relative.step_error(2.0, 1.5).unwrap(), 0.25);
        assert_eq!(
            relative.step_error(0.0, 1.0),
            Err(DomainError::RelativeErrorAtZero)
        );
    }

    #[test]
    fn test_tolerance_is_strict() {
        let control = IterationControl::new(1e-3, 10, false);
        assert!(control.is_met(9e-4));
        assert!(!control.is_met(1e-3));
    }

    #[test]
    fn test_outcome_reason_is_the_error_message() {
        let failed: SolverOutcome<f64> = Err(NumericError::ConvergenceFailure { niter: 7 }).into();
        assert!(!failed.is_converged());
        assert_eq!(failed.reason().unwrap(), "Method failed in 7 iterations");
        let failed: SolverOutcome<f64> =
            SolverOutcome::Failed(NumericError::validation("W must be between 0 and 2"));
        assert_eq!(failed.reason().unwrap(), "W must be between 0 and 2");
        let ok: SolverOutcome<f64> = Ok(1.5).into();
        assert_eq!(ok.value(), Some(&1.5));
        assert_eq!(ok.reason(), None);
    }

    #[test]
    fn test_wrapped_errors_keep_their_message() {
        let error: NumericError = DomainError::DivisionByZero { at: 0.0 }.into();
        assert_eq!(error.to_string(), "division by zero at x = 0");
        let error: NumericError = ParseError::Empty.into();
        assert_eq!(error.to_string(), "empty expression");
    }
}
