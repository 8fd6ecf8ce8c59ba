//! # Root finding for f(x) = 0
//!
//! Six iteration schemes over a parsed [`Expr`], sharing one termination policy
//! ([`IterationControl`]) and one trace layout per family:
//! - bracketing ([`bracketing`]): bisection, false position. Trace columns `n, a, xm, b, f(xm), error`
//! - open ([`open_methods`]): fixed point, Newton, modified Newton for multiple roots, secant.
//!   Trace columns `n, x, f(x), error`
//!
//! A run converges when the step error drops strictly below the tolerance and fails with
//! `"Method failed in {niter} iterations"` when the iteration budget runs out first.
//! A root found before the first update (at an endpoint or a seed) is returned without a trace.
//!
//! # Example
//! ```
//! use veritas_numeris::numerical::root_finding::RootFinder;
//! use veritas_numeris::numerical::solver_outcome::IterationControl;
//! use veritas_numeris::symbolic::symbolic_engine::Expr;
//! let f = Expr::parse_expression("x^2 - 2").unwrap();
//! let finder = RootFinder::new(IterationControl::new(1e-10, 100, false));
//! let solution = finder.newton(&f, 1.0).unwrap();
//! assert!((solution.root - 2.0_f64.sqrt()).abs() < 1e-10);
//! ```
pub mod bracketing;
pub mod open_methods;

use crate::numerical::iteration_trace::{IterationTrace, MethodId, TraceRow};
use crate::numerical::solver_outcome::{IterationControl, NumericError};
use log::warn;

/// A converged root and, if any update was performed, the trace that led to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSolution<R: TraceRow> {
    pub root: f64,
    pub trace: Option<IterationTrace<R>>,
}

impl<R: TraceRow> RootSolution<R> {
    fn immediate(root: f64) -> Self {
        Self { root, trace: None }
    }

    fn traced(root: f64, trace: IterationTrace<R>) -> Self {
        Self {
            root,
            trace: Some(trace),
        }
    }

    /// Completed iterations; 0 when the root was found before the loop.
    pub fn iterations(&self) -> usize {
        self.trace.as_ref().map_or(0, |trace| trace.iterations())
    }

    pub fn final_error(&self) -> f64 {
        self.trace.as_ref().map_or(0.0, |trace| trace.final_error())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RootFinder {
    control: IterationControl,
}

impl RootFinder {
    pub fn new(control: IterationControl) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &IterationControl {
        &self.control
    }

    fn budget_exhausted<T>(&self, method: MethodId, last_error: f64) -> Result<T, NumericError> {
        warn!(
            "{} did not converge in {} iterations, last error {:e}",
            method, self.control.max_iterations, last_error
        );
        Err(NumericError::ConvergenceFailure {
            niter: self.control.max_iterations,
        })
    }
}
