//! Numerical methods of one variable and stationary iterations for linear systems.
//!
//! Example: every text-level operation returns a [`solver_outcome::SolverOutcome`]
//! ```
//! use veritas_numeris::numerical::engine;
//! let outcome = engine::secant("1", "2", "x^2 - 2", 1e-8, 100, false);
//! assert!(outcome.is_converged());
//! let table = outcome.value().unwrap().trace.as_ref().unwrap().to_table();
//! println!("{}", table);
//! ```
/// ranking of every applicable method of one family on the same problem
pub mod compare;
/// text-level entry points: parse the inputs, run one method, never panic
pub mod engine;
/// Vandermonde, Newton divided differences, Lagrange, linear and natural cubic splines
pub mod interpolation;
/// per-method trace tables and method identifiers
pub mod iteration_trace;
/// bisection, false position, fixed point, Newton, multiple roots and secant
pub mod root_finding;
/// errors, outcomes and the shared termination policy
pub mod solver_outcome;
