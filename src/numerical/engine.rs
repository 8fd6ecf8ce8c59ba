//! Text-level entry points: every operation takes the formulas and numeric parameters as
//! the caller typed them, runs one method and returns a [`SolverOutcome`]. Nothing here
//! panics or returns an error; every failure becomes `SolverOutcome::Failed`.
//!
//! # Example
//! ```
//! use veritas_numeris::numerical::engine;
//! let outcome = engine::bisection("1", "2", "x^2 - 2", 1e-6, 100, false);
//! let solution = outcome.value().unwrap();
//! assert!((solution.root - 1.41421356).abs() < 1e-6);
//!
//! let outcome = engine::newton("1", "1", 1e-7, 100, false);
//! assert_eq!(outcome.reason().unwrap(), "Derivative is zero");
//! ```
use crate::numerical::compare::{
    Comparison, RootProblem, compare_interpolation_methods, compare_linear_methods,
    compare_root_methods,
};
use crate::numerical::interpolation::polynomial::{
    LagrangeResult, NewtonResult, VandermondeResult,
};
use crate::numerical::interpolation::splines::SplineResult;
use crate::numerical::interpolation::{polynomial, splines};
use crate::numerical::iteration_trace::{BracketRow, OpenRow};
use crate::numerical::root_finding::{RootFinder, RootSolution};
use crate::numerical::solver_outcome::{IterationControl, NumericError, SolverOutcome};
use crate::somelinalg::iterative_solvers_cpu::{
    IterativeMethod, StationarySolution, StationarySolver,
};
use crate::symbolic::symbolic_engine::Expr;

fn finder(tol: f64, niter: usize, relative: bool) -> RootFinder {
    RootFinder::new(IterationControl::new(tol, niter, relative))
}

fn parse_function(text: &str) -> Result<Expr, NumericError> {
    Ok(Expr::parse_expression(text)?)
}

fn parse_param(text: &str) -> Result<f64, NumericError> {
    Ok(Expr::parse_param(text)?)
}

// ROOT FINDING

pub fn bisection(
    a: &str,
    b: &str,
    fx: &str,
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<RootSolution<BracketRow>> {
    let run = || {
        let (a, b, f) = (parse_param(a)?, parse_param(b)?, parse_function(fx)?);
        finder(tol, niter, relative).bisection(&f, a, b)
    };
    run().into()
}

pub fn false_position(
    a: &str,
    b: &str,
    fx: &str,
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<RootSolution<BracketRow>> {
    let run = || {
        let (a, b, f) = (parse_param(a)?, parse_param(b)?, parse_function(fx)?);
        finder(tol, niter, relative).false_position(&f, a, b)
    };
    run().into()
}

pub fn fixed_point(
    x0: &str,
    fx: &str,
    gx: &str,
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<RootSolution<OpenRow>> {
    let run = || {
        let (x0, f, g) = (parse_param(x0)?, parse_function(fx)?, parse_function(gx)?);
        finder(tol, niter, relative).fixed_point(&f, &g, x0)
    };
    run().into()
}

pub fn newton(
    x0: &str,
    fx: &str,
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<RootSolution<OpenRow>> {
    let run = || {
        let (x0, f) = (parse_param(x0)?, parse_function(fx)?);
        finder(tol, niter, relative).newton(&f, x0)
    };
    run().into()
}

pub fn multiple_roots(
    x0: &str,
    fx: &str,
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<RootSolution<OpenRow>> {
    let run = || {
        let (x0, f) = (parse_param(x0)?, parse_function(fx)?);
        finder(tol, niter, relative).multiple_roots(&f, x0)
    };
    run().into()
}

pub fn secant(
    x0: &str,
    x1: &str,
    fx: &str,
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<RootSolution<OpenRow>> {
    let run = || {
        let (x0, x1, f) = (parse_param(x0)?, parse_param(x1)?, parse_function(fx)?);
        finder(tol, niter, relative).secant(&f, x0, x1)
    };
    run().into()
}

/// Builds a [`RootProblem`] from text; empty optional fields are left out.
pub fn root_problem(
    fx: &str,
    gx: Option<&str>,
    bracket: Option<(&str, &str)>,
    x0: Option<&str>,
    x1: Option<&str>,
) -> Result<RootProblem, NumericError> {
    Ok(RootProblem {
        f: parse_function(fx)?,
        g: gx.map(parse_function).transpose()?,
        bracket: bracket
            .map(|(a, b)| Ok::<_, NumericError>((parse_param(a)?, parse_param(b)?)))
            .transpose()?,
        x0: x0.map(parse_param).transpose()?,
        x1: x1.map(parse_param).transpose()?,
    })
}

pub fn compare_roots(
    problem: &RootProblem,
    tol: f64,
    niter: usize,
    relative: bool,
) -> Comparison {
    compare_root_methods(&finder(tol, niter, relative), problem)
}

// INTERPOLATION

pub fn vandermonde(x: &[f64], y: &[f64]) -> SolverOutcome<VandermondeResult> {
    polynomial::vandermonde(x, y).into()
}

pub fn newton_interpolation(x: &[f64], y: &[f64]) -> SolverOutcome<NewtonResult> {
    polynomial::newton_divided_differences(x, y).into()
}

pub fn lagrange(x: &[f64], y: &[f64]) -> SolverOutcome<LagrangeResult> {
    polynomial::lagrange(x, y).into()
}

pub fn linear_spline(x: &[f64], y: &[f64]) -> SolverOutcome<SplineResult> {
    splines::linear_spline(x, y).into()
}

pub fn cubic_spline(x: &[f64], y: &[f64]) -> SolverOutcome<SplineResult> {
    splines::cubic_spline(x, y).into()
}

pub fn compare_interpolation(x: &[f64], y: &[f64]) -> Comparison {
    compare_interpolation_methods(x, y)
}

// LINEAR SYSTEMS

fn stationary(tol: f64, niter: usize, relative: bool) -> StationarySolver {
    StationarySolver::new(IterationControl::new(tol, niter, relative))
}

pub fn jacobi(
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<StationarySolution> {
    stationary(tol, niter, relative)
        .solve(IterativeMethod::Jacobi, a, b, x0)
        .into()
}

pub fn gauss_seidel(
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<StationarySolution> {
    stationary(tol, niter, relative)
        .solve(IterativeMethod::GaussSeidel, a, b, x0)
        .into()
}

#[allow(clippy::too_many_arguments)]
pub fn sor(
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    w: f64,
    tol: f64,
    niter: usize,
    relative: bool,
) -> SolverOutcome<StationarySolution> {
    stationary(tol, niter, relative)
        .solve(IterativeMethod::Sor { w }, a, b, x0)
        .into()
}

pub fn compare_linear(
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    w: f64,
    tol: f64,
    niter: usize,
    relative: bool,
) -> Comparison {
    compare_linear_methods(&stationary(tol, niter, relative), a, b, x0, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::ParseError;
    use approx::assert_relative_eq;

    #[test]
    fn test_bisection_outcomes() {
        let outcome = bisection("1", "2", "x^2-2", 1e-6, 100, false);
        assert_relative_eq!(outcome.value().unwrap().root, 1.41421356, epsilon = 1e-6);
        // no sign change on [0, 1]
        let outcome = bisection("0", "1", "x^2-2", 1e-6, 100, false);
        assert_eq!(outcome.reason().unwrap(), "[0, 1] is not a valid interval");
    }

    #[test]
    fn test_parameters_are_expressions() {
        let outcome = newton("pi/4", "cos(x) - x", 1e-10, 100, false);
        assert_relative_eq!(
            outcome.value().unwrap().root,
            0.7390851332151607,
            epsilon = 1e-9
        );
        let outcome = newton("x", "cos(x) - x", 1e-10, 100, false);
        assert!(matches!(
            outcome,
            SolverOutcome::Failed(NumericError::Parse(ParseError::NotConstant(_)))
        ));
    }

    #[test]
    fn test_decimal_parameters_and_formulas() {
        let outcome = newton("1", "x^2 - 2.25", 1e-10, 100, false);
        assert_relative_eq!(outcome.value().unwrap().root, 1.5, epsilon = 1e-9);
        let outcome = bisection("0.5", "1.7", "x - 1.6", 1e-8, 100, false);
        assert_relative_eq!(outcome.value().unwrap().root, 1.6, epsilon = 1e-7);
        let outcome = secant("0.5", "1.5", "x^0.5 - 1.1", 1e-10, 100, false);
        assert_relative_eq!(outcome.value().unwrap().root, 1.21, epsilon = 1e-9);
    }

    #[test]
    fn test_data_far_from_unit_scale() {
        let years = [2000.0, 2001.0, 2002.0, 2003.0, 2004.0];
        let values = [1.0, 3.0, 2.0, -1.0, 0.5];
        assert!(cubic_spline(&years, &values).is_converged());
        let small = [1e-4, 2e-4, 3e-4, 4e-4, 5e-4];
        assert!(vandermonde(&small, &values).is_converged());
        let a = vec![vec![1e-9, 0.0], vec![0.0, 1e9]];
        let outcome = jacobi(&a, &[1e-9, 1e9], &[0.0, 0.0], 1e-10, 10, false);
        let x = &outcome.value().unwrap().x;
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_errors_become_failures() {
        let outcome = secant("1", "2", "x^2 +* 2", 1e-6, 100, false);
        assert!(matches!(
            outcome,
            SolverOutcome::Failed(NumericError::Parse(_))
        ));
        assert!(outcome.reason().is_some());
        let outcome = fixed_point("1", "x - y", "x", 1e-6, 100, false);
        assert_eq!(
            outcome.reason().unwrap(),
            "unknown symbol 'y', expressions are written in the variable 'x'"
        );
    }

    #[test]
    fn test_newton_on_constant() {
        let outcome = newton("1", "1", 1e-7, 100, false);
        assert_eq!(outcome, SolverOutcome::Failed(NumericError::ZeroDerivative));
    }

    #[test]
    fn test_interpolation_outcomes() {
        let outcome = vandermonde(&[1.0, 2.0, 3.0], &[1.0, 4.0, 9.0]);
        assert_eq!(outcome.value().unwrap().polynomial, "1x^2 + 0x + 0");
        let outcome = lagrange(&[1.0, 1.0], &[1.0, 4.0]);
        assert_eq!(outcome.reason().unwrap(), "duplicate x-coordinates");
        assert!(cubic_spline(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).is_converged());
        assert!(linear_spline(&[0.0, 1.0], &[0.0, 1.0]).is_converged());
        assert!(newton_interpolation(&[0.0, 1.0], &[0.0, 1.0]).is_converged());
    }

    #[test]
    fn test_linear_outcomes() {
        let a = vec![vec![4.0, 1.0], vec![1.0, 3.0]];
        let outcome = jacobi(&a, &[1.0, 2.0], &[0.0, 0.0], 1e-6, 50, false);
        let x = &outcome.value().unwrap().x;
        assert_relative_eq!(x[0], 1.0 / 11.0, epsilon = 1e-5);
        assert_relative_eq!(x[1], 7.0 / 11.0, epsilon = 1e-5);
        let outcome = sor(&a, &[1.0, 2.0], &[0.0, 0.0], -0.5, 1e-6, 50, false);
        assert_eq!(outcome.reason().unwrap(), "W must be between 0 and 2");
        let outcome = gauss_seidel(&a, &[1.0, 2.0], &[0.0, 0.0], 1e-12, 2, false);
        assert_eq!(outcome.reason().unwrap(), "Method failed in 2 iterations");
    }

    #[test]
    fn test_root_problem_from_text() {
        let problem = root_problem("x^2 - 2", None, Some(("1", "2")), Some("1"), None).unwrap();
        assert_eq!(problem.bracket, Some((1.0, 2.0)));
        assert_eq!(problem.x1, None);
        let comparison = compare_roots(&problem, 1e-8, 100, false);
        assert_eq!(comparison.reports.len(), 4);
        assert!(root_problem("x^2 - 2", Some("x +"), None, None, None).is_err());
    }
}
