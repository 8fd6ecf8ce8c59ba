//! "Run every applicable method and pick the best" for each family of methods.
//!
//! Iterative families (root finding, linear systems) rank converged runs by iteration count,
//! then by final error; a root found before any iteration counts as 0 iterations.
//! Interpolation ranks by the largest residual at the data points, then by method order.
//! Failed runs are reported but never ranked.
use crate::numerical::interpolation::Interpolant;
use crate::numerical::interpolation::polynomial::{lagrange, newton_divided_differences, vandermonde};
use crate::numerical::interpolation::splines::{cubic_spline, linear_spline};
use crate::numerical::iteration_trace::{MethodFamily, MethodId, TraceRow};
use crate::numerical::root_finding::{RootFinder, RootSolution};
use crate::numerical::solver_outcome::NumericError;
use crate::somelinalg::iterative_solvers_cpu::{IterativeMethod, StationarySolver};
use crate::symbolic::symbolic_engine::Expr;
use log::info;
use std::cmp::Ordering;
use tabled::{builder::Builder, settings::Style};

/// One line of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReport {
    pub method: MethodId,
    pub iterations: usize,
    /// Final error for iterative methods, largest node residual for interpolation.
    pub score: f64,
    /// Root, solution vector or polynomial, as text.
    pub result: String,
    /// Failure reason; `None` for a converged run.
    pub failure: Option<String>,
}

impl MethodReport {
    fn failed(method: MethodId, error: NumericError) -> Self {
        Self {
            method,
            iterations: 0,
            score: f64::NAN,
            result: String::new(),
            failure: Some(error.to_string()),
        }
    }

    pub fn is_converged(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub family: MethodFamily,
    pub reports: Vec<MethodReport>,
}

impl Comparison {
    /// Converged reports, best first.
    pub fn ranked(&self) -> Vec<&MethodReport> {
        let mut converged: Vec<&MethodReport> =
            self.reports.iter().filter(|r| r.is_converged()).collect();
        let family = self.family;
        converged.sort_by(|a, b| rank(family, a, b));
        converged
    }

    pub fn best(&self) -> Option<&MethodReport> {
        self.ranked().into_iter().next()
    }

    pub fn to_table(&self) -> String {
        let score_name = match self.family {
            MethodFamily::Interpolation => "max residual",
            _ => "error",
        };
        let mut builder = Builder::default();
        builder.push_record(vec!["method", "iterations", score_name, "result"]);
        for report in &self.reports {
            match &report.failure {
                None => builder.push_record(vec![
                    report.method.to_string(),
                    report.iterations.to_string(),
                    format!("{:e}", report.score),
                    report.result.clone(),
                ]),
                Some(reason) => builder.push_record(vec![
                    report.method.to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    reason.clone(),
                ]),
            }
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

fn rank(family: MethodFamily, a: &MethodReport, b: &MethodReport) -> Ordering {
    match family {
        MethodFamily::Interpolation => a
            .score
            .total_cmp(&b.score)
            .then(a.method.cmp(&b.method)),
        MethodFamily::RootFinding | MethodFamily::LinearSystem => a
            .iterations
            .cmp(&b.iterations)
            .then(a.score.total_cmp(&b.score))
            .then(a.method.cmp(&b.method)),
    }
}

fn root_report<R: TraceRow>(
    method: MethodId,
    result: Result<RootSolution<R>, NumericError>,
) -> MethodReport {
    match result {
        Ok(solution) => MethodReport {
            method,
            iterations: solution.iterations(),
            score: solution.final_error(),
            result: solution.root.to_string(),
            failure: None,
        },
        Err(error) => MethodReport::failed(method, error),
    }
}

/// Inputs for comparing root finders; a method runs only when its inputs are present.
#[derive(Debug, Clone, PartialEq)]
pub struct RootProblem {
    pub f: Expr,
    /// Iteration function for fixed point.
    pub g: Option<Expr>,
    /// Bracket for bisection and false position.
    pub bracket: Option<(f64, f64)>,
    /// Seed for fixed point, Newton and multiple roots; first seed of secant.
    pub x0: Option<f64>,
    /// Second seed of secant.
    pub x1: Option<f64>,
}

pub fn compare_root_methods(finder: &RootFinder, problem: &RootProblem) -> Comparison {
    let f = &problem.f;
    let mut reports = Vec::new();
    if let Some((a, b)) = problem.bracket {
        reports.push(root_report(MethodId::Bisection, finder.bisection(f, a, b)));
        reports.push(root_report(
            MethodId::FalsePosition,
            finder.false_position(f, a, b),
        ));
    }
    if let Some(x0) = problem.x0 {
        if let Some(g) = &problem.g {
            reports.push(root_report(
                MethodId::FixedPoint,
                finder.fixed_point(f, g, x0),
            ));
        }
        reports.push(root_report(MethodId::Newton, finder.newton(f, x0)));
        reports.push(root_report(
            MethodId::MultipleRoots,
            finder.multiple_roots(f, x0),
        ));
        if let Some(x1) = problem.x1 {
            reports.push(root_report(MethodId::Secant, finder.secant(f, x0, x1)));
        }
    }
    let comparison = Comparison {
        family: MethodFamily::RootFinding,
        reports,
    };
    if let Some(best) = comparison.best() {
        info!("best root finder: {}", best.method);
    }
    comparison
}

fn format_vector(x: &[f64]) -> String {
    let items: Vec<String> = x.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Runs Jacobi, Gauss-Seidel and SOR with relaxation `w` on the same system.
pub fn compare_linear_methods(
    solver: &StationarySolver,
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    w: f64,
) -> Comparison {
    let reports = [
        IterativeMethod::Jacobi,
        IterativeMethod::GaussSeidel,
        IterativeMethod::Sor { w },
    ]
    .into_iter()
    .map(|method| match solver.solve(method, a, b, x0) {
        Ok(solution) => MethodReport {
            method: method.id(),
            iterations: solution.trace.iterations(),
            score: solution.trace.final_error(),
            result: format_vector(&solution.x),
            failure: None,
        },
        Err(error) => MethodReport::failed(method.id(), error),
    })
    .collect();
    let comparison = Comparison {
        family: MethodFamily::LinearSystem,
        reports,
    };
    if let Some(best) = comparison.best() {
        info!("best linear solver: {}", best.method);
    }
    comparison
}

fn interpolation_report<I: Interpolant>(
    method: MethodId,
    result: Result<I, NumericError>,
    x: &[f64],
    y: &[f64],
) -> MethodReport {
    match result {
        Ok(interpolant) => MethodReport {
            method,
            iterations: 0,
            score: interpolant.max_node_residual(x, y),
            result: interpolant.render(),
            failure: None,
        },
        Err(error) => MethodReport::failed(method, error),
    }
}

/// Builds all five interpolants through the same points.
pub fn compare_interpolation_methods(x: &[f64], y: &[f64]) -> Comparison {
    let reports = vec![
        interpolation_report(MethodId::Vandermonde, vandermonde(x, y), x, y),
        interpolation_report(
            MethodId::NewtonDividedDifferences,
            newton_divided_differences(x, y),
            x,
            y,
        ),
        interpolation_report(MethodId::Lagrange, lagrange(x, y), x, y),
        interpolation_report(MethodId::LinearSpline, linear_spline(x, y), x, y),
        interpolation_report(MethodId::CubicSpline, cubic_spline(x, y), x, y),
    ];
    let comparison = Comparison {
        family: MethodFamily::Interpolation,
        reports,
    };
    if let Some(best) = comparison.best() {
        info!("most accurate interpolant: {}", best.method);
    }
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::solver_outcome::IterationControl;

    fn report(method: MethodId, iterations: usize, score: f64) -> MethodReport {
        MethodReport {
            method,
            iterations,
            score,
            result: String::new(),
            failure: None,
        }
    }

    #[test]
    fn test_iterations_rank_before_error() {
        let comparison = Comparison {
            family: MethodFamily::RootFinding,
            reports: vec![
                report(MethodId::Bisection, 20, 1e-9),
                report(MethodId::Newton, 5, 1e-7),
                report(MethodId::Secant, 5, 1e-12),
                MethodReport::failed(MethodId::FixedPoint, NumericError::ZeroDenominator),
            ],
        };
        let ranked: Vec<MethodId> = comparison.ranked().iter().map(|r| r.method).collect();
        assert_eq!(
            ranked,
            vec![MethodId::Secant, MethodId::Newton, MethodId::Bisection]
        );
    }

    #[test]
    fn test_root_found_immediately_wins() {
        let finder = RootFinder::new(IterationControl::new(1e-8, 100, false));
        let problem = RootProblem {
            f: Expr::parse_expression("x^2 - 4").unwrap(),
            g: None,
            bracket: Some((0.0, 3.0)),
            x0: Some(2.0),
            x1: Some(3.0),
        };
        let comparison = compare_root_methods(&finder, &problem);
        assert_eq!(comparison.reports.len(), 5);
        let best = comparison.best().unwrap();
        assert_eq!(best.iterations, 0);
        assert_eq!(best.method, MethodId::Newton);
    }

    #[test]
    fn test_compare_roots_skips_methods_without_inputs() {
        let finder = RootFinder::default();
        let problem = RootProblem {
            f: Expr::parse_expression("x^3 - 2x - 5").unwrap(),
            g: None,
            bracket: Some((2.0, 3.0)),
            x0: None,
            x1: None,
        };
        let comparison = compare_root_methods(&finder, &problem);
        let methods: Vec<MethodId> = comparison.reports.iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![MethodId::Bisection, MethodId::FalsePosition]);
        assert_eq!(comparison.best().unwrap().method, MethodId::FalsePosition);
    }

    #[test]
    fn test_compare_linear_methods() {
        let solver = StationarySolver::new(IterationControl::new(1e-10, 100, false));
        let a = vec![
            vec![10.0, -1.0, 2.0],
            vec![-1.0, 11.0, -1.0],
            vec![2.0, -1.0, 10.0],
        ];
        let comparison = compare_linear_methods(&solver, &a, &[6.0, 25.0, -11.0], &[0.0; 3], 3.0);
        assert_eq!(comparison.reports.len(), 3);
        assert_eq!(
            comparison.reports[2].failure.as_deref(),
            Some("W must be between 0 and 2")
        );
        assert_eq!(comparison.best().unwrap().method, MethodId::GaussSeidel);
        assert!(comparison.to_table().contains("W must be between 0 and 2"));
    }

    #[test]
    fn test_compare_interpolation_by_accuracy() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 0.0, 4.0];
        let comparison = compare_interpolation_methods(&x, &y);
        assert_eq!(comparison.reports.len(), 5);
        assert!(comparison.reports.iter().all(|r| r.is_converged()));
        for report in comparison.ranked() {
            assert!(report.score < 1e-9);
        }
        let duplicate = compare_interpolation_methods(&[1.0, 1.0], &[0.0, 1.0]);
        assert!(duplicate.best().is_none());
    }
}
