//! # Interpolation through (x, y) data points
//!
//! Five constructors, each returning everything needed to inspect how the interpolant was
//! obtained as well as the interpolant itself:
//! - [`polynomial::vandermonde`] - the monomial system `M a = y` with `M[i][j] = x_i^j`
//! - [`polynomial::newton_divided_differences`] - the divided-difference table and the Newton form
//! - [`polynomial::lagrange`] - the Lagrange basis, plain and in LaTeX
//! - [`splines::linear_spline`], [`splines::cubic_spline`] - piecewise polynomials through
//!   consecutive points, the cubic one natural (zero second derivative at both ends)
//!
//! Every result implements [`Interpolant`]. Rendered polynomials are valid parser input.
//!
//! # Example
//! ```
//! use veritas_numeris::numerical::interpolation::{Interpolant, polynomial::vandermonde};
//! let result = vandermonde(&[1.0, 2.0, 3.0], &[1.0, 4.0, 9.0]).unwrap();
//! assert_eq!(result.polynomial, "1x^2 + 0x + 0");
//! assert!((result.evaluate(4.0) - 16.0).abs() < 1e-9);
//! ```
pub mod polynomial;
pub mod render;
pub mod splines;

use crate::numerical::iteration_trace::MethodId;
use crate::numerical::solver_outcome::NumericError;
use crate::somelinalg::dense_matrix::LinalgError;
use itertools::Itertools;

/// An interpolant that can be evaluated anywhere on the real line.
pub trait Interpolant {
    fn method(&self) -> MethodId;

    fn evaluate(&self, x: f64) -> f64;

    /// Human-readable form of the interpolant.
    fn render(&self) -> String;

    /// Largest `|p(x_i) - y_i|` over the data points.
    fn max_node_residual(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .map(|(xi, yi)| (self.evaluate(*xi) - yi).abs())
            .fold(0.0, f64::max)
    }
}

/// Checks, in order: equal lengths, enough points, distinct x-coordinates.
pub(crate) fn validate_points(
    x: &[f64],
    y: &[f64],
    min_points: usize,
) -> Result<(), NumericError> {
    if x.len() != y.len() {
        return Err(LinalgError::Dimension(format!(
            "{} x-coordinates but {} y-coordinates",
            x.len(),
            y.len()
        ))
        .into());
    }
    if x.len() < min_points {
        return Err(NumericError::validation(format!(
            "at least {} points are required",
            min_points
        )));
    }
    let has_duplicates = x
        .iter()
        .sorted_by(|a, b| a.total_cmp(b))
        .tuple_windows()
        .any(|(a, b)| a == b);
    if has_duplicates {
        return Err(NumericError::validation("duplicate x-coordinates"));
    }
    Ok(())
}

/// Points sorted by ascending x.
pub(crate) fn sort_points(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .copied()
        .zip(y.iter().copied())
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .unzip()
}
