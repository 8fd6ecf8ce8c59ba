//! Stationary iterative solvers for `A x = b`: Jacobi, Gauss-Seidel and SOR.
//!
//! With the splitting `A = D - L - U` (`L`, `U` the strict triangles with flipped sign) every
//! method becomes the affine map `x <- T x + C`:
//! - Jacobi: `T = D^-1 (L + U)`, `C = D^-1 b`
//! - SOR: `T = (D - wL)^-1 ((1 - w) D + wU)`, `C = w (D - wL)^-1 b`; Gauss-Seidel is SOR with `w = 1`
//!
//! The step error is the infinity norm of `x_{k+1} - x_k`, divided by `||x_{k+1}||` in
//! relative mode.
//!
//! # Example
//! ```
//! use veritas_numeris::somelinalg::iterative_solvers_cpu::{IterativeMethod, StationarySolver};
//! use veritas_numeris::numerical::solver_outcome::IterationControl;
//! let solver = StationarySolver::new(IterationControl::new(1e-6, 50, false));
//! let a = vec![vec![4.0, 1.0], vec![1.0, 3.0]];
//! let solution = solver
//!     .solve(IterativeMethod::Jacobi, &a, &[1.0, 2.0], &[0.0, 0.0])
//!     .unwrap();
//! assert!((solution.x[0] - 1.0 / 11.0).abs() < 1e-5);
//! assert!((solution.x[1] - 7.0 / 11.0).abs() < 1e-5);
//! ```
use crate::numerical::iteration_trace::{IterationTrace, MethodId, VectorRow};
use crate::numerical::solver_outcome::{INITIAL_ERROR, IterationControl, NumericError};
use crate::somelinalg::LUsolver::invert;
use crate::somelinalg::dense_matrix::{
    diagonal_part, mat_vec, matrix_from_rows, matrix_to_rows, norm_inf, strict_lower_part,
    strict_upper_part,
};
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum IterativeMethod {
    Jacobi,
    GaussSeidel,
    #[strum(to_string = "SOR(w = {w})")]
    Sor { w: f64 },
}

impl IterativeMethod {
    pub fn id(&self) -> MethodId {
        match self {
            IterativeMethod::Jacobi => MethodId::Jacobi,
            IterativeMethod::GaussSeidel => MethodId::GaussSeidel,
            IterativeMethod::Sor { .. } => MethodId::Sor,
        }
    }

    /// Relaxation factor; Jacobi has none.
    pub fn relaxation(&self) -> Option<f64> {
        match self {
            IterativeMethod::Jacobi => None,
            IterativeMethod::GaussSeidel => Some(1.0),
            IterativeMethod::Sor { w } => Some(*w),
        }
    }
}

/// Converged iterate together with the affine map that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct StationarySolution {
    pub x: Vec<f64>,
    /// Iteration matrix, as rows.
    pub t: Vec<Vec<f64>>,
    pub c: Vec<f64>,
    pub trace: IterationTrace<VectorRow>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StationarySolver {
    control: IterationControl,
}

impl StationarySolver {
    pub fn new(control: IterationControl) -> Self {
        Self { control }
    }

    pub fn solve(
        &self,
        method: IterativeMethod,
        a: &[Vec<f64>],
        b: &[f64],
        x0: &[f64],
    ) -> Result<StationarySolution, NumericError> {
        let a = matrix_from_rows(a)?;
        let n = a.nrows();
        if !a.is_square() || b.len() != n || x0.len() != n {
            return Err(NumericError::validation("Invalid dimensions"));
        }
        if let Some(w) = method.relaxation() {
            if !(0.0..=2.0).contains(&w) {
                return Err(NumericError::validation("W must be between 0 and 2"));
            }
        }
        if a.diagonal().iter().any(|d| *d == 0.0) {
            return Err(NumericError::validation("A contains zeros in its diagonal"));
        }
        info!("{} for a {}x{} system", method, n, n);

        let b = DVector::from_column_slice(b);
        let (t, c) = iteration_matrices(method, &a, &b)?;
        debug!("T = {}, C = {}", t, c);

        let mut x = DVector::from_column_slice(x0);
        let mut error = INITIAL_ERROR;
        let mut trace = IterationTrace::new(
            method.id(),
            VectorRow {
                n: 0,
                x: x0.to_vec(),
                error,
            },
        );
        let mut k = 0;
        while !self.control.is_met(error) && k < self.control.max_iterations {
            let next = &t * &x + &c;
            error = self
                .control
                .measure(norm_inf(&(&next - &x)), norm_inf(&next))?;
            x = next;
            k += 1;
            debug!("iteration {}: error = {:e}", k, error);
            trace.push(VectorRow {
                n: k,
                x: x.iter().copied().collect(),
                error,
            });
        }
        if !self.control.is_met(error) {
            warn!(
                "{} did not converge in {} iterations, last error {:e}",
                method, self.control.max_iterations, error
            );
            return Err(NumericError::ConvergenceFailure {
                niter: self.control.max_iterations,
            });
        }
        info!("{} converged in {} iterations", method, k);
        Ok(StationarySolution {
            x: x.iter().copied().collect(),
            t: matrix_to_rows(&t),
            c: c.iter().copied().collect(),
            trace,
        })
    }
}

/// Builds `T` and `C` of the affine update for `method`. The diagonal of `a` must be free
/// of zeros.
pub fn iteration_matrices(
    method: IterativeMethod,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<(DMatrix<f64>, DVector<f64>), NumericError> {
    let d = diagonal_part(a);
    let l = -strict_lower_part(a);
    let u = -strict_upper_part(a);
    match method.relaxation() {
        None => {
            let d_inv = invert(&d).map_err(|e| NumericError::singular_system(method.id(), e))?;
            Ok((&d_inv * (l + u), &d_inv * b))
        }
        Some(w) => {
            let m_inv = invert(&(&d - &l * w))
                .map_err(|e| NumericError::singular_system(method.id(), e))?;
            let t = &m_inv * (&d * (1.0 - w) + &u * w);
            let c = (&m_inv * b) * w;
            Ok((t, c))
        }
    }
}

/// `||A x - b||` in the infinity norm.
pub fn residual_inf(a: &[Vec<f64>], x: &[f64], b: &[f64]) -> Result<f64, NumericError> {
    let a = matrix_from_rows(a)?;
    let x = DVector::from_column_slice(x);
    let b = DVector::from_column_slice(b);
    let ax = mat_vec(&a, &x)?;
    if ax.len() != b.len() {
        return Err(NumericError::validation("Invalid dimensions"));
    }
    Ok(norm_inf(&(ax - b)))
}
