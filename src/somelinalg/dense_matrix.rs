//! Dense matrix and vector helpers shared by the interpolation and linear-system solvers.
//!
//! Matrices arrive from callers as row lists (`Vec<Vec<f64>>`), so everything here starts
//! by checking the shape and turning the rows into a nalgebra `DMatrix<f64>`.
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Errors of the dense linear algebra layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    #[error("dimension mismatch: {0}")]
    Dimension(String),
    #[error("matrix is singular: pivot {pivot:e} in column {column}")]
    Singular { column: usize, pivot: f64 },
}

/// Builds a matrix from a list of rows of equal, non-zero length.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, LinalgError> {
    let nrows = rows.len();
    if nrows == 0 {
        return Err(LinalgError::Dimension("matrix has no rows".to_string()));
    }
    let ncols = rows[0].len();
    if ncols == 0 {
        return Err(LinalgError::Dimension("matrix has no columns".to_string()));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
        return Err(LinalgError::Dimension(format!(
            "row {} has {} entries, expected {}",
            i,
            row.len(),
            ncols
        )));
    }
    Ok(DMatrix::from_fn(nrows, ncols, |i, j| rows[i][j]))
}

/// Same as [`matrix_from_rows`] but the result must be n x n.
pub fn square_matrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, LinalgError> {
    let matrix = matrix_from_rows(rows)?;
    if !matrix.is_square() {
        return Err(LinalgError::Dimension(format!(
            "matrix is {}x{}, expected a square matrix",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    Ok(matrix)
}

pub fn mat_vec(a: &DMatrix<f64>, v: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
    if a.ncols() != v.len() {
        return Err(LinalgError::Dimension(format!(
            "cannot multiply {}x{} matrix by vector of length {}",
            a.nrows(),
            a.ncols(),
            v.len()
        )));
    }
    Ok(a * v)
}

pub fn mat_mul(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
    if a.ncols() != b.nrows() {
        return Err(LinalgError::Dimension(format!(
            "cannot multiply {}x{} matrix by {}x{} matrix",
            a.nrows(),
            a.ncols(),
            b.nrows(),
            b.ncols()
        )));
    }
    Ok(a * b)
}

/// Maximum absolute entry; 0 for an empty vector.
pub fn norm_inf(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, value| acc.max(value.abs()))
}

/// D: the diagonal of `a` on an otherwise zero matrix.
pub fn diagonal_part(a: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| if i == j { a[(i, j)] } else { 0.0 })
}

/// Entries strictly below the diagonal.
pub fn strict_lower_part(a: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| if i > j { a[(i, j)] } else { 0.0 })
}

/// Entries strictly above the diagonal.
pub fn strict_upper_part(a: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| if i < j { a[(i, j)] } else { 0.0 })
}

/// Turns a matrix back into the row-list form callers hand in.
pub fn matrix_to_rows(a: &DMatrix<f64>) -> Vec<Vec<f64>> {
    a.row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}
