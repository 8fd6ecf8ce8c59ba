//! LU factorisation with partial pivoting (Doolittle form, `P A = L U`).
//!
//! The matrix is equilibrated first: columns, then rows, are multiplied by powers of two so
//! that their largest entry is close to one. The factorisation runs on `S = R A C` and the
//! scales are folded back into `l()`, `u()`, `solve` and `determinant`, so callers only ever
//! see `A`. Powers of two keep the scaling exact.
//!
//! `L` has a unit diagonal and is stored together with `U` in one compact matrix.
//! Used to solve the Vandermonde and spline systems and to invert `D - wL` for SOR.
use crate::somelinalg::dense_matrix::LinalgError;
use log::warn;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct LUDecomposition {
    lu: DMatrix<f64>,
    // perm[i] is the row of A that ended up in row i
    perm: Vec<usize>,
    swaps: usize,
    row_scale: Vec<f64>,
    col_scale: Vec<f64>,
}

/// Power of two nearest to `1 / max`; zero or non-finite maxima keep the line unscaled.
fn power_of_two_scale(max: f64) -> f64 {
    if max == 0.0 || !max.is_finite() {
        1.0
    } else {
        (-max.log2().round()).exp2()
    }
}

/// Column scales `c`, then row scales `r` of `diag(r) A diag(c)`.
fn equilibrate(a: &DMatrix<f64>) -> (Vec<f64>, Vec<f64>) {
    let col_scale: Vec<f64> = a
        .column_iter()
        .map(|col| power_of_two_scale(col.amax()))
        .collect();
    let row_scale = a
        .row_iter()
        .map(|row| {
            let max = row
                .iter()
                .zip(&col_scale)
                .fold(0.0_f64, |acc, (v, c)| acc.max((v * c).abs()));
            power_of_two_scale(max)
        })
        .collect();
    (row_scale, col_scale)
}

impl LUDecomposition {
    /// Factorises a square matrix. After equilibration a pivot with magnitude below
    /// `n * eps * max|S|` makes the matrix singular, so the test does not depend on how the
    /// rows or columns of `A` happen to be scaled.
    pub fn new(a: &DMatrix<f64>) -> Result<Self, LinalgError> {
        if !a.is_square() || a.nrows() == 0 {
            return Err(LinalgError::Dimension(format!(
                "LU needs a non-empty square matrix, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        let n = a.nrows();
        let (row_scale, col_scale) = equilibrate(a);
        let mut lu = DMatrix::from_fn(n, n, |i, j| row_scale[i] * a[(i, j)] * col_scale[j]);
        let tol = n as f64 * f64::EPSILON * lu.amax();

        let mut perm: Vec<usize> = (0..n).collect();
        let mut swaps = 0;
        for k in 0..n {
            let (pivot_row, pivot) = (k..n)
                .map(|i| (i, lu[(i, k)]))
                .fold((k, 0.0_f64), |best, (i, v)| {
                    if v.abs() > best.1.abs() { (i, v) } else { best }
                });
            if pivot.abs() <= tol {
                warn!("Matrix is singular. Pivot = {:e} in column {}", pivot, k);
                return Err(LinalgError::Singular { column: k, pivot });
            }
            if pivot_row != k {
                lu.swap_rows(pivot_row, k);
                perm.swap(pivot_row, k);
                swaps += 1;
            }
            for i in (k + 1)..n {
                let factor = lu[(i, k)] / lu[(k, k)];
                lu[(i, k)] = factor;
                for j in (k + 1)..n {
                    let update = factor * lu[(k, j)];
                    lu[(i, j)] -= update;
                }
            }
        }
        Ok(Self {
            lu,
            perm,
            swaps,
            row_scale,
            col_scale,
        })
    }

    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    // row scale of the row that ended up in position i
    fn permuted_row_scale(&self, i: usize) -> f64 {
        self.row_scale[self.perm[i]]
    }

    /// Unit lower triangular factor of `P A`.
    pub fn l(&self) -> DMatrix<f64> {
        let n = self.dim();
        DMatrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            std::cmp::Ordering::Greater => {
                self.lu[(i, j)] * self.permuted_row_scale(j) / self.permuted_row_scale(i)
            }
            std::cmp::Ordering::Equal => 1.0,
            std::cmp::Ordering::Less => 0.0,
        })
    }

    /// Upper triangular factor of `P A`.
    pub fn u(&self) -> DMatrix<f64> {
        let n = self.dim();
        DMatrix::from_fn(n, n, |i, j| {
            if i <= j {
                self.lu[(i, j)] / (self.permuted_row_scale(i) * self.col_scale[j])
            } else {
                0.0
            }
        })
    }

    /// Permutation matrix P with `P A = L U`.
    pub fn p(&self) -> DMatrix<f64> {
        let n = self.dim();
        DMatrix::from_fn(n, n, |i, j| if self.perm[i] == j { 1.0 } else { 0.0 })
    }

    /// Solves `A x = b` by forward and back substitution.
    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
        let n = self.dim();
        if b.len() != n {
            return Err(LinalgError::Dimension(format!(
                "right-hand side has length {}, expected {}",
                b.len(),
                n
            )));
        }
        // Ly = P R b
        let mut y = DVector::from_fn(n, |i, _| b[self.perm[i]] * self.permuted_row_scale(i));
        for i in 0..n {
            let s: f64 = (0..i).map(|j| self.lu[(i, j)] * y[j]).sum();
            y[i] -= s;
        }
        // Uz = y, x = C z
        let mut z = y;
        for i in (0..n).rev() {
            let s: f64 = ((i + 1)..n).map(|j| self.lu[(i, j)] * z[j]).sum();
            z[i] = (z[i] - s) / self.lu[(i, i)];
        }
        Ok(DVector::from_fn(n, |i, _| z[i] * self.col_scale[i]))
    }

    /// Inverse, column by column from the unit vectors.
    pub fn inverse(&self) -> Result<DMatrix<f64>, LinalgError> {
        let n = self.dim();
        let mut inv = DMatrix::zeros(n, n);
        for j in 0..n {
            let mut e = DVector::zeros(n);
            e[j] = 1.0;
            let column = self.solve(&e)?;
            inv.set_column(j, &column);
        }
        Ok(inv)
    }

    pub fn determinant(&self) -> f64 {
        let sign = if self.swaps % 2 == 0 { 1.0 } else { -1.0 };
        let scales: f64 = self
            .row_scale
            .iter()
            .chain(&self.col_scale)
            .product();
        sign * self.lu.diagonal().iter().product::<f64>() / scales
    }
}

/// Solves `A x = b` for a square non-singular `A`.
pub fn solve_linear_system(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, LinalgError> {
    LUDecomposition::new(a)?.solve(b)
}

pub fn invert(a: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
    LUDecomposition::new(a)?.inverse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::somelinalg::dense_matrix::matrix_from_rows;
    use approx::assert_relative_eq;

    #[test]
    fn test_factors_reproduce_permuted_matrix() {
        let a = matrix_from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 10.0],
        ])
        .unwrap();
        let lu = LUDecomposition::new(&a).unwrap();
        let pa = lu.p() * &a;
        let l_u = lu.l() * lu.u();
        for (x, y) in pa.iter().zip(l_u.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
        assert_relative_eq!(lu.determinant(), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        // zero in the top-left corner
        let a = matrix_from_rows(&[vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let b = DVector::from_vec(vec![2.0, 3.0]);
        let x = solve_linear_system(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_inverse() {
        let a = matrix_from_rows(&[vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
        let inv = invert(&a).unwrap();
        let id = &a * &inv;
        assert_relative_eq!(id[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(id[(0, 1)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id[(1, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id[(1, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        let a = matrix_from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert!(matches!(
            LUDecomposition::new(&a),
            Err(LinalgError::Singular { column: 1, .. })
        ));
        let zero = DMatrix::<f64>::zeros(2, 2);
        assert!(matches!(invert(&zero), Err(LinalgError::Singular { .. })));
    }

    #[test]
    fn test_tiny_row_is_not_singular() {
        // a whole row six orders below the machine epsilon of the other one
        let a = matrix_from_rows(&[vec![1e-15, 2e-15], vec![3.0, 4.0]]).unwrap();
        let b = DVector::from_vec(vec![3e-15, 7.0]);
        let x = solve_linear_system(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            LUDecomposition::new(&a).unwrap().determinant(),
            -2e-15,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_diagonal_far_from_unit_scale() {
        let a = matrix_from_rows(&[vec![1e-9, 0.0], vec![0.0, 1e9]]).unwrap();
        let inv = invert(&a).unwrap();
        assert_relative_eq!(inv[(0, 0)], 1e9, max_relative = 1e-14);
        assert_relative_eq!(inv[(1, 1)], 1e-9, max_relative = 1e-14);
        assert_eq!(inv[(0, 1)], 0.0);
        let lu = LUDecomposition::new(&a).unwrap();
        let l_u = lu.l() * lu.u();
        for (x, y) in a.iter().zip(l_u.iter()) {
            assert_relative_eq!(*x, *y, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_small_vandermonde_columns() {
        // columns x^j for x in 1e-4..5e-4 span sixteen orders of magnitude
        let nodes: [f64; 5] = [1e-4, 2e-4, 3e-4, 4e-4, 5e-4];
        let a = DMatrix::from_fn(5, 5, |i, j| nodes[i].powi(j as i32));
        let expected = DVector::from_vec(vec![1.0, -2e3, 3e6, -4e9, 5e12]);
        let b = &a * &expected;
        let x = solve_linear_system(&a, &b).unwrap();
        for (got, want) in x.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_non_square_and_wrong_rhs() {
        let a = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(LUDecomposition::new(&a), Err(LinalgError::Dimension(_))));
        let lu = LUDecomposition::new(&DMatrix::<f64>::identity(2, 2)).unwrap();
        assert!(lu.solve(&DVector::from_vec(vec![1.0])).is_err());
    }
}
