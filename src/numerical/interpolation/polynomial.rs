//! Single interpolating polynomials: Vandermonde, Newton divided differences and Lagrange.
//! For n points with distinct x all three give the same polynomial of degree < n.
use crate::numerical::interpolation::render::{
    descending_polynomial, fmt_factor, fmt_num, linear_factor, ordinal, sign_sep,
};
use crate::numerical::interpolation::{Interpolant, validate_points};
use crate::numerical::iteration_trace::MethodId;
use crate::numerical::solver_outcome::NumericError;
use crate::somelinalg::LUsolver::solve_linear_system;
use crate::somelinalg::dense_matrix::matrix_to_rows;
use log::info;
use nalgebra::{DMatrix, DVector};

/// Horner evaluation of ascending coefficients.
fn horner(ascending: &[f64], x: f64) -> f64 {
    ascending.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

///////////////////////////////////////////////////////////////////////////////////////////////
//                                  VANDERMONDE
///////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct VandermondeResult {
    /// `M[i][j] = x_i^j`
    pub matrix: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
    /// `a_0, a_1, ...` of `a_0 + a_1 x + ...`
    pub coefficients: Vec<f64>,
    /// Descending powers, e.g. `2x^2 - 3x + 1`.
    pub polynomial: String,
}

pub fn vandermonde(x: &[f64], y: &[f64]) -> Result<VandermondeResult, NumericError> {
    validate_points(x, y, 1)?;
    let n = x.len();
    info!("Vandermonde interpolation through {} points", n);
    let matrix = DMatrix::from_fn(n, n, |i, j| x[i].powi(j as i32));
    let rhs = DVector::from_column_slice(y);
    let coefficients = solve_linear_system(&matrix, &rhs)
        .map_err(|e| NumericError::singular_system(MethodId::Vandermonde, e))?;
    let coefficients: Vec<f64> = coefficients.iter().copied().collect();
    Ok(VandermondeResult {
        matrix: matrix_to_rows(&matrix),
        rhs: y.to_vec(),
        polynomial: descending_polynomial(&coefficients),
        coefficients,
    })
}

impl Interpolant for VandermondeResult {
    fn method(&self) -> MethodId {
        MethodId::Vandermonde
    }

    fn evaluate(&self, x: f64) -> f64 {
        horner(&self.coefficients, x)
    }

    fn render(&self) -> String {
        self.polynomial.clone()
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////
//                            NEWTON DIVIDED DIFFERENCES
///////////////////////////////////////////////////////////////////////////////////////////////

/// Lower triangular table `dd[i][j]`, zero above the diagonal. Column names are `f[0]`,
/// `1st`, `2nd`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct DividedDifferenceTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewtonResult {
    pub table: DividedDifferenceTable,
    /// Diagonal of the table: `b_0, b_1, ...`
    pub coefficients: Vec<f64>,
    pub nodes: Vec<f64>,
    /// `b_0 + (b_1)(x - x_0) + (b_2)(x - x_0)(x - x_1) ...`
    pub polynomial: String,
}

pub fn newton_divided_differences(x: &[f64], y: &[f64]) -> Result<NewtonResult, NumericError> {
    validate_points(x, y, 1)?;
    let n = x.len();
    info!("Newton divided differences through {} points", n);
    let mut dd = vec![vec![0.0; n]; n];
    for i in 0..n {
        dd[i][0] = y[i];
    }
    for j in 1..n {
        for i in j..n {
            dd[i][j] = (dd[i][j - 1] - dd[i - 1][j - 1]) / (x[i] - x[i - j]);
        }
    }
    let coefficients: Vec<f64> = (0..n).map(|i| dd[i][i]).collect();

    let mut polynomial = fmt_num(coefficients[0]);
    for (i, b) in coefficients.iter().enumerate().skip(1) {
        polynomial.push_str(sign_sep(*b));
        polynomial.push_str(&format!("({})", fmt_num(b.abs())));
        for node in &x[..i] {
            polynomial.push_str(&linear_factor(*node));
        }
    }

    let columns = (0..n)
        .map(|j| if j == 0 { "f[0]".to_string() } else { ordinal(j) })
        .collect();
    Ok(NewtonResult {
        table: DividedDifferenceTable { columns, rows: dd },
        coefficients,
        nodes: x.to_vec(),
        polynomial,
    })
}

impl Interpolant for NewtonResult {
    fn method(&self) -> MethodId {
        MethodId::NewtonDividedDifferences
    }

    /// Nested (Horner-like) evaluation of the Newton form.
    fn evaluate(&self, x: f64) -> f64 {
        let n = self.coefficients.len();
        let mut result = self.coefficients[n - 1];
        for i in (0..n - 1).rev() {
            result = result * (x - self.nodes[i]) + self.coefficients[i];
        }
        result
    }

    fn render(&self) -> String {
        self.polynomial.clone()
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////
//                                   LAGRANGE
///////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeResult {
    /// `L_k(x)` as `(x - x_0)(x - x_2)/(x_1 - x_0)(x_1 - x_2)`, numerically folded denominator.
    pub basis: Vec<String>,
    pub tex_basis: Vec<String>,
    /// Expanded polynomial, ascending powers.
    pub coefficients: Vec<f64>,
    pub polynomial: String,
    pub tex_polynomial: String,
    nodes: Vec<f64>,
    values: Vec<f64>,
}

/// Multiplies ascending coefficients by `(x - node)`.
fn times_linear(p: &[f64], node: f64) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + 1];
    for (k, c) in p.iter().enumerate() {
        out[k + 1] += c;
        out[k] -= c * node;
    }
    out
}

pub fn lagrange(x: &[f64], y: &[f64]) -> Result<LagrangeResult, NumericError> {
    validate_points(x, y, 1)?;
    let n = x.len();
    info!("Lagrange interpolation through {} points", n);
    let mut basis = Vec::with_capacity(n);
    let mut tex_basis = Vec::with_capacity(n);
    let mut coefficients = vec![0.0; n];
    for k in 0..n {
        let mut top = String::new();
        let mut bot = 1.0;
        let mut numerator = vec![1.0];
        for (i, xi) in x.iter().enumerate() {
            if i == k {
                continue;
            }
            bot *= x[k] - xi;
            top.push_str(&linear_factor(*xi));
            numerator = times_linear(&numerator, *xi);
        }
        if top.is_empty() {
            basis.push("1".to_string());
            tex_basis.push("1".to_string());
        } else {
            basis.push(format!("({})/({})", top, fmt_num(bot)));
            tex_basis.push(format!("\\frac{{{}}}{{{}}}", top, fmt_num(bot)));
        }
        for (c, term) in coefficients.iter_mut().zip(&numerator) {
            *c += term * y[k] / bot;
        }
    }
    let polynomial = basis
        .iter()
        .zip(y)
        .map(|(l, yk)| format!("{}*{}", l, fmt_factor(*yk)))
        .collect::<Vec<_>>()
        .join(" + ");
    let tex_polynomial = tex_basis
        .iter()
        .zip(y)
        .map(|(l, yk)| format!("{} \\cdot {}", l, fmt_factor(*yk)))
        .collect::<Vec<_>>()
        .join(" + ");
    Ok(LagrangeResult {
        basis,
        tex_basis,
        coefficients,
        polynomial,
        tex_polynomial,
        nodes: x.to_vec(),
        values: y.to_vec(),
    })
}

impl Interpolant for LagrangeResult {
    fn method(&self) -> MethodId {
        MethodId::Lagrange
    }

    fn evaluate(&self, x: f64) -> f64 {
        let n = self.nodes.len();
        let mut result = 0.0;
        for i in 0..n {
            let mut term = self.values[i];
            for j in 0..n {
                if i != j {
                    term *= (x - self.nodes[j]) / (self.nodes[i] - self.nodes[j]);
                }
            }
            result += term;
        }
        result
    }

    fn render(&self) -> String {
        self.polynomial.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;

    const X: [f64; 4] = [-1.0, 0.0, 3.0, 4.0];
    const Y: [f64; 4] = [15.5, 3.0, 8.0, 1.0];

    #[test]
    fn test_vandermonde_reproduces_square() {
        let result = vandermonde(&[1.0, 2.0, 3.0], &[1.0, 4.0, 9.0]).unwrap();
        assert_relative_eq!(result.coefficients[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.coefficients[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.coefficients[2], 1.0, epsilon = 1e-12);
        assert_eq!(result.matrix[2], vec![1.0, 3.0, 9.0]);
        assert_eq!(result.rhs, vec![1.0, 4.0, 9.0]);
        assert_eq!(result.polynomial, "1x^2 + 0x + 0");
    }

    #[test]
    fn test_vandermonde_sign_folding() {
        // 2x^2 - 3x + 1
        let result = vandermonde(&[0.0, 1.0, 2.0], &[1.0, 0.0, 3.0]).unwrap();
        assert_eq!(result.polynomial, "2x^2 - 3x + 1");
        let result = vandermonde(&[0.0, 1.0], &[-1.0, -3.0]).unwrap();
        assert_eq!(result.polynomial, "-2x - 1");
    }

    #[test]
    fn test_newton_table_and_polynomial() {
        let result = newton_divided_differences(&X, &Y).unwrap();
        assert_eq!(result.table.columns, vec!["f[0]", "1st", "2nd", "3rd"]);
        assert_eq!(result.table.rows[0], vec![15.5, 0.0, 0.0, 0.0]);
        assert_relative_eq!(result.table.rows[1][1], -12.5);
        assert_relative_eq!(result.coefficients[0], 15.5);
        assert_relative_eq!(result.coefficients[1], -12.5);
        assert!(result.polynomial.starts_with("15.5 - (12.5)(x + 1)"));
        for (x, y) in X.iter().zip(Y) {
            assert_relative_eq!(result.evaluate(*x), y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lagrange_basis_strings() {
        let result = lagrange(&[1.0, 2.0, 3.0], &[1.0, 4.0, 9.0]).unwrap();
        assert_eq!(result.basis[0], "((x - 2)(x - 3))/(2)");
        assert_eq!(result.basis[1], "((x - 1)(x - 3))/(-1)");
        assert_eq!(result.tex_basis[2], "\\frac{(x - 1)(x - 2)}{2}");
        assert!(result.polynomial.ends_with("((x - 1)(x - 2))/(2)*9"));
        assert!(result.tex_polynomial.contains("\\cdot 4"));
        assert_relative_eq!(result.coefficients[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.coefficients[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point() {
        let l = lagrange(&[2.0], &[5.0]).unwrap();
        assert_eq!(l.polynomial, "1*5");
        assert_eq!(l.evaluate(10.0), 5.0);
        let n = newton_divided_differences(&[2.0], &[5.0]).unwrap();
        assert_eq!(n.polynomial, "5");
        let v = vandermonde(&[2.0], &[5.0]).unwrap();
        assert_eq!(v.polynomial, "5");
    }

    #[test]
    fn test_three_methods_agree() {
        let v = vandermonde(&X, &Y).unwrap();
        let n = newton_divided_differences(&X, &Y).unwrap();
        let l = lagrange(&X, &Y).unwrap();
        for at in [-1.0, 0.0, 3.0, 4.0, -0.5, 1.25, 2.0, 5.0] {
            let expected = v.evaluate(at);
            assert_relative_eq!(n.evaluate(at), expected, epsilon = 1e-9);
            assert_relative_eq!(l.evaluate(at), expected, epsilon = 1e-9);
        }
        for (a, b) in v.coefficients.iter().zip(&l.coefficients) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_small_nodes_agree() {
        let x = [1e-4, 2e-4, 3e-4, 4e-4, 5e-4];
        let y = [1.0, 3.0, 2.0, -1.0, 0.5];
        let v = vandermonde(&x, &y).unwrap();
        let n = newton_divided_differences(&x, &y).unwrap();
        let l = lagrange(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y) {
            assert_relative_eq!(v.evaluate(*xi), yi, epsilon = 1e-6);
            assert_relative_eq!(n.evaluate(*xi), yi, epsilon = 1e-6);
            assert_relative_eq!(l.evaluate(*xi), yi, epsilon = 1e-6);
        }
        assert_relative_eq!(v.evaluate(2.5e-4), n.evaluate(2.5e-4), epsilon = 1e-6);
        assert_relative_eq!(v.evaluate(2.5e-4), l.evaluate(2.5e-4), epsilon = 1e-6);
    }

    #[test]
    fn test_rendered_polynomials_parse_back() {
        let v = vandermonde(&X, &Y).unwrap();
        let n = newton_divided_differences(&X, &Y).unwrap();
        let l = lagrange(&X, &Y).unwrap();
        for rendered in [&v.polynomial, &n.polynomial, &l.polynomial] {
            let parsed = Expr::parse_expression(rendered).unwrap();
            for (x, y) in X.iter().zip(Y) {
                assert_relative_eq!(parsed.eval(*x).unwrap(), y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_duplicate_nodes_are_rejected_before_solving() {
        let reason = vandermonde(&[1.0, 2.0, 1.0], &[1.0, 2.0, 3.0])
            .unwrap_err()
            .to_string();
        assert_eq!(reason, "duplicate x-coordinates");
        assert!(lagrange(&[0.0, 0.0], &[1.0, 2.0]).is_err());
        assert!(newton_divided_differences(&[], &[]).is_err());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        assert_eq!(lagrange(&X, &Y).unwrap(), lagrange(&X, &Y).unwrap());
        assert_eq!(
            newton_divided_differences(&X, &Y).unwrap(),
            newton_divided_differences(&X, &Y).unwrap()
        );
    }
}
