//! Linear and natural cubic splines.
//!
//! Both are assembled as one monomial system over all segments (unknowns ordered segment by
//! segment, highest power first) and solved with LU:
//! - linear, `2(n-1)` unknowns: each segment passes through its left point, then each
//!   through its right point
//! - cubic, `4(n-1)` unknowns: the same `2(n-1)` interpolation rows, then first-derivative
//!   continuity at the `n-2` interior knots, then second-derivative continuity, then
//!   `S''(x_0) = 0` and `S''(x_{n-1}) = 0`
//!
//! The system is solved in `t = x - x_0`. Monomials of knots far from zero (years, say) are
//! nearly collinear in `x` but not in `t`. Pieces keep the local coefficients for evaluation
//! and expose the expanded coefficients in `x` for display.
use crate::numerical::interpolation::render::{cubic_tracer, fmt_num, linear_tracer};
use crate::numerical::interpolation::{Interpolant, sort_points, validate_points};
use crate::numerical::iteration_trace::MethodId;
use crate::numerical::solver_outcome::NumericError;
use crate::somelinalg::LUsolver::solve_linear_system;
use crate::somelinalg::dense_matrix::matrix_to_rows;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};

/// One polynomial piece valid on `interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePiece {
    pub interval: (f64, f64),
    /// Highest power of `x` first: `[m, c]` or `[a, b, c, d]`.
    pub coefficients: Vec<f64>,
    pub tracer: String,
    origin: f64,
    // same polynomial in x - origin
    local: Vec<f64>,
}

impl SplinePiece {
    fn new(interval: (f64, f64), origin: f64, local: Vec<f64>) -> Self {
        let coefficients = expand_about(&local, origin);
        let tracer = match coefficients[..] {
            [m, c] => linear_tracer(m, c),
            [a, b, c, d] => cubic_tracer(a, b, c, d),
            _ => String::new(),
        };
        Self {
            interval,
            coefficients,
            tracer,
            origin,
            local,
        }
    }

    fn degree(&self) -> usize {
        self.local.len() - 1
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let t = x - self.origin;
        self.local.iter().fold(0.0, |acc, c| acc * t + c)
    }

    pub fn derivative(&self, x: f64) -> f64 {
        let t = x - self.origin;
        let degree = self.degree();
        self.local[..degree]
            .iter()
            .enumerate()
            .fold(0.0, |acc, (k, c)| acc * t + c * (degree - k) as f64)
    }

    pub fn second_derivative(&self, x: f64) -> f64 {
        let degree = self.degree();
        if degree < 2 {
            return 0.0;
        }
        let t = x - self.origin;
        self.local[..degree - 1]
            .iter()
            .enumerate()
            .fold(0.0, |acc, (k, c)| {
                let power = degree - k;
                acc * t + c * (power * (power - 1)) as f64
            })
    }

    pub fn contains(&self, x: f64) -> bool {
        self.interval.0 <= x && x <= self.interval.1
    }
}

/// Rewrites `sum local_k (x - origin)^k` (highest power first) in powers of `x`.
fn expand_about(local: &[f64], origin: f64) -> Vec<f64> {
    let mut global: Vec<f64> = Vec::with_capacity(local.len());
    for &c in local {
        // global <- global * (x - origin) + c
        global.push(0.0);
        for i in (1..global.len()).rev() {
            global[i] -= origin * global[i - 1];
        }
        if let Some(last) = global.last_mut() {
            *last += c;
        }
    }
    global
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplineResult {
    method: MethodId,
    /// The assembled system matrix, written in `x`.
    pub matrix: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
    /// Consecutive pieces ordered by x.
    pub pieces: Vec<SplinePiece>,
}

impl SplineResult {
    /// Piece used at `x`; points outside the data range use the nearest end piece.
    pub fn piece_at(&self, x: f64) -> &SplinePiece {
        self.pieces
            .iter()
            .find(|piece| x <= piece.interval.1)
            .unwrap_or(&self.pieces[self.pieces.len() - 1])
    }

    pub fn derivative(&self, x: f64) -> f64 {
        self.piece_at(x).derivative(x)
    }

    pub fn second_derivative(&self, x: f64) -> f64 {
        self.piece_at(x).second_derivative(x)
    }
}

impl Interpolant for SplineResult {
    fn method(&self) -> MethodId {
        self.method
    }

    fn evaluate(&self, x: f64) -> f64 {
        self.piece_at(x).evaluate(x)
    }

    fn render(&self) -> String {
        self.pieces
            .iter()
            .map(|piece| {
                format!(
                    "[{}, {}]: {}",
                    fmt_num(piece.interval.0),
                    fmt_num(piece.interval.1),
                    piece.tracer
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Writes `[t^(k-1), ..., t, 1]` of segment `segment` into `row`.
fn put_powers(a: &mut DMatrix<f64>, row: usize, segment: usize, k: usize, t: f64) {
    for p in 0..k {
        a[(row, segment * k + p)] = t.powi((k - 1 - p) as i32);
    }
}

fn assemble_linear(x: &[f64], y: &[f64], origin: f64) -> (DMatrix<f64>, DVector<f64>) {
    let n = x.len();
    let m = 2 * (n - 1);
    let mut a = DMatrix::zeros(m, m);
    let mut b = DVector::zeros(m);
    let mut h = 0;
    for i in 0..n - 1 {
        put_powers(&mut a, h, i, 2, x[i] - origin);
        b[h] = y[i];
        h += 1;
    }
    for i in 1..n {
        put_powers(&mut a, h, i - 1, 2, x[i] - origin);
        b[h] = y[i];
        h += 1;
    }
    (a, b)
}

fn assemble_cubic(x: &[f64], y: &[f64], origin: f64) -> (DMatrix<f64>, DVector<f64>) {
    let n = x.len();
    let m = 4 * (n - 1);
    let t: Vec<f64> = x.iter().map(|xi| xi - origin).collect();
    let mut a = DMatrix::zeros(m, m);
    let mut b = DVector::zeros(m);
    let mut h = 0;
    // interpolation: left ends, then right ends
    for i in 0..n - 1 {
        put_powers(&mut a, h, i, 4, t[i]);
        b[h] = y[i];
        h += 1;
    }
    for i in 1..n {
        put_powers(&mut a, h, i - 1, 4, t[i]);
        b[h] = y[i];
        h += 1;
    }
    // S'_{i-1}(x_i) = S'_i(x_i)
    for i in 1..n - 1 {
        let c = 4 * (i - 1);
        a[(h, c)] = 3.0 * t[i].powi(2);
        a[(h, c + 1)] = 2.0 * t[i];
        a[(h, c + 2)] = 1.0;
        a[(h, c + 4)] = -3.0 * t[i].powi(2);
        a[(h, c + 5)] = -2.0 * t[i];
        a[(h, c + 6)] = -1.0;
        h += 1;
    }
    // S''_{i-1}(x_i) = S''_i(x_i)
    for i in 1..n - 1 {
        let c = 4 * (i - 1);
        a[(h, c)] = 6.0 * t[i];
        a[(h, c + 1)] = 2.0;
        a[(h, c + 4)] = -6.0 * t[i];
        a[(h, c + 5)] = -2.0;
        h += 1;
    }
    // natural ends
    a[(h, 0)] = 6.0 * t[0];
    a[(h, 1)] = 2.0;
    h += 1;
    let last = 4 * (n - 2);
    a[(h, last)] = 6.0 * t[n - 1];
    a[(h, last + 1)] = 2.0;
    (a, b)
}

pub fn linear_spline(x: &[f64], y: &[f64]) -> Result<SplineResult, NumericError> {
    validate_points(x, y, 2)?;
    let (x, y) = sort_points(x, y);
    let n = x.len();
    info!("Linear spline through {} points", n);
    let origin = x[0];
    let (a, b) = assemble_linear(&x, &y, origin);
    let solution = solve_linear_system(&a, &b)
        .map_err(|e| NumericError::singular_system(MethodId::LinearSpline, e))?;
    let pieces = (0..n - 1)
        .map(|i| {
            SplinePiece::new(
                (x[i], x[i + 1]),
                origin,
                vec![solution[2 * i], solution[2 * i + 1]],
            )
        })
        .collect();
    let (matrix, rhs) = assemble_linear(&x, &y, 0.0);
    Ok(SplineResult {
        method: MethodId::LinearSpline,
        matrix: matrix_to_rows(&matrix),
        rhs: rhs.iter().copied().collect(),
        pieces,
    })
}

pub fn cubic_spline(x: &[f64], y: &[f64]) -> Result<SplineResult, NumericError> {
    validate_points(x, y, 2)?;
    let (x, y) = sort_points(x, y);
    let n = x.len();
    info!("Natural cubic spline through {} points", n);
    let origin = x[0];
    debug!("solving in t = x - {}", origin);
    let (a, b) = assemble_cubic(&x, &y, origin);
    let solution = solve_linear_system(&a, &b)
        .map_err(|e| NumericError::singular_system(MethodId::CubicSpline, e))?;
    let pieces = (0..n - 1)
        .map(|i| {
            let local = (0..4).map(|p| solution[4 * i + p]).collect();
            SplinePiece::new((x[i], x[i + 1]), origin, local)
        })
        .collect();
    let (matrix, rhs) = assemble_cubic(&x, &y, 0.0);
    Ok(SplineResult {
        method: MethodId::CubicSpline,
        matrix: matrix_to_rows(&matrix),
        rhs: rhs.iter().copied().collect(),
        pieces,
    })
}
