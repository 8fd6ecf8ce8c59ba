//! Row-and-column record of an iterative run.
//!
//! Each method family has one fixed row schema ([`BracketRow`], [`OpenRow`], [`VectorRow`]),
//! so a trace can never mix rows of different width. Row 0 is the state before the first
//! update and carries [`INITIAL_ERROR`].
use crate::numerical::solver_outcome::INITIAL_ERROR;
use std::fmt;
use strum_macros::{Display, EnumIter};
use tabled::{builder::Builder, settings::Style};

/// The family a method belongs to; methods are only compared within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodFamily {
    RootFinding,
    Interpolation,
    LinearSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum MethodId {
    #[strum(serialize = "Bisection")]
    Bisection,
    #[strum(serialize = "False position")]
    FalsePosition,
    #[strum(serialize = "Fixed point")]
    FixedPoint,
    #[strum(serialize = "Newton")]
    Newton,
    #[strum(serialize = "Multiple roots")]
    MultipleRoots,
    #[strum(serialize = "Secant")]
    Secant,
    #[strum(serialize = "Vandermonde")]
    Vandermonde,
    #[strum(serialize = "Newton divided differences")]
    NewtonDividedDifferences,
    #[strum(serialize = "Lagrange")]
    Lagrange,
    #[strum(serialize = "Linear spline")]
    LinearSpline,
    #[strum(serialize = "Cubic spline")]
    CubicSpline,
    #[strum(serialize = "Jacobi")]
    Jacobi,
    #[strum(serialize = "Gauss-Seidel")]
    GaussSeidel,
    #[strum(serialize = "SOR")]
    Sor,
}

impl MethodId {
    pub fn family(&self) -> MethodFamily {
        match self {
            MethodId::Bisection
            | MethodId::FalsePosition
            | MethodId::FixedPoint
            | MethodId::Newton
            | MethodId::MultipleRoots
            | MethodId::Secant => MethodFamily::RootFinding,
            MethodId::Vandermonde
            | MethodId::NewtonDividedDifferences
            | MethodId::Lagrange
            | MethodId::LinearSpline
            | MethodId::CubicSpline => MethodFamily::Interpolation,
            MethodId::Jacobi | MethodId::GaussSeidel | MethodId::Sor => MethodFamily::LinearSystem,
        }
    }
}

/// One row of a trace. `COLUMNS` names the cells returned by `cells`, in order.
pub trait TraceRow: Clone + fmt::Debug + PartialEq {
    const COLUMNS: &'static [&'static str];

    /// Iteration index of the row.
    fn index(&self) -> usize;
    fn error(&self) -> f64;
    fn cells(&self) -> Vec<String>;
}

/// Row of the bracketing methods (bisection, false position).
#[derive(Debug, Clone, PartialEq)]
pub struct BracketRow {
    pub n: usize,
    pub a: f64,
    pub xm: f64,
    pub b: f64,
    pub fxm: f64,
    pub error: f64,
}

impl TraceRow for BracketRow {
    const COLUMNS: &'static [&'static str] = &["n", "a", "xm", "b", "f(xm)", "error"];

    fn index(&self) -> usize {
        self.n
    }

    fn error(&self) -> f64 {
        self.error
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.n.to_string(),
            self.a.to_string(),
            self.xm.to_string(),
            self.b.to_string(),
            self.fxm.to_string(),
            self.error.to_string(),
        ]
    }
}

/// Row of the open methods (fixed point, Newton, modified Newton, secant).
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRow {
    pub n: usize,
    pub x: f64,
    pub fx: f64,
    pub error: f64,
}

impl TraceRow for OpenRow {
    const COLUMNS: &'static [&'static str] = &["n", "x", "f(x)", "error"];

    fn index(&self) -> usize {
        self.n
    }

    fn error(&self) -> f64 {
        self.error
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.n.to_string(),
            self.x.to_string(),
            self.fx.to_string(),
            self.error.to_string(),
        ]
    }
}

/// Row of the stationary linear-system solvers: the whole iterate per row.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRow {
    pub n: usize,
    pub x: Vec<f64>,
    pub error: f64,
}

impl TraceRow for VectorRow {
    const COLUMNS: &'static [&'static str] = &["n", "x", "error"];

    fn index(&self) -> usize {
        self.n
    }

    fn error(&self) -> f64 {
        self.error
    }

    fn cells(&self) -> Vec<String> {
        let x = self
            .x
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        vec![self.n.to_string(), format!("[{}]", x), self.error.to_string()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterationTrace<R: TraceRow> {
    method: MethodId,
    rows: Vec<R>,
}

impl<R: TraceRow> IterationTrace<R> {
    /// Starts a trace from the initial state (row 0).
    pub fn new(method: MethodId, initial: R) -> Self {
        Self {
            method,
            rows: vec![initial],
        }
    }

    pub(crate) fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn last(&self) -> Option<&R> {
        self.rows.last()
    }

    /// Number of completed iterations, i.e. rows after the initial one.
    pub fn iterations(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn final_error(&self) -> f64 {
        self.rows.last().map(|row| row.error()).unwrap_or(INITIAL_ERROR)
    }

    /// Header followed by one record per row, all as strings.
    pub fn records(&self) -> Vec<Vec<String>> {
        let header = R::COLUMNS.iter().map(|c| c.to_string()).collect();
        std::iter::once(header)
            .chain(self.rows.iter().map(|row| row.cells()))
            .collect()
    }

    pub fn to_table(&self) -> String {
        let mut builder = Builder::default();
        for record in self.records() {
            builder.push_record(record);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

impl<R: TraceRow> fmt::Display for IterationTrace<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        write!(f, "{}", self.to_table())
    }
}
