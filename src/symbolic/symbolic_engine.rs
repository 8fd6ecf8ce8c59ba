//! # Symbolic Engine Module
//!
//! Core representation of a mathematical expression of one free variable. An expression is
//! built once (usually by the parser in [`crate::symbolic::parse_expr`]), never mutated, and
//! can be evaluated, differentiated and printed.
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! - **Leaves**: `Var(String)` for the free variable, `Const(f64)` for numbers
//! - **Binary operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow`
//! - **Unary operations**: `Neg` (unary minus) and `Func` (elementary functions)
//!
//! ### `Function` Enum
//! Elementary functions that may be applied to a sub-expression: `exp`, `ln`, `sin`, `cos`,
//! `tan`, `sqrt`, `asin`, `acos`, `atan`.
//!
//! ### Errors
//! - [`ParseError`] - malformed or structurally invalid text
//! - [`DomainError`] - evaluation at a point where the expression is undefined
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: `Box<Expr>` children give arbitrarily deep trees.
//! 2. **Operator Overloading**: `std::ops` traits let tests and callers write `x * x - 2.0`.
//! 3. **Shared read-only trees**: an `Expr` holds no interior mutability, so one parsed
//!    expression can be evaluated from many threads at once.

#![allow(non_camel_case_types)]

use std::fmt;
use thiserror::Error;

/// Name of the single free variable every expression is written in.
pub const VARIABLE: &str = "x";

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use veritas_numeris::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Unary minus: -operand
    Neg(Box<Expr>),
    /// Elementary function applied to an argument
    Func(Function, Box<Expr>),
}

/// Elementary functions known to the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Exp,
    Ln,
    Sin,
    Cos,
    Tan,
    Sqrt,
    Asin,
    Acos,
    Atan,
}

impl Function {
    /// Looks up a function by any of the names it is accepted under.
    pub fn from_name(name: &str) -> Option<Function> {
        match name {
            "exp" => Some(Function::Exp),
            "ln" | "log" => Some(Function::Ln),
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" | "tg" => Some(Function::Tan),
            "sqrt" => Some(Function::Sqrt),
            "asin" | "arcsin" => Some(Function::Asin),
            "acos" | "arccos" => Some(Function::Acos),
            "atan" | "arctan" | "arctg" => Some(Function::Atan),
            _ => None,
        }
    }

    /// Canonical name used when printing.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sqrt => "sqrt",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
        }
    }
}

/// Errors raised while turning text into an [`Expr`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected input at position {position}: '{found}'")]
    UnexpectedInput { position: usize, found: String },
    #[error("unknown symbol '{0}', expressions are written in the variable 'x'")]
    UnknownSymbol(String),
    #[error("'{0}' must be a constant expression")]
    NotConstant(String),
}

/// Errors raised while evaluating an [`Expr`] at a point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("division by zero at x = {at}")]
    DivisionByZero { at: f64 },
    #[error("{operation} is undefined at x = {at}")]
    Undefined { operation: String, at: f64 },
    #[error("non-finite value while evaluating at x = {at}")]
    NonFinite { at: f64 },
    #[error("relative error is undefined: the new approximation is zero")]
    RelativeErrorAtZero,
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Every binary operation is wrapped in parentheses, so the output re-parses to the same tree
/// shape.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => {
                if *val < 0.0 {
                    write!(f, "({})", val)
                } else {
                    write!(f, "{}", val)
                }
            }
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Neg(expr) => write!(f, "(-{})", expr),
            Expr::Func(func, expr) => write!(f, "{}({})", func.name(), expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Neg(self.boxed())
    }
}

impl std::ops::Add<f64> for Expr {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        Expr::Add(self.boxed(), Expr::Const(rhs).boxed())
    }
}

impl std::ops::Sub<f64> for Expr {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        Expr::Sub(self.boxed(), Expr::Const(rhs).boxed())
    }
}

impl std::ops::Mul<f64> for Expr {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Expr::Mul(self.boxed(), Expr::Const(rhs).boxed())
    }
}

impl Expr {
    /// BASIC FEATURES

    /// The free variable `x`.
    pub fn x() -> Expr {
        Expr::Var(VARIABLE.to_string())
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn apply(func: Function, arg: Expr) -> Expr {
        Expr::Func(func, arg.boxed())
    }

    /// Returns the constant value if the expression is a bare number.
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }

    /// True if the variable `var` appears anywhere in the tree.
    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Var(name) => name == var,
            Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.contains_var(var) || rhs.contains_var(var),
            Expr::Neg(expr) | Expr::Func(_, expr) => expr.contains_var(var),
        }
    }

    /// Sorted, deduplicated names of all variables in the tree.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Var(name) => names.push(name.clone()),
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
            Expr::Neg(expr) | Expr::Func(_, expr) => expr.collect_variables(names),
        }
    }

    /// True if the expression mentions no variable at all.
    pub fn is_constant(&self) -> bool {
        self.variables().is_empty()
    }
}
