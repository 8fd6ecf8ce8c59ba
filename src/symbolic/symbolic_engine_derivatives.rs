//! # Symbolic Engine Derivatives Module
//!
//! Extends [`Expr`] with everything the numerical methods need from a parsed formula:
//!
//! ### Differentiation
//! - `diff(var: &str)` - exact structural derivative (sum, product, quotient, power and chain rules)
//! - `differentiate()` - `diff("x")` followed by `simplify()`; call it twice for the second derivative
//!
//! ### Evaluation
//! - `eval(x)` - recursive evaluation at a point, reporting division by zero and every
//!   undefined real operation as a [`DomainError`]
//!
//! ### Parsing and Utilities
//! - `parse_expression()` - string to symbolic expression
//! - `parse_param()` - string holding a constant expression to a number
//! - `simplify()` - constant folding and neutral-element removal
//! - `sym_to_str()` - symbolic expression to string
use crate::symbolic::parse_expr::parse_expression_func;
use crate::symbolic::symbolic_engine::{DomainError, Expr, Function, ParseError, VARIABLE};

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard differentiation rules:
    /// - Power rule: d/dx(u^n) = n*u^(n-1)*u' for a constant exponent
    /// - Exponential rule: d/dx(a^v) = a^v*ln(a)*v' for a constant base
    /// - General power: d/dx(u^v) = u^v*(v'*ln(u) + v*u'/u)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule for every elementary function
    ///
    /// The result is not simplified, use [`Expr::differentiate`] for a readable tree.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x^2").unwrap();
    /// let df_dx = f.diff("x"); // 2*x^1*1
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(lhs.diff(var).boxed(), rhs.diff(var).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(lhs.diff(var).boxed(), rhs.diff(var).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Expr::Mul(lhs.diff(var).boxed(), rhs.clone()).boxed(),
                Expr::Mul(lhs.clone(), rhs.diff(var).boxed()).boxed(),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Expr::Sub(
                    Expr::Mul(lhs.diff(var).boxed(), rhs.clone()).boxed(),
                    Expr::Mul(lhs.clone(), rhs.diff(var).boxed()).boxed(),
                )
                .boxed(),
                Expr::Pow(rhs.clone(), Expr::Const(2.0).boxed()).boxed(),
            ),
            Expr::Pow(base, exp) => {
                let base_varies = base.contains_var(var);
                let exp_varies = exp.contains_var(var);
                match (base_varies, exp_varies) {
                    (_, false) => Expr::Mul(
                        Expr::Mul(
                            exp.clone(),
                            Expr::Pow(
                                base.clone(),
                                Expr::Sub(exp.clone(), Expr::Const(1.0).boxed()).boxed(),
                            )
                            .boxed(),
                        )
                        .boxed(),
                        base.diff(var).boxed(),
                    ),
                    (false, true) => Expr::Mul(
                        Expr::Mul(
                            self.clone().boxed(),
                            Expr::apply(Function::Ln, (**base).clone()).boxed(),
                        )
                        .boxed(),
                        exp.diff(var).boxed(),
                    ),
                    (true, true) => Expr::Mul(
                        self.clone().boxed(),
                        Expr::Add(
                            Expr::Mul(
                                exp.diff(var).boxed(),
                                Expr::apply(Function::Ln, (**base).clone()).boxed(),
                            )
                            .boxed(),
                            Expr::Div(
                                Expr::Mul(exp.clone(), base.diff(var).boxed()).boxed(),
                                base.clone(),
                            )
                            .boxed(),
                        )
                        .boxed(),
                    ),
                }
            }
            Expr::Neg(expr) => Expr::Neg(expr.diff(var).boxed()),
            Expr::Func(func, arg) => {
                let inner = arg.diff(var);
                let u = (**arg).clone();
                let outer = match func {
                    Function::Exp => Expr::apply(Function::Exp, u),
                    Function::Ln => Expr::Div(Expr::Const(1.0).boxed(), u.boxed()),
                    Function::Sin => Expr::apply(Function::Cos, u),
                    Function::Cos => Expr::Neg(Expr::apply(Function::Sin, u).boxed()),
                    Function::Tan => Expr::Div(
                        Expr::Const(1.0).boxed(),
                        Expr::apply(Function::Cos, u).pow(Expr::Const(2.0)).boxed(),
                    ),
                    Function::Sqrt => Expr::Div(
                        Expr::Const(1.0).boxed(),
                        Expr::Mul(
                            Expr::Const(2.0).boxed(),
                            Expr::apply(Function::Sqrt, u).boxed(),
                        )
                        .boxed(),
                    ),
                    Function::Asin => Expr::Div(
                        Expr::Const(1.0).boxed(),
                        Expr::apply(Function::Sqrt, Expr::Const(1.0) - u.pow(Expr::Const(2.0)))
                            .boxed(),
                    ),
                    Function::Acos => Expr::Div(
                        Expr::Const(-1.0).boxed(),
                        Expr::apply(Function::Sqrt, Expr::Const(1.0) - u.pow(Expr::Const(2.0)))
                            .boxed(),
                    ),
                    Function::Atan => Expr::Div(
                        Expr::Const(1.0).boxed(),
                        (Expr::Const(1.0) + u.pow(Expr::Const(2.0))).boxed(),
                    ),
                };
                Expr::Mul(outer.boxed(), inner.boxed())
            }
        }
    } // end of diff

    /// Derivative with respect to `x`, simplified.
    pub fn differentiate(&self) -> Expr {
        self.diff(VARIABLE).simplify()
    }

    /// SIMPLIFICATION

    /// Folds constant sub-trees and removes neutral elements (`u + 0`, `u * 1`, `u ^ 1`, ...).
    ///
    /// Sub-trees whose folding would not give a finite number (e.g. `1 / 0`) are kept as they
    /// are, so that evaluation still reports the domain violation.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_const(), rhs.as_const()) {
                    (Some(a), Some(b)) => Expr::Const(a + b),
                    (Some(a), None) if a == 0.0 => rhs,
                    (None, Some(b)) if b == 0.0 => lhs,
                    _ => Expr::Add(lhs.boxed(), rhs.boxed()),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_const(), rhs.as_const()) {
                    (Some(a), Some(b)) => Expr::Const(a - b),
                    (Some(a), None) if a == 0.0 => Expr::Neg(rhs.boxed()).simplify(),
                    (None, Some(b)) if b == 0.0 => lhs,
                    _ => Expr::Sub(lhs.boxed(), rhs.boxed()),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_const(), rhs.as_const()) {
                    (Some(a), Some(b)) => Expr::Const(a * b),
                    (Some(a), _) | (_, Some(a)) if a == 0.0 => Expr::Const(0.0),
                    (Some(a), None) if a == 1.0 => rhs,
                    (None, Some(b)) if b == 1.0 => lhs,
                    (Some(a), None) if a == -1.0 => Expr::Neg(rhs.boxed()),
                    (None, Some(b)) if b == -1.0 => Expr::Neg(lhs.boxed()),
                    _ => Expr::Mul(lhs.boxed(), rhs.boxed()),
                }
            }
            Expr::Div(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify(), rhs.simplify());
                match (lhs.as_const(), rhs.as_const()) {
                    (Some(a), Some(b)) if b != 0.0 => Expr::Const(a / b),
                    (None, Some(b)) if b == 1.0 => lhs,
                    (Some(a), None) if a == 0.0 => Expr::Const(0.0),
                    _ => Expr::Div(lhs.boxed(), rhs.boxed()),
                }
            }
            Expr::Pow(base, exp) => {
                let (base, exp) = (base.simplify(), exp.simplify());
                match (base.as_const(), exp.as_const()) {
                    (Some(a), Some(b)) if a.powf(b).is_finite() => Expr::Const(a.powf(b)),
                    (_, Some(b)) if b == 0.0 => Expr::Const(1.0),
                    (_, Some(b)) if b == 1.0 => base,
                    _ => Expr::Pow(base.boxed(), exp.boxed()),
                }
            }
            Expr::Neg(expr) => match expr.simplify() {
                Expr::Const(val) => Expr::Const(-val),
                Expr::Neg(inner) => *inner,
                other => Expr::Neg(other.boxed()),
            },
            Expr::Func(func, arg) => {
                let arg = arg.simplify();
                match arg.as_const() {
                    Some(val) => match apply_function(*func, val, val) {
                        Ok(folded) => Expr::Const(folded),
                        Err(_) => Expr::Func(*func, arg.boxed()),
                    },
                    None => Expr::Func(*func, arg.boxed()),
                }
            }
        }
    }

    /// EVALUATION

    /// Evaluates the expression with the free variable bound to `x`.
    ///
    /// # Errors
    /// - [`DomainError::DivisionByZero`] for `u / 0` and `0 ^ negative`
    /// - [`DomainError::Undefined`] for logarithms of non-positive numbers, square roots of
    ///   negative numbers, inverse sine/cosine outside [-1, 1] and powers giving NaN
    ///   (e.g. an even root of a negative number)
    /// - [`DomainError::NonFinite`] for overflow to infinity
    pub fn eval(&self, x: f64) -> Result<f64, DomainError> {
        let value = match self {
            Expr::Var(_) => x,
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval(x)? + rhs.eval(x)?,
            Expr::Sub(lhs, rhs) => lhs.eval(x)? - rhs.eval(x)?,
            Expr::Mul(lhs, rhs) => lhs.eval(x)? * rhs.eval(x)?,
            Expr::Div(lhs, rhs) => {
                let numerator = lhs.eval(x)?;
                let denominator = rhs.eval(x)?;
                if denominator == 0.0 {
                    return Err(DomainError::DivisionByZero { at: x });
                }
                numerator / denominator
            }
            Expr::Pow(base, exp) => {
                let base_val = base.eval(x)?;
                let exp_val = exp.eval(x)?;
                if base_val == 0.0 && exp_val < 0.0 {
                    return Err(DomainError::DivisionByZero { at: x });
                }
                let value = base_val.powf(exp_val);
                if value.is_nan() {
                    return Err(DomainError::Undefined {
                        operation: format!("{} ^ {}", base_val, exp_val),
                        at: x,
                    });
                }
                value
            }
            Expr::Neg(expr) => -expr.eval(x)?,
            Expr::Func(func, arg) => apply_function(*func, arg.eval(x)?, x)?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DomainError::NonFinite { at: x })
        }
    }

    /// EXPRESSION PARSING FROM STRINGS

    /// Parses a mathematical expression from string representation.
    ///
    /// # Supported Syntax
    /// - Variable: x
    /// - Constants: 3.14, 2.5e-3, pi, e
    /// - Operators: +, -, *, /, ^ (alias **), unary minus
    /// - Implicit multiplication: 2x, 3(x + 1), (x - 1)(x + 1)
    /// - Functions: exp, ln (log), sin, cos, tan (tg), sqrt, asin, acos, atan
    /// - Parentheses for grouping
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("x^2 + 2x + 1")?;
    /// ```
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        parse_expression_func(input)
    }

    /// Parses a numeric parameter given as text, e.g. `"0"`, `"1e-3"` or `"pi/4"`.
    pub fn parse_param(input: &str) -> Result<f64, ParseError> {
        let expr = parse_expression_func(input)?;
        if !expr.is_constant() {
            return Err(ParseError::NotConstant(input.trim().to_string()));
        }
        expr.eval(0.0)
            .map_err(|_| ParseError::NotConstant(input.trim().to_string()))
    }

    /// Converts symbolic expression to human-readable string representation.
    pub fn sym_to_str(&self) -> String {
        self.to_string()
    }
}

/// Applies an elementary function to an already evaluated argument; `at` is the point of
/// evaluation reported in errors.
fn apply_function(func: Function, value: f64, at: f64) -> Result<f64, DomainError> {
    let undefined = |name: &str| DomainError::Undefined {
        operation: format!("{}({})", name, value),
        at,
    };
    match func {
        Function::Exp => Ok(value.exp()),
        Function::Ln if value <= 0.0 => Err(undefined("ln")),
        Function::Ln => Ok(value.ln()),
        Function::Sin => Ok(value.sin()),
        Function::Cos => Ok(value.cos()),
        Function::Tan => Ok(value.tan()),
        Function::Sqrt if value < 0.0 => Err(undefined("sqrt")),
        Function::Sqrt => Ok(value.sqrt()),
        Function::Asin if value.abs() > 1.0 => Err(undefined("asin")),
        Function::Asin => Ok(value.asin()),
        Function::Acos if value.abs() > 1.0 => Err(undefined("acos")),
        Function::Acos => Ok(value.acos()),
        Function::Atan => Ok(value.atan()),
    }
}
