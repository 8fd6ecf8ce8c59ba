//! Bracketing methods: the root stays inside `[a, b]` with `f(a) * f(b) < 0` at every step.
use crate::numerical::iteration_trace::{BracketRow, IterationTrace, MethodId};
use crate::numerical::root_finding::{RootFinder, RootSolution};
use crate::numerical::solver_outcome::{INITIAL_ERROR, NumericError};
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info};

/// What happened when checking the initial bracket.
enum Bracket {
    /// An endpoint is an exact root.
    Root(f64),
    Valid { fa: f64, fb: f64 },
}

fn check_bracket(f: &Expr, a: f64, b: f64) -> Result<Bracket, NumericError> {
    if b < a {
        return Err(NumericError::validation("a must be less than b"));
    }
    let fa = f.eval(a)?;
    let fb = f.eval(b)?;
    if fa == 0.0 {
        return Ok(Bracket::Root(a));
    }
    if fb == 0.0 {
        return Ok(Bracket::Root(b));
    }
    if fa * fb >= 0.0 {
        return Err(NumericError::validation(format!(
            "[{}, {}] is not a valid interval",
            a, b
        )));
    }
    Ok(Bracket::Valid { fa, fb })
}

impl RootFinder {
    /// Halves the bracket until two consecutive midpoints are closer than the tolerance.
    pub fn bisection(
        &self,
        f: &Expr,
        a: f64,
        b: f64,
    ) -> Result<RootSolution<BracketRow>, NumericError> {
        info!("Bisection for f(x) = {} on [{}, {}]", f, a, b);
        let mut fa = match check_bracket(f, a, b)? {
            Bracket::Root(root) => return Ok(RootSolution::immediate(root)),
            Bracket::Valid { fa, .. } => fa,
        };
        let (mut a, mut b) = (a, b);
        let mut xm = (a + b) / 2.0;
        let mut fm = f.eval(xm)?;
        let mut error = INITIAL_ERROR;
        let mut trace = IterationTrace::new(
            MethodId::Bisection,
            BracketRow {
                n: 0,
                a,
                xm,
                b,
                fxm: fm,
                error,
            },
        );
        let mut n = 0;
        while !self.control.is_met(error) && n < self.control.max_iterations {
            if fm == 0.0 {
                return Ok(RootSolution::traced(xm, trace));
            }
            // keep the half where the sign changes
            if fa * fm > 0.0 {
                a = xm;
                fa = fm;
            } else {
                b = xm;
            }
            n += 1;
            let previous = xm;
            xm = (a + b) / 2.0;
            fm = f.eval(xm)?;
            error = self.control.step_error(xm, previous)?;
            debug!("iteration {}: [{}, {}], xm = {}, error = {:e}", n, a, b, xm, error);
            trace.push(BracketRow {
                n,
                a,
                xm,
                b,
                fxm: fm,
                error,
            });
        }
        if self.control.is_met(error) || fm == 0.0 {
            info!("Bisection converged to {} in {} iterations", xm, n);
            Ok(RootSolution::traced(xm, trace))
        } else {
            self.budget_exhausted(MethodId::Bisection, error)
        }
    }

    /// Regula falsi: the new point is where the chord through both endpoints crosses zero.
    pub fn false_position(
        &self,
        f: &Expr,
        a: f64,
        b: f64,
    ) -> Result<RootSolution<BracketRow>, NumericError> {
        info!("False position for f(x) = {} on [{}, {}]", f, a, b);
        let (mut fa, mut fb) = match check_bracket(f, a, b)? {
            Bracket::Root(root) => return Ok(RootSolution::immediate(root)),
            Bracket::Valid { fa, fb } => (fa, fb),
        };
        let (mut a, mut b) = (a, b);
        let mut xm = chord_root(a, b, fa, fb)?;
        let mut fm = f.eval(xm)?;
        let mut error = INITIAL_ERROR;
        let mut trace = IterationTrace::new(
            MethodId::FalsePosition,
            BracketRow {
                n: 0,
                a,
                xm,
                b,
                fxm: fm,
                error,
            },
        );
        let mut n = 0;
        while !self.control.is_met(error) && n < self.control.max_iterations {
            if fm == 0.0 {
                return Ok(RootSolution::traced(xm, trace));
            }
            if fm * fb < 0.0 {
                a = xm;
                fa = fm;
            } else {
                b = xm;
                fb = fm;
            }
            n += 1;
            let previous = xm;
            xm = chord_root(a, b, fa, fb)?;
            fm = f.eval(xm)?;
            error = self.control.step_error(xm, previous)?;
            debug!("iteration {}: [{}, {}], xm = {}, error = {:e}", n, a, b, xm, error);
            trace.push(BracketRow {
                n,
                a,
                xm,
                b,
                fxm: fm,
                error,
            });
        }
        if self.control.is_met(error) || fm == 0.0 {
            info!("False position converged to {} in {} iterations", xm, n);
            Ok(RootSolution::traced(xm, trace))
        } else {
            self.budget_exhausted(MethodId::FalsePosition, error)
        }
    }
}

fn chord_root(a: f64, b: f64, fa: f64, fb: f64) -> Result<f64, NumericError> {
    if fb == fa {
        return Err(NumericError::ZeroDenominator);
    }
    Ok(b - fb * (b - a) / (fb - fa))
}
