//! Open methods: fixed point, Newton, modified Newton and secant. No bracket is kept, the
//! iterate simply moves until consecutive approximations agree to the tolerance.
use crate::numerical::iteration_trace::{IterationTrace, MethodId, OpenRow};
use crate::numerical::root_finding::{RootFinder, RootSolution};
use crate::numerical::solver_outcome::{INITIAL_ERROR, NumericError};
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info, warn};

impl RootFinder {
    /// Iterates `x_{k+1} = g(x_k)`; `f` is only evaluated to report `f(x)` and to stop on an
    /// exact root.
    pub fn fixed_point(
        &self,
        f: &Expr,
        g: &Expr,
        x0: f64,
    ) -> Result<RootSolution<OpenRow>, NumericError> {
        info!("Fixed point for f(x) = {} with g(x) = {}, x0 = {}", f, g, x0);
        let mut x = x0;
        let mut fx = f.eval(x)?;
        if fx == 0.0 {
            return Ok(RootSolution::immediate(x));
        }
        let mut error = INITIAL_ERROR;
        let mut trace = IterationTrace::new(
            MethodId::FixedPoint,
            OpenRow {
                n: 0,
                x,
                fx,
                error,
            },
        );
        let mut n = 0;
        while !self.control.is_met(error) && n < self.control.max_iterations {
            let next = g.eval(x)?;
            n += 1;
            error = self.control.step_error(next, x)?;
            x = next;
            fx = f.eval(x)?;
            debug!("iteration {}: x = {}, f(x) = {}, error = {:e}", n, x, fx, error);
            trace.push(OpenRow { n, x, fx, error });
            if fx == 0.0 {
                break;
            }
        }
        self.finish(MethodId::FixedPoint, x, fx, error, trace)
    }

    /// Newton-Raphson, `x_{k+1} = x_k - f(x_k) / f'(x_k)` with the derivative taken
    /// symbolically once.
    pub fn newton(&self, f: &Expr, x0: f64) -> Result<RootSolution<OpenRow>, NumericError> {
        let df = f.differentiate();
        info!("Newton for f(x) = {}, f'(x) = {}, x0 = {}", f, df, x0);
        let mut x = x0;
        let mut fx = f.eval(x)?;
        if fx == 0.0 {
            return Ok(RootSolution::immediate(x));
        }
        let mut error = INITIAL_ERROR;
        let mut trace = IterationTrace::new(
            MethodId::Newton,
            OpenRow {
                n: 0,
                x,
                fx,
                error,
            },
        );
        let mut n = 0;
        while !self.control.is_met(error) && n < self.control.max_iterations {
            let dfx = df.eval(x)?;
            if dfx == 0.0 {
                warn!("Newton: derivative vanishes at x = {}", x);
                return Err(NumericError::ZeroDerivative);
            }
            let next = x - fx / dfx;
            n += 1;
            error = self.control.step_error(next, x)?;
            x = next;
            fx = f.eval(x)?;
            debug!("iteration {}: x = {}, f(x) = {}, error = {:e}", n, x, fx, error);
            trace.push(OpenRow { n, x, fx, error });
            if fx == 0.0 {
                break;
            }
        }
        self.finish(MethodId::Newton, x, fx, error, trace)
    }

    /// Modified Newton for roots of multiplicity > 1:
    /// `x_{k+1} = x_k - f f' / (f'^2 - f f'')`.
    pub fn multiple_roots(
        &self,
        f: &Expr,
        x0: f64,
    ) -> Result<RootSolution<OpenRow>, NumericError> {
        let df = f.differentiate();
        let d2f = df.differentiate();
        info!(
            "Multiple roots for f(x) = {}, f'(x) = {}, f''(x) = {}, x0 = {}",
            f, df, d2f, x0
        );
        let mut x = x0;
        let mut fx = f.eval(x)?;
        if fx == 0.0 {
            return Ok(RootSolution::immediate(x));
        }
        let mut error = INITIAL_ERROR;
        let mut trace = IterationTrace::new(
            MethodId::MultipleRoots,
            OpenRow {
                n: 0,
                x,
                fx,
                error,
            },
        );
        let mut n = 0;
        while !self.control.is_met(error) && n < self.control.max_iterations {
            let dfx = df.eval(x)?;
            let d2fx = d2f.eval(x)?;
            let denominator = dfx * dfx - fx * d2fx;
            if denominator == 0.0 {
                warn!("Multiple roots: f'^2 - f f'' vanishes at x = {}", x);
                return Err(NumericError::ZeroDenominator);
            }
            let next = x - fx * dfx / denominator;
            n += 1;
            error = self.control.step_error(next, x)?;
            x = next;
            fx = f.eval(x)?;
            debug!("iteration {}: x = {}, f(x) = {}, error = {:e}", n, x, fx, error);
            trace.push(OpenRow { n, x, fx, error });
            if fx == 0.0 {
                break;
            }
        }
        self.finish(MethodId::MultipleRoots, x, fx, error, trace)
    }

    /// Secant through the last two iterates. Both seeds are trace rows (0 and 1), so the
    /// first update is iteration 2.
    pub fn secant(
        &self,
        f: &Expr,
        x0: f64,
        x1: f64,
    ) -> Result<RootSolution<OpenRow>, NumericError> {
        info!("Secant for f(x) = {}, x0 = {}, x1 = {}", f, x0, x1);
        let (mut x0, mut x1) = (x0, x1);
        let mut f0 = f.eval(x0)?;
        let mut f1 = f.eval(x1)?;
        if f0 == 0.0 {
            return Ok(RootSolution::immediate(x0));
        }
        if f1 == 0.0 {
            return Ok(RootSolution::immediate(x1));
        }
        let mut trace = IterationTrace::new(
            MethodId::Secant,
            OpenRow {
                n: 0,
                x: x0,
                fx: f0,
                error: INITIAL_ERROR,
            },
        );
        trace.push(OpenRow {
            n: 1,
            x: x1,
            fx: f1,
            error: INITIAL_ERROR,
        });
        let mut error = INITIAL_ERROR;
        let mut n = 1;
        while !self.control.is_met(error) && n < self.control.max_iterations {
            if f1 == f0 {
                warn!("Secant: f(x0) = f(x1) = {} at x1 = {}", f1, x1);
                return Err(NumericError::ZeroDenominator);
            }
            let next = x1 - f1 * (x1 - x0) / (f1 - f0);
            n += 1;
            error = self.control.step_error(next, x1)?;
            (x0, f0) = (x1, f1);
            x1 = next;
            f1 = f.eval(x1)?;
            debug!("iteration {}: x = {}, f(x) = {}, error = {:e}", n, x1, f1, error);
            trace.push(OpenRow {
                n,
                x: x1,
                fx: f1,
                error,
            });
            if f1 == 0.0 {
                break;
            }
        }
        self.finish(MethodId::Secant, x1, f1, error, trace)
    }

    fn finish(
        &self,
        method: MethodId,
        x: f64,
        fx: f64,
        error: f64,
        trace: IterationTrace<OpenRow>,
    ) -> Result<RootSolution<OpenRow>, NumericError> {
        if self.control.is_met(error) || fx == 0.0 {
            info!(
                "{} converged to {} in {} iterations",
                method,
                x,
                trace.iterations()
            );
            Ok(RootSolution::traced(x, trace))
        } else {
            self.budget_exhausted(method, error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::solver_outcome::IterationControl;
    use approx::assert_relative_eq;

    fn f(formula: &str) -> Expr {
        Expr::parse_expression(formula).unwrap()
    }

    fn finder(tol: f64, niter: usize) -> RootFinder {
        RootFinder::new(IterationControl::new(tol, niter, false))
    }

    #[test]
    fn test_newton_constant_function_has_zero_derivative() {
        let result = finder(1e-7, 100).newton(&f("1"), 1.0);
        assert_eq!(result, Err(NumericError::ZeroDerivative));
        assert_eq!(result.unwrap_err().to_string(), "Derivative is zero");
    }

    #[test]
    fn test_newton_converges_quadratically() {
        let solution = finder(1e-12, 100).newton(&f("x^2 - 2"), 1.0).unwrap();
        assert_relative_eq!(solution.root, 2.0_f64.sqrt(), epsilon = 1e-12);
        let trace = solution.trace.unwrap();
        assert!(trace.iterations() <= 7);
        assert_eq!(trace.rows()[1].x, 1.5);
        assert_eq!(trace.rows()[1].error, 0.5);
    }

    #[test]
    fn test_newton_budget_exhausted() {
        // no real root
        let result = finder(1e-7, 20).newton(&f("x^2 + 1"), 0.5);
        assert_eq!(result, Err(NumericError::ConvergenceFailure { niter: 20 }));
    }

    #[test]
    fn test_multiple_roots_on_double_root() {
        let fx = f("(x - 1)^2 * (x + 2)");
        let modified = finder(1e-10, 100).multiple_roots(&fx, 2.0).unwrap();
        assert_relative_eq!(modified.root, 1.0, epsilon = 1e-8);
        let plain = finder(1e-10, 100).newton(&fx, 2.0).unwrap();
        assert!(modified.iterations() < plain.iterations());
    }

    #[test]
    fn test_multiple_roots_zero_denominator() {
        // f' and f'' both vanish at 0
        let result = finder(1e-10, 100).multiple_roots(&f("x^3 + 1"), 0.0);
        assert_eq!(result, Err(NumericError::ZeroDenominator));
    }

    #[test]
    fn test_fixed_point_cosine() {
        let solution = finder(1e-8, 200)
            .fixed_point(&f("cos(x) - x"), &f("cos(x)"), 0.5)
            .unwrap();
        assert_relative_eq!(solution.root, 0.7390851332151607, epsilon = 1e-7);
        let trace = solution.trace.unwrap();
        assert_eq!(trace.rows()[0].x, 0.5);
        assert_eq!(trace.rows()[0].error, 100.0);
    }

    #[test]
    fn test_fixed_point_divergent() {
        let result = finder(1e-8, 30).fixed_point(&f("x^2 - 3x + 2"), &f("x^2 - 2x + 2"), 3.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_point_root_at_seed() {
        let solution = finder(1e-8, 30)
            .fixed_point(&f("x - 2"), &f("x/2 + 1"), 2.0)
            .unwrap();
        assert_eq!(solution.root, 2.0);
        assert!(solution.trace.is_none());
    }

    #[test]
    fn test_secant_rows_start_with_both_seeds() {
        let solution = finder(1e-10, 100).secant(&f("x^2 - 2"), 1.0, 2.0).unwrap();
        assert_relative_eq!(solution.root, 2.0_f64.sqrt(), epsilon = 1e-10);
        let trace = solution.trace.unwrap();
        let rows = trace.rows();
        assert_eq!((rows[0].x, rows[0].error), (1.0, 100.0));
        assert_eq!((rows[1].x, rows[1].error), (2.0, 100.0));
        assert_relative_eq!(rows[2].x, 4.0 / 3.0, epsilon = 1e-15);
        assert_eq!(rows[2].n, 2);
    }

    #[test]
    fn test_secant_flat_secant_line() {
        // f(-1) = f(1)
        let result = finder(1e-10, 100).secant(&f("x^2 - 2"), -1.0, 1.0);
        assert_eq!(result, Err(NumericError::ZeroDenominator));
        assert_eq!(result.unwrap_err().to_string(), "Division by zero");
    }

    #[test]
    fn test_secant_seed_is_root() {
        let solution = finder(1e-10, 100).secant(&f("x^2 - 4"), 0.0, 2.0).unwrap();
        assert_eq!(solution.root, 2.0);
        assert!(solution.trace.is_none());
    }

    #[test]
    fn test_relative_error_at_zero_is_reported() {
        let control = IterationControl::new(1e-10, 100, true);
        // Newton on f = x lands exactly on 0 after one step
        let result = RootFinder::new(control).newton(&f("x"), 1.0);
        assert!(matches!(result, Err(NumericError::Domain(_))));
    }
}
