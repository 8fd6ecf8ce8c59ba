#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use veritas_numeris::symbolic::symbolic_engine::Expr;
/// let input = "x^2 - 2";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.eval(2.0).unwrap(), 2.0);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the expression tree of a function of x
/// 2) evaluates it at a point, reporting points where it is undefined
/// 3) differentiates it symbolically and turns it back into a string
///# Example#
/// ```
/// use veritas_numeris::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x^3 - 2x").unwrap();
/// // 3x^2 - 2
/// let df_dx = f.differentiate();
/// println!("df_dx = {}", df_dx);
/// assert_eq!(df_dx.eval(2.0).unwrap(), 10.0);
/// // 6x
/// let d2f_dx2 = df_dx.differentiate();
/// assert_eq!(d2f_dx2.eval(2.0).unwrap(), 12.0);
/// // a constant parameter may also be given as text
/// let x0 = Expr::parse_param("pi/4").unwrap();
/// assert!((x0 - std::f64::consts::FRAC_PI_4).abs() < 1e-15);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
