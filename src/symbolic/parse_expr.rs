//! Turns a text formula into a symbolic expression.
//!
//! The grammar, from loosest to tightest binding:
//!
//! ```text
//!  sum      := product (('+' | '-') product)*
//!  product  := unary (('*' | '/') unary | implicit)*
//!  implicit := power            -- only when the next char starts an identifier or '('
//!  unary    := '-' unary | '+' unary | power
//!  power    := primary (('^' | '**') unary)?     -- right associative
//!  primary  := number | '(' sum ')' | function '(' sum ')' | identifier
//! ```
//!
//! Implicit multiplication covers `2x`, `3(x+1)`, `(x-1)(x+1)` and `x(x+1)`.
//! Identifiers other than the free variable `x`, the constants `pi` and `e` and the
//! function names are rejected after parsing with [`ParseError::UnknownSymbol`].
//! # Example
//! ```
//! use veritas_numeris::symbolic::symbolic_engine::Expr;
//! let f = Expr::parse_expression("2x^2 - 3(x + 1)").unwrap();
//! assert_eq!(f.eval(2.0).unwrap(), -1.0);
//! ```
use crate::symbolic::symbolic_engine::{Expr, Function, ParseError, VARIABLE};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, one_of, satisfy},
    combinator::{map, not, opt, peek, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded, terminated},
};
use std::f64::consts::{E, PI};

/// Parses the whole input into an [`Expr`] and checks that it is written in `x` only.
pub fn parse_expression_func(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let expr = match parse_sum(input) {
        Ok((rest, expr)) => {
            let rest = rest.trim_start();
            if !rest.is_empty() {
                return Err(unexpected(input, rest));
            }
            expr
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(unexpected(input, e.input));
        }
        Err(nom::Err::Incomplete(_)) => return Err(unexpected(input, "")),
    };
    if let Some(unknown) = expr.variables().into_iter().find(|name| name != VARIABLE) {
        return Err(ParseError::UnknownSymbol(unknown));
    }
    Ok(expr)
}

fn unexpected(input: &str, rest: &str) -> ParseError {
    let rest = rest.trim_start();
    let found = if rest.is_empty() {
        "end of input".to_string()
    } else {
        rest.chars().take(16).collect()
    };
    ParseError::UnexpectedInput {
        position: input.len() - rest.len(),
        found,
    }
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_product(input)?;
    let (input, rest) =
        many0(pair(preceded(multispace0, one_of("+-")), parse_product)).parse(input)?;
    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => Expr::Add(acc.boxed(), rhs.boxed()),
        _ => Expr::Sub(acc.boxed(), rhs.boxed()),
    });
    Ok((input, expr))
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_unary(input)?;
    let (input, rest) = many0(alt((explicit_factor, implicit_factor))).parse(input)?;
    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '/' => Expr::Div(acc.boxed(), rhs.boxed()),
        _ => Expr::Mul(acc.boxed(), rhs.boxed()),
    });
    Ok((input, expr))
}

// '*' or '/' followed by an operand; "**" belongs to the power rule
fn explicit_factor(input: &str) -> IResult<&str, (char, Expr)> {
    let (input, _) = multispace0(input)?;
    let (input, op) = alt((terminated(char('*'), not(char('*'))), char('/'))).parse(input)?;
    let (input, rhs) = parse_unary(input)?;
    Ok((input, (op, rhs)))
}

// 2x, 3(x+1), (x-1)(x+1)
fn implicit_factor(input: &str) -> IResult<&str, (char, Expr)> {
    let (input, _) = multispace0(input)?;
    let (input, _) = peek(satisfy(|c: char| c.is_alphabetic() || c == '_' || c == '(')).parse(input)?;
    let (input, rhs) = parse_power(input)?;
    Ok((input, ('*', rhs)))
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((
        map(preceded(char('-'), parse_unary), |expr| match expr {
            Expr::Const(val) => Expr::Const(-val),
            other => Expr::Neg(other.boxed()),
        }),
        preceded(char('+'), parse_unary),
        parse_power,
    ))
    .parse(input)
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = parse_primary(input)?;
    let (input, exponent) = opt(preceded(
        delimited(multispace0, alt((tag("**"), tag("^"))), multispace0),
        parse_unary,
    ))
    .parse(input)?;
    let expr = match exponent {
        Some(exponent) => base.pow(exponent),
        None => base,
    };
    Ok((input, expr))
}

fn parse_primary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((parse_number, parse_parenthesized, parse_identifier)).parse(input)
}

fn parse_parenthesized(input: &str) -> IResult<&str, Expr> {
    delimited(char('('), parse_sum, preceded(multispace0, char(')'))).parse(input)
}

fn unsigned_float(input: &str) -> IResult<&str, &str> {
    preceded(
        peek(satisfy(|c: char| c.is_ascii_digit() || c == '.')),
        recognize_float,
    )
    .parse(input)
}

fn mantissa(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), opt(digit1))))),
        recognize(pair(char('.'), digit1)),
    ))
    .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Expr> {
    // recognize_float commits once it sees an exponent marker; in `2e` or `2exp(x)` the
    // letter starts the next implicit factor instead
    let (rest, text) = match unsigned_float(input) {
        Err(nom::Err::Failure(_)) => mantissa(input)?,
        other => other?,
    };
    let value = text
        .parse::<f64>()
        .map_err(|_| nom::Err::Error(Error::new(input, ErrorKind::Float)))?;
    Ok((rest, Expr::Const(value)))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parse_identifier(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = identifier(input)?;
    if let Some(func) = Function::from_name(name) {
        // a function name must be applied to a parenthesised argument
        return match preceded(multispace0, parse_parenthesized).parse(rest) {
            Ok((rest, arg)) => Ok((rest, Expr::apply(func, arg))),
            Err(nom::Err::Error(e)) => Err(nom::Err::Failure(e)),
            Err(other) => Err(other),
        };
    }
    let expr = match name {
        "pi" => Expr::Const(PI),
        "e" => Expr::Const(E),
        _ => Expr::Var(name.to_string()),
    };
    Ok((rest, expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::x()
    }

    #[test]
    fn test_parse_polynomial_precedence() {
        let parsed = parse_expression_func("x^2-2").unwrap();
        let expected = Expr::Sub(x().pow(Expr::Const(2.0)).boxed(), Expr::Const(2.0).boxed());
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_caret_and_double_star_are_the_same_operator() {
        let caret = parse_expression_func("x^3").unwrap();
        let stars = parse_expression_func("x ** 3").unwrap();
        assert_eq!(caret, stars);
    }

    #[test]
    fn test_power_is_right_associative() {
        let parsed = parse_expression_func("x^2^3").unwrap();
        let expected = x().pow(Expr::Const(2.0).pow(Expr::Const(3.0)));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_implicit_multiplication_with_coefficient() {
        let implicit = parse_expression_func("2x").unwrap();
        let explicit = parse_expression_func("2*x").unwrap();
        assert_eq!(implicit, explicit);
        let spaced = parse_expression_func("2 x").unwrap();
        assert_eq!(spaced, explicit);
    }

    #[test]
    fn test_implicit_multiplication_binds_tighter_than_sum() {
        let parsed = parse_expression_func("3x^2 + 1").unwrap();
        let expected = Expr::Add(
            Expr::Mul(Expr::Const(3.0).boxed(), x().pow(Expr::Const(2.0)).boxed()).boxed(),
            Expr::Const(1.0).boxed(),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_implicit_multiplication_of_brackets() {
        let parsed = parse_expression_func("(x - 1)(x + 1)").unwrap();
        let expected = Expr::Mul(
            Expr::Sub(x().boxed(), Expr::Const(1.0).boxed()).boxed(),
            Expr::Add(x().boxed(), Expr::Const(1.0).boxed()).boxed(),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(parse_expression_func("-3").unwrap(), Expr::Const(-3.0));
        let parsed = parse_expression_func("-x^2").unwrap();
        assert_eq!(parsed, Expr::Neg(x().pow(Expr::Const(2.0)).boxed()));
        let parsed = parse_expression_func("x^-1").unwrap();
        assert_eq!(parsed, x().pow(Expr::Const(-1.0)));
    }

    #[test]
    fn test_functions_and_constants() {
        let parsed = parse_expression_func("sin(pi x)").unwrap();
        let expected = Expr::apply(
            Function::Sin,
            Expr::Mul(Expr::Const(PI).boxed(), x().boxed()),
        );
        assert_eq!(parsed, expected);
        let parsed = parse_expression_func("log(x) + tg(x)").unwrap();
        let expected = Expr::Add(
            Expr::apply(Function::Ln, x()).boxed(),
            Expr::apply(Function::Tan, x()).boxed(),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(parse_expression_func("1e-3").unwrap(), Expr::Const(1e-3));
        assert_eq!(parse_expression_func(".5").unwrap(), Expr::Const(0.5));
        assert_eq!(parse_expression_func("2.5E2").unwrap(), Expr::Const(250.0));
    }

    #[test]
    fn test_decimal_at_end_of_input() {
        assert_eq!(parse_expression_func("1.1").unwrap(), Expr::Const(1.1));
        assert_eq!(parse_expression_func("0.5").unwrap(), Expr::Const(0.5));
        assert_eq!(parse_expression_func("12.").unwrap(), Expr::Const(12.0));
        assert_eq!(
            parse_expression_func("x - 0.5").unwrap(),
            Expr::Sub(x().boxed(), Expr::Const(0.5).boxed())
        );
        assert_eq!(
            parse_expression_func("x^0.5").unwrap(),
            x().pow(Expr::Const(0.5))
        );
        assert_eq!(
            parse_expression_func("x^2 - 2.25").unwrap(),
            Expr::Sub(x().pow(Expr::Const(2.0)).boxed(), Expr::Const(2.25).boxed())
        );
    }

    #[test]
    fn test_letter_e_after_a_number() {
        // no digits after the marker, so `e` is Euler's number or the start of `exp`
        assert_eq!(
            parse_expression_func("2e").unwrap(),
            Expr::Mul(Expr::Const(2.0).boxed(), Expr::Const(E).boxed())
        );
        assert_eq!(
            parse_expression_func("2exp(x)").unwrap(),
            Expr::Mul(
                Expr::Const(2.0).boxed(),
                Expr::apply(Function::Exp, x()).boxed()
            )
        );
        assert_eq!(parse_expression_func("2e2").unwrap(), Expr::Const(200.0));
        assert_eq!(parse_expression_func("0.5e-1").unwrap(), Expr::Const(0.05));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_expression_func(""), Err(ParseError::Empty));
        assert_eq!(parse_expression_func("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert!(matches!(
            parse_expression_func("(x + 1"),
            Err(ParseError::UnexpectedInput { .. })
        ));
        assert!(matches!(
            parse_expression_func("x + 1)"),
            Err(ParseError::UnexpectedInput { position: 5, .. })
        ));
    }

    #[test]
    fn test_dangling_operator() {
        assert!(matches!(
            parse_expression_func("x +"),
            Err(ParseError::UnexpectedInput { .. })
        ));
        assert!(matches!(
            parse_expression_func("* x"),
            Err(ParseError::UnexpectedInput { position: 0, .. })
        ));
        assert!(matches!(
            parse_expression_func("x ^"),
            Err(ParseError::UnexpectedInput { .. })
        ));
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(
            parse_expression_func("x + y"),
            Err(ParseError::UnknownSymbol("y".to_string()))
        );
        assert_eq!(
            parse_expression_func("foo(x)"),
            Err(ParseError::UnknownSymbol("foo".to_string()))
        );
    }

    #[test]
    fn test_function_without_argument() {
        assert!(matches!(
            parse_expression_func("sin x"),
            Err(ParseError::UnexpectedInput { .. })
        ));
    }
}
