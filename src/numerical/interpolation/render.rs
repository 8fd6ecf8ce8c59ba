//! Text rendering of interpolating polynomials. Every string produced here is valid input
//! for the expression parser.

/// Rounds to 10 decimals; magnitudes below 1e-10 print as `0`.
pub fn fmt_num(value: f64) -> String {
    if value.abs() < 1e-10 {
        return "0".to_string();
    }
    let rounded = (value * 1e10).round() / 1e10;
    // adding 0.0 turns -0.0 into 0.0
    format!("{}", rounded + 0.0)
}

/// Like [`fmt_num`] but wraps negative numbers in parentheses, for use as a factor.
pub fn fmt_factor(value: f64) -> String {
    let text = fmt_num(value);
    if text.starts_with('-') {
        format!("({})", text)
    } else {
        text
    }
}

/// " + " or " - " depending on the sign of `value`.
pub fn sign_sep(value: f64) -> &'static str {
    if fmt_num(value).starts_with('-') { " - " } else { " + " }
}

/// `(x - c)`, or `(x + |c|)` for a negative node.
pub fn linear_factor(node: f64) -> String {
    if node < 0.0 {
        format!("(x + {})", fmt_num(node.abs()))
    } else {
        format!("(x - {})", fmt_num(node))
    }
}

/// 1st, 2nd, 3rd, 4th, ..., 11th, 12th, 13th, 21st, ...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Monomial `x^power` with coefficient magnitude, e.g. `3x^2`, `0.5x`, `7`.
fn monomial(magnitude: f64, power: usize) -> String {
    let coefficient = fmt_num(magnitude);
    match power {
        0 => coefficient,
        1 => format!("{}x", coefficient),
        _ => format!("{}x^{}", coefficient, power),
    }
}

/// Renders ascending coefficients `c0 + c1 x + ...` as a descending-power polynomial with
/// folded signs: `2x^2 - 3x + 1`.
pub fn descending_polynomial(ascending: &[f64]) -> String {
    let mut text = String::new();
    for (i, power) in (0..ascending.len()).rev().enumerate() {
        let coefficient = ascending[power];
        let negative = fmt_num(coefficient).starts_with('-');
        if i == 0 {
            if negative {
                text.push('-');
            }
        } else {
            text.push_str(if negative { " - " } else { " + " });
        }
        text.push_str(&monomial(coefficient.abs(), power));
    }
    text
}

/// Linear spline tracer `{m}x {+|-} {|c|}`.
pub fn linear_tracer(m: f64, c: f64) -> String {
    format!("{}x{}{}", fmt_num(m), sign_sep(c), fmt_num(c.abs()))
}

/// Cubic spline tracer `{a}x^3 {+|-} {|b|}x^2 {+|-} {|c|}x {+|-} {|d|}`.
pub fn cubic_tracer(a: f64, b: f64, c: f64, d: f64) -> String {
    format!(
        "{}x^3{}{}x^2{}{}x{}{}",
        fmt_num(a),
        sign_sep(b),
        fmt_num(b.abs()),
        sign_sep(c),
        fmt_num(c.abs()),
        sign_sep(d),
        fmt_num(d.abs())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num_rounding() {
        assert_eq!(fmt_num(0.1 + 0.2), "0.3");
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(-1.5), "-1.5");
        assert_eq!(fmt_num(3e-12), "0");
        assert_eq!(fmt_num(-3e-12), "0");
        assert_eq!(fmt_factor(-2.0), "(-2)");
    }

    #[test]
    fn test_ordinals() {
        let names: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 111].map(ordinal).to_vec();
        assert_eq!(
            names,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "111th"]
        );
    }

    #[test]
    fn test_descending_polynomial_folds_signs() {
        assert_eq!(descending_polynomial(&[1.0, -3.0, 2.0]), "2x^2 - 3x + 1");
        assert_eq!(descending_polynomial(&[-1.0, 0.0, -0.5]), "-0.5x^2 + 0x - 1");
        assert_eq!(descending_polynomial(&[4.0]), "4");
    }

    #[test]
    fn test_tracers() {
        assert_eq!(linear_tracer(2.0, -1.0), "2x - 1");
        assert_eq!(linear_tracer(-0.5, 3.0), "-0.5x + 3");
        assert_eq!(cubic_tracer(1.0, -2.0, 0.0, 4.5), "1x^3 - 2x^2 + 0x + 4.5");
    }

    #[test]
    fn test_linear_factor() {
        assert_eq!(linear_factor(2.0), "(x - 2)");
        assert_eq!(linear_factor(-1.5), "(x + 1.5)");
    }
}
