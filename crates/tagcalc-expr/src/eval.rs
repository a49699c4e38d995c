use crate::ast::Expr;
use crate::parser::{ParseError, Parser};

/// Evaluates a parsed expression with IEEE-754 double semantics.
///
/// Evaluation itself cannot fail: division by zero and overflow produce
/// infinities or NaN just as the underlying float operations do.
pub fn eval(expr: &Expr) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Paren(inner) => eval(inner),
        Expr::UnaryOp { op, operand } => op.apply(eval(operand)),
        Expr::BinaryOp { left, op, right } => op.apply(eval(left), eval(right)),
    }
}

/// Parses and evaluates `source` in one step.
pub fn calculate(source: &str) -> Result<f64, ParseError> {
    let expr = Parser::parse(source)?;
    Ok(eval(&expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MAX_OPERATORS;

    #[test]
    fn test_arithmetic() {
        assert_eq!(calculate("3+4*2"), Ok(11.0));
        assert_eq!(calculate("2+5*3"), Ok(17.0));
        assert_eq!(calculate("(3+4)*2"), Ok(14.0));
        assert_eq!(calculate("10-4-3"), Ok(3.0));
        assert_eq!(calculate("12.5/2"), Ok(6.25));
    }

    #[test]
    fn test_power_is_exponentiation() {
        assert_eq!(calculate("2^10"), Ok(1024.0));
        assert_eq!(calculate("2^3^2"), Ok(64.0));
        assert_eq!(calculate("-2^2"), Ok(-4.0));
        assert_eq!(calculate("2^-1"), Ok(0.5));
        assert_eq!(calculate("(-8)^(1/3)").map(f64::is_nan), Ok(true));
    }

    #[test]
    fn test_signs() {
        assert_eq!(calculate("3--5"), Ok(8.0));
        assert_eq!(calculate("-5"), Ok(-5.0));
        assert_eq!(calculate("-(2+3)*2"), Ok(-10.0));
    }

    #[test]
    fn test_division_by_zero_follows_ieee() {
        assert_eq!(calculate("1/0"), Ok(f64::INFINITY));
        assert_eq!(calculate("-1/0"), Ok(f64::NEG_INFINITY));
        assert!(calculate("0/0").unwrap().is_nan());
    }

    #[test]
    fn test_literal_forms() {
        assert_eq!(calculate("0x10+1"), Ok(17.0));
        assert_eq!(calculate("1e3/4"), Ok(250.0));
        assert_eq!(calculate(" 5 * .5 "), Ok(2.5));
        assert_eq!(calculate("Infinity-1"), Ok(f64::INFINITY));
        assert!(calculate("NaN+1").unwrap().is_nan());
    }

    #[test]
    fn test_malformed_input_fails() {
        assert_eq!(calculate(""), Err(ParseError::EmptyExpression));
        assert_eq!(calculate("(3+4"), Err(ParseError::UnexpectedEof));
        assert!(calculate("3++").is_err());
        assert!(calculate("3)(4").is_err());
        assert!(calculate("2(3)").is_err());
    }

    #[test]
    fn test_long_chains_fail_instead_of_overflowing() {
        let chain = vec!["1"; 100_000].join("+");
        assert_eq!(calculate(&chain), Err(ParseError::TooLong));

        let mixed = vec!["2*3"; 50_000].join("-");
        assert_eq!(calculate(&mixed), Err(ParseError::TooLong));

        let longest = vec!["1"; MAX_OPERATORS + 1].join("+");
        assert_eq!(calculate(&longest), Ok((MAX_OPERATORS + 1) as f64));
    }
}
