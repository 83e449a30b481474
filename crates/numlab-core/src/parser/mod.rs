use crate::ast::{BinaryOp, Expr, Span};
use crate::diagnostics::Diagnostic;
use crate::numeric::NumericKind;
use chumsky::prelude::*;

mod errors;
mod kinds;
mod lexer;
mod limits;
mod literals;
mod operators;

pub use kinds::{MAX_PRECISION, MIN_PRECISION};
pub use limits::{MAX_NESTING, MAX_OPERATORS};

/// Expression grammar, loosest to tightest:
///
/// ```text
/// add      := mul (('+' | '-') mul)*
/// mul      := unary (('*' | '/' | '%') unary)*
/// unary    := '-'* implicit
/// implicit := number (ident | group) ('^' '-'* pow)?  |  pow
/// pow      := atom ('^' '-'* pow)?
/// atom     := number | convert | 'im' | ident | group
/// ```
///
/// `implicit` requires the operand to touch the number (`4x`, `2(x+1)`).
pub fn parser<'a>() -> impl Parser<'a, &'a str, Expr, extra::Err<Rich<'a, char>>> {
    let ws = lexer::ws();

    let mut expr_ref = Recursive::declare();
    let mut pow = Recursive::declare();

    // Parenthesized expressions
    let group = just('(')
        .then_ignore(ws.clone())
        .ignore_then(expr_ref.clone())
        .then_ignore(just(')'))
        .try_map(|inner, span| {
            Ok(Expr::Group {
                inner: Box::new(inner),
                span: Some(Span::from_chumsky(span)),
            })
        })
        .boxed();

    let ident = lexer::ident()
        .try_map(|s: &str, span| {
            Ok(Expr::Identifier {
                name: s.to_string(),
                span: Some(Span::from_chumsky(span)),
            })
        })
        .boxed();

    // Explicit conversions: Float32(e), BigFloat{128}(e), complex(e), ...
    let convert = kinds::kind_spec(true)
        .then(
            just('(')
                .then_ignore(ws.clone())
                .ignore_then(expr_ref.clone())
                .then_ignore(just(')')),
        )
        .try_map(|(target, operand), span| {
            Ok(Expr::Convert {
                target,
                operand: Box::new(operand),
                span: Some(Span::from_chumsky(span)),
            })
        })
        .boxed();

    let number = literals::number().boxed();

    // Atoms, each followed by its trailing whitespace
    let atom = choice((
        number.clone(),
        convert,
        literals::imaginary_unit().boxed(),
        ident.clone(),
        group.clone(),
    ))
    .then_ignore(ws.clone())
    .boxed();

    // Exponents bind to the right and may carry their own minus signs: 2^-x
    let exponent = operators::pow_op(ws.clone())
        .ignore_then(operators::negated(ws.clone(), pow.clone()))
        .boxed();

    pow.define(
        atom.then(exponent.clone().or_not())
            .try_map(|(base, exponent), span| {
                Ok(match exponent {
                    Some(exponent) => operators::binary(base, BinaryOp::Pow, exponent, span.start),
                    None => base,
                })
            })
            .boxed(),
    );

    // Implicit multiplication: 4x, 2(x + 1), 3x^2
    let implicit = number
        .then(choice((ident, group)).then_ignore(ws.clone()))
        .then(exponent.or_not())
        .try_map(|((coefficient, operand), exponent), span| {
            let operand = match exponent {
                Some(exponent) => operators::binary(operand, BinaryOp::Pow, exponent, span.start),
                None => operand,
            };
            let whole = match (coefficient.span(), operand.span()) {
                (Some(coefficient), Some(operand)) => coefficient.join(operand),
                _ => Span::from_chumsky(span),
            };
            Ok(Expr::ImplicitMul {
                coefficient: Box::new(coefficient),
                operand: Box::new(operand),
                span: Some(whole),
            })
        })
        .boxed();

    let unary = operators::negated(ws.clone(), choice((implicit, pow.clone())));
    let mul_expr = operators::left_assoc(operators::mul_op(ws.clone()), unary);
    let add_expr = operators::left_assoc(operators::add_op(ws.clone()), mul_expr);

    expr_ref.define(add_expr);

    ws.ignore_then(expr_ref).then_ignore(end())
}

pub fn parse(source: &str, filename: &str) -> Result<Expr, Vec<Diagnostic>> {
    limits::check(source, filename).map_err(|diagnostic| vec![diagnostic])?;
    let (output, errs) = parser().parse(source).into_output_errors();

    match output {
        Some(expr) if errs.is_empty() => Ok(expr),
        _ => Err(errors::errors_to_diagnostics(errs, filename, source)),
    }
}

/// Parse a kind name such as `Float64`, `BigFloat(128)` or
/// `Complex{Float32}`. A `BigFloat` without precision gets
/// `default_precision`.
pub fn parse_kind(source: &str, default_precision: u32) -> Result<NumericKind, Vec<Diagnostic>> {
    limits::check(source, "<kind>").map_err(|diagnostic| vec![diagnostic])?;
    let (output, errs) = kinds::kind_spec(false)
        .padded_by(lexer::ws())
        .then_ignore(end())
        .parse(source)
        .into_output_errors();

    match output.and_then(|spec| spec.to_kind(default_precision)) {
        Some(kind) if errs.is_empty() => Ok(kind),
        _ => Err(errors::errors_to_diagnostics(errs, "<kind>", source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{KindSpec, UnaryOp};
    use crate::numeric::Value;

    fn parse_expr(source: &str) -> Expr {
        parse(source, "test").expect("Parse failed")
    }

    /// Compact rendering of the tree shape, ignoring spans
    fn shape(expr: &Expr) -> String {
        match expr {
            Expr::Number { value, .. } => value.to_string(),
            Expr::Identifier { name, .. } => name.clone(),
            Expr::Binary {
                left, op, right, ..
            } => format!("({} {} {})", shape(left), op.symbol(), shape(right)),
            Expr::ImplicitMul {
                coefficient,
                operand,
                ..
            } => format!("[{} {}]", shape(coefficient), shape(operand)),
            Expr::Unary { operand, .. } => format!("(-{})", shape(operand)),
            Expr::Group { inner, .. } => format!("{{{}}}", shape(inner)),
            Expr::Convert {
                target, operand, ..
            } => format!("{target:?}<{}>", shape(operand)),
        }
    }

    // ===== Literal Tests =====

    #[test]
    fn test_parse_number_literal() {
        let expr = parse_expr("42");
        assert!(matches!(expr, Expr::Number { value: Value::Int(42), .. }));
    }

    #[test]
    fn test_parse_float_literal() {
        let expr = parse_expr("0.3");
        assert!(matches!(expr, Expr::Number { value: Value::Float64(v), .. } if v == 0.3));
    }

    #[test]
    fn test_parse_identifier() {
        let expr = parse_expr("rate");
        assert!(matches!(expr, Expr::Identifier { name, .. } if name == "rate"));
    }

    #[test]
    fn test_parse_imaginary_unit() {
        assert_eq!(shape(&parse_expr("1 + im")), "(1 + 0 + 1im)");
    }

    #[test]
    fn test_im_is_reserved() {
        assert!(parse("im = 2", "test").is_err());
    }

    // ===== Operator Tests =====

    #[test]
    fn test_precedence() {
        assert_eq!(shape(&parse_expr("1 + 2 * 3")), "(1 + (2 * 3))");
        assert_eq!(shape(&parse_expr("1 - 2 - 3")), "((1 - 2) - 3)");
        assert_eq!(shape(&parse_expr("8 / 4 / 2")), "((8 / 4) / 2)");
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(shape(&parse_expr("2^3^2")), "(2 ^ (3 ^ 2))");
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        assert_eq!(shape(&parse_expr("-2^2")), "(-(2 ^ 2))");
        assert_eq!(shape(&parse_expr("2^-1")), "(2 ^ (-1))");
        assert_eq!(shape(&parse_expr("--x")), "(-(-x))");
    }

    #[test]
    fn test_unicode_operators() {
        assert_eq!(shape(&parse_expr("6 \u{f7} 3 \u{d7} 2")), "((6 / 3) * 2)");
        assert_eq!(shape(&parse_expr("1 \u{2212} x")), "(1 - x)");
    }

    #[test]
    fn test_remainder_is_parsed() {
        let expr = parse_expr("7 % 2");
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Rem, .. }));
    }

    // ===== Implicit Multiplication =====

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(shape(&parse_expr("4x*(1-x)")), "([4 x] * {(1 - x)})");
        assert_eq!(shape(&parse_expr("2(x + 1)")), "[2 {(x + 1)}]");
    }

    #[test]
    fn test_implicit_multiplication_binds_tighter_than_division() {
        assert_eq!(shape(&parse_expr("1/2x")), "(1 / [2 x])");
    }

    #[test]
    fn test_implicit_multiplication_with_power() {
        assert_eq!(shape(&parse_expr("3x^2")), "[3 (x ^ 2)]");
    }

    #[test]
    fn test_implicit_multiplication_needs_adjacency() {
        assert!(parse("4 x", "test").is_err());
    }

    #[test]
    fn test_exponent_literal_is_not_implicit() {
        assert_eq!(shape(&parse_expr("2e3")), "2000.0");
        assert_eq!(shape(&parse_expr("2e")), "[2 e]");
    }

    // ===== Conversions =====

    #[test]
    fn test_conversions() {
        assert_eq!(shape(&parse_expr("Float32(x)")), "Float32<x>");
        assert_eq!(
            shape(&parse_expr("BigFloat{128}(1/3)")),
            "BigFloat(Some(128))<(1 / 3)>"
        );
        assert_eq!(shape(&parse_expr("BigFloat(1)")), "BigFloat(None)<1>");
        assert_eq!(
            shape(&parse_expr("Complex{Float64}(2)")),
            "Complex(Float64)<2>"
        );
        assert_eq!(shape(&parse_expr("complex(x)")), "ComplexOf<x>");
    }

    #[test]
    fn test_unknown_kind_call_is_an_error() {
        assert!(parse("Float16(x)", "test").is_err());
    }

    // ===== Spans =====

    #[test]
    fn test_spans_exclude_trailing_whitespace() {
        let expr = parse_expr("  a / b  ");
        assert_eq!(expr.span(), Some(Span::new(2, 7)));
        let Expr::Binary { right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(right.span(), Some(Span::new(6, 7)));
    }

    #[test]
    fn test_unary_span() {
        let expr = parse_expr("-x");
        assert!(matches!(
            expr,
            Expr::Unary { op: UnaryOp::Neg, span: Some(Span { start: 0, end: 2 }), .. }
        ));
    }

    // ===== Errors =====

    #[test]
    fn test_unclosed_paren_suggests_fix() {
        let errors = parse("4x*(1-x", "test").expect_err("should fail");
        let fix = errors
            .iter()
            .flat_map(|d| d.fixits.iter())
            .next()
            .expect("a fix-it");
        assert_eq!(fix.apply("4x*(1-x"), "4x*(1-x)");
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}x{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(shape(&parse_expr(&at_limit)).matches('{').count(), MAX_NESTING);

        let too_deep = format!("{}x{}", "(".repeat(30_000), ")".repeat(30_000));
        let errors = parse(&too_deep, "test").expect_err("too deep");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("levels deep"), "{}", errors[0].message);
        assert_eq!(errors[0].filename, "test");

        let deep_kind = format!("{}Float64{}", "Complex{".repeat(70), "}".repeat(70));
        assert!(parse_kind(&deep_kind, 256).is_err());
    }

    #[test]
    fn test_long_operator_chains_are_rejected() {
        let long = format!("{}x", "-".repeat(MAX_OPERATORS + 1));
        assert!(parse(&long, "test").is_err());
        let at_limit = format!("{}x", "-".repeat(MAX_OPERATORS));
        assert!(parse(&at_limit, "test").is_ok());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(parse("", "test").is_err());
        assert!(parse("1 +", "test").is_err());
    }

    // ===== Kinds =====

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("Float64", 256), Ok(NumericKind::Float64));
        assert_eq!(parse_kind("Int64", 256), Ok(NumericKind::Int));
        assert_eq!(parse_kind("BigFloat", 100), Ok(NumericKind::BigFloat(100)));
        assert_eq!(parse_kind("BigFloat(128)", 256), Ok(NumericKind::BigFloat(128)));
        assert_eq!(parse_kind("BigFloat{64}", 256), Ok(NumericKind::BigFloat(64)));
        assert_eq!(
            parse_kind(" Complex(Float32) ", 256),
            Ok(NumericKind::complex(NumericKind::Float32))
        );
        assert_eq!(
            parse_kind("Complex{BigFloat}", 96),
            Ok(NumericKind::complex(NumericKind::BigFloat(96)))
        );
    }

    #[test]
    fn test_parse_kind_round_trips_display() {
        for kind in [
            NumericKind::Rational,
            NumericKind::BigFloat(300),
            NumericKind::complex(NumericKind::BigInt),
        ] {
            assert_eq!(parse_kind(&kind.to_string(), 256), Ok(kind.clone()));
            assert_eq!(parse_kind(&kind.constructor(), 256), Ok(kind));
        }
    }

    #[test]
    fn test_parse_kind_rejects_bad_input() {
        assert!(parse_kind("Float16", 256).is_err());
        assert!(parse_kind("complex", 256).is_err());
        assert!(parse_kind("BigFloat(1)", 256).is_err());
        assert!(parse_kind("Complex(3)", 256).is_err());
    }

    #[test]
    fn test_kind_spec_variants() {
        let expr = parse_expr("Complex{BigFloat}(x)");
        assert!(matches!(
            expr,
            Expr::Convert { target: KindSpec::Complex(inner), .. } if *inner == KindSpec::BigFloat(None)
        ));
    }
}
