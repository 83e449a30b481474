use super::lexer::ident_char;
use crate::ast::{Expr, Span};
use crate::numeric::Value;
use chumsky::prelude::*;
use num_bigint::BigInt;

/// Creates a parser for number literals, without trailing whitespace:
///
/// - `42` is an Int, or a BigInt when it does not fit in 64 bits
/// - `0.3`, `1e-3`, `2.5E+10` are Float64
/// - `1.5f0`, `3f-2` are Float32
/// - any of the above followed by `im` is an imaginary literal
pub fn number<'a>() -> impl Parser<'a, &'a str, Expr, extra::Err<Rich<'a, char>>> + Clone {
    real()
        .then(imaginary_suffix().or_not())
        .try_map(|(value, imaginary), span| {
            let value = match imaginary {
                Some(()) => Value::imaginary(value),
                None => value,
            };
            Ok(Expr::Number {
                value,
                span: Some(Span::from_chumsky(span)),
            })
        })
        .boxed()
}

/// Creates a parser for the bare imaginary unit `im`
pub fn imaginary_unit<'a>() -> impl Parser<'a, &'a str, Expr, extra::Err<Rich<'a, char>>> + Clone {
    imaginary_suffix().try_map(|_, span| {
        Ok(Expr::Number {
            value: Value::imaginary(Value::Int(1)),
            span: Some(Span::from_chumsky(span)),
        })
    })
}

fn imaginary_suffix<'a>() -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
    just("im").then_ignore(ident_char().not()).ignored()
}

fn real<'a>() -> impl Parser<'a, &'a str, Value, extra::Err<Rich<'a, char>>> + Clone {
    let digits = text::digits(10);
    let fraction = just('.').then(digits.clone());
    let sign = one_of("+-").or_not();
    let exponent = one_of("eE").then(sign.clone()).then(digits.clone());

    let float32 = digits
        .clone()
        .then(fraction.clone().or_not())
        .then(just('f').then(sign).then(digits.clone()))
        .to_slice()
        .try_map(|s: &str, span| {
            s.replacen('f', "e", 1)
                .parse::<f32>()
                .map(Value::Float32)
                .map_err(|err| Rich::custom(span, format!("invalid Float32 literal '{s}': {err}")))
        });

    let float64 = digits
        .clone()
        .then(choice((
            fraction.then(exponent.clone().or_not()).ignored(),
            exponent.ignored(),
        )))
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<f64>()
                .map(Value::Float64)
                .map_err(|err| Rich::custom(span, format!("invalid Float64 literal '{s}': {err}")))
        });

    let integer = digits.to_slice().try_map(|s: &str, span| {
        if let Ok(value) = s.parse::<i64>() {
            return Ok(Value::Int(value));
        }
        s.parse::<BigInt>()
            .map(Value::BigInt)
            .map_err(|err| Rich::custom(span, format!("invalid integer literal '{s}': {err}")))
    });

    choice((float32, float64, integer))
}
