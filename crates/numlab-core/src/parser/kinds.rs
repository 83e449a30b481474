//! Kind names, as used in conversion syntax and on the command line

use crate::ast::KindSpec;
use chumsky::prelude::*;

/// Precision bounds accepted for `BigFloat{p}`
pub const MIN_PRECISION: u32 = 2;
pub const MAX_PRECISION: u32 = 1 << 20;

#[derive(Clone)]
enum KindArg {
    Precision(u32),
    Kind(KindSpec),
}

/// Creates a parser for a kind name such as `Float64`, `BigFloat{128}` or
/// `Complex{Float32}`.
///
/// With `call_syntax` the kind is about to be applied to a parenthesised
/// operand, so arguments may only be written in braces and a bare
/// `Complex`/`complex` means "complex over the operand's kind". Otherwise
/// the display spelling `BigFloat(128)` is accepted as well.
pub fn kind_spec<'a>(call_syntax: bool) -> Boxed<'a, 'a, &'a str, KindSpec, extra::Err<Rich<'a, char>>> {
    recursive(move |spec| {
        let precision = text::int(10).try_map(|s: &str, span| {
            s.parse::<u32>()
                .ok()
                .filter(|p| (MIN_PRECISION..=MAX_PRECISION).contains(p))
                .ok_or_else(|| {
                    Rich::custom(
                        span,
                        format!("BigFloat precision must be between {MIN_PRECISION} and {MAX_PRECISION} bits"),
                    )
                })
        });
        let arg = choice((precision.map(KindArg::Precision), spec.map(KindArg::Kind)));
        let braced = arg.clone().delimited_by(just('{'), just('}'));
        let args = if call_syntax {
            braced.boxed()
        } else {
            braced.or(arg.delimited_by(just('('), just(')'))).boxed()
        };

        text::ident()
            .then(args.or_not())
            .try_map(move |(name, arg): (&str, Option<KindArg>), span| {
                Ok(match (name, arg) {
                    ("Int" | "Int64", None) => KindSpec::Int,
                    ("BigInt", None) => KindSpec::BigInt,
                    ("Rational", None) => KindSpec::Rational,
                    ("Float32", None) => KindSpec::Float32,
                    ("Float64", None) => KindSpec::Float64,
                    ("BigFloat", None) => KindSpec::BigFloat(None),
                    ("BigFloat", Some(KindArg::Precision(p))) => KindSpec::BigFloat(Some(p)),
                    ("Complex", Some(KindArg::Kind(inner))) => KindSpec::Complex(Box::new(inner)),
                    ("Complex" | "complex", None) if call_syntax => KindSpec::ComplexOf,
                    ("BigFloat", Some(KindArg::Kind(_))) => {
                        return Err(Rich::custom(span, "BigFloat takes a precision in bits"));
                    }
                    ("Complex", Some(KindArg::Precision(_))) => {
                        return Err(Rich::custom(span, "Complex takes a real kind"));
                    }
                    _ => return Err(Rich::custom(span, format!("unknown numeric kind '{name}'"))),
                })
            })
    })
    .boxed()
}
