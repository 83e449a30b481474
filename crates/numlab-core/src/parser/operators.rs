use super::lexer::MINUS_SIGNS;
use crate::ast::{BinaryOp, Expr, Span, UnaryOp};
use chumsky::prelude::*;

/// Creates a parser for the unary minus
pub fn neg_op<'a, WS>(ws: WS) -> impl Parser<'a, &'a str, UnaryOp, extra::Err<Rich<'a, char>>> + Clone
where
    WS: Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
{
    one_of(MINUS_SIGNS).then_ignore(ws).to(UnaryOp::Neg)
}

/// Creates a parser for addition/subtraction operators
pub fn add_op<'a, WS>(ws: WS) -> impl Parser<'a, &'a str, BinaryOp, extra::Err<Rich<'a, char>>> + Clone
where
    WS: Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
{
    choice((
        just('+').to(BinaryOp::Add),
        one_of(MINUS_SIGNS).to(BinaryOp::Sub),
    ))
    .then_ignore(ws)
}

/// Creates a parser for multiplication/division/remainder operators
pub fn mul_op<'a, WS>(ws: WS) -> impl Parser<'a, &'a str, BinaryOp, extra::Err<Rich<'a, char>>> + Clone
where
    WS: Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
{
    choice((
        one_of("*\u{d7}").to(BinaryOp::Mul),
        one_of("/\u{f7}").to(BinaryOp::Div),
        just('%').to(BinaryOp::Rem),
    ))
    .then_ignore(ws)
}

/// Creates a parser for the power operator
pub fn pow_op<'a, WS>(ws: WS) -> impl Parser<'a, &'a str, BinaryOp, extra::Err<Rich<'a, char>>> + Clone
where
    WS: Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
{
    just('^').then_ignore(ws).to(BinaryOp::Pow)
}

/// `'-'* operand`, applying the minus signs right to left
pub fn negated<'a, WS, P>(ws: WS, operand: P) -> Boxed<'a, 'a, &'a str, Expr, extra::Err<Rich<'a, char>>>
where
    WS: Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone + 'a,
    P: Parser<'a, &'a str, Expr, extra::Err<Rich<'a, char>>> + Clone + 'a,
{
    neg_op(ws)
        .repeated()
        .collect::<Vec<_>>()
        .then(operand)
        .try_map(|(ops, mut operand), span| {
            for op in ops.into_iter().rev() {
                let operand_end = operand.span().map(|s| s.end).unwrap_or(span.end);
                operand = Expr::Unary {
                    op,
                    operand: Box::new(operand),
                    span: Some(Span::new(span.start, operand_end)),
                };
            }
            Ok(operand)
        })
        .boxed()
}

/// Left-associative chain `operand (op operand)*`
pub fn left_assoc<'a, O, P>(op: O, operand: P) -> Boxed<'a, 'a, &'a str, Expr, extra::Err<Rich<'a, char>>>
where
    O: Parser<'a, &'a str, BinaryOp, extra::Err<Rich<'a, char>>> + Clone + 'a,
    P: Parser<'a, &'a str, Expr, extra::Err<Rich<'a, char>>> + Clone + 'a,
{
    operand
        .clone()
        .then(op.then(operand).repeated().collect::<Vec<_>>())
        .try_map(|(mut left, ops), span| {
            for (op, right) in ops {
                left = binary(left, op, right, span.start);
            }
            Ok(left)
        })
        .boxed()
}

/// Binary node spanning from the left operand to the end of the right one
pub fn binary(left: Expr, op: BinaryOp, right: Expr, fallback_start: usize) -> Expr {
    let span = match (left.span(), right.span()) {
        (Some(left), Some(right)) => left.join(right),
        (left, _) => {
            let start = left.map(|s| s.start).unwrap_or(fallback_start);
            Span::new(start, start)
        }
    };
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
        span: Some(span),
    }
}
