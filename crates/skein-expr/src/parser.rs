//! Token-stream parser.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::Token;
use crate::value::Value;

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte range of the unexpected input.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
}

/// Build the expression parser.
///
/// Binding from loosest to tightest: `or`, `and`, equality, comparison,
/// additive, multiplicative, prefix operators. All binary levels are
/// left-associative.
fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let literal = select! {
            Token::Bool(b) => Expr::Literal(Value::Boolean(b)),
            Token::Integer(n) => Expr::Literal(Value::Integer(n)),
            Token::Float(n) => Expr::Literal(Value::Float(n)),
            Token::Str(s) => Expr::Literal(Value::String(s)),
        }
        .labelled("literal");

        let ident = select! { Token::Ident(name) => Expr::Identifier(name) }.labelled("identifier");

        let atom = choice((
            literal,
            ident,
            expr.delimited_by(just(Token::LParen), just(Token::RParen)),
        ))
        .boxed();

        let unary = choice((
            just(Token::Not).to(UnaryOp::Not),
            just(Token::Minus).to(UnaryOp::Neg),
        ))
        .repeated()
        .foldr(atom, |op, operand| Expr::Unary(op, Box::new(operand)))
        .boxed();

        let product_op = choice((
            just(Token::Star).to(BinaryOp::Mul),
            just(Token::Slash).to(BinaryOp::Div),
            just(Token::Percent).to(BinaryOp::Rem),
        ));
        let product = unary
            .clone()
            .foldl(product_op.then(unary).repeated(), |lhs, (op, rhs)| {
                binary(op, lhs, rhs)
            })
            .boxed();

        let sum_op = choice((
            just(Token::Plus).to(BinaryOp::Add),
            just(Token::Minus).to(BinaryOp::Sub),
        ));
        let sum = product
            .clone()
            .foldl(sum_op.then(product).repeated(), |lhs, (op, rhs)| {
                binary(op, lhs, rhs)
            })
            .boxed();

        let compare_op = choice((
            just(Token::Le).to(BinaryOp::Le),
            just(Token::Ge).to(BinaryOp::Ge),
            just(Token::Lt).to(BinaryOp::Lt),
            just(Token::Gt).to(BinaryOp::Gt),
        ));
        let comparison = sum
            .clone()
            .foldl(compare_op.then(sum).repeated(), |lhs, (op, rhs)| {
                binary(op, lhs, rhs)
            })
            .boxed();

        let equality_op = choice((
            just(Token::Eq).to(BinaryOp::Eq),
            just(Token::NotEq).to(BinaryOp::NotEq),
        ));
        let equality = comparison
            .clone()
            .foldl(equality_op.then(comparison).repeated(), |lhs, (op, rhs)| {
                binary(op, lhs, rhs)
            })
            .boxed();

        let conjunction = equality
            .clone()
            .foldl(
                just(Token::And).to(BinaryOp::And).then(equality).repeated(),
                |lhs, (op, rhs)| binary(op, lhs, rhs),
            )
            .boxed();

        conjunction
            .clone()
            .foldl(
                just(Token::Or).to(BinaryOp::Or).then(conjunction).repeated(),
                |lhs, (op, rhs)| binary(op, lhs, rhs),
            )
            .labelled("expression")
    })
    .then_ignore(end())
}

/// Parse a token stream into an expression tree.
///
/// `len` is the byte length of the source, used to place end-of-input errors.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)], len: usize) -> Result<Expr, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = expr_parser().parse(stream).into_output_errors();

    match output {
        Some(expr) if errors.is_empty() => Ok(expr),
        _ => Err(errors
            .into_iter()
            .map(|e| ParseError {
                span: e.span().into_range(),
                message: e.to_string(),
            })
            .collect()),
    }
}
