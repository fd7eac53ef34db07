//! Condition expression language for Skein stories.
//!
//! Options in a story can be guarded by a `{...}` expression such as
//! `{village > 0 and not gave_up}`. This crate compiles those expressions
//! once into a [`Program`] and evaluates them later against any
//! [`Environment`] that maps identifiers to [`Value`]s.
//!
//! The pipeline mirrors a small compiler: a `logos` lexer produces tokens,
//! a `chumsky` parser builds an [`ast::Expr`], and a tree-walking evaluator
//! produces a [`Value`].

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{EvalError, EvalResult, ExprError};
pub use eval::Environment;
pub use value::Value;

/// A compiled expression together with the source it was compiled from.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    source: String,
    expr: Expr,
}

impl Program {
    /// The source text this program was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against an environment.
    pub fn run(&self, env: &dyn Environment) -> EvalResult<Value> {
        self.expr.evaluate(env)
    }

    /// Evaluate and require a boolean result.
    pub fn run_bool(&self, env: &dyn Environment) -> EvalResult<bool> {
        match self.run(env)? {
            Value::Boolean(b) => Ok(b),
            other => Err(EvalError::NotBoolean(other)),
        }
    }

    /// Identifiers referenced anywhere in the expression, in source order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.expr.collect_identifiers(&mut names);
        names
    }
}

/// Compile an expression string into a [`Program`].
///
/// Lexing stops at the first bad character; parsing reports the first
/// syntax error.
pub fn compile(source: &str) -> Result<Program, ExprError> {
    let (tokens, lex_errors) = lexer::lex(source);
    if let Some(e) = lex_errors.into_iter().next() {
        return Err(ExprError::Lex {
            span: e.span,
            message: e.message,
        });
    }

    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let expr = parser::parse(&tokens, source.len()).map_err(|errors| {
        let first = errors.into_iter().next();
        match first {
            Some(e) => ExprError::Parse {
                span: e.span,
                message: e.message,
            },
            None => ExprError::Parse {
                span: 0..source.len(),
                message: "invalid expression".to_string(),
            },
        }
    })?;

    Ok(Program {
        source: source.to_string(),
        expr,
    })
}
