//! Tokenizer for condition expressions.

use logos::Logos;
use std::fmt;

/// Token type for condition expressions.
///
/// Word operators (`and`, `or`, `not`) and boolean literals are recognized
/// here rather than in the parser, so the parser only ever sees symbols.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// `and` or `&&`.
    And,
    /// `or` or `||`.
    Or,
    /// `not` or `!`.
    Not,
    /// `==`.
    Eq,
    /// `!=`.
    NotEq,
    /// `<`.
    Lt,
    /// `<=`.
    Le,
    /// `>`.
    Gt,
    /// `>=`.
    Ge,
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// `*`.
    Star,
    /// `/`.
    Slash,
    /// `%`.
    Percent,
    /// `true` or `false`.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// Single- or double-quoted string literal, quotes removed.
    Str(String),
    /// Identifier: a variable name or a story path.
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Eq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Bool(b) => write!(f, "{b}"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Float(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Ident(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token, borrowing from the source until conversion.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    Le,

    #[token(">=")]
    Ge,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("!")]
    Bang,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[regex(r#""[^"\n]*""#)]
    DoubleStr,

    #[regex(r"'[^'\n]*'")]
    SingleStr,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex an expression into `(Token, Span)` pairs.
///
/// Lexing continues past errors so every bad character is reported.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::LParen => Token::LParen,
                    RawToken::RParen => Token::RParen,
                    RawToken::AndAnd => Token::And,
                    RawToken::OrOr => Token::Or,
                    RawToken::EqEq => Token::Eq,
                    RawToken::NotEq => Token::NotEq,
                    RawToken::Le => Token::Le,
                    RawToken::Ge => Token::Ge,
                    RawToken::Lt => Token::Lt,
                    RawToken::Gt => Token::Gt,
                    RawToken::Bang => Token::Not,
                    RawToken::Plus => Token::Plus,
                    RawToken::Minus => Token::Minus,
                    RawToken::Star => Token::Star,
                    RawToken::Slash => Token::Slash,
                    RawToken::Percent => Token::Percent,
                    RawToken::DoubleStr | RawToken::SingleStr => {
                        let slice = lexer.slice();
                        Token::Str(slice[1..slice.len() - 1].to_string())
                    }
                    RawToken::Float => match lexer.slice().parse::<f64>() {
                        Ok(n) => Token::Float(n),
                        Err(_) => {
                            errors.push(LexError {
                                span: span.clone(),
                                message: format!("invalid float literal: {}", lexer.slice()),
                            });
                            continue;
                        }
                    },
                    RawToken::Integer => match lexer.slice().parse::<i64>() {
                        Ok(n) => Token::Integer(n),
                        Err(_) => {
                            errors.push(LexError {
                                span: span.clone(),
                                message: format!("invalid integer literal: {}", lexer.slice()),
                            });
                            continue;
                        }
                    },
                    RawToken::Word => match lexer.slice() {
                        "and" => Token::And,
                        "or" => Token::Or,
                        "not" => Token::Not,
                        "true" => Token::Bool(true),
                        "false" => Token::Bool(false),
                        word => Token::Ident(word.to_string()),
                    },
                };
                tokens.push((token, span));
            }
            Err(()) => {
                errors.push(LexError {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span.clone()]),
                });
            }
        }
    }

    (tokens, errors)
}
