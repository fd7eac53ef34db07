//! Option visibility conditions.

use std::collections::BTreeMap;

use skein_expr::{Environment, EvalResult, ExprError, Program, Value};

use crate::line::is_word_char;
use crate::path::PATH_SEPARATOR;
use crate::story::Story;

/// A compiled `{...}` guard.
#[derive(Debug, Clone)]
pub struct Condition {
    program: Program,
}

impl Condition {
    /// Compile a condition as written by the author.
    ///
    /// Dotted references like `Knot.label` are rewritten to path form first.
    pub fn compile(raw: &str) -> Result<Self, ExprError> {
        let program = skein_expr::compile(&rewrite_paths(raw))?;
        Ok(Self { program })
    }

    /// The rewritten expression text.
    pub fn source(&self) -> &str {
        self.program.source()
    }

    /// Names the condition reads.
    pub fn identifiers(&self) -> Vec<&str> {
        self.program.identifiers()
    }

    /// Evaluate against session variables, falling back to declared
    /// defaults and then to a zero visit count for known paths.
    pub fn evaluate(&self, story: &Story, vars: &BTreeMap<String, Value>) -> EvalResult<bool> {
        self.program.run_bool(&Scope { story, vars })
    }
}

struct Scope<'a> {
    story: &'a Story,
    vars: &'a BTreeMap<String, Value>,
}

impl Environment for Scope<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        if let Some(var) = self.story.variable(name) {
            return Some(var.value.clone());
        }
        self.story.lookup(name).map(|_| Value::Integer(0))
    }
}

/// Replace `.` between identifier segments with the path separator.
///
/// String literals and numbers are left alone.
fn rewrite_paths(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    // Some(true) inside a word that started with a letter or underscore.
    let mut word: Option<bool> = None;

    for c in raw.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                word = None;
                out.push(c);
            }
            '.' if word == Some(true) => out.push_str(PATH_SEPARATOR),
            c if is_word_char(c) => {
                if word.is_none() {
                    word = Some(!c.is_ascii_digit());
                }
                out.push(c);
            }
            _ => {
                word = None;
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_dotted_paths() {
        assert_eq!(rewrite_paths("Knot_A.lable_g > 0"), "Knot_A__lable_g > 0");
        assert_eq!(
            rewrite_paths("not a.b.c and d == 1"),
            "not a__b__c and d == 1"
        );
    }

    #[test]
    fn leaves_numbers_and_strings() {
        assert_eq!(rewrite_paths("x > 1.5"), "x > 1.5");
        assert_eq!(rewrite_paths("name == 'a.b'"), "name == 'a.b'");
        assert_eq!(rewrite_paths("n == \"x.y\" or k.s"), "n == \"x.y\" or k__s");
    }

    #[test]
    fn compile_reports_bad_expressions() {
        assert!(Condition::compile("a >").is_err());
        assert!(Condition::compile("").is_err());
    }

    #[test]
    fn identifiers_are_in_path_form() {
        let c = Condition::compile("Knot.label > 0 and seen").unwrap();
        assert_eq!(c.identifiers(), vec!["Knot__label", "seen"]);
    }
}
