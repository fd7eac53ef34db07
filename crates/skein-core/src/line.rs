//! Structural line classification.
//!
//! A [`Classifier`] holds an ordered list of [`Rule`]s. Each rule either
//! claims a line (successfully or with an error) or passes it on; a line no
//! rule claims is plain text.

use skein_expr::Value;

use crate::error::LineError;

/// Structural kind of one trimmed source line, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// `VAR name = literal`.
    Variable {
        /// Variable name.
        name: String,
        /// Typed default value.
        value: Value,
    },
    /// `== name ==`.
    Knot {
        /// Knot name.
        name: String,
        /// Tags written after the header.
        tags: Vec<String>,
    },
    /// `= name`.
    Stitch {
        /// Stitch name.
        name: String,
        /// Tags written after the header.
        tags: Vec<String>,
    },
    /// `* text`, `+ + text`, ...
    Option {
        /// Number of markers.
        depth: usize,
        /// `+` markers.
        sticky: bool,
        /// Remainder after the markers.
        text: String,
    },
    /// `- text`, `- - text`, ...
    Gather {
        /// Number of markers.
        depth: usize,
        /// Remainder after the markers.
        text: String,
    },
    /// Anything else.
    Text(String),
}

/// Outcome of a rule: `None` passes the line to the next rule.
pub type RuleOutcome = Option<Result<LineKind, LineError>>;

/// A named line-shape matcher.
#[derive(Clone, Copy)]
pub struct Rule {
    name: &'static str,
    matcher: fn(&str) -> RuleOutcome,
}

impl Rule {
    /// Create a rule from a matcher function.
    pub const fn new(name: &'static str, matcher: fn(&str) -> RuleOutcome) -> Self {
        Self { name, matcher }
    }

    /// Name of the rule.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the rule to a trimmed line.
    pub fn apply(&self, line: &str) -> RuleOutcome {
        (self.matcher)(line)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

/// Built-in rules in precedence order.
pub const DEFAULT_RULES: [Rule; 5] = [
    Rule::new("variable", variable),
    Rule::new("knot", knot),
    Rule::new("stitch", stitch),
    Rule::new("option", option),
    Rule::new("gather", gather),
];

/// An ordered, immutable list of line rules.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_rules(DEFAULT_RULES.to_vec())
    }
}

impl Classifier {
    /// Build a classifier from an explicit rule list. Earlier rules win.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules in precedence order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify one trimmed, non-empty line.
    pub fn classify(&self, line: &str) -> Result<LineKind, LineError> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(line))
            .unwrap_or_else(|| Ok(LineKind::Text(line.to_string())))
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `[A-Za-z_]\w*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(is_word_char),
        _ => false,
    }
}

fn parse_literal(raw: &str) -> Option<Value> {
    match raw {
        "true" => return Some(Value::Boolean(true)),
        "false" => return Some(Value::Boolean(false)),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Integer(n));
    }
    let numeric = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if numeric {
        if let Ok(f) = raw.parse::<f64>() {
            return Some(Value::Float(f));
        }
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Some(Value::String(raw[1..raw.len() - 1].to_string()));
    }
    None
}

fn variable(line: &str) -> RuleOutcome {
    let rest = line
        .strip_prefix("VAR")
        .or_else(|| line.strip_prefix("var"))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let malformed = || LineError::MalformedVariable(line.to_string());
    let Some((name, literal)) = rest.split_once('=') else {
        return Some(Err(malformed()));
    };
    let name = name.trim();
    if !is_identifier(name) {
        return Some(Err(malformed()));
    }
    Some(
        parse_literal(literal.trim())
            .map(|value| LineKind::Variable {
                name: name.to_string(),
                value,
            })
            .ok_or_else(malformed),
    )
}

/// Name, trailing text and tags of a header after its marker run.
///
/// A `//` comment is dropped and `#tags` are split off the trailing text.
struct Header {
    name: String,
    trailing: String,
    tags: Vec<String>,
}

fn header(line: &str, rest: &str) -> Result<Header, LineError> {
    let rest = rest.find("//").map_or(rest, |i| &rest[..i]);
    let body = rest.trim_start();
    let end = body.find(|c: char| !is_word_char(c)).unwrap_or(body.len());
    if end == 0 {
        return Err(LineError::MalformedHeader(line.to_string()));
    }

    let after = &body[end..];
    let (trailing, tags) = match after.find('#') {
        Some(i) => (
            &after[..i],
            after[i + 1..]
                .split('#')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>(),
        ),
        None => (after, Vec::new()),
    };
    Ok(Header {
        name: body[..end].to_string(),
        trailing: trailing.trim().to_string(),
        tags,
    })
}

fn knot(line: &str) -> RuleOutcome {
    let rest = line.trim_start_matches('=');
    if line.len() - rest.len() < 2 || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(header(line, rest).and_then(|h| {
        if h.trailing.chars().all(|c| c == '=') {
            Ok(LineKind::Knot {
                name: h.name,
                tags: h.tags,
            })
        } else {
            Err(LineError::MalformedHeader(line.to_string()))
        }
    }))
}

fn stitch(line: &str) -> RuleOutcome {
    let rest = line.strip_prefix('=')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(header(line, rest).and_then(|h| {
        if h.trailing.is_empty() {
            Ok(LineKind::Stitch {
                name: h.name,
                tags: h.tags,
            })
        } else {
            Err(LineError::MalformedHeader(line.to_string()))
        }
    }))
}

fn option(line: &str) -> RuleOutcome {
    let first = line.chars().next()?;
    if first != '*' && first != '+' {
        return None;
    }

    let mut stars = 0;
    let mut pluses = 0;
    let mut end = line.len();
    for (i, c) in line.char_indices() {
        match c {
            '*' => stars += 1,
            '+' => pluses += 1,
            c if c.is_whitespace() => {}
            _ => {
                end = i;
                break;
            }
        }
    }

    if stars > 0 && pluses > 0 {
        return Some(Err(LineError::MixedOptionMarkers));
    }
    Some(Ok(LineKind::Option {
        depth: stars + pluses,
        sticky: pluses > 0,
        text: line[end..].to_string(),
    }))
}

fn gather(line: &str) -> RuleOutcome {
    if !line.starts_with('-') || line.starts_with("->") {
        return None;
    }

    let bytes = line.as_bytes();
    let mut depth = 0;
    let mut end = line.len();
    for (i, c) in line.char_indices() {
        match c {
            '-' if bytes.get(i + 1) == Some(&b'>') => {
                if i > 0 && bytes[i - 1] == b'-' {
                    return Some(Err(LineError::MalformedDivert(line.to_string())));
                }
                end = i;
                break;
            }
            '-' => depth += 1,
            c if c.is_whitespace() => {}
            _ => {
                end = i;
                break;
            }
        }
    }

    Some(Ok(LineKind::Gather {
        depth,
        text: line[end..].to_string(),
    }))
}
