//! Inline features of a line: comments, tags, diverts, glue, conditions,
//! labels and option text suppression.

use crate::error::LineError;
use crate::line::{is_identifier, is_word_char};
use crate::node::Content;

/// Strip comment, tags, divert and glue from a line remainder.
pub fn parse(input: &str) -> Result<Content, LineError> {
    let mut rest = match input.find("//") {
        Some(i) => &input[..i],
        None => input,
    };

    let mut tags = Vec::new();
    while let Some(i) = rest.rfind('#') {
        let tag = rest[i + 1..].trim();
        if !tag.is_empty() {
            tags.push(tag.to_string());
        }
        rest = &rest[..i];
    }
    tags.reverse();

    let mut divert = None;
    if let Some(i) = rest.rfind("->") {
        let target = rest[i + 2..].trim();
        if !is_divert_target(target) {
            return Err(LineError::MalformedDivert(target.to_string()));
        }
        divert = Some(target.to_string());
        rest = &rest[..i];
    }

    // Whitespace before a trailing glue marker is kept; a leading marker
    // swallows what follows it.
    let mut glue_start = false;
    let mut glue_end = false;
    let leading = rest.trim_start();
    rest = match leading.strip_prefix("<>") {
        Some(after) => {
            glue_start = true;
            after.trim_start()
        }
        None => leading,
    };
    let trailing = rest.trim_end();
    rest = match trailing.strip_suffix("<>") {
        Some(before) => {
            glue_end = true;
            before
        }
        None => trailing,
    };

    Ok(Content {
        text: rest.to_string(),
        tags,
        divert,
        glue_start,
        glue_end,
    })
}

/// `[A-Za-z_]\w*(\.\w+)*`
pub fn is_divert_target(target: &str) -> bool {
    let mut segments = target.split('.');
    let head_ok = segments.next().is_some_and(is_identifier);
    head_ok && segments.all(|s| !s.is_empty() && s.chars().all(is_word_char))
}

/// Split a leading `{expr}` off option text.
///
/// Returns the trimmed expression and the text after the closing brace.
pub fn split_condition(text: &str) -> Option<(&str, &str)> {
    let body = text.trim_start().strip_prefix('{')?;
    let close = body.find('}')?;
    Some((body[..close].trim(), body[close + 1..].trim_start()))
}

/// Split a leading `(label)` off a line's text.
///
/// Returns the trimmed label, possibly empty, and the text after it.
pub fn split_label(text: &str) -> Option<(&str, &str)> {
    let body = text.trim_start().strip_prefix('(')?;
    let close = body.find(')')?;
    Some((body[..close].trim(), body[close + 1..].trim_start()))
}

/// Render option text with its `[suppressed]` segment.
///
/// While listed the option shows `before + inside`; once picked it plays
/// back as `before + after`.
pub fn render_option(text: &str, listing: bool) -> String {
    let bracket = text
        .rfind(']')
        .and_then(|close| text[..close].rfind('[').map(|open| (open, close)));
    match bracket {
        Some((open, close)) if listing => format!("{}{}", &text[..open], &text[open + 1..close]),
        Some((open, close)) => format!("{}{}", &text[..open], &text[close + 1..]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_kept_verbatim() {
        let content = parse("Hello,   world").unwrap();
        assert_eq!(content.text, "Hello,   world");
        assert!(content.tags.is_empty());
        assert!(content.divert.is_none());
    }

    #[test]
    fn comment_is_discarded() {
        let content = parse("Hello // note -> nowhere #x").unwrap();
        assert_eq!(content.text, "Hello");
        assert!(content.tags.is_empty());
        assert!(content.divert.is_none());
    }

    #[test]
    fn tags_in_declared_order() {
        let content = parse("Text #one # two #three").unwrap();
        assert_eq!(content.text, "Text");
        assert_eq!(content.tags, vec!["one", "two", "three"]);
    }

    #[test]
    fn divert_is_split_off() {
        let content = parse("Go on -> Knot_A.stitch_1 #loud").unwrap();
        assert_eq!(content.text, "Go on");
        assert_eq!(content.divert.as_deref(), Some("Knot_A.stitch_1"));
        assert_eq!(content.tags, vec!["loud"]);
    }

    #[test]
    fn malformed_divert_targets() {
        for line in ["a ->", "a -> 1abc", "a -> x.", "a -> x y"] {
            assert!(
                matches!(parse(line), Err(LineError::MalformedDivert(_))),
                "{line}"
            );
        }
    }

    #[test]
    fn glue_markers() {
        let tail = parse("We hurried home <>").unwrap();
        assert!(tail.glue_end);
        assert_eq!(tail.text, "We hurried home ");

        let head = parse("<>to Savile Row").unwrap();
        assert!(head.glue_start);
        assert_eq!(head.text, "to Savile Row");

        let spaced = parse("<>   to Savile Row").unwrap();
        assert!(spaced.glue_start);
        assert_eq!(spaced.text, "to Savile Row");
    }

    #[test]
    fn condition_prefix() {
        assert_eq!(
            split_condition("{Knot_A > 0} Opt"),
            Some(("Knot_A > 0", "Opt"))
        );
        assert_eq!(split_condition("Opt {x}"), None);
    }

    #[test]
    fn label_prefix() {
        assert_eq!(split_label("(greet) Hello"), Some(("greet", "Hello")));
        assert_eq!(split_label("() Hello"), Some(("", "Hello")));
        assert_eq!(split_label("Hello (there)"), None);
    }

    #[test]
    fn suppression() {
        let text = "\"I am[.\"] somewhat tired,\" I said.";
        assert_eq!(render_option(text, true), "\"I am.\"");
        assert_eq!(render_option(text, false), "\"I am somewhat tired,\" I said.");
        assert_eq!(render_option("[Hidden]", false), "");
        assert_eq!(render_option("No brackets", true), "No brackets");
    }
}
