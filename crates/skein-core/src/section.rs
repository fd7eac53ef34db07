//! Rendered output of one advance.

use serde::{Deserialize, Serialize};

use crate::node::Content;

/// What the reader sees when the story pauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Rendered text, one line per fragment unless glued.
    pub text: String,
    /// Tags of every visited node, in visiting order.
    pub tags: Vec<String>,
    /// Listing text of each visible option.
    pub options: Vec<String>,
    /// Tags of each visible option.
    pub option_tags: Vec<Vec<String>>,
    /// The story reached its end.
    pub end: bool,
}

impl Section {
    /// Whether the reader has to pick an option to continue.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

#[derive(Debug)]
struct Fragment {
    text: String,
    glue_start: bool,
    glue_end: bool,
}

/// Accumulates fragments while the engine walks the graph.
#[derive(Debug, Default)]
pub(crate) struct SectionBuilder {
    fragments: Vec<Fragment>,
    tags: Vec<String>,
    options: Vec<String>,
    option_tags: Vec<Vec<String>>,
    end: bool,
}

impl SectionBuilder {
    /// Add a node's content, rendering `text` in place of its own text.
    pub(crate) fn push(&mut self, content: &Content, text: String) {
        self.tags.extend(content.tags.iter().cloned());
        if text.trim().is_empty() {
            return;
        }
        self.fragments.push(Fragment {
            text,
            glue_start: content.glue_start,
            glue_end: content.glue_end,
        });
    }

    pub(crate) fn push_tags(&mut self, tags: &[String]) {
        self.tags.extend(tags.iter().cloned());
    }

    pub(crate) fn push_option(&mut self, text: String, tags: &[String]) {
        self.options.push(text);
        self.option_tags.push(tags.to_vec());
    }

    pub(crate) fn mark_end(&mut self) {
        self.end = true;
    }

    pub(crate) fn finish(self) -> Section {
        let mut text = String::new();
        let mut previous: Option<&Fragment> = None;
        for fragment in &self.fragments {
            if let Some(prev) = previous {
                if !prev.glue_end && !fragment.glue_start {
                    text.push('\n');
                }
            }
            text.push_str(&fragment.text);
            previous = Some(fragment);
        }

        Section {
            text,
            tags: self.tags,
            options: self.options,
            option_tags: self.option_tags,
            end: self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str, glue_start: bool, glue_end: bool) -> Content {
        Content {
            text: text.to_string(),
            glue_start,
            glue_end,
            ..Content::default()
        }
    }

    #[test]
    fn fragments_are_separated_by_newlines() {
        let mut builder = SectionBuilder::default();
        builder.push(&content("one", false, false), "one".to_string());
        builder.push(&content("two", false, false), "two".to_string());
        assert_eq!(builder.finish().text, "one\ntwo");
    }

    #[test]
    fn glue_on_either_side_joins() {
        let mut builder = SectionBuilder::default();
        builder.push(&content("a ", false, true), "a ".to_string());
        builder.push(&content("b", false, false), "b".to_string());
        builder.push(&content("c", true, false), "c".to_string());
        builder.push(&content("d", false, false), "d".to_string());
        assert_eq!(builder.finish().text, "a bc\nd");
    }

    #[test]
    fn blank_fragments_are_skipped_but_tags_kept() {
        let mut builder = SectionBuilder::default();
        let mut blank = content("", false, false);
        blank.tags = vec!["t".to_string()];
        builder.push(&content("x", false, false), "x".to_string());
        builder.push(&blank, String::new());
        builder.push(&content("y", false, false), "y".to_string());
        let section = builder.finish();
        assert_eq!(section.text, "x\ny");
        assert_eq!(section.tags, vec!["t"]);
    }

    #[test]
    fn serializes_as_json_object() {
        let section = Section {
            text: "Hi".to_string(),
            end: true,
            ..Section::default()
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["text"], "Hi");
        assert_eq!(json["end"], true);
        assert!(json["options"].as_array().unwrap().is_empty());
    }
}
