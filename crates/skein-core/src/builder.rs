//! Line-by-line graph construction.

use tracing::debug;

use crate::condition::Condition;
use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::inline;
use crate::line::{Classifier, LineKind};
use crate::node::{Container, Content, GatherNode, NodeId, NodeKind, OptionGroup, OptionNode, TextNode};
use crate::path::{self, GATHER_SUFFIX, GROUP_SUFFIX, LINE_SUFFIX};
use crate::story::{Story, Variable};

type Step<T> = Result<T, ParseErrorKind>;

/// Story parser configured with a line classifier.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    classifier: Classifier,
}

impl Parser {
    /// Parser with the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with an explicit rule list.
    pub fn with_classifier(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Parse a whole source document.
    ///
    /// Lines are trimmed and blank lines skipped. The first error aborts the
    /// parse; no partial story is returned.
    pub fn parse(&self, source: &str) -> ParseResult<Story> {
        let mut builder = Builder {
            classifier: &self.classifier,
            story: Story::new(),
            cursor: NodeId(0),
            line: 0,
        };
        builder.cursor = builder.story.start();

        for (index, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            builder.line = index + 1;
            builder.feed(line).map_err(|kind| ParseError {
                line: index + 1,
                kind,
            })?;
        }

        let story = builder.story;
        debug!(
            nodes = story.len(),
            knots = story.knots().len(),
            variables = story.variables().len(),
            "parsed story"
        );
        Ok(story)
    }
}

struct Builder<'c> {
    classifier: &'c Classifier,
    story: Story,
    cursor: NodeId,
    line: usize,
}

impl Builder<'_> {
    fn feed(&mut self, line: &str) -> Step<()> {
        match self.classifier.classify(line)? {
            LineKind::Variable { name, value } => self.declare(name, value),
            LineKind::Knot { name, tags } => self.open_knot(name, tags),
            LineKind::Stitch { name, tags } => self.open_stitch(name, tags),
            LineKind::Option {
                depth,
                sticky,
                text,
            } => self.add_option(depth, sticky, &text),
            LineKind::Gather { depth, text } => self.add_gather(depth, &text),
            LineKind::Text(text) => self.add_text(&text),
        }
    }

    fn insert(&mut self, path: String, parent: Option<NodeId>, kind: NodeKind) -> Step<NodeId> {
        if self.story.lookup(&path).is_some() {
            return Err(ParseErrorKind::DuplicatePath(path));
        }
        Ok(self.story.insert(path, parent, self.line, kind))
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        if let Some(slot) = self.story.at_mut(from).next_slot() {
            *slot = Some(to);
        }
    }

    fn require_successor_slot(&self) -> Step<()> {
        let anchor = self.story.at(self.cursor);
        if anchor.takes_successor() {
            Ok(())
        } else {
            Err(ParseErrorKind::NoSuccessorSlot(anchor.path.clone()))
        }
    }

    /// Apply a leading `(label)` to the content, returning the label path.
    fn take_label(&self, content: &mut Content) -> Step<Option<String>> {
        let Some((label, rest)) = inline::split_label(&content.text) else {
            return Ok(None);
        };
        let label = label.to_string();
        content.text = rest.to_string();
        if label.is_empty() {
            return Ok(None);
        }
        path::labelled(self.story.scope(self.cursor), &label).map(Some)
    }

    fn declare(&mut self, name: String, value: skein_expr::Value) -> Step<()> {
        if self.story.variables.contains_key(&name) {
            return Err(ParseErrorKind::DuplicateVariable(name));
        }
        let line = self.line;
        self.story.variables.insert(name, Variable { value, line });
        Ok(())
    }

    fn open_knot(&mut self, name: String, tags: Vec<String>) -> Step<()> {
        if self.story.knot(&name).is_some() {
            return Err(ParseErrorKind::DuplicateKnot(name));
        }
        let container = Container {
            name: name.clone(),
            tags,
            next: None,
            stitches: Vec::new(),
        };
        let id = self.insert(name.clone(), None, NodeKind::Knot(container))?;
        self.story.knots.push(id);
        self.cursor = id;
        debug!(knot = %name, line = self.line, "opened knot");
        Ok(())
    }

    fn open_stitch(&mut self, name: String, tags: Vec<String>) -> Step<()> {
        let Some(knot) = self.story.containers(self.cursor).0 else {
            return Err(ParseErrorKind::StitchOutsideKnot(name));
        };
        if self.story.stitch(knot, &name).is_some() {
            return Err(ParseErrorKind::DuplicateStitch {
                knot: self.story.path(knot).to_string(),
                stitch: name,
            });
        }
        let container = Container {
            name: name.clone(),
            tags,
            next: None,
            stitches: Vec::new(),
        };
        let path = path::join(self.story.path(knot), &name);
        let id = self.insert(path, Some(knot), NodeKind::Stitch(container))?;
        if let NodeKind::Knot(k) = &mut self.story.at_mut(knot).kind {
            k.stitches.push(id);
        }
        self.cursor = id;
        debug!(stitch = %name, line = self.line, "opened stitch");
        Ok(())
    }

    /// Find the group a new option at `depth` joins.
    ///
    /// `Ok(None)` means a new group must be opened at the cursor.
    fn find_group(&self, depth: usize) -> Step<Option<NodeId>> {
        let mut node = Some(self.cursor);
        while let Some(id) = node {
            let n = self.story.at(id);
            let base = match &n.kind {
                NodeKind::Group(g) if g.depth <= depth => Some(g.depth),
                NodeKind::Gather(g) if g.depth <= depth => Some(g.depth),
                _ => None,
            };
            if let Some(base) = base {
                if depth - base > 1 {
                    return Err(ParseErrorKind::IllegalNesting { depth, base });
                }
                let reuse = depth == base && matches!(n.kind, NodeKind::Group(_));
                return Ok(reuse.then_some(id));
            }
            node = n.parent;
        }
        if depth > 1 {
            return Err(ParseErrorKind::IllegalNesting { depth, base: 0 });
        }
        Ok(None)
    }

    fn open_group(&mut self, depth: usize) -> Step<NodeId> {
        self.require_successor_slot()?;
        let anchor = self.cursor;
        let path = path::join(self.story.path(anchor), GROUP_SUFFIX);
        let group = OptionGroup {
            options: Vec::new(),
            depth,
            gather: None,
        };
        let id = self.insert(path, Some(anchor), NodeKind::Group(group))?;
        self.link(anchor, id);
        debug!(group = %self.story.path(id), depth, line = self.line, "opened option group");
        Ok(id)
    }

    fn add_option(&mut self, depth: usize, sticky: bool, text: &str) -> Step<()> {
        let mut content = inline::parse(text)?;

        let mut condition = None;
        if let Some((expr, rest)) = inline::split_condition(&content.text) {
            let compiled = Condition::compile(expr).map_err(|source| {
                ParseErrorKind::MalformedCondition {
                    expr: expr.to_string(),
                    source,
                }
            })?;
            condition = Some(compiled);
            content.text = rest.to_string();
        }
        let label = self.take_label(&mut content)?;

        let group = match self.find_group(depth)? {
            Some(group) => group,
            None => self.open_group(depth)?,
        };
        let index = match &self.story.at(group).kind {
            NodeKind::Group(g) => g.options.len(),
            _ => 0,
        };
        let path = match label {
            Some(label) => label,
            None => path::join(self.story.path(group), &index.to_string()),
        };

        let option = OptionNode {
            content,
            sticky,
            condition,
            group,
            next: None,
        };
        let id = self.insert(path, Some(group), NodeKind::Option(option))?;
        if let NodeKind::Group(g) = &mut self.story.at_mut(group).kind {
            g.options.push(id);
        }
        self.cursor = id;
        Ok(())
    }

    fn add_gather(&mut self, depth: usize, text: &str) -> Step<()> {
        let mut content = inline::parse(text)?;
        let label = self.take_label(&mut content)?;

        let mut node = Some(self.cursor);
        let mut found = None;
        while let Some(id) = node {
            let n = self.story.at(id);
            // A gathered group is never an ancestor of the cursor again, so
            // the first group at this depth is still open.
            if let NodeKind::Group(g) = &n.kind {
                if g.depth == depth {
                    found = Some((id, n.parent));
                    break;
                }
            }
            node = n.parent;
        }
        let Some((group, parent)) = found else {
            return Err(ParseErrorKind::OrphanGather(depth));
        };

        let path = match label {
            Some(label) => label,
            None => path::join(self.story.path(group), GATHER_SUFFIX),
        };
        let gather = GatherNode {
            content,
            depth,
            next: None,
        };
        let id = self.insert(path, parent, NodeKind::Gather(gather))?;
        if let NodeKind::Group(g) = &mut self.story.at_mut(group).kind {
            g.gather = Some(id);
        }
        self.cursor = id;
        Ok(())
    }

    fn add_text(&mut self, text: &str) -> Step<()> {
        let mut content = inline::parse(text)?;

        let tags_only =
            content.text.trim().is_empty() && content.divert.is_none() && !content.tags.is_empty();
        if tags_only {
            if let NodeKind::Knot(c) | NodeKind::Stitch(c) = &mut self.story.at_mut(self.cursor).kind
            {
                c.tags.append(&mut content.tags);
                return Ok(());
            }
        }

        let label = self.take_label(&mut content)?;
        self.require_successor_slot()?;
        let anchor = self.cursor;
        let path = match label {
            Some(label) => label,
            None => path::join(self.story.path(anchor), LINE_SUFFIX),
        };
        let id = self.insert(path, Some(anchor), NodeKind::Text(TextNode { content, next: None }))?;
        self.link(anchor, id);
        self.cursor = id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn parse(source: &str) -> ParseResult<Story> {
        Parser::new().parse(source)
    }

    fn kind_of(story: &Story, path: &str) -> &'static str {
        let id = story.lookup(path).unwrap_or_else(|| panic!("no path {path}"));
        story.node(id).map(Node::kind_name).unwrap()
    }

    #[test]
    fn default_paths() {
        let story = parse("Hello\n* A\n  a\n* B\n- g -> END").unwrap();
        assert_eq!(kind_of(&story, "start__i"), "text");
        assert_eq!(kind_of(&story, "start__i__c"), "group");
        assert_eq!(kind_of(&story, "start__i__c__0"), "option");
        assert_eq!(kind_of(&story, "start__i__c__0__i"), "text");
        assert_eq!(kind_of(&story, "start__i__c__1"), "option");
        assert_eq!(kind_of(&story, "start__i__c__g"), "gather");
    }

    #[test]
    fn knot_and_stitch_paths() {
        let story = parse("== Knot_A\nIntro\n= st\nInner -> END").unwrap();
        assert_eq!(kind_of(&story, "Knot_A"), "knot");
        assert_eq!(kind_of(&story, "Knot_A__i"), "text");
        assert_eq!(kind_of(&story, "Knot_A__st"), "stitch");
        assert_eq!(kind_of(&story, "Knot_A__st__i"), "text");
    }

    #[test]
    fn labels_replace_default_paths() {
        let story = parse("== K\n* (greet) Hello\n- (after) Done -> END").unwrap();
        assert_eq!(kind_of(&story, "K__greet"), "option");
        assert_eq!(kind_of(&story, "K__after"), "gather");
        assert!(story.lookup("K__c__0").is_none());
        let greet = story.node(story.lookup("K__greet").unwrap()).unwrap();
        assert_eq!(greet.content().unwrap().text, "Hello");
    }

    #[test]
    fn empty_label_is_ignored() {
        let story = parse("() Plain -> END").unwrap();
        let id = story.lookup("start__i").unwrap();
        assert_eq!(story.node(id).unwrap().content().unwrap().text, "Plain");
    }

    #[test]
    fn condition_then_label() {
        let story = parse("* {seen > 0} (again) Once more -> END\nVAR seen = 0").unwrap();
        let id = story.lookup("again").unwrap();
        let NodeKind::Option(option) = &story.node(id).unwrap().kind else {
            panic!("not an option");
        };
        assert_eq!(option.content.text, "Once more");
        assert_eq!(option.condition.as_ref().unwrap().source(), "seen > 0");
    }

    #[test]
    fn sticky_flag() {
        let story = parse("+ Again -> END\n* Once -> END").unwrap();
        let again = story.lookup("start__c__0").unwrap();
        let NodeKind::Option(option) = &story.node(again).unwrap().kind else {
            panic!("not an option");
        };
        assert!(option.sticky);
    }

    #[test]
    fn illegal_nesting_jump() {
        let err = parse("* A\n*** C").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::IllegalNesting { depth: 3, base: 1 });
    }

    #[test]
    fn nested_option_without_context() {
        let err = parse("Hello\n** deep").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::IllegalNesting { depth: 2, base: 0 });
    }

    #[test]
    fn gather_without_open_group_is_orphaned() {
        assert_eq!(parse("- alone").unwrap_err().kind, ParseErrorKind::OrphanGather(1));
        assert_eq!(
            parse("* A\n- one\n- two").unwrap_err().kind,
            ParseErrorKind::OrphanGather(1)
        );
        assert_eq!(
            parse("* A\n- one\n* B\n-- two").unwrap_err().kind,
            ParseErrorKind::OrphanGather(2)
        );
    }

    #[test]
    fn gather_after_options_reopens_context() {
        let story = parse("* A\n- g\n* B\n- h -> END").unwrap();
        assert_eq!(kind_of(&story, "start__c__g"), "gather");
        assert_eq!(kind_of(&story, "start__c__g__c"), "group");
        assert_eq!(kind_of(&story, "start__c__g__c__g"), "gather");
    }

    #[test]
    fn duplicate_names() {
        assert_eq!(
            parse("== A\n== A").unwrap_err().kind,
            ParseErrorKind::DuplicateKnot("A".to_string())
        );
        assert_eq!(
            parse("== A\n= s\n= s").unwrap_err().kind,
            ParseErrorKind::DuplicateStitch {
                knot: "A".to_string(),
                stitch: "s".to_string()
            }
        );
        assert_eq!(
            parse("== A\n(x) one\n(x) two").unwrap_err().kind,
            ParseErrorKind::DuplicatePath("A__x".to_string())
        );
        assert_eq!(
            parse("VAR a = 1\nVAR a = 2").unwrap_err().kind,
            ParseErrorKind::DuplicateVariable("a".to_string())
        );
    }

    #[test]
    fn header_comments_and_tags() {
        let story = parse("== Knot_A // the first knot\nHi -> END").unwrap();
        assert_eq!(kind_of(&story, "Knot_A"), "knot");

        let story = parse("== K #dark // note\n#cold\n= s #room // inner\nIn -> END").unwrap();
        let NodeKind::Knot(knot) = &story.node(story.lookup("K").unwrap()).unwrap().kind else {
            panic!("not a knot");
        };
        assert_eq!(knot.tags, vec!["dark", "cold"]);
        let NodeKind::Stitch(stitch) = &story.node(story.lookup("K__s").unwrap()).unwrap().kind
        else {
            panic!("not a stitch");
        };
        assert_eq!(stitch.tags, vec!["room"]);
    }

    #[test]
    fn stitch_needs_a_knot() {
        assert_eq!(
            parse("Intro\n= lost").unwrap_err().kind,
            ParseErrorKind::StitchOutsideKnot("lost".to_string())
        );
    }

    #[test]
    fn malformed_condition_names_the_line() {
        let err = parse("Hi\n* {a >} Opt").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::MalformedCondition { .. }));
    }

    #[test]
    fn invalid_label() {
        assert_eq!(
            parse("(not a label) text").unwrap_err().kind,
            ParseErrorKind::InvalidLabel("not a label".to_string())
        );
    }

    #[test]
    fn tags_only_line_attaches_to_knot() {
        let story = parse("== K\n# mood: dark #chapter1\nText -> END").unwrap();
        let knot = story.knot("K").unwrap();
        let NodeKind::Knot(c) = &story.node(knot).unwrap().kind else {
            panic!("not a knot");
        };
        assert_eq!(c.tags, vec!["mood: dark", "chapter1"]);
        assert_eq!(kind_of(&story, "K__i"), "text");
    }

    #[test]
    fn line_numbers_skip_blank_lines() {
        let err = parse("Hello\n\n\n*+ bad").unwrap_err();
        assert_eq!(err.line, 4);
    }

    #[test]
    fn custom_classifier_is_used() {
        let classifier = Classifier::with_rules(Vec::new());
        let story = Parser::with_classifier(classifier)
            .parse("== Not a knot")
            .unwrap();
        assert!(story.knots().is_empty());
        assert_eq!(kind_of(&story, "start__i"), "text");
    }
}
