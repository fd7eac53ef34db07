//! The parsed story graph.

use std::collections::{BTreeMap, HashMap};

use skein_expr::Value;

use crate::node::{Node, NodeId, NodeKind};
use crate::path::{END_PATH, START_PATH, join};

/// A story-wide variable declared with `VAR`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Default value.
    pub value: Value,
    /// Line of the declaration.
    pub line: usize,
}

/// An immutable, parsed story.
///
/// The story holds no play state, so one instance can serve any number of
/// sessions, including from several threads at once.
#[derive(Debug, Clone)]
pub struct Story {
    pub(crate) nodes: Vec<Node>,
    pub(crate) paths: HashMap<String, NodeId>,
    pub(crate) knots: Vec<NodeId>,
    pub(crate) variables: BTreeMap<String, Variable>,
    pub(crate) start: NodeId,
    pub(crate) end: NodeId,
}

impl Story {
    pub(crate) fn new() -> Self {
        let mut story = Self {
            nodes: Vec::new(),
            paths: HashMap::new(),
            knots: Vec::new(),
            variables: BTreeMap::new(),
            start: NodeId(0),
            end: NodeId(1),
        };
        story.start = story.insert(START_PATH.to_string(), None, 0, NodeKind::Start { next: None });
        story.end = story.insert(END_PATH.to_string(), None, 0, NodeKind::End);
        story
    }

    /// Append a node. The caller checks the path is free.
    pub(crate) fn insert(
        &mut self,
        path: String,
        parent: Option<NodeId>,
        line: usize,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.paths.insert(path.clone(), id);
        self.nodes.push(Node {
            path,
            parent,
            line,
            kind,
        });
        id
    }

    pub(crate) fn at(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn at_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// The node with this id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Number of nodes, sentinels included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the story has no content beyond its sentinels.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    /// Look a node up by path.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.paths.get(path).copied()
    }

    /// Path of a node.
    pub fn path(&self, id: NodeId) -> &str {
        &self.at(id).path
    }

    /// The start sentinel.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The end sentinel.
    pub fn end(&self) -> NodeId {
        self.end
    }

    /// Knots in declaration order.
    pub fn knots(&self) -> &[NodeId] {
        &self.knots
    }

    /// A knot by name.
    pub fn knot(&self, name: &str) -> Option<NodeId> {
        self.knots.iter().copied().find(|&id| match &self.at(id).kind {
            NodeKind::Knot(c) => c.name == name,
            _ => false,
        })
    }

    /// A stitch of the given knot by name.
    pub fn stitch(&self, knot: NodeId, name: &str) -> Option<NodeId> {
        let id = self.lookup(&join(self.path(knot), name))?;
        matches!(self.at(id).kind, NodeKind::Stitch(_)).then_some(id)
    }

    /// Declared variables by name.
    pub fn variables(&self) -> &BTreeMap<String, Variable> {
        &self.variables
    }

    /// A declared variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Declared variables with their default values.
    pub fn initial_vars(&self) -> BTreeMap<String, Value> {
        self.variables
            .iter()
            .map(|(name, var)| (name.clone(), var.value.clone()))
            .collect()
    }

    /// Nearest enclosing knot and stitch of a node, the node itself included.
    pub fn containers(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let mut node = Some(id);
        while let Some(current) = node {
            match self.at(current).kind {
                NodeKind::Stitch(_) => return (self.at(current).parent, Some(current)),
                NodeKind::Knot(_) => return (Some(current), None),
                _ => node = self.at(current).parent,
            }
        }
        (None, None)
    }

    /// Path of the nearest stitch, else knot, enclosing a node.
    pub fn scope(&self, id: NodeId) -> Option<&str> {
        match self.containers(id) {
            (_, Some(stitch)) => Some(self.path(stitch)),
            (Some(knot), None) => Some(self.path(knot)),
            (None, None) => None,
        }
    }

    /// Where traversal goes after a node when it has no divert.
    ///
    /// The explicit successor wins. An empty knot falls through to its first
    /// stitch, and Start with no top-level content to the first knot or End.
    /// Anything else takes the gather of the nearest enclosing group that
    /// has one.
    pub fn fallback_next(&self, id: NodeId) -> Option<NodeId> {
        let node = self.at(id);
        if let Some(next) = node.next() {
            return Some(next);
        }
        match &node.kind {
            NodeKind::Start { .. } => {
                return Some(self.knots.first().copied().unwrap_or(self.end));
            }
            NodeKind::Knot(c) => {
                if let Some(first) = c.stitches.first() {
                    return Some(*first);
                }
            }
            NodeKind::End | NodeKind::Group(_) => return None,
            _ => {}
        }

        let mut ancestor = node.parent;
        while let Some(current) = ancestor {
            let n = self.at(current);
            if let NodeKind::Group(group) = &n.kind {
                if group.gather.is_some() {
                    return group.gather;
                }
            }
            ancestor = n.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn fresh_story_has_sentinels() {
        let story = Story::new();
        assert!(story.is_empty());
        assert_eq!(story.lookup("start"), Some(story.start()));
        assert_eq!(story.lookup("end"), Some(story.end()));
        assert_eq!(story.fallback_next(story.start()), Some(story.end()));
    }

    #[test]
    fn containers_and_scope() {
        let story = parse("== K\n= s\nLine -> END").unwrap();
        let line = story.lookup("K__s__i").unwrap();
        let knot = story.knot("K").unwrap();
        let stitch = story.stitch(knot, "s").unwrap();
        assert_eq!(story.containers(line), (Some(knot), Some(stitch)));
        assert_eq!(story.scope(line), Some("K__s"));
        assert_eq!(story.scope(story.start()), None);
    }

    #[test]
    fn start_falls_through_to_first_knot() {
        let story = parse("== First\nHi -> END\n== Second\nBye -> END").unwrap();
        assert_eq!(story.fallback_next(story.start()), story.knot("First"));
    }

    #[test]
    fn empty_knot_falls_through_to_first_stitch() {
        let story = parse("== K\n= one\nA -> END\n= two\nB -> END").unwrap();
        let knot = story.knot("K").unwrap();
        assert_eq!(story.fallback_next(knot), story.stitch(knot, "one"));
    }

    #[test]
    fn gather_fallback_climbs_past_nested_groups() {
        let source = "* A\n** A1\n** A2\n- joined -> END";
        let story = parse(source).unwrap();
        let a2 = story.lookup("start__c__0__c__1").unwrap();
        let gather = story.lookup("start__c__g");
        assert_eq!(story.fallback_next(a2), gather);
    }
}
