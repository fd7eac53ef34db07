//! Content graph nodes.
//!
//! Nodes live in an arena owned by [`Story`](crate::Story) and refer to each
//! other through [`NodeId`]s, so the finished graph can be shared read-only.

use std::fmt;

use crate::condition::Condition;

/// Stable index of a node in the story arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Renderable payload of a line after inline features are stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    /// Display text.
    pub text: String,
    /// Tags in declaration order.
    pub tags: Vec<String>,
    /// Divert target as written, e.g. `knot.stitch`.
    pub divert: Option<String>,
    /// The line started with `<>`.
    pub glue_start: bool,
    /// The line ended with `<>`.
    pub glue_end: bool,
}

/// A plain line of text.
#[derive(Debug, Clone)]
pub struct TextNode {
    /// Rendered content.
    pub content: Content,
    /// Explicit successor.
    pub next: Option<NodeId>,
}

/// One choice inside an [`OptionGroup`].
#[derive(Debug, Clone)]
pub struct OptionNode {
    /// Option text, possibly containing a `[suppressed]` segment.
    pub content: Content,
    /// Sticky options stay listed after being picked.
    pub sticky: bool,
    /// Visibility guard.
    pub condition: Option<Condition>,
    /// The group this option belongs to.
    pub group: NodeId,
    /// First line of the option's own content.
    pub next: Option<NodeId>,
}

/// A set of options sharing one nesting depth.
#[derive(Debug, Clone)]
pub struct OptionGroup {
    /// Options in authored order.
    pub options: Vec<NodeId>,
    /// Number of option markers.
    pub depth: usize,
    /// Convergence point of all branches, if any.
    pub gather: Option<NodeId>,
}

/// A convergence point closing an option group.
#[derive(Debug, Clone)]
pub struct GatherNode {
    /// Rendered content.
    pub content: Content,
    /// Number of gather markers.
    pub depth: usize,
    /// Explicit successor.
    pub next: Option<NodeId>,
}

/// A knot or stitch header.
#[derive(Debug, Clone)]
pub struct Container {
    /// Name as written in the header.
    pub name: String,
    /// Tags from tags-only lines directly under the header.
    pub tags: Vec<String>,
    /// First line of content.
    pub next: Option<NodeId>,
    /// Stitches in declaration order. Always empty for a stitch.
    pub stitches: Vec<NodeId>,
}

/// The variant-specific part of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Entry sentinel.
    Start {
        /// First top-level content.
        next: Option<NodeId>,
    },
    /// Terminal sentinel.
    End,
    /// Plain text line.
    Text(TextNode),
    /// A choice.
    Option(OptionNode),
    /// A branch point.
    Group(OptionGroup),
    /// A convergence point.
    Gather(GatherNode),
    /// Top-level container.
    Knot(Container),
    /// Container scoped to a knot.
    Stitch(Container),
}

/// A node in the story graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique address of the node.
    pub path: String,
    /// Structural parent, used for nesting and gather fallback.
    pub parent: Option<NodeId>,
    /// 1-based source line, 0 for sentinels.
    pub line: usize,
    /// Variant data.
    pub kind: NodeKind,
}

impl Node {
    /// Short name of the variant, used in logs and listings.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Start { .. } => "start",
            NodeKind::End => "end",
            NodeKind::Text(_) => "text",
            NodeKind::Option(_) => "option",
            NodeKind::Group(_) => "group",
            NodeKind::Gather(_) => "gather",
            NodeKind::Knot(_) => "knot",
            NodeKind::Stitch(_) => "stitch",
        }
    }

    /// Rendered content, for nodes that carry text.
    pub fn content(&self) -> Option<&Content> {
        match &self.kind {
            NodeKind::Text(t) => Some(&t.content),
            NodeKind::Option(o) => Some(&o.content),
            NodeKind::Gather(g) => Some(&g.content),
            _ => None,
        }
    }

    /// Divert target of this node, if it has one.
    pub fn divert(&self) -> Option<&str> {
        self.content().and_then(|c| c.divert.as_deref())
    }

    /// Explicit successor link.
    pub fn next(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Start { next } => *next,
            NodeKind::Text(t) => t.next,
            NodeKind::Option(o) => o.next,
            NodeKind::Gather(g) => g.next,
            NodeKind::Knot(c) | NodeKind::Stitch(c) => c.next,
            NodeKind::End | NodeKind::Group(_) => None,
        }
    }

    /// Whether traversal continues past this node on its own.
    ///
    /// Groups wait for a pick and End terminates, so neither has one.
    pub fn takes_successor(&self) -> bool {
        !matches!(self.kind, NodeKind::End | NodeKind::Group(_))
    }

    pub(crate) fn next_slot(&mut self) -> Option<&mut Option<NodeId>> {
        match &mut self.kind {
            NodeKind::Start { next } => Some(next),
            NodeKind::Text(t) => Some(&mut t.next),
            NodeKind::Option(o) => Some(&mut o.next),
            NodeKind::Gather(g) => Some(&mut g.next),
            NodeKind::Knot(c) | NodeKind::Stitch(c) => Some(&mut c.next),
            NodeKind::End | NodeKind::Group(_) => None,
        }
    }
}
