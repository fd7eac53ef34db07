//! Error types for parsing, validation and navigation.

use miette::Diagnostic;
use skein_expr::{EvalError, ExprError, Value};
use thiserror::Error;

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for navigation.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A line whose shape cannot be understood on its own.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    /// `VAR` line without a valid `name = literal`.
    #[error("malformed variable declaration: {0}")]
    MalformedVariable(String),

    /// Knot or stitch header with a missing name or trailing text.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Option marker run mixing `*` and `+`.
    #[error("option markers mix '*' and '+'")]
    MixedOptionMarkers,

    /// Divert arrow with an empty or invalid target, or a `-->` arrow.
    #[error("malformed divert: {0}")]
    MalformedDivert(String),
}

/// What went wrong during a parse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// The line shape is invalid.
    #[error(transparent)]
    Line(#[from] LineError),

    /// A variable was declared twice.
    #[error("variable already declared: {0}")]
    DuplicateVariable(String),

    /// A knot name was used twice.
    #[error("duplicate knot: {0}")]
    DuplicateKnot(String),

    /// A stitch name was used twice within one knot.
    #[error("duplicate stitch '{stitch}' in knot '{knot}'")]
    DuplicateStitch {
        /// Enclosing knot.
        knot: String,
        /// Repeated stitch name.
        stitch: String,
    },

    /// Two nodes would share one path.
    #[error("duplicate path: {0}")]
    DuplicatePath(String),

    /// A stitch header with no knot above it.
    #[error("stitch '{0}' is not inside a knot")]
    StitchOutsideKnot(String),

    /// An option more than one level deeper than its context.
    #[error("option nested at depth {depth} directly under depth {base}")]
    IllegalNesting {
        /// Depth of the offending option.
        depth: usize,
        /// Depth of the nearest enclosing group or gather.
        base: usize,
    },

    /// The insertion point cannot take a successor.
    #[error("node '{0}' cannot be followed by content")]
    NoSuccessorSlot(String),

    /// A gather with no option group at its depth.
    #[error("gather at depth {0} has no option group to close")]
    OrphanGather(usize),

    /// A `(label)` that is not an identifier.
    #[error("invalid label: {0}")]
    InvalidLabel(String),

    /// A `{condition}` that does not compile.
    #[error("malformed condition '{expr}': {source}")]
    MalformedCondition {
        /// Condition text as written.
        expr: String,
        /// Compiler error.
        source: ExprError,
    },
}

/// A fatal parse error with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// The failure.
    pub kind: ParseErrorKind,
}

/// A problem found by [`Story::validate`](crate::Story::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A node with no divert, successor or enclosing gather.
    #[error("'{path}' has no way to continue")]
    DeadEnd {
        /// Path of the node.
        path: String,
        /// Source line of the node.
        line: usize,
    },

    /// A condition refers to something that is neither a variable nor a path.
    #[error("condition on '{path}' refers to unknown name '{name}'")]
    UnknownIdentifier {
        /// Path of the guarded option.
        path: String,
        /// Source line of the option.
        line: usize,
        /// The unknown identifier.
        name: String,
    },

    /// A declared variable has the same name as a node path.
    #[error("variable '{name}' has the same name as a story path")]
    VariableShadowsPath {
        /// Variable name.
        name: String,
        /// Line of the declaration.
        line: usize,
    },
}

impl ValidationError {
    /// Source line the finding points at.
    pub fn line(&self) -> usize {
        match self {
            Self::DeadEnd { line, .. }
            | Self::UnknownIdentifier { line, .. }
            | Self::VariableShadowsPath { line, .. } => *line,
        }
    }
}

/// Errors raised while navigating a story.
///
/// A failed call never touches the story; only the session state it was
/// working on should be discarded.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum RuntimeError {
    /// The context points at a path the story does not have.
    #[error("unknown path: {0}")]
    #[diagnostic(code(skein::unknown_path), help("the context may belong to another story"))]
    UnknownPath(String),

    /// A divert target that matches nothing.
    #[error("cannot resolve divert '{target}' from '{from}'")]
    #[diagnostic(code(skein::unresolved_divert))]
    UnresolvedDivert {
        /// Node carrying the divert.
        from: String,
        /// Target as written.
        target: String,
    },

    /// Traversal reached a node with nowhere to go.
    #[error("dead end at '{0}'")]
    #[diagnostic(code(skein::dead_end), help("add a divert or a gather after this line"))]
    DeadEnd(String),

    /// Diverts form a cycle that never reaches a choice or the end.
    #[error("divert loop through '{0}'")]
    #[diagnostic(code(skein::divert_loop))]
    DivertLoop(String),

    /// `pick` was called while not waiting at a choice.
    #[error("'{0}' is not a choice")]
    #[diagnostic(code(skein::not_at_choice), help("call resume first"))]
    NotAtChoice(String),

    /// Index beyond the visible options.
    #[error("option {index} out of range at '{path}' ({available} available)")]
    #[diagnostic(code(skein::pick_out_of_range))]
    PickOutOfRange {
        /// Path of the option group.
        path: String,
        /// Requested index.
        index: usize,
        /// Number of visible options.
        available: usize,
    },

    /// Every option of a group is filtered out.
    #[error("no visible options at '{0}'")]
    #[diagnostic(code(skein::no_visible_options))]
    NoVisibleOptions(String),

    /// A visit counter slot holds a non-integer value.
    #[error("'{0}' holds a value that is not a visit count")]
    #[diagnostic(code(skein::not_a_counter))]
    NotACounter(String),

    /// A condition failed to evaluate.
    #[error("condition on '{path}' failed: {source}")]
    #[diagnostic(code(skein::condition))]
    Condition {
        /// Path of the guarded option.
        path: String,
        /// Evaluation error.
        source: EvalError,
    },

    /// A condition produced a non-boolean value.
    #[error("condition on '{path}' produced {value}, not a boolean")]
    #[diagnostic(code(skein::non_boolean_condition))]
    NonBooleanCondition {
        /// Path of the guarded option.
        path: String,
        /// The offending value.
        value: Value,
    },
}

/// Errors from [`load`](crate::load): a story that cannot be played.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoryError {
    /// The source failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The story parsed but failed validation.
    #[error("story has {} validation error(s)", .0.len())]
    Validation(Vec<ValidationError>),
}
