//! Parser and navigation engine for Skein stories.
//!
//! A story is a line-oriented document of prose, choices, knots, stitches,
//! gathers and diverts. [`parse`] compiles it into an immutable [`Story`]
//! graph; a [`Session`] (or the stateless [`Story::resume`] and
//! [`Story::pick`]) walks that graph one decision at a time, producing a
//! [`Section`] at every pause and a serializable [`Context`] to continue
//! from.
//!
//! ```
//! let story = skein_core::load("Hello\n* Wave -> END\n* Leave -> END").unwrap();
//! let (section, ctx) = story.resume(&skein_core::Context::new(&story)).unwrap();
//! assert_eq!(section.options, vec!["Wave", "Leave"]);
//! let (section, _) = story.pick(&ctx, 1).unwrap();
//! assert!(section.end);
//! ```

pub mod builder;
pub mod condition;
pub mod diagnostics;
mod divert;
pub mod engine;
pub mod error;
pub mod inline;
pub mod line;
pub mod node;
pub mod path;
pub mod section;
pub mod state;
pub mod story;
mod validate;

pub use builder::Parser;
pub use condition::Condition;
pub use engine::Session;
pub use error::{
    LineError, ParseError, ParseErrorKind, ParseResult, RuntimeError, RuntimeResult, StoryError,
    ValidationError,
};
pub use line::{Classifier, LineKind, Rule};
pub use node::{Content, Node, NodeId, NodeKind};
pub use path::PATH_SEPARATOR;
pub use section::Section;
pub use skein_expr::Value;
pub use state::Context;
pub use story::{Story, Variable};

/// Parse a story with the built-in line rules.
pub fn parse(source: &str) -> ParseResult<Story> {
    Parser::new().parse(source)
}

/// Parse and validate a story, rejecting it if any check fails.
pub fn load(source: &str) -> Result<Story, StoryError> {
    let story = parse(source)?;
    let errors = story.validate();
    if errors.is_empty() {
        Ok(story)
    } else {
        Err(StoryError::Validation(errors))
    }
}
