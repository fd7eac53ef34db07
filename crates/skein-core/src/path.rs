//! Node addressing.
//!
//! Every addressable node gets a path built from its anchor plus a
//! structural suffix; a `(label)` replaces it with `<scope>__label`.

use crate::error::ParseErrorKind;
use crate::line::is_identifier;

/// Separator between path segments.
pub const PATH_SEPARATOR: &str = "__";

/// Path of the start sentinel.
pub const START_PATH: &str = "start";

/// Path of the end sentinel.
pub const END_PATH: &str = "end";

/// Suffix of a text line appended to an anchor.
pub(crate) const LINE_SUFFIX: &str = "i";

/// Suffix of an option group opened at an anchor.
pub(crate) const GROUP_SUFFIX: &str = "c";

/// Suffix of a group's gather.
pub(crate) const GATHER_SUFFIX: &str = "g";

/// Join two path segments.
pub fn join(parent: &str, child: &str) -> String {
    format!("{parent}{PATH_SEPARATOR}{child}")
}

/// Path for a label under the given scope, or at the top level.
pub fn labelled(scope: Option<&str>, label: &str) -> Result<String, ParseErrorKind> {
    if !is_identifier(label) {
        return Err(ParseErrorKind::InvalidLabel(label.to_string()));
    }
    Ok(match scope {
        Some(scope) => join(scope, label),
        None => label.to_string(),
    })
}

/// Rewrite a dotted reference such as `Knot.label` to path form.
pub fn from_dotted(reference: &str) -> String {
    reference.replace('.', PATH_SEPARATOR)
}
