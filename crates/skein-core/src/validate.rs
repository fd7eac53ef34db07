//! Post-parse checks.

use crate::error::ValidationError;
use crate::node::NodeKind;
use crate::story::Story;

impl Story {
    /// Check the whole story and report every problem found.
    ///
    /// Finds nodes with no way to continue, conditions naming something that
    /// is neither a variable nor a path, and variables named like a path.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (id, node) in self.nodes() {
            if node.takes_successor() && node.divert().is_none() && self.fallback_next(id).is_none() {
                errors.push(ValidationError::DeadEnd {
                    path: node.path.clone(),
                    line: node.line,
                });
            }

            if let NodeKind::Option(option) = &node.kind {
                let Some(condition) = &option.condition else {
                    continue;
                };
                for name in condition.identifiers() {
                    if self.variable(name).is_none() && self.lookup(name).is_none() {
                        errors.push(ValidationError::UnknownIdentifier {
                            path: node.path.clone(),
                            line: node.line,
                            name: name.to_string(),
                        });
                    }
                }
            }
        }

        for (name, var) in self.variables() {
            if self.lookup(name).is_some() {
                errors.push(ValidationError::VariableShadowsPath {
                    name: name.clone(),
                    line: var.line,
                });
            }
        }

        errors
    }
}
