//! Divert target resolution.

use crate::node::NodeId;
use crate::path::{self, END_PATH};
use crate::story::Story;

impl Story {
    /// Resolve a divert target as seen from a node.
    ///
    /// `END` matches in any case. A single name tries a label in the local
    /// scope, then a stitch of the enclosing knot, then a knot. `a.b` tries
    /// `knot__a__b` under the enclosing knot, then stitch `b` of knot `a`.
    /// Longer targets are looked up as full paths.
    pub fn resolve_divert(&self, target: &str, from: NodeId) -> Option<NodeId> {
        if target.eq_ignore_ascii_case(END_PATH) {
            return Some(self.end());
        }

        let segments: Vec<&str> = target.split('.').collect();
        let (knot, _) = self.containers(from);
        match segments.as_slice() {
            [name] => {
                let local = match self.scope(from) {
                    Some(scope) => path::join(scope, name),
                    None => (*name).to_string(),
                };
                self.lookup(&local)
                    .or_else(|| knot.and_then(|k| self.stitch(k, name)))
                    .or_else(|| self.knot(name))
            }
            [first, second] => knot
                .and_then(|k| {
                    let under_knot = path::join(&path::join(self.path(k), first), second);
                    self.lookup(&under_knot)
                })
                .or_else(|| self.knot(first).and_then(|k| self.stitch(k, second))),
            _ => self.lookup(&path::from_dotted(target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    const SOURCE: &str = "\
Top -> END
(global_label) Global -> END
== Knot_A
(knot_label) In A -> END
= st
(stitch_label) In st -> END
= other
Other -> END
== Knot_B
Line in B -> END
= st
B stitch -> END
";

    fn resolve(target: &str, from: &str) -> Option<String> {
        let story = parse(SOURCE).unwrap();
        let from = story.lookup(from).unwrap();
        story
            .resolve_divert(target, from)
            .map(|id| story.path(id).to_string())
    }

    #[test]
    fn end_is_case_insensitive() {
        assert_eq!(resolve("END", "start").as_deref(), Some("end"));
        assert_eq!(resolve("End", "Knot_A").as_deref(), Some("end"));
    }

    #[test]
    fn single_segment_prefers_local_label() {
        assert_eq!(
            resolve("stitch_label", "Knot_A__st").as_deref(),
            Some("Knot_A__st__stitch_label")
        );
        assert_eq!(
            resolve("knot_label", "Knot_A__knot_label").as_deref(),
            Some("Knot_A__knot_label")
        );
    }

    #[test]
    fn single_segment_then_stitch_then_knot() {
        assert_eq!(resolve("other", "Knot_A__st").as_deref(), Some("Knot_A__other"));
        assert_eq!(resolve("Knot_B", "Knot_A__st").as_deref(), Some("Knot_B"));
        assert_eq!(resolve("global_label", "start").as_deref(), Some("global_label"));
    }

    #[test]
    fn label_in_another_scope_is_not_local() {
        assert_eq!(resolve("stitch_label", "Knot_A__other"), None);
    }

    #[test]
    fn two_segments() {
        assert_eq!(
            resolve("st.stitch_label", "Knot_A__other").as_deref(),
            Some("Knot_A__st__stitch_label")
        );
        assert_eq!(resolve("Knot_B.st", "Knot_A").as_deref(), Some("Knot_B__st"));
        assert_eq!(resolve("Knot_A.knot_label", "Knot_B"), None);
    }

    #[test]
    fn knot_label_in_another_knot_stays_unresolved() {
        let story = parse("-> B\n== A\n(lbl) In A -> END\n== B\nIn B -> A.lbl").unwrap();
        let from = story.lookup("B__i").unwrap();
        assert_eq!(story.resolve_divert("A.lbl", from), None);
        assert!(matches!(
            story.resume(&crate::Context::new(&story)),
            Err(crate::RuntimeError::UnresolvedDivert { .. })
        ));
    }

    #[test]
    fn three_segments_are_full_paths() {
        assert_eq!(
            resolve("Knot_A.st.stitch_label", "start").as_deref(),
            Some("Knot_A__st__stitch_label")
        );
        assert_eq!(resolve("Knot_A.st.missing", "start"), None);
    }
}
