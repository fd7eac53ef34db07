//! Story navigation.

use std::collections::HashSet;

use skein_expr::{EvalError, Value};
use tracing::{debug, trace};

use crate::error::{RuntimeError, RuntimeResult};
use crate::inline::render_option;
use crate::node::{NodeId, NodeKind, OptionGroup};
use crate::section::{Section, SectionBuilder};
use crate::state::Context;
use crate::story::Story;

/// A play-through of a story.
///
/// The session borrows the story and owns its [`Context`], so any number of
/// sessions can walk one story independently.
#[derive(Debug, Clone)]
pub struct Session<'s> {
    story: &'s Story,
    state: Context,
    current: NodeId,
}

impl<'s> Session<'s> {
    /// Start a new play-through.
    pub fn new(story: &'s Story) -> Self {
        Self {
            story,
            state: Context::new(story),
            current: story.start(),
        }
    }

    /// Continue from a saved context.
    pub fn with_context(story: &'s Story, state: Context) -> RuntimeResult<Self> {
        let current = story
            .lookup(&state.current)
            .ok_or_else(|| RuntimeError::UnknownPath(state.current.clone()))?;
        Ok(Self {
            story,
            state,
            current,
        })
    }

    /// The story being played.
    pub fn story(&self) -> &'s Story {
        self.story
    }

    /// Current state.
    pub fn context(&self) -> &Context {
        &self.state
    }

    /// Give up the session, keeping its state.
    pub fn into_context(self) -> Context {
        self.state
    }

    /// The node the session stands on.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Walk forward until a choice or the end, rendering what is passed.
    pub fn advance(&mut self) -> RuntimeResult<Section> {
        debug!(from = %self.state.current, "advance");
        let story = self.story;
        let mut section = SectionBuilder::default();
        let mut seen = HashSet::new();

        loop {
            let id = self.current;
            let node = story.at(id);
            if !seen.insert(id) {
                return Err(RuntimeError::DivertLoop(node.path.clone()));
            }
            self.visit(&node.path)?;
            self.state.current = node.path.clone();

            match &node.kind {
                NodeKind::End => {
                    section.mark_end();
                    break;
                }
                NodeKind::Group(group) => {
                    let visible = self.visible_options(&node.path, group)?;
                    if visible.is_empty() {
                        return Err(RuntimeError::NoVisibleOptions(node.path.clone()));
                    }
                    for option in visible {
                        if let NodeKind::Option(o) = &story.at(option).kind {
                            section.push_option(
                                render_option(&o.content.text, true).trim().to_string(),
                                &o.content.tags,
                            );
                        }
                    }
                    break;
                }
                NodeKind::Option(o) => {
                    let played = render_option(&o.content.text, false);
                    let mut text = played.as_str();
                    if !o.content.glue_start {
                        text = text.trim_start();
                    }
                    if !o.content.glue_end {
                        text = text.trim_end();
                    }
                    section.push(&o.content, text.to_string());
                }
                NodeKind::Text(t) => section.push(&t.content, t.content.text.clone()),
                NodeKind::Gather(g) => section.push(&g.content, g.content.text.clone()),
                NodeKind::Knot(c) | NodeKind::Stitch(c) => section.push_tags(&c.tags),
                NodeKind::Start { .. } => {}
            }

            self.current = self.next_of(id)?;
        }

        Ok(section.finish())
    }

    /// Choose one of the visible options and advance.
    pub fn pick(&mut self, index: usize) -> RuntimeResult<Section> {
        let story = self.story;
        let node = story.at(self.current);
        let NodeKind::Group(group) = &node.kind else {
            return Err(RuntimeError::NotAtChoice(node.path.clone()));
        };
        let visible = self.visible_options(&node.path, group)?;
        let chosen = visible
            .get(index)
            .copied()
            .ok_or_else(|| RuntimeError::PickOutOfRange {
                path: node.path.clone(),
                index,
                available: visible.len(),
            })?;
        debug!(group = %node.path, index, option = %story.path(chosen), "pick");
        self.current = chosen;
        self.advance()
    }

    /// Visible options of the group the session stands on.
    pub fn options(&self) -> RuntimeResult<Vec<NodeId>> {
        let node = self.story.at(self.current);
        match &node.kind {
            NodeKind::Group(group) => self.visible_options(&node.path, group),
            _ => Err(RuntimeError::NotAtChoice(node.path.clone())),
        }
    }

    fn visible_options(&self, path: &str, group: &OptionGroup) -> RuntimeResult<Vec<NodeId>> {
        let mut visible = Vec::new();
        for &id in &group.options {
            let option = self.story.at(id);
            let NodeKind::Option(o) = &option.kind else {
                continue;
            };
            if let Some(condition) = &o.condition {
                let shown = condition
                    .evaluate(self.story, &self.state.vars)
                    .map_err(|e| match e {
                        EvalError::NotBoolean(value) => RuntimeError::NonBooleanCondition {
                            path: option.path.clone(),
                            value,
                        },
                        source => RuntimeError::Condition {
                            path: option.path.clone(),
                            source,
                        },
                    })?;
                if !shown {
                    continue;
                }
            }
            if !o.sticky && self.state.visits(&option.path) > 0 {
                continue;
            }
            visible.push(id);
        }
        trace!(group = %path, visible = visible.len(), "listed options");
        Ok(visible)
    }

    fn visit(&mut self, path: &str) -> RuntimeResult<()> {
        trace!(path, "visit");
        match self.state.vars.get_mut(path) {
            Some(Value::Integer(count)) => {
                *count = count.saturating_add(1);
                Ok(())
            }
            Some(_) => Err(RuntimeError::NotACounter(path.to_string())),
            None => {
                self.state.vars.insert(path.to_string(), Value::Integer(1));
                Ok(())
            }
        }
    }

    fn next_of(&self, id: NodeId) -> RuntimeResult<NodeId> {
        let node = self.story.at(id);
        if let Some(target) = node.divert() {
            return self
                .story
                .resolve_divert(target, id)
                .ok_or_else(|| RuntimeError::UnresolvedDivert {
                    from: node.path.clone(),
                    target: target.to_string(),
                });
        }
        self.story
            .fallback_next(id)
            .ok_or_else(|| RuntimeError::DeadEnd(node.path.clone()))
    }
}

impl Story {
    /// Advance from a saved context.
    ///
    /// The caller's context is left untouched; the updated one is returned
    /// with the section only on success.
    pub fn resume(&self, context: &Context) -> RuntimeResult<(Section, Context)> {
        let mut session = Session::with_context(self, context.clone())?;
        let section = session.advance()?;
        Ok((section, session.into_context()))
    }

    /// Pick an option from a context paused at a choice, then advance.
    pub fn pick(&self, context: &Context, index: usize) -> RuntimeResult<(Section, Context)> {
        let mut session = Session::with_context(self, context.clone())?;
        let section = session.pick(index)?;
        Ok((section, session.into_context()))
    }
}
