//! Undo/redo command stack.
//!
//! Panel edits and deletes are wrapped in a `Command::Single` holding the
//! forward mutation and its inverse. Drag gestures use text-snapshot
//! batching: the layout JSON is captured when the drag starts and when it
//! ends, so one undo restores the whole gesture.

use crate::sync::{LayoutMutation, SyncEngine};
use card_core::error::LayoutError;

/// Default number of undo steps kept.
pub const DEFAULT_UNDO_DEPTH: usize = 100;

#[derive(Debug, Clone)]
pub enum Command {
    Single {
        forward: Box<LayoutMutation>,
        inverse: Box<LayoutMutation>,
        description: String,
    },
    /// Whole-document swap (drag gestures, reset).
    Snapshot {
        text_before: String,
        text_after: String,
        description: String,
    },
}

pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_snapshot: Option<String>,
    batch_dirty: bool,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Start a batch. Mutations until `end_batch()` apply live but undo
    /// as one step.
    pub fn begin_batch(&mut self, engine: &mut SyncEngine) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(engine.current_text().to_string());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Close a batch. The outermost close pushes one snapshot command if
    /// the text actually changed.
    pub fn end_batch(&mut self, engine: &mut SyncEngine, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let text_before = self.batch_snapshot.take();
        if self.batch_dirty
            && let Some(text_before) = text_before
        {
            let text_after = engine.current_text().to_string();
            if text_before != text_after {
                self.push_snapshot(text_before, text_after, description);
            }
        }
        self.batch_dirty = false;
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Apply a mutation and record it for undo.
    pub fn execute(
        &mut self,
        engine: &mut SyncEngine,
        mutation: LayoutMutation,
        description: &str,
    ) -> Result<(), LayoutError> {
        if self.batch_depth > 0 {
            engine.apply_mutation(mutation)?;
            self.batch_dirty = true;
            return Ok(());
        }

        let inverse = compute_inverse(engine, &mutation)?;
        engine.apply_mutation(mutation.clone())?;
        self.push(Command::Single {
            forward: Box::new(mutation),
            inverse: Box::new(inverse),
            description: description.to_string(),
        });
        Ok(())
    }

    /// Record a whole-document change made outside `execute`.
    pub fn push_snapshot(&mut self, text_before: String, text_after: String, description: &str) {
        self.push(Command::Snapshot {
            text_before,
            text_after,
            description: description.to_string(),
        });
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, engine: &mut SyncEngine) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        let result = match &cmd {
            Command::Single { inverse, .. } => engine.apply_mutation(*inverse.clone()),
            Command::Snapshot { text_before, .. } => engine.set_text(text_before),
        };
        if let Err(err) = result {
            log::warn!("undo of `{}` failed: {err}", description(&cmd));
        }
        let desc = description(&cmd).to_string();
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, engine: &mut SyncEngine) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        let result = match &cmd {
            Command::Single { forward, .. } => engine.apply_mutation(*forward.clone()),
            Command::Snapshot { text_after, .. } => engine.set_text(text_after),
        };
        if let Err(err) = result {
            log::warn!("redo of `{}` failed: {err}", description(&cmd));
        }
        let desc = description(&cmd).to_string();
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn description(cmd: &Command) -> &str {
    match cmd {
        Command::Single { description, .. } | Command::Snapshot { description, .. } => description,
    }
}

/// The mutation that undoes `mutation`, read from the current document.
fn compute_inverse(engine: &SyncEngine, mutation: &LayoutMutation) -> Result<LayoutMutation, LayoutError> {
    let key = mutation.key();
    let element = || engine.doc.get(key).ok_or(LayoutError::UnknownElement(key));
    match mutation {
        LayoutMutation::MoveElement { .. } => {
            let el = element()?;
            Ok(LayoutMutation::MoveElement { key, x: el.x, y: el.y })
        }
        LayoutMutation::SetProperty { prop, .. } => Ok(LayoutMutation::SetProperty {
            key,
            prop: prop.current(element()?),
        }),
        LayoutMutation::RemoveElement { .. } => {
            let position = engine.doc.position_of(key).ok_or(LayoutError::UnknownElement(key))?;
            let entry = engine.doc.entry(key).cloned().ok_or(LayoutError::UnknownElement(key))?;
            Ok(LayoutMutation::InsertElement {
                key,
                position,
                entry: Box::new(entry),
            })
        }
        LayoutMutation::InsertElement { .. } => Ok(LayoutMutation::RemoveElement { key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ElementProp;
    use card_core::binding::DataDocument;
    use card_core::config::EngineConfig;
    use card_core::id::ElementKey;
    use pretty_assertions::assert_eq;

    const LAYOUT: &str = r#"{
  "baseSize": { "width": 335, "height": 515 },
  "groom": { "type": "text", "x": 24, "y": 395, "width": 111 },
  "bride": { "type": "text", "x": 193, "y": 395, "width": 111 }
}
"#;

    fn engine() -> SyncEngine {
        SyncEngine::from_text(LAYOUT, DataDocument::default(), EngineConfig::default()).unwrap()
    }

    fn groom() -> ElementKey {
        ElementKey::intern("groom")
    }

    #[test]
    fn undo_redo_single_property() {
        let mut engine = engine();
        let mut stack = CommandStack::default();
        stack
            .execute(
                &mut engine,
                LayoutMutation::SetProperty {
                    key: groom(),
                    prop: ElementProp::Y(300.0),
                },
                "set y",
            )
            .unwrap();
        assert_eq!(engine.doc.get(groom()).unwrap().y, 300.0);

        assert_eq!(stack.undo(&mut engine).as_deref(), Some("set y"));
        assert_eq!(engine.doc.get(groom()).unwrap().y, 395.0);
        assert!(stack.can_redo());

        stack.redo(&mut engine);
        assert_eq!(engine.doc.get(groom()).unwrap().y, 300.0);
    }

    #[test]
    fn undo_delete_restores_document_order() {
        let mut engine = engine();
        let original = engine.current_text().to_string();
        let mut stack = CommandStack::default();
        stack
            .execute(&mut engine, LayoutMutation::RemoveElement { key: groom() }, "delete")
            .unwrap();
        assert!(!engine.doc.contains(groom()));
        stack.undo(&mut engine);
        assert_eq!(engine.current_text(), original);
    }

    #[test]
    fn batch_collapses_to_one_step() {
        let mut engine = engine();
        let mut stack = CommandStack::default();
        stack.begin_batch(&mut engine);
        for x in [30.0, 40.0, 74.0] {
            stack
                .execute(&mut engine, LayoutMutation::MoveElement { key: groom(), x, y: 395.0 }, "move")
                .unwrap();
        }
        stack.end_batch(&mut engine, "drag");
        assert_eq!(engine.doc.get(groom()).unwrap().x, 74.0);

        assert_eq!(stack.undo(&mut engine).as_deref(), Some("drag"));
        assert_eq!(engine.doc.get(groom()).unwrap().x, 24.0);
        assert!(!stack.can_undo());
    }

    #[test]
    fn empty_batch_pushes_nothing() {
        let mut engine = engine();
        let mut stack = CommandStack::default();
        stack.begin_batch(&mut engine);
        stack.end_batch(&mut engine, "drag");
        assert!(!stack.can_undo());
    }

    #[test]
    fn new_action_clears_redo() {
        let mut engine = engine();
        let mut stack = CommandStack::default();
        let set = |y| LayoutMutation::SetProperty {
            key: groom(),
            prop: ElementProp::Y(y),
        };
        stack.execute(&mut engine, set(10.0), "a").unwrap();
        stack.undo(&mut engine);
        stack.execute(&mut engine, set(20.0), "b").unwrap();
        assert!(!stack.can_redo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut engine = engine();
        let mut stack = CommandStack::new(2);
        for y in [1.0, 2.0, 3.0] {
            stack
                .execute(
                    &mut engine,
                    LayoutMutation::SetProperty {
                        key: groom(),
                        prop: ElementProp::Y(y),
                    },
                    "y",
                )
                .unwrap();
        }
        assert!(stack.undo(&mut engine).is_some());
        assert!(stack.undo(&mut engine).is_some());
        assert!(stack.undo(&mut engine).is_none());
        assert_eq!(engine.doc.get(groom()).unwrap().y, 1.0);
    }

    #[test]
    fn failed_mutation_records_nothing() {
        let mut engine = engine();
        let mut stack = CommandStack::default();
        let result = stack.execute(
            &mut engine,
            LayoutMutation::RemoveElement {
                key: ElementKey::intern("ghost"),
            },
            "delete",
        );
        assert!(result.is_err());
        assert!(!stack.can_undo());
    }
}
