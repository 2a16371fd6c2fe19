//! Undo/Redo command stack.
//!
//! Every edit is recorded as an `ObjectChange` in its applied state; undo
//! pops and reverts it, redo applies it again.
//!
//! Drag gestures use **batching**: changes pushed between `begin_batch`
//! and the matching `end_batch` are collected and land on the undo stack
//! as a single `List` change, so one undo reverses the whole gesture.

use dia_core::{DiaResult, Diagram, ObjectChange};

/// One undoable step.
#[derive(Debug)]
pub struct Command {
    pub change: ObjectChange,
    pub description: String,
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Changes pushed inside the current batch, oldest first.
    batch: Vec<ObjectChange>,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch: Vec::new(),
        }
    }

    /// Start a batch group. Batches nest; only the outermost `end_batch`
    /// produces an undo step.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes, everything
    /// pushed inside it becomes one command.
    pub fn end_batch(&mut self, description: &str) {
        if self.batch_depth == 0 {
            log::warn!("end_batch without begin_batch");
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 && !self.batch.is_empty() {
            let change = ObjectChange::list(std::mem::take(&mut self.batch));
            self.record(change, description);
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Record a change that has already been applied to the diagram.
    pub fn push(&mut self, change: ObjectChange, description: &str) {
        if change.is_empty() {
            return;
        }
        if self.batch_depth > 0 {
            self.batch.push(change);
            return;
        }
        self.record(change, description);
    }

    /// Apply `change` to `dia`, then record it.
    pub fn execute(&mut self, dia: &mut Diagram, mut change: ObjectChange, description: &str) -> DiaResult<()> {
        change.apply(dia)?;
        self.push(change, description);
        Ok(())
    }

    fn record(&mut self, change: ObjectChange, description: &str) {
        log::debug!("undo step: {description}");
        self.undo_stack.push(Command {
            change,
            description: description.to_string(),
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns its description.
    ///
    /// A command whose revert fails is dropped rather than moved to the
    /// redo stack.
    pub fn undo(&mut self, dia: &mut Diagram) -> DiaResult<Option<String>> {
        let Some(mut cmd) = self.undo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = cmd.change.revert(dia) {
            log::warn!("undo `{}` failed: {e}", cmd.description);
            return Err(e);
        }
        let desc = cmd.description.clone();
        self.redo_stack.push(cmd);
        Ok(Some(desc))
    }

    /// Redo the last undone command.
    pub fn redo(&mut self, dia: &mut Diagram) -> DiaResult<Option<String>> {
        let Some(mut cmd) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = cmd.change.apply(dia) {
            log::warn!("redo `{}` failed: {e}", cmd.description);
            return Err(e);
        }
        let desc = cmd.description.clone();
        self.undo_stack.push(cmd);
        Ok(Some(desc))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch.clear();
        self.batch_depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dia_core::{Attributes, ObjectId, ObjectRegistry, Point};
    use pretty_assertions::assert_eq;

    fn with_box() -> (Diagram, ObjectId) {
        let mut dia = Diagram::new();
        let id = dia.next_id();
        let created = ObjectRegistry::with_standard_shapes()
            .create("Standard - Box", Point::ZERO, &Attributes::default(), id)
            .unwrap();
        let id = dia.add_object(created.object).unwrap();
        (dia, id)
    }

    fn moved(objects: Vec<ObjectId>, dx: f64) -> ObjectChange {
        ObjectChange::MoveObjects {
            objects,
            delta: Point::new(dx, 0.0),
        }
    }

    fn pos(dia: &Diagram, id: ObjectId) -> Point {
        dia.get(id).unwrap().position()
    }

    #[test]
    fn execute_undo_redo() {
        let (mut dia, b) = with_box();
        let mut stack = CommandStack::new(10);
        stack.execute(&mut dia, moved(vec![b], 3.0), "move").unwrap();
        assert_eq!(pos(&dia, b), Point::new(3.0, 0.0));

        assert_eq!(stack.undo(&mut dia).unwrap(), Some("move".to_string()));
        assert_eq!(pos(&dia, b), Point::ZERO);
        assert!(stack.can_redo());

        assert_eq!(stack.redo(&mut dia).unwrap(), Some("move".to_string()));
        assert_eq!(pos(&dia, b), Point::new(3.0, 0.0));
        assert!(!stack.can_redo());
    }

    #[test]
    fn new_action_clears_redo() {
        let (mut dia, b) = with_box();
        let mut stack = CommandStack::new(10);
        stack.execute(&mut dia, moved(vec![b], 1.0), "a").unwrap();
        stack.undo(&mut dia).unwrap();
        stack.execute(&mut dia, moved(vec![b], 2.0), "b").unwrap();
        assert!(!stack.can_redo());
        assert_eq!(stack.redo(&mut dia).unwrap(), None);
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let (mut dia, b) = with_box();
        let mut stack = CommandStack::new(2);
        for _ in 0..3 {
            stack.execute(&mut dia, moved(vec![b], 1.0), "step").unwrap();
        }
        assert_eq!(stack.undo_len(), 2);
        while stack.undo(&mut dia).unwrap().is_some() {}
        assert_eq!(pos(&dia, b), Point::new(1.0, 0.0));
    }

    #[test]
    fn nested_batches_collapse_into_one_step() {
        let (mut dia, b) = with_box();
        let mut stack = CommandStack::new(10);
        stack.begin_batch();
        stack.execute(&mut dia, moved(vec![b], 1.0), "inner").unwrap();
        stack.begin_batch();
        stack.execute(&mut dia, moved(vec![b], 1.0), "inner").unwrap();
        stack.end_batch("inner batch");
        assert!(!stack.can_undo());
        stack.end_batch("drag");
        assert_eq!(stack.undo_len(), 1);
        assert_eq!(pos(&dia, b), Point::new(2.0, 0.0));

        assert_eq!(stack.undo(&mut dia).unwrap(), Some("drag".to_string()));
        assert_eq!(pos(&dia, b), Point::ZERO);
    }

    #[test]
    fn empty_batch_records_nothing() {
        let mut stack = CommandStack::new(10);
        stack.begin_batch();
        stack.end_batch("nothing");
        stack.end_batch("unbalanced");
        assert!(!stack.can_undo());
    }
}
