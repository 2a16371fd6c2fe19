//! Keyboard focus for object text.
//!
//! At most one object's text holds focus. Key events go to it through
//! `Text::key_event`, and the edits land on the command stack.

use crate::commands::CommandStack;
use dia_core::{DiaError, DiaResult, Diagram, Key, ModifierKeys, ObjectChange, ObjectId, Point};

#[derive(Debug, Default)]
pub struct TextFocus {
    focused: Option<ObjectId>,
}

impl TextFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<ObjectId> {
        self.focused
    }

    /// Give `object`'s text the focus, placing the cursor at `click` when
    /// given. Returns false if the object has no text.
    pub fn focus(&mut self, dia: &mut Diagram, object: ObjectId, click: Option<Point>) -> DiaResult<bool> {
        let has_text = dia
            .get(object)
            .ok_or(DiaError::UnknownObject(object))?
            .text()
            .is_some();
        if !has_text {
            return Ok(false);
        }
        if self.focused != Some(object) {
            self.blur(dia)?;
        }
        if let Some(obj) = dia.get_mut(object) {
            if let Some(p) = click {
                obj.select(p);
            }
            if let Some(text) = obj.text_mut() {
                text.set_focus(true);
            }
        }
        dia.update_object(object)?;
        self.focused = Some(object);
        log::debug!("text focus -> {object}");
        Ok(true)
    }

    /// Drop the focus. A focused object that was deleted meanwhile is
    /// forgotten silently.
    pub fn blur(&mut self, dia: &mut Diagram) -> DiaResult<()> {
        let Some(id) = self.focused.take() else {
            return Ok(());
        };
        let Some(text) = dia.get_mut(id).and_then(|o| o.text_mut()) else {
            return Ok(());
        };
        text.set_focus(false);
        dia.update_object(id)
    }

    /// Route a key to the focused text. Returns whether the text changed.
    pub fn key(
        &mut self,
        dia: &mut Diagram,
        stack: &mut CommandStack,
        key: &Key,
        modifiers: ModifierKeys,
    ) -> DiaResult<bool> {
        let Some(id) = self.focused else {
            return Ok(false);
        };
        let Some(text) = dia.get_mut(id).and_then(|o| o.text_mut()) else {
            log::warn!("{id}: focused object is gone");
            self.focused = None;
            return Ok(false);
        };
        let edits = text.key_event(key, modifiers);
        dia.update_object(id)?;
        if edits.is_empty() {
            return Ok(false);
        }
        stack.push(ObjectChange::text(id, edits), "edit text");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dia_core::{Attributes, ObjectRegistry};
    use pretty_assertions::assert_eq;

    fn with_text() -> (Diagram, ObjectId, ObjectId) {
        let reg = ObjectRegistry::with_standard_shapes();
        let attrs = Attributes::default();
        let mut dia = Diagram::new();
        let id = dia.next_id();
        let t = dia
            .add_object(reg.create("Standard - Text", Point::ZERO, &attrs, id).unwrap().object)
            .unwrap();
        let id = dia.next_id();
        let b = dia
            .add_object(reg.create("Standard - Box", Point::new(5.0, 5.0), &attrs, id).unwrap().object)
            .unwrap();
        (dia, t, b)
    }

    fn text(dia: &Diagram, t: ObjectId) -> String {
        dia.get(t).unwrap().text().unwrap().get_string()
    }

    #[test]
    fn typing_is_undoable_per_key() {
        let (mut dia, t, _) = with_text();
        let mut focus = TextFocus::new();
        let mut stack = CommandStack::new(10);
        assert!(focus.focus(&mut dia, t, None).unwrap());

        focus.key(&mut dia, &mut stack, &Key::Text("ab".into()), ModifierKeys::NONE).unwrap();
        focus.key(&mut dia, &mut stack, &Key::Return, ModifierKeys::NONE).unwrap();
        focus.key(&mut dia, &mut stack, &Key::Text("c".into()), ModifierKeys::NONE).unwrap();
        assert_eq!(text(&dia, t), "ab\nc");
        assert_eq!(stack.undo_len(), 3);

        stack.undo(&mut dia).unwrap();
        assert_eq!(text(&dia, t), "ab\n");
        stack.undo(&mut dia).unwrap();
        stack.undo(&mut dia).unwrap();
        assert_eq!(text(&dia, t), "");
    }

    #[test]
    fn cursor_keys_do_not_record() {
        let (mut dia, t, _) = with_text();
        let mut focus = TextFocus::new();
        let mut stack = CommandStack::new(10);
        focus.focus(&mut dia, t, None).unwrap();
        assert!(!focus.key(&mut dia, &mut stack, &Key::Left, ModifierKeys::NONE).unwrap());
        assert!(!stack.can_undo());
    }

    #[test]
    fn objects_without_text_refuse_focus() {
        let (mut dia, t, b) = with_text();
        let mut focus = TextFocus::new();
        focus.focus(&mut dia, t, None).unwrap();
        assert!(!focus.focus(&mut dia, b, None).unwrap());
        assert_eq!(focus.focused(), Some(t));

        focus.blur(&mut dia).unwrap();
        assert_eq!(focus.focused(), None);
        assert!(!dia.get(t).unwrap().text().unwrap().focused());
    }

    #[test]
    fn keys_without_focus_are_ignored() {
        let (mut dia, _, _) = with_text();
        let mut focus = TextFocus::new();
        let mut stack = CommandStack::new(10);
        assert!(!focus.key(&mut dia, &mut stack, &Key::Text("x".into()), ModifierKeys::NONE).unwrap());
    }
}
