//! The editing session: one diagram, its undo history, the pointer
//! controller and the text focus, driven by `InputEvent`s.

use crate::commands::CommandStack;
use crate::config::EditorConfig;
use crate::input::InputEvent;
use crate::text_focus::TextFocus;
use crate::tools::{DragController, DragState};
use dia_core::{Attributes, DiaResult, Diagram, ObjectChange, ObjectId, ObjectRegistry, Point};
use dia_render::find_object_at;

pub struct Editor {
    pub diagram: Diagram,
    /// Attributes new objects are created with.
    pub attributes: Attributes,
    pub commands: CommandStack,
    pub drag: DragController,
    pub text: TextFocus,
    registry: ObjectRegistry,
    config: EditorConfig,
}

impl Editor {
    pub fn new(mut diagram: Diagram, config: EditorConfig) -> Self {
        config.apply_to(&mut diagram);
        Self {
            diagram,
            attributes: Attributes::default(),
            commands: CommandStack::new(config.undo_depth),
            drag: DragController::new(&config),
            text: TextFocus::new(),
            registry: ObjectRegistry::with_standard_shapes(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Keys go to the focused text; pointer events go to the drag
    /// controller. A click that lands on text focuses it.
    pub fn handle_event(&mut self, event: &InputEvent) -> DiaResult<()> {
        match event {
            InputEvent::Key { key, modifiers } => {
                self.text.key(&mut self.diagram, &mut self.commands, key, *modifiers)?;
                Ok(())
            }
            InputEvent::PointerDown { pos, .. } => {
                self.drag.handle(&mut self.diagram, &mut self.commands, event)?;
                self.update_focus(*pos)
            }
            _ => self.drag.handle(&mut self.diagram, &mut self.commands, event),
        }
    }

    fn update_focus(&mut self, pos: Point) -> DiaResult<()> {
        let hit = match self.drag.state() {
            DragState::Handle { object, .. } => Some(object),
            DragState::Move { .. } => find_object_at(&self.diagram, pos, self.config.pick_distance),
            _ => None,
        };
        match hit {
            Some(id) if self.diagram.get(id).is_some_and(|o| o.text().is_some()) => {
                self.text.focus(&mut self.diagram, id, Some(pos))?;
            }
            _ => self.text.blur(&mut self.diagram)?,
        }
        Ok(())
    }

    /// Create an object of type `type_name` at `at` on the active layer
    /// and select it.
    pub fn create_object(&mut self, type_name: &str, at: Point) -> DiaResult<ObjectId> {
        let id = self.diagram.next_id();
        let created = self.registry.create(type_name, at, &self.attributes, id)?;
        let id = self.diagram.add_object(created.object)?;
        self.commands.push(ObjectChange::inserted(id), "create");
        self.drag.select(&[id]);
        Ok(id)
    }

    /// Delete the selected objects as one undo step.
    pub fn delete_selection(&mut self) -> DiaResult<()> {
        if self.drag.selected.is_empty() {
            return Ok(());
        }
        if self.text.focused().is_some_and(|t| self.drag.selected.contains(&t)) {
            self.text.blur(&mut self.diagram)?;
        }
        let mut changes = Vec::new();
        for id in std::mem::take(&mut self.drag.selected) {
            changes.push(ObjectChange::delete(&mut self.diagram, id)?);
        }
        self.commands.push(ObjectChange::list(changes), "delete");
        Ok(())
    }

    pub fn undo(&mut self) -> DiaResult<Option<String>> {
        let desc = self.commands.undo(&mut self.diagram)?;
        self.drag.prune(&self.diagram);
        Ok(desc)
    }

    pub fn redo(&mut self) -> DiaResult<Option<String>> {
        let desc = self.commands.redo(&mut self.diagram)?;
        self.drag.prune(&self.diagram);
        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dia_core::{Key, ModifierKeys};
    use pretty_assertions::assert_eq;

    fn editor() -> Editor {
        Editor::new(Diagram::new(), EditorConfig::default())
    }

    #[test]
    fn create_then_undo_removes_it() {
        let mut ed = editor();
        let b = ed.create_object("Standard - Box", Point::ZERO).unwrap();
        assert!(ed.diagram.contains(b));
        assert_eq!(ed.drag.selected, vec![b]);
        ed.undo().unwrap();
        assert!(!ed.diagram.contains(b));
        assert!(ed.drag.selected.is_empty());
        ed.redo().unwrap();
        assert!(ed.diagram.contains(b));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let mut ed = editor();
        assert!(ed.create_object("Flowchart - Nope", Point::ZERO).is_err());
        assert!(!ed.commands.can_undo());
    }

    #[test]
    fn delete_selection_restores_links_on_undo() {
        let mut ed = editor();
        let b = ed.create_object("Standard - Box", Point::new(4.0, 4.0)).unwrap();
        let l = ed.create_object("Standard - Line", Point::ZERO).unwrap();
        ed.diagram
            .connect(l, 1, dia_core::ConnectionTarget { object: b, point: 3 })
            .unwrap();
        ed.drag.select(&[b, l]);
        ed.delete_selection().unwrap();
        assert!(ed.diagram.is_empty());
        ed.undo().unwrap();
        assert_eq!(ed.diagram.len(), 2);
        assert_eq!(ed.diagram.links().len(), 1);
        assert!(ed.diagram.check_links().is_empty());
    }

    #[test]
    fn click_on_text_focuses_and_typing_edits() {
        let mut ed = editor();
        let t = ed.create_object("Standard - Text", Point::new(1.0, 1.0)).unwrap();
        ed.handle_event(&InputEvent::Key {
            key: Key::Text("hi".into()),
            modifiers: ModifierKeys::NONE,
        })
        .unwrap();
        // not focused yet
        assert_eq!(ed.diagram.get(t).unwrap().text().unwrap().get_string(), "");

        ed.handle_event(&InputEvent::down(1.0, 1.0)).unwrap();
        ed.handle_event(&InputEvent::up(1.0, 1.0)).unwrap();
        assert_eq!(ed.text.focused(), Some(t));
        ed.handle_event(&InputEvent::Key {
            key: Key::Text("hi".into()),
            modifiers: ModifierKeys::NONE,
        })
        .unwrap();
        assert_eq!(ed.diagram.get(t).unwrap().text().unwrap().get_string(), "hi");

        ed.handle_event(&InputEvent::down(20.0, 20.0)).unwrap();
        assert_eq!(ed.text.focused(), None);
    }
}
