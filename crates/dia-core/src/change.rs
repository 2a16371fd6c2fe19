//! Reversible edits consumed by an undo stack.
//!
//! A change is built after its edit has been carried out, so a fresh
//! change is in the applied state: `revert` undoes it and `apply` redoes
//! it. Objects are named by id, never by reference, so a change stays
//! valid across a delete and re-insert of the object it touches.

use crate::diagram::{Diagram, Removed};
use crate::element::ElementGeometry;
use crate::error::{DiaError, DiaResult};
use crate::geometry::Point;
use crate::handle::{ConnectionTarget, HandleMoveReason, ModifierKeys};
use crate::id::ObjectId;
use crate::text::TextChange;

#[derive(Debug)]
pub enum ObjectChange {
    MoveObjects {
        objects: Vec<ObjectId>,
        delta: Point,
    },
    MoveHandle {
        object: ObjectId,
        handle: usize,
        from: Point,
        to: Point,
    },
    Connect {
        object: ObjectId,
        handle: usize,
        target: ConnectionTarget,
    },
    Disconnect {
        object: ObjectId,
        handle: usize,
        target: ConnectionTarget,
    },
    Text {
        object: ObjectId,
        change: TextChange,
    },
    ElementGeometry {
        object: ObjectId,
        before: ElementGeometry,
        after: ElementGeometry,
    },
    /// The object is in the diagram while applied; `removed` holds it
    /// while reverted.
    Insert {
        object: ObjectId,
        removed: Option<Removed>,
    },
    /// The object is out of the diagram, held in `removed`, while applied.
    Delete {
        object: ObjectId,
        removed: Option<Removed>,
    },
    List(Vec<ObjectChange>),
}

impl ObjectChange {
    /// Record an object that has just been added.
    #[must_use]
    pub fn inserted(object: ObjectId) -> Self {
        ObjectChange::Insert { object, removed: None }
    }

    /// Remove `object` from `dia` and record the removal.
    pub fn delete(dia: &mut Diagram, object: ObjectId) -> DiaResult<Self> {
        let removed = dia.remove_object(object)?;
        Ok(ObjectChange::Delete {
            object,
            removed: Some(removed),
        })
    }

    /// Wrap several changes, collapsing the trivial cases.
    #[must_use]
    pub fn list(mut changes: Vec<ObjectChange>) -> Self {
        if changes.len() == 1 {
            if let Some(only) = changes.pop() {
                return only;
            }
        }
        ObjectChange::List(changes)
    }

    /// Wrap text edits made to `object`'s text.
    #[must_use]
    pub fn text(object: ObjectId, edits: Vec<TextChange>) -> Self {
        Self::list(
            edits
                .into_iter()
                .map(|change| ObjectChange::Text { object, change })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ObjectChange::List(v) if v.iter().all(ObjectChange::is_empty))
    }

    /// Objects this change touches, for redraw.
    pub fn objects(&self) -> Vec<ObjectId> {
        match self {
            ObjectChange::MoveObjects { objects, .. } => objects.clone(),
            ObjectChange::MoveHandle { object, .. }
            | ObjectChange::Connect { object, .. }
            | ObjectChange::Disconnect { object, .. }
            | ObjectChange::Text { object, .. }
            | ObjectChange::ElementGeometry { object, .. }
            | ObjectChange::Insert { object, .. }
            | ObjectChange::Delete { object, .. } => vec![*object],
            ObjectChange::List(v) => v.iter().flat_map(ObjectChange::objects).collect(),
        }
    }

    pub fn apply(&mut self, dia: &mut Diagram) -> DiaResult<()> {
        match self {
            ObjectChange::MoveObjects { objects, delta } => dia.move_objects(objects, *delta),
            ObjectChange::MoveHandle { object, handle, to, .. } => {
                dia.move_handle(*object, *handle, *to, HandleMoveReason::UserMoveFinal, ModifierKeys::NONE)
                    .map(|_| ())
            }
            ObjectChange::Connect { object, handle, target } => dia.connect(*object, *handle, *target),
            ObjectChange::Disconnect { object, handle, .. } => dia.disconnect(*object, *handle).map(|_| ()),
            ObjectChange::Text { object, change } => edit_text(dia, *object, |t| change.apply(t)),
            ObjectChange::ElementGeometry { object, after, .. } => set_geometry(dia, *object, *after),
            ObjectChange::Insert { removed, .. } => restore(dia, removed),
            ObjectChange::Delete { object, removed } => {
                *removed = Some(dia.remove_object(*object)?);
                Ok(())
            }
            ObjectChange::List(changes) => changes.iter_mut().try_for_each(|c| c.apply(dia)),
        }
    }

    pub fn revert(&mut self, dia: &mut Diagram) -> DiaResult<()> {
        match self {
            ObjectChange::MoveObjects { objects, delta } => dia.move_objects(objects, -*delta),
            ObjectChange::MoveHandle { object, handle, from, .. } => {
                dia.move_handle(*object, *handle, *from, HandleMoveReason::UserMoveFinal, ModifierKeys::NONE)
                    .map(|_| ())
            }
            ObjectChange::Connect { object, handle, .. } => dia.disconnect(*object, *handle).map(|_| ()),
            ObjectChange::Disconnect { object, handle, target } => dia.connect(*object, *handle, *target),
            ObjectChange::Text { object, change } => edit_text(dia, *object, |t| change.revert(t)),
            ObjectChange::ElementGeometry { object, before, .. } => set_geometry(dia, *object, *before),
            ObjectChange::Insert { object, removed } => {
                *removed = Some(dia.remove_object(*object)?);
                Ok(())
            }
            ObjectChange::Delete { removed, .. } => restore(dia, removed),
            ObjectChange::List(changes) => changes.iter_mut().rev().try_for_each(|c| c.revert(dia)),
        }
    }
}

fn restore(dia: &mut Diagram, removed: &mut Option<Removed>) -> DiaResult<()> {
    match removed.take() {
        Some(r) => dia.restore(r).map(|_| ()),
        None => {
            log::warn!("insert/delete change replayed out of order");
            Ok(())
        }
    }
}

fn edit_text(dia: &mut Diagram, object: ObjectId, f: impl FnOnce(&mut crate::text::Text)) -> DiaResult<()> {
    let text = dia
        .get_mut(object)
        .ok_or(DiaError::UnknownObject(object))?
        .text_mut()
        .ok_or_else(|| DiaError::malformed("text change", format!("{object} has no text")))?;
    f(text);
    dia.update_object(object)
}

fn set_geometry(dia: &mut Diagram, object: ObjectId, g: ElementGeometry) -> DiaResult<()> {
    let elem = dia
        .get_mut(object)
        .ok_or(DiaError::UnknownObject(object))?
        .element_mut()
        .ok_or_else(|| DiaError::malformed("element change", format!("{object} is not an element")))?;
    elem.set_geometry(g);
    dia.update_object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::object::ObjectRegistry;
    use crate::text::Key;
    use pretty_assertions::assert_eq;

    fn add(dia: &mut Diagram, kind: &str, at: Point) -> ObjectId {
        let id = dia.next_id();
        let created = ObjectRegistry::with_standard_shapes()
            .create(kind, at, &Attributes::default(), id)
            .unwrap();
        dia.add_object(created.object).unwrap()
    }

    #[test]
    fn move_objects_roundtrip() {
        let mut dia = Diagram::new();
        let b = add(&mut dia, "Standard - Box", Point::ZERO);
        dia.move_objects(&[b], Point::new(3.0, 4.0)).unwrap();
        let mut change = ObjectChange::MoveObjects {
            objects: vec![b],
            delta: Point::new(3.0, 4.0),
        };
        change.revert(&mut dia).unwrap();
        assert_eq!(dia.get(b).unwrap().position(), Point::ZERO);
        change.apply(&mut dia).unwrap();
        assert_eq!(dia.get(b).unwrap().position(), Point::new(3.0, 4.0));
    }

    #[test]
    fn delete_and_undo_restores_links() {
        let mut dia = Diagram::new();
        let b = add(&mut dia, "Standard - Box", Point::new(5.0, 5.0));
        let l = add(&mut dia, "Standard - Line", Point::ZERO);
        dia.connect(l, 1, ConnectionTarget { object: b, point: 8 }).unwrap();

        let mut change = ObjectChange::delete(&mut dia, b).unwrap();
        assert!(!dia.contains(b));
        assert_eq!(dia.get(l).unwrap().handles()[1].connected_to(), None);

        change.revert(&mut dia).unwrap();
        assert_eq!(
            dia.get(l).unwrap().handles()[1].connected_to(),
            Some(ConnectionTarget { object: b, point: 8 })
        );
        assert_eq!(dia.layer_of(b), Some(0));
        assert_eq!(dia.layers()[0].objects()[0], b);

        change.apply(&mut dia).unwrap();
        assert!(!dia.contains(b));
    }

    #[test]
    fn insert_undo_redo() {
        let mut dia = Diagram::new();
        let b = add(&mut dia, "Standard - Box", Point::ZERO);
        let mut change = ObjectChange::inserted(b);
        change.revert(&mut dia).unwrap();
        assert!(dia.is_empty());
        change.apply(&mut dia).unwrap();
        assert!(dia.contains(b));
    }

    #[test]
    fn text_change_reverts() {
        let mut dia = Diagram::new();
        let t = add(&mut dia, "Standard - Text", Point::ZERO);
        let edits = dia
            .get_mut(t)
            .unwrap()
            .text_mut()
            .unwrap()
            .key_event(&Key::Text("hi".into()), ModifierKeys::NONE);
        dia.update_object(t).unwrap();
        let mut change = ObjectChange::text(t, edits);
        assert!(matches!(change, ObjectChange::List(ref v) if v.len() == 2));
        change.revert(&mut dia).unwrap();
        assert_eq!(dia.get(t).unwrap().text().unwrap().get_string(), "");
        change.apply(&mut dia).unwrap();
        assert_eq!(dia.get(t).unwrap().text().unwrap().get_string(), "hi");
    }

    #[test]
    fn element_geometry_swaps() {
        let mut dia = Diagram::new();
        let b = add(&mut dia, "Standard - Box", Point::ZERO);
        let before = dia.get(b).unwrap().element().unwrap().geometry();
        dia.move_handle(b, 7, Point::new(6.0, 6.0), HandleMoveReason::UserMoveFinal, ModifierKeys::NONE)
            .unwrap();
        let after = dia.get(b).unwrap().element().unwrap().geometry();
        let mut change = ObjectChange::ElementGeometry { object: b, before, after };
        change.revert(&mut dia).unwrap();
        assert_eq!(dia.get(b).unwrap().element().unwrap().geometry(), before);
        assert_eq!(dia.get(b).unwrap().handles()[7].pos, Point::new(before.width, before.height));
        change.apply(&mut dia).unwrap();
        assert_eq!(dia.get(b).unwrap().element().unwrap().geometry(), after);
    }
}
