//! Pointer interaction on the canvas.
//!
//! The drag controller turns pointer events into diagram edits and the
//! matching `ObjectChange`s for the command stack.
//!
//! ## Gestures
//!
//! | Press on | Drag | Release |
//! |----------|------|---------|
//! | handle of a selected object | `UserMove` to the pointer, snapped to a nearby connection point | `UserMoveFinal`, connect to the snapped point, disconnect when dragged away |
//! | object body | move the selection (**Shift** constrains to the dominant axis) | break links to unselected objects |
//! | empty space | marquee | select objects fully inside |

use crate::commands::CommandStack;
use crate::config::EditorConfig;
use crate::input::InputEvent;
use dia_core::handle::HandleConnectType;
use dia_core::{
    ConnectionTarget, DiaError, DiaResult, Diagram, ElementGeometry, HandleMoveReason, ModifierKeys, ObjectChange,
    ObjectId, Point, Rect,
};
use dia_render::{find_handle_at, find_object_at, objects_in_rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Dragging one handle. `geometry` is the element geometry before the
    /// drag, for objects built on an element.
    Handle {
        object: ObjectId,
        handle: usize,
        from: Point,
        geometry: Option<ElementGeometry>,
        linked: Option<ConnectionTarget>,
    },
    /// Moving the selection; `moved` is the total applied so far.
    Move { last: Point, moved: Point },
    Marquee { start: Point, current: Point },
}

pub struct DragController {
    /// Currently selected objects, in selection order.
    pub selected: Vec<ObjectId>,
    state: DragState,
    snap_distance: f64,
    pick_distance: f64,
}

impl DragController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            selected: Vec::new(),
            state: DragState::Idle,
            snap_distance: config.snap_distance,
            pick_distance: config.pick_distance,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Current marquee rectangle, while one is being dragged.
    pub fn marquee(&self) -> Option<Rect> {
        match self.state {
            DragState::Marquee { start, current } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }

    pub fn select(&mut self, ids: &[ObjectId]) {
        self.selected = ids.to_vec();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Drop ids that no longer name an object (after undo or delete).
    pub fn prune(&mut self, dia: &Diagram) {
        self.selected.retain(|id| dia.contains(*id));
    }

    /// Feed one event. Key events are ignored here.
    pub fn handle(&mut self, dia: &mut Diagram, stack: &mut CommandStack, event: &InputEvent) -> DiaResult<()> {
        match *event {
            InputEvent::PointerDown { pos, modifiers } => self.press(dia, stack, pos, modifiers),
            InputEvent::PointerMove { pos, modifiers } => self.drag(dia, pos, modifiers),
            InputEvent::PointerUp { pos, modifiers } => {
                let batched = matches!(self.state, DragState::Handle { .. } | DragState::Move { .. });
                let result = self.release(dia, stack, pos, modifiers);
                if batched {
                    stack.end_batch("drag");
                }
                self.state = DragState::Idle;
                result
            }
            InputEvent::Key { .. } => Ok(()),
        }
    }

    // ─── Press ───────────────────────────────────────────────────────────

    fn press(&mut self, dia: &Diagram, stack: &mut CommandStack, pos: Point, modifiers: ModifierKeys) -> DiaResult<()> {
        if let Some((object, handle)) = find_handle_at(dia, &self.selected, pos, self.pick_distance) {
            let obj = dia.get(object).ok_or(DiaError::UnknownObject(object))?;
            let h = obj
                .handles()
                .get(handle)
                .ok_or(DiaError::NoSuchHandle { object, index: handle })?;
            self.state = DragState::Handle {
                object,
                handle,
                from: h.pos,
                geometry: obj.element().map(|e| e.geometry()),
                linked: h.connected_to(),
            };
            stack.begin_batch();
            return Ok(());
        }

        if let Some(hit) = find_object_at(dia, pos, self.pick_distance) {
            // Shift+click: toggle object in/out of selection
            if modifiers.shift {
                if let Some(i) = self.selected.iter().position(|id| *id == hit) {
                    self.selected.remove(i);
                } else {
                    self.selected.push(hit);
                }
            } else if !self.selected.contains(&hit) {
                self.selected = vec![hit];
            }
            self.state = DragState::Move {
                last: pos,
                moved: Point::ZERO,
            };
            stack.begin_batch();
        } else {
            // Click on empty space: start marquee
            if !modifiers.shift {
                self.selected.clear();
            }
            self.state = DragState::Marquee {
                start: pos,
                current: pos,
            };
        }
        Ok(())
    }

    // ─── Drag ────────────────────────────────────────────────────────────

    fn drag(&mut self, dia: &mut Diagram, pos: Point, modifiers: ModifierKeys) -> DiaResult<()> {
        match self.state {
            DragState::Idle => Ok(()),
            DragState::Handle { object, handle, .. } => {
                let to = self.snap(dia, object, handle, pos).map_or(pos, |(_, p)| p);
                dia.move_handle(object, handle, to, HandleMoveReason::UserMove, modifiers)?;
                Ok(())
            }
            DragState::Move { last, moved } => {
                let mut delta = pos - last;
                // Shift: constrain to dominant axis
                if modifiers.shift {
                    if delta.x.abs() > delta.y.abs() {
                        delta.y = 0.0;
                    } else {
                        delta.x = 0.0;
                    }
                }
                if !self.selected.is_empty() && delta != Point::ZERO {
                    dia.move_objects(&self.selected, delta)?;
                }
                self.state = DragState::Move {
                    last: pos,
                    moved: moved + delta,
                };
                Ok(())
            }
            DragState::Marquee { start, .. } => {
                self.state = DragState::Marquee { start, current: pos };
                Ok(())
            }
        }
    }

    // ─── Release ─────────────────────────────────────────────────────────

    fn release(
        &mut self,
        dia: &mut Diagram,
        stack: &mut CommandStack,
        pos: Point,
        modifiers: ModifierKeys,
    ) -> DiaResult<()> {
        match self.state {
            DragState::Idle => Ok(()),
            DragState::Handle {
                object,
                handle,
                from,
                geometry,
                linked,
            } => {
                let snapped = self.snap(dia, object, handle, pos);
                let to = snapped.map_or(pos, |(_, p)| p);
                dia.move_handle(object, handle, to, HandleMoveReason::UserMoveFinal, modifiers)?;

                let after = dia
                    .get(object)
                    .ok_or(DiaError::UnknownObject(object))?
                    .element()
                    .map(|e| e.geometry());
                let change = match (geometry, after) {
                    (Some(before), Some(after)) => ObjectChange::ElementGeometry { object, before, after },
                    _ => ObjectChange::MoveHandle {
                        object,
                        handle,
                        from,
                        to,
                    },
                };
                if to != from {
                    stack.push(change, "move handle");
                }

                let target = snapped.map(|(t, _)| t);
                if target != linked {
                    if let Some(old) = linked {
                        dia.disconnect(object, handle)?;
                        stack.push(
                            ObjectChange::Disconnect {
                                object,
                                handle,
                                target: old,
                            },
                            "disconnect",
                        );
                    }
                    if let Some(target) = target {
                        dia.connect(object, handle, target)?;
                        stack.push(ObjectChange::Connect { object, handle, target }, "connect");
                    }
                }
                Ok(())
            }
            DragState::Move { moved, .. } => {
                if moved == Point::ZERO {
                    return Ok(());
                }
                stack.push(
                    ObjectChange::MoveObjects {
                        objects: self.selected.clone(),
                        delta: moved,
                    },
                    "move",
                );
                self.break_links(dia, stack)
            }
            DragState::Marquee { start, .. } => {
                let found = objects_in_rect(dia, &Rect::from_points(start, pos));
                if modifiers.shift {
                    for id in found {
                        if !self.selected.contains(&id) {
                            self.selected.push(id);
                        }
                    }
                } else {
                    self.selected = found;
                }
                Ok(())
            }
        }
    }

    /// Disconnect handles of moved objects bound to objects that stayed
    /// put, except `ConnectableNoBreak` ones.
    fn break_links(&self, dia: &mut Diagram, stack: &mut CommandStack) -> DiaResult<()> {
        let mut broken = Vec::new();
        for &id in &self.selected {
            let Some(obj) = dia.get(id) else { continue };
            for (i, h) in obj.handles().iter().enumerate() {
                if let Some(target) = h.connected_to()
                    && !self.selected.contains(&target.object)
                    && h.connect_type != HandleConnectType::ConnectableNoBreak
                {
                    broken.push((id, i, target));
                }
            }
        }
        for (object, handle, target) in broken {
            dia.disconnect(object, handle)?;
            stack.push(ObjectChange::Disconnect { object, handle, target }, "disconnect");
        }
        Ok(())
    }

    /// Connection point the dragged handle would snap to, and its position.
    fn snap(&self, dia: &Diagram, object: ObjectId, handle: usize, pos: Point) -> Option<(ConnectionTarget, Point)> {
        let h = dia.get(object)?.handles().get(handle)?;
        if !h.is_connectable() {
            return None;
        }
        let (target, _) = dia.find_connection_point(pos, self.snap_distance, Some(object))?;
        let cp = dia.get(target.object)?.connection_points().get(target.point)?;
        Some((target, cp.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dia_core::{Attributes, ObjectRegistry};
    use pretty_assertions::assert_eq;

    fn add(dia: &mut Diagram, kind: &str, at: Point) -> ObjectId {
        let id = dia.next_id();
        let created = ObjectRegistry::with_standard_shapes()
            .create(kind, at, &Attributes::default(), id)
            .unwrap();
        dia.add_object(created.object).unwrap()
    }

    fn setup() -> (Diagram, CommandStack, DragController) {
        (
            Diagram::new(),
            CommandStack::new(50),
            DragController::new(&EditorConfig::default()),
        )
    }

    fn run(ctl: &mut DragController, dia: &mut Diagram, stack: &mut CommandStack, events: &[InputEvent]) {
        for e in events {
            ctl.handle(dia, stack, e).unwrap();
        }
    }

    #[test]
    fn press_alone_does_not_edit() {
        let (mut dia, mut stack, mut ctl) = setup();
        let b = add(&mut dia, "Standard - Box", Point::ZERO);
        run(&mut ctl, &mut dia, &mut stack, &[InputEvent::down(1.0, 0.5), InputEvent::up(1.0, 0.5)]);
        assert_eq!(ctl.selected, vec![b]);
        assert!(!stack.can_undo());
        assert_eq!(ctl.state(), DragState::Idle);
    }

    #[test]
    fn body_drag_is_one_undo_step() {
        let (mut dia, mut stack, mut ctl) = setup();
        let b = add(&mut dia, "Standard - Box", Point::ZERO);
        run(
            &mut ctl,
            &mut dia,
            &mut stack,
            &[
                InputEvent::down(1.0, 0.5),
                InputEvent::drag(2.0, 0.5),
                InputEvent::drag(4.0, 1.5),
                InputEvent::up(4.0, 1.5),
            ],
        );
        assert_eq!(dia.get(b).unwrap().position(), Point::new(3.0, 1.0));
        assert_eq!(stack.undo_len(), 1);
        stack.undo(&mut dia).unwrap();
        assert_eq!(dia.get(b).unwrap().position(), Point::ZERO);
    }

    #[test]
    fn shift_drag_constrains_axis() {
        let (mut dia, mut stack, mut ctl) = setup();
        let b = add(&mut dia, "Standard - Box", Point::ZERO);
        let shift = ModifierKeys {
            shift: true,
            ..ModifierKeys::NONE
        };
        run(
            &mut ctl,
            &mut dia,
            &mut stack,
            &[
                InputEvent::down(1.0, 0.5),
                InputEvent::PointerMove {
                    pos: Point::new(4.0, 1.5),
                    modifiers: shift,
                },
                InputEvent::up(4.0, 1.5),
            ],
        );
        assert_eq!(dia.get(b).unwrap().position(), Point::new(3.0, 0.0));
    }

    #[test]
    fn line_end_snaps_and_connects_on_release() {
        let (mut dia, mut stack, mut ctl) = setup();
        let b = add(&mut dia, "Standard - Box", Point::new(4.0, 4.0));
        let l = add(&mut dia, "Standard - Line", Point::ZERO);
        ctl.select(&[l]);
        let end = dia.get(l).unwrap().handles()[1].pos;
        // box W point sits at (4, 4.5)
        run(
            &mut ctl,
            &mut dia,
            &mut stack,
            &[
                InputEvent::PointerDown {
                    pos: end,
                    modifiers: ModifierKeys::NONE,
                },
                InputEvent::drag(3.8, 4.4),
                InputEvent::up(3.8, 4.4),
            ],
        );
        let h = &dia.get(l).unwrap().handles()[1];
        assert_eq!(h.pos, Point::new(4.0, 4.5));
        assert_eq!(h.connected_to(), Some(ConnectionTarget { object: b, point: 3 }));
        assert_eq!(stack.undo_len(), 1);

        stack.undo(&mut dia).unwrap();
        let h = &dia.get(l).unwrap().handles()[1];
        assert_eq!(h.pos, end);
        assert_eq!(h.connected_to(), None);
        assert!(dia.check_links().is_empty());
    }

    #[test]
    fn dragging_away_disconnects() {
        let (mut dia, mut stack, mut ctl) = setup();
        let b = add(&mut dia, "Standard - Box", Point::new(4.0, 4.0));
        let l = add(&mut dia, "Standard - Line", Point::ZERO);
        let target = ConnectionTarget { object: b, point: 3 };
        dia.connect(l, 1, target).unwrap();
        dia.move_handle(l, 1, Point::new(4.0, 4.5), HandleMoveReason::UserMoveFinal, ModifierKeys::NONE)
            .unwrap();
        ctl.select(&[l]);
        run(
            &mut ctl,
            &mut dia,
            &mut stack,
            &[
                InputEvent::down(4.0, 4.5),
                InputEvent::drag(10.0, 10.0),
                InputEvent::up(10.0, 10.0),
            ],
        );
        assert_eq!(dia.get(l).unwrap().handles()[1].connected_to(), None);
        assert!(dia.links().is_empty());

        stack.undo(&mut dia).unwrap();
        assert_eq!(dia.get(l).unwrap().handles()[1].connected_to(), Some(target));
        assert_eq!(dia.get(l).unwrap().handles()[1].pos, Point::new(4.0, 4.5));
    }

    #[test]
    fn box_resize_records_geometry() {
        let (mut dia, mut stack, mut ctl) = setup();
        let b = add(&mut dia, "Standard - Box", Point::ZERO);
        ctl.select(&[b]);
        // SE handle at (2, 1)
        run(
            &mut ctl,
            &mut dia,
            &mut stack,
            &[InputEvent::down(2.0, 1.0), InputEvent::drag(5.0, 3.0), InputEvent::up(5.0, 3.0)],
        );
        let e = dia.get(b).unwrap().element().unwrap().geometry();
        assert_eq!((e.width, e.height), (5.0, 3.0));
        stack.undo(&mut dia).unwrap();
        let e = dia.get(b).unwrap().element().unwrap().geometry();
        assert_eq!((e.width, e.height), (2.0, 1.0));
    }

    #[test]
    fn moving_a_line_away_breaks_its_link() {
        let (mut dia, mut stack, mut ctl) = setup();
        let b = add(&mut dia, "Standard - Box", Point::new(4.0, 4.0));
        let l = add(&mut dia, "Standard - Line", Point::ZERO);
        dia.connect(l, 1, ConnectionTarget { object: b, point: 3 }).unwrap();
        ctl.select(&[l]);
        // grab the middle of the line, away from both handles
        let mid = {
            let hs = dia.get(l).unwrap().handles();
            Point::new((hs[0].pos.x + hs[1].pos.x) / 2.0, (hs[0].pos.y + hs[1].pos.y) / 2.0)
        };
        run(
            &mut ctl,
            &mut dia,
            &mut stack,
            &[
                InputEvent::PointerDown {
                    pos: mid,
                    modifiers: ModifierKeys::NONE,
                },
                InputEvent::PointerMove {
                    pos: mid + Point::new(0.0, 2.0),
                    modifiers: ModifierKeys::NONE,
                },
                InputEvent::PointerUp {
                    pos: mid + Point::new(0.0, 2.0),
                    modifiers: ModifierKeys::NONE,
                },
            ],
        );
        assert!(dia.links().is_empty());
        stack.undo(&mut dia).unwrap();
        assert_eq!(dia.links().len(), 1);
    }

    #[test]
    fn marquee_selects_contained_objects() {
        let (mut dia, mut stack, mut ctl) = setup();
        let a = add(&mut dia, "Standard - Box", Point::ZERO);
        let _b = add(&mut dia, "Standard - Box", Point::new(10.0, 10.0));
        run(&mut ctl, &mut dia, &mut stack, &[InputEvent::down(-1.0, -1.0), InputEvent::drag(3.0, 2.0)]);
        assert_eq!(ctl.marquee(), Some(Rect::new(-1.0, -1.0, 3.0, 2.0)));
        run(&mut ctl, &mut dia, &mut stack, &[InputEvent::up(3.0, 2.0)]);
        assert_eq!(ctl.selected, vec![a]);
        assert_eq!(ctl.marquee(), None);
        assert!(!stack.in_batch());
    }
}
