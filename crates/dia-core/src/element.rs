//! Base for box-like objects: a corner plus width and height, with the
//! eight compass resize handles as handles 0..8.

use crate::boundingbox::{ElementBBExtras, rectangle_bbox};
use crate::connpoint::{ConnectionPoint, CpFlags, Directions};
use crate::data::{AttributeSet, ObjectNode};
use crate::error::{DiaError, DiaResult};
use crate::geometry::{Point, Rect};
use crate::handle::{Handle, HandleConnectType, HandleId, HandleType};
use crate::id::ObjectId;
use crate::object::ObjectBase;

/// The part of an element a geometry change swaps in and out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry {
    pub corner: Point,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub object: ObjectBase,
    pub corner: Point,
    pub width: f64,
    pub height: f64,
    pub extra_spacing: ElementBBExtras,
}

impl Element {
    /// An element with the eight resize handles first, then
    /// `num_handles - 8` custom handles, and `num_connections`
    /// connection points left for the shape to place.
    #[must_use]
    pub fn new(id: ObjectId, num_handles: usize, num_connections: usize) -> Self {
        let mut object = ObjectBase::new(id);
        for hid in HandleId::RESIZE {
            object.handles.push(Handle::new(
                hid,
                HandleType::MajorControl,
                HandleConnectType::NonConnectable,
            ));
        }
        for i in 8..num_handles {
            object.handles.push(Handle::new(
                HandleId::Custom((i - 7) as u8),
                HandleType::MajorControl,
                HandleConnectType::NonConnectable,
            ));
        }
        object
            .connections
            .resize_with(num_connections, Default::default);
        Element {
            object,
            corner: Point::ZERO,
            width: 1.0,
            height: 1.0,
            extra_spacing: ElementBBExtras::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.corner.x,
            self.corner.y,
            self.corner.x + self.width,
            self.corner.y + self.height,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.corner.x + self.width / 2.0, self.corner.y + self.height / 2.0)
    }

    pub fn geometry(&self) -> ElementGeometry {
        ElementGeometry {
            corner: self.corner,
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_geometry(&mut self, g: ElementGeometry) {
        self.corner = g.corner;
        self.width = g.width;
        self.height = g.height;
    }

    pub fn move_to(&mut self, to: Point) {
        self.corner = to;
    }

    /// Resize by one of the compass handles, keeping the opposite edge
    /// fixed. East and south growth only accepts positive sizes; north
    /// and west moves are ignored once they would pass the far edge.
    pub fn move_handle(&mut self, id: HandleId, to: Point) -> DiaResult<()> {
        let p = to - self.corner;
        let right = self.corner.x + self.width;
        let bottom = self.corner.y + self.height;
        let (west, north, east, south) = match id {
            HandleId::ResizeNw => (true, true, false, false),
            HandleId::ResizeN => (false, true, false, false),
            HandleId::ResizeNe => (false, true, true, false),
            HandleId::ResizeW => (true, false, false, false),
            HandleId::ResizeE => (false, false, true, false),
            HandleId::ResizeSw => (true, false, false, true),
            HandleId::ResizeS => (false, false, false, true),
            HandleId::ResizeSe => (false, false, true, true),
            _ => {
                log::warn!("element {}: move_handle with {id:?}", self.object.id);
                return Err(DiaError::InvalidHandle {
                    object: "element",
                    handle: id,
                });
            }
        };
        if west && to.x < right {
            self.corner.x += p.x;
            self.width -= p.x;
        }
        if north && to.y < bottom {
            self.corner.y += p.y;
            self.height -= p.y;
        }
        if east && p.x > 0.0 {
            self.width = p.x;
        }
        if south && p.y > 0.0 {
            self.height = p.y;
        }
        Ok(())
    }

    /// Resize keeping `width / height == aspect`. The larger of the two
    /// requested dimensions wins; edge handles keep the box centred on
    /// the other axis.
    pub fn move_handle_aspect(&mut self, id: HandleId, to: Point, aspect: f64) -> DiaResult<()> {
        let p = to - self.corner;
        let (w, h) = (self.width, self.height);
        let (mut new_w, mut new_h, move_x, move_y) = match id {
            HandleId::ResizeNw => (w - p.x, h - p.y, 1.0, 1.0),
            HandleId::ResizeN => (0.0, h - p.y, 0.5, 1.0),
            HandleId::ResizeNe => (p.x, h - p.y, 0.0, 1.0),
            HandleId::ResizeW => (w - p.x, 0.0, 1.0, 0.5),
            HandleId::ResizeE => (p.x, 0.0, 0.0, 0.5),
            HandleId::ResizeSw => (w - p.x, p.y, 1.0, 0.0),
            HandleId::ResizeS => (0.0, p.y, 0.5, 0.0),
            HandleId::ResizeSe => (p.x, p.y, 0.0, 0.0),
            _ => {
                log::warn!("element {}: move_handle_aspect with {id:?}", self.object.id);
                return Err(DiaError::InvalidHandle {
                    object: "element",
                    handle: id,
                });
            }
        };
        if new_w > new_h * aspect {
            new_h = new_w / aspect;
        } else {
            new_w = new_h * aspect;
        }
        if new_w < 0.0 || new_h < 0.0 {
            new_w = 0.0;
            new_h = 0.0;
        }
        self.corner.x -= (new_w - w) * move_x;
        self.corner.y -= (new_h - h) * move_y;
        self.width = new_w;
        self.height = new_h;
        Ok(())
    }

    pub fn update_handles(&mut self) {
        let Point { x, y } = self.corner;
        let (w, h) = (self.width, self.height);
        let positions = [
            (x, y),
            (x + w / 2.0, y),
            (x + w, y),
            (x, y + h / 2.0),
            (x + w, y + h / 2.0),
            (x, y + h),
            (x + w / 2.0, y + h),
            (x + w, y + h),
        ];
        for (i, (hid, (px, py))) in HandleId::RESIZE.into_iter().zip(positions).enumerate() {
            let handle = &mut self.object.handles[i];
            handle.id = hid;
            handle.pos = Point::new(px, py);
        }
    }

    pub fn update_boundingbox(&mut self) {
        let bb = rectangle_bbox(&self.rect(), &self.extra_spacing);
        self.object.set_bounding_box(bb);
    }

    /// Place the first nine connection points on the box: corners and
    /// edge midpoints in handle order, then the centre as main point.
    pub fn update_connections_rectangle(&mut self) {
        let Point { x, y } = self.corner;
        let (w, h) = (self.width, self.height);
        let layout = [
            (x, y, Directions::NORTH.union(Directions::WEST)),
            (x + w / 2.0, y, Directions::NORTH),
            (x + w, y, Directions::NORTH.union(Directions::EAST)),
            (x, y + h / 2.0, Directions::WEST),
            (x + w, y + h / 2.0, Directions::EAST),
            (x, y + h, Directions::SOUTH.union(Directions::WEST)),
            (x + w / 2.0, y + h, Directions::SOUTH),
            (x + w, y + h, Directions::SOUTH.union(Directions::EAST)),
            (x + w / 2.0, y + h / 2.0, Directions::ALL),
        ];
        for (cp, (px, py, dirs)) in self.object.connections.iter_mut().zip(layout) {
            cp.pos = Point::new(px, py);
            cp.directions = dirs;
        }
        if let Some(centre) = self.object.connections.get_mut(8) {
            centre.flags = CpFlags::MAIN;
        }
    }

    /// Derive each point's directions from where it sits relative to the
    /// centre. Main points allow every direction.
    pub fn update_connections_directions(&mut self) {
        let c = self.center();
        for cp in &mut self.object.connections {
            cp.directions = directions_from(c, cp);
        }
    }

    #[must_use]
    pub fn copy_unlinked(&self, id: ObjectId) -> Self {
        let mut copy = self.clone();
        copy.object.relabel_unlinked(id);
        copy
    }

    pub fn save(&self, node: &mut ObjectNode) {
        self.object.save(node);
        node.add_point("elem_corner", self.corner);
        node.add_real("elem_width", self.width);
        node.add_real("elem_height", self.height);
    }

    /// Restore from `node`. Missing fields default to `(0,0)`, 1.0, 1.0.
    #[must_use]
    pub fn load(node: &ObjectNode, num_handles: usize, num_connections: usize) -> Self {
        let mut elem = Element::new(node.id, num_handles, num_connections);
        elem.object.load(node);
        elem.corner = node.get_point("elem_corner").unwrap_or(Point::ZERO);
        elem.width = node.get_real("elem_width").unwrap_or(1.0);
        elem.height = node.get_real("elem_height").unwrap_or(1.0);
        elem
    }
}

fn directions_from(centre: Point, cp: &ConnectionPoint) -> Directions {
    if cp.is_main() {
        return Directions::ALL;
    }
    let mut d = Directions::NONE;
    if cp.pos.x > centre.x {
        d = d.union(Directions::EAST);
    } else if cp.pos.x < centre.x {
        d = d.union(Directions::WEST);
    }
    if cp.pos.y > centre.y {
        d = d.union(Directions::SOUTH);
    } else if cp.pos.y < centre.y {
        d = d.union(Directions::NORTH);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn elem(x: f64, y: f64, w: f64, h: f64) -> Element {
        let mut e = Element::new(ObjectId::intern("e"), 8, 9);
        e.corner = Point::new(x, y);
        e.width = w;
        e.height = h;
        e.update_handles();
        e.update_connections_rectangle();
        e.update_boundingbox();
        e
    }

    #[test]
    fn move_is_pure_translation() {
        let mut e = elem(1.0, 2.0, 3.0, 4.0);
        e.move_to(Point::new(-5.0, 7.0));
        assert_eq!(e.corner, Point::new(-5.0, 7.0));
        assert_eq!((e.width, e.height), (3.0, 4.0));
    }

    #[test]
    fn resize_anchors_opposite_edge() {
        let mut e = elem(0.0, 0.0, 4.0, 4.0);
        e.move_handle(HandleId::ResizeNw, Point::new(1.0, -1.0)).unwrap();
        assert_eq!(e.rect(), Rect::new(1.0, -1.0, 4.0, 4.0));

        e.move_handle(HandleId::ResizeSe, Point::new(6.0, 6.0)).unwrap();
        assert_eq!(e.rect(), Rect::new(1.0, -1.0, 6.0, 6.0));
    }

    #[test]
    fn resize_ignores_crossing_moves() {
        let mut e = elem(0.0, 0.0, 2.0, 2.0);
        e.move_handle(HandleId::ResizeW, Point::new(5.0, 1.0)).unwrap();
        assert_eq!(e.rect(), Rect::new(0.0, 0.0, 2.0, 2.0));
        e.move_handle(HandleId::ResizeE, Point::new(-1.0, 1.0)).unwrap();
        assert_eq!(e.width, 2.0);
    }

    #[test]
    fn resize_with_aspect() {
        let mut e = elem(0.0, 0.0, 2.0, 1.0);
        e.move_handle_aspect(HandleId::ResizeSe, Point::new(4.0, 1.0), 2.0).unwrap();
        assert_eq!((e.width, e.height), (4.0, 2.0));
        e.move_handle_aspect(HandleId::ResizeS, Point::new(2.0, 4.0), 2.0).unwrap();
        assert_eq!((e.width, e.height), (8.0, 4.0));
        assert_eq!(e.corner, Point::new(-2.0, 0.0));
    }

    #[test]
    fn non_resize_handle_is_error() {
        let mut e = elem(0.0, 0.0, 1.0, 1.0);
        assert!(e.move_handle(HandleId::MoveEndPoint, Point::ZERO).is_err());
    }

    #[test]
    fn connection_layout() {
        let e = elem(0.0, 0.0, 2.0, 2.0);
        let cps = &e.object.connections;
        assert_eq!(cps[0].pos, Point::new(0.0, 0.0));
        assert_eq!(cps[4].pos, Point::new(2.0, 1.0));
        assert_eq!(cps[8].pos, Point::new(1.0, 1.0));
        assert!(cps[8].is_main());
        assert_eq!(cps[6].directions, Directions::SOUTH);
        assert_eq!(e.object.handles[7].pos, Point::new(2.0, 2.0));
    }

    #[test]
    fn directions_follow_position() {
        let mut e = elem(0.0, 0.0, 2.0, 2.0);
        e.update_connections_directions();
        let cps = &e.object.connections;
        assert_eq!(cps[2].directions, Directions::NORTH.union(Directions::EAST));
        assert_eq!(cps[8].directions, Directions::ALL);
    }

    #[test]
    fn save_load() {
        let e = elem(1.0, 2.0, 3.0, 4.0);
        let mut node = ObjectNode::new("x", 0, e.object.id);
        e.save(&mut node);
        let back = Element::load(&node, 8, 9);
        assert_eq!(back.geometry(), e.geometry());
        assert_eq!(back.object.bounding_box, e.object.bounding_box);

        let empty = Element::load(&ObjectNode::new("x", 0, e.object.id), 8, 9);
        assert_eq!(empty.geometry(), ElementGeometry {
            corner: Point::ZERO,
            width: 1.0,
            height: 1.0
        });
    }
}
