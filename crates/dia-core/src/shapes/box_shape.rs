//! `Standard - Box`: a rectangle with optional fill, rounded corners and
//! an aspect constraint on resize.

use super::{Aspect, DEFAULT_LINE_WIDTH, load_line_style, save_line_style};
use crate::attributes::Attributes;
use crate::color::Color;
use crate::data::{AttributeSet, ObjectNode};
use crate::element::Element;
use crate::error::{DiaError, DiaResult};
use crate::geometry::Point;
use crate::handle::{HandleId, HandleMoveReason, ModifierKeys};
use crate::id::ObjectId;
use crate::object::{Created, DiaObject, ObjectBase, ObjectType};
use crate::renderer::{FillStyle, LineJoin, LineStyle, Renderer};

pub const DEFAULT_WIDTH: f64 = 2.0;
pub const DEFAULT_HEIGHT: f64 = 1.0;

pub static BOX_TYPE: ObjectType = ObjectType {
    name: "Standard - Box",
    version: 0,
    create: box_create,
    load: box_load,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    pub element: Element,
    pub border_width: f64,
    pub border_color: Color,
    pub inner_color: Color,
    pub show_background: bool,
    pub line_style: LineStyle,
    pub dash_length: f64,
    pub corner_radius: f64,
    pub aspect: Aspect,
}

impl BoxShape {
    #[must_use]
    pub fn new(id: ObjectId, corner: Point, attrs: &Attributes) -> Self {
        let mut element = Element::new(id, 8, 9);
        element.corner = corner;
        element.width = DEFAULT_WIDTH;
        element.height = DEFAULT_HEIGHT;
        let mut b = BoxShape {
            element,
            border_width: attrs.line_width,
            border_color: attrs.foreground,
            inner_color: attrs.background,
            show_background: true,
            line_style: attrs.line_style,
            dash_length: attrs.dash_length,
            corner_radius: 0.0,
            aspect: Aspect::Free,
        };
        b.update_data();
        b
    }

    /// Resize through a compass handle while keeping the current ratio.
    /// Edge handles follow the dragged dimension; corners take the
    /// larger of the dragged width and the width the height implies.
    fn move_handle_fixed(&mut self, id: HandleId, to: Point) -> DiaResult<()> {
        let e = &self.element;
        let (w, h) = (e.width, e.height);
        let to_width = to.x - e.corner.x;
        let (new_w, new_h) = match id {
            HandleId::ResizeN | HandleId::ResizeS => {
                let new_h = (to.y - e.corner.y).abs();
                (new_h * w / h, new_h)
            }
            HandleId::ResizeE | HandleId::ResizeW => {
                let new_w = (to.x - e.corner.x).abs();
                (new_w, new_w * h / w)
            }
            _ => {
                let aspect_width = (to.y - e.corner.y) * w / h;
                let new_w = to_width.max(aspect_width);
                (new_w, new_w * h / w)
            }
        };
        let se = Point::new(e.corner.x + new_w, e.corner.y + new_h);
        self.element.move_handle(HandleId::ResizeSe, se)
    }
}

fn box_create(start: Point, attrs: &Attributes, id: ObjectId) -> Created {
    Created {
        object: Box::new(BoxShape::new(id, start, attrs)),
        handle1: None,
        handle2: Some(HandleId::ResizeSe),
    }
}

fn box_load(node: &ObjectNode, _version: u32, _attrs: &Attributes) -> DiaResult<Box<dyn DiaObject>> {
    let (line_style, dash_length) = load_line_style(node);
    let mut b = BoxShape {
        element: Element::load(node, 8, 9),
        border_width: node.get_real("border_width").unwrap_or(DEFAULT_LINE_WIDTH),
        border_color: node.get_color("border_color").unwrap_or(Color::BLACK),
        inner_color: node.get_color("inner_color").unwrap_or(Color::WHITE),
        show_background: node.get_bool("show_background").unwrap_or(true),
        line_style,
        dash_length,
        corner_radius: node.get_real("corner_radius").unwrap_or(0.0).max(0.0),
        aspect: node.get_enum("aspect").map_or(Aspect::Free, Aspect::from_code),
    };
    b.update_data();
    Ok(Box::new(b))
}

impl DiaObject for BoxShape {
    fn object_type(&self) -> &'static ObjectType {
        &BOX_TYPE
    }

    fn base(&self) -> &ObjectBase {
        &self.element.object
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.element.object
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let r = self.element.rect();
        let (ul, lr) = (r.top_left(), r.bottom_right());
        if self.show_background {
            renderer.set_fillstyle(FillStyle::Solid);
            if self.corner_radius > 0.0 {
                renderer.draw_rounded_rect(ul, lr, Some(&self.inner_color), None, self.corner_radius);
            } else {
                renderer.fill_rect(ul, lr, &self.inner_color);
            }
        }
        renderer.set_linewidth(self.border_width);
        renderer.set_linestyle(self.line_style, self.dash_length);
        renderer.set_linejoin(LineJoin::Miter);
        if self.corner_radius > 0.0 {
            renderer.draw_rounded_rect(ul, lr, None, Some(&self.border_color), self.corner_radius);
        } else {
            renderer.draw_rect(ul, lr, None, Some(&self.border_color));
        }
    }

    fn distance_from(&self, p: Point) -> f64 {
        self.element
            .rect()
            .grow(self.border_width / 2.0)
            .distance_to_point(p)
    }

    fn move_to(&mut self, to: Point) {
        self.element.move_to(to);
        self.update_data();
    }

    fn move_handle(
        &mut self,
        handle: HandleId,
        to: Point,
        _reason: HandleMoveReason,
        _modifiers: ModifierKeys,
    ) -> DiaResult<()> {
        if !handle.is_resize() {
            return Err(DiaError::InvalidHandle {
                object: "Standard - Box",
                handle,
            });
        }
        match self.aspect {
            Aspect::Free => self.element.move_handle(handle, to)?,
            Aspect::Fixed | Aspect::Square => self.move_handle_fixed(handle, to)?,
        }
        self.update_data();
        Ok(())
    }

    fn copy(&self, id: ObjectId) -> Box<dyn DiaObject> {
        let mut copy = self.clone();
        copy.element = self.element.copy_unlinked(id);
        Box::new(copy)
    }

    fn save(&self, node: &mut ObjectNode) {
        self.element.save(node);
        if self.border_width != DEFAULT_LINE_WIDTH {
            node.add_real("border_width", self.border_width);
        }
        if self.border_color != Color::BLACK {
            node.add_color("border_color", self.border_color);
        }
        if self.inner_color != Color::WHITE {
            node.add_color("inner_color", self.inner_color);
        }
        node.add_bool("show_background", self.show_background);
        save_line_style(node, self.line_style, self.dash_length);
        if self.corner_radius > 0.0 {
            node.add_real("corner_radius", self.corner_radius);
        }
        if self.aspect != Aspect::Free {
            node.add_enum("aspect", self.aspect.code());
        }
    }

    fn update_data(&mut self) {
        if self.aspect == Aspect::Square {
            let side = self.element.width.min(self.element.height);
            self.element.width = side;
            self.element.height = side;
        }
        self.element.extra_spacing.border_trans = self.border_width / 2.0;
        self.element.update_boundingbox();
        self.element.object.position = self.element.corner;
        self.element.update_handles();
        self.element.update_connections_rectangle();

        // Pull the corner points and handles onto the rounded outline.
        let e = &mut self.element;
        let radius = self.corner_radius.min(e.width / 2.0).min(e.height / 2.0);
        let inset = radius * (1.0 - std::f64::consts::FRAC_1_SQRT_2);
        if inset > 0.0 {
            let offsets = [(0, inset, inset), (2, -inset, inset), (5, inset, -inset), (7, -inset, -inset)];
            for (i, dx, dy) in offsets {
                let d = Point::new(dx, dy);
                e.object.connections[i].pos += d;
                e.object.handles[i].pos += d;
            }
        }
    }

    fn element(&self) -> Option<&Element> {
        Some(&self.element)
    }

    fn element_mut(&mut self) -> Option<&mut Element> {
        Some(&mut self.element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use pretty_assertions::assert_eq;

    fn boxed() -> BoxShape {
        let attrs = Attributes {
            line_width: 0.0,
            ..Attributes::default()
        };
        BoxShape::new(ObjectId::intern("B"), Point::ZERO, &attrs)
    }

    fn drag(b: &mut BoxShape, h: HandleId, to: Point) {
        b.move_handle(h, to, HandleMoveReason::UserMove, ModifierKeys::NONE)
            .unwrap();
    }

    #[test]
    fn created_with_default_size() {
        let b = boxed();
        assert_eq!(b.bounding_box(), Rect::new(0.0, 0.0, 2.0, 1.0));
        assert_eq!(b.connection_points().len(), 9);
        assert_eq!(b.connection_points()[3].pos, Point::new(0.0, 0.5));
        assert!(b.connection_points()[8].is_main());
        assert_eq!(b.handles()[7].pos, Point::new(2.0, 1.0));
    }

    #[test]
    fn free_resize_from_nw() {
        let mut b = boxed();
        drag(&mut b, HandleId::ResizeNw, Point::new(-1.0, -1.0));
        assert_eq!(b.element.rect(), Rect::new(-1.0, -1.0, 2.0, 1.0));
        assert_eq!(b.position(), Point::new(-1.0, -1.0));
    }

    #[test]
    fn fixed_aspect_keeps_ratio() {
        let mut b = boxed();
        b.aspect = Aspect::Fixed;
        drag(&mut b, HandleId::ResizeS, Point::new(1.0, 3.0));
        assert_eq!((b.element.width, b.element.height), (6.0, 3.0));
        drag(&mut b, HandleId::ResizeSe, Point::new(2.0, 4.0));
        assert_eq!((b.element.width, b.element.height), (8.0, 4.0));
    }

    #[test]
    fn square_aspect_takes_min_side() {
        let mut b = boxed();
        b.aspect = Aspect::Square;
        b.update_data();
        assert_eq!((b.element.width, b.element.height), (1.0, 1.0));
    }

    #[test]
    fn rounded_corners_inset_points() {
        let mut b = boxed();
        b.corner_radius = 0.4;
        b.update_data();
        let cp0 = b.connection_points()[0].pos;
        assert!(cp0.x > 0.0 && cp0.y > 0.0);
        assert_eq!(b.connection_points()[1].pos, Point::new(1.0, 0.0));
    }

    #[test]
    fn foreign_handle_is_rejected() {
        let mut b = boxed();
        let err = b.move_handle(HandleId::MoveEndPoint, Point::ZERO, HandleMoveReason::UserMove, ModifierKeys::NONE);
        assert!(matches!(err, Err(DiaError::InvalidHandle { .. })));
        assert_eq!(b.element.rect(), Rect::new(0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn distance_inside_is_zero() {
        let b = boxed();
        assert_eq!(b.distance_from(Point::new(1.0, 0.5)), 0.0);
        assert_eq!(b.distance_from(Point::new(3.0, 0.5)), 1.0);
    }

    #[test]
    fn save_omits_defaults_but_background_flag() {
        let b = boxed();
        let mut node = ObjectNode::new(BOX_TYPE.name, 0, b.id());
        b.save(&mut node);
        assert!(node.has("show_background"));
        assert!(!node.has("border_color"));
        assert!(!node.has("aspect"));
        let back = box_load(&node, 0, &Attributes::default()).unwrap();
        assert_eq!(back.bounding_box(), b.bounding_box());
    }
}
