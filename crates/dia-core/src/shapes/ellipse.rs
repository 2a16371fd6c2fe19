//! `Standard - Ellipse`: an ellipse inscribed in its element box, with a
//! ninth handle at the centre that drags the whole shape.

use super::{Aspect, DEFAULT_LINE_WIDTH, load_line_style, save_line_style};
use crate::attributes::Attributes;
use crate::color::Color;
use crate::connpoint::{CpFlags, Directions};
use crate::data::{AttributeSet, ObjectNode};
use crate::element::Element;
use crate::error::{DiaError, DiaResult};
use crate::geometry::{Point, distance_ellipse_point};
use crate::handle::{HandleId, HandleMoveReason, ModifierKeys};
use crate::id::ObjectId;
use crate::object::{Created, DiaObject, ObjectBase, ObjectType};
use crate::renderer::{LineStyle, Renderer};
use std::f64::consts::FRAC_1_SQRT_2;

pub const DEFAULT_WIDTH: f64 = 2.0;
pub const DEFAULT_HEIGHT: f64 = 1.0;

/// The centre handle, stored after the eight resize handles.
pub const CENTER_HANDLE: HandleId = HandleId::Custom(1);

pub static ELLIPSE_TYPE: ObjectType = ObjectType {
    name: "Standard - Ellipse",
    version: 0,
    create: ellipse_create,
    load: ellipse_load,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub element: Element,
    pub border_width: f64,
    pub border_color: Color,
    pub inner_color: Color,
    pub show_background: bool,
    pub line_style: LineStyle,
    pub dash_length: f64,
    pub aspect: Aspect,
}

impl Ellipse {
    #[must_use]
    pub fn new(id: ObjectId, corner: Point, attrs: &Attributes) -> Self {
        let mut element = Element::new(id, 9, 9);
        element.corner = corner;
        element.width = DEFAULT_WIDTH;
        element.height = DEFAULT_HEIGHT;
        let mut e = Ellipse {
            element,
            border_width: attrs.line_width,
            border_color: attrs.foreground,
            inner_color: attrs.background,
            show_background: true,
            line_style: attrs.line_style,
            dash_length: attrs.dash_length,
            aspect: Aspect::Free,
        };
        e.update_data();
        e
    }

    /// Free resize: the dragged handle follows the pointer and its
    /// opposite mirrors it through the centre.
    fn move_handle_free(&mut self, id: HandleId, to: Point) -> DiaResult<()> {
        let center = self.element.center();
        self.element.move_handle(id, to)?;
        if let Some(opposite) = id.opposite() {
            self.element.move_handle(opposite, center * 2.0 - to)?;
        }
        Ok(())
    }

    /// Fixed-ratio resize about the centre.
    fn move_handle_fixed(&mut self, id: HandleId, to: Point) -> DiaResult<()> {
        let e = &self.element;
        let center = e.center();
        let (w, h) = (e.width, e.height);
        let (new_w, new_h) = match id {
            HandleId::ResizeN | HandleId::ResizeS => {
                let new_h = 2.0 * (to.y - center.y).abs();
                (new_h * w / h, new_h)
            }
            HandleId::ResizeE | HandleId::ResizeW => {
                let new_w = 2.0 * (to.x - center.x).abs();
                (new_w, new_w * h / w)
            }
            _ => {
                let to_width = 2.0 * (to.x - center.x).abs();
                let aspect_width = 2.0 * (to.y - center.y).abs() * w / h;
                let new_w = to_width.min(aspect_width);
                (new_w, new_w * h / w)
            }
        };
        let half = Point::new(new_w / 2.0, new_h / 2.0);
        self.element.move_handle(HandleId::ResizeNw, center - half)?;
        self.element.move_handle(HandleId::ResizeSe, center + half)
    }
}

fn ellipse_create(start: Point, attrs: &Attributes, id: ObjectId) -> Created {
    Created {
        object: Box::new(Ellipse::new(id, start, attrs)),
        handle1: None,
        handle2: Some(HandleId::ResizeSe),
    }
}

fn ellipse_load(node: &ObjectNode, _version: u32, _attrs: &Attributes) -> DiaResult<Box<dyn DiaObject>> {
    let (line_style, dash_length) = load_line_style(node);
    let mut e = Ellipse {
        element: Element::load(node, 9, 9),
        border_width: node.get_real("border_width").unwrap_or(DEFAULT_LINE_WIDTH),
        border_color: node.get_color("border_color").unwrap_or(Color::BLACK),
        inner_color: node.get_color("inner_color").unwrap_or(Color::WHITE),
        show_background: node.get_bool("show_background").unwrap_or(true),
        line_style,
        dash_length,
        aspect: node.get_enum("aspect").map_or(Aspect::Free, Aspect::from_code),
    };
    e.update_data();
    Ok(Box::new(e))
}

impl DiaObject for Ellipse {
    fn object_type(&self) -> &'static ObjectType {
        &ELLIPSE_TYPE
    }

    fn base(&self) -> &ObjectBase {
        &self.element.object
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.element.object
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let c = self.element.center();
        let (w, h) = (self.element.width, self.element.height);
        if self.show_background {
            renderer.fill_ellipse(c, w, h, &self.inner_color);
        }
        renderer.set_linewidth(self.border_width);
        renderer.set_linestyle(self.line_style, self.dash_length);
        renderer.draw_ellipse(c, w, h, None, Some(&self.border_color));
    }

    fn distance_from(&self, p: Point) -> f64 {
        distance_ellipse_point(
            self.element.center(),
            self.element.width,
            self.element.height,
            self.border_width,
            p,
        )
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
        if handle == CENTER_HANDLE {
            let delta = to - self.element.center();
            self.element.corner += delta;
        } else if !handle.is_resize() {
            return Err(DiaError::InvalidHandle {
                object: "Standard - Ellipse",
                handle,
            });
        } else if self.aspect == Aspect::Free {
            self.move_handle_free(handle, to)?;
        } else {
            self.move_handle_fixed(handle, to)?;
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
        if !self.show_background {
            node.add_bool("show_background", false);
        }
        if self.aspect != Aspect::Free {
            node.add_enum("aspect", self.aspect.code());
        }
        save_line_style(node, self.line_style, self.dash_length);
    }

    fn update_data(&mut self) {
        let e = &mut self.element;
        if self.aspect == Aspect::Square {
            let side = e.width.min(e.height);
            e.width = side;
            e.height = side;
        }
        let c = e.center();
        let (dw, dh) = (e.width / 2.0, e.height / 2.0);
        let (rx, ry) = (dw * FRAC_1_SQRT_2, dh * FRAC_1_SQRT_2);
        let layout = [
            (Point::new(c.x - rx, c.y - ry), Directions::NORTH.union(Directions::WEST)),
            (Point::new(c.x, c.y - dh), Directions::NORTH),
            (Point::new(c.x + rx, c.y - ry), Directions::NORTH.union(Directions::EAST)),
            (Point::new(c.x - dw, c.y), Directions::WEST),
            (Point::new(c.x + dw, c.y), Directions::EAST),
            (Point::new(c.x - rx, c.y + ry), Directions::SOUTH.union(Directions::WEST)),
            (Point::new(c.x, c.y + dh), Directions::SOUTH),
            (Point::new(c.x + rx, c.y + ry), Directions::SOUTH.union(Directions::EAST)),
            (c, Directions::ALL),
        ];
        for (cp, (pos, dirs)) in e.object.connections.iter_mut().zip(layout) {
            cp.pos = pos;
            cp.directions = dirs;
        }
        e.object.connections[8].flags = CpFlags::MAIN;

        e.extra_spacing.border_trans = self.border_width / 2.0;
        e.update_boundingbox();
        e.object.position = e.corner;
        e.update_handles();
        e.object.handles[8].pos = c;
    }

    fn element(&self) -> Option<&Element> {
        Some(&self.element)
    }

    fn element_mut(&mut self) -> Option<&mut Element> {
        Some(&mut self.element)
    }
}
