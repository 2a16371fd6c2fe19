//! `Standard - Line`: a straight connection with optional arrow heads
//! and connection points spread evenly along it.

use super::{DEFAULT_LINE_WIDTH, load_arrow, load_line_style, save_arrow, save_line_style};
use crate::arrows::Arrow;
use crate::attributes::Attributes;
use crate::color::Color;
use crate::connection::Connection;
use crate::connpoint::Directions;
use crate::data::{AttributeSet, ObjectNode};
use crate::error::DiaResult;
use crate::geometry::{Point, distance_line_point};
use crate::handle::{HandleId, HandleMoveReason, ModifierKeys};
use crate::id::ObjectId;
use crate::object::{Created, DiaObject, ObjectBase, ObjectType};
use crate::renderer::{LineCaps, LineStyle, Renderer};

pub static LINE_TYPE: ObjectType = ObjectType {
    name: "Standard - Line",
    version: 0,
    create: line_create,
    load: line_load,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub connection: Connection,
    pub line_color: Color,
    pub line_width: f64,
    pub line_style: LineStyle,
    pub dash_length: f64,
    pub start_arrow: Arrow,
    pub end_arrow: Arrow,
}

impl Line {
    /// A line from `start` to `end` styled by `attrs`, with one
    /// connection point at its middle.
    #[must_use]
    pub fn new(id: ObjectId, start: Point, end: Point, attrs: &Attributes) -> Self {
        let mut line = Line {
            connection: Connection::with_endpoints(id, [start, end], 1),
            line_color: attrs.foreground,
            line_width: attrs.line_width,
            line_style: attrs.line_style,
            dash_length: attrs.dash_length,
            start_arrow: attrs.start_arrow,
            end_arrow: attrs.end_arrow,
        };
        line.update_data();
        line
    }

    pub fn endpoints(&self) -> [Point; 2] {
        self.connection.endpoints
    }

    /// Spread the connection points over the line at `i/(n+1)`.
    fn place_connection_points(&mut self) {
        let [a, b] = self.connection.endpoints;
        let d = b - a;
        let dirs = if d.x.abs() > d.y.abs() {
            Directions::NORTH.union(Directions::SOUTH)
        } else {
            Directions::EAST.union(Directions::WEST)
        };
        let n = self.connection.object.connections.len();
        for (i, cp) in self.connection.object.connections.iter_mut().enumerate() {
            cp.pos = a + d * ((i + 1) as f64 / (n + 1) as f64);
            cp.directions = dirs;
        }
    }
}

fn line_create(start: Point, attrs: &Attributes, id: ObjectId) -> Created {
    let end = start + Point::new(1.0, 1.0);
    Created {
        object: Box::new(Line::new(id, start, end, attrs)),
        handle1: Some(HandleId::MoveStartPoint),
        handle2: Some(HandleId::MoveEndPoint),
    }
}

/// Upper bound on the `numcp` a loaded line may ask for.
const MAX_CONNECTION_POINTS: i64 = 256;

fn line_load(node: &ObjectNode, _version: u32, _attrs: &Attributes) -> DiaResult<Box<dyn DiaObject>> {
    let num_cp = match node.get_int("numcp") {
        None => 1,
        Some(n) if (0..=MAX_CONNECTION_POINTS).contains(&n) => n as usize,
        Some(n) => {
            log::warn!("line {}: numcp {n} out of range, using 1", node.id);
            1
        }
    };
    let connection = Connection::load(node, 2, num_cp)?;
    let (line_style, dash_length) = load_line_style(node);
    let mut line = Line {
        connection,
        line_color: node.get_color("line_color").unwrap_or(Color::BLACK),
        line_width: node.get_real("line_width").unwrap_or(DEFAULT_LINE_WIDTH),
        line_style,
        dash_length,
        start_arrow: load_arrow(node, "start_arrow"),
        end_arrow: load_arrow(node, "end_arrow"),
    };
    line.update_data();
    Ok(Box::new(line))
}

impl DiaObject for Line {
    fn object_type(&self) -> &'static ObjectType {
        &LINE_TYPE
    }

    fn base(&self) -> &ObjectBase {
        &self.connection.object
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.connection.object
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let [a, b] = self.connection.endpoints;
        renderer.set_linewidth(self.line_width);
        renderer.set_linestyle(self.line_style, self.dash_length);
        renderer.set_linecaps(LineCaps::Butt);
        renderer.draw_line_with_arrows(
            a,
            b,
            self.line_width,
            &self.line_color,
            Some(&self.start_arrow),
            Some(&self.end_arrow),
        );
    }

    fn distance_from(&self, p: Point) -> f64 {
        let [a, b] = self.connection.endpoints;
        distance_line_point(a, b, self.line_width, p)
    }

    fn move_to(&mut self, to: Point) {
        self.connection.move_to(to);
        self.update_data();
    }

    fn move_handle(
        &mut self,
        handle: HandleId,
        to: Point,
        reason: HandleMoveReason,
        _modifiers: ModifierKeys,
    ) -> DiaResult<()> {
        self.connection.move_handle(handle, to, reason)?;
        self.update_data();
        Ok(())
    }

    fn copy(&self, id: ObjectId) -> Box<dyn DiaObject> {
        let mut copy = self.clone();
        copy.connection = self.connection.copy_unlinked(id);
        Box::new(copy)
    }

    fn save(&self, node: &mut ObjectNode) {
        self.connection.save(node);
        node.add_int("numcp", self.connection.object.connections.len() as i64);
        if self.line_color != Color::BLACK {
            node.add_color("line_color", self.line_color);
        }
        if self.line_width != DEFAULT_LINE_WIDTH {
            node.add_real("line_width", self.line_width);
        }
        save_line_style(node, self.line_style, self.dash_length);
        save_arrow(node, "start_arrow", &self.start_arrow);
        save_arrow(node, "end_arrow", &self.end_arrow);
    }

    fn update_data(&mut self) {
        let half = self.line_width / 2.0;
        let extra = &mut self.connection.extra_spacing;
        extra.start_long = half;
        extra.end_long = half;
        extra.start_trans = if self.start_arrow.is_visible() {
            half.max(self.start_arrow.width)
        } else {
            half
        };
        extra.end_trans = if self.end_arrow.is_visible() {
            half.max(self.end_arrow.width)
        } else {
            half
        };
        self.connection.update_boundingbox();
        self.connection.object.position = self.connection.endpoints[0];
        self.place_connection_points();
        self.connection.update_handles();
    }

    fn connection(&self) -> Option<&Connection> {
        Some(&self.connection)
    }

    fn select(&mut self, _clicked: Point) {
        self.connection.update_handles();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrows::ArrowType;
    use crate::geometry::Rect;
    use pretty_assertions::assert_eq;

    fn line() -> Line {
        let attrs = Attributes {
            line_width: 0.0,
            ..Attributes::default()
        };
        Line::new(ObjectId::intern("L"), Point::ZERO, Point::new(10.0, 0.0), &attrs)
    }

    #[test]
    fn end_handle_drag_updates_box() {
        let mut l = line();
        l.move_handle(
            HandleId::MoveEndPoint,
            Point::new(10.0, 5.0),
            HandleMoveReason::UserMove,
            ModifierKeys::NONE,
        )
        .unwrap();
        assert_eq!(l.endpoints()[1], Point::new(10.0, 5.0));
        assert_eq!(l.bounding_box(), Rect::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(l.handles()[1].pos, Point::new(10.0, 5.0));
    }

    #[test]
    fn handles_mirror_endpoints_after_any_move() {
        let mut l = line();
        l.move_to(Point::new(3.0, 3.0));
        l.move_handle(HandleId::MoveStartPoint, Point::new(-1.0, 2.0), HandleMoveReason::UserMoveFinal, ModifierKeys::NONE)
            .unwrap();
        l.move_to(Point::new(0.5, 0.5));
        for i in 0..2 {
            assert_eq!(l.handles()[i].pos, l.endpoints()[i]);
        }
        assert_eq!(l.position(), l.endpoints()[0]);
    }

    #[test]
    fn midpoint_connection() {
        let l = line();
        assert_eq!(l.connection_points()[0].pos, Point::new(5.0, 0.0));
    }

    #[test]
    fn distance_is_to_the_segment() {
        let l = line();
        assert_eq!(l.distance_from(Point::new(5.0, 2.0)), 2.0);
        assert_eq!(l.distance_from(Point::new(12.0, 0.0)), 2.0);
    }

    #[test]
    fn arrow_widens_box() {
        let mut l = line();
        l.end_arrow = Arrow::new(ArrowType::FilledTriangle, 0.5, 0.5);
        l.update_data();
        assert!(l.bounding_box().bottom >= 0.5);
    }

    #[test]
    fn copy_has_no_links() {
        let l = line();
        let c = l.copy(ObjectId::intern("L2"));
        assert_eq!(c.id().as_str(), "L2");
        assert!(c.handles().iter().all(|h| h.connected_to().is_none()));
    }

    #[test]
    fn save_load_roundtrip() {
        let mut l = line();
        l.line_color = Color::rgb(1.0, 0.0, 0.0);
        l.line_style = LineStyle::Dotted;
        l.start_arrow = Arrow::new(ArrowType::HollowDiamond, 0.6, 0.4);
        l.update_data();
        let mut node = ObjectNode::new(LINE_TYPE.name, LINE_TYPE.version, l.id());
        l.save(&mut node);
        let back = line_load(&node, 0, &Attributes::default()).unwrap();
        let mut again = ObjectNode::new(LINE_TYPE.name, LINE_TYPE.version, back.id());
        back.save(&mut again);
        assert_eq!(node, again);
    }
}
