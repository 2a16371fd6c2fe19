//! `Standard - Text`: free-standing editable text anchored at one handle.

use crate::attributes::Attributes;
use crate::color::Color;
use crate::connpoint::ConnectionPoint;
use crate::data::{AttributeSet, ObjectNode};
use crate::error::{DiaError, DiaResult};
use crate::font::Font;
use crate::geometry::Point;
use crate::handle::{Handle, HandleConnectType, HandleId, HandleMoveReason, HandleType, ModifierKeys};
use crate::id::ObjectId;
use crate::object::{Created, DiaObject, ObjectBase, ObjectType};
use crate::renderer::{Alignment, Renderer};
use crate::text::Text;

pub static TEXT_TYPE: ObjectType = ObjectType {
    name: "Standard - Text",
    version: 1,
    create: text_create,
    load: text_load,
};

#[derive(Debug, Clone)]
pub struct TextObject {
    object: ObjectBase,
    text: Text,
}

impl TextObject {
    #[must_use]
    pub fn new(id: ObjectId, text: Text) -> Self {
        let mut object = ObjectBase::new(id);
        object.handles.push(Handle::new(
            HandleId::Text,
            HandleType::MajorControl,
            HandleConnectType::Connectable,
        ));
        object.connections.push(ConnectionPoint::main());
        let mut t = TextObject { object, text };
        t.update_data();
        t
    }
}

fn text_create(start: Point, attrs: &Attributes, id: ObjectId) -> Created {
    let text = Text::new(
        "",
        attrs.font,
        attrs.font_height,
        start,
        attrs.foreground,
        attrs.alignment,
    );
    Created {
        object: Box::new(TextObject::new(id, text)),
        handle1: None,
        handle2: Some(HandleId::Text),
    }
}

fn text_load(node: &ObjectNode, _version: u32, _attrs: &Attributes) -> DiaResult<Box<dyn DiaObject>> {
    let text = match node.get_composite("text") {
        Some(c) => Text::load(c),
        None => Text::new(
            "",
            Font::MONOSPACE,
            1.0,
            node.get_point("obj_pos").unwrap_or(Point::ZERO),
            Color::BLACK,
            Alignment::Center,
        ),
    };
    Ok(Box::new(TextObject::new(node.id, text)))
}

impl DiaObject for TextObject {
    fn object_type(&self) -> &'static ObjectType {
        &TEXT_TYPE
    }

    fn base(&self) -> &ObjectBase {
        &self.object
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.object
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.draw_text(&self.text);
    }

    fn distance_from(&self, p: Point) -> f64 {
        self.text.distance_from(p)
    }

    fn move_to(&mut self, to: Point) {
        self.text.set_position(to);
        self.update_data();
    }

    fn move_handle(
        &mut self,
        handle: HandleId,
        to: Point,
        _reason: HandleMoveReason,
        _modifiers: ModifierKeys,
    ) -> DiaResult<()> {
        if handle != HandleId::Text {
            return Err(DiaError::InvalidHandle {
                object: "Standard - Text",
                handle,
            });
        }
        self.text.set_position(to);
        self.update_data();
        Ok(())
    }

    fn copy(&self, id: ObjectId) -> Box<dyn DiaObject> {
        let mut copy = self.clone();
        copy.object.relabel_unlinked(id);
        copy.text.set_focus(false);
        Box::new(copy)
    }

    fn save(&self, node: &mut ObjectNode) {
        self.object.save(node);
        node.add_composite("text", self.text.save());
    }

    fn update_data(&mut self) {
        let anchor = self.text.position;
        self.object.position = anchor;
        let bb = self.text.calc_bounding_box();
        self.object.set_bounding_box(bb);
        self.object.handles[0].pos = anchor;
        self.object.connections[0].pos = anchor;
    }

    fn text(&self) -> Option<&Text> {
        Some(&self.text)
    }

    fn text_mut(&mut self) -> Option<&mut Text> {
        Some(&mut self.text)
    }

    fn select(&mut self, clicked: Point) {
        self.text.set_cursor_at_point(clicked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Key;
    use pretty_assertions::assert_eq;

    fn text_object(s: &str) -> TextObject {
        let text = Text::new(s, Font::SANS, 1.0, Point::new(2.0, 3.0), Color::BLACK, Alignment::Left);
        TextObject::new(ObjectId::intern("T"), text)
    }

    #[test]
    fn anchor_tracks_handle() {
        let mut t = text_object("abc");
        t.move_handle(HandleId::Text, Point::new(5.0, 5.0), HandleMoveReason::UserMove, ModifierKeys::NONE)
            .unwrap();
        assert_eq!(t.position(), Point::new(5.0, 5.0));
        assert_eq!(t.handles()[0].pos, Point::new(5.0, 5.0));
        assert_eq!(t.connection_points()[0].pos, Point::new(5.0, 5.0));
        assert_eq!(t.bounding_box().left, 5.0);
    }

    #[test]
    fn typing_grows_the_box() {
        let mut t = text_object("");
        let before = t.bounding_box();
        let edits = t
            .text_mut()
            .unwrap()
            .key_event(&Key::Text("wide".into()), ModifierKeys::NONE);
        assert_eq!(edits.len(), 4);
        t.update_data();
        assert!(t.bounding_box().width() > before.width());
    }

    #[test]
    fn wrong_handle_is_rejected() {
        let mut t = text_object("x");
        assert!(
            t.move_handle(HandleId::ResizeSe, Point::ZERO, HandleMoveReason::UserMove, ModifierKeys::NONE)
                .is_err()
        );
    }

    #[test]
    fn select_places_cursor() {
        let mut t = text_object("abcd");
        t.select(Point::new(100.0, 3.0));
        assert_eq!(t.text().unwrap().cursor(), (0, 4));
    }

    #[test]
    fn save_and_load() {
        let t = text_object("one\ntwo");
        let mut node = ObjectNode::new(TEXT_TYPE.name, TEXT_TYPE.version, t.id());
        t.save(&mut node);
        let back = text_load(&node, 1, &Attributes::default()).unwrap();
        assert_eq!(back.text().unwrap().get_string(), "one\ntwo");
        assert_eq!(back.position(), Point::new(2.0, 3.0));
    }

    #[test]
    fn missing_text_loads_empty() {
        let node = ObjectNode::new(TEXT_TYPE.name, 1, ObjectId::intern("T9"));
        let back = text_load(&node, 1, &Attributes::default()).unwrap();
        assert_eq!(back.text().unwrap().get_string(), "");
        assert_eq!(back.text().unwrap().font(), Font::MONOSPACE);
    }
}
