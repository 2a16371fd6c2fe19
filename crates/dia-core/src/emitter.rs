//! Writer for the `.dia` XML attribute tree, the inverse of `parser`.

use crate::data::{Attribute, DataValue, ObjectNode, format_point, format_real, format_rect};
use crate::error::DiaResult;
use crate::parser::{DiagramDocument, LayerNode};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

pub const DIA_NAMESPACE: &str = "http://www.lysator.liu.se/~alla/dia/";

type XmlWriter = Writer<Vec<u8>>;

/// Serialize a document as indented UTF-8 XML.
pub fn emit_document(doc: &DiagramDocument) -> DiaResult<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(
        BytesStart::new("dia:diagram").with_attributes([("xmlns:dia", DIA_NAMESPACE)]),
    ))?;

    w.write_event(Event::Start(BytesStart::new("dia:diagramdata")))?;
    write_attributes(&mut w, &doc.data.attributes)?;
    w.write_event(Event::End(BytesEnd::new("dia:diagramdata")))?;

    for layer in &doc.layers {
        write_layer(&mut w, layer)?;
    }

    w.write_event(Event::End(BytesEnd::new("dia:diagram")))?;
    Ok(String::from_utf8(w.into_inner())?)
}

fn bool_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

fn write_layer(w: &mut XmlWriter, layer: &LayerNode) -> DiaResult<()> {
    w.write_event(Event::Start(BytesStart::new("dia:layer").with_attributes([
        ("name", layer.name.as_str()),
        ("visible", bool_str(layer.visible)),
        ("active", bool_str(layer.active)),
    ])))?;
    for obj in &layer.objects {
        write_object(w, obj)?;
    }
    w.write_event(Event::End(BytesEnd::new("dia:layer")))?;
    Ok(())
}

fn write_object(w: &mut XmlWriter, obj: &ObjectNode) -> DiaResult<()> {
    let version = obj.version.to_string();
    w.write_event(Event::Start(BytesStart::new("dia:object").with_attributes([
        ("type", obj.type_name.as_str()),
        ("version", version.as_str()),
        ("id", obj.id.as_str()),
    ])))?;
    write_attributes(w, &obj.attributes)?;
    if !obj.connections.is_empty() {
        w.write_event(Event::Start(BytesStart::new("dia:connections")))?;
        for c in &obj.connections {
            let handle = c.handle.to_string();
            let point = c.point.to_string();
            w.write_event(Event::Empty(BytesStart::new("dia:connection").with_attributes([
                ("handle", handle.as_str()),
                ("to", c.to.as_str()),
                ("connection", point.as_str()),
            ])))?;
        }
        w.write_event(Event::End(BytesEnd::new("dia:connections")))?;
    }
    w.write_event(Event::End(BytesEnd::new("dia:object")))?;
    Ok(())
}

fn write_attributes(w: &mut XmlWriter, attrs: &[Attribute]) -> DiaResult<()> {
    for a in attrs {
        let start = BytesStart::new("dia:attribute").with_attributes([("name", a.name.as_str())]);
        if a.values.is_empty() {
            w.write_event(Event::Empty(start))?;
            continue;
        }
        w.write_event(Event::Start(start))?;
        for v in &a.values {
            write_value(w, v)?;
        }
        w.write_event(Event::End(BytesEnd::new("dia:attribute")))?;
    }
    Ok(())
}

fn write_val(w: &mut XmlWriter, tag: &str, val: &str) -> DiaResult<()> {
    w.write_event(Event::Empty(BytesStart::new(tag).with_attributes([("val", val)])))?;
    Ok(())
}

fn write_value(w: &mut XmlWriter, v: &DataValue) -> DiaResult<()> {
    match v {
        DataValue::Int(i) => write_val(w, "dia:int", &i.to_string()),
        DataValue::Real(r) => write_val(w, "dia:real", &format_real(*r)),
        DataValue::Boolean(b) => write_val(w, "dia:boolean", bool_str(*b)),
        DataValue::Enum(e) => write_val(w, "dia:enum", &e.to_string()),
        DataValue::Point(p) => write_val(w, "dia:point", &format_point(*p)),
        DataValue::Rectangle(r) => write_val(w, "dia:rectangle", &format_rect(r)),
        DataValue::Color(c) => write_val(w, "dia:color", &c.to_hex()),
        DataValue::String(s) => {
            w.write_event(Event::Start(BytesStart::new("dia:string")))?;
            w.write_event(Event::Text(BytesText::new(&format!("#{s}#"))))?;
            w.write_event(Event::End(BytesEnd::new("dia:string")))?;
            Ok(())
        }
        DataValue::Font(f) => {
            let style = f.style_bits().to_string();
            let name = f.legacy_name();
            w.write_event(Event::Empty(BytesStart::new("dia:font").with_attributes([
                ("family", f.family_name()),
                ("style", style.as_str()),
                ("name", name.as_str()),
            ])))?;
            Ok(())
        }
        DataValue::Composite(c) => {
            w.write_event(Event::Start(
                BytesStart::new("dia:composite").with_attributes([("type", c.kind.as_str())]),
            ))?;
            write_attributes(w, &c.attributes)?;
            w.write_event(Event::End(BytesEnd::new("dia:composite")))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::data::{AttributeSet, Composite, ConnectionRecord};
    use crate::font::Font;
    use crate::geometry::{Point, Rect};
    use crate::id::ObjectId;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    fn sample() -> DiagramDocument {
        let mut obj = ObjectNode::new("Standard - Box", 0, ObjectId::intern("O7"));
        obj.add_point("elem_corner", Point::new(1.5, -2.0));
        obj.add_rect("obj_bb", Rect::new(0.0, 0.0, 3.0, 4.0));
        obj.add_bool("show_background", false);
        obj.add_enum("aspect", 2);
        let mut text = Composite::new("text");
        text.add_string("string", "x & <y>\n#2");
        text.add_font("font", Font::MONOSPACE);
        text.add_color("color", Color::rgb(1.0, 0.0, 0.0));
        obj.add_composite("text", text);
        obj.connections.push(ConnectionRecord {
            handle: 1,
            to: ObjectId::intern("O2"),
            point: 3,
        });
        let mut data = Composite::new("diagramdata");
        data.add_color("background", Color::WHITE);
        DiagramDocument {
            data,
            layers: vec![LayerNode {
                name: "Background".into(),
                visible: true,
                active: true,
                objects: vec![obj],
            }],
        }
    }

    #[test]
    fn parse_reads_back_what_was_written() {
        let doc = sample();
        let xml = emit_document(&doc).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert_eq!(parse_document(&xml).unwrap(), doc);
    }

    #[test]
    fn strings_are_hash_wrapped_and_escaped() {
        let xml = emit_document(&sample()).unwrap();
        assert!(xml.contains("<dia:string>#x &amp; &lt;y&gt;"));
    }

    #[test]
    fn connections_omitted_when_unlinked() {
        let mut doc = sample();
        doc.layers[0].objects[0].connections.clear();
        let xml = emit_document(&doc).unwrap();
        assert!(!xml.contains("dia:connections"));
    }
}
