//! Reader for the `.dia` XML attribute tree.
//!
//! Produces a [`DiagramDocument`] of plain data nodes; turning those into
//! live objects (and resolving links) is `file`'s job. Namespace
//! prefixes are ignored, so `dia:object` and `object` read the same.
//!
//! ```text
//! <dia:diagram>
//!   <dia:diagramdata> attributes </dia:diagramdata>
//!   <dia:layer name visible active>
//!     <dia:object type version id>
//!       <dia:attribute name> data... </dia:attribute>
//!       <dia:connections><dia:connection handle to connection/></dia:connections>
//!     </dia:object>
//!   </dia:layer>
//! </dia:diagram>
//! ```

use crate::data::{
    Attribute, Composite, ConnectionRecord, DataValue, ObjectNode, parse_bool, parse_color, parse_int, parse_point,
    parse_real, parse_rect,
};
use crate::error::{DiaError, DiaResult};
use crate::font::Font;
use crate::id::ObjectId;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

// ─── Document model ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagramDocument {
    /// Diagram-wide settings (`background`, ...), kind `diagramdata`.
    pub data: Composite,
    pub layers: Vec<LayerNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub name: String,
    pub visible: bool,
    pub active: bool,
    pub objects: Vec<ObjectNode>,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Parse a whole document. Data errors inside one object are logged and
/// drop only that attribute or link; XML syntax errors fail the parse.
pub fn parse_document(xml: &str) -> DiaResult<DiagramDocument> {
    let root = read_tree(xml)?;
    if root.name != "diagram" {
        return Err(DiaError::NotADiagram);
    }
    let mut doc = DiagramDocument {
        data: Composite::new("diagramdata"),
        layers: Vec::new(),
    };
    for child in &root.children {
        match child.name.as_str() {
            "diagramdata" => doc.data.attributes = read_attributes(child),
            "layer" => doc.layers.push(read_layer(child)),
            other => log::debug!("skipping <{other}> in diagram"),
        }
    }
    Ok(doc)
}

// ─── Generic tree ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct XmlElement {
    /// Local name, prefix stripped.
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn require(&self, element: &'static str, key: &'static str) -> DiaResult<&str> {
        self.attr(key).ok_or(DiaError::MissingAttribute {
            element,
            attribute: key,
        })
    }
}

fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    match name.rfind(':') {
        Some(i) => name[i + 1..].to_string(),
        None => name.into_owned(),
    }
}

fn open_element(e: &BytesStart<'_>) -> DiaResult<XmlElement> {
    let mut el = XmlElement {
        name: local_name(e.name().as_ref()),
        ..XmlElement::default()
    };
    for attr in e.attributes() {
        let attr = attr?;
        let key = local_name(attr.key.as_ref());
        el.attrs.push((key, attr.unescape_value()?.into_owned()));
    }
    Ok(el)
}

fn read_tree(xml: &str) -> DiaResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<XmlElement> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let el = open_element(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(el),
                    None => return Ok(el),
                }
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8(c.into_inner().into_owned())?);
                }
            }
            Event::End(_) => {
                let Some(done) = stack.pop() else {
                    return Err(DiaError::malformed("xml", "unbalanced end tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => return Ok(done),
                }
            }
            Event::Eof => return Err(DiaError::malformed("xml", "document ended before the root closed")),
            _ => {}
        }
    }
}

// ─── Structure ───────────────────────────────────────────────────────────

fn read_layer(el: &XmlElement) -> LayerNode {
    let flag = |key: &str, default: bool| el.attr(key).map_or(default, |v| v == "true");
    let mut layer = LayerNode {
        name: el.attr("name").unwrap_or("Background").to_string(),
        visible: flag("visible", true),
        active: flag("active", false),
        objects: Vec::new(),
    };
    for child in el.children.iter().filter(|c| c.name == "object") {
        match read_object(child) {
            Ok(node) => layer.objects.push(node),
            Err(e) => log::warn!("layer {}: skipping object: {e}", layer.name),
        }
    }
    layer
}

fn read_object(el: &XmlElement) -> DiaResult<ObjectNode> {
    let type_name = el.require("object", "type")?;
    let id = ObjectId::intern(el.require("object", "id")?);
    let version = match el.attr("version") {
        Some(v) => u32::try_from(parse_int(v)?).map_err(|e| DiaError::malformed("version", e.to_string()))?,
        None => 0,
    };
    let mut node = ObjectNode::new(type_name, version, id);
    node.attributes = read_attributes(el);
    for conns in el.children.iter().filter(|c| c.name == "connections") {
        for c in conns.children.iter().filter(|c| c.name == "connection") {
            match read_connection(c) {
                Ok(rec) => node.connections.push(rec),
                Err(e) => log::warn!("{id}: skipping connection: {e}"),
            }
        }
    }
    Ok(node)
}

fn read_connection(el: &XmlElement) -> DiaResult<ConnectionRecord> {
    let index = |key: &'static str| -> DiaResult<usize> {
        let v = parse_int(el.require("connection", key)?)?;
        usize::try_from(v).map_err(|e| DiaError::malformed("connection", format!("{key}={v}: {e}")))
    };
    Ok(ConnectionRecord {
        handle: index("handle")?,
        to: ObjectId::intern(el.require("connection", "to")?),
        point: index("connection")?,
    })
}

/// `<attribute name>` children of `el`. An attribute whose data does not
/// parse is dropped with a warning; the object then loads its default.
fn read_attributes(el: &XmlElement) -> Vec<Attribute> {
    let mut out = Vec::new();
    for a in el.children.iter().filter(|c| c.name == "attribute") {
        let Some(name) = a.attr("name") else {
            log::warn!("<attribute> without a name");
            continue;
        };
        let mut values = Vec::with_capacity(a.children.len());
        for data in &a.children {
            match read_value(data) {
                Ok(v) => values.push(v),
                Err(e) => log::warn!("attribute {name}: {e}"),
            }
        }
        out.push(Attribute {
            name: name.to_string(),
            values,
        });
    }
    out
}

fn read_value(el: &XmlElement) -> DiaResult<DataValue> {
    let val = || el.require("data", "val");
    Ok(match el.name.as_str() {
        "int" => DataValue::Int(parse_int(val()?)?),
        "real" => DataValue::Real(parse_real(val()?)?),
        "boolean" => DataValue::Boolean(parse_bool(val()?)?),
        "enum" => DataValue::Enum(parse_int(val()?)?),
        "point" => DataValue::Point(parse_point(val()?)?),
        "rectangle" => DataValue::Rectangle(parse_rect(val()?)?),
        "color" => DataValue::Color(parse_color(val()?)?),
        "string" => DataValue::String(unwrap_string(&el.text)),
        "font" => DataValue::Font(read_font(el)?),
        "composite" => DataValue::Composite(Composite {
            kind: el.attr("type").unwrap_or_default().to_string(),
            attributes: read_attributes(el),
        }),
        other => return Err(DiaError::malformed("data", format!("unknown data type <{other}>"))),
    })
}

/// Strings are stored between `#` marks.
fn unwrap_string(raw: &str) -> String {
    let s = raw.strip_prefix('#').unwrap_or(raw);
    s.strip_suffix('#').unwrap_or(s).to_string()
}

/// `family`/`style` when present, else the legacy face `name`.
fn read_font(el: &XmlElement) -> DiaResult<Font> {
    match el.attr("family") {
        Some(family) => {
            let style = el.attr("style").map(parse_int).transpose()?.unwrap_or(0);
            Ok(Font::from_style_bits(Font::family_from_name(family), style as u32))
        }
        None => Ok(Font::from_legacy_name(el.require("font", "name")?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::data::AttributeSet;
    use crate::geometry::Point;
    use pretty_assertions::assert_eq;

    const SMALL: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<dia:diagram xmlns:dia="http://www.lysator.liu.se/~alla/dia/">
  <dia:diagramdata>
    <dia:attribute name="background"><dia:color val="#ffff00"/></dia:attribute>
  </dia:diagramdata>
  <dia:layer name="Top" visible="false" active="true">
    <dia:object type="Standard - Text" version="1" id="O3">
      <dia:attribute name="obj_pos"><dia:point val="1,2"/></dia:attribute>
      <dia:attribute name="text">
        <dia:composite type="text">
          <dia:attribute name="string"><dia:string>#a &lt; b#</dia:string></dia:attribute>
          <dia:attribute name="font"><dia:font family="monospace" style="80" name="Courier-Bold"/></dia:attribute>
        </dia:composite>
      </dia:attribute>
      <dia:connections>
        <dia:connection handle="0" to="O1" connection="8"/>
        <dia:connection handle="x" to="O1" connection="8"/>
      </dia:connections>
    </dia:object>
  </dia:layer>
</dia:diagram>"##;

    #[test]
    fn reads_structure() {
        let doc = parse_document(SMALL).unwrap();
        assert_eq!(doc.data.get_color("background"), Some(Color::rgb(1.0, 1.0, 0.0)));
        assert_eq!(doc.layers.len(), 1);
        let layer = &doc.layers[0];
        assert_eq!((layer.name.as_str(), layer.visible, layer.active), ("Top", false, true));
        let obj = &layer.objects[0];
        assert_eq!(obj.type_name, "Standard - Text");
        assert_eq!(obj.version, 1);
        assert_eq!(obj.get_point("obj_pos"), Some(Point::new(1.0, 2.0)));
        let text = obj.get_composite("text").unwrap();
        assert_eq!(text.get_string("string"), Some("a < b"));
        assert_eq!(text.get_font("font").map(|f| f.family), Some(Font::MONOSPACE.family));
    }

    #[test]
    fn bad_connection_is_skipped() {
        let doc = parse_document(SMALL).unwrap();
        let conns = &doc.layers[0].objects[0].connections;
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].to.as_str(), "O1");
        assert_eq!(conns[0].point, 8);
    }

    #[test]
    fn bad_value_drops_only_that_value() {
        let xml = r#"<diagram><layer name="L"><object type="T" id="a">
            <attribute name="p"><point val="1;2"/></attribute>
            <attribute name="q"><real val="2.5"/></attribute>
        </object></layer></diagram>"#;
        let doc = parse_document(xml).unwrap();
        let obj = &doc.layers[0].objects[0];
        assert_eq!(obj.get_point("p"), None);
        assert_eq!(obj.get_real("q"), Some(2.5));
    }

    #[test]
    fn object_without_id_is_skipped() {
        let xml = r#"<diagram><layer><object type="T"/><object type="T" id="b"/></layer></diagram>"#;
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.layers[0].objects.len(), 1);
    }

    #[test]
    fn wrong_root() {
        assert!(matches!(parse_document("<svg/>"), Err(DiaError::NotADiagram)));
    }

    #[test]
    fn truncated_document() {
        assert!(parse_document("<dia:diagram><dia:layer>").is_err());
    }
}
