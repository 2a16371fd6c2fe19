//! The attribute tree objects are saved to and loaded from.
//!
//! An object serializes into an [`ObjectNode`]: named attributes, each
//! holding one or more typed [`DataValue`]s. Composite values nest the
//! same structure (the `text` composite of a text-bearing shape, for
//! instance). The XML mapping lives in `parser`/`emitter`; this module
//! only knows the values and the small textual grammars some of them use
//! inside XML attributes.

use crate::color::Color;
use crate::error::{DiaError, DiaResult};
use crate::font::Font;
use crate::geometry::{Point, Rect};
use crate::id::ObjectId;
use winnow::ascii::{float, space0};
use winnow::combinator::{delimited, separated_pair};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

// ─── Values ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Int(i64),
    Real(f64),
    Boolean(bool),
    String(String),
    Point(Point),
    Rectangle(Rect),
    Color(Color),
    Font(Font),
    Enum(i64),
    Composite(Composite),
}

impl DataValue {
    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Int(_) => "int",
            DataValue::Real(_) => "real",
            DataValue::Boolean(_) => "boolean",
            DataValue::String(_) => "string",
            DataValue::Point(_) => "point",
            DataValue::Rectangle(_) => "rectangle",
            DataValue::Color(_) => "color",
            DataValue::Font(_) => "font",
            DataValue::Enum(_) => "enum",
            DataValue::Composite(_) => "composite",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<DataValue>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: DataValue) -> Self {
        Attribute {
            name: name.into(),
            values: vec![value],
        }
    }

    pub fn first(&self) -> Option<&DataValue> {
        self.values.first()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composite {
    /// The `type` of the composite, e.g. `text`.
    pub kind: String,
    pub attributes: Vec<Attribute>,
}

impl Composite {
    pub fn new(kind: impl Into<String>) -> Self {
        Composite {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }
}

/// One saved link: this object's handle `handle` is bound to connection
/// point `point` of object `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub handle: usize,
    pub to: ObjectId,
    pub point: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub type_name: String,
    pub version: u32,
    pub id: ObjectId,
    pub attributes: Vec<Attribute>,
    pub connections: Vec<ConnectionRecord>,
}

impl ObjectNode {
    pub fn new(type_name: impl Into<String>, version: u32, id: ObjectId) -> Self {
        ObjectNode {
            type_name: type_name.into(),
            version,
            id,
            attributes: Vec::new(),
            connections: Vec::new(),
        }
    }
}

// ─── Typed access ────────────────────────────────────────────────────────

/// Typed getters and adders over a list of attributes.
///
/// Getters return `None` when the attribute is missing or holds a value
/// of another type; the mismatch is logged since it means the file was
/// written by something that disagrees about the field.
pub trait AttributeSet {
    fn attributes(&self) -> &[Attribute];
    fn attributes_mut(&mut self) -> &mut Vec<Attribute>;

    fn find(&self, name: &str) -> Option<&Attribute> {
        self.attributes().iter().find(|a| a.name == name)
    }

    fn has(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn first_value(&self, name: &str) -> Option<&DataValue> {
        self.find(name)?.first()
    }

    fn add(&mut self, name: &str, value: DataValue) {
        let attrs = self.attributes_mut();
        match attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.values = vec![value],
            None => attrs.push(Attribute::new(name, value)),
        }
    }

    fn add_many(&mut self, name: &str, values: Vec<DataValue>) {
        let attrs = self.attributes_mut();
        attrs.retain(|a| a.name != name);
        attrs.push(Attribute {
            name: name.to_string(),
            values,
        });
    }

    fn get_int(&self, name: &str) -> Option<i64> {
        match self.first_value(name)? {
            DataValue::Int(v) => Some(*v),
            other => mismatch(name, "int", other),
        }
    }

    fn get_real(&self, name: &str) -> Option<f64> {
        match self.first_value(name)? {
            DataValue::Real(v) => Some(*v),
            other => mismatch(name, "real", other),
        }
    }

    fn get_bool(&self, name: &str) -> Option<bool> {
        match self.first_value(name)? {
            DataValue::Boolean(v) => Some(*v),
            other => mismatch(name, "boolean", other),
        }
    }

    fn get_string(&self, name: &str) -> Option<&str> {
        match self.first_value(name)? {
            DataValue::String(v) => Some(v),
            other => mismatch(name, "string", other),
        }
    }

    fn get_point(&self, name: &str) -> Option<Point> {
        match self.first_value(name)? {
            DataValue::Point(v) => Some(*v),
            other => mismatch(name, "point", other),
        }
    }

    /// Every point value of a multi-valued attribute, skipping others.
    fn get_points(&self, name: &str) -> Vec<Point> {
        self.find(name)
            .map(|a| {
                a.values
                    .iter()
                    .filter_map(|v| match v {
                        DataValue::Point(p) => Some(*p),
                        other => mismatch(name, "point", other),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_rect(&self, name: &str) -> Option<Rect> {
        match self.first_value(name)? {
            DataValue::Rectangle(v) => Some(*v),
            other => mismatch(name, "rectangle", other),
        }
    }

    fn get_color(&self, name: &str) -> Option<Color> {
        match self.first_value(name)? {
            DataValue::Color(v) => Some(*v),
            other => mismatch(name, "color", other),
        }
    }

    fn get_font(&self, name: &str) -> Option<Font> {
        match self.first_value(name)? {
            DataValue::Font(v) => Some(*v),
            other => mismatch(name, "font", other),
        }
    }

    fn get_enum(&self, name: &str) -> Option<i64> {
        match self.first_value(name)? {
            DataValue::Enum(v) => Some(*v),
            other => mismatch(name, "enum", other),
        }
    }

    fn get_composite(&self, name: &str) -> Option<&Composite> {
        match self.first_value(name)? {
            DataValue::Composite(v) => Some(v),
            other => mismatch(name, "composite", other),
        }
    }

    fn add_int(&mut self, name: &str, v: i64) {
        self.add(name, DataValue::Int(v));
    }

    fn add_real(&mut self, name: &str, v: f64) {
        self.add(name, DataValue::Real(v));
    }

    fn add_bool(&mut self, name: &str, v: bool) {
        self.add(name, DataValue::Boolean(v));
    }

    fn add_string(&mut self, name: &str, v: &str) {
        self.add(name, DataValue::String(v.to_string()));
    }

    fn add_point(&mut self, name: &str, v: Point) {
        self.add(name, DataValue::Point(v));
    }

    fn add_points(&mut self, name: &str, pts: &[Point]) {
        self.add_many(name, pts.iter().map(|&p| DataValue::Point(p)).collect());
    }

    fn add_rect(&mut self, name: &str, v: Rect) {
        self.add(name, DataValue::Rectangle(v));
    }

    fn add_color(&mut self, name: &str, v: Color) {
        self.add(name, DataValue::Color(v));
    }

    fn add_font(&mut self, name: &str, v: Font) {
        self.add(name, DataValue::Font(v));
    }

    fn add_enum(&mut self, name: &str, v: i64) {
        self.add(name, DataValue::Enum(v));
    }

    fn add_composite(&mut self, name: &str, v: Composite) {
        self.add(name, DataValue::Composite(v));
    }
}

fn mismatch<T>(name: &str, wanted: &str, found: &DataValue) -> Option<T> {
    log::warn!(
        "attribute `{name}`: expected {wanted} data, found {}; using default",
        found.kind()
    );
    None
}

impl AttributeSet for ObjectNode {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}

impl AttributeSet for Composite {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}

// ─── Value grammars ──────────────────────────────────────────────────────

fn real(input: &mut &str) -> ModalResult<f64> {
    delimited(space0, float, space0).parse_next(input)
}

fn point(input: &mut &str) -> ModalResult<Point> {
    separated_pair(real, ',', real)
        .map(|(x, y)| Point::new(x, y))
        .parse_next(input)
}

fn rectangle(input: &mut &str) -> ModalResult<Rect> {
    separated_pair(point, ';', point)
        .map(|(a, b)| Rect::from_points(a, b))
        .parse_next(input)
}

fn color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(6..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    Color::from_hex(digits).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

pub fn parse_real(s: &str) -> DiaResult<f64> {
    real.parse(s).map_err(|e| DiaError::malformed("real", e.to_string()))
}

pub fn parse_int(s: &str) -> DiaResult<i64> {
    s.trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| DiaError::malformed("int", format!("`{s}`: {e}")))
}

pub fn parse_bool(s: &str) -> DiaResult<bool> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DiaError::malformed("boolean", format!("`{other}`"))),
    }
}

/// `x,y`
pub fn parse_point(s: &str) -> DiaResult<Point> {
    point.parse(s).map_err(|e| DiaError::malformed("point", e.to_string()))
}

/// `left,top;right,bottom`
pub fn parse_rect(s: &str) -> DiaResult<Rect> {
    rectangle.parse(s).map_err(|e| DiaError::malformed("rectangle", e.to_string()))
}

/// `#rrggbb`
pub fn parse_color(s: &str) -> DiaResult<Color> {
    color.parse(s.trim()).map_err(|e| DiaError::malformed("color", e.to_string()))
}

/// Shortest representation that parses back to the same value.
pub fn format_real(v: f64) -> String {
    if v == 0.0 {
        // no "-0"
        return "0".to_string();
    }
    format!("{v}")
}

pub fn format_point(p: Point) -> String {
    format!("{},{}", format_real(p.x), format_real(p.y))
}

pub fn format_rect(r: &Rect) -> String {
    format!(
        "{},{};{},{}",
        format_real(r.left),
        format_real(r.top),
        format_real(r.right),
        format_real(r.bottom)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn point_grammar() {
        assert_eq!(parse_point("1.5,-2").unwrap(), Point::new(1.5, -2.0));
        assert_eq!(parse_point(" 3 , 4e-1 ").unwrap(), Point::new(3.0, 0.4));
        assert!(parse_point("1;2").is_err());
        assert!(parse_point("1,2,3").is_err());
    }

    #[test]
    fn rect_grammar_normalizes() {
        assert_eq!(parse_rect("4,5;0,1").unwrap(), Rect::new(0.0, 1.0, 4.0, 5.0));
        assert!(parse_rect("0,0").is_err());
    }

    #[test]
    fn color_grammar() {
        assert_eq!(parse_color("#000000").unwrap(), Color::BLACK);
        assert!(parse_color("#00").is_err());
        assert!(parse_color("000000").is_err());
    }

    #[test]
    fn scalars() {
        assert_eq!(parse_int(" 42 ").unwrap(), 42);
        assert!(parse_bool("yes").is_err());
        assert_eq!(parse_real("0.1").unwrap(), 0.1);
        assert_eq!(format_real(-0.0), "0");
        assert_eq!(format_point(Point::new(1.0, 0.5)), "1,0.5");
        assert_eq!(parse_point(&format_point(Point::new(0.1, 2.3))).unwrap(), Point::new(0.1, 2.3));
    }

    #[test]
    fn typed_getters_treat_mismatch_as_missing() {
        let mut node = ObjectNode::new("Standard - Box", 0, ObjectId::intern("O1"));
        node.add_real("border_width", 0.2);
        node.add_string("name", "box");
        node.add_points("pts", &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(node.get_real("border_width"), Some(0.2));
        assert_eq!(node.get_int("border_width"), None);
        assert_eq!(node.get_real("missing"), None);
        assert_eq!(node.get_string("name"), Some("box"));
        assert_eq!(node.get_points("pts").len(), 2);
        node.add_real("border_width", 0.3);
        assert_eq!(node.attributes.iter().filter(|a| a.name == "border_width").count(), 1);
    }
}
