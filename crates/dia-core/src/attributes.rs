//! Session attributes: the colors, line settings, font and arrows new
//! objects are created with.
//!
//! One `Attributes` value belongs to an editing session and is passed by
//! reference to every object constructor. It round-trips through JSON so
//! a front end can persist the user's choices.

use crate::arrows::Arrow;
use crate::color::Color;
use crate::error::DiaResult;
use crate::font::Font;
use crate::renderer::{Alignment, LineStyle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub foreground: Color,
    pub background: Color,
    pub line_width: f64,
    pub line_style: LineStyle,
    pub dash_length: f64,
    pub font: Font,
    pub font_height: f64,
    pub start_arrow: Arrow,
    pub end_arrow: Arrow,
    pub alignment: Alignment,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            background: Color::WHITE,
            line_width: 0.1,
            line_style: LineStyle::Solid,
            dash_length: 1.0,
            font: Font::SANS,
            font_height: 0.8,
            start_arrow: Arrow::default(),
            end_arrow: Arrow::default(),
            alignment: Alignment::Left,
        }
    }
}

impl Attributes {
    /// Parse from JSON; any field left out keeps its default.
    pub fn from_json(json: &str) -> DiaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DiaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn swap_colors(&mut self) {
        std::mem::swap(&mut self.foreground, &mut self.background);
    }

    /// Back to black on white.
    pub fn reset_colors(&mut self) {
        self.foreground = Color::BLACK;
        self.background = Color::WHITE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrows::ArrowType;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let attrs = Attributes::from_json(r##"{ "line_width": 0.25, "foreground": "#ff0000" }"##).unwrap();
        assert_eq!(attrs.line_width, 0.25);
        assert_eq!(attrs.foreground, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(attrs.background, Color::WHITE);
        assert_eq!(attrs.font_height, 0.8);
        assert_eq!(attrs.end_arrow.arrow_type, ArrowType::None);
    }

    #[test]
    fn json_roundtrip() {
        let mut attrs = Attributes::default();
        attrs.end_arrow = Arrow::new(ArrowType::FilledTriangle, 0.5, 0.5);
        attrs.line_style = LineStyle::Dashed;
        let back = Attributes::from_json(&attrs.to_json().unwrap()).unwrap();
        assert_eq!(back, attrs);
    }

    #[test]
    fn swap_and_reset() {
        let mut attrs = Attributes::default();
        attrs.swap_colors();
        assert_eq!(attrs.foreground, Color::WHITE);
        attrs.reset_colors();
        assert_eq!(attrs.foreground, Color::BLACK);
    }

    #[test]
    fn bad_json_is_config_error() {
        let err = Attributes::from_json("{ \"line_width\": \"wide\" }").unwrap_err();
        assert!(matches!(err, crate::DiaError::Config(_)));
    }
}
