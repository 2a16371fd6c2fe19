//! SVG export backend.
//!
//! Each primitive becomes one SVG element appended to a body buffer;
//! [`SvgRenderer::finish`] wraps it in the `<svg>` root with a viewBox
//! covering the region passed to `begin_render`.

use dia_core::font::{FontSlant, FontWeight};
use dia_core::{Alignment, BezPoint, Color, Font, LineCaps, LineJoin, LineStyle, Point, Rect, Renderer};
use quick_xml::escape::escape;
use std::fmt::Write as _;

/// Units are diagram centimetres; the exported document scales them.
pub const DEFAULT_SCALE: f64 = 20.0;

const DOT_RATIO: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SvgRenderer {
    body: String,
    view: Option<Rect>,
    scale: f64,
    line_width: f64,
    caps: LineCaps,
    join: LineJoin,
    style: LineStyle,
    dash_length: f64,
    font: Font,
    font_height: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            view: None,
            scale: DEFAULT_SCALE,
            line_width: 0.0,
            caps: LineCaps::default(),
            join: LineJoin::default(),
            style: LineStyle::default(),
            dash_length: 1.0,
            font: Font::SANS,
            font_height: 0.8,
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// The elements drawn so far, without the document root.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The complete SVG document.
    pub fn finish(&self) -> String {
        let view = self.view.unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));
        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\">",
            num(view.width() * self.scale),
            num(view.height() * self.scale),
            num(view.left),
            num(view.top),
            num(view.width()),
            num(view.height()),
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }

    fn stroke_attrs(&self, color: &Color) -> String {
        let mut s = format!(
            "fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"",
            rgb(color),
            num(self.line_width)
        );
        if color.a < 1.0 {
            let _ = write!(s, " stroke-opacity=\"{}\"", num(color.a as f64));
        }
        match self.caps {
            LineCaps::Butt => {}
            LineCaps::Round => s.push_str(" stroke-linecap=\"round\""),
            LineCaps::Projecting => s.push_str(" stroke-linecap=\"square\""),
        }
        match self.join {
            LineJoin::Miter => {}
            LineJoin::Round => s.push_str(" stroke-linejoin=\"round\""),
            LineJoin::Bevel => s.push_str(" stroke-linejoin=\"bevel\""),
        }
        if let Some(dash) = self.dash_array() {
            let _ = write!(s, " stroke-dasharray=\"{dash}\"");
        }
        s
    }

    fn dash_array(&self) -> Option<String> {
        let dash = self.dash_length;
        let dot = dash * DOT_RATIO;
        match self.style {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some(format!("{} {}", num(dash), num(dash))),
            LineStyle::DashDot => {
                let hole = (dash - dot) / 2.0;
                Some(format!("{} {} {} {}", num(dash), num(hole), num(dot), num(hole)))
            }
            LineStyle::DashDotDot => {
                let hole = (dash - 2.0 * dot) / 3.0;
                Some(format!(
                    "{} {} {} {} {} {}",
                    num(dash),
                    num(hole),
                    num(dot),
                    num(hole),
                    num(dot),
                    num(hole)
                ))
            }
            LineStyle::Dotted => Some(format!("{} {}", num(dot), num(dot))),
        }
    }

    /// Attributes for a shape with optional fill and stroke passes.
    fn paint_attrs(&self, fill: Option<&Color>, stroke: Option<&Color>) -> String {
        let mut s = match stroke {
            Some(c) => self.stroke_attrs(c),
            None => "stroke=\"none\"".to_string(),
        };
        // stroke_attrs always writes fill="none"; replace it when filling.
        match fill {
            Some(c) => {
                let fill = if c.a < 1.0 {
                    format!("fill=\"{}\" fill-opacity=\"{}\"", rgb(c), num(c.a as f64))
                } else {
                    format!("fill=\"{}\"", rgb(c))
                };
                s = s.replacen("fill=\"none\" ", "", 1);
                format!("{fill} {s}")
            }
            None if stroke.is_none() => "fill=\"none\" stroke=\"none\"".to_string(),
            None => s,
        }
    }

    fn push(&mut self, element: String) {
        self.body.push_str(&element);
        self.body.push('\n');
    }
}

// ─── Formatting helpers ──────────────────────────────────────────────────

/// Shortest decimal form with at most four fractional digits.
fn num(v: f64) -> String {
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn rgb(c: &Color) -> String {
    let (r, g, b, _) = c.to_rgba8();
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn path_data(path: &[BezPoint], close: bool) -> String {
    let mut d = String::new();
    for bp in path {
        match *bp {
            BezPoint::MoveTo(p) => {
                let _ = write!(d, "M {} {} ", num(p.x), num(p.y));
            }
            BezPoint::LineTo(p) => {
                let _ = write!(d, "L {} {} ", num(p.x), num(p.y));
            }
            BezPoint::CurveTo(a, b, p) => {
                let _ = write!(
                    d,
                    "C {} {} {} {} {} {} ",
                    num(a.x),
                    num(a.y),
                    num(b.x),
                    num(b.y),
                    num(p.x),
                    num(p.y)
                );
            }
        }
    }
    if close {
        d.push('Z');
    }
    d.trim_end().to_string()
}

/// Point on an ellipse at `angle` degrees, counter-clockwise with y down.
pub(crate) fn arc_point(center: Point, width: f64, height: f64, angle: f64) -> Point {
    let rad = angle.to_radians();
    Point::new(center.x + width / 2.0 * rad.cos(), center.y - height / 2.0 * rad.sin())
}

fn arc_data(center: Point, width: f64, height: f64, angle1: f64, angle2: f64, pie: bool) -> String {
    let mut sweep = (angle2 - angle1).rem_euclid(360.0);
    if sweep == 0.0 && angle2 != angle1 {
        sweep = 360.0;
    }
    let start = arc_point(center, width, height, angle1);
    let end = arc_point(center, width, height, angle1 + sweep);
    let large = if sweep > 180.0 { 1 } else { 0 };
    let (rx, ry) = (num(width / 2.0), num(height / 2.0));
    let arc = format!(
        "A {rx} {ry} 0 {large} 0 {} {}",
        num(end.x),
        num(end.y)
    );
    if pie {
        format!(
            "M {} {} L {} {} {arc} Z",
            num(center.x),
            num(center.y),
            num(start.x),
            num(start.y)
        )
    } else {
        format!("M {} {} {arc}", num(start.x), num(start.y))
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────

impl Renderer for SvgRenderer {
    fn begin_render(&mut self, visible: Option<&Rect>) {
        self.body.clear();
        self.view = visible.copied();
    }

    fn set_linewidth(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_linecaps(&mut self, caps: LineCaps) {
        self.caps = caps;
    }

    fn set_linejoin(&mut self, join: LineJoin) {
        self.join = join;
    }

    fn set_linestyle(&mut self, style: LineStyle, dash_length: f64) {
        self.style = style;
        self.dash_length = dash_length;
    }

    fn set_font(&mut self, font: &Font, height: f64) {
        self.font = *font;
        self.font_height = height;
    }

    fn draw_line(&mut self, start: Point, end: Point, color: &Color) {
        let el = format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {}/>",
            num(start.x),
            num(start.y),
            num(end.x),
            num(end.y),
            self.stroke_attrs(color)
        );
        self.push(el);
    }

    fn draw_polyline(&mut self, points: &[Point], color: &Color) {
        let el = format!(
            "<polyline points=\"{}\" {}/>",
            points_attr(points),
            self.stroke_attrs(color)
        );
        self.push(el);
    }

    fn draw_polygon(&mut self, points: &[Point], fill: Option<&Color>, stroke: Option<&Color>) {
        let el = format!(
            "<polygon points=\"{}\" {}/>",
            points_attr(points),
            self.paint_attrs(fill, stroke)
        );
        self.push(el);
    }

    fn draw_rect(&mut self, ul: Point, lr: Point, fill: Option<&Color>, stroke: Option<&Color>) {
        let el = format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {}/>",
            num(ul.x),
            num(ul.y),
            num(lr.x - ul.x),
            num(lr.y - ul.y),
            self.paint_attrs(fill, stroke)
        );
        self.push(el);
    }

    fn draw_rounded_rect(&mut self, ul: Point, lr: Point, fill: Option<&Color>, stroke: Option<&Color>, radius: f64) {
        let radius = radius.min((lr.x - ul.x) / 2.0).min((lr.y - ul.y) / 2.0).max(0.0);
        let el = format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\" {}/>",
            num(ul.x),
            num(ul.y),
            num(lr.x - ul.x),
            num(lr.y - ul.y),
            num(radius),
            num(radius),
            self.paint_attrs(fill, stroke)
        );
        self.push(el);
    }

    fn draw_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color) {
        let el = format!(
            "<path d=\"{}\" {}/>",
            arc_data(center, width, height, angle1, angle2, false),
            self.stroke_attrs(color)
        );
        self.push(el);
    }

    fn fill_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color) {
        let el = format!(
            "<path d=\"{}\" {}/>",
            arc_data(center, width, height, angle1, angle2, true),
            self.paint_attrs(Some(color), None)
        );
        self.push(el);
    }

    fn draw_ellipse(&mut self, center: Point, width: f64, height: f64, fill: Option<&Color>, stroke: Option<&Color>) {
        let el = format!(
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {}/>",
            num(center.x),
            num(center.y),
            num(width / 2.0),
            num(height / 2.0),
            self.paint_attrs(fill, stroke)
        );
        self.push(el);
    }

    fn draw_bezier(&mut self, path: &[BezPoint], color: &Color) {
        let el = format!("<path d=\"{}\" {}/>", path_data(path, false), self.stroke_attrs(color));
        self.push(el);
    }

    fn draw_beziergon(&mut self, path: &[BezPoint], fill: Option<&Color>, stroke: Option<&Color>) {
        let el = format!(
            "<path d=\"{}\" {}/>",
            path_data(path, true),
            self.paint_attrs(fill, stroke)
        );
        self.push(el);
    }

    fn draw_string(&mut self, text: &str, pos: Point, alignment: Alignment, color: &Color) {
        if text.is_empty() {
            return;
        }
        let anchor = match alignment {
            Alignment::Left => "start",
            Alignment::Center => "middle",
            Alignment::Right => "end",
        };
        let mut style = format!(
            "font-family=\"{}\" font-size=\"{}\"",
            self.font.family_name(),
            num(self.font_height)
        );
        if matches!(
            self.font.weight,
            FontWeight::DemiBold | FontWeight::Bold | FontWeight::UltraBold | FontWeight::Heavy
        ) {
            style.push_str(" font-weight=\"bold\"");
        }
        match self.font.slant {
            FontSlant::Normal => {}
            FontSlant::Italic => style.push_str(" font-style=\"italic\""),
            FontSlant::Oblique => style.push_str(" font-style=\"oblique\""),
        }
        let el = format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"{anchor}\" {style} fill=\"{}\">{}</text>",
            num(pos.x),
            num(pos.y),
            rgb(color),
            escape(text)
        );
        self.push(el);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.25), "0.25");
        assert_eq!(num(-0.00001), "0");
        assert_eq!(num(2.123456), "2.1235");
    }

    #[test]
    fn line_carries_stroke_state() {
        let mut r = SvgRenderer::new();
        r.set_linewidth(0.1);
        r.set_linestyle(LineStyle::Dashed, 0.5);
        r.set_linecaps(LineCaps::Round);
        r.draw_line(Point::ZERO, Point::new(2.0, 1.0), &Color::BLACK);
        assert_eq!(
            r.body(),
            "<line x1=\"0\" y1=\"0\" x2=\"2\" y2=\"1\" fill=\"none\" stroke=\"#000000\" stroke-width=\"0.1\" \
             stroke-linecap=\"round\" stroke-dasharray=\"0.5 0.5\"/>\n"
        );
    }

    #[test]
    fn filled_rect_without_stroke() {
        let mut r = SvgRenderer::new();
        r.draw_rect(Point::ZERO, Point::new(2.0, 1.0), Some(&Color::WHITE), None);
        assert_eq!(
            r.body(),
            "<rect x=\"0\" y=\"0\" width=\"2\" height=\"1\" fill=\"#ffffff\" stroke=\"none\"/>\n"
        );
    }

    #[test]
    fn filled_and_stroked_polygon_has_one_fill() {
        let mut r = SvgRenderer::new();
        r.draw_polygon(
            &[Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            Some(&Color::WHITE),
            Some(&Color::BLACK),
        );
        assert_eq!(r.body().matches("fill=").count(), 1);
        assert!(r.body().contains("fill=\"#ffffff\""));
        assert!(r.body().contains("stroke=\"#000000\""));
    }

    #[test]
    fn quarter_arc_goes_counter_clockwise() {
        let d = arc_data(Point::ZERO, 2.0, 2.0, 0.0, 90.0, false);
        assert_eq!(d, "M 1 0 A 1 1 0 0 0 0 -1");
    }

    #[test]
    fn text_is_escaped_and_anchored() {
        let mut r = SvgRenderer::new();
        r.set_font(&Font::MONOSPACE, 1.0);
        r.draw_string("a<b", Point::new(1.0, 2.0), Alignment::Center, &Color::BLACK);
        assert_eq!(
            r.body(),
            "<text x=\"1\" y=\"2\" text-anchor=\"middle\" font-family=\"monospace\" font-size=\"1\" \
             fill=\"#000000\">a&lt;b</text>\n"
        );
    }

    #[test]
    fn document_has_viewbox_of_visible_region() {
        let mut r = SvgRenderer::new().with_scale(10.0);
        r.begin_render(Some(&Rect::new(1.0, 2.0, 5.0, 4.0)));
        r.end_render();
        let svg = r.finish();
        assert!(svg.contains("width=\"40\" height=\"20\" viewBox=\"1 2 4 2\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
