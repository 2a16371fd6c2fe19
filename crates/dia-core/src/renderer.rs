//! The drawing interface objects render through.
//!
//! Backends implement the primitive operations; the composite ones
//! (filled shortcuts, lines with arrow heads, text blocks) have default
//! implementations built from the primitives, so a minimal backend only
//! needs lines, polygons, arcs, ellipses, beziers and strings.

use crate::arrows::Arrow;
use crate::color::Color;
use crate::font::{Font, FontMetrics, SIMPLE_METRICS};
use crate::geometry::{BezPoint, Point, Rect};
use crate::text::Text;
use serde::{Deserialize, Serialize};

// ─── Stroke & text state ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DashDot,
    DashDotDot,
    Dotted,
}

impl LineStyle {
    /// Numeric value stored in `.dia` files.
    pub fn code(self) -> i64 {
        match self {
            LineStyle::Solid => 0,
            LineStyle::Dashed => 1,
            LineStyle::DashDot => 2,
            LineStyle::DashDotDot => 3,
            LineStyle::Dotted => 4,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => LineStyle::Dashed,
            2 => LineStyle::DashDot,
            3 => LineStyle::DashDotDot,
            4 => LineStyle::Dotted,
            _ => LineStyle::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCaps {
    #[default]
    Butt,
    Round,
    Projecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStyle {
    #[default]
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn code(self) -> i64 {
        match self {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Alignment::Center,
            2 => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    /// Horizontal shift from the anchor to the left edge of a run of
    /// the given width.
    pub fn offset(self, width: f64) -> f64 {
        match self {
            Alignment::Left => 0.0,
            Alignment::Center => -width / 2.0,
            Alignment::Right => -width,
        }
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────

/// A drawing backend. Angles are in degrees, counter-clockwise from the
/// positive x axis; `fill`/`stroke` of `None` skip that pass.
pub trait Renderer {
    /// Start a pass. `visible` is the region being drawn, if clipped.
    fn begin_render(&mut self, _visible: Option<&Rect>) {}
    fn end_render(&mut self) {}

    fn set_linewidth(&mut self, width: f64);
    fn set_linecaps(&mut self, caps: LineCaps);
    fn set_linejoin(&mut self, join: LineJoin);
    fn set_linestyle(&mut self, style: LineStyle, dash_length: f64);
    fn set_fillstyle(&mut self, _style: FillStyle) {}
    fn set_font(&mut self, font: &Font, height: f64);

    fn draw_line(&mut self, start: Point, end: Point, color: &Color);

    fn draw_polyline(&mut self, points: &[Point], color: &Color) {
        for seg in points.windows(2) {
            self.draw_line(seg[0], seg[1], color);
        }
    }

    fn draw_polygon(&mut self, points: &[Point], fill: Option<&Color>, stroke: Option<&Color>);

    fn draw_rect(&mut self, ul: Point, lr: Point, fill: Option<&Color>, stroke: Option<&Color>) {
        let corners = [ul, Point::new(lr.x, ul.y), lr, Point::new(ul.x, lr.y)];
        self.draw_polygon(&corners, fill, stroke);
    }

    /// Rectangle with rounded corners; the radius is clamped to half the
    /// shorter side.
    fn draw_rounded_rect(
        &mut self,
        ul: Point,
        lr: Point,
        fill: Option<&Color>,
        stroke: Option<&Color>,
        radius: f64,
    ) {
        let radius = radius.min((lr.x - ul.x) / 2.0).min((lr.y - ul.y) / 2.0);
        if radius < 0.00001 {
            self.draw_rect(ul, lr, fill, stroke);
            return;
        }
        let d = 2.0 * radius;
        let corners = [
            (Point::new(lr.x - radius, ul.y + radius), 0.0),
            (Point::new(ul.x + radius, ul.y + radius), 90.0),
            (Point::new(ul.x + radius, lr.y - radius), 180.0),
            (Point::new(lr.x - radius, lr.y - radius), 270.0),
        ];
        if let Some(fill) = fill {
            self.draw_rect(Point::new(ul.x + radius, ul.y), Point::new(lr.x - radius, lr.y), Some(fill), None);
            self.draw_rect(Point::new(ul.x, ul.y + radius), Point::new(lr.x, lr.y - radius), Some(fill), None);
            for (c, a) in corners {
                self.fill_arc(c, d, d, a, a + 90.0, fill);
            }
        }
        if let Some(stroke) = stroke {
            self.draw_line(Point::new(ul.x + radius, ul.y), Point::new(lr.x - radius, ul.y), stroke);
            self.draw_line(Point::new(ul.x + radius, lr.y), Point::new(lr.x - radius, lr.y), stroke);
            self.draw_line(Point::new(ul.x, ul.y + radius), Point::new(ul.x, lr.y - radius), stroke);
            self.draw_line(Point::new(lr.x, ul.y + radius), Point::new(lr.x, lr.y - radius), stroke);
            for (c, a) in corners {
                self.draw_arc(c, d, d, a, a + 90.0, stroke);
            }
        }
    }

    fn draw_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color);
    fn fill_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color);

    fn draw_ellipse(
        &mut self,
        center: Point,
        width: f64,
        height: f64,
        fill: Option<&Color>,
        stroke: Option<&Color>,
    );

    fn draw_bezier(&mut self, path: &[BezPoint], color: &Color);
    fn draw_beziergon(&mut self, path: &[BezPoint], fill: Option<&Color>, stroke: Option<&Color>);

    /// One line of text anchored at `pos` (baseline), using the font set
    /// by the last `set_font`.
    fn draw_string(&mut self, text: &str, pos: Point, alignment: Alignment, color: &Color);

    fn text_width(&self, text: &str, font: &Font, height: f64) -> f64 {
        SIMPLE_METRICS.string_width(text, font, height)
    }

    /// Whether this renders to an editing surface (focus cursors shown).
    fn is_interactive(&self) -> bool {
        false
    }

    // ─── Composites ──────────────────────────────────────────────────────

    fn fill_rect(&mut self, ul: Point, lr: Point, color: &Color) {
        self.draw_rect(ul, lr, Some(color), None);
    }

    fn fill_polygon(&mut self, points: &[Point], color: &Color) {
        self.draw_polygon(points, Some(color), None);
    }

    fn fill_ellipse(&mut self, center: Point, width: f64, height: f64, color: &Color) {
        self.draw_ellipse(center, width, height, Some(color), None);
    }

    fn fill_bezier(&mut self, path: &[BezPoint], color: &Color) {
        self.draw_beziergon(path, Some(color), None);
    }

    fn draw_text(&mut self, text: &Text) {
        text.draw(self);
    }

    /// Draw a line, shortened at either end to make room for the arrow
    /// heads, then the heads themselves.
    fn draw_line_with_arrows(
        &mut self,
        start: Point,
        end: Point,
        line_width: f64,
        color: &Color,
        start_arrow: Option<&Arrow>,
        end_arrow: Option<&Arrow>,
    ) {
        let start_arrow = start_arrow.filter(|a| a.is_visible());
        let end_arrow = end_arrow.filter(|a| a.is_visible());
        let (mut line_start, mut line_end) = (start, end);
        let mut start_head = start;
        let mut end_head = end;
        if let Some(arrow) = start_arrow {
            let (move_arrow, move_line) = arrow.arrow_point(start, end, line_width);
            start_head = start - move_arrow;
            line_start = start - move_line;
        }
        if let Some(arrow) = end_arrow {
            let (move_arrow, move_line) = arrow.arrow_point(end, start, line_width);
            end_head = end - move_arrow;
            line_end = end - move_line;
        }
        self.draw_line(line_start, line_end, color);
        if let Some(arrow) = start_arrow {
            arrow.draw(self, start_head, line_end, line_width, color, &Color::WHITE);
        }
        if let Some(arrow) = end_arrow {
            arrow.draw(self, end_head, line_start, line_width, color, &Color::WHITE);
        }
    }

    /// Polyline version of [`Renderer::draw_line_with_arrows`]. Zero-length
    /// segments at either end are skipped when orienting the heads.
    fn draw_polyline_with_arrows(
        &mut self,
        points: &[Point],
        line_width: f64,
        color: &Color,
        start_arrow: Option<&Arrow>,
        end_arrow: Option<&Arrow>,
    ) {
        let n = points.len();
        if n < 2 {
            return;
        }
        let start_arrow = start_arrow.filter(|a| a.is_visible());
        let end_arrow = end_arrow.filter(|a| a.is_visible());
        let mut pts = points.to_vec();
        let mut first = 0;
        let mut last = n;
        let mut start_head = pts[0];
        let mut end_head = pts[n - 1];

        if let Some(arrow) = start_arrow {
            while first < n - 1 && pts[first].distance(pts[first + 1]) < 0.0000001 {
                first += 1;
            }
            if first == n - 1 {
                first = 0;
            }
            let (move_arrow, move_line) = arrow.arrow_point(pts[first], pts[first + 1], line_width);
            start_head = pts[first] - move_arrow;
            pts[first] -= move_line;
        }
        if let Some(arrow) = end_arrow {
            while last > 1 && pts[last - 1].distance(pts[last - 2]) < 0.0000001 {
                last -= 1;
            }
            if last == 1 {
                last = n;
            }
            let (move_arrow, move_line) = arrow.arrow_point(pts[last - 1], pts[last - 2], line_width);
            end_head = pts[last - 1] - move_arrow;
            pts[last - 1] -= move_line;
        }
        if last > first + 1 {
            self.draw_polyline(&pts[first..last], color);
        }
        if let Some(arrow) = start_arrow {
            arrow.draw(self, start_head, pts[first + 1], line_width, color, &Color::WHITE);
        }
        if let Some(arrow) = end_arrow {
            arrow.draw(self, end_head, pts[last - 2], line_width, color, &Color::WHITE);
        }
    }
}
