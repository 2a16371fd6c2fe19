//! Arrow heads drawn at line ends.
//!
//! Every head is computed from the point it sits on (`to`), the point the
//! line comes from (`from`), and its length and width. A coincident
//! `to`/`from` pair falls back to pointing along +x, so heads are always
//! finite.

use crate::boundingbox::{PolyBBExtras, polyline_bbox};
use crate::color::Color;
use crate::geometry::{BezPoint, Point, Rect};
use crate::renderer::{LineCaps, LineJoin, LineStyle, Renderer};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ARROW_SIZE: f64 = 0.5;
/// Heads smaller than this in either dimension are not drawn.
pub const MIN_ARROW_DIMENSION: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowType {
    #[default]
    None,
    Lines,
    HollowTriangle,
    FilledTriangle,
    HollowDiamond,
    FilledDiamond,
    HalfHead,
    SlashedCross,
    FilledEllipse,
    HollowEllipse,
    DoubleHollowTriangle,
    DoubleFilledTriangle,
    UnfilledTriangle,
    FilledDot,
    BlankedDot,
    FilledBox,
    BlankedBox,
    SlashArrow,
    CrowFoot,
    Cross,
    FilledConcave,
    BlankedConcave,
    HalfDiamond,
    Backslash,
}

impl ArrowType {
    pub const ALL: [ArrowType; 24] = [
        ArrowType::None,
        ArrowType::Lines,
        ArrowType::HollowTriangle,
        ArrowType::FilledTriangle,
        ArrowType::HollowDiamond,
        ArrowType::FilledDiamond,
        ArrowType::HalfHead,
        ArrowType::SlashedCross,
        ArrowType::FilledEllipse,
        ArrowType::HollowEllipse,
        ArrowType::DoubleHollowTriangle,
        ArrowType::DoubleFilledTriangle,
        ArrowType::UnfilledTriangle,
        ArrowType::FilledDot,
        ArrowType::BlankedDot,
        ArrowType::FilledBox,
        ArrowType::BlankedBox,
        ArrowType::SlashArrow,
        ArrowType::CrowFoot,
        ArrowType::Cross,
        ArrowType::FilledConcave,
        ArrowType::BlankedConcave,
        ArrowType::HalfDiamond,
        ArrowType::Backslash,
    ];

    /// Numeric value stored in `.dia` files.
    pub fn code(self) -> i64 {
        match self {
            ArrowType::None => 0,
            ArrowType::Lines => 1,
            ArrowType::HollowTriangle => 2,
            ArrowType::FilledTriangle => 3,
            ArrowType::HollowDiamond => 4,
            ArrowType::FilledDiamond => 5,
            ArrowType::HalfHead => 6,
            ArrowType::SlashedCross => 7,
            ArrowType::FilledEllipse => 8,
            ArrowType::HollowEllipse => 9,
            ArrowType::DoubleHollowTriangle => 10,
            ArrowType::DoubleFilledTriangle => 11,
            ArrowType::UnfilledTriangle => 12,
            ArrowType::FilledDot => 13,
            ArrowType::BlankedDot => 15,
            ArrowType::FilledBox => 16,
            ArrowType::BlankedBox => 17,
            ArrowType::SlashArrow => 18,
            ArrowType::CrowFoot => 20,
            ArrowType::Cross => 21,
            ArrowType::FilledConcave => 22,
            ArrowType::BlankedConcave => 23,
            ArrowType::HalfDiamond => 25,
            ArrowType::Backslash => 32,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            ArrowType::None => "None",
            ArrowType::Lines => "Lines",
            ArrowType::HollowTriangle => "Hollow Triangle",
            ArrowType::FilledTriangle => "Filled Triangle",
            ArrowType::HollowDiamond => "Hollow Diamond",
            ArrowType::FilledDiamond => "Filled Diamond",
            ArrowType::HalfHead => "Half Head",
            ArrowType::SlashedCross => "Slashed Cross",
            ArrowType::FilledEllipse => "Filled Ellipse",
            ArrowType::HollowEllipse => "Hollow Ellipse",
            ArrowType::DoubleHollowTriangle => "Double Hollow Triangle",
            ArrowType::DoubleFilledTriangle => "Double Filled Triangle",
            ArrowType::UnfilledTriangle => "Unfilled Triangle",
            ArrowType::FilledDot => "Filled Dot",
            ArrowType::BlankedDot => "Blanked Dot",
            ArrowType::FilledBox => "Filled Box",
            ArrowType::BlankedBox => "Blanked Box",
            ArrowType::SlashArrow => "Slashed",
            ArrowType::CrowFoot => "Crow Foot",
            ArrowType::Cross => "Cross",
            ArrowType::FilledConcave => "Filled Concave",
            ArrowType::BlankedConcave => "Blanked Concave",
            ArrowType::HalfDiamond => "Half Diamond",
            ArrowType::Backslash => "Backslash",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arrow {
    #[serde(rename = "type")]
    pub arrow_type: ArrowType,
    pub length: f64,
    pub width: f64,
}

impl Default for Arrow {
    fn default() -> Self {
        Arrow {
            arrow_type: ArrowType::None,
            length: DEFAULT_ARROW_SIZE,
            width: DEFAULT_ARROW_SIZE,
        }
    }
}

// ─── Point calculations ──────────────────────────────────────────────────

/// Unit vector from `from` to `to`, or +x when they coincide.
fn direction(to: Point, from: Point) -> Point {
    (to - from).normalize()
}

/// `(delta, orth)` where delta runs from `from` to `to` and orth is its
/// clockwise perpendicular.
fn frame(to: Point, from: Point) -> (Point, Point) {
    let d = direction(to, from);
    (d, Point::new(d.y, -d.x))
}

fn calculate_arrow(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (d, o) = frame(to, from);
    let (d, o) = (d * length, o * (width / 2.0));
    vec![to - d - o, to, to - d + o]
}

fn calculate_crow(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (d, o) = frame(to, from);
    let (d, o) = (d * length, o * (width / 2.0));
    vec![to - d, to - o, to + o]
}

fn calculate_diamond(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (d, o) = frame(to, from);
    let (d, o) = (d * (length / 2.0), o * (width / 2.0));
    vec![to, to - d - o, to - d * 2.0, to - d + o]
}

fn calculate_halfhead(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (d, o) = frame(to, from);
    let (d, o) = (d * length, o * (width / 2.0));
    vec![to - d - o, to, to]
}

fn calculate_slashed_cross(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (d, o) = frame(to, from);
    let (d, o) = (d * (length / 2.0), o * (width / 2.0));
    vec![to, to + d, to + d + o, to - d - o, to + o, to - o]
}

fn calculate_backslash(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (d, o) = frame(to, from);
    let (d, o) = (d * (length / 2.0), o * (width / 2.0));
    vec![to - d * 3.0 + o, to - d - o]
}

fn calculate_concave(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (d, o) = frame(to, from);
    let (d, o) = (d * (length / 4.0), o * (width / 2.0));
    vec![to, to - d * 4.0 - o, to - d * 3.0, to + o - d * 4.0]
}

/// Back direction (towards `from`) and its perpendicular, as used by the
/// dot, box and slashed heads.
fn back_frame(to: Point, from: Point) -> (Point, Point) {
    let vl = -direction(to, from);
    (vl, vl.perp())
}

fn calculate_box(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (vl, vt) = back_frame(to, from);
    let bs = to + vl * (length / 4.0);
    let be = bs - vt * (width / 2.0);
    let bs = bs + vt * (width / 2.0);
    let p0 = to + vt * (width / 4.0);
    let p1 = to - vt * (width / 4.0);
    let p2 = p1 + vl * (length / 2.0);
    let p3 = p0 + vl * (length / 2.0);
    vec![p0, p1, p2, p3, bs, be]
}

fn calculate_slashed(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let (vl, vt) = back_frame(to, from);
    let mid = to + vl * (length / 2.0);
    vec![
        mid,
        mid + vl * (length / 2.0),
        mid + vt * (width / 2.0),
        mid - vt * (width / 2.0),
        to + vl * (0.1 * length) + vt * (0.4 * width),
        to + vl * (0.9 * length) - vt * (0.4 * width),
    ]
}

/// Tip and tail of the second head of a double arrow.
fn double_arrow(to: Point, from: Point, length: f64) -> (Point, Point) {
    let d = direction(to, from) * (length / 2.0);
    (to - d * 2.0, from + d * 2.0)
}

fn calculate_double_triangle(to: Point, from: Point, length: f64, width: f64) -> Vec<Point> {
    let mut pts = calculate_arrow(to, from, length, width);
    let (second_to, second_from) = double_arrow(to, from, length);
    pts.extend(calculate_arrow(second_to, second_from, length, width));
    pts
}

/// Elliptical head outline: four cubic quarter arcs from the tip back
/// along `vl`, `length` long and `width` wide.
fn ellipse_path(tip: Point, vl: Point, vt: Point, length: f64, width: f64) -> [BezPoint; 5] {
    let far = tip + vl * length;
    let mid = tip + vl * (length / 2.0);
    let side_a = mid - vt * (width / 2.0);
    let side_b = mid + vt * (width / 2.0);
    [
        BezPoint::MoveTo(tip),
        BezPoint::CurveTo(tip - vt * (width / 4.0), side_a - vl * (length / 4.0), side_a),
        BezPoint::CurveTo(side_a + vl * (length / 4.0), far - vt * (width / 4.0), far),
        BezPoint::CurveTo(far + vt * (width / 4.0), side_b + vl * (length / 4.0), side_b),
        BezPoint::CurveTo(side_b - vl * (length / 4.0), tip + vt * (width / 4.0), tip),
    ]
}

// ─── Arrow ───────────────────────────────────────────────────────────────

impl Arrow {
    #[must_use]
    pub fn new(arrow_type: ArrowType, length: f64, width: f64) -> Self {
        Arrow {
            arrow_type,
            length,
            width,
        }
    }

    /// Whether anything is drawn for this head.
    pub fn is_visible(&self) -> bool {
        self.arrow_type != ArrowType::None
            && self.length >= MIN_ARROW_DIMENSION
            && self.width >= MIN_ARROW_DIMENSION
    }

    /// Replace heads too small to draw with a default-sized `None`, the
    /// way loading treats them.
    #[must_use]
    pub fn sanitized(self) -> Self {
        if self.length < MIN_ARROW_DIMENSION || self.width < MIN_ARROW_DIMENSION {
            log::warn!(
                "arrow head of type {} has too small dimensions; removing",
                self.arrow_type.name()
            );
            return Arrow::default();
        }
        self
    }

    /// Points describing the head; empty for `None`.
    pub fn calculate(&self, to: Point, from: Point) -> Vec<Point> {
        let (l, w) = (self.length, self.width);
        match self.arrow_type {
            ArrowType::None => Vec::new(),
            ArrowType::Lines
            | ArrowType::HollowTriangle
            | ArrowType::FilledTriangle
            | ArrowType::UnfilledTriangle
            | ArrowType::Cross => calculate_arrow(to, from, l, w),
            ArrowType::HollowDiamond
            | ArrowType::FilledDiamond
            | ArrowType::HalfDiamond
            | ArrowType::FilledEllipse
            | ArrowType::HollowEllipse
            | ArrowType::FilledDot
            | ArrowType::BlankedDot => calculate_diamond(to, from, l, w),
            ArrowType::HalfHead => calculate_halfhead(to, from, l, w),
            ArrowType::SlashedCross => calculate_slashed_cross(to, from, l, w),
            ArrowType::DoubleHollowTriangle | ArrowType::DoubleFilledTriangle => {
                calculate_double_triangle(to, from, l, w)
            }
            ArrowType::FilledBox | ArrowType::BlankedBox => calculate_box(to, from, l, w),
            ArrowType::SlashArrow => calculate_slashed(to, from, l, w),
            ArrowType::CrowFoot => calculate_crow(to, from, l, w),
            ArrowType::FilledConcave | ArrowType::BlankedConcave => calculate_concave(to, from, l, w),
            ArrowType::Backslash => calculate_backslash(to, from, l, w),
        }
    }

    /// Extent of the head drawn with `line_width`.
    pub fn bbox(&self, line_width: f64, to: Point, from: Point) -> Option<Rect> {
        let pts = self.calculate(to, from);
        if pts.is_empty() {
            return None;
        }
        Some(polyline_bbox(&pts, &PolyBBExtras::uniform(line_width / 2.0), true))
    }

    /// How far the head (`.0`) and the line end (`.1`) move back from
    /// `to` so the stroke does not poke through the tip.
    pub fn arrow_point(&self, to: Point, from: Point, line_width: f64) -> (Point, Point) {
        let linewidth = if line_width == 0.0 { 0.0001 } else { line_width };
        let dist = from.distance(to);
        let arrow_type = if self.is_visible() {
            self.arrow_type
        } else {
            ArrowType::None
        };
        let unit = || (to - from).normalize();
        let along = |add_len: f64| {
            if add_len.abs() < dist {
                unit() * add_len
            } else {
                Point::ZERO
            }
        };
        let pointy_angle = || {
            if self.width < 0.0000001 {
                None
            } else {
                Some((self.length / (self.width / 2.0)).atan())
            }
        };

        let move_arrow = match arrow_type {
            ArrowType::Lines
            | ArrowType::HollowTriangle
            | ArrowType::UnfilledTriangle
            | ArrowType::FilledConcave
            | ArrowType::BlankedConcave
            | ArrowType::DoubleHollowTriangle => match pointy_angle() {
                Some(angle) if angle < 75f64.to_radians() => along(0.5 * linewidth / angle.cos()),
                _ => Point::ZERO,
            },
            ArrowType::HalfHead => match pointy_angle() {
                Some(angle) if angle < 60f64.to_radians() => along(linewidth / angle.cos()),
                _ => Point::ZERO,
            },
            ArrowType::FilledTriangle
            | ArrowType::HollowEllipse
            | ArrowType::BlankedDot
            | ArrowType::BlankedBox => along(0.5 * linewidth),
            _ => Point::ZERO,
        };

        // `normalize` of a zero move would point along +x; keep it zero.
        let scaled_from_move = |len: f64| {
            if move_arrow == Point::ZERO {
                Point::ZERO
            } else {
                move_arrow.normalize() * len
            }
        };

        let move_line = match arrow_type {
            ArrowType::Lines | ArrowType::HalfHead => move_arrow * 2.0,
            ArrowType::HollowTriangle
            | ArrowType::UnfilledTriangle
            | ArrowType::FilledTriangle
            | ArrowType::FilledEllipse
            | ArrowType::HollowEllipse => scaled_from_move(self.length) + move_arrow,
            ArrowType::HalfDiamond => unit() * self.length + move_arrow,
            ArrowType::HollowDiamond | ArrowType::FilledDiamond => {
                unit() * self.length - unit() * (std::f64::consts::SQRT_2 * linewidth)
            }
            ArrowType::BlankedDot | ArrowType::BlankedBox => scaled_from_move(0.5 * self.length),
            ArrowType::FilledDot | ArrowType::FilledBox => unit() * (0.5 * self.length),
            ArrowType::FilledConcave | ArrowType::BlankedConcave => {
                scaled_from_move(0.75 * self.length) + move_arrow
            }
            ArrowType::DoubleHollowTriangle => {
                scaled_from_move(2.0 * self.length) + move_arrow + scaled_from_move(linewidth)
            }
            ArrowType::DoubleFilledTriangle => unit() * (2.0 * self.length),
            ArrowType::SlashArrow => unit() * (self.length / 2.0),
            _ => return (Point::ZERO, Point::ZERO),
        };
        (move_arrow, move_line)
    }

    /// Draw the head at `to`, pointing away from `from`.
    pub fn draw<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        to: Point,
        from: Point,
        line_width: f64,
        fg: &Color,
        bg: &Color,
    ) {
        if !self.is_visible() {
            return;
        }
        renderer.set_linewidth(line_width);
        renderer.set_linestyle(LineStyle::Solid, 0.0);
        renderer.set_linejoin(LineJoin::Miter);
        renderer.set_linecaps(LineCaps::Butt);

        let (l, w) = (self.length, self.width);
        match self.arrow_type {
            ArrowType::None => {}
            ArrowType::Lines | ArrowType::HalfHead => {
                renderer.draw_polyline(&self.calculate(to, from), fg);
            }
            ArrowType::HollowTriangle => {
                renderer.draw_polygon(&calculate_arrow(to, from, l, w), Some(bg), Some(fg));
            }
            ArrowType::FilledTriangle => {
                renderer.draw_polygon(&calculate_arrow(to, from, l, w), Some(fg), Some(fg));
            }
            ArrowType::UnfilledTriangle => {
                renderer.draw_polygon(&calculate_arrow(to, from, l, w), None, Some(fg));
            }
            ArrowType::HollowDiamond => {
                renderer.draw_polygon(&calculate_diamond(to, from, l, w), Some(bg), Some(fg));
            }
            ArrowType::FilledDiamond => {
                renderer.draw_polygon(&calculate_diamond(to, from, l, w), Some(fg), Some(fg));
            }
            ArrowType::HalfDiamond => {
                renderer.draw_polyline(&calculate_diamond(to, from, l, w)[1..], fg);
            }
            ArrowType::SlashedCross | ArrowType::SlashArrow => {
                let p = self.calculate(to, from);
                for pair in p.chunks_exact(2) {
                    renderer.draw_line(pair[0], pair[1], fg);
                }
            }
            ArrowType::Backslash => {
                let p = calculate_backslash(to, from, l, w);
                renderer.draw_line(p[0], p[1], fg);
            }
            ArrowType::Cross => {
                let p = calculate_arrow(to, from, l, w);
                renderer.draw_line(p[0], p[2], fg);
            }
            ArrowType::CrowFoot => {
                let p = calculate_crow(to, from, l, w);
                renderer.draw_line(p[0], p[1], fg);
                renderer.draw_line(p[0], p[2], fg);
            }
            ArrowType::FilledEllipse => {
                let (vl, vt) = back_frame(to, from);
                let path = ellipse_path(to, vl, vt, l + line_width, w + line_width);
                renderer.draw_beziergon(&path, Some(fg), None);
            }
            ArrowType::HollowEllipse => {
                let (vl, vt) = back_frame(to, from);
                renderer.draw_beziergon(&ellipse_path(to, vl, vt, l, w), Some(bg), Some(fg));
            }
            ArrowType::FilledDot => draw_dot(renderer, to, from, l, w, line_width, fg, None),
            ArrowType::BlankedDot => draw_dot(renderer, to, from, l, w, line_width, fg, Some(bg)),
            ArrowType::FilledBox => draw_box(renderer, to, from, l, w, line_width, fg, None),
            ArrowType::BlankedBox => draw_box(renderer, to, from, l, w, line_width, fg, Some(bg)),
            ArrowType::DoubleHollowTriangle | ArrowType::DoubleFilledTriangle => {
                let fill = if self.arrow_type == ArrowType::DoubleFilledTriangle {
                    fg
                } else {
                    bg
                };
                renderer.draw_polygon(&calculate_arrow(to, from, l, w), Some(fill), Some(fg));
                let (second_to, second_from) = double_arrow(to, from, l + line_width);
                renderer.draw_polygon(
                    &calculate_arrow(second_to, second_from, l, w),
                    Some(fill),
                    Some(fg),
                );
            }
            ArrowType::FilledConcave => {
                renderer.draw_polygon(&calculate_concave(to, from, l, w), Some(fg), Some(fg));
            }
            ArrowType::BlankedConcave => {
                renderer.draw_polygon(&calculate_concave(to, from, l, w), None, Some(fg));
            }
        }
    }
}

/// Dot with a bar across the line. `blank` is the inner color of a
/// hollow dot; a filled dot grows by the line width instead.
#[allow(clippy::too_many_arguments)]
fn draw_dot<R: Renderer + ?Sized>(
    renderer: &mut R,
    to: Point,
    from: Point,
    length: f64,
    width: f64,
    line_width: f64,
    fg: &Color,
    blank: Option<&Color>,
) {
    let grow = if blank.is_none() { line_width } else { 0.0 };
    let (vl, vt) = back_frame(to, from);
    let bs = to + vl * (length / 4.0);
    let be = bs - vt * (width / 2.0);
    let bs = bs + vt * (width / 2.0);
    let path = ellipse_path(to, vl, vt, (length + grow) / 2.0, (width + grow) / 2.0);
    match blank {
        None => renderer.draw_beziergon(&path, Some(fg), None),
        Some(bg) => {
            renderer.draw_beziergon(&path, Some(bg), None);
            renderer.draw_bezier(&path, fg);
        }
    }
    renderer.draw_line(bs, be, fg);
}

#[allow(clippy::too_many_arguments)]
fn draw_box<R: Renderer + ?Sized>(
    renderer: &mut R,
    to: Point,
    from: Point,
    length: f64,
    width: f64,
    line_width: f64,
    fg: &Color,
    blank: Option<&Color>,
) {
    let grow = if blank.is_none() { line_width } else { 0.0 };
    let p = calculate_box(to, from, length + grow, width + grow);
    match blank {
        None => renderer.draw_polygon(&p[..4], Some(fg), None),
        Some(bg) => renderer.draw_polygon(&p[..4], Some(bg), Some(fg)),
    }
    renderer.draw_line(p[4], p[5], fg);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn triangle_points() {
        let a = Arrow::new(ArrowType::FilledTriangle, 1.0, 1.0);
        let p = a.calculate(Point::new(10.0, 0.0), Point::new(0.0, 0.0));
        assert!(close(p[0], Point::new(9.0, 0.5)));
        assert!(close(p[1], Point::new(10.0, 0.0)));
        assert!(close(p[2], Point::new(9.0, -0.5)));
    }

    #[test]
    fn degenerate_direction_matches_x_axis() {
        let to = Point::new(3.0, 4.0);
        for t in ArrowType::ALL {
            let a = Arrow::new(t, 0.8, 0.6);
            let degenerate = a.calculate(to, to);
            let reference = a.calculate(to, to - Point::new(1.0, 0.0));
            assert_eq!(degenerate.len(), reference.len(), "{t:?}");
            for (d, r) in degenerate.iter().zip(&reference) {
                assert!(d.is_finite(), "{t:?}");
                assert!(close(*d, *r), "{t:?}: {d:?} vs {r:?}");
            }
        }
    }

    #[test]
    fn diamond_has_four_points() {
        let a = Arrow::new(ArrowType::HollowDiamond, 2.0, 1.0);
        let p = a.calculate(Point::ZERO, Point::new(-5.0, 0.0));
        assert_eq!(p.len(), 4);
        assert!(close(p[2], Point::new(-2.0, 0.0)));
    }

    #[test]
    fn codes_and_names_roundtrip() {
        for t in ArrowType::ALL {
            assert_eq!(ArrowType::from_code(t.code()), Some(t));
            assert_eq!(ArrowType::from_name(t.name()), Some(t));
        }
        assert_eq!(ArrowType::from_code(14), None);
    }

    #[test]
    fn tiny_arrows_are_removed() {
        let a = Arrow::new(ArrowType::Lines, 0.0005, 1.0);
        assert!(!a.is_visible());
        assert_eq!(a.sanitized(), Arrow::default());
        assert_eq!(a.arrow_point(Point::new(1.0, 0.0), Point::ZERO, 0.1), (Point::ZERO, Point::ZERO));
    }

    #[test]
    fn filled_triangle_pulls_line_back() {
        let a = Arrow::new(ArrowType::FilledTriangle, 0.5, 0.5);
        let (move_arrow, move_line) = a.arrow_point(Point::new(10.0, 0.0), Point::ZERO, 0.1);
        assert!(close(move_arrow, Point::new(0.05, 0.0)));
        assert!(close(move_line, Point::new(0.55, 0.0)));
    }

    #[test]
    fn bbox_covers_head() {
        let a = Arrow::new(ArrowType::FilledTriangle, 1.0, 1.0);
        let bb = a.bbox(0.0, Point::new(10.0, 0.0), Point::ZERO).unwrap();
        assert!(bb.contains_point(Point::new(9.0, 0.5)));
        assert!(bb.contains_point(Point::new(10.0, 0.0)));
        assert!(Arrow::default().bbox(0.1, Point::ZERO, Point::new(1.0, 0.0)).is_none());
    }
}
