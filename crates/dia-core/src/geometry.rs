//! Geometry primitives: points, rectangles, bezier paths, and the
//! distance functions used for hit testing.
//!
//! Everything here is pure. Degenerate input never fails: zero-length
//! direction vectors normalize to `(1, 0)` and zero-length segments
//! measure distance to their start point.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Below this length a direction vector is treated as degenerate.
pub const DEGENERATE_EPSILON: f64 = 0.0001;

/// Number of straight segments a cubic bezier is flattened into.
pub const NBEZ_SEGS: usize = 10;

// ─── Point ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn len(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `(1, 0)` when the vector is
    /// too short (or not finite) to have a meaningful direction.
    pub fn normalize(self) -> Point {
        let len = self.len();
        if len <= DEGENERATE_EPSILON || !len.is_finite() {
            Point::new(1.0, 0.0)
        } else {
            Point::new(self.x / len, self.y / len)
        }
    }

    /// Perpendicular vector `(-y, x)`.
    pub fn perp(self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).len()
    }

    pub fn manhattan(self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

// ─── Rect ────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle. `left <= right` and `top <= bottom` hold for
/// every value built through `new`, `from_points` or `normalized`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Build a rectangle, swapping edges that are given inverted.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
        .normalized()
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        Rect::new(a.x, a.y, b.x, b.y)
    }

    /// A zero-size rectangle at `p`.
    pub fn at_point(p: Point) -> Self {
        Rect {
            left: p.x,
            top: p.y,
            right: p.x,
            bottom: p.y,
        }
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        Rect {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right, self.bottom)
    }

    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Overlap of two rectangles; an all-zero rectangle when they do not
    /// overlap.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Rect {
        let r = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        if r.right <= r.left || r.bottom <= r.top {
            Rect::default()
        } else {
            r
        }
    }

    /// Whether the rectangles touch or overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.top > other.bottom
            || self.bottom < other.top)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Whether `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    /// Grow the rectangle so that it includes `p`.
    pub fn add_point(&mut self, p: Point) {
        self.left = self.left.min(p.x);
        self.right = self.right.max(p.x);
        self.top = self.top.min(p.y);
        self.bottom = self.bottom.max(p.y);
    }

    #[must_use]
    pub fn grow(&self, d: f64) -> Rect {
        Rect::new(self.left - d, self.top - d, self.right + d, self.bottom + d)
    }

    #[must_use]
    pub fn translate(&self, delta: Point) -> Rect {
        Rect {
            left: self.left + delta.x,
            top: self.top + delta.y,
            right: self.right + delta.x,
            bottom: self.bottom + delta.y,
        }
    }

    /// Manhattan distance from `p` to the rectangle; 0 inside.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        let dx = if p.x < self.left {
            self.left - p.x
        } else if p.x > self.right {
            p.x - self.right
        } else {
            0.0
        };
        let dy = if p.y < self.top {
            self.top - p.y
        } else if p.y > self.bottom {
            p.y - self.bottom
        } else {
            0.0
        };
        dx + dy
    }
}

// ─── Line & polygon distances ────────────────────────────────────────────

/// Distance from `p` to the segment `start`..`end` drawn with `line_width`.
/// Points within half the line width measure 0.
pub fn distance_line_point(start: Point, end: Point, line_width: f64, p: Point) -> f64 {
    let v1 = end - start;
    let v1_lensq = v1.dot(v1);
    if v1_lensq < 0.000001 {
        return (p - start).len();
    }
    let v2 = p - start;
    let projlen = (v1.dot(v2) / v1_lensq).clamp(0.0, 1.0);
    let closest = start + v1 * projlen;
    let perp_dist = (p - closest).len() - line_width / 2.0;
    perp_dist.max(0.0)
}

/// Whether the segment crosses the horizontal ray running from `rayend`
/// towards positive x. Used for even-odd inside tests.
pub fn line_crosses_ray(line_start: Point, line_end: Point, rayend: Point) -> bool {
    let upward = line_start.y <= rayend.y && line_end.y > rayend.y;
    let downward = line_start.y > rayend.y && line_end.y <= rayend.y;
    if upward || downward {
        let vt = (rayend.y - line_start.y) / (line_end.y - line_start.y);
        return rayend.x < line_start.x + vt * (line_end.x - line_start.x);
    }
    false
}

/// Distance from `p` to a closed polygon outline; 0 inside.
pub fn distance_polygon_point(poly: &[Point], line_width: f64, p: Point) -> f64 {
    let Some(&last) = poly.last() else {
        return f64::MAX;
    };
    let mut prev = last;
    let mut line_dist = f64::MAX;
    let mut crossings = 0u32;
    for &pt in poly {
        if line_crosses_ray(prev, pt, p) {
            crossings += 1;
        }
        line_dist = line_dist.min(distance_line_point(prev, pt, line_width, p));
        prev = pt;
    }
    if crossings % 2 == 1 { 0.0 } else { line_dist }
}

/// Distance from `p` to the outline of an axis-aligned ellipse; 0 inside.
pub fn distance_ellipse_point(centre: Point, width: f64, height: f64, line_width: f64, p: Point) -> f64 {
    let w2 = width * width;
    let h2 = height * height;
    let d = p - centre;
    let (dx2, dy2) = (d.x * d.x, d.y * d.y);
    if dx2 <= 0.0 && dy2 <= 0.0 {
        return 0.0;
    }
    let scale = w2 * h2 / (4.0 * h2 * dx2 + 4.0 * w2 * dy2);
    let rad = ((dx2 + dy2) * scale).sqrt() + line_width / 2.0;
    let dist = (dx2 + dy2).sqrt();
    if dist <= rad { 0.0 } else { dist - rad }
}

// ─── Bezier paths ────────────────────────────────────────────────────────

/// One element of a bezier path. A path starts with `MoveTo`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BezPoint {
    MoveTo(Point),
    LineTo(Point),
    /// Two control points, then the end point.
    CurveTo(Point, Point, Point),
}

impl BezPoint {
    /// The point this element ends at.
    pub fn end(&self) -> Point {
        match *self {
            BezPoint::MoveTo(p) | BezPoint::LineTo(p) => p,
            BezPoint::CurveTo(_, _, p) => p,
        }
    }

    #[must_use]
    pub fn translate(&self, d: Point) -> BezPoint {
        match *self {
            BezPoint::MoveTo(p) => BezPoint::MoveTo(p + d),
            BezPoint::LineTo(p) => BezPoint::LineTo(p + d),
            BezPoint::CurveTo(a, b, c) => BezPoint::CurveTo(a + d, b + d, c + d),
        }
    }
}

/// Evaluate a cubic bezier at `t`.
pub fn bezier_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let it = 1.0 - t;
    p0 * (it * it * it) + p1 * (3.0 * t * it * it) + p2 * (3.0 * t * t * it) + p3 * (t * t * t)
}

/// First derivative of a cubic bezier at `t`.
pub fn bezier_tangent(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let it = 1.0 - t;
    (p1 - p0) * (3.0 * it * it) + (p2 - p1) * (6.0 * it * t) + (p3 - p2) * (3.0 * t * t)
}

/// Sample points of one cubic segment, start and end included.
fn flatten_curve(p0: Point, p1: Point, p2: Point, p3: Point) -> [Point; NBEZ_SEGS + 1] {
    let mut pts = [p0; NBEZ_SEGS + 1];
    for (i, pt) in pts.iter_mut().enumerate() {
        *pt = bezier_point(p0, p1, p2, p3, i as f64 / NBEZ_SEGS as f64);
    }
    pts
}

fn curve_distance(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    line_width: f64,
    p: Point,
    crossings: &mut u32,
) -> f64 {
    let pts = flatten_curve(p0, p1, p2, p3);
    let mut line_dist = f64::MAX;
    for seg in pts.windows(2) {
        line_dist = line_dist.min(distance_line_point(seg[0], seg[1], line_width, p));
        if line_crosses_ray(seg[0], seg[1], p) {
            *crossings += 1;
        }
    }
    line_dist
}

/// Distance from `p` to an open bezier path.
pub fn distance_bez_line_point(path: &[BezPoint], line_width: f64, p: Point) -> f64 {
    let Some(BezPoint::MoveTo(start)) = path.first() else {
        log::warn!("bezier path does not start with a move-to");
        return f64::MAX;
    };
    let mut last = *start;
    let mut line_dist = f64::MAX;
    let mut unused = 0;
    for bp in &path[1..] {
        match *bp {
            BezPoint::MoveTo(to) => last = to,
            BezPoint::LineTo(to) => {
                line_dist = line_dist.min(distance_line_point(last, to, line_width, p));
                last = to;
            }
            BezPoint::CurveTo(c1, c2, to) => {
                line_dist = line_dist.min(curve_distance(last, c1, c2, to, line_width, p, &mut unused));
                last = to;
            }
        }
    }
    line_dist
}

/// Distance from `p` to a closed bezier shape; 0 inside. An open final
/// subpath is closed with an implicit straight line.
pub fn distance_bez_shape_point(path: &[BezPoint], line_width: f64, p: Point) -> f64 {
    let Some(BezPoint::MoveTo(start)) = path.first() else {
        log::warn!("bezier shape does not start with a move-to");
        return f64::MAX;
    };
    let mut last = *start;
    let mut close_to = Some(*start);
    let mut line_dist = f64::MAX;
    let mut crossings = 0u32;
    for bp in &path[1..] {
        match *bp {
            BezPoint::MoveTo(to) => {
                last = to;
                close_to = Some(to);
            }
            BezPoint::LineTo(to) => {
                line_dist = line_dist.min(distance_line_point(last, to, line_width, p));
                if line_crosses_ray(last, to, p) {
                    crossings += 1;
                }
                last = to;
            }
            BezPoint::CurveTo(c1, c2, to) => {
                line_dist = line_dist.min(curve_distance(last, c1, c2, to, line_width, p, &mut crossings));
                last = to;
            }
        }
        if close_to == Some(last) {
            close_to = None;
        }
    }
    if let Some(close) = close_to {
        line_dist = line_dist.min(distance_line_point(last, close, line_width, p));
        if line_crosses_ray(last, close, p) {
            crossings += 1;
        }
    }
    if crossings % 2 == 1 { 0.0 } else { line_dist }
}

/// Flatten a bezier path to a polyline (move-tos start new runs but are
/// kept in sequence; callers use this for extents, not for drawing).
pub fn flatten_bezier(path: &[BezPoint]) -> Vec<Point> {
    let mut out = Vec::with_capacity(path.len() * NBEZ_SEGS);
    let mut last = Point::ZERO;
    for bp in path {
        match *bp {
            BezPoint::MoveTo(p) | BezPoint::LineTo(p) => {
                out.push(p);
                last = p;
            }
            BezPoint::CurveTo(c1, c2, to) => {
                out.extend_from_slice(&flatten_curve(last, c1, c2, to)[1..]);
                last = to;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_degenerate_vector_defaults_to_x_axis() {
        assert_eq!(Point::ZERO.normalize(), Point::new(1.0, 0.0));
        assert_eq!(Point::new(0.00005, 0.0).normalize(), Point::new(1.0, 0.0));
        assert_eq!(Point::new(f64::NAN, 1.0).normalize(), Point::new(1.0, 0.0));
        assert_eq!(Point::new(0.0, -3.0).normalize(), Point::new(0.0, -1.0));
    }

    #[test]
    fn rect_new_swaps_inverted_edges() {
        let r = Rect::new(10.0, 5.0, 0.0, 0.0);
        assert_eq!(r, Rect { left: 0.0, top: 0.0, right: 10.0, bottom: 5.0 });
    }

    #[test]
    fn union_is_commutative_and_idempotent() {
        let samples = [
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(-3.0, 2.0, 4.0, 2.5),
            Rect::new(10.0, 10.0, 10.0, 10.0),
            Rect::new(-1.0, -1.0, 0.5, 7.0),
        ];
        for a in &samples {
            for b in &samples {
                let ab = a.union(b);
                assert_eq!(ab, b.union(a));
                assert_eq!(ab.union(b), ab);
            }
        }
    }

    #[test]
    fn disjoint_intersection_is_all_zero() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(a.intersection(&b), Rect::default());
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&Rect::new(0.5, 0.5, 2.0, 2.0)), Rect::new(0.5, 0.5, 1.0, 1.0));
    }

    #[test]
    fn rect_point_distance_is_manhattan() {
        let r = Rect::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(r.distance_to_point(Point::new(1.0, 1.0)), 0.0);
        assert_eq!(r.distance_to_point(Point::new(3.0, 4.0)), 3.0);
    }

    #[test]
    fn line_distance_accounts_for_width_and_clamps() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(distance_line_point(a, b, 0.0, Point::new(5.0, 2.0)), 2.0);
        assert_eq!(distance_line_point(a, b, 1.0, Point::new(5.0, 2.0)), 1.5);
        assert_eq!(distance_line_point(a, b, 0.0, Point::new(13.0, 4.0)), 5.0);
        assert_eq!(distance_line_point(a, b, 10.0, Point::new(5.0, 2.0)), 0.0);
        // Degenerate segment measures to its start.
        assert_eq!(distance_line_point(a, a, 0.0, Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn polygon_inside_is_zero() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert_eq!(distance_polygon_point(&square, 0.0, Point::new(2.0, 2.0)), 0.0);
        assert_eq!(distance_polygon_point(&square, 0.0, Point::new(6.0, 2.0)), 2.0);
    }

    #[test]
    fn ellipse_distance() {
        let c = Point::new(0.0, 0.0);
        assert_eq!(distance_ellipse_point(c, 4.0, 2.0, 0.0, c), 0.0);
        assert_eq!(distance_ellipse_point(c, 4.0, 2.0, 0.0, Point::new(1.0, 0.0)), 0.0);
        let d = distance_ellipse_point(c, 4.0, 2.0, 0.0, Point::new(5.0, 0.0));
        assert!((d - 3.0).abs() < 1e-9);
    }

    #[test]
    fn bezier_endpoints_and_distance() {
        let p0 = Point::new(0.0, 0.0);
        let p3 = Point::new(3.0, 0.0);
        let c1 = Point::new(1.0, 0.0);
        let c2 = Point::new(2.0, 0.0);
        assert_eq!(bezier_point(p0, c1, c2, p3, 0.0), p0);
        assert_eq!(bezier_point(p0, c1, c2, p3, 1.0), p3);
        let path = [BezPoint::MoveTo(p0), BezPoint::CurveTo(c1, c2, p3)];
        assert!(distance_bez_line_point(&path, 0.0, Point::new(1.5, 1.0)) < 1.0 + 1e-9);
        assert_eq!(distance_bez_line_point(&[], 0.0, p0), f64::MAX);
    }

    #[test]
    fn bez_shape_inside_is_zero() {
        let path = [
            BezPoint::MoveTo(Point::new(0.0, 0.0)),
            BezPoint::LineTo(Point::new(4.0, 0.0)),
            BezPoint::LineTo(Point::new(4.0, 4.0)),
            BezPoint::LineTo(Point::new(0.0, 4.0)),
        ];
        assert_eq!(distance_bez_shape_point(&path, 0.0, Point::new(1.0, 1.0)), 0.0);
        assert_eq!(distance_bez_shape_point(&path, 0.0, Point::new(-1.0, 1.0)), 1.0);
    }
}
