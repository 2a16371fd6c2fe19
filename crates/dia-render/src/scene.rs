//! Diagram primitives → Vello drawing commands.
//!
//! Fills and strokes go straight into a `vello::Scene` as kurbo shapes.
//! The caller presents the scene via wgpu.

use dia_core::{Alignment, BezPoint, Color, Font, LineCaps, LineJoin, LineStyle, Point, Rect, Renderer};
use kurbo::{
    Affine, Arc as KurboArc, BezPath, Cap, Ellipse as KurboEllipse, Join, Line as KurboLine, Point as KurboPoint,
    Rect as KurboRect, RoundedRect, Stroke as KurboStroke, Vec2,
};
use peniko::{Color as PenikoColor, Fill};
use vello::Scene;

const ARC_TOLERANCE: f64 = 0.01;
const DOT_RATIO: f64 = 0.1;

/// Draws into a borrowed scene. `transform` maps diagram units to pixels.
pub struct VelloRenderer<'a> {
    scene: &'a mut Scene,
    transform: Affine,
    line_width: f64,
    caps: LineCaps,
    join: LineJoin,
    style: LineStyle,
    dash_length: f64,
    font: Font,
    font_height: f64,
}

impl<'a> VelloRenderer<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            transform: Affine::IDENTITY,
            line_width: 0.0,
            caps: LineCaps::default(),
            join: LineJoin::default(),
            style: LineStyle::default(),
            dash_length: 1.0,
            font: Font::SANS,
            font_height: 0.8,
        }
    }

    /// Uniform zoom about the diagram origin, then a pixel offset.
    #[must_use]
    pub fn with_zoom(mut self, zoom: f64, offset: Point) -> Self {
        self.transform = Affine::translate((offset.x, offset.y)) * Affine::scale(zoom);
        self
    }

    fn stroke_style(&self) -> KurboStroke {
        let cap = match self.caps {
            LineCaps::Butt => Cap::Butt,
            LineCaps::Round => Cap::Round,
            LineCaps::Projecting => Cap::Square,
        };
        let stroke = KurboStroke {
            width: self.line_width,
            join: match self.join {
                LineJoin::Miter => Join::Miter,
                LineJoin::Round => Join::Round,
                LineJoin::Bevel => Join::Bevel,
            },
            start_cap: cap,
            end_cap: cap,
            ..Default::default()
        };
        let pattern = dash_pattern(self.style, self.dash_length);
        if pattern.is_empty() {
            stroke
        } else {
            stroke.with_dashes(0.0, pattern)
        }
    }

    fn fill_shape<S: kurbo::Shape>(&mut self, shape: &S, color: &Color) {
        self.scene
            .fill(Fill::NonZero, self.transform, to_peniko(color), None, shape);
    }

    fn stroke_shape<S: kurbo::Shape>(&mut self, shape: &S, color: &Color) {
        let stroke = self.stroke_style();
        self.scene
            .stroke(&stroke, self.transform, to_peniko(color), None, shape);
    }

    fn paint<S: kurbo::Shape>(&mut self, shape: &S, fill: Option<&Color>, stroke: Option<&Color>) {
        if let Some(c) = fill {
            self.fill_shape(shape, c);
        }
        if let Some(c) = stroke {
            self.stroke_shape(shape, c);
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn to_peniko(c: &Color) -> PenikoColor {
    let (r, g, b, a) = c.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}

fn kp(p: Point) -> KurboPoint {
    KurboPoint::new(p.x, p.y)
}

/// Dash and gap lengths for a line style; empty for solid lines.
pub(crate) fn dash_pattern(style: LineStyle, dash: f64) -> Vec<f64> {
    let dot = dash * DOT_RATIO;
    match style {
        LineStyle::Solid => Vec::new(),
        LineStyle::Dashed => vec![dash, dash],
        LineStyle::DashDot => {
            let hole = (dash - dot) / 2.0;
            vec![dash, hole, dot, hole]
        }
        LineStyle::DashDotDot => {
            let hole = (dash - 2.0 * dot) / 3.0;
            vec![dash, hole, dot, hole, dot, hole]
        }
        LineStyle::Dotted => vec![dot, dot],
    }
}

/// Diagram arcs run counter-clockwise in degrees; kurbo angles are
/// radians in the y-down direction, so both flip sign.
pub(crate) fn arc_shape(center: Point, width: f64, height: f64, angle1: f64, angle2: f64) -> KurboArc {
    let mut sweep = (angle2 - angle1).rem_euclid(360.0);
    if sweep == 0.0 && angle2 != angle1 {
        sweep = 360.0;
    }
    KurboArc {
        center: kp(center),
        radii: Vec2::new(width / 2.0, height / 2.0),
        start_angle: -angle1.to_radians(),
        sweep_angle: -sweep.to_radians(),
        x_rotation: 0.0,
    }
}

fn arc_point(arc: &KurboArc, angle: f64) -> KurboPoint {
    arc.center + Vec2::new(arc.radii.x * angle.cos(), arc.radii.y * angle.sin())
}

fn bez_path(path: &[BezPoint], close: bool) -> BezPath {
    let mut bez = BezPath::new();
    for bp in path {
        match *bp {
            BezPoint::MoveTo(p) => bez.move_to(kp(p)),
            BezPoint::LineTo(p) => bez.line_to(kp(p)),
            BezPoint::CurveTo(a, b, p) => bez.curve_to(kp(a), kp(b), kp(p)),
        }
    }
    if close {
        bez.close_path();
    }
    bez
}

fn poly_path(points: &[Point], close: bool) -> BezPath {
    let mut bez = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        bez.move_to(kp(*first));
        for p in iter {
            bez.line_to(kp(*p));
        }
        if close {
            bez.close_path();
        }
    }
    bez
}

// ─── Renderer ────────────────────────────────────────────────────────────

impl Renderer for VelloRenderer<'_> {
    fn begin_render(&mut self, visible: Option<&Rect>) {
        log::debug!("vello pass over {visible:?}");
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
        let line = KurboLine::new(kp(start), kp(end));
        self.stroke_shape(&line, color);
    }

    fn draw_polyline(&mut self, points: &[Point], color: &Color) {
        if points.len() < 2 {
            return;
        }
        let path = poly_path(points, false);
        self.stroke_shape(&path, color);
    }

    fn draw_polygon(&mut self, points: &[Point], fill: Option<&Color>, stroke: Option<&Color>) {
        if points.len() < 2 {
            return;
        }
        let path = poly_path(points, true);
        self.paint(&path, fill, stroke);
    }

    fn draw_rect(&mut self, ul: Point, lr: Point, fill: Option<&Color>, stroke: Option<&Color>) {
        let rect = KurboRect::from_points(kp(ul), kp(lr));
        self.paint(&rect, fill, stroke);
    }

    fn draw_rounded_rect(&mut self, ul: Point, lr: Point, fill: Option<&Color>, stroke: Option<&Color>, radius: f64) {
        let shape: RoundedRect = KurboRect::from_points(kp(ul), kp(lr)).to_rounded_rect(radius.max(0.0));
        self.paint(&shape, fill, stroke);
    }

    fn draw_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color) {
        let arc = arc_shape(center, width, height, angle1, angle2);
        self.stroke_shape(&arc, color);
    }

    fn fill_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color) {
        let arc = arc_shape(center, width, height, angle1, angle2);
        let mut pie = BezPath::new();
        pie.move_to(kp(center));
        pie.line_to(arc_point(&arc, arc.start_angle));
        pie.extend(arc.append_iter(ARC_TOLERANCE));
        pie.close_path();
        self.fill_shape(&pie, color);
    }

    fn draw_ellipse(&mut self, center: Point, width: f64, height: f64, fill: Option<&Color>, stroke: Option<&Color>) {
        let shape = KurboEllipse::new(kp(center), (width / 2.0, height / 2.0), 0.0);
        self.paint(&shape, fill, stroke);
    }

    fn draw_bezier(&mut self, path: &[BezPoint], color: &Color) {
        let bez = bez_path(path, false);
        self.stroke_shape(&bez, color);
    }

    fn draw_beziergon(&mut self, path: &[BezPoint], fill: Option<&Color>, stroke: Option<&Color>) {
        let bez = bez_path(path, true);
        self.paint(&bez, fill, stroke);
    }

    fn draw_string(&mut self, text: &str, pos: Point, alignment: Alignment, _color: &Color) {
        log::trace!(
            "TEXT {:?} {:?} {} at ({}, {}) {:?}",
            text,
            self.font.family_name(),
            self.font_height,
            pos.x,
            pos.y,
            alignment
        );
        // Glyph shaping needs a font context; strings are not painted yet.
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn solid_lines_have_no_dashes() {
        assert!(dash_pattern(LineStyle::Solid, 1.0).is_empty());
        assert_eq!(dash_pattern(LineStyle::Dashed, 0.5), vec![0.5, 0.5]);
        let dd = dash_pattern(LineStyle::DashDot, 1.0);
        assert_eq!(dd.len(), 4);
        assert!((dd.iter().sum::<f64>() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn arc_angles_flip_to_y_down() {
        let arc = arc_shape(Point::ZERO, 2.0, 2.0, 0.0, 90.0);
        let end = arc_point(&arc, arc.start_angle + arc.sweep_angle);
        // a quarter turn counter-clockwise on screen ends above the centre
        assert!(end.x.abs() < 1e-9);
        assert!((end.y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn full_circle_arc_sweeps_all_the_way() {
        let arc = arc_shape(Point::ZERO, 2.0, 2.0, 0.0, 360.0);
        assert!((arc.sweep_angle.abs() - std::f64::consts::TAU).abs() < 1e-9);
    }

    #[test]
    fn draws_into_scene_without_panicking() {
        let mut scene = Scene::new();
        let mut r = VelloRenderer::new(&mut scene).with_zoom(20.0, Point::ZERO);
        r.set_linewidth(0.1);
        r.set_linestyle(LineStyle::Dotted, 1.0);
        r.draw_rounded_rect(Point::ZERO, Point::new(2.0, 1.0), Some(&Color::WHITE), Some(&Color::BLACK), 0.2);
        r.fill_arc(Point::ZERO, 1.0, 1.0, 0.0, 270.0, &Color::BLACK);
        r.draw_polygon(&[Point::ZERO], Some(&Color::BLACK), None);
        r.draw_string("ignored", Point::ZERO, Alignment::Left, &Color::BLACK);
    }
}
