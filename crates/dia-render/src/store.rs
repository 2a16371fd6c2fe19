//! Recording renderer.
//!
//! Every call is captured as a [`RenderOp`] so a draw pass can be
//! inspected, diffed in tests, or replayed into another backend later.

use dia_core::renderer::FillStyle;
use dia_core::{Alignment, BezPoint, Color, Font, LineCaps, LineJoin, LineStyle, Point, Rect, Renderer};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    Begin(Option<Rect>),
    End,
    LineWidth(f64),
    LineCaps(LineCaps),
    LineJoin(LineJoin),
    LineStyle(LineStyle, f64),
    FillStyle(FillStyle),
    Font(Font, f64),
    Line {
        start: Point,
        end: Point,
        color: Color,
    },
    Polyline {
        points: Vec<Point>,
        color: Color,
    },
    Polygon {
        points: Vec<Point>,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    Rect {
        ul: Point,
        lr: Point,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    RoundedRect {
        ul: Point,
        lr: Point,
        fill: Option<Color>,
        stroke: Option<Color>,
        radius: f64,
    },
    Arc {
        center: Point,
        width: f64,
        height: f64,
        angle1: f64,
        angle2: f64,
        color: Color,
        filled: bool,
    },
    Ellipse {
        center: Point,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    Bezier {
        path: Vec<BezPoint>,
        color: Color,
    },
    Beziergon {
        path: Vec<BezPoint>,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    String {
        text: String,
        pos: Point,
        alignment: Alignment,
        color: Color,
    },
}

/// A renderer that draws nothing and remembers everything.
#[derive(Debug, Default, Clone)]
pub struct RenderStore {
    ops: Vec<RenderOp>,
    interactive: bool,
}

impl RenderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that reports itself as an editing surface, so focused text
    /// draws its cursor.
    pub fn interactive() -> Self {
        Self {
            ops: Vec::new(),
            interactive: true,
        }
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn into_ops(self) -> Vec<RenderOp> {
        self.ops
    }

    /// Drawing ops only, without state changes or pass brackets.
    pub fn shapes(&self) -> impl Iterator<Item = &RenderOp> + '_ {
        self.ops.iter().filter(|op| {
            !matches!(
                op,
                RenderOp::Begin(_)
                    | RenderOp::End
                    | RenderOp::LineWidth(_)
                    | RenderOp::LineCaps(_)
                    | RenderOp::LineJoin(_)
                    | RenderOp::LineStyle(..)
                    | RenderOp::FillStyle(_)
                    | RenderOp::Font(..)
            )
        })
    }

    /// Feed the recorded calls into another renderer, in order.
    pub fn replay(&self, target: &mut dyn Renderer) {
        for op in &self.ops {
            match op {
                RenderOp::Begin(visible) => target.begin_render(visible.as_ref()),
                RenderOp::End => target.end_render(),
                RenderOp::LineWidth(w) => target.set_linewidth(*w),
                RenderOp::LineCaps(c) => target.set_linecaps(*c),
                RenderOp::LineJoin(j) => target.set_linejoin(*j),
                RenderOp::LineStyle(s, d) => target.set_linestyle(*s, *d),
                RenderOp::FillStyle(s) => target.set_fillstyle(*s),
                RenderOp::Font(f, h) => target.set_font(f, *h),
                RenderOp::Line { start, end, color } => target.draw_line(*start, *end, color),
                RenderOp::Polyline { points, color } => target.draw_polyline(points, color),
                RenderOp::Polygon { points, fill, stroke } => {
                    target.draw_polygon(points, fill.as_ref(), stroke.as_ref())
                }
                RenderOp::Rect { ul, lr, fill, stroke } => target.draw_rect(*ul, *lr, fill.as_ref(), stroke.as_ref()),
                RenderOp::RoundedRect {
                    ul,
                    lr,
                    fill,
                    stroke,
                    radius,
                } => target.draw_rounded_rect(*ul, *lr, fill.as_ref(), stroke.as_ref(), *radius),
                RenderOp::Arc {
                    center,
                    width,
                    height,
                    angle1,
                    angle2,
                    color,
                    filled,
                } => {
                    if *filled {
                        target.fill_arc(*center, *width, *height, *angle1, *angle2, color);
                    } else {
                        target.draw_arc(*center, *width, *height, *angle1, *angle2, color);
                    }
                }
                RenderOp::Ellipse {
                    center,
                    width,
                    height,
                    fill,
                    stroke,
                } => target.draw_ellipse(*center, *width, *height, fill.as_ref(), stroke.as_ref()),
                RenderOp::Bezier { path, color } => target.draw_bezier(path, color),
                RenderOp::Beziergon { path, fill, stroke } => {
                    target.draw_beziergon(path, fill.as_ref(), stroke.as_ref())
                }
                RenderOp::String {
                    text,
                    pos,
                    alignment,
                    color,
                } => target.draw_string(text, *pos, *alignment, color),
            }
        }
    }
}

impl Renderer for RenderStore {
    fn begin_render(&mut self, visible: Option<&Rect>) {
        self.ops.push(RenderOp::Begin(visible.copied()));
    }

    fn end_render(&mut self) {
        self.ops.push(RenderOp::End);
    }

    fn set_linewidth(&mut self, width: f64) {
        self.ops.push(RenderOp::LineWidth(width));
    }

    fn set_linecaps(&mut self, caps: LineCaps) {
        self.ops.push(RenderOp::LineCaps(caps));
    }

    fn set_linejoin(&mut self, join: LineJoin) {
        self.ops.push(RenderOp::LineJoin(join));
    }

    fn set_linestyle(&mut self, style: LineStyle, dash_length: f64) {
        self.ops.push(RenderOp::LineStyle(style, dash_length));
    }

    fn set_fillstyle(&mut self, style: FillStyle) {
        self.ops.push(RenderOp::FillStyle(style));
    }

    fn set_font(&mut self, font: &Font, height: f64) {
        self.ops.push(RenderOp::Font(*font, height));
    }

    fn draw_line(&mut self, start: Point, end: Point, color: &Color) {
        self.ops.push(RenderOp::Line {
            start,
            end,
            color: *color,
        });
    }

    fn draw_polyline(&mut self, points: &[Point], color: &Color) {
        self.ops.push(RenderOp::Polyline {
            points: points.to_vec(),
            color: *color,
        });
    }

    fn draw_polygon(&mut self, points: &[Point], fill: Option<&Color>, stroke: Option<&Color>) {
        self.ops.push(RenderOp::Polygon {
            points: points.to_vec(),
            fill: fill.copied(),
            stroke: stroke.copied(),
        });
    }

    fn draw_rect(&mut self, ul: Point, lr: Point, fill: Option<&Color>, stroke: Option<&Color>) {
        self.ops.push(RenderOp::Rect {
            ul,
            lr,
            fill: fill.copied(),
            stroke: stroke.copied(),
        });
    }

    fn draw_rounded_rect(&mut self, ul: Point, lr: Point, fill: Option<&Color>, stroke: Option<&Color>, radius: f64) {
        self.ops.push(RenderOp::RoundedRect {
            ul,
            lr,
            fill: fill.copied(),
            stroke: stroke.copied(),
            radius,
        });
    }

    fn draw_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color) {
        self.ops.push(RenderOp::Arc {
            center,
            width,
            height,
            angle1,
            angle2,
            color: *color,
            filled: false,
        });
    }

    fn fill_arc(&mut self, center: Point, width: f64, height: f64, angle1: f64, angle2: f64, color: &Color) {
        self.ops.push(RenderOp::Arc {
            center,
            width,
            height,
            angle1,
            angle2,
            color: *color,
            filled: true,
        });
    }

    fn draw_ellipse(&mut self, center: Point, width: f64, height: f64, fill: Option<&Color>, stroke: Option<&Color>) {
        self.ops.push(RenderOp::Ellipse {
            center,
            width,
            height,
            fill: fill.copied(),
            stroke: stroke.copied(),
        });
    }

    fn draw_bezier(&mut self, path: &[BezPoint], color: &Color) {
        self.ops.push(RenderOp::Bezier {
            path: path.to_vec(),
            color: *color,
        });
    }

    fn draw_beziergon(&mut self, path: &[BezPoint], fill: Option<&Color>, stroke: Option<&Color>) {
        self.ops.push(RenderOp::Beziergon {
            path: path.to_vec(),
            fill: fill.copied(),
            stroke: stroke.copied(),
        });
    }

    fn draw_string(&mut self, text: &str, pos: Point, alignment: Alignment, color: &Color) {
        self.ops.push(RenderOp::String {
            text: text.to_string(),
            pos,
            alignment,
            color: *color,
        });
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_in_call_order() {
        let mut store = RenderStore::new();
        store.begin_render(None);
        store.set_linewidth(0.2);
        store.draw_line(Point::ZERO, Point::new(1.0, 1.0), &Color::BLACK);
        store.end_render();
        assert_eq!(
            store.ops(),
            &[
                RenderOp::Begin(None),
                RenderOp::LineWidth(0.2),
                RenderOp::Line {
                    start: Point::ZERO,
                    end: Point::new(1.0, 1.0),
                    color: Color::BLACK,
                },
                RenderOp::End,
            ]
        );
        assert_eq!(store.shapes().count(), 1);
    }

    #[test]
    fn replay_reproduces_the_stream() {
        let mut store = RenderStore::new();
        store.set_font(&Font::SANS, 0.8);
        store.draw_rect(Point::ZERO, Point::new(2.0, 1.0), Some(&Color::WHITE), Some(&Color::BLACK));
        store.fill_arc(Point::ZERO, 1.0, 1.0, 0.0, 90.0, &Color::BLACK);
        store.draw_string("hi", Point::new(0.5, 0.5), Alignment::Center, &Color::BLACK);

        let mut copy = RenderStore::new();
        store.replay(&mut copy);
        assert_eq!(copy.ops(), store.ops());
    }

    #[test]
    fn composite_defaults_record_as_primitives() {
        let mut store = RenderStore::new();
        store.fill_ellipse(Point::ZERO, 2.0, 1.0, &Color::BLACK);
        assert_eq!(
            store.ops(),
            &[RenderOp::Ellipse {
                center: Point::ZERO,
                width: 2.0,
                height: 1.0,
                fill: Some(Color::BLACK),
                stroke: None,
            }]
        );
    }
}
