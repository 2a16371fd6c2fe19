//! Bounding boxes of stroked lines, polylines and bezier paths.
//!
//! The "extras" describe how far the ink reaches past the geometric
//! path: `trans` is perpendicular to the path (half the line width, or an
//! arrow's half width), `long` is along it (line caps, arrow heads).

use crate::geometry::{BezPoint, Point, Rect, bezier_point, bezier_tangent};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineBBExtras {
    pub start_long: f64,
    pub start_trans: f64,
    pub end_long: f64,
    pub end_trans: f64,
}

impl LineBBExtras {
    /// Same reach at both ends and along the body.
    pub fn uniform(d: f64) -> Self {
        LineBBExtras {
            start_long: d,
            start_trans: d,
            end_long: d,
            end_trans: d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolyBBExtras {
    pub start_long: f64,
    pub start_trans: f64,
    pub middle_trans: f64,
    pub end_long: f64,
    pub end_trans: f64,
}

impl PolyBBExtras {
    pub fn uniform(d: f64) -> Self {
        PolyBBExtras {
            start_long: d,
            start_trans: d,
            middle_trans: d,
            end_long: d,
            end_trans: d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementBBExtras {
    pub border_trans: f64,
}

/// Add the four corners of the cap box around `vertex`, oriented along
/// `normed_dir`.
fn add_arrow_rectangle(rect: &mut Rect, vertex: Point, normed_dir: Point, extra_long: f64, extra_trans: f64) {
    let vl = normed_dir;
    let vt = vl.perp();
    let mut pt = vertex + vl * extra_long + vt * extra_trans;
    rect.add_point(pt);
    pt += vt * (-2.0 * extra_trans);
    rect.add_point(pt);
    pt += vl * (-2.0 * extra_long);
    rect.add_point(pt);
    pt += vt * (2.0 * extra_trans);
    rect.add_point(pt);
}

pub fn line_bbox(p1: Point, p2: Point, extra: &LineBBExtras) -> Rect {
    let mut rect = Rect::at_point(p1);
    rect.add_point(p2);
    let vl = (p1 - p2).normalize();
    add_arrow_rectangle(&mut rect, p1, vl, extra.start_long, extra.start_trans);
    add_arrow_rectangle(&mut rect, p2, -vl, extra.end_long, extra.end_trans);
    rect
}

pub fn rectangle_bbox(rin: &Rect, extra: &ElementBBExtras) -> Rect {
    rin.grow(extra.border_trans)
}

pub fn ellipse_bbox(centre: Point, width: f64, height: f64, extra: &ElementBBExtras) -> Rect {
    let rin = Rect::new(
        centre.x - width / 2.0,
        centre.y - height / 2.0,
        centre.x + width / 2.0,
        centre.y + height / 2.0,
    );
    rectangle_bbox(&rin, extra)
}

/// Parameters in [0, 1] where one coordinate of the cubic has an extremum.
fn cubic_extrema(p: [f64; 4]) -> Vec<f64> {
    let a = -p[0] + 3.0 * p[1] - 3.0 * p[2] + p[3];
    let b = 3.0 * p[0] - 6.0 * p[1] + 3.0 * p[2];
    let c = -3.0 * p[0] + 3.0 * p[1];
    let delta = 4.0 * b * b - 12.0 * a * c;
    let mut out = Vec::with_capacity(2);
    if delta < 0.0 {
        return out;
    }
    if a.abs() < 1e-6 {
        if b.abs() > f64::EPSILON {
            out.push(-c / (2.0 * b));
        }
    } else {
        out.push((-2.0 * b + delta.sqrt()) / (6.0 * a));
        if delta > 0.0 {
            out.push((-2.0 * b - delta.sqrt()) / (6.0 * a));
        }
    }
    out.retain(|u| (0.0..=1.0).contains(u));
    out
}

/// Bounding box of one cubic segment with end caps and body width.
pub fn bicubic_bbox(p0: Point, p1: Point, p2: Point, p3: Point, extra: &PolyBBExtras) -> Rect {
    let mut rect = Rect::at_point(p0);
    rect.add_point(p3);

    let mut vl = p0 - p1;
    if vl.len() == 0.0 {
        vl = p0 - p2;
    }
    add_arrow_rectangle(
        &mut rect,
        p0,
        vl.normalize(),
        extra.start_long,
        extra.start_trans.max(extra.middle_trans),
    );

    let mut vl = p3 - p2;
    if vl.len() == 0.0 {
        vl = p3 - p1;
    }
    add_arrow_rectangle(
        &mut rect,
        p3,
        vl.normalize(),
        extra.end_long,
        extra.end_trans.max(extra.middle_trans),
    );

    let mut params = cubic_extrema([p0.x, p1.x, p2.x, p3.x]);
    params.extend(cubic_extrema([p0.y, p1.y, p2.y, p3.y]));
    for u in params {
        let p = bezier_point(p0, p1, p2, p3, u);
        let vt = bezier_tangent(p0, p1, p2, p3, u).normalize().perp();
        rect.add_point(p + vt * extra.middle_trans);
        rect.add_point(p - vt * extra.middle_trans);
    }
    rect
}

/// Bounding box of a bezier path. Open paths get the start/end extras on
/// their first and last segment; closed paths use the body width
/// everywhere. Sharp joins grow the box by the miter overshoot.
pub fn bezier_bbox(pts: &[BezPoint], extra: &PolyBBExtras, closed: bool) -> Rect {
    let Some(BezPoint::MoveTo(first)) = pts.first() else {
        log::warn!("bezier bbox: path does not start with a move-to");
        return Rect::default();
    };
    let mut rect = Rect::at_point(*first);
    let n = pts.len();
    let mt = extra.middle_trans;

    let full_l = LineBBExtras {
        start_long: extra.start_long,
        start_trans: extra.start_trans.max(mt),
        end_long: extra.end_long,
        end_trans: extra.end_trans.max(mt),
    };
    let start_l = LineBBExtras {
        end_long: 0.0,
        end_trans: mt,
        ..full_l
    };
    let end_l = LineBBExtras {
        start_long: 0.0,
        start_trans: mt,
        ..full_l
    };
    let mid_l = LineBBExtras {
        start_long: 0.0,
        start_trans: mt,
        end_long: 0.0,
        end_trans: mt,
    };
    let full_b = PolyBBExtras {
        start_trans: extra.start_trans.max(mt),
        end_trans: extra.end_trans.max(mt),
        ..*extra
    };
    let start_b = PolyBBExtras {
        end_long: 0.0,
        end_trans: mt,
        ..*extra
    };
    let end_b = PolyBBExtras {
        start_long: 0.0,
        start_trans: mt,
        ..*extra
    };
    let mid_b = PolyBBExtras::uniform(mt);
    let mid_b = PolyBBExtras {
        start_long: 0.0,
        end_long: 0.0,
        ..mid_b
    };

    for i in 1..n {
        let mut next = (i + 1) % n;
        let mut prev = i - 1;
        if closed && next == 0 {
            next = 1;
        }
        if closed && prev == 0 {
            prev = n - 1;
        }
        let (vsc, vx, vp, curve) = match pts[i] {
            BezPoint::MoveTo(_) => continue,
            BezPoint::LineTo(p) => {
                let s = pts[prev].end();
                (s, p, s, None)
            }
            BezPoint::CurveTo(c1, c2, p) => (pts[prev].end(), p, c2, Some((c1, c2))),
        };
        let start = matches!(pts[prev], BezPoint::MoveTo(_));
        let end = matches!(pts[next], BezPoint::MoveTo(_)) || (!closed && i == n - 1);
        let vn = match pts[next] {
            BezPoint::MoveTo(p) | BezPoint::LineTo(p) => p,
            BezPoint::CurveTo(c1, _, _) => c1,
        };

        let (lx, bx) = if closed {
            (&full_l, &mid_b)
        } else {
            match (start, end) {
                (true, true) => (&full_l, &full_b),
                (true, false) => (&start_l, &start_b),
                (false, true) => (&end_l, &end_b),
                (false, false) => (&mid_l, &mid_b),
            }
        };
        let rt = match curve {
            None => line_bbox(vsc, vx, lx),
            Some((c1, c2)) => bicubic_bbox(vsc, c1, c2, vx, bx),
        };
        rect = rect.union(&rt);

        if !end {
            let vpx = (vx - vp).normalize();
            let vxn = (vn - vx).normalize();
            let co = vpx.dot(vxn);
            // cos(11°): anything sharper than that miters out
            if co > -0.9816 {
                let alpha = (-co).clamp(-1.0, 1.0).acos();
                let overshoot = if alpha > 0.0 && alpha < std::f64::consts::PI {
                    mt / (alpha / 2.0).sin()
                } else {
                    mt
                };
                let vovs = (vpx - vxn).normalize();
                rect.add_point(vx + vovs * overshoot);
            }
        }
    }
    rect
}

/// Bounding box of a polyline or polygon.
pub fn polyline_bbox(pts: &[Point], extra: &PolyBBExtras, closed: bool) -> Rect {
    let Some(&first) = pts.first() else {
        return Rect::default();
    };
    let mut bez = Vec::with_capacity(pts.len() + 1);
    bez.push(BezPoint::MoveTo(first));
    bez.extend(pts[1..].iter().map(|&p| BezPoint::LineTo(p)));
    if closed {
        bez.push(BezPoint::LineTo(first));
    }
    bezier_bbox(&bez, extra, closed)
}
