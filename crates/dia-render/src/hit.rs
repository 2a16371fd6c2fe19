//! Hit testing: point → object lookup.
//!
//! Reverse-walks the draw order (front-to-back) so the object painted
//! last wins when several are under the pointer.

use dia_core::{Diagram, ObjectId, Point, Rect};

/// Find the topmost visible object within `max_dist` of `p`.
/// Returns `None` if nothing is hit (background).
pub fn find_object_at(dia: &Diagram, p: Point, max_dist: f64) -> Option<ObjectId> {
    let objects: Vec<_> = dia.visible_objects().collect();
    // Check in reverse (topmost first)
    objects
        .iter()
        .rev()
        .find(|obj| obj.distance_from(p) <= max_dist)
        .map(|obj| obj.id())
}

/// The handle closest to `p` among `candidates` (usually the selection),
/// if any lies within `max_dist`. Returns the owner and handle index.
pub fn find_handle_at(dia: &Diagram, candidates: &[ObjectId], p: Point, max_dist: f64) -> Option<(ObjectId, usize)> {
    let mut best: Option<(ObjectId, usize, f64)> = None;
    for &id in candidates {
        let Some(obj) = dia.get(id) else {
            continue;
        };
        for (i, h) in obj.handles().iter().enumerate() {
            let d = h.pos.distance(p);
            if d <= max_dist && best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((id, i, d));
            }
        }
    }
    best.map(|(id, i, _)| (id, i))
}

/// Every visible object whose bounding box lies fully inside `rect`.
/// Used for marquee (box) selection.
pub fn objects_in_rect(dia: &Diagram, rect: &Rect) -> Vec<ObjectId> {
    dia.visible_objects()
        .filter(|obj| rect.contains_rect(&obj.bounding_box()))
        .map(|obj| obj.id())
        .collect()
}
