//! Diagram → renderer pass.
//!
//! Walks visible layers bottom first and hands each object the renderer,
//! skipping objects whose bounding box misses the visible region.

use crate::svg::SvgRenderer;
use dia_core::{Diagram, Rect, Renderer};

/// Margin around the diagram extents in a standalone export.
pub const EXPORT_MARGIN: f64 = 1.0;

/// Draw the diagram. `visible` limits the pass to objects touching that
/// region; `None` draws everything on visible layers.
pub fn render_diagram(dia: &Diagram, renderer: &mut dyn Renderer, visible: Option<&Rect>) -> usize {
    renderer.begin_render(visible);
    let mut drawn = 0;
    for obj in dia.visible_objects() {
        if let Some(v) = visible
            && !obj.bounding_box().intersects(v)
        {
            log::trace!("{} culled", obj.id());
            continue;
        }
        obj.draw(renderer);
        drawn += 1;
    }
    renderer.end_render();
    log::debug!("rendered {drawn} of {} objects", dia.len());
    drawn
}

/// Export the whole diagram as a standalone SVG document.
pub fn render_svg(dia: &Diagram) -> String {
    let view = dia.extents().grow(EXPORT_MARGIN);
    let mut svg = SvgRenderer::new();
    svg.begin_render(Some(&view));
    for obj in dia.visible_objects() {
        obj.draw(&mut svg);
    }
    svg.end_render();
    svg.finish()
}
