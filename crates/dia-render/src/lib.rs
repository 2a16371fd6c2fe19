pub mod hit;
pub mod paint;
pub mod scene;
pub mod store;
pub mod svg;

pub use hit::{find_handle_at, find_object_at, objects_in_rect};
pub use paint::{render_diagram, render_svg};
pub use scene::VelloRenderer;
pub use store::{RenderOp, RenderStore};
pub use svg::SvgRenderer;
