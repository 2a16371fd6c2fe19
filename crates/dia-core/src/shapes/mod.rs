//! The standard shapes: line, box, ellipse and free text.
//!
//! Each shape composes a base ([`Connection`](crate::connection::Connection),
//! [`Element`](crate::element::Element) or a bare
//! [`ObjectBase`](crate::object::ObjectBase)), keeps its own style fields,
//! and rederives everything else in `update_data`.

pub mod box_shape;
pub mod ellipse;
pub mod line;
pub mod text_object;

pub use box_shape::{BOX_TYPE, BoxShape};
pub use ellipse::{ELLIPSE_TYPE, Ellipse};
pub use line::{LINE_TYPE, Line};
pub use text_object::{TEXT_TYPE, TextObject};

use crate::arrows::{Arrow, ArrowType, DEFAULT_ARROW_SIZE};
use crate::data::{AttributeSet, ObjectNode};
use crate::object::ObjectType;
use crate::renderer::LineStyle;

pub const DEFAULT_DASH_LENGTH: f64 = 1.0;
pub const DEFAULT_LINE_WIDTH: f64 = 0.1;

pub static STANDARD_TYPES: [&ObjectType; 4] = [&LINE_TYPE, &BOX_TYPE, &ELLIPSE_TYPE, &TEXT_TYPE];

/// How a box-like shape constrains its proportions while resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aspect {
    #[default]
    Free,
    Fixed,
    /// Square for boxes, circle for ellipses.
    Square,
}

impl Aspect {
    pub fn code(self) -> i64 {
        match self {
            Aspect::Free => 0,
            Aspect::Fixed => 1,
            Aspect::Square => 2,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Aspect::Fixed,
            2 => Aspect::Square,
            _ => Aspect::Free,
        }
    }
}

// ─── Shared persistence ──────────────────────────────────────────────────

/// Dash length is only written for non-solid styles, and only when it
/// differs from the default.
pub(crate) fn save_line_style(node: &mut ObjectNode, style: LineStyle, dash_length: f64) {
    if style != LineStyle::Solid {
        node.add_enum("line_style", style.code());
        if dash_length != DEFAULT_DASH_LENGTH {
            node.add_real("dashlength", dash_length);
        }
    }
}

pub(crate) fn load_line_style(node: &ObjectNode) -> (LineStyle, f64) {
    (
        node.get_enum("line_style").map_or(LineStyle::Solid, LineStyle::from_code),
        node.get_real("dashlength").unwrap_or(DEFAULT_DASH_LENGTH),
    )
}

pub(crate) fn save_arrow(node: &mut ObjectNode, prefix: &str, arrow: &Arrow) {
    if arrow.arrow_type == ArrowType::None {
        return;
    }
    node.add_enum(prefix, arrow.arrow_type.code());
    node.add_real(&format!("{prefix}_length"), arrow.length);
    node.add_real(&format!("{prefix}_width"), arrow.width);
}

/// Read an arrow head; unknown kinds and heads too small to draw load as
/// no head.
pub(crate) fn load_arrow(node: &ObjectNode, prefix: &str) -> Arrow {
    let arrow_type = match node.get_enum(prefix) {
        None => ArrowType::None,
        Some(code) => ArrowType::from_code(code).unwrap_or_else(|| {
            log::warn!("{}: unknown arrow type {code} for {prefix}", node.id);
            ArrowType::None
        }),
    };
    let arrow = Arrow::new(
        arrow_type,
        node.get_real(&format!("{prefix}_length")).unwrap_or(DEFAULT_ARROW_SIZE),
        node.get_real(&format!("{prefix}_width")).unwrap_or(DEFAULT_ARROW_SIZE),
    );
    if arrow_type == ArrowType::None {
        arrow
    } else {
        arrow.sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ObjectId;

    #[test]
    fn line_style_defaults_are_omitted() {
        let mut node = ObjectNode::new("t", 0, ObjectId::intern("n"));
        save_line_style(&mut node, LineStyle::Solid, 3.0);
        assert!(node.attributes.is_empty());
        save_line_style(&mut node, LineStyle::Dashed, DEFAULT_DASH_LENGTH);
        assert!(node.has("line_style"));
        assert!(!node.has("dashlength"));
        assert_eq!(load_line_style(&node), (LineStyle::Dashed, DEFAULT_DASH_LENGTH));
    }

    #[test]
    fn tiny_arrow_loads_as_none() {
        let mut node = ObjectNode::new("t", 0, ObjectId::intern("n"));
        save_arrow(&mut node, "end_arrow", &Arrow::new(ArrowType::FilledTriangle, 0.0001, 0.5));
        assert_eq!(load_arrow(&node, "end_arrow").arrow_type, ArrowType::None);
        assert_eq!(load_arrow(&node, "start_arrow"), Arrow::default());
    }
}
