pub mod arrows;
pub mod attributes;
pub mod boundingbox;
pub mod change;
pub mod color;
pub mod connection;
pub mod connpoint;
pub mod data;
pub mod diagram;
pub mod element;
pub mod emitter;
pub mod error;
pub mod file;
pub mod font;
pub mod geometry;
pub mod handle;
pub mod id;
pub mod lint;
pub mod object;
pub mod parser;
pub mod renderer;
pub mod shapes;
pub mod text;

pub use arrows::{Arrow, ArrowType};
pub use attributes::Attributes;
pub use change::ObjectChange;
pub use color::Color;
pub use connection::Connection;
pub use connpoint::{ConnectionPoint, Directions, HandleRef};
pub use diagram::{Diagram, Layer, LinkRecord};
pub use element::{Element, ElementGeometry};
pub use error::{DiaError, DiaResult};
pub use file::{load_bytes, load_file, load_str, save_bytes, save_file, save_string};
pub use font::{Font, FontMetrics};
pub use geometry::{BezPoint, Point, Rect};
pub use handle::{ConnectionTarget, Handle, HandleId, HandleMoveReason, ModifierKeys};
pub use id::ObjectId;
pub use lint::{LintSeverity, LinkDiagnostic, check_links};
pub use object::{Created, DiaObject, ObjectRegistry, ObjectType};
pub use renderer::{Alignment, LineCaps, LineJoin, LineStyle, Renderer};
pub use text::{Key, Text, TextChange};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::stable_graph::NodeIndex;
