//! The object contract shared by every shape.
//!
//! [`ObjectBase`] holds what all objects have in common (id, anchor,
//! bounding box, handles, connection points). [`DiaObject`] is the
//! per-kind behaviour, dispatched through a trait object. [`ObjectType`]
//! is the static descriptor a type name resolves to in the
//! [`ObjectRegistry`].

use crate::attributes::Attributes;
use crate::connection::Connection;
use crate::connpoint::ConnectionPoint;
use crate::data::{AttributeSet, ObjectNode};
use crate::element::Element;
use crate::error::{DiaError, DiaResult};
use crate::geometry::{Point, Rect};
use crate::handle::{Handle, HandleId, HandleMoveReason, ModifierKeys};
use crate::id::ObjectId;
use crate::renderer::Renderer;
use crate::text::Text;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

// ─── Base ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectBase {
    pub id: ObjectId,
    /// Representative anchor; its meaning depends on the kind.
    pub position: Point,
    pub bounding_box: Rect,
    pub handles: SmallVec<[Handle; 8]>,
    pub connections: Vec<ConnectionPoint>,
}

impl ObjectBase {
    #[must_use]
    pub fn new(id: ObjectId) -> Self {
        ObjectBase {
            id,
            position: Point::ZERO,
            bounding_box: Rect::default(),
            handles: SmallVec::new(),
            connections: Vec::new(),
        }
    }

    pub fn handle(&self, index: usize) -> Option<&Handle> {
        self.handles.get(index)
    }

    pub fn handle_index(&self, id: HandleId) -> Option<usize> {
        self.handles.iter().position(|h| h.id == id)
    }

    pub fn connection_point(&self, index: usize) -> Option<&ConnectionPoint> {
        self.connections.get(index)
    }

    /// Store a bounding box, normalized.
    pub fn set_bounding_box(&mut self, bb: Rect) {
        self.bounding_box = bb.normalized();
    }

    /// Give this base a new id and drop every link in both directions.
    /// Copies never share connections with their source.
    pub fn relabel_unlinked(&mut self, id: ObjectId) {
        self.id = id;
        for h in &mut self.handles {
            h.connected_to = None;
        }
        for cp in &mut self.connections {
            cp.connected.clear();
        }
    }

    pub fn save(&self, node: &mut ObjectNode) {
        node.add_point("obj_pos", self.position);
        node.add_rect("obj_bb", self.bounding_box);
    }

    pub fn load(&mut self, node: &ObjectNode) {
        self.position = node.get_point("obj_pos").unwrap_or(Point::ZERO);
        self.bounding_box = node.get_rect("obj_bb").unwrap_or_default();
    }
}

// ─── Behaviour ───────────────────────────────────────────────────────────

/// Per-kind behaviour of a diagram object.
///
/// Mutating methods leave derived state (handles, connection points,
/// bounding box) stale until [`DiaObject::update_data`] runs; the
/// built-in shapes call it themselves at the end of every mutation.
pub trait DiaObject: fmt::Debug {
    fn object_type(&self) -> &'static ObjectType;

    fn base(&self) -> &ObjectBase;
    fn base_mut(&mut self) -> &mut ObjectBase;

    fn draw(&self, renderer: &mut dyn Renderer);

    /// Distance from `p` to the visible shape; 0 on or inside it.
    fn distance_from(&self, p: Point) -> f64;

    /// Move so that `position` becomes `to`.
    fn move_to(&mut self, to: Point);

    /// Drag `handle` to `to`. An id the object does not own is a caller
    /// error and leaves the object untouched.
    fn move_handle(
        &mut self,
        handle: HandleId,
        to: Point,
        reason: HandleMoveReason,
        modifiers: ModifierKeys,
    ) -> DiaResult<()>;

    /// Deep copy under a new id, with every link cleared.
    fn copy(&self, id: ObjectId) -> Box<dyn DiaObject>;

    fn save(&self, node: &mut ObjectNode);

    /// Recompute handles, connection points and bounding box from the
    /// object's own fields.
    fn update_data(&mut self);

    fn text(&self) -> Option<&Text> {
        None
    }

    fn text_mut(&mut self) -> Option<&mut Text> {
        None
    }

    fn connection(&self) -> Option<&Connection> {
        None
    }

    fn element(&self) -> Option<&Element> {
        None
    }

    fn element_mut(&mut self) -> Option<&mut Element> {
        None
    }

    /// Called when the object becomes selected at `clicked`.
    fn select(&mut self, _clicked: Point) {}

    fn id(&self) -> ObjectId {
        self.base().id
    }

    fn position(&self) -> Point {
        self.base().position
    }

    fn bounding_box(&self) -> Rect {
        self.base().bounding_box
    }

    fn handles(&self) -> &[Handle] {
        &self.base().handles
    }

    fn connection_points(&self) -> &[ConnectionPoint] {
        &self.base().connections
    }
}

// ─── Types ───────────────────────────────────────────────────────────────

/// Result of creating an object interactively: the object plus the handle
/// to connect at the press point and the handle the drag continues with.
#[derive(Debug)]
pub struct Created {
    pub object: Box<dyn DiaObject>,
    pub handle1: Option<HandleId>,
    pub handle2: Option<HandleId>,
}

pub type CreateFn = fn(start: Point, attrs: &Attributes, id: ObjectId) -> Created;
pub type LoadFn = fn(node: &ObjectNode, version: u32, attrs: &Attributes) -> DiaResult<Box<dyn DiaObject>>;

/// Static descriptor of an object kind.
pub struct ObjectType {
    pub name: &'static str,
    /// Newest version this build writes. Older files load with defaults
    /// for the fields they lack.
    pub version: u32,
    pub create: CreateFn,
    pub load: LoadFn,
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("version", &self.version)
            .finish()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Type-name lookup for creation and loading.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    types: HashMap<&'static str, &'static ObjectType>,
}

impl ObjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard line, box, ellipse and text.
    #[must_use]
    pub fn with_standard_shapes() -> Self {
        let mut reg = Self::new();
        for ty in crate::shapes::STANDARD_TYPES {
            reg.register(ty);
        }
        reg
    }

    pub fn register(&mut self, ty: &'static ObjectType) {
        if self.types.insert(ty.name, ty).is_some() {
            log::debug!("object type `{}` re-registered", ty.name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static ObjectType> {
        self.types.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }

    pub fn create(&self, name: &str, start: Point, attrs: &Attributes, id: ObjectId) -> DiaResult<Created> {
        let ty = self
            .get(name)
            .ok_or_else(|| DiaError::UnknownType(name.to_string()))?;
        Ok((ty.create)(start, attrs, id))
    }

    /// Build an object from its saved node. A version newer than the
    /// type's is loaded best-effort.
    pub fn load(&self, node: &ObjectNode, attrs: &Attributes) -> DiaResult<Box<dyn DiaObject>> {
        let ty = self
            .get(&node.type_name)
            .ok_or_else(|| DiaError::UnknownType(node.type_name.clone()))?;
        if node.version > ty.version {
            log::warn!(
                "{} {}: file version {} is newer than supported {}",
                ty.name,
                node.id,
                node.version,
                ty.version
            );
        }
        (ty.load)(node, node.version, attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connpoint::HandleRef;
    use crate::handle::{ConnectionTarget, HandleConnectType, HandleType};

    #[test]
    fn relabel_clears_links() {
        let mut base = ObjectBase::new(ObjectId::intern("a"));
        let mut h = Handle::new(HandleId::MoveStartPoint, HandleType::MajorControl, HandleConnectType::Connectable);
        h.connected_to = Some(ConnectionTarget {
            object: ObjectId::intern("b"),
            point: 0,
        });
        base.handles.push(h);
        let mut cp = ConnectionPoint::main();
        cp.connected.push(HandleRef {
            object: ObjectId::intern("c"),
            handle: 1,
        });
        base.connections.push(cp);

        base.relabel_unlinked(ObjectId::intern("copy"));
        assert_eq!(base.id.as_str(), "copy");
        assert_eq!(base.handles[0].connected_to(), None);
        assert!(base.connections[0].connected().is_empty());
    }

    #[test]
    fn registry_knows_standard_shapes() {
        let reg = ObjectRegistry::with_standard_shapes();
        for name in ["Standard - Line", "Standard - Box", "Standard - Ellipse", "Standard - Text"] {
            assert!(reg.get(name).is_some(), "{name}");
        }
        let err = reg
            .create("UML - Class", Point::ZERO, &Attributes::default(), ObjectId::numbered(0))
            .unwrap_err();
        assert!(matches!(err, DiaError::UnknownType(_)));
    }
}
