//! The diagram: an arena of objects, their layers, and the links between
//! handles and connection points.
//!
//! Objects live as nodes of a `StableDiGraph`. Every link is mirrored
//! three ways: the handle's `connected_to`, the connection point's
//! `connected` list, and a graph edge from the dependent object to the
//! anchor. Only [`Diagram::connect`] and [`Diagram::disconnect`] write
//! links, and they always update all three together.

use crate::color::Color;
use crate::connpoint::HandleRef;
use crate::error::{DiaError, DiaResult};
use crate::geometry::{Point, Rect};
use crate::handle::{ConnectionTarget, HandleMoveReason, ModifierKeys};
use crate::id::ObjectId;
use crate::lint::{LinkDiagnostic, check_links};
use crate::object::DiaObject;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::{HashMap, HashSet, VecDeque};

/// Connected handles closer than this to their point are left alone by
/// the cascade.
pub const CASCADE_THRESHOLD: f64 = 0.001;

/// Edge weight: handle `handle` of the source is bound to point `point`
/// of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub handle: usize,
    pub point: usize,
}

/// A link spelled out by object ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkRecord {
    pub object: ObjectId,
    pub handle: usize,
    pub target: ConnectionTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    objects: Vec<ObjectId>,
}

impl Layer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Layer {
            name: name.into(),
            visible: true,
            objects: Vec::new(),
        }
    }

    /// Object ids in draw order, bottom first.
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }
}

/// An object taken out of the diagram, with enough context to put it
/// back where it was.
#[derive(Debug)]
pub struct Removed {
    pub object: Box<dyn DiaObject>,
    pub layer: usize,
    pub position: usize,
    /// Links that were cut, both its own handles and handles bound to it.
    pub links: Vec<LinkRecord>,
}

#[derive(Debug)]
pub struct Diagram {
    graph: StableDiGraph<Box<dyn DiaObject>, Link>,
    index: HashMap<ObjectId, NodeIndex>,
    layers: Vec<Layer>,
    active_layer: usize,
    next_serial: u64,
    pub background: Color,
    pub cascade_threshold: f64,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    /// An empty diagram with a single "Background" layer.
    #[must_use]
    pub fn new() -> Self {
        Diagram {
            graph: StableDiGraph::new(),
            index: HashMap::new(),
            layers: vec![Layer::new("Background")],
            active_layer: 0,
            next_serial: 0,
            background: Color::WHITE,
            cascade_threshold: CASCADE_THRESHOLD,
        }
    }

    pub fn graph(&self) -> &StableDiGraph<Box<dyn DiaObject>, Link> {
        &self.graph
    }

    pub fn index_of(&self, id: ObjectId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    fn node(&self, id: ObjectId) -> DiaResult<NodeIndex> {
        self.index_of(id).ok_or(DiaError::UnknownObject(id))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn DiaObject> {
        self.index_of(id)
            .and_then(|i| self.graph.node_weight(i))
            .map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut dyn DiaObject> {
        let idx = self.index_of(id)?;
        match self.graph.node_weight_mut(idx) {
            Some(b) => Some(b.as_mut()),
            None => None,
        }
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Append a layer on top and return its index.
    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        self.layers.push(Layer::new(name));
        self.layers.len() - 1
    }

    pub fn rename_layer(&mut self, layer: usize, name: impl Into<String>) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.name = name.into();
        }
    }

    pub fn set_layer_visible(&mut self, layer: usize, visible: bool) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.visible = visible;
        }
    }

    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, layer: usize) {
        if layer < self.layers.len() {
            self.active_layer = layer;
        } else {
            log::warn!("no layer #{layer}, keeping #{}", self.active_layer);
        }
    }

    pub fn layer_of(&self, id: ObjectId) -> Option<usize> {
        self.layers.iter().position(|l| l.objects.contains(&id))
    }

    /// Every object in draw order: layer by layer, bottom first.
    pub fn objects(&self) -> impl Iterator<Item = &dyn DiaObject> + '_ {
        self.layers
            .iter()
            .flat_map(|l| l.objects.iter())
            .filter_map(|&id| self.get(id))
    }

    /// Objects of visible layers, in draw order.
    pub fn visible_objects(&self) -> impl Iterator<Item = &dyn DiaObject> + '_ {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .flat_map(|l| l.objects.iter())
            .filter_map(|&id| self.get(id))
    }

    // ─── Objects ─────────────────────────────────────────────────────────

    /// A fresh `O<n>` id not used by any object.
    pub fn next_id(&mut self) -> ObjectId {
        loop {
            let id = ObjectId::numbered(self.next_serial);
            self.next_serial += 1;
            if !self.contains(id) {
                return id;
            }
        }
    }

    /// Add on top of the active layer.
    pub fn add_object(&mut self, object: Box<dyn DiaObject>) -> DiaResult<ObjectId> {
        self.insert_object(object, self.active_layer, None)
    }

    /// Add to `layer` at draw position `position` (top when `None`).
    /// Links carried by the object are dropped; use [`Diagram::connect`].
    pub fn insert_object(
        &mut self,
        mut object: Box<dyn DiaObject>,
        layer: usize,
        position: Option<usize>,
    ) -> DiaResult<ObjectId> {
        let id = object.id();
        if self.contains(id) {
            return Err(DiaError::DuplicateObject(id));
        }
        object.base_mut().relabel_unlinked(id);
        if let Some(n) = id.serial() {
            self.next_serial = self.next_serial.max(n + 1);
        }
        let layer = layer.min(self.layers.len() - 1);
        let idx = self.graph.add_node(object);
        self.index.insert(id, idx);
        let objects = &mut self.layers[layer].objects;
        let at = position.unwrap_or(objects.len()).min(objects.len());
        objects.insert(at, id);
        Ok(id)
    }

    /// Take an object out, cutting every link to and from it first.
    pub fn remove_object(&mut self, id: ObjectId) -> DiaResult<Removed> {
        let idx = self.node(id)?;
        let links = self.disconnect_all(id)?;
        let (layer, position) = self
            .layers
            .iter()
            .enumerate()
            .find_map(|(li, l)| l.objects.iter().position(|&o| o == id).map(|p| (li, p)))
            .unwrap_or((self.active_layer, 0));
        self.layers[layer].objects.retain(|&o| o != id);
        self.index.remove(&id);
        let object = self.graph.remove_node(idx).ok_or(DiaError::UnknownObject(id))?;
        Ok(Removed {
            object,
            layer,
            position,
            links,
        })
    }

    /// Put a removed object back, relinking what still can be.
    pub fn restore(&mut self, removed: Removed) -> DiaResult<ObjectId> {
        let id = self.insert_object(removed.object, removed.layer, Some(removed.position))?;
        for link in removed.links {
            if let Err(e) = self.connect(link.object, link.handle, link.target) {
                log::warn!("restoring {id}: link {}#{} not restored: {e}", link.object, link.handle);
            }
        }
        Ok(id)
    }

    // ─── Links ───────────────────────────────────────────────────────────

    /// Bind handle `handle` of `object` to `target`. A handle already
    /// bound elsewhere is disconnected first.
    pub fn connect(&mut self, object: ObjectId, handle: usize, target: ConnectionTarget) -> DiaResult<()> {
        if object == target.object {
            return Err(DiaError::SelfConnection(object));
        }
        let from = self.node(object)?;
        let to = self.node(target.object)?;
        let h = self.graph[from]
            .handles()
            .get(handle)
            .ok_or(DiaError::NoSuchHandle { object, index: handle })?;
        if !h.is_connectable() {
            log::warn!("{object}: handle #{handle} ({:?}) is not connectable", h.id);
            return Err(DiaError::NotConnectable { object, handle });
        }
        let already = h.connected_to();
        if target.point >= self.graph[to].connection_points().len() {
            return Err(DiaError::NoSuchConnectionPoint {
                object: target.object,
                index: target.point,
            });
        }
        if already == Some(target) {
            return Ok(());
        }
        if already.is_some() {
            self.disconnect(object, handle)?;
        }

        self.graph[from].base_mut().handles[handle].connected_to = Some(target);
        self.graph[to].base_mut().connections[target.point]
            .connected
            .push(HandleRef { object, handle });
        self.graph.add_edge(
            from,
            to,
            Link {
                handle,
                point: target.point,
            },
        );
        log::debug!("connect {object}#{handle} -> {}@{}", target.object, target.point);
        Ok(())
    }

    /// Unbind a handle. Returns the point it was bound to, if any.
    pub fn disconnect(&mut self, object: ObjectId, handle: usize) -> DiaResult<Option<ConnectionTarget>> {
        let from = self.node(object)?;
        let target = self.graph[from]
            .handles()
            .get(handle)
            .ok_or(DiaError::NoSuchHandle { object, index: handle })?
            .connected_to();
        let Some(target) = target else {
            return Ok(None);
        };
        self.graph[from].base_mut().handles[handle].connected_to = None;

        if let Some(to) = self.index_of(target.object) {
            let me = HandleRef { object, handle };
            if let Some(cp) = self.graph[to].base_mut().connections.get_mut(target.point) {
                cp.connected.retain(|r| *r != me);
            }
            let edge = self
                .graph
                .edges(from)
                .find(|e| e.target() == to && e.weight().handle == handle)
                .map(|e| e.id());
            if let Some(edge) = edge {
                self.graph.remove_edge(edge);
            }
        }
        log::debug!("disconnect {object}#{handle} from {}@{}", target.object, target.point);
        Ok(Some(target))
    }

    /// Cut every link of `id`: its own handles and handles bound to its
    /// connection points.
    pub fn disconnect_all(&mut self, id: ObjectId) -> DiaResult<Vec<LinkRecord>> {
        let idx = self.node(id)?;
        let own: Vec<(usize, ConnectionTarget)> = self.graph[idx]
            .handles()
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.connected_to().map(|t| (i, t)))
            .collect();
        let incoming: Vec<(HandleRef, usize)> = self.graph[idx]
            .connection_points()
            .iter()
            .enumerate()
            .flat_map(|(p, cp)| cp.connected().iter().map(move |r| (*r, p)))
            .collect();

        let mut links = Vec::with_capacity(own.len() + incoming.len());
        for (handle, target) in own {
            self.disconnect(id, handle)?;
            links.push(LinkRecord {
                object: id,
                handle,
                target,
            });
        }
        for (r, point) in incoming {
            if let Err(e) = self.disconnect(r.object, r.handle) {
                log::warn!("{id}: dropping stale back-reference {}#{}: {e}", r.object, r.handle);
                continue;
            }
            links.push(LinkRecord {
                object: r.object,
                handle: r.handle,
                target: ConnectionTarget { object: id, point },
            });
        }
        if let Some(obj) = self.graph.node_weight_mut(idx) {
            for cp in &mut obj.base_mut().connections {
                cp.connected.clear();
            }
        }
        Ok(links)
    }

    /// All links, read from the graph edges.
    pub fn links(&self) -> Vec<LinkRecord> {
        self.graph
            .edge_references()
            .map(|e| LinkRecord {
                object: self.graph[e.source()].id(),
                handle: e.weight().handle,
                target: ConnectionTarget {
                    object: self.graph[e.target()].id(),
                    point: e.weight().point,
                },
            })
            .collect()
    }

    /// Objects with a handle bound to one of `id`'s connection points.
    pub fn dependents(&self, id: ObjectId) -> Vec<ObjectId> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        let mut out: Vec<ObjectId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].id())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Translate objects by `delta`, then drag along whatever is bound to
    /// them.
    pub fn move_objects(&mut self, ids: &[ObjectId], delta: Point) -> DiaResult<()> {
        for &id in ids {
            self.node(id)?;
        }
        for &id in ids {
            if let Some(obj) = self.get_mut(id) {
                let to = obj.position() + delta;
                obj.move_to(to);
                obj.update_data();
            }
        }
        self.cascade(ids);
        Ok(())
    }

    /// Move handle `handle` of `id` to `to`. Returns where it was.
    pub fn move_handle(
        &mut self,
        id: ObjectId,
        handle: usize,
        to: Point,
        reason: HandleMoveReason,
        modifiers: ModifierKeys,
    ) -> DiaResult<Point> {
        let obj = self.get_mut(id).ok_or(DiaError::UnknownObject(id))?;
        let h = obj
            .handles()
            .get(handle)
            .ok_or(DiaError::NoSuchHandle { object: id, index: handle })?;
        let (hid, from) = (h.id, h.pos);
        obj.move_handle(hid, to, reason, modifiers)?;
        obj.update_data();
        self.cascade(&[id]);
        Ok(from)
    }

    /// Re-derive `id` after its fields were edited in place, then cascade.
    pub fn update_object(&mut self, id: ObjectId) -> DiaResult<()> {
        self.get_mut(id).ok_or(DiaError::UnknownObject(id))?.update_data();
        self.cascade(&[id]);
        Ok(())
    }

    /// Move every handle bound to a connection point of `moved` onto that
    /// point, and recurse into the objects that moved as a result. Each
    /// object is expanded at most once, so cyclic links terminate.
    /// Dependents inside `moved` are skipped: they moved with it.
    pub fn cascade(&mut self, moved: &[ObjectId]) {
        let skip: HashSet<ObjectId> = moved.iter().copied().collect();
        let mut visited = skip.clone();
        let mut queue: VecDeque<ObjectId> = moved.iter().copied().collect();
        let threshold = self.cascade_threshold;

        while let Some(id) = queue.pop_front() {
            let Some(obj) = self.get(id) else { continue };
            let pending: Vec<(HandleRef, Point)> = obj
                .connection_points()
                .iter()
                .flat_map(|cp| cp.connected().iter().map(move |r| (*r, cp.pos)))
                .collect();

            for (r, pos) in pending {
                if skip.contains(&r.object) {
                    continue;
                }
                let Some(dep) = self.get_mut(r.object) else {
                    log::warn!("{id}: back-reference to missing object {}", r.object);
                    continue;
                };
                let Some(h) = dep.handles().get(r.handle) else {
                    continue;
                };
                if h.pos.distance(pos) <= threshold {
                    continue;
                }
                let hid = h.id;
                if let Err(e) = dep.move_handle(hid, pos, HandleMoveReason::ConnectedMove, ModifierKeys::NONE) {
                    log::warn!("cascade into {}: {e}", r.object);
                    continue;
                }
                dep.update_data();
                log::trace!("cascade {id} -> {}#{} at {pos:?}", r.object, r.handle);
                if visited.insert(r.object) {
                    queue.push_back(r.object);
                }
            }
        }
    }

    /// Union of the bounding boxes of visible objects.
    pub fn extents(&self) -> Rect {
        self.visible_objects()
            .map(|o| o.bounding_box())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }

    /// Nearest connection point within `max_dist` of `p`, skipping the
    /// points of `exclude`.
    pub fn find_connection_point(
        &self,
        p: Point,
        max_dist: f64,
        exclude: Option<ObjectId>,
    ) -> Option<(ConnectionTarget, f64)> {
        let mut best: Option<(ConnectionTarget, f64)> = None;
        for obj in self.visible_objects() {
            if Some(obj.id()) == exclude {
                continue;
            }
            for (i, cp) in obj.connection_points().iter().enumerate() {
                let d = cp.pos.distance(p);
                if d <= max_dist && best.is_none_or(|(_, bd)| d < bd) {
                    best = Some((
                        ConnectionTarget {
                            object: obj.id(),
                            point: i,
                        },
                        d,
                    ));
                }
            }
        }
        best
    }

    /// Link consistency findings; empty for a healthy diagram.
    pub fn check_links(&self) -> Vec<LinkDiagnostic> {
        check_links(self)
    }
}
