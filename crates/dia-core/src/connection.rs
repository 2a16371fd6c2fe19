//! Base for line-like objects with two endpoints.
//!
//! Handles 0 and 1 are the start and end handles. Concrete shapes
//! mutate `endpoints`, then call [`Connection::update_handles`] and
//! [`Connection::update_boundingbox`] to sync the derived state.

use crate::boundingbox::{LineBBExtras, line_bbox};
use crate::data::{AttributeSet, DataValue, ObjectNode};
use crate::error::{DiaError, DiaResult};
use crate::geometry::Point;
use crate::handle::{Handle, HandleConnectType, HandleId, HandleMoveReason, HandleType};
use crate::id::ObjectId;
use crate::object::ObjectBase;

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub object: ObjectBase,
    pub endpoints: [Point; 2],
    pub extra_spacing: LineBBExtras,
}

impl Connection {
    /// A connection with `num_handles` handles (the first two are the
    /// endpoints) and `num_connections` unpositioned connection points.
    pub fn new(id: ObjectId, num_handles: usize, num_connections: usize) -> DiaResult<Self> {
        if num_handles < 2 {
            return Err(DiaError::TooFewHandles(num_handles));
        }
        Ok(Self::build(id, num_handles, num_connections))
    }

    /// A plain two-handle connection between `endpoints`.
    #[must_use]
    pub fn with_endpoints(id: ObjectId, endpoints: [Point; 2], num_connections: usize) -> Self {
        let mut conn = Self::build(id, 2, num_connections);
        conn.endpoints = endpoints;
        conn
    }

    fn build(id: ObjectId, num_handles: usize, num_connections: usize) -> Self {
        let mut object = ObjectBase::new(id);
        object.handles.push(Handle::new(
            HandleId::MoveStartPoint,
            HandleType::MajorControl,
            HandleConnectType::Connectable,
        ));
        object.handles.push(Handle::new(
            HandleId::MoveEndPoint,
            HandleType::MajorControl,
            HandleConnectType::Connectable,
        ));
        for i in 2..num_handles {
            object.handles.push(Handle::new(
                HandleId::Custom((i - 1) as u8),
                HandleType::MinorControl,
                HandleConnectType::NonConnectable,
            ));
        }
        object
            .connections
            .resize_with(num_connections, Default::default);
        Connection {
            object,
            endpoints: [Point::ZERO; 2],
            extra_spacing: LineBBExtras::default(),
        }
    }

    pub fn move_handle(&mut self, id: HandleId, to: Point, _reason: HandleMoveReason) -> DiaResult<()> {
        match id {
            HandleId::MoveStartPoint => self.endpoints[0] = to,
            HandleId::MoveEndPoint => self.endpoints[1] = to,
            _ => {
                log::warn!("connection {}: move_handle with {id:?}", self.object.id);
                return Err(DiaError::InvalidHandle {
                    object: "connection",
                    handle: id,
                });
            }
        }
        Ok(())
    }

    /// Translate both endpoints so the start lands on `to`.
    pub fn move_to(&mut self, to: Point) {
        let delta = to - self.endpoints[0];
        self.endpoints[0] = to;
        self.endpoints[1] += delta;
    }

    pub fn update_handles(&mut self) {
        for (i, &p) in self.endpoints.iter().enumerate() {
            let h = &mut self.object.handles[i];
            h.id = if i == 0 {
                HandleId::MoveStartPoint
            } else {
                HandleId::MoveEndPoint
            };
            h.pos = p;
        }
    }

    pub fn update_boundingbox(&mut self) {
        let bb = line_bbox(self.endpoints[0], self.endpoints[1], &self.extra_spacing);
        self.object.set_bounding_box(bb);
    }

    /// Copy under a new id. Links are never copied.
    #[must_use]
    pub fn copy_unlinked(&self, id: ObjectId) -> Self {
        let mut copy = self.clone();
        copy.object.relabel_unlinked(id);
        copy
    }

    pub fn save(&self, node: &mut ObjectNode) {
        self.object.save(node);
        node.add_many(
            "conn_endpoints",
            vec![DataValue::Point(self.endpoints[0]), DataValue::Point(self.endpoints[1])],
        );
    }

    /// Restore from `node`. Missing endpoints default to `(0,0)`/`(1,1)`.
    pub fn load(node: &ObjectNode, num_handles: usize, num_connections: usize) -> DiaResult<Self> {
        let mut conn = Connection::new(node.id, num_handles, num_connections)?;
        conn.object.load(node);
        let pts = node.get_points("conn_endpoints");
        conn.endpoints = [
            pts.first().copied().unwrap_or(Point::ZERO),
            pts.get(1).copied().unwrap_or(Point::new(1.0, 1.0)),
        ];
        Ok(conn)
    }
}
