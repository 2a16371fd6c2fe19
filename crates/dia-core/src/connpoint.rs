//! Connection points: anchors on an object that other objects' handles
//! bind to.

use crate::geometry::Point;
use crate::id::ObjectId;
use smallvec::SmallVec;

/// Sides a connection may leave a point from. Routing hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Directions(pub u8);

impl Directions {
    pub const NONE: Directions = Directions(0);
    pub const NORTH: Directions = Directions(1);
    pub const EAST: Directions = Directions(2);
    pub const SOUTH: Directions = Directions(4);
    pub const WEST: Directions = Directions(8);
    pub const ALL: Directions = Directions(15);

    pub const fn union(self, other: Directions) -> Directions {
        Directions(self.0 | other.0)
    }

    pub const fn contains(self, other: Directions) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpFlags(pub u8);

impl CpFlags {
    pub const NONE: CpFlags = CpFlags(0);
    /// The object's main point, used when connecting to "the object".
    pub const MAIN: CpFlags = CpFlags(1);

    pub const fn contains(self, other: CpFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A handle on some object, by owner and handle index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleRef {
    pub object: ObjectId,
    pub handle: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionPoint {
    pub pos: Point,
    pub directions: Directions,
    pub flags: CpFlags,
    /// Handles bound here. Maintained by the diagram together with each
    /// handle's `connected_to`.
    pub(crate) connected: SmallVec<[HandleRef; 4]>,
}

impl ConnectionPoint {
    #[must_use]
    pub fn new(directions: Directions) -> Self {
        ConnectionPoint {
            directions,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn main() -> Self {
        ConnectionPoint {
            directions: Directions::ALL,
            flags: CpFlags::MAIN,
            ..Default::default()
        }
    }

    pub fn connected(&self) -> &[HandleRef] {
        &self.connected
    }

    pub fn is_main(&self) -> bool {
        self.flags.contains(CpFlags::MAIN)
    }
}
