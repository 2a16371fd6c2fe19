//! Handles: the draggable control points of an object.

use crate::geometry::Point;
use crate::id::ObjectId;

/// Role of a handle on its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleId {
    ResizeNw,
    ResizeN,
    ResizeNe,
    ResizeW,
    ResizeE,
    ResizeSw,
    ResizeS,
    ResizeSe,
    MoveStartPoint,
    MoveEndPoint,
    /// Anchor of a standalone text object.
    Text,
    /// Shape-specific handle, numbered 1 to 9.
    Custom(u8),
}

impl HandleId {
    /// The eight resize handles in the order elements store them.
    pub const RESIZE: [HandleId; 8] = [
        HandleId::ResizeNw,
        HandleId::ResizeN,
        HandleId::ResizeNe,
        HandleId::ResizeW,
        HandleId::ResizeE,
        HandleId::ResizeSw,
        HandleId::ResizeS,
        HandleId::ResizeSe,
    ];

    pub fn resize_index(self) -> Option<usize> {
        Self::RESIZE.iter().position(|&h| h == self)
    }

    pub fn is_resize(self) -> bool {
        self.resize_index().is_some()
    }

    /// The resize handle diagonally or directly across the box.
    pub fn opposite(self) -> Option<HandleId> {
        self.resize_index().map(|i| Self::RESIZE[7 - i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleType {
    NonMovable,
    MajorControl,
    MinorControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleConnectType {
    NonConnectable,
    Connectable,
    /// Stays connected when the whole object is dragged.
    ConnectableNoBreak,
}

/// Why a handle is being moved. Shapes may treat the final user move and
/// cascaded moves differently from interactive drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMoveReason {
    UserMove,
    UserMoveFinal,
    ConnectedMove,
    CreateMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierKeys {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

impl ModifierKeys {
    pub const NONE: ModifierKeys = ModifierKeys {
        shift: false,
        control: false,
        alt: false,
    };
}

/// A connection point on another object: its owner and index into the
/// owner's connection point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
    pub object: ObjectId,
    pub point: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    pub id: HandleId,
    pub kind: HandleType,
    pub pos: Point,
    pub connect_type: HandleConnectType,
    /// Written only by the diagram's connect/disconnect, which keep the
    /// target's back-reference list in step.
    pub(crate) connected_to: Option<ConnectionTarget>,
}

impl Handle {
    #[must_use]
    pub fn new(id: HandleId, kind: HandleType, connect_type: HandleConnectType) -> Self {
        Handle {
            id,
            kind,
            pos: Point::ZERO,
            connect_type,
            connected_to: None,
        }
    }

    pub fn connected_to(&self) -> Option<ConnectionTarget> {
        self.connected_to
    }

    pub fn is_connectable(&self) -> bool {
        self.connect_type != HandleConnectType::NonConnectable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_resize_handles() {
        assert_eq!(HandleId::ResizeNw.opposite(), Some(HandleId::ResizeSe));
        assert_eq!(HandleId::ResizeN.opposite(), Some(HandleId::ResizeS));
        assert_eq!(HandleId::ResizeW.opposite(), Some(HandleId::ResizeE));
        assert_eq!(HandleId::MoveEndPoint.opposite(), None);
    }

    #[test]
    fn new_handle_is_unconnected() {
        let h = Handle::new(HandleId::MoveStartPoint, HandleType::MajorControl, HandleConnectType::Connectable);
        assert_eq!(h.connected_to(), None);
        assert!(h.is_connectable());
    }
}
