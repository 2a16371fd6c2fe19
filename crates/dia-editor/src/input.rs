//! Pointer and keyboard events, in diagram coordinates.

use dia_core::{Key, ModifierKeys, Point};

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Point, modifiers: ModifierKeys },
    PointerMove { pos: Point, modifiers: ModifierKeys },
    PointerUp { pos: Point, modifiers: ModifierKeys },
    Key { key: Key, modifiers: ModifierKeys },
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        InputEvent::PointerDown {
            pos: Point::new(x, y),
            modifiers: ModifierKeys::NONE,
        }
    }

    pub fn drag(x: f64, y: f64) -> Self {
        InputEvent::PointerMove {
            pos: Point::new(x, y),
            modifiers: ModifierKeys::NONE,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        InputEvent::PointerUp {
            pos: Point::new(x, y),
            modifiers: ModifierKeys::NONE,
        }
    }
}
