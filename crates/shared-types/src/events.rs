//! Pointer events forwarded from the page into chart instances

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalPosition {
    pub x: f64,
    pub y: f64,
}

impl PhysicalPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest axis-aligned distance to `other`
    pub fn delta(&self, other: &PhysicalPosition) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementState {
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    // Middle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WindowEvent {
    CursorMoved {
        position: PhysicalPosition,
    },
    MouseInput {
        state: ElementState,
        button: MouseButton,
        position: PhysicalPosition,
    },
    CursorLeft,
}
