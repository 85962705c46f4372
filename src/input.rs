use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Pixels of page offset per wheel line, matching typical browser scroll.
const PIXELS_PER_LINE: f32 = 40.0;

/// Identifier for a pointer button (primary button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerButton(u8);

impl PointerButton {
    pub const PRIMARY: Self = Self(0);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Thread-safe snapshot of pointer and scroll input.
///
/// The scroll offset mirrors the page convention: zero at the top,
/// growing negative while scrolling down, never positive.
#[derive(Debug, Default)]
pub struct InputState {
    pointer: RwLock<Vec2>,
    buttons: RwLock<HashSet<PointerButton>>,
    scroll_offset: RwLock<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pointer_position(&self, position: Vec2) {
        *self.pointer.write() = position;
    }

    pub fn pointer_position(&self) -> Vec2 {
        *self.pointer.read()
    }

    pub fn set_button_down(&self, button: PointerButton) {
        self.buttons.write().insert(button);
    }

    pub fn set_button_up(&self, button: PointerButton) {
        self.buttons.write().remove(&button);
    }

    pub fn is_button_down(&self, button: PointerButton) -> bool {
        self.buttons.read().contains(&button)
    }

    /// Accumulates a wheel delta in lines and returns the new offset.
    pub fn apply_scroll_lines(&self, lines: f32) -> f32 {
        let mut offset = self.scroll_offset.write();
        *offset = (*offset + lines * PIXELS_PER_LINE).min(0.0);
        *offset
    }

    pub fn scroll_offset(&self) -> f32 {
        *self.scroll_offset.read()
    }
}
