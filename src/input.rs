//! Pointer and keyboard tracking for the window host.
//!
//! `Input` folds raw winit window events into the little state the host
//! needs: where the pointer is (if it is over the window at all) and which
//! keys went down this frame.
//!
//! ```ignore
//! input.handle_event(&event);
//! // once per frame
//! match input.pointer() {
//!     Some(pos) => engine.set_pointer(pos),
//!     None => engine.clear_pointer(),
//! }
//! if let Some(digit) = input.pressed_digit() { /* run preset */ }
//! input.begin_frame();
//! ```

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Top-row or numpad digit 0-9.
    Digit(u8),
    Escape,
    Space,
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Digit0 | WinitKeyCode::Numpad0 => KeyCode::Digit(0),
            WinitKeyCode::Digit1 | WinitKeyCode::Numpad1 => KeyCode::Digit(1),
            WinitKeyCode::Digit2 | WinitKeyCode::Numpad2 => KeyCode::Digit(2),
            WinitKeyCode::Digit3 | WinitKeyCode::Numpad3 => KeyCode::Digit(3),
            WinitKeyCode::Digit4 | WinitKeyCode::Numpad4 => KeyCode::Digit(4),
            WinitKeyCode::Digit5 | WinitKeyCode::Numpad5 => KeyCode::Digit(5),
            WinitKeyCode::Digit6 | WinitKeyCode::Numpad6 => KeyCode::Digit(6),
            WinitKeyCode::Digit7 | WinitKeyCode::Numpad7 => KeyCode::Digit(7),
            WinitKeyCode::Digit8 | WinitKeyCode::Numpad8 => KeyCode::Digit(8),
            WinitKeyCode::Digit9 | WinitKeyCode::Numpad9 => KeyCode::Digit(9),
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::Space => KeyCode::Space,
            _ => KeyCode::Other,
        }
    }
}

/// Input state for one window.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    /// Keys that went down this frame, in order.
    keys_pressed: Vec<KeyCode>,
    pointer: Option<Vec2>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Queries ==========

    /// Pointer position in window pixels, or `None` while outside the window.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Whether a key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// The last digit key pressed this frame.
    pub fn pressed_digit(&self) -> Option<u8> {
        self.keys_pressed.iter().rev().find_map(|key| match key {
            KeyCode::Digit(d) => Some(*d),
            _ => None,
        })
    }

    // ========== Updates ==========

    /// Clear per-frame state. Call after the frame has consumed its input.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    pub(crate) fn press(&mut self, key: KeyCode) {
        // Ignore key repeat
        if self.keys_held.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    pub(crate) fn release(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub(crate) fn move_pointer(&mut self, position: Vec2) {
        self.pointer = Some(position);
    }

    pub(crate) fn leave(&mut self) {
        self.pointer = None;
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let key = KeyCode::from(code);
                    match event.state {
                        ElementState::Pressed => self.press(key),
                        ElementState::Released => self.release(key),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_pointer(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.leave(),
            WindowEvent::Focused(false) => self.keys_held.clear(),
            _ => {}
        }
    }
}
