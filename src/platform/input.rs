//! Keyboard and pointer input
//!
//! Browser events arrive between frames; [`InputState`] keeps the level of
//! each control so the simulation sees one consistent sample per frame.

use crate::sim::FlapInput;

/// `KeyboardEvent.key` values that flap
const FLAP_KEYS: [&str; 2] = [" ", "Spacebar"];
const QUIT_KEY: &str = "Escape";

#[derive(Debug, Clone, Default)]
pub struct InputState {
    flap_key_down: bool,
    pointer_down: bool,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is one the game handles (the caller should
    /// suppress the browser default, e.g. page scroll on Space)
    pub fn key_down(&mut self, key: &str) -> bool {
        if FLAP_KEYS.contains(&key) {
            self.flap_key_down = true;
            true
        } else if key == QUIT_KEY {
            self.quit = true;
            true
        } else {
            false
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        if FLAP_KEYS.contains(&key) {
            self.flap_key_down = false;
            true
        } else {
            key == QUIT_KEY
        }
    }

    pub fn pointer_down(&mut self) {
        self.pointer_down = true;
    }

    pub fn pointer_up(&mut self) {
        self.pointer_down = false;
    }

    /// Focus lost: key-up events will never arrive, so release everything
    pub fn blur(&mut self) {
        self.flap_key_down = false;
        self.pointer_down = false;
    }

    pub fn sample(&self) -> FlapInput {
        FlapInput {
            flap_pressed: self.flap_key_down || self.pointer_down,
            quit_requested: self.quit,
        }
    }
}
