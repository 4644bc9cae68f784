//! Platform abstraction layer
//!
//! Event-driven browser/OS sources turned into per-frame samples:
//! - Input levels (flap, quit)
//! - Frame timing and FPS reporting

pub mod input;
pub mod time;

pub use input::InputState;
pub use time::{FpsReport, FrameClock, FrameTiming};
