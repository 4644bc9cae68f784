//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame delta and input sample are the only per-frame inputs
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod geometry;
pub mod pipes;
pub mod state;
pub mod tick;

pub use autopilot::autopilot_input;
pub use geometry::{Rect, circle_intersects_rect};
pub use pipes::{PipeField, PipePair, generate_gaps};
pub use state::{GameEvent, GamePhase, GameState, MAX_PENDING_EVENTS, score_for_x};
pub use tick::{FlapInput, check_collision, update};
