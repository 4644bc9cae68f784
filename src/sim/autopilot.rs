//! Demo autopilot
//!
//! Plays the game from the same input sample a player would produce, so the
//! headless runner and the idle demo exercise the real update path.

use super::pipes::PipeField;
use super::state::GameState;
use super::tick::FlapInput;

/// How far ahead of the bird the autopilot looks for the next gap
const LOOKAHEAD: f32 = 1.5;
/// Flap once the bird sinks this far below the target gap center
const SINK_MARGIN: f32 = 0.35;

/// Choose this frame's input for `state`
///
/// Alternates press and release so every flap is a fresh one. A crashed run
/// is restarted with the next press.
pub fn autopilot_input(state: &GameState) -> FlapInput {
    if state.space_held {
        return FlapInput::IDLE;
    }

    if state.game_over || !state.playing {
        return FlapInput::FLAP;
    }

    let index = PipeField::pipe_index_at(state.bird_pos.x + LOOKAHEAD);
    let target = state.pipes.gap(index);
    let sinking = state.bird_vel.y <= 0.0;

    FlapInput {
        flap_pressed: sinking && state.bird_pos.y < target - SINK_MARGIN,
        quit_requested: false,
    }
}
