//! Per-frame simulation step
//!
//! Advances the bird by one frame's elapsed time, runs the pipe and bounds
//! collision test, and derives the score.

use super::pipes::PipeField;
use super::state::{GameEvent, GameState, score_for_x};
use crate::consts::*;

/// Input levels sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlapInput {
    /// Flap control is currently down (level, not edge)
    pub flap_pressed: bool,
    /// Window close / Escape; handled by the frame loop, ignored by `update`
    pub quit_requested: bool,
}

impl FlapInput {
    pub const IDLE: Self = Self {
        flap_pressed: false,
        quit_requested: false,
    };

    pub const FLAP: Self = Self {
        flap_pressed: true,
        quit_requested: false,
    };
}

/// Advance the game state by `dt` seconds
pub fn update(state: &mut GameState, input: &FlapInput, dt: f32) {
    let gravity = state.tuning.gravity;

    // Only single flaps count; holding the key falls back to gravity.
    // Reset clears the latch, so a press held through a crash flaps again.
    if input.flap_pressed {
        if state.game_over {
            state.reset();
        }
        let fresh = !state.space_held;

        if !state.playing {
            state.push_event(GameEvent::Started);
        }
        state.playing = true;

        if fresh {
            state.bird_vel.y = state.tuning.flap_impulse;
            state.space_held = true;
            state.push_event(GameEvent::Flapped);
        } else {
            state.bird_vel.y -= dt * gravity;
        }
    } else {
        if state.playing {
            state.bird_vel.y -= dt * gravity;
        }
        state.space_held = false;
    }

    if state.playing {
        state.bird_pos += state.bird_vel * dt;
        state.camera += state.bird_vel.x * dt;
    }

    if state.bird_pos.x >= COLLISION_START_X && check_collision(state) && !state.game_over {
        state.game_over = true;
        state.bird_vel.x = 0.0;
        state.bird_vel.y = DEATH_BOUNCE;
        let score = score_for_x(state.bird_pos.x);
        state.push_event(GameEvent::Crashed { score });
        log::debug!(
            "Crash at x={:.2} y={:.2} (score {})",
            state.bird_pos.x,
            state.bird_pos.y,
            score
        );
    }

    let score = score_for_x(state.bird_pos.x);
    if score > state.score && !state.game_over {
        state.push_event(GameEvent::Scored { score });
    }
    state.score = score;
}

/// Does the bird overlap the pipe pair it is approaching, or leave the screen?
pub fn check_collision(state: &GameState) -> bool {
    let index = PipeField::pipe_index_at(state.bird_pos.x);
    let pair = state.pipes.pipe_pair(index, &state.tuning);

    pair.hits_circle(state.bird_pos, BIRD_RADIUS) || state.bird_pos.y.abs() > VERTICAL_BOUND
}
