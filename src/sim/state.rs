//! Game state and core simulation types
//!
//! Only gameplay lives here. GPU handles belong to the renderer
//! (`renderer::backend::Resources`) and never enter the simulation.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::pipes::PipeField;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay, derived from the lifecycle flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Bird parked at the start, waiting for the first flap
    Idle,
    /// Active gameplay
    Playing,
    /// Bird crashed; the next flap press resets
    GameOver,
}

/// Gameplay transitions, recorded for the frame loop (logging, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Field regenerated and kinematics zeroed
    Reset,
    /// First flap after a reset
    Started,
    /// Fresh flap impulse applied
    Flapped,
    /// Bird advanced to a new score
    Scored { score: u64 },
    /// Bird hit a pipe or left the playfield
    Crashed { score: u64 },
}

/// Events kept before the oldest is dropped; frame loops drain long before this
pub const MAX_PENDING_EVENTS: usize = 64;

/// Score for a bird at world `x`: one point per pipe slot passed
///
/// The quotient is clamped at zero; the bird starts at x = -6, so this only
/// matters for the opening stretch where a truncating conversion reads 0.
#[inline]
pub fn score_for_x(x: f32) -> u64 {
    ((x + 3.0) / PIPE_SPACING).max(0.0).floor() as u64
}

/// Complete gameplay state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Set by the first flap after a reset; gates gravity and integration
    pub playing: bool,
    /// Set on collision
    pub game_over: bool,
    /// Flap input latch, distinguishes a fresh press from a held one
    pub space_held: bool,
    pub score: u64,
    /// Horizontal world scroll offset
    pub camera: f32,
    pub bird_pos: Vec2,
    pub bird_vel: Vec2,
    pub pipes: PipeField,
    pub tuning: Tuning,
    /// Seed the pipe generator was created from
    pub seed: u64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a zeroed state; call [`GameState::reset`] before playing
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            playing: false,
            game_over: false,
            space_held: false,
            score: 0,
            camera: 0.0,
            bird_pos: Vec2::ZERO,
            bird_vel: Vec2::ZERO,
            pipes: PipeField::zeroed(NUM_PIPES),
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Put the bird back at the start with a freshly generated course
    pub fn reset(&mut self) {
        self.playing = false;
        self.game_over = false;
        self.space_held = false;
        self.score = 0;

        self.camera = START_CAMERA;
        self.bird_pos = Vec2::new(START_BIRD_X, 0.0);
        self.bird_vel = Vec2::new(self.tuning.forward_speed, 0.0);
        self.pipes = PipeField::generate(&mut self.rng, NUM_PIPES);

        self.push_event(GameEvent::Reset);
    }

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::GameOver
        } else if self.playing {
            GamePhase::Playing
        } else {
            GamePhase::Idle
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Events recorded since the last drain, oldest first
    ///
    /// Anything driving [`crate::sim::update`] directly should drain once per
    /// frame. At most [`MAX_PENDING_EVENTS`] are held; older ones are dropped.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let state = GameState::new(1, Tuning::default());
        assert_eq!(state.phase(), GamePhase::Idle);
        assert_eq!(state.bird_pos, Vec2::ZERO);
        assert_eq!(state.bird_vel, Vec2::ZERO);
        assert!(state.pipes.gaps().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_reset_from_game_over() {
        let mut state = GameState::new(1, Tuning::default());
        state.reset();
        state.playing = true;
        state.game_over = true;
        state.space_held = true;
        state.score = 12;
        state.camera = 40.0;
        state.bird_pos = Vec2::new(43.0, -4.6);
        state.bird_vel = Vec2::new(0.0, 8.0);

        state.reset();

        assert!(!state.game_over);
        assert!(!state.playing);
        assert!(!state.space_held);
        assert_eq!(state.score, 0);
        assert_eq!(state.camera, START_CAMERA);
        assert_eq!(state.bird_pos, Vec2::new(START_BIRD_X, 0.0));
        assert_eq!(state.bird_vel, Vec2::new(state.tuning.forward_speed, 0.0));
        assert_eq!(state.pipes.len(), NUM_PIPES);
    }

    #[test]
    fn test_reset_regenerates_field() {
        let mut state = GameState::new(5, Tuning::default());
        state.reset();
        let first = state.pipes.clone();
        state.reset();
        assert_ne!(first, state.pipes);
    }

    #[test]
    fn test_reset_is_seed_deterministic() {
        let mut a = GameState::new(77, Tuning::default());
        let mut b = GameState::new(77, Tuning::default());
        a.reset();
        b.reset();
        assert_eq!(a.pipes, b.pipes);
    }

    #[test]
    fn test_reset_records_event() {
        let mut state = GameState::new(1, Tuning::default());
        state.reset();
        assert_eq!(state.drain_events(), vec![GameEvent::Reset]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_undrained_events_stay_bounded() {
        let mut state = GameState::new(1, Tuning::default());
        for _ in 0..MAX_PENDING_EVENTS * 3 {
            state.reset();
            state.push_event(GameEvent::Flapped);
        }
        state.push_event(GameEvent::Scored { score: 9 });

        let events = state.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert_eq!(events.last(), Some(&GameEvent::Scored { score: 9 }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_score_for_x() {
        assert_eq!(score_for_x(START_BIRD_X), 0);
        assert_eq!(score_for_x(-3.0), 0);
        assert_eq!(score_for_x(0.99), 0);
        assert_eq!(score_for_x(1.0), 1);
        assert_eq!(score_for_x(5.0), 2);
    }
}
