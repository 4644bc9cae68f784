//! Flappy - a side-scrolling one-button arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, pipe field, collisions, scoring)
//! - `renderer`: Draw-list shaping plus the WebGPU and headless backends
//! - `game`: Lifecycle controller tying the simulation to a backend
//! - `platform`: Input sampling and frame timing
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences

pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Length of the cyclic pipe field
    pub const NUM_PIPES: usize = 512;
    /// World units between consecutive pipes
    pub const PIPE_SPACING: f32 = 4.0;

    /// Visible world size (the orthographic projection spans this)
    pub const WORLD_WIDTH: f32 = 16.0;
    pub const WORLD_HEIGHT: f32 = 9.0;

    /// Bird collision circle
    pub const BIRD_RADIUS: f32 = 0.3;
    /// Bird leaves the playfield past this |y|
    pub const VERTICAL_BOUND: f32 = 4.5;
    /// Collision checks start once the bird reaches this x
    pub const COLLISION_START_X: f32 = -4.0;
    /// Upward kick applied once when the bird crashes
    pub const DEATH_BOUNCE: f32 = 8.0;

    /// Post-reset kinematics
    pub const START_CAMERA: f32 = -3.0;
    pub const START_BIRD_X: f32 = -6.0;

    /// Background tile width (also the scroll wrap period)
    pub const BG_TILE_WIDTH: f32 = 4.5;
    pub const BG_WIDTH: f32 = 4.5;
    pub const BG_HEIGHT: f32 = 9.0;

    /// Bird sprite size
    pub const BIRD_WIDTH: f32 = 0.85;
    pub const BIRD_HEIGHT: f32 = 0.6;
    /// Degrees of sprite tilt per unit of vertical velocity
    pub const BIRD_TILT_PER_VELOCITY: f32 = 5.0;

    /// Depth layers, higher draws on top
    pub const BG_LAYER: f32 = -0.9;
    pub const PIPE_LAYER: f32 = -0.5;
    pub const BIRD_LAYER: f32 = 0.0;
    pub const TEXT_LAYER: f32 = 0.5;
    pub const TEXT_SCALE: f32 = 0.5;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;
}
