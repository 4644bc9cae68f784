//! Lifecycle controller
//!
//! Owns the game state, the render backend and the GPU handles created for
//! it. One call to [`Game::frame`] runs the update step, builds the draw list
//! and submits it.

use crate::consts::MAX_FRAME_DELTA;
use crate::renderer::backend::{RenderBackend, RenderError, Resources, ShaderKind};
use crate::renderer::scene::build_frame;
use crate::renderer::textures;
use crate::renderer::vertex::SPRITE_QUAD;
use crate::sim::{FlapInput, GameEvent, GameState, update};
use crate::tuning::Tuning;

pub struct Game<B: RenderBackend> {
    backend: B,
    resources: Resources,
    state: GameState,
    frames: u64,
}

impl<B: RenderBackend> Game<B> {
    /// Create every GPU resource the game draws with and reset the state
    pub fn start(mut backend: B, seed: u64, tuning: Tuning) -> Result<Self, RenderError> {
        let resources = Resources {
            sprite_shader: backend.create_shader_program(ShaderKind::Sprite)?,
            text_shader: backend.create_shader_program(ShaderKind::Text)?,
            sprite_model: backend.create_vertex_buffer(&SPRITE_QUAD)?,
            background: backend.create_texture(&textures::background())?,
            bird: backend.create_texture(&textures::bird())?,
            pipe_top: backend.create_texture(&textures::pipe_top())?,
            pipe_bottom: backend.create_texture(&textures::pipe_bottom())?,
        };

        let mut state = GameState::new(seed, tuning);
        state.reset();
        log::info!("Game started with seed {}", seed);

        Ok(Self {
            backend,
            resources,
            state,
            frames: 0,
        })
    }

    /// Advance one frame and draw it; returns the gameplay events it produced
    pub fn frame(
        &mut self,
        input: &FlapInput,
        delta: f32,
        surface_size: (u32, u32),
        elapsed: f32,
    ) -> Result<Vec<GameEvent>, RenderError> {
        update(&mut self.state, input, delta.clamp(0.0, MAX_FRAME_DELTA));

        let frame = build_frame(&self.state, &self.resources, surface_size, elapsed);
        self.backend.submit(&frame)?;
        self.frames += 1;

        let events = self.state.drain_events();
        for event in &events {
            match event {
                GameEvent::Crashed { score } => log::info!("Game over, score {}", score),
                GameEvent::Reset => log::info!("New round"),
                other => log::debug!("{:?}", other),
            }
        }
        Ok(events)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Release GPU resources and hand the backend back
    pub fn end(mut self) -> B {
        self.backend.release(&self.resources);
        log::info!("Game ended after {} frames", self.frames);
        self.backend
    }
}
