//! Render step: turns game state into a draw list
//!
//! Pure data shaping. Nothing here touches the GPU, so the whole frame layout
//! is testable without a device.

use std::ops::RangeInclusive;

use glam::Vec2;

use super::backend::{DrawCommand, Frame, Resources, SpriteDraw, TextDraw, Viewport};
use crate::consts::*;
use crate::sim::{GameState, PipeField};

/// Background tile centers before the scroll offset is applied
pub const BACKGROUND_TILES: [f32; 6] = [-9.0, -4.5, 0.0, 4.5, 9.0, 13.5];

/// How far left and right of the camera pipes are still drawn
const PIPE_CULL_BEHIND: f32 = 8.0;
const PIPE_CULL_AHEAD: f32 = 12.0;

/// Integer form of the 16:9 world aspect
const ASPECT_W: u64 = 16;
const ASPECT_H: u64 = 9;

impl Viewport {
    /// Largest 16:9 rectangle centered in a `width` x `height` surface
    ///
    /// Integer arithmetic throughout; fractional pixels truncate, both for the
    /// size and for the centering offset.
    pub fn fit(width: u32, height: u32) -> Self {
        let (w, h) = (width as u64, height as u64);
        if w * ASPECT_H <= h * ASPECT_W {
            // Letterbox
            Self {
                x: 0,
                y: ((h * ASPECT_W - w * ASPECT_H) / (2 * ASPECT_W)) as u32,
                width,
                height: (w * ASPECT_H / ASPECT_W) as u32,
            }
        } else {
            // Pillarbox
            Self {
                x: ((w * ASPECT_H - h * ASPECT_W) / (2 * ASPECT_H)) as u32,
                y: 0,
                width: (h * ASPECT_W / ASPECT_H) as u32,
                height,
            }
        }
    }
}

/// Inclusive range of pipe slots near enough to the camera to draw
pub fn visible_pipe_range(camera: f32) -> RangeInclusive<u64> {
    let first = ((camera - PIPE_CULL_BEHIND) / PIPE_SPACING).floor();
    let last = ((camera + PIPE_CULL_AHEAD) / PIPE_SPACING).floor();
    if last < 0.0 {
        #[allow(clippy::reversed_empty_ranges)]
        return 1..=0;
    }
    (first.max(0.0) as u64)..=(last as u64)
}

/// Horizontal scroll of the background tiles, in [0, BG_TILE_WIDTH)
pub fn background_offset(elapsed: f32, scroll_speed: f32) -> f32 {
    (elapsed * scroll_speed).rem_euclid(BG_TILE_WIDTH)
}

/// Bird tilt in degrees; nose up while rising
#[inline]
pub fn bird_rotation(vel_y: f32) -> f32 {
    vel_y * BIRD_TILT_PER_VELOCITY
}

pub fn score_text(score: u64) -> String {
    format!("{score:03}")
}

/// Build the complete draw list for one frame
pub fn build_frame(
    state: &GameState,
    resources: &Resources,
    surface_size: (u32, u32),
    elapsed: f32,
) -> Frame {
    let mut commands = Vec::new();

    let offset = background_offset(elapsed, state.tuning.background_scroll_speed);
    for tile_x in BACKGROUND_TILES {
        commands.push(DrawCommand::Sprite(SpriteDraw {
            shader: resources.sprite_shader,
            texture: resources.background,
            model: resources.sprite_model,
            position: Vec2::new(tile_x - offset, 0.0),
            depth: BG_LAYER,
            rotation_degrees: 0.0,
            scale: Vec2::new(BG_WIDTH, BG_HEIGHT),
        }));
    }

    let pipe_scale = Vec2::new(state.tuning.pipe_width, state.tuning.pipe_height);
    for index in visible_pipe_range(state.camera) {
        let pair = state.pipes.pipe_pair(index, &state.tuning);
        let x = PipeField::pipe_x(index) - state.camera;
        for (rect, texture) in [
            (pair.top, resources.pipe_top),
            (pair.bottom, resources.pipe_bottom),
        ] {
            commands.push(DrawCommand::Sprite(SpriteDraw {
                shader: resources.sprite_shader,
                texture,
                model: resources.sprite_model,
                position: Vec2::new(x, rect.center.y),
                depth: PIPE_LAYER,
                rotation_degrees: 0.0,
                scale: pipe_scale,
            }));
        }
    }

    commands.push(DrawCommand::Sprite(SpriteDraw {
        shader: resources.sprite_shader,
        texture: resources.bird,
        model: resources.sprite_model,
        position: Vec2::new(state.bird_pos.x - state.camera, state.bird_pos.y),
        depth: BIRD_LAYER,
        rotation_degrees: bird_rotation(state.bird_vel.y),
        scale: Vec2::new(BIRD_WIDTH, BIRD_HEIGHT),
    }));

    commands.push(DrawCommand::Text(TextDraw {
        shader: resources.text_shader,
        model: resources.sprite_model,
        text: score_text(state.score),
        position: Vec2::new(-WORLD_WIDTH / 2.0 + 1.0, WORLD_HEIGHT / 2.0 - 1.0),
        depth: TEXT_LAYER,
        scale: Vec2::splat(TEXT_SCALE),
    }));

    Frame {
        viewport: Viewport::fit(surface_size.0, surface_size.1),
        commands,
    }
}
