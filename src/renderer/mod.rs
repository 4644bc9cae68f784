//! Rendering
//!
//! [`scene`] turns game state into a draw list; a [`RenderBackend`] consumes
//! it. [`WgpuRenderer`] draws to a real surface, [`HeadlessBackend`] only
//! validates and counts.

pub mod backend;
pub mod font;
pub mod headless;
pub mod scene;
pub mod sprite_pipeline;
pub mod textures;
pub mod vertex;

pub use backend::{
    DrawCommand, Frame, ModelId, RenderBackend, RenderError, Resources, ShaderId, ShaderKind,
    SpriteDraw, TextDraw, TextureId, Viewport,
};
pub use headless::{FrameStats, HeadlessBackend};
pub use scene::build_frame;
pub use sprite_pipeline::WgpuRenderer;
