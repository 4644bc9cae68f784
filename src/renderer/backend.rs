//! Renderer collaborator seam
//!
//! The game creates a handful of GPU resources at startup and then submits a
//! draw list every frame. Anything that can do that implements
//! [`RenderBackend`]; the simulation never sees more than the opaque handles.

use glam::Vec2;
use thiserror::Error;

use super::textures::TextureImage;
use super::vertex::Vertex;

/// Opaque shader program handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Opaque texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Opaque vertex buffer (model) handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// Which program a shader handle should run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    /// Textured, tinted quads
    Sprite,
    /// Solid-colored glyph cells
    Text,
}

/// Errors reported by render backends
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("texture image {width}x{height} has {len} bytes, expected {expected}")]
    InvalidTexture {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },

    #[error("vertex buffer must contain at least one vertex")]
    EmptyVertexBuffer,

    #[error("unknown shader program {0:?}")]
    UnknownShader(ShaderId),

    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    #[error("unknown vertex buffer {0:?}")]
    UnknownModel(ModelId),

    #[error("shader {0:?} is not a {1:?} program")]
    WrongShaderKind(ShaderId, ShaderKind),

    #[error("end_frame called without begin_frame")]
    FrameNotStarted,
}

/// Pixel rectangle the scene is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One textured quad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub shader: ShaderId,
    pub texture: TextureId,
    pub model: ModelId,
    /// Center in view units (camera already applied)
    pub position: Vec2,
    /// Layer; higher draws on top
    pub depth: f32,
    pub rotation_degrees: f32,
    pub scale: Vec2,
}

/// A line of bitmap text
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub shader: ShaderId,
    pub model: ModelId,
    pub text: String,
    /// Top-left corner of the first glyph in view units
    pub position: Vec2,
    pub depth: f32,
    pub scale: Vec2,
}

/// A single draw submission
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite(SpriteDraw),
    Text(TextDraw),
}

/// Everything a backend needs to draw one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub viewport: Viewport,
    pub commands: Vec<DrawCommand>,
}

/// GPU handles created at startup, released at shutdown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resources {
    pub sprite_shader: ShaderId,
    pub text_shader: ShaderId,
    pub sprite_model: ModelId,
    pub background: TextureId,
    pub bird: TextureId,
    pub pipe_top: TextureId,
    pub pipe_bottom: TextureId,
}

/// Graphics collaborator used by the game
pub trait RenderBackend {
    fn create_shader_program(&mut self, kind: ShaderKind) -> Result<ShaderId, RenderError>;

    fn create_texture(&mut self, image: &TextureImage) -> Result<TextureId, RenderError>;

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<ModelId, RenderError>;

    /// Start a frame drawn into `viewport`
    fn begin_frame(&mut self, viewport: Viewport);

    fn draw_sprite(&mut self, sprite: &SpriteDraw);

    fn draw_text(&mut self, text: &TextDraw);

    /// Flush the frame's submissions
    fn end_frame(&mut self) -> Result<(), RenderError>;

    /// Free every handle in `resources`
    fn release(&mut self, resources: &Resources);

    /// Submit a whole frame
    fn submit(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.begin_frame(frame.viewport);
        for command in &frame.commands {
            match command {
                DrawCommand::Sprite(sprite) => self.draw_sprite(sprite),
                DrawCommand::Text(text) => self.draw_text(text),
            }
        }
        self.end_frame()
    }
}
