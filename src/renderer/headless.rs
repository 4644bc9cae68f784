//! Renderer that draws nothing
//!
//! Tracks handles the same way a GPU backend does and validates every
//! submission against them, so the full game loop can run without a device
//! (native binary, tests).

use std::collections::HashMap;

use super::backend::{
    ModelId, RenderBackend, RenderError, Resources, ShaderId, ShaderKind, SpriteDraw, TextDraw,
    TextureId, Viewport,
};
use super::font;
use super::textures::TextureImage;
use super::vertex::Vertex;

/// Draw counts of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub sprites: u32,
    pub texts: u32,
    /// Lit glyph pixels across all text draws
    pub glyph_cells: u32,
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u32,
    shaders: HashMap<ShaderId, ShaderKind>,
    textures: HashMap<TextureId, (u32, u32)>,
    models: HashMap<ModelId, usize>,

    in_frame: bool,
    pending_error: Option<RenderError>,
    current: FrameStats,

    /// Frames successfully ended
    pub frames: u64,
    pub last_frame: FrameStats,
    pub last_viewport: Viewport,
    /// Text of the most recent text draws, in submission order
    pub last_texts: Vec<String>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Handles currently alive
    pub fn live_handles(&self) -> usize {
        self.shaders.len() + self.textures.len() + self.models.len()
    }

    #[cfg(test)]
    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).copied()
    }

    fn check_shader(&self, id: ShaderId, kind: ShaderKind) -> Result<(), RenderError> {
        match self.shaders.get(&id) {
            None => Err(RenderError::UnknownShader(id)),
            Some(k) if *k != kind => Err(RenderError::WrongShaderKind(id, kind)),
            Some(_) => Ok(()),
        }
    }

    fn check_model(&self, id: ModelId) -> Result<(), RenderError> {
        if self.models.contains_key(&id) {
            Ok(())
        } else {
            Err(RenderError::UnknownModel(id))
        }
    }

    fn check_sprite(&self, sprite: &SpriteDraw) -> Result<(), RenderError> {
        self.check_shader(sprite.shader, ShaderKind::Sprite)?;
        if !self.textures.contains_key(&sprite.texture) {
            return Err(RenderError::UnknownTexture(sprite.texture));
        }
        self.check_model(sprite.model)
    }

    fn check_text(&self, text: &TextDraw) -> Result<(), RenderError> {
        self.check_shader(text.shader, ShaderKind::Text)?;
        self.check_model(text.model)
    }

    /// Keep the first failure of the frame; it is reported by `end_frame`
    fn record(&mut self, result: Result<(), RenderError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                if self.pending_error.is_none() {
                    self.pending_error = Some(err);
                }
                false
            }
        }
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_shader_program(&mut self, kind: ShaderKind) -> Result<ShaderId, RenderError> {
        let id = ShaderId(self.allocate());
        self.shaders.insert(id, kind);
        log::debug!("Created {:?} shader {:?}", kind, id);
        Ok(id)
    }

    fn create_texture(&mut self, image: &TextureImage) -> Result<TextureId, RenderError> {
        if image.width == 0 || image.height == 0 || image.pixels.len() != image.expected_len() {
            return Err(RenderError::InvalidTexture {
                width: image.width,
                height: image.height,
                len: image.pixels.len(),
                expected: image.expected_len(),
            });
        }
        let id = TextureId(self.allocate());
        self.textures.insert(id, (image.width, image.height));
        Ok(id)
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<ModelId, RenderError> {
        if vertices.is_empty() {
            return Err(RenderError::EmptyVertexBuffer);
        }
        let id = ModelId(self.allocate());
        self.models.insert(id, vertices.len());
        Ok(id)
    }

    fn begin_frame(&mut self, viewport: Viewport) {
        self.in_frame = true;
        self.pending_error = None;
        self.current = FrameStats::default();
        self.last_viewport = viewport;
        self.last_texts.clear();
    }

    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        let result = self.check_sprite(sprite);
        if self.record(result) {
            self.current.sprites += 1;
        }
    }

    fn draw_text(&mut self, text: &TextDraw) {
        let result = self.check_text(text);
        if self.record(result) {
            self.current.texts += 1;
            self.current.glyph_cells += font::layout(&text.text).len() as u32;
            self.last_texts.push(text.text.clone());
        }
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::FrameNotStarted);
        }
        self.in_frame = false;
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        self.frames += 1;
        self.last_frame = self.current;
        Ok(())
    }

    fn release(&mut self, resources: &Resources) {
        for shader in [resources.sprite_shader, resources.text_shader] {
            self.shaders.remove(&shader);
        }
        for texture in [
            resources.background,
            resources.bird,
            resources.pipe_top,
            resources.pipe_bottom,
        ] {
            self.textures.remove(&texture);
        }
        self.models.remove(&resources.sprite_model);
        log::debug!("Released resources, {} handles left", self.live_handles());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::textures;
    use crate::renderer::vertex::SPRITE_QUAD;
    use glam::Vec2;

    fn sprite(shader: ShaderId, texture: TextureId, model: ModelId) -> SpriteDraw {
        SpriteDraw {
            shader,
            texture,
            model,
            position: Vec2::ZERO,
            depth: 0.0,
            rotation_degrees: 0.0,
            scale: Vec2::ONE,
        }
    }

    #[test]
    fn test_handles_are_unique() {
        let mut backend = HeadlessBackend::new();
        let a = backend.create_shader_program(ShaderKind::Sprite).unwrap();
        let b = backend.create_shader_program(ShaderKind::Text).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.live_handles(), 2);
    }

    #[test]
    fn test_rejects_bad_texture() {
        let mut backend = HeadlessBackend::new();
        let bad = TextureImage {
            width: 2,
            height: 2,
            pixels: vec![0; 3],
        };
        assert!(matches!(
            backend.create_texture(&bad),
            Err(RenderError::InvalidTexture { expected: 16, .. })
        ));
        let id = backend.create_texture(&textures::bird()).unwrap();
        assert_eq!(backend.texture_size(id), Some((17, 12)));
    }

    #[test]
    fn test_rejects_empty_vertex_buffer() {
        let mut backend = HeadlessBackend::new();
        assert!(matches!(
            backend.create_vertex_buffer(&[]),
            Err(RenderError::EmptyVertexBuffer)
        ));
    }

    #[test]
    fn test_frame_counts_draws() {
        let mut backend = HeadlessBackend::new();
        let sprite_shader = backend.create_shader_program(ShaderKind::Sprite).unwrap();
        let text_shader = backend.create_shader_program(ShaderKind::Text).unwrap();
        let texture = backend.create_texture(&textures::bird()).unwrap();
        let model = backend.create_vertex_buffer(&SPRITE_QUAD).unwrap();

        backend.begin_frame(Viewport::default());
        backend.draw_sprite(&sprite(sprite_shader, texture, model));
        backend.draw_sprite(&sprite(sprite_shader, texture, model));
        backend.draw_text(&TextDraw {
            shader: text_shader,
            model,
            text: "10".into(),
            position: Vec2::ZERO,
            depth: 0.5,
            scale: Vec2::ONE,
        });
        backend.end_frame().unwrap();

        assert_eq!(backend.frames, 1);
        assert_eq!(backend.last_frame.sprites, 2);
        assert_eq!(backend.last_frame.texts, 1);
        assert_eq!(backend.last_frame.glyph_cells, font::layout("10").len() as u32);
        assert_eq!(backend.last_texts, vec!["10".to_string()]);
    }

    #[test]
    fn test_draw_with_wrong_shader_kind_fails_frame() {
        let mut backend = HeadlessBackend::new();
        let text_shader = backend.create_shader_program(ShaderKind::Text).unwrap();
        let texture = backend.create_texture(&textures::bird()).unwrap();
        let model = backend.create_vertex_buffer(&SPRITE_QUAD).unwrap();

        backend.begin_frame(Viewport::default());
        backend.draw_sprite(&sprite(text_shader, texture, model));
        let err = backend.end_frame().unwrap_err();
        assert!(matches!(err, RenderError::WrongShaderKind(id, ShaderKind::Sprite) if id == text_shader));
        assert_eq!(backend.frames, 0);
    }

    #[test]
    fn test_end_without_begin() {
        let mut backend = HeadlessBackend::new();
        assert!(matches!(backend.end_frame(), Err(RenderError::FrameNotStarted)));
    }

    #[test]
    fn test_released_handles_are_unknown() {
        let mut backend = HeadlessBackend::new();
        let resources = Resources {
            sprite_shader: backend.create_shader_program(ShaderKind::Sprite).unwrap(),
            text_shader: backend.create_shader_program(ShaderKind::Text).unwrap(),
            sprite_model: backend.create_vertex_buffer(&SPRITE_QUAD).unwrap(),
            background: backend.create_texture(&textures::background()).unwrap(),
            bird: backend.create_texture(&textures::bird()).unwrap(),
            pipe_top: backend.create_texture(&textures::pipe_top()).unwrap(),
            pipe_bottom: backend.create_texture(&textures::pipe_bottom()).unwrap(),
        };
        assert_eq!(backend.live_handles(), 7);

        backend.release(&resources);
        assert_eq!(backend.live_handles(), 0);

        backend.begin_frame(Viewport::default());
        backend.draw_sprite(&sprite(
            resources.sprite_shader,
            resources.bird,
            resources.sprite_model,
        ));
        assert!(matches!(
            backend.end_frame(),
            Err(RenderError::UnknownShader(_))
        ));
    }
}
