//! WebGPU sprite renderer
//!
//! Every draw is an instance of the unit quad. Draws are queued between
//! `begin_frame` and `end_frame`, sorted back to front, packed into one
//! instance buffer and issued as batches of consecutive draws that share a
//! shader, texture and model.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec2};
use wgpu::util::DeviceExt;

use super::backend::{
    ModelId, RenderBackend, RenderError, Resources, ShaderId, ShaderKind, SpriteDraw, TextDraw,
    TextureId, Viewport,
};
use super::font;
use super::textures::TextureImage;
use super::vertex::{Instance, Vertex, colors};
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Instances the buffer starts out with (a frame is ~20 sprites plus glyphs)
const INITIAL_INSTANCE_CAPACITY: usize = 256;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
}

/// Orthographic projection of the 16x9 world, origin at the center
pub fn projection() -> Mat4 {
    Mat4::orthographic_rh(
        -WORLD_WIDTH / 2.0,
        WORLD_WIDTH / 2.0,
        -WORLD_HEIGHT / 2.0,
        WORLD_HEIGHT / 2.0,
        -1.0,
        1.0,
    )
}

pub fn sprite_instance(sprite: &SpriteDraw) -> Instance {
    let model = Mat4::from_scale_rotation_translation(
        sprite.scale.extend(1.0),
        Quat::from_rotation_z(sprite.rotation_degrees.to_radians()),
        sprite.position.extend(sprite.depth),
    );
    Instance {
        model: model.to_cols_array_2d(),
        color: colors::WHITE,
    }
}

/// One solid quad per lit glyph pixel
pub fn text_instances(text: &TextDraw) -> Vec<Instance> {
    let cell_scale = Vec2::splat(font::PIXEL_SIZE) * text.scale;
    font::layout(&text.text)
        .into_iter()
        .map(|cell| {
            let center = text.position + cell * text.scale;
            let model = Mat4::from_scale_rotation_translation(
                cell_scale.extend(1.0),
                Quat::IDENTITY,
                center.extend(text.depth),
            );
            Instance {
                model: model.to_cols_array_2d(),
                color: colors::SCORE_TEXT,
            }
        })
        .collect()
}

/// A queued draw: one instance plus what it is drawn with
#[derive(Debug, Clone, Copy)]
struct QueuedDraw {
    depth: f32,
    shader: ShaderId,
    texture: Option<TextureId>,
    model: ModelId,
    instance: Instance,
}

/// Consecutive instances drawn in one call
#[derive(Debug, Clone, PartialEq)]
struct Batch {
    shader: ShaderId,
    texture: Option<TextureId>,
    model: ModelId,
    instances: std::ops::Range<u32>,
}

/// Sort back to front (stable, so equal depths keep submission order) and
/// merge runs that share state
fn batch_draws(draws: &mut [QueuedDraw]) -> (Vec<Instance>, Vec<Batch>) {
    draws.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    let mut instances = Vec::with_capacity(draws.len());
    let mut batches: Vec<Batch> = Vec::new();
    for (i, draw) in draws.iter().enumerate() {
        instances.push(draw.instance);
        let i = i as u32;
        match batches.last_mut() {
            Some(batch)
                if batch.shader == draw.shader
                    && batch.texture == draw.texture
                    && batch.model == draw.model =>
            {
                batch.instances.end = i + 1;
            }
            _ => batches.push(Batch {
                shader: draw.shader,
                texture: draw.texture,
                model: draw.model,
                instances: i..i + 1,
            }),
        }
    }
    (instances, batches)
}

struct ShaderProgram {
    kind: ShaderKind,
    pipeline: wgpu::RenderPipeline,
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct GpuModel {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

struct PendingFrame {
    viewport: Viewport,
    draws: Vec<QueuedDraw>,
    error: Option<RenderError>,
}

pub struct WgpuRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    shader_module: wgpu::ShaderModule,
    sprite_layout: wgpu::PipelineLayout,
    text_layout: wgpu::PipelineLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    globals_bind_group: wgpu::BindGroup,

    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,

    next_id: u32,
    shaders: HashMap<ShaderId, ShaderProgram>,
    textures: HashMap<TextureId, GpuTexture>,
    models: HashMap<ModelId, GpuModel>,

    frame: Option<PendingFrame>,

    /// Surface size in pixels
    pub size: (u32, u32),
}

impl WgpuRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        present_mode: wgpu::PresentMode,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flappy-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface present modes: {:?}", surface_caps.present_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                view_proj: projection().to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sprite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });

        // Text cells are untextured
        let text_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            immediate_size: 0,
        });

        // Nearest filtering keeps pixel art crisp
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let instance_buffer = Self::create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            shader_module,
            sprite_layout,
            text_layout,
            texture_layout,
            sampler,
            globals_bind_group,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            next_id: 0,
            shaders: HashMap::new(),
            textures: HashMap::new(),
            models: HashMap::new(),
            frame: None,
            size: (width, height),
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (std::mem::size_of::<Instance>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn queue_draw(&mut self, result: Result<Vec<QueuedDraw>, RenderError>) {
        let Some(frame) = self.frame.as_mut() else {
            log::warn!("Draw submitted outside a frame, ignored");
            return;
        };
        match result {
            Ok(draws) => frame.draws.extend(draws),
            Err(err) => {
                if frame.error.is_none() {
                    frame.error = Some(err);
                }
            }
        }
    }

    fn check_shader(&self, id: ShaderId, kind: ShaderKind) -> Result<(), RenderError> {
        match self.shaders.get(&id) {
            None => Err(RenderError::UnknownShader(id)),
            Some(program) if program.kind != kind => Err(RenderError::WrongShaderKind(id, kind)),
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

    fn render(&mut self, viewport: Viewport, mut draws: Vec<QueuedDraw>) -> Result<(), RenderError> {
        let (instances, batches) = batch_draws(&mut draws);

        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            log::debug!("Growing instance buffer to {}", self.instance_capacity);
            self.instance_buffer = Self::create_instance_buffer(&self.device, self.instance_capacity);
        }
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sprite_encoder"),
            });

        {
            let [r, g, b, a] = colors::CLEAR.map(f64::from);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if viewport.width > 0 && viewport.height > 0 {
                render_pass.set_viewport(
                    viewport.x as f32,
                    viewport.y as f32,
                    viewport.width as f32,
                    viewport.height as f32,
                    0.0,
                    1.0,
                );
                render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

                for batch in &batches {
                    // Handles were validated when queued
                    let (Some(program), Some(model)) =
                        (self.shaders.get(&batch.shader), self.models.get(&batch.model))
                    else {
                        continue;
                    };
                    render_pass.set_pipeline(&program.pipeline);
                    if let Some(texture) = batch.texture.and_then(|id| self.textures.get(&id)) {
                        render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    }
                    render_pass.set_vertex_buffer(0, model.buffer.slice(..));
                    render_pass.draw(0..model.vertex_count, batch.instances.clone());
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl RenderBackend for WgpuRenderer {
    fn create_shader_program(&mut self, kind: ShaderKind) -> Result<ShaderId, RenderError> {
        let (layout, fragment_entry, label) = match kind {
            ShaderKind::Sprite => (&self.sprite_layout, "fs_sprite", "sprite_pipeline"),
            ShaderKind::Text => (&self.text_layout, "fs_text", "text_pipeline"),
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &self.shader_module,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc(), Instance::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader_module,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let id = ShaderId(self.allocate());
        self.shaders.insert(id, ShaderProgram { kind, pipeline });
        log::info!("Created {:?} shader program {:?}", kind, id);
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

        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("sprite_texture"),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_texture_bind_group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = TextureId(self.allocate());
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
            },
        );
        log::debug!("Uploaded {}x{} texture {:?}", image.width, image.height, id);
        Ok(id)
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<ModelId, RenderError> {
        if vertices.is_empty() {
            return Err(RenderError::EmptyVertexBuffer);
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("model_vertex_buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = ModelId(self.allocate());
        self.models.insert(
            id,
            GpuModel {
                buffer,
                vertex_count: vertices.len() as u32,
            },
        );
        Ok(id)
    }

    fn begin_frame(&mut self, viewport: Viewport) {
        self.frame = Some(PendingFrame {
            viewport,
            draws: Vec::new(),
            error: None,
        });
    }

    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        let result = self
            .check_shader(sprite.shader, ShaderKind::Sprite)
            .and_then(|()| {
                if self.textures.contains_key(&sprite.texture) {
                    Ok(())
                } else {
                    Err(RenderError::UnknownTexture(sprite.texture))
                }
            })
            .and_then(|()| self.check_model(sprite.model))
            .map(|()| {
                vec![QueuedDraw {
                    depth: sprite.depth,
                    shader: sprite.shader,
                    texture: Some(sprite.texture),
                    model: sprite.model,
                    instance: sprite_instance(sprite),
                }]
            });
        self.queue_draw(result);
    }

    fn draw_text(&mut self, text: &TextDraw) {
        let result = self
            .check_shader(text.shader, ShaderKind::Text)
            .and_then(|()| self.check_model(text.model))
            .map(|()| {
                text_instances(text)
                    .into_iter()
                    .map(|instance| QueuedDraw {
                        depth: text.depth,
                        shader: text.shader,
                        texture: None,
                        model: text.model,
                        instance,
                    })
                    .collect::<Vec<_>>()
            });
        self.queue_draw(result);
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let frame = self.frame.take().ok_or(RenderError::FrameNotStarted)?;
        if let Some(err) = frame.error {
            return Err(err);
        }
        self.render(frame.viewport, frame.draws)
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
            if let Some(gpu) = self.textures.remove(&texture) {
                gpu.texture.destroy();
            }
        }
        if let Some(model) = self.models.remove(&resources.sprite_model) {
            model.buffer.destroy();
        }
        log::info!("Released GPU resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn queued(depth: f32, shader: u32, texture: Option<u32>) -> QueuedDraw {
        QueuedDraw {
            depth,
            shader: ShaderId(shader),
            texture: texture.map(TextureId),
            model: ModelId(1),
            instance: Instance {
                model: Mat4::IDENTITY.to_cols_array_2d(),
                color: [depth, 0.0, 0.0, 1.0],
            },
        }
    }

    #[test]
    fn test_projection_maps_world_corners() {
        let proj = projection();
        let corner = proj * Vec4::new(8.0, 4.5, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
        let center = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(center.x.abs() < 1e-6 && center.y.abs() < 1e-6);
    }

    #[test]
    fn test_sprite_instance_transform() {
        let sprite = SpriteDraw {
            shader: ShaderId(1),
            texture: TextureId(2),
            model: ModelId(3),
            position: Vec2::new(2.0, -1.0),
            depth: 0.0,
            rotation_degrees: 90.0,
            scale: Vec2::new(2.0, 1.0),
        };
        let model = Mat4::from_cols_array_2d(&sprite_instance(&sprite).model);
        // Right edge of the unit quad rotates to the top
        let p = model.transform_point3(glam::Vec3::new(0.5, 0.0, 0.0));
        assert!((p.x - 2.0).abs() < 1e-5);
        assert!((p.y - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_text_instances_one_per_cell() {
        let text = TextDraw {
            shader: ShaderId(1),
            model: ModelId(1),
            text: "000".into(),
            position: Vec2::new(-7.0, 3.5),
            depth: 0.5,
            scale: Vec2::splat(0.5),
        };
        let instances = text_instances(&text);
        assert_eq!(instances.len(), font::layout("000").len());
        // Every cell is below and right of the anchor
        for instance in &instances {
            let translation = instance.model[3];
            assert!(translation[0] > -7.0);
            assert!(translation[1] < 3.5);
            assert_eq!(translation[2], 0.5);
        }
    }

    #[test]
    fn test_batches_sorted_back_to_front() {
        let mut draws = vec![
            queued(0.0, 1, Some(2)),
            queued(-0.9, 1, Some(1)),
            queued(-0.9, 1, Some(1)),
            queued(0.5, 2, None),
            queued(-0.5, 1, Some(3)),
        ];
        let (instances, batches) = batch_draws(&mut draws);
        assert_eq!(instances.len(), 5);
        let depths: Vec<f32> = instances.iter().map(|i| i.color[0]).collect();
        assert_eq!(depths, vec![-0.9, -0.9, -0.5, 0.0, 0.5]);

        assert_eq!(batches.len(), 4);
        assert_eq!(batches[0].instances, 0..2);
        assert_eq!(batches[0].texture, Some(TextureId(1)));
        assert_eq!(batches[3].shader, ShaderId(2));
        assert_eq!(batches[3].texture, None);
    }

    #[test]
    fn test_batch_empty_frame() {
        let (instances, batches) = batch_draws(&mut []);
        assert!(instances.is_empty());
        assert!(batches.is_empty());
    }
}
