//! WebGPU render pipeline setup
//!
//! One shader, four pipeline presets. Stage geometry lives in immutable
//! buffers replaced on every restage; per-frame geometry goes through
//! preallocated buffers, and the trail only uploads the samples added since
//! the previous frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use super::vertex::{Vertex, colors};
use crate::consts::TRAJECTORY_CAPACITY;
use crate::driver::FrameRenderer;
use crate::scene::{MeshSet, RulerLabel, SceneBuilder, StaticScene, trajectory_vertices};
use crate::sim::Experiment;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const FOG_DENSITY: f32 = 0.005;

const AMBIENT_INTENSITY: f32 = 0.5;
const SUN_INTENSITY: f32 = 1.2;
const SUN_POSITION: Vec3 = Vec3::new(50.0, 80.0, 60.0);
const FILL_INTENSITY: f32 = 0.8;
const FILL_POSITION: Vec3 = Vec3::new(-50.0, 20.0, -50.0);

/// Initial vertex capacity of the per-frame buffers
const DYNAMIC_OPAQUE_CAPACITY: usize = 1024;
const DYNAMIC_TRANSLUCENT_CAPACITY: usize = 8192;
const DYNAMIC_LINES_CAPACITY: usize = 64;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    fog: [f32; 4],
    ambient: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    fill_dir: [f32; 4],
    fill_color: [f32; 4],
}

impl Globals {
    fn for_lab(lab: &Experiment) -> Self {
        let light = |hex: u32, intensity: f32| {
            let [r, g, b] = colors::rgb(hex);
            [r * intensity, g * intensity, b * intensity, 0.0]
        };
        let [fr, fg, fb] = colors::rgb(colors::SKY);
        Self {
            view_proj: lab.camera.view_projection().to_cols_array_2d(),
            camera_pos: lab.camera.position.extend(1.0).to_array(),
            fog: [fr, fg, fb, FOG_DENSITY],
            ambient: light(0xffffff, AMBIENT_INTENSITY),
            sun_dir: SUN_POSITION.normalize().extend(0.0).to_array(),
            sun_color: light(colors::SUN, SUN_INTENSITY),
            fill_dir: FILL_POSITION.normalize().extend(0.0).to_array(),
            fill_color: light(colors::FILL, FILL_INTENSITY),
        }
    }
}

// ============================================================================
// PIPELINE PRESETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePreset {
    /// Lit solids
    Opaque,
    /// Lit, alpha-blended, no depth writes (ocean, splash)
    Translucent,
    /// Unlit line list (ruler, arrow shafts)
    Lines,
    /// Unlit line strip (trail)
    LineStrip,
}

impl PipelinePreset {
    fn topology(&self) -> wgpu::PrimitiveTopology {
        match self {
            PipelinePreset::Lines => wgpu::PrimitiveTopology::LineList,
            PipelinePreset::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            _ => wgpu::PrimitiveTopology::TriangleList,
        }
    }

    fn blend(&self) -> Option<wgpu::BlendState> {
        match self {
            PipelinePreset::Translucent | PipelinePreset::Lines => {
                Some(wgpu::BlendState::ALPHA_BLENDING)
            }
            _ => None,
        }
    }

    fn depth_write_enabled(&self) -> bool {
        !matches!(self, PipelinePreset::Translucent)
    }

    fn fragment_entry(&self) -> &'static str {
        match self {
            PipelinePreset::Opaque | PipelinePreset::Translucent => "fs_lit",
            PipelinePreset::Lines | PipelinePreset::LineStrip => "fs_unlit",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PipelinePreset::Opaque => "opaque_pipeline",
            PipelinePreset::Translucent => "translucent_pipeline",
            PipelinePreset::Lines => "lines_pipeline",
            PipelinePreset::LineStrip => "line_strip_pipeline",
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    preset: PipelinePreset,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(preset.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(preset.fragment_entry()),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: preset.blend(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: preset.topology(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: preset.depth_write_enabled(),
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Shrink a backing size uniformly until both sides fit `max_dim`
pub fn fit_surface(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let (width, height) = (width.max(1), height.max(1));
    let longest = width.max(height);
    if longest <= max_dim {
        return (width, height);
    }
    let shrink = |side: u32| ((side as u64 * max_dim as u64 / longest as u64) as u32).max(1);
    (shrink(width), shrink(height))
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

// ============================================================================
// GPU MESHES
// ============================================================================

/// Immutable vertex buffer
struct StaticMesh {
    buffer: wgpu::Buffer,
    count: u32,
}

impl StaticMesh {
    fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> Self {
        // Never create an empty buffer
        let placeholder = [Vertex::new([0.0; 3], [0.0; 3], [0.0; 4])];
        let contents = if vertices.is_empty() {
            &placeholder[..]
        } else {
            vertices
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(contents),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            count: vertices.len() as u32,
        }
    }

    fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// Stage geometry on the GPU, tagged with the revision it was built for
struct StageBuffers {
    scene: StaticScene,
    opaque: StaticMesh,
    translucent: StaticMesh,
    lines: StaticMesh,
}

impl StageBuffers {
    fn new(device: &wgpu::Device, scene: StaticScene) -> Self {
        Self {
            opaque: StaticMesh::new(device, "stage_opaque", &scene.meshes.opaque),
            translucent: StaticMesh::new(device, "stage_translucent", &scene.meshes.translucent),
            lines: StaticMesh::new(device, "stage_lines", &scene.meshes.lines),
            scene,
        }
    }

    fn destroy(&self) {
        self.opaque.destroy();
        self.translucent.destroy();
        self.lines.destroy();
    }
}

/// Growable vertex buffer rewritten every frame
struct DynamicMesh {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl DynamicMesh {
    fn new(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
            count: 0,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (std::mem::size_of::<Vertex>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[Vertex]) {
        if vertices.len() > self.capacity {
            self.buffer.destroy();
            self.capacity = vertices.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("Grew {} to {} vertices", self.label, self.capacity);
        }
        if !vertices.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
        }
        self.count = vertices.len() as u32;
    }
}

/// Trail buffer sized for a full fall
struct TrailBuffer {
    buffer: wgpu::Buffer,
    uploaded: usize,
    revision: u64,
}

impl TrailBuffer {
    fn new(device: &wgpu::Device) -> Self {
        Self {
            buffer: DynamicMesh::allocate(device, "trajectory", TRAJECTORY_CAPACITY),
            uploaded: 0,
            revision: 0,
        }
    }

    /// Upload only the samples recorded since the last call
    fn sync(&mut self, queue: &wgpu::Queue, lab: &Experiment) {
        let points = lab.trajectory.points();
        if self.revision != lab.stage_revision() || points.len() < self.uploaded {
            self.revision = lab.stage_revision();
            self.uploaded = 0;
        }
        if points.len() > self.uploaded {
            let fresh: Vec<Vertex> = trajectory_vertices(&points[self.uploaded..]).collect();
            let offset = (self.uploaded * std::mem::size_of::<Vertex>()) as u64;
            queue.write_buffer(&self.buffer, offset, bytemuck::cast_slice(&fresh));
            self.uploaded = points.len();
        }
    }
}

fn draw_vertices(pass: &mut wgpu::RenderPass<'_>, buffer: &wgpu::Buffer, count: u32) {
    if count > 0 {
        pass.set_vertex_buffer(0, buffer.slice(..));
        pass.draw(0..count, 0..1);
    }
}

// ============================================================================
// RENDER STATE
// ============================================================================

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Backing size in physical pixels
    pub size: (u32, u32),
    depth_view: wgpu::TextureView,

    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    lines_pipeline: wgpu::RenderPipeline,
    line_strip_pipeline: wgpu::RenderPipeline,

    builder: SceneBuilder,
    stage: Option<StageBuffers>,
    frame_meshes: MeshSet,
    dynamic_opaque: DynamicMesh,
    dynamic_translucent: DynamicMesh,
    dynamic_lines: DynamicMesh,
    trail: TrailBuffer,
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        seed: u64,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("freefall-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        log::info!("Using surface format: {:?}", surface_format);

        let (width, height) =
            fit_surface(width, height, device.limits().max_texture_dimension_2d);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = |preset| create_pipeline(&device, &pipeline_layout, &shader, config.format, preset);
        let opaque_pipeline = pipeline(PipelinePreset::Opaque);
        let translucent_pipeline = pipeline(PipelinePreset::Translucent);
        let lines_pipeline = pipeline(PipelinePreset::Lines);
        let line_strip_pipeline = pipeline(PipelinePreset::LineStrip);

        let depth_view = create_depth_view(&device, width, height);
        let dynamic_opaque = DynamicMesh::new(&device, "dynamic_opaque", DYNAMIC_OPAQUE_CAPACITY);
        let dynamic_translucent =
            DynamicMesh::new(&device, "dynamic_translucent", DYNAMIC_TRANSLUCENT_CAPACITY);
        let dynamic_lines = DynamicMesh::new(&device, "dynamic_lines", DYNAMIC_LINES_CAPACITY);
        let trail = TrailBuffer::new(&device);

        Self {
            surface,
            device,
            queue,
            config,
            size: (width, height),
            depth_view,
            globals_buffer,
            bind_group,
            opaque_pipeline,
            translucent_pipeline,
            lines_pipeline,
            line_strip_pipeline,
            builder: SceneBuilder::new(seed),
            stage: None,
            frame_meshes: MeshSet::default(),
            dynamic_opaque,
            dynamic_translucent,
            dynamic_lines,
            trail,
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            let max_dim = self.device.limits().max_texture_dimension_2d;
            let (width, height) = fit_surface(new_width, new_height, max_dim);
            if (width, height) != (new_width, new_height) {
                log::debug!("Surface {}x{} capped to {}x{}", new_width, new_height, width, height);
            }
            self.size = (width, height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, width, height);
        }
    }

    /// Ruler labels of the current stage
    pub fn stage_labels(&self) -> &[RulerLabel] {
        match &self.stage {
            Some(stage) => &stage.scene.labels,
            None => &[],
        }
    }

    /// Rebuild stage buffers if the experiment was restaged
    fn sync_stage(&mut self, lab: &Experiment) {
        if self.stage.as_ref().is_some_and(|s| !s.scene.is_stale(lab)) {
            return;
        }
        if let Some(old) = self.stage.take() {
            old.destroy();
        }
        let scene = self.builder.build_static(lab);
        self.stage = Some(StageBuffers::new(&self.device, scene));
    }

    pub fn render(&mut self, lab: &Experiment) -> Result<(), wgpu::SurfaceError> {
        self.sync_stage(lab);

        self.builder.build_dynamic(lab, &mut self.frame_meshes);
        self.dynamic_opaque
            .upload(&self.device, &self.queue, &self.frame_meshes.opaque);
        self.dynamic_translucent
            .upload(&self.device, &self.queue, &self.frame_meshes.translucent);
        self.dynamic_lines
            .upload(&self.device, &self.queue, &self.frame_meshes.lines);
        self.trail.sync(&self.queue, lab);

        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::for_lab(lab)),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        let [r, g, b] = colors::rgb(colors::SKY);
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            // Solids first, then lines, then blended surfaces over both
            render_pass.set_pipeline(&self.opaque_pipeline);
            if let Some(stage) = &self.stage {
                draw_vertices(&mut render_pass, &stage.opaque.buffer, stage.opaque.count);
            }
            draw_vertices(
                &mut render_pass,
                &self.dynamic_opaque.buffer,
                self.dynamic_opaque.count,
            );

            render_pass.set_pipeline(&self.lines_pipeline);
            if let Some(stage) = &self.stage {
                draw_vertices(&mut render_pass, &stage.lines.buffer, stage.lines.count);
            }
            draw_vertices(
                &mut render_pass,
                &self.dynamic_lines.buffer,
                self.dynamic_lines.count,
            );

            if self.trail.uploaded >= 2 {
                render_pass.set_pipeline(&self.line_strip_pipeline);
                draw_vertices(
                    &mut render_pass,
                    &self.trail.buffer,
                    self.trail.uploaded as u32,
                );
            }

            render_pass.set_pipeline(&self.translucent_pipeline);
            if let Some(stage) = &self.stage {
                draw_vertices(
                    &mut render_pass,
                    &stage.translucent.buffer,
                    stage.translucent.count,
                );
            }
            draw_vertices(
                &mut render_pass,
                &self.dynamic_translucent.buffer,
                self.dynamic_translucent.count,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl FrameRenderer for RenderState {
    fn render(&mut self, lab: &Experiment) {
        match RenderState::render(self, lab) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = self.size;
                self.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_preset_topology() {
        use wgpu::PrimitiveTopology::*;
        assert_eq!(PipelinePreset::Opaque.topology(), TriangleList);
        assert_eq!(PipelinePreset::Translucent.topology(), TriangleList);
        assert_eq!(PipelinePreset::Lines.topology(), LineList);
        assert_eq!(PipelinePreset::LineStrip.topology(), LineStrip);
    }

    #[test]
    fn test_pipeline_preset_depth_and_blend() {
        assert!(PipelinePreset::Opaque.depth_write_enabled());
        assert!(!PipelinePreset::Translucent.depth_write_enabled());
        assert!(PipelinePreset::Opaque.blend().is_none());
        assert!(PipelinePreset::Translucent.blend().is_some());
        assert_eq!(PipelinePreset::Lines.fragment_entry(), "fs_unlit");
        assert_eq!(PipelinePreset::Opaque.fragment_entry(), "fs_lit");
    }

    #[test]
    fn test_fit_surface_caps_to_device_limit() {
        // Small enough already
        assert_eq!(fit_surface(1280, 720, 2048), (1280, 720));
        assert_eq!(fit_surface(0, 0, 2048), (1, 1));

        // 1280 css px at 2x, or a 4K window, on a 2048 device
        assert_eq!(fit_surface(2560, 1440, 2048), (2048, 1152));
        assert_eq!(fit_surface(3840, 2160, 2048), (2048, 1152));
        let (w, h) = fit_surface(1000, 5000, 2048);
        assert_eq!(h, 2048);
        assert!(w <= 2048 && (w as f32 / h as f32 - 0.2).abs() < 1e-2);
    }

    #[test]
    fn test_globals_layout() {
        // mat4 + seven vec4s, all 16-byte aligned
        assert_eq!(std::mem::size_of::<Globals>(), 64 + 7 * 16);
        let lab = Experiment::new(crate::config::SimulationConfig::default(), 1);
        let g = Globals::for_lab(&lab);
        assert_eq!(g.camera_pos, [30.0, 75.0, 50.0, 1.0]);
        assert_eq!(g.fog[3], FOG_DENSITY);
    }
}
