use std::sync::Arc;

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::keyboard::ModifiersState;
use winit::window::{CursorIcon, Window};

use crate::board::Whiteboard;
use crate::config::Config;
use crate::font::SansFont;
use crate::scene::{DrawList, Scene};
use crate::selection::{ApproxMeasure, TextMeasure};
use crate::state::{DEPTH_FORMAT, GeometryBuffers, GpuContext, ScreenBuffers, ScreenUniforms};
use crate::text_renderer::TextRenderer;
use crate::ui::Panel;
use crate::vertex::Vertex;

pub struct State {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    pub gpu: GpuContext,
    pub screen: ScreenBuffers,
    pub scene_geo: GeometryBuffers,
    pub overlay_geo: GeometryBuffers,
    pub scene: Scene,
    pub overlay: DrawList,

    pub board: Whiteboard,
    pub panel: Panel,
    pub font: Option<SansFont>,
    pub text_renderer: TextRenderer,

    pub cursor: [f32; 2],
    pub modifiers: ModifiersState,
    /// Touch that drives the pointer; later fingers are ignored.
    pub touch_id: Option<u64>,
    pub cursor_icon: CursorIcon,
}

/// The loaded font, or the fixed-advance estimate without one.
pub fn measure_of(font: Option<&SansFont>) -> &dyn TextMeasure {
    match font {
        Some(font) => font as &dyn TextMeasure,
        None => &ApproxMeasure,
    }
}

pub fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl State {
    pub async fn new(window: Arc<Window>, config: &Config) -> anyhow::Result<State> {
        #[allow(unused_mut)]
        let mut size = window.inner_size();

        #[cfg(target_arch = "wasm32")]
        {
            if size.width == 0 || size.height == 0 {
                size = PhysicalSize::new(1920, 1080);
            }
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open GPU device")?;

        // Colors are given as plain hex values, so skip the sRGB encode on write.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);
        log::info!(
            "surface configured: {}x{} {:?}",
            surface_config.width,
            surface_config.height,
            surface_format
        );

        let screen_uniforms = ScreenUniforms {
            screen_size: [surface_config.width as f32, surface_config.height as f32],
            _padding: [0.0, 0.0],
        };
        let screen_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Uniform Buffer"),
            contents: bytemuck::cast_slice(&[screen_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let screen_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
                label: Some("screen_bind_group_layout"),
            });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_uniform_buffer.as_entire_binding(),
            }],
            label: Some("screen_bind_group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../data/shaders/draw_shader.wgsl").into()),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&screen_bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, depth_stencil: Option<wgpu::DepthStencilState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&render_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
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
                depth_stencil,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        // Each stroke has its own depth; `Less` lets a stroke cover a pixel once.
        let scene_pipeline = make_pipeline(
            "Scene Pipeline",
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        let overlay_pipeline = make_pipeline("Overlay Pipeline", None);

        let depth_view = create_depth_view(&device, &surface_config);
        let text_renderer = TextRenderer::new(&device, surface_format, &screen_bind_group_layout);

        let gpu = GpuContext {
            surface,
            device,
            queue,
            config: surface_config,
            scene_pipeline,
            overlay_pipeline,
            depth_view,
        };

        let screen = ScreenBuffers {
            uniform: screen_uniform_buffer,
            bind_group: screen_bind_group,
        };

        let board = Whiteboard::new(config);
        let scene = Scene {
            background: board.background,
            list: DrawList::new(),
        };

        Ok(Self {
            window,
            size,
            gpu,
            screen,
            scene_geo: GeometryBuffers::default(),
            overlay_geo: GeometryBuffers::default(),
            scene,
            overlay: DrawList::new(),
            board,
            panel: Panel::new(&config.panel),
            font: SansFont::discover(config.font_path.as_deref()),
            text_renderer,
            cursor: [0.0; 2],
            modifiers: ModifiersState::empty(),
            touch_id: None,
            cursor_icon: CursorIcon::Default,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}
