use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Buffer, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration, TextureView};

use crate::Instant;
use crate::geometry::Mesh;
use crate::tessellate::LiveStroke;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInputState {
    Idle,
    Drawing,
    Dragging,
}

pub struct GpuContext {
    pub surface: Surface<'static>,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    /// Depth-tested, one coverage per stroke.
    pub scene_pipeline: RenderPipeline,
    /// Plain alpha blending for the live stroke, laser, editor and panel.
    pub overlay_pipeline: RenderPipeline,
    pub depth_view: TextureView,
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenUniforms {
    pub screen_size: [f32; 2],
    pub _padding: [f32; 2], // Padding to make it 16-byte aligned
}

pub struct ScreenBuffers {
    pub uniform: Buffer,
    pub bind_group: BindGroup,
}

#[derive(Default)]
pub struct GeometryBuffers {
    pub vertex: Option<Buffer>,
    pub index: Option<Buffer>,
}

impl GeometryBuffers {
    pub fn upload(&mut self, device: &Device, mesh: &Mesh, label: &str) {
        if mesh.is_empty() {
            self.vertex = None;
            self.index = None;
            return;
        }
        self.vertex = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertex buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} index buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

pub struct InputState {
    pub state: UserInputState,
    pub current_stroke: Option<LiveStroke>,
    /// Pointer minus anchor of the text being dragged.
    pub drag_offset: [f32; 2],
}

impl InputState {
    pub fn new() -> Self {
        Self {
            state: UserInputState::Idle,
            current_stroke: None,
            drag_offset: [0.0; 2],
        }
    }
}

/// Open inline text editor; `pos` is the click point at the box's top-left.
pub struct TextInput {
    pub buffer: String,
    pub pos: [f32; 2],
    pub cursor_visible: bool,
    pub blink_timer: Instant,
}

impl TextInput {
    pub fn new(pos: [f32; 2]) -> Self {
        Self {
            buffer: String::new(),
            pos,
            cursor_visible: true,
            blink_timer: Instant::now(),
        }
    }

    pub fn reset_blink(&mut self) {
        self.cursor_visible = true;
        self.blink_timer = Instant::now();
    }
}
