use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Range;

use ab_glyph::{Font, GlyphId, point};
use wgpu::util::DeviceExt;

use crate::font::SansFont;
use crate::scene::TextRun;
use crate::state::DEPTH_FORMAT;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextVertex {
    pos: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl TextVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TextVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Clone, Copy)]
struct GlyphInfo {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    /// Offset of the bitmap's top-left from the pen position on the baseline.
    bearing: [f32; 2],
    size: [f32; 2],
}

const ATLAS_SIZE: u32 = 1024;
const GLYPH_PADDING: u32 = 1;

/// Key: glyph and pixel size in quarter pixels.
type GlyphKey = (GlyphId, u32);

#[derive(Debug)]
struct AtlasFull;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayer {
    Scene,
    Overlay,
}

#[derive(Default)]
struct TextBatch {
    vertices: Vec<TextVertex>,
    indices: Vec<u32>,
    /// Index range of each prepared run, by run position.
    runs: Vec<Range<u32>>,
    vbuf: Option<wgpu::Buffer>,
    ibuf: Option<wgpu::Buffer>,
}

impl TextBatch {
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.runs.clear();
    }
}

/// Coverage atlas of rasterized glyphs, drawn as one textured quad each.
pub struct TextRenderer {
    tex: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    cache: HashMap<GlyphKey, Option<GlyphInfo>>,
    next_x: u32,
    next_y: u32,
    row_h: u32,
    scene_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    scene: TextBatch,
    overlay: TextBatch,
}

impl TextRenderer {
    pub fn new(
        device: &wgpu::Device,
        fmt: wgpu::TextureFormat,
        screen_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("text-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bgl,
            label: Some("text-bg"),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("text-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../data/shaders/text_shader.wgsl").into()),
        });
        let pl_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text-pl"),
            bind_group_layouts: &[screen_bind_group_layout, &bgl],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, depth_stencil: Option<wgpu::DepthStencilState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pl_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[TextVertex::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: fmt,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        // Text shares the scene pass with depth-tested strokes but never occludes them.
        let scene_pipeline = make_pipeline(
            "text-scene-pipe",
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        let overlay_pipeline = make_pipeline("text-overlay-pipe", None);

        Self {
            tex,
            bind_group,
            cache: HashMap::new(),
            next_x: 0,
            next_y: 0,
            row_h: 0,
            scene_pipeline,
            overlay_pipeline,
            scene: TextBatch::default(),
            overlay: TextBatch::default(),
        }
    }

    fn reset_atlas(&mut self) {
        self.cache.clear();
        self.next_x = 0;
        self.next_y = 0;
        self.row_h = 0;
    }

    /// Rasterizes a glyph into the atlas on first use. `None` for glyphs
    /// without an outline, such as spaces.
    fn cache_glyph(
        &mut self,
        queue: &wgpu::Queue,
        font: &SansFont,
        id: GlyphId,
        size: f32,
    ) -> Result<Option<GlyphInfo>, AtlasFull> {
        let key = (id, (size * 4.0).round() as u32);
        let vacant = match self.cache.entry(key) {
            Entry::Occupied(entry) => return Ok(*entry.get()),
            Entry::Vacant(vacant) => vacant,
        };

        let Some(outline) = font.font().outline_glyph(id.with_scale_and_position(size, point(0.0, 0.0))) else {
            vacant.insert(None);
            return Ok(None);
        };
        let bb = outline.px_bounds();
        let (w, h) = (bb.width() as u32, bb.height() as u32);
        if w == 0 || h == 0 {
            vacant.insert(None);
            return Ok(None);
        }

        if self.next_x + w > ATLAS_SIZE {
            self.next_x = 0;
            self.next_y += self.row_h + GLYPH_PADDING;
            self.row_h = 0;
        }
        if self.next_y + h > ATLAS_SIZE || w > ATLAS_SIZE {
            return Err(AtlasFull);
        }

        let mut rgba = vec![0u8; (w * h * 4) as usize];
        outline.draw(|x, y, coverage| {
            let i = ((y * w + x) * 4) as usize;
            if let Some(px) = rgba.get_mut(i..i + 4) {
                px.copy_from_slice(&[255, 255, 255, (coverage.clamp(0.0, 1.0) * 255.0) as u8]);
            }
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: self.next_x,
                    y: self.next_y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w * 4),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );

        let atlas = ATLAS_SIZE as f32;
        let info = GlyphInfo {
            uv_min: [self.next_x as f32 / atlas, self.next_y as f32 / atlas],
            uv_max: [(self.next_x + w) as f32 / atlas, (self.next_y + h) as f32 / atlas],
            bearing: [bb.min.x, bb.min.y],
            size: [w as f32, h as f32],
        };
        self.next_x += w + GLYPH_PADDING;
        self.row_h = self.row_h.max(h);
        self.cache.insert(key, Some(info));
        Ok(Some(info))
    }

    fn build(
        &mut self,
        queue: &wgpu::Queue,
        font: &SansFont,
        runs: &[TextRun],
        batch: &mut TextBatch,
    ) -> Result<(), AtlasFull> {
        batch.clear();
        for run in runs {
            let start = batch.indices.len() as u32;
            let origin = [run.origin[0].round(), run.origin[1].round()];
            for glyph in font.layout(&run.content, run.size, origin) {
                let Some(info) = self.cache_glyph(queue, font, glyph.id, run.size)? else {
                    continue;
                };
                let x0 = glyph.position.x.round() + info.bearing[0];
                let y0 = glyph.position.y + info.bearing[1];
                let (x1, y1) = (x0 + info.size[0], y0 + info.size[1]);
                let [u0, v0] = info.uv_min;
                let [u1, v1] = info.uv_max;
                let color = run.color;
                let base = batch.vertices.len() as u32;
                batch.vertices.extend_from_slice(&[
                    TextVertex { pos: [x0, y0], uv: [u0, v0], color },
                    TextVertex { pos: [x1, y0], uv: [u1, v0], color },
                    TextVertex { pos: [x1, y1], uv: [u1, v1], color },
                    TextVertex { pos: [x0, y1], uv: [u0, v1], color },
                ]);
                batch
                    .indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
            batch.runs.push(start..batch.indices.len() as u32);
        }
        Ok(())
    }

    /// Lays out `runs` for one layer and uploads them. Returns `true` when the
    /// atlas had to be flushed, which invalidates the other layer's batch.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        font: &SansFont,
        layer: TextLayer,
        runs: &[TextRun],
    ) -> bool {
        let mut batch = std::mem::take(self.batch_mut(layer));
        let mut reset = false;
        if self.build(queue, font, runs, &mut batch).is_err() {
            log::warn!("glyph atlas full, flushing {} cached glyphs", self.cache.len());
            self.reset_atlas();
            reset = true;
            if self.build(queue, font, runs, &mut batch).is_err() {
                log::warn!("text does not fit in the glyph atlas, some glyphs are skipped");
            }
        }

        if batch.vertices.is_empty() {
            batch.vbuf = None;
            batch.ibuf = None;
        } else {
            batch.vbuf = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("text vbuf"),
                contents: bytemuck::cast_slice(&batch.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }));
            batch.ibuf = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("text ibuf"),
                contents: bytemuck::cast_slice(&batch.indices),
                usage: wgpu::BufferUsages::INDEX,
            }));
        }
        *self.batch_mut(layer) = batch;
        reset
    }

    fn batch(&self, layer: TextLayer) -> &TextBatch {
        match layer {
            TextLayer::Scene => &self.scene,
            TextLayer::Overlay => &self.overlay,
        }
    }

    fn batch_mut(&mut self, layer: TextLayer) -> &mut TextBatch {
        match layer {
            TextLayer::Scene => &mut self.scene,
            TextLayer::Overlay => &mut self.overlay,
        }
    }

    /// Draws one prepared run. Leaves the pass's pipeline and buffers changed.
    pub fn draw_run(
        &self,
        rp: &mut wgpu::RenderPass<'_>,
        screen_bind_group: &wgpu::BindGroup,
        layer: TextLayer,
        run: usize,
    ) {
        let batch = self.batch(layer);
        let (Some(vb), Some(ib), Some(range)) = (&batch.vbuf, &batch.ibuf, batch.runs.get(run)) else {
            return;
        };
        if range.is_empty() {
            return;
        }
        let pipeline = match layer {
            TextLayer::Scene => &self.scene_pipeline,
            TextLayer::Overlay => &self.overlay_pipeline,
        };
        rp.set_pipeline(pipeline);
        rp.set_bind_group(0, screen_bind_group, &[]);
        rp.set_bind_group(1, &self.bind_group, &[]);
        rp.set_vertex_buffer(0, vb.slice(..));
        rp.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
        rp.draw_indexed(range.clone(), 0, 0..1);
    }
}
