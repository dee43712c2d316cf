use crate::app_state::State;
use crate::scene::{DrawCmd, DrawList};
use crate::state::GeometryBuffers;
use crate::text_renderer::TextLayer;

impl State {
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let [r, g, b, a] = self.scene.background.map(f64::from);
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.draw_list(
                &mut render_pass,
                &self.scene.list,
                &self.scene_geo,
                &self.gpu.scene_pipeline,
                TextLayer::Scene,
            );
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.draw_list(
                &mut render_pass,
                &self.overlay,
                &self.overlay_geo,
                &self.gpu.overlay_pipeline,
                TextLayer::Overlay,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Replays a draw list's commands in order, switching between the shape
    /// pipeline and the text pipeline as needed.
    fn draw_list(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        list: &DrawList,
        geometry: &GeometryBuffers,
        pipeline: &wgpu::RenderPipeline,
        layer: TextLayer,
    ) {
        for cmd in &list.commands {
            match cmd {
                DrawCmd::Shapes(range) => {
                    let (Some(vertex_buffer), Some(index_buffer)) = (&geometry.vertex, &geometry.index) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(0, &self.screen.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                    render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(range.clone(), 0, 0..1);
                }
                DrawCmd::Text(run) => {
                    if self.font.is_some() {
                        self.text_renderer
                            .draw_run(render_pass, &self.screen.bind_group, layer, *run);
                    }
                }
            }
        }
    }
}
