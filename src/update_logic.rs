use winit::window::CursorIcon;

use crate::app_state::{State, measure_of};
use crate::drawing::Tool;
use crate::scene::{DrawList, build_scene};
use crate::text_renderer::TextLayer;

impl State {
    pub fn update(&mut self) {
        let measure = measure_of(self.font.as_ref());
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;

        let scene_rebuilt = self.board.take_scene_dirty();
        if scene_rebuilt {
            self.scene = build_scene(self.board.history.items(), &self.board.scene_params(), measure);
            self.scene_geo.upload(device, &self.scene.list.mesh, "scene");
            log::trace!(
                "scene rebuilt: {} annotations, {} vertices",
                self.board.history.len(),
                self.scene.list.mesh.vertices.len()
            );
        }

        let mut overlay = DrawList::new();
        self.board.draw_overlay(&mut overlay, measure);
        self.panel
            .draw(&mut overlay, &self.board.panel_model(), self.size.width as f32);
        self.overlay = overlay.finish();
        self.overlay_geo.upload(device, &self.overlay.mesh, "overlay");

        if let Some(font) = &self.font {
            if scene_rebuilt {
                self.text_renderer
                    .prepare(device, queue, font, TextLayer::Scene, &self.scene.list.texts);
            }
            let flushed = self
                .text_renderer
                .prepare(device, queue, font, TextLayer::Overlay, &self.overlay.texts);
            if flushed {
                self.text_renderer
                    .prepare(device, queue, font, TextLayer::Scene, &self.scene.list.texts);
            }
        }

        let icon = if self.board.tool == Tool::Move {
            CursorIcon::Move
        } else {
            CursorIcon::Crosshair
        };
        if icon != self.cursor_icon {
            self.window.set_cursor(icon);
            self.cursor_icon = icon;
        }
    }
}
