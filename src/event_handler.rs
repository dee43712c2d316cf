use winit::event::*;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::app_state::{State, create_depth_view, measure_of};
use crate::drawing::Tool;
use crate::state::ScreenUniforms;

impl State {
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.gpu.config.width = new_size.width;
            self.gpu.config.height = new_size.height;
            self.gpu
                .surface
                .configure(&self.gpu.device, &self.gpu.config);
            self.gpu.depth_view = create_depth_view(&self.gpu.device, &self.gpu.config);

            let screen_uniforms = ScreenUniforms {
                screen_size: [new_size.width as f32, new_size.height as f32],
                _padding: [0.0, 0.0],
            };
            self.gpu.queue.write_buffer(
                &self.screen.uniform,
                0,
                bytemuck::cast_slice(&[screen_uniforms]),
            );
            self.board.mark_scene_dirty();
        }
    }

    /// Routes a window event to the panel or the board. Returns whether the
    /// event was consumed; unconsumed events fall through to the app.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = [position.x as f32, position.y as f32];
                self.cursor = pos;
                self.pointer_moved(pos);
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => self.pointer_pressed(self.cursor),
                    ElementState::Released => self.pointer_released(),
                }
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.panel.release();
                self.board.pointer_leave();
                true
            }
            WindowEvent::Touch(touch) => {
                let pos = [touch.location.x as f32, touch.location.y as f32];
                match touch.phase {
                    TouchPhase::Started if self.touch_id.is_none() => {
                        self.touch_id = Some(touch.id);
                        self.cursor = pos;
                        self.pointer_moved(pos);
                        self.pointer_pressed(pos);
                    }
                    TouchPhase::Moved if self.touch_id == Some(touch.id) => {
                        self.cursor = pos;
                        self.pointer_moved(pos);
                    }
                    TouchPhase::Ended if self.touch_id == Some(touch.id) => {
                        self.touch_id = None;
                        self.pointer_released();
                    }
                    TouchPhase::Cancelled if self.touch_id == Some(touch.id) => {
                        self.touch_id = None;
                        self.panel.release();
                        self.board.pointer_leave();
                    }
                    _ => return false,
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.board.submit_text();
                self.board.pointer_up();
                self.panel.release();
                true
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if key_event.state != ElementState::Pressed {
                    return false;
                }
                self.key_pressed(key_event)
            }
            WindowEvent::Ime(Ime::Commit(text)) => {
                if self.board.is_typing() {
                    self.board.insert_text(text);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn pointer_pressed(&mut self, pos: [f32; 2]) {
        let model = self.board.panel_model();
        if let Some(action) = self.panel.press(pos, &model, self.size.width as f32) {
            log::trace!("panel action {action:?}");
            self.board.apply(action);
            return;
        }
        self.board.pointer_down(pos, measure_of(self.font.as_ref()));
    }

    fn pointer_moved(&mut self, pos: [f32; 2]) {
        if let Some(action) = self.panel.drag(pos) {
            self.board.apply(action);
            return;
        }
        let model = self.board.panel_model();
        if self.panel.is_over(pos, &model, self.size.width as f32) {
            // the panel sits above the board, so entering it leaves the board
            self.board.pointer_leave();
            return;
        }
        self.board.pointer_move(pos);
    }

    fn pointer_released(&mut self) {
        if self.panel.release() {
            return;
        }
        self.board.pointer_up();
    }

    fn key_pressed(&mut self, key_event: &KeyEvent) -> bool {
        let PhysicalKey::Code(keycode) = key_event.physical_key else {
            return false;
        };
        let shift = self.modifiers.shift_key();

        if self.board.is_typing() {
            match keycode {
                KeyCode::Escape => self.board.cancel_text(),
                KeyCode::Enter | KeyCode::NumpadEnter if shift => self.board.newline(),
                KeyCode::Enter | KeyCode::NumpadEnter => self.board.submit_text(),
                KeyCode::Backspace => self.board.backspace(),
                _ => {
                    if let Some(text) = &key_event.text {
                        self.board.insert_text(text);
                    }
                }
            }
            return true;
        }

        let is_ctrl_or_cmd = self.modifiers.control_key() || self.modifiers.super_key();
        match keycode {
            KeyCode::KeyZ if is_ctrl_or_cmd && shift => self.board.redo(),
            KeyCode::KeyZ if is_ctrl_or_cmd => self.board.undo(),
            KeyCode::KeyY if is_ctrl_or_cmd => self.board.redo(),
            KeyCode::Digit1 => self.board.set_tool(Tool::Pencil),
            KeyCode::Digit2 => self.board.set_tool(Tool::Pen),
            KeyCode::Digit3 => self.board.set_tool(Tool::Highlighter),
            KeyCode::Digit4 => self.board.set_tool(Tool::Laser),
            KeyCode::Digit5 => self.board.set_tool(Tool::Text),
            KeyCode::Digit6 => self.board.set_tool(Tool::Move),
            _ => return false,
        }
        true
    }
}
