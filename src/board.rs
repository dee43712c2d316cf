use std::time::Duration;

use crate::Instant;
use crate::config::{Config, FONT_SIZE_RANGE, OPACITY_RANGE, WIDTH_RANGE};
use crate::drawing::{Annotation, Color, Stroke, TextAnnotation, Tool};
use crate::geometry::Rect;
use crate::history::History;
use crate::laser::LaserPointer;
use crate::scene::{DrawList, SceneParams, TextRun};
use crate::selection::{TextMeasure, hit_test_text};
use crate::state::{InputState, TextInput, UserInputState};
use crate::tessellate::LiveStroke;
use crate::ui::{ColorTarget, PanelModel, SliderKind, UiAction};

pub const CARET_BLINK: Duration = Duration::from_millis(500);

const EDITOR_MIN_WIDTH: f32 = 100.0;
const EDITOR_BORDER: Color = [0.231, 0.51, 0.965, 1.0];
const PLACEHOLDER: Color = [0.6, 0.6, 0.6, 1.0];
const PLACEHOLDER_TEXT: &str = "Type here...";

/// Everything the user can change, independent of the GPU.
pub struct Whiteboard {
    pub history: History,
    pub tool: Tool,
    pub stroke_color: Color,
    pub laser: LaserPointer,
    pub background: Color,
    pub line_width: f32,
    pub highlighter_opacity: f32,
    pub font_size: f32,
    pub panel_visible: bool,
    pub selection: Option<usize>,
    pub input: InputState,
    pub typing: Option<TextInput>,
    scene_dirty: bool,
}

impl Whiteboard {
    pub fn new(config: &Config) -> Self {
        let tools = &config.tools;
        let mut board = Self {
            history: History::new(),
            tool: tools.default_tool,
            stroke_color: tools.stroke_color.0,
            laser: LaserPointer::new(tools.laser_color.0),
            background: tools.background.0,
            line_width: tools.line_width,
            highlighter_opacity: tools.highlighter_opacity,
            font_size: tools.font_size,
            panel_visible: config.panel.visible,
            selection: None,
            input: InputState::new(),
            typing: None,
            scene_dirty: true,
        };
        board.laser.sync(board.tool == Tool::Laser);
        board
    }

    pub fn mark_scene_dirty(&mut self) {
        self.scene_dirty = true;
    }

    /// Whether the committed scene must be rebuilt; resets the flag.
    pub fn take_scene_dirty(&mut self) -> bool {
        std::mem::take(&mut self.scene_dirty)
    }

    pub fn scene_params(&self) -> SceneParams {
        SceneParams {
            background: self.background,
            selection: self.selection,
            show_selection: self.tool == Tool::Move,
        }
    }

    pub fn panel_model(&self) -> PanelModel {
        PanelModel {
            visible: self.panel_visible,
            tool: self.tool,
            stroke_color: self.stroke_color,
            laser_color: self.laser.color,
            background: self.background,
            line_width: self.line_width,
            highlighter_opacity: self.highlighter_opacity,
            font_size: self.font_size,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.submit_text();
        self.end_gesture();
        if self.tool != tool {
            log::debug!("tool: {} -> {}", self.tool.name(), tool.name());
            self.tool = tool;
            self.scene_dirty = true;
        }
        self.laser.sync(tool == Tool::Laser);
    }

    pub fn pointer_down(&mut self, pos: [f32; 2], measure: &dyn TextMeasure) {
        if self.editor_box(measure).is_some_and(|rect| rect.contains(pos)) {
            return;
        }
        self.submit_text();
        self.end_gesture();

        match self.tool {
            Tool::Laser => {}
            Tool::Move => {
                match hit_test_text(self.history.items(), pos, measure) {
                    Some(index) => {
                        let anchor = self.history.get(index).and_then(Annotation::as_text).map(|t| t.anchor);
                        if let Some(anchor) = anchor {
                            self.input.drag_offset = [pos[0] - anchor[0], pos[1] - anchor[1]];
                            self.input.state = UserInputState::Dragging;
                        }
                        self.selection = Some(index);
                    }
                    None => self.selection = None,
                }
                self.scene_dirty = true;
            }
            Tool::Text => {
                self.typing = Some(TextInput::new(pos));
            }
            Tool::Pencil | Tool::Pen | Tool::Highlighter => {
                let Some(style) = self.tool.pen_style() else {
                    return;
                };
                self.input.current_stroke = Some(LiveStroke::begin(Stroke {
                    points: vec![pos],
                    style,
                    color: self.stroke_color,
                    width: self.line_width,
                    opacity: self.highlighter_opacity,
                }));
                self.input.state = UserInputState::Drawing;
            }
        }
    }

    pub fn pointer_move(&mut self, pos: [f32; 2]) {
        if self.tool == Tool::Laser {
            self.laser.track(pos);
            self.laser.sync(true);
        }
        match self.input.state {
            UserInputState::Drawing => {
                if let Some(live) = self.input.current_stroke.as_mut() {
                    live.push(pos);
                }
            }
            UserInputState::Dragging => {
                let offset = self.input.drag_offset;
                if let Some(index) = self.selection {
                    if self.history.move_text(index, [pos[0] - offset[0], pos[1] - offset[1]]) {
                        self.scene_dirty = true;
                    }
                }
            }
            UserInputState::Idle => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_gesture();
    }

    pub fn pointer_leave(&mut self) {
        self.end_gesture();
        self.laser.hide();
        self.laser.sync(self.tool == Tool::Laser);
    }

    pub fn is_gesture_active(&self) -> bool {
        self.input.state != UserInputState::Idle
    }

    fn end_gesture(&mut self) {
        match self.input.state {
            UserInputState::Drawing => {
                if let Some(live) = self.input.current_stroke.take() {
                    let stroke = live.finish();
                    if !stroke.points.is_empty() {
                        log::debug!("commit {} stroke, {} points", self.tool.name(), stroke.points.len());
                        self.history.commit(Annotation::Stroke(stroke));
                        self.scene_dirty = true;
                    }
                }
            }
            UserInputState::Dragging | UserInputState::Idle => {}
        }
        self.input.state = UserInputState::Idle;
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    /// Commits the draft one font size below the click point. An empty
    /// draft just closes the editor.
    pub fn submit_text(&mut self) {
        let Some(input) = self.typing.take() else {
            return;
        };
        if input.buffer.is_empty() {
            return;
        }
        log::debug!("commit text {:?}", input.buffer);
        self.history.commit(Annotation::Text(TextAnnotation {
            content: input.buffer,
            anchor: [input.pos[0], input.pos[1] + self.font_size],
            color: self.stroke_color,
            font_size: self.font_size,
        }));
        self.scene_dirty = true;
    }

    pub fn cancel_text(&mut self) {
        self.typing = None;
    }

    pub fn insert_text(&mut self, text: &str) {
        if let Some(input) = self.typing.as_mut() {
            input.buffer.extend(text.chars().filter(|c| !c.is_control()));
            input.reset_blink();
        }
    }

    pub fn newline(&mut self) {
        if let Some(input) = self.typing.as_mut() {
            input.buffer.push('\n');
            input.reset_blink();
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.typing.as_mut() {
            input.buffer.pop();
            input.reset_blink();
        }
    }

    /// Flips the caret when its blink period has elapsed; returns whether it did.
    pub fn tick_caret(&mut self, now: Instant) -> bool {
        match self.typing.as_mut() {
            Some(input) if now.duration_since(input.blink_timer) >= CARET_BLINK => {
                input.cursor_visible = !input.cursor_visible;
                input.blink_timer = now;
                true
            }
            _ => false,
        }
    }

    pub fn next_caret_blink(&self) -> Option<Instant> {
        self.typing.as_ref().map(|input| input.blink_timer + CARET_BLINK)
    }

    pub fn undo(&mut self) {
        if self.history.undo() {
            log::debug!("undo, {} left", self.history.len());
            self.fix_selection();
            self.scene_dirty = true;
        }
    }

    pub fn redo(&mut self) {
        if self.history.redo() {
            log::debug!("redo, {} annotations", self.history.len());
            self.fix_selection();
            self.scene_dirty = true;
        }
    }

    pub fn clear(&mut self) {
        log::debug!("clear");
        self.history.clear();
        self.selection = None;
        self.scene_dirty = true;
    }

    fn fix_selection(&mut self) {
        let still_text = self
            .selection
            .and_then(|index| self.history.get(index))
            .and_then(Annotation::as_text)
            .is_some();
        if !still_text {
            self.selection = None;
        }
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    pub fn set_laser_color(&mut self, color: Color) {
        self.laser.color = color;
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
        self.scene_dirty = true;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width.clamp(WIDTH_RANGE.0, WIDTH_RANGE.1);
    }

    pub fn set_highlighter_opacity(&mut self, opacity: f32) {
        self.highlighter_opacity = opacity.clamp(OPACITY_RANGE.0, OPACITY_RANGE.1);
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
    }

    pub fn toggle_panel(&mut self) {
        self.panel_visible = !self.panel_visible;
    }

    /// Applies a panel action. Touching the panel takes focus from the editor,
    /// so any draft is submitted first.
    pub fn apply(&mut self, action: UiAction) {
        self.submit_text();
        match action {
            UiAction::SelectTool(tool) => self.set_tool(tool),
            UiAction::PickColor(ColorTarget::Stroke, color) => self.set_stroke_color(color),
            UiAction::PickColor(ColorTarget::Laser, color) => self.set_laser_color(color),
            UiAction::PickColor(ColorTarget::Background, color) => self.set_background(color),
            UiAction::SetSlider(SliderKind::Width, v) => self.set_line_width(v),
            UiAction::SetSlider(SliderKind::Opacity, v) => self.set_highlighter_opacity(v),
            UiAction::SetSlider(SliderKind::FontSize, v) => self.set_font_size(v),
            UiAction::Undo => self.undo(),
            UiAction::Redo => self.redo(),
            UiAction::Clear => self.clear(),
            UiAction::TogglePanel => self.toggle_panel(),
            UiAction::Consumed => {}
        }
    }

    /// Border of the open editor, anchored at the click point.
    pub fn editor_box(&self, measure: &dyn TextMeasure) -> Option<Rect> {
        let input = self.typing.as_ref()?;
        let width = measure.text_width(&input.buffer, self.font_size) + self.font_size * 0.5;
        Some(Rect::from_origin_size(
            input.pos,
            [width.max(EDITOR_MIN_WIDTH), self.font_size * 1.5],
        ))
    }

    /// Transient layers above the committed scene: live stroke, editor, laser.
    pub fn draw_overlay(&self, list: &mut DrawList, measure: &dyn TextMeasure) {
        if let Some(live) = &self.input.current_stroke {
            list.mesh.append(&live.mesh);
        }

        if let (Some(input), Some(rect)) = (&self.typing, self.editor_box(measure)) {
            list.mesh.stroke_rect(rect, 1.0, 0.0, EDITOR_BORDER);
            let baseline = [input.pos[0], input.pos[1] + self.font_size];
            let (content, color) = if input.buffer.is_empty() {
                (PLACEHOLDER_TEXT, PLACEHOLDER)
            } else {
                (input.buffer.as_str(), self.stroke_color)
            };
            list.push_text(TextRun {
                content: content.to_string(),
                origin: baseline,
                size: self.font_size,
                color,
            });
            if input.cursor_visible {
                let x = baseline[0] + measure.text_width(&input.buffer, self.font_size) + 1.0;
                list.mesh.line(
                    [x, baseline[1] - self.font_size * 0.9],
                    [x, baseline[1] + self.font_size * 0.2],
                    1.5,
                    0.0,
                    0.0,
                    self.stroke_color,
                );
            }
        }

        if self.tool == Tool::Laser && self.laser.visible {
            self.laser.draw(&mut list.mesh);
        }
    }
}
