use crate::config::{FONT_SIZE_RANGE, OPACITY_RANGE, PanelConfig, WIDTH_RANGE};
use crate::drawing::{Color, Tool, with_alpha};
use crate::geometry::{Mesh, Rect};
use crate::scene::{DrawList, TextRun};

const ORIGIN: [f32; 2] = [16.0, 16.0];
const PADDING: f32 = 16.0;
const BUTTON: f32 = 32.0;
const GAP: f32 = 8.0;
const ROW_GAP: f32 = 12.0;
const CAPTION_H: f32 = 14.0;
const LABEL_W: f32 = 56.0;
const SWATCH: f32 = 18.0;
const SWATCH_GAP: f32 = 4.0;
const SLIDER_W: f32 = 120.0;
const SLIDER_H: f32 = 16.0;
const TOGGLE: f32 = 36.0;
const LABEL_SIZE: f32 = 12.0;

const PANEL_BG: Color = [1.0, 1.0, 1.0, 1.0];
const SHADOW: Color = [0.0, 0.0, 0.0, 0.08];
const BUTTON_BG: Color = [0.953, 0.957, 0.965, 1.0];
const BUTTON_ACTIVE_BG: Color = [0.859, 0.918, 0.996, 1.0];
const ICON: Color = [0.294, 0.333, 0.388, 1.0];
const ICON_ACTIVE: Color = [0.145, 0.388, 0.922, 1.0];
const LABEL: Color = [0.42, 0.447, 0.502, 1.0];
const TRACK: Color = [0.898, 0.906, 0.922, 1.0];
const SWATCH_BORDER: Color = [0.8, 0.8, 0.8, 1.0];

/// What the panel needs to know about the board to lay itself out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelModel {
    pub visible: bool,
    pub tool: Tool,
    pub stroke_color: Color,
    pub laser_color: Color,
    pub background: Color,
    pub line_width: f32,
    pub highlighter_opacity: f32,
    pub font_size: f32,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Stroke,
    Laser,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderKind {
    Width,
    Opacity,
    FontSize,
}

impl SliderKind {
    /// `(min, max, step)`
    pub fn range(self) -> (f32, f32, f32) {
        match self {
            SliderKind::Width => (WIDTH_RANGE.0, WIDTH_RANGE.1, 1.0),
            SliderKind::Opacity => (OPACITY_RANGE.0, OPACITY_RANGE.1, 0.05),
            SliderKind::FontSize => (FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1, 1.0),
        }
    }

    pub fn value_at(self, track: Rect, x: f32) -> f32 {
        let (min, max, step) = self.range();
        let t = ((x - track.min[0]) / track.width()).clamp(0.0, 1.0);
        let raw = min + t * (max - min);
        let snapped = min + ((raw - min) / step).round() * step;
        // keep 0.05 steps exact enough for display and comparisons
        ((snapped * 100.0).round() / 100.0).clamp(min, max)
    }

    pub fn value(self, model: &PanelModel) -> f32 {
        match self {
            SliderKind::Width => model.line_width,
            SliderKind::Opacity => model.highlighter_opacity,
            SliderKind::FontSize => model.font_size,
        }
    }

    fn caption(self) -> &'static str {
        match self {
            SliderKind::Width => "Width",
            SliderKind::Opacity => "Opacity",
            SliderKind::FontSize => "Font",
        }
    }

    pub fn format(self, value: f32) -> String {
        match self {
            SliderKind::Width | SliderKind::FontSize => format!("{}px", value.round() as i32),
            SliderKind::Opacity => format!("{}%", (value * 100.0).round() as i32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionButton {
    Undo,
    Redo,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    SelectTool(Tool),
    PickColor(ColorTarget, Color),
    SetSlider(SliderKind, f32),
    Undo,
    Redo,
    Clear,
    TogglePanel,
    /// Landed on the panel without triggering anything.
    Consumed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum WidgetKind {
    Caption(&'static str),
    ToolButton(Tool),
    Swatch(ColorTarget, Color),
    Slider(SliderKind),
    Action(ActionButton),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Widget {
    rect: Rect,
    kind: WidgetKind,
}

struct Layout {
    panel: Rect,
    widgets: Vec<Widget>,
}

/// Floating control panel plus its show/hide toggle.
pub struct Panel {
    stroke_palette: Vec<Color>,
    background_palette: Vec<Color>,
    active_slider: Option<(SliderKind, Rect)>,
}

impl Panel {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            stroke_palette: config.stroke_palette.iter().map(|c| c.0).collect(),
            background_palette: config.background_palette.iter().map(|c| c.0).collect(),
            active_slider: None,
        }
    }

    fn toggle_rect(screen_width: f32) -> Rect {
        Rect::from_origin_size([screen_width - 16.0 - TOGGLE, 16.0], [TOGGLE, TOGGLE])
    }

    fn visible_sliders(tool: Tool) -> &'static [SliderKind] {
        match tool {
            Tool::Text => &[SliderKind::FontSize],
            Tool::Highlighter => &[SliderKind::Width, SliderKind::Opacity],
            Tool::Laser | Tool::Move => &[],
            Tool::Pencil | Tool::Pen => &[SliderKind::Width],
        }
    }

    fn layout(&self, model: &PanelModel) -> Layout {
        let mut widgets = Vec::new();
        let left = ORIGIN[0] + PADDING;
        let mut y = ORIGIN[1] + PADDING;

        widgets.push(Widget {
            rect: Rect::from_origin_size([left, y], [LABEL_W, CAPTION_H]),
            kind: WidgetKind::Caption("Tool"),
        });
        y += CAPTION_H + 4.0;
        for (i, tool) in Tool::ALL.into_iter().enumerate() {
            widgets.push(Widget {
                rect: Rect::from_origin_size([left + i as f32 * (BUTTON + GAP), y], [BUTTON, BUTTON]),
                kind: WidgetKind::ToolButton(tool),
            });
        }
        y += BUTTON + ROW_GAP;

        let (caption, target) = if model.tool == Tool::Laser {
            ("Laser", ColorTarget::Laser)
        } else {
            ("Color", ColorTarget::Stroke)
        };
        let rows = [
            (caption, target, &self.stroke_palette),
            ("Canvas", ColorTarget::Background, &self.background_palette),
        ];
        for (caption, target, palette) in rows {
            widgets.push(Widget {
                rect: Rect::from_origin_size([left, y], [LABEL_W, SWATCH]),
                kind: WidgetKind::Caption(caption),
            });
            for (i, &color) in palette.iter().enumerate() {
                widgets.push(Widget {
                    rect: Rect::from_origin_size(
                        [left + LABEL_W + i as f32 * (SWATCH + SWATCH_GAP), y],
                        [SWATCH, SWATCH],
                    ),
                    kind: WidgetKind::Swatch(target, color),
                });
            }
            y += SWATCH + GAP;
        }
        y += ROW_GAP - GAP;

        for &kind in Self::visible_sliders(model.tool) {
            widgets.push(Widget {
                rect: Rect::from_origin_size([left, y], [LABEL_W, SLIDER_H]),
                kind: WidgetKind::Caption(kind.caption()),
            });
            widgets.push(Widget {
                rect: Rect::from_origin_size([left + LABEL_W, y], [SLIDER_W, SLIDER_H]),
                kind: WidgetKind::Slider(kind),
            });
            y += SLIDER_H + GAP;
        }

        for (i, action) in [ActionButton::Undo, ActionButton::Redo, ActionButton::Clear]
            .into_iter()
            .enumerate()
        {
            widgets.push(Widget {
                rect: Rect::from_origin_size([left + i as f32 * (BUTTON + GAP), y], [BUTTON, BUTTON]),
                kind: WidgetKind::Action(action),
            });
        }
        y += BUTTON;

        let width = Tool::ALL.len() as f32 * (BUTTON + GAP) - GAP + PADDING * 2.0;
        Layout {
            panel: Rect::new(ORIGIN, [ORIGIN[0] + width, y + PADDING]),
            widgets,
        }
    }

    /// Whether `pos` is covered by the toggle or the visible panel.
    pub fn is_over(&self, pos: [f32; 2], model: &PanelModel, screen_width: f32) -> bool {
        Self::toggle_rect(screen_width).contains(pos)
            || (model.visible && self.layout(model).panel.contains(pos))
    }

    pub fn press(&mut self, pos: [f32; 2], model: &PanelModel, screen_width: f32) -> Option<UiAction> {
        if Self::toggle_rect(screen_width).contains(pos) {
            return Some(UiAction::TogglePanel);
        }
        if !model.visible {
            return None;
        }
        let layout = self.layout(model);
        if !layout.panel.contains(pos) {
            return None;
        }
        let hit = layout
            .widgets
            .iter()
            .filter(|w| !matches!(w.kind, WidgetKind::Caption(_)))
            .find(|w| w.rect.contains(pos));
        let action = match hit.map(|w| (w.kind, w.rect)) {
            Some((WidgetKind::ToolButton(tool), _)) => UiAction::SelectTool(tool),
            Some((WidgetKind::Swatch(target, color), _)) => UiAction::PickColor(target, color),
            Some((WidgetKind::Slider(kind), track)) => {
                self.active_slider = Some((kind, track));
                UiAction::SetSlider(kind, kind.value_at(track, pos[0]))
            }
            Some((WidgetKind::Action(ActionButton::Undo), _)) if model.can_undo => UiAction::Undo,
            Some((WidgetKind::Action(ActionButton::Redo), _)) if model.can_redo => UiAction::Redo,
            Some((WidgetKind::Action(ActionButton::Clear), _)) => UiAction::Clear,
            _ => UiAction::Consumed,
        };
        Some(action)
    }

    /// Continues a slider drag started by [`Panel::press`].
    pub fn drag(&self, pos: [f32; 2]) -> Option<UiAction> {
        self.active_slider
            .map(|(kind, track)| UiAction::SetSlider(kind, kind.value_at(track, pos[0])))
    }

    /// Ends a slider drag; returns whether one was in progress.
    pub fn release(&mut self) -> bool {
        self.active_slider.take().is_some()
    }

    pub fn draw(&self, list: &mut DrawList, model: &PanelModel, screen_width: f32) {
        self.draw_toggle(&mut list.mesh, model.visible, screen_width);
        if !model.visible {
            return;
        }
        let layout = self.layout(model);
        let mesh = &mut list.mesh;
        mesh.fill_rect(layout.panel.inflate(3.0), 0.0, SHADOW);
        mesh.fill_rect(layout.panel, 0.0, PANEL_BG);

        let mut labels = Vec::new();
        for widget in &layout.widgets {
            let rect = widget.rect;
            match widget.kind {
                WidgetKind::Caption(text) => labels.push(label(text, rect, LABEL)),
                WidgetKind::ToolButton(tool) => {
                    let active = tool == model.tool;
                    mesh.fill_rect(rect, 0.0, if active { BUTTON_ACTIVE_BG } else { BUTTON_BG });
                    tool_icon(mesh, tool, rect.center(), if active { ICON_ACTIVE } else { ICON });
                }
                WidgetKind::Swatch(target, color) => {
                    let current = match target {
                        ColorTarget::Stroke => model.stroke_color,
                        ColorTarget::Laser => model.laser_color,
                        ColorTarget::Background => model.background,
                    };
                    if same_color(current, color) {
                        mesh.stroke_rect(rect.inflate(2.0), 2.0, 0.0, ICON_ACTIVE);
                    }
                    mesh.fill_rect(rect, 0.0, SWATCH_BORDER);
                    mesh.fill_rect(rect.inflate(-1.0), 0.0, color);
                }
                WidgetKind::Slider(kind) => {
                    let (min, max, _) = kind.range();
                    let value = kind.value(model);
                    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
                    let mid = rect.center()[1];
                    mesh.fill_rect(Rect::new([rect.min[0], mid - 2.0], [rect.max[0], mid + 2.0]), 0.0, TRACK);
                    let knob_x = rect.min[0] + t * rect.width();
                    mesh.fill_rect(Rect::new([rect.min[0], mid - 2.0], [knob_x, mid + 2.0]), 0.0, ICON_ACTIVE);
                    mesh.disc([knob_x, mid], 6.0, 0.0, ICON_ACTIVE);
                    let value_rect = Rect::from_origin_size([rect.max[0] + GAP, rect.min[1]], [48.0, rect.height()]);
                    labels.push(label(&kind.format(value), value_rect, LABEL));
                }
                WidgetKind::Action(action) => {
                    let enabled = match action {
                        ActionButton::Undo => model.can_undo,
                        ActionButton::Redo => model.can_redo,
                        ActionButton::Clear => true,
                    };
                    let color = if enabled { ICON } else { with_alpha(ICON, 0.5) };
                    action_icon(mesh, action, rect.center(), color);
                }
            }
        }
        for run in labels {
            list.push_text(run);
        }
    }

    fn draw_toggle(&self, mesh: &mut Mesh, panel_visible: bool, screen_width: f32) {
        let rect = Self::toggle_rect(screen_width);
        let c = rect.center();
        mesh.disc(c, TOGGLE * 0.5 + 2.0, 0.0, SHADOW);
        mesh.disc(c, TOGGLE * 0.5, 0.0, PANEL_BG);
        if panel_visible {
            mesh.line([c[0] - 6.0, c[1] - 6.0], [c[0] + 6.0, c[1] + 6.0], 2.0, 0.0, 0.0, ICON);
            mesh.line([c[0] - 6.0, c[1] + 6.0], [c[0] + 6.0, c[1] - 6.0], 2.0, 0.0, 0.0, ICON);
        } else {
            for i in 0..8 {
                let angle = i as f32 * std::f32::consts::TAU / 8.0;
                let (s, co) = angle.sin_cos();
                mesh.line([c[0] + co * 5.0, c[1] + s * 5.0], [c[0] + co * 9.0, c[1] + s * 9.0], 3.0, 0.0, 0.0, ICON);
            }
            mesh.disc(c, 6.5, 0.0, ICON);
            mesh.disc(c, 3.0, 0.0, PANEL_BG);
        }
    }
}

fn same_color(a: Color, b: Color) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 0.002)
}

fn label(text: &str, rect: Rect, color: Color) -> TextRun {
    TextRun {
        content: text.to_string(),
        origin: [rect.min[0], rect.center()[1] + LABEL_SIZE * 0.35],
        size: LABEL_SIZE,
        color,
    }
}

fn tool_icon(mesh: &mut Mesh, tool: Tool, c: [f32; 2], color: Color) {
    match tool {
        Tool::Pencil => {
            mesh.line([c[0] - 6.0, c[1] + 6.0], [c[0] + 6.0, c[1] - 6.0], 2.0, 0.0, 0.0, color);
            mesh.disc([c[0] - 7.0, c[1] + 7.0], 1.0, 0.0, color);
        }
        Tool::Pen => {
            mesh.line([c[0] - 5.0, c[1] + 5.0], [c[0] + 6.0, c[1] - 6.0], 3.5, 0.0, 0.0, color);
            mesh.disc([c[0] - 6.0, c[1] + 6.0], 2.0, 0.0, color);
        }
        Tool::Highlighter => {
            mesh.line([c[0] - 7.0, c[1] + 4.0], [c[0] + 7.0, c[1] - 4.0], 6.0, 1.0, 0.0, with_alpha(color, 0.5));
        }
        Tool::Laser => {
            mesh.disc(c, 7.0, 0.0, color);
            mesh.disc(c, 5.0, 0.0, BUTTON_BG);
        }
        Tool::Text => {
            mesh.line([c[0] - 6.0, c[1] - 7.0], [c[0] + 6.0, c[1] - 7.0], 2.0, 1.0, 0.0, color);
            mesh.line([c[0], c[1] - 7.0], [c[0], c[1] + 7.0], 2.0, 0.0, 0.0, color);
        }
        Tool::Move => {
            mesh.line([c[0] - 8.0, c[1]], [c[0] + 8.0, c[1]], 2.0, 0.0, 0.0, color);
            mesh.line([c[0], c[1] - 8.0], [c[0], c[1] + 8.0], 2.0, 0.0, 0.0, color);
            for [dx, dy] in [[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]] {
                arrow_head(mesh, [c[0] + dx * 8.0, c[1] + dy * 8.0], [dx, dy], color);
            }
        }
    }
}

fn action_icon(mesh: &mut Mesh, action: ActionButton, c: [f32; 2], color: Color) {
    match action {
        ActionButton::Undo | ActionButton::Redo => {
            let dir = if action == ActionButton::Undo { -1.0 } else { 1.0 };
            let tip = [c[0] + dir * 7.0, c[1]];
            mesh.line([c[0] - dir * 7.0, c[1]], tip, 2.0, 0.0, 0.0, color);
            arrow_head(mesh, tip, [dir, 0.0], color);
        }
        ActionButton::Clear => {
            mesh.stroke_rect(Rect::new([c[0] - 5.0, c[1] - 3.0], [c[0] + 5.0, c[1] + 7.0]), 1.5, 0.0, color);
            mesh.line([c[0] - 7.0, c[1] - 5.5], [c[0] + 7.0, c[1] - 5.5], 2.0, 0.0, 0.0, color);
            mesh.line([c[0] - 2.0, c[1] - 7.5], [c[0] + 2.0, c[1] - 7.5], 2.0, 0.0, 0.0, color);
        }
    }
}

fn arrow_head(mesh: &mut Mesh, tip: [f32; 2], dir: [f32; 2], color: Color) {
    let back = [tip[0] - dir[0] * 4.0, tip[1] - dir[1] * 4.0];
    let side = [-dir[1] * 4.0, dir[0] * 4.0];
    mesh.line(tip, [back[0] + side[0], back[1] + side[1]], 2.0, 0.0, 0.0, color);
    mesh.line(tip, [back[0] - side[0], back[1] - side[1]], 2.0, 0.0, 0.0, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN_W: f32 = 1280.0;

    fn model(tool: Tool) -> PanelModel {
        PanelModel {
            visible: true,
            tool,
            stroke_color: [0.0, 0.0, 0.0, 1.0],
            laser_color: [1.0, 0.0, 0.0, 1.0],
            background: [1.0, 1.0, 1.0, 1.0],
            line_width: 2.0,
            highlighter_opacity: 0.3,
            font_size: 16.0,
            can_undo: false,
            can_redo: true,
        }
    }

    fn panel() -> Panel {
        Panel::new(&PanelConfig::default())
    }

    fn widget_rect(panel: &Panel, model: &PanelModel, kind: WidgetKind) -> Rect {
        panel
            .layout(model)
            .widgets
            .into_iter()
            .find(|w| w.kind == kind)
            .map(|w| w.rect)
            .unwrap()
    }

    #[test]
    fn test_tool_buttons_select_tools() {
        let mut panel = panel();
        let m = model(Tool::Pencil);
        for tool in Tool::ALL {
            let rect = widget_rect(&panel, &m, WidgetKind::ToolButton(tool));
            assert_eq!(panel.press(rect.center(), &m, SCREEN_W), Some(UiAction::SelectTool(tool)));
        }
    }

    #[test]
    fn test_disabled_buttons_only_consume() {
        let mut panel = panel();
        let m = model(Tool::Pencil);
        let undo = widget_rect(&panel, &m, WidgetKind::Action(ActionButton::Undo));
        let redo = widget_rect(&panel, &m, WidgetKind::Action(ActionButton::Redo));
        let clear = widget_rect(&panel, &m, WidgetKind::Action(ActionButton::Clear));
        assert_eq!(panel.press(undo.center(), &m, SCREEN_W), Some(UiAction::Consumed));
        assert_eq!(panel.press(redo.center(), &m, SCREEN_W), Some(UiAction::Redo));
        assert_eq!(panel.press(clear.center(), &m, SCREEN_W), Some(UiAction::Clear));
    }

    #[test]
    fn test_sliders_follow_tool() {
        let panel = panel();
        let sliders = |tool| -> Vec<SliderKind> {
            panel
                .layout(&model(tool))
                .widgets
                .iter()
                .filter_map(|w| match w.kind {
                    WidgetKind::Slider(kind) => Some(kind),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(sliders(Tool::Pencil), vec![SliderKind::Width]);
        assert_eq!(sliders(Tool::Highlighter), vec![SliderKind::Width, SliderKind::Opacity]);
        assert_eq!(sliders(Tool::Text), vec![SliderKind::FontSize]);
        assert!(sliders(Tool::Laser).is_empty());
        assert!(sliders(Tool::Move).is_empty());
    }

    #[test]
    fn test_slider_snaps_and_drags() {
        let mut panel = panel();
        let m = model(Tool::Highlighter);
        let track = widget_rect(&panel, &m, WidgetKind::Slider(SliderKind::Opacity));
        let action = panel.press([track.min[0], track.center()[1]], &m, SCREEN_W);
        assert_eq!(action, Some(UiAction::SetSlider(SliderKind::Opacity, 0.1)));

        let dragged = panel.drag([track.max[0] + 50.0, 0.0]);
        assert_eq!(dragged, Some(UiAction::SetSlider(SliderKind::Opacity, 0.5)));
        assert!(panel.release());
        assert_eq!(panel.drag([0.0, 0.0]), None);
        assert!(!panel.release());
    }

    #[test]
    fn test_slider_value_steps() {
        let track = Rect::from_origin_size([0.0, 0.0], [190.0, 16.0]);
        assert_eq!(SliderKind::Width.value_at(track, 0.0), 1.0);
        assert_eq!(SliderKind::Width.value_at(track, 190.0), 20.0);
        assert_eq!(SliderKind::Width.value_at(track, 31.0), 4.0);
        let v = SliderKind::Opacity.value_at(track, 95.0);
        assert!((v - 0.3).abs() < 0.0001);
        assert_eq!(SliderKind::Opacity.format(0.3), "30%");
        assert_eq!(SliderKind::FontSize.format(16.0), "16px");
    }

    #[test]
    fn test_laser_tool_swaps_color_row_target() {
        let panel = panel();
        let black = [0.0, 0.0, 0.0, 1.0];
        let m = model(Tool::Laser);
        let layout = panel.layout(&m);
        assert!(layout.widgets.iter().any(|w| w.kind == WidgetKind::Swatch(ColorTarget::Laser, black)));
        assert!(!layout.widgets.iter().any(|w| w.kind == WidgetKind::Swatch(ColorTarget::Stroke, black)));
    }

    #[test]
    fn test_hidden_panel_only_exposes_toggle() {
        let mut panel = panel();
        let mut m = model(Tool::Pencil);
        m.visible = false;
        let tool = widget_rect(&panel, &m, WidgetKind::ToolButton(Tool::Pen));
        assert_eq!(panel.press(tool.center(), &m, SCREEN_W), None);
        assert!(!panel.is_over(tool.center(), &m, SCREEN_W));

        let toggle = Panel::toggle_rect(SCREEN_W).center();
        assert_eq!(panel.press(toggle, &m, SCREEN_W), Some(UiAction::TogglePanel));
    }

    #[test]
    fn test_press_outside_panel_falls_through() {
        let mut panel = panel();
        let m = model(Tool::Pencil);
        assert_eq!(panel.press([600.0, 500.0], &m, SCREEN_W), None);
        assert!(!panel.is_over([600.0, 500.0], &m, SCREEN_W));
    }

    #[test]
    fn test_draw_emits_labels_after_shapes() {
        let panel = panel();
        let mut list = DrawList::new();
        panel.draw(&mut list, &model(Tool::Highlighter), SCREEN_W);
        let list = list.finish();
        assert!(!list.mesh.is_empty());
        assert!(list.texts.iter().any(|t| t.content == "30%"));
        assert!(list.texts.iter().any(|t| t.content == "Canvas"));
    }
}
