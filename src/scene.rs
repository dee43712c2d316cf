use std::ops::Range;

use crate::drawing::{Annotation, Color};
use crate::geometry::Mesh;
use crate::selection::{TextMeasure, text_bounds};
use crate::tessellate::tessellate_stroke;

pub const SELECTION_COLOR: Color = [66.0 / 255.0, 153.0 / 255.0, 225.0 / 255.0, 0.5];
const SELECTION_PADDING: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub content: String,
    /// Left end of the baseline.
    pub origin: [f32; 2],
    pub size: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Index range into the list's mesh.
    Shapes(Range<u32>),
    /// Index into the list's text runs.
    Text(usize),
}

/// Shapes and text interleaved in paint order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrawList {
    pub mesh: Mesh,
    pub texts: Vec<TextRun>,
    pub commands: Vec<DrawCmd>,
    flushed: u32,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, run: TextRun) {
        self.flush_shapes();
        self.texts.push(run);
        self.commands.push(DrawCmd::Text(self.texts.len() - 1));
    }

    fn flush_shapes(&mut self) {
        let end = self.mesh.indices.len() as u32;
        if end > self.flushed {
            self.commands.push(DrawCmd::Shapes(self.flushed..end));
            self.flushed = end;
        }
    }

    pub fn finish(mut self) -> Self {
        self.flush_shapes();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    pub background: Color,
    pub selection: Option<usize>,
    /// Outline the selected text, only while the move tool is active.
    pub show_selection: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Color,
    pub list: DrawList,
}

/// Replays every annotation in stored order.
///
/// Each stroke gets its own depth, decreasing with paint order; the scene
/// pipeline tests `Less`, so a translucent stroke covers a pixel once even
/// where its own segments and joins overlap, while later strokes still blend
/// on top.
pub fn build_scene(annotations: &[Annotation], params: &SceneParams, measure: &dyn TextMeasure) -> Scene {
    let mut list = DrawList::new();
    let layers = annotations.len() * 2 + 1;
    let depth_of = |layer: usize| 1.0 - (layer as f32 + 1.0) / (layers as f32 + 1.0);

    for (index, annotation) in annotations.iter().enumerate() {
        match annotation {
            Annotation::Stroke(stroke) => {
                tessellate_stroke(
                    &mut list.mesh,
                    &stroke.points,
                    stroke.stroke_style(),
                    stroke.color,
                    depth_of(index * 2),
                );
            }
            Annotation::Text(text) => {
                list.push_text(TextRun {
                    content: text.content.clone(),
                    origin: text.anchor,
                    size: text.font_size,
                    color: text.color,
                });
                if params.show_selection && params.selection == Some(index) {
                    let outline = text_bounds(text, measure).inflate(SELECTION_PADDING);
                    list.mesh
                        .stroke_rect(outline, 1.0, depth_of(index * 2 + 1), SELECTION_COLOR);
                }
            }
        }
    }

    Scene {
        background: params.background,
        list: list.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{PenStyle, Stroke};
    use crate::selection::tests::{FixedMeasure, text_at};

    const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

    fn stroke(style: PenStyle, points: Vec<[f32; 2]>) -> Annotation {
        Annotation::Stroke(Stroke {
            points,
            style,
            color: [0.0, 0.0, 0.0, 1.0],
            width: 4.0,
            opacity: 0.3,
        })
    }

    fn params(selection: Option<usize>, show_selection: bool) -> SceneParams {
        SceneParams {
            background: WHITE,
            selection,
            show_selection,
        }
    }

    fn sample() -> Vec<Annotation> {
        vec![
            stroke(PenStyle::Pencil, vec![[0.0, 0.0], [10.0, 10.0], [20.0, 5.0]]),
            text_at("hi", [50.0, 66.0], 16.0),
            stroke(PenStyle::Highlighter, vec![[0.0, 30.0], [40.0, 30.0]]),
        ]
    }

    #[test]
    fn test_replay_is_deterministic() {
        let annotations = sample();
        let a = build_scene(&annotations, &params(Some(1), true), &FixedMeasure);
        let b = build_scene(&annotations, &params(Some(1), true), &FixedMeasure);
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_interleaves_with_shapes_in_paint_order() {
        let scene = build_scene(&sample(), &params(None, false), &FixedMeasure);
        let kinds: Vec<&str> = scene
            .list
            .commands
            .iter()
            .map(|cmd| match cmd {
                DrawCmd::Shapes(_) => "shapes",
                DrawCmd::Text(_) => "text",
            })
            .collect();
        assert_eq!(kinds, vec!["shapes", "text", "shapes"]);
        assert_eq!(scene.list.texts[0].origin, [50.0, 66.0]);
        assert_eq!(scene.background, WHITE);
    }

    #[test]
    fn test_later_strokes_sit_in_front() {
        let scene = build_scene(&sample(), &params(None, false), &FixedMeasure);
        let ranges: Vec<Range<u32>> = scene
            .list
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Shapes(range) => Some(range.clone()),
                DrawCmd::Text(_) => None,
            })
            .collect();
        let depth_at = |range: &Range<u32>| {
            scene.list.mesh.vertices[scene.list.mesh.indices[range.start as usize] as usize].depth
        };
        assert!(depth_at(&ranges[1]) < depth_at(&ranges[0]));
        assert!(depth_at(&ranges[0]) < 1.0);
        assert!(depth_at(&ranges[1]) > 0.0);
    }

    #[test]
    fn test_selection_outline_only_under_move_tool() {
        let annotations = sample();
        let without = build_scene(&annotations, &params(Some(1), false), &FixedMeasure);
        let with = build_scene(&annotations, &params(Some(1), true), &FixedMeasure);
        assert_eq!(with.list.mesh.vertices.len(), without.list.mesh.vertices.len() + 16);

        let outline: Vec<_> = with
            .list
            .mesh
            .vertices
            .iter()
            .filter(|v| v.color == SELECTION_COLOR)
            .collect();
        let min_x = outline.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        let min_y = outline.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        // text box starts at (50, 50); padded by 4, outline 1 px wide
        assert!((min_x - 45.5).abs() < 0.001);
        assert!((min_y - 45.5).abs() < 0.001);
    }

    #[test]
    fn test_selection_on_stroke_draws_no_outline() {
        let annotations = sample();
        let a = build_scene(&annotations, &params(Some(0), true), &FixedMeasure);
        let b = build_scene(&annotations, &params(None, true), &FixedMeasure);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_history_clears_only() {
        let scene = build_scene(&[], &params(None, true), &FixedMeasure);
        assert!(scene.list.commands.is_empty());
        assert!(scene.list.mesh.is_empty());
    }
}
