use crate::drawing::{Annotation, TextAnnotation};
use crate::geometry::Rect;

/// Horizontal extent of a single line of text at a pixel size.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Fixed-advance estimate used when no font could be loaded.
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().filter(|c| !c.is_control() || c.is_whitespace()).count() as f32 * font_size * 0.6
    }
}

/// Box from the top of the em square down to the baseline, as wide as the text.
pub fn text_bounds(text: &TextAnnotation, measure: &dyn TextMeasure) -> Rect {
    let width = measure.text_width(&text.content, text.font_size);
    Rect::new(
        [text.anchor[0], text.anchor[1] - text.font_size],
        [text.anchor[0] + width, text.anchor[1]],
    )
}

pub fn is_point_in_text(point: [f32; 2], text: &TextAnnotation, measure: &dyn TextMeasure) -> bool {
    text_bounds(text, measure).contains(point)
}

/// Index of the text under `point`. Scans back to front so that the text
/// painted last, which is the one visible on top, wins.
pub fn hit_test_text(
    annotations: &[Annotation],
    point: [f32; 2],
    measure: &dyn TextMeasure,
) -> Option<usize> {
    annotations
        .iter()
        .enumerate()
        .rev()
        .find(|(_, annotation)| {
            annotation
                .as_text()
                .is_some_and(|text| is_point_in_text(point, text, measure))
        })
        .map(|(index, _)| index)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::drawing::{PenStyle, Stroke};

    /// 8 px per char regardless of size, keeps the arithmetic in tests obvious.
    pub(crate) struct FixedMeasure;

    impl TextMeasure for FixedMeasure {
        fn text_width(&self, text: &str, _font_size: f32) -> f32 {
            text.chars().count() as f32 * 8.0
        }
    }

    pub(crate) fn text_at(content: &str, anchor: [f32; 2], font_size: f32) -> Annotation {
        Annotation::Text(TextAnnotation {
            content: content.to_string(),
            anchor,
            color: [0.0, 0.0, 0.0, 1.0],
            font_size,
        })
    }

    #[test]
    fn test_hit_inside_and_below_text() {
        let hi = text_at("hi", [50.0, 66.0], 16.0);
        let text = hi.as_text().unwrap();
        assert!(is_point_in_text([55.0, 60.0], text, &FixedMeasure));
        assert!(!is_point_in_text([55.0, 100.0], text, &FixedMeasure));
        assert!(is_point_in_text([66.0, 50.0], text, &FixedMeasure));
        assert!(!is_point_in_text([67.0, 50.0], text, &FixedMeasure));
    }

    #[test]
    fn test_topmost_text_wins() {
        let annotations = vec![
            text_at("first", [0.0, 20.0], 20.0),
            text_at("second", [10.0, 25.0], 20.0),
        ];
        assert_eq!(hit_test_text(&annotations, [15.0, 15.0], &FixedMeasure), Some(1));
        assert_eq!(hit_test_text(&annotations, [2.0, 3.0], &FixedMeasure), Some(0));
        assert_eq!(hit_test_text(&annotations, [200.0, 15.0], &FixedMeasure), None);
    }

    #[test]
    fn test_strokes_are_never_hit() {
        let annotations = vec![Annotation::Stroke(Stroke {
            points: vec![[0.0, 0.0], [100.0, 100.0]],
            style: PenStyle::Pen,
            color: [0.0, 0.0, 0.0, 1.0],
            width: 20.0,
            opacity: 0.3,
        })];
        assert_eq!(hit_test_text(&annotations, [50.0, 50.0], &FixedMeasure), None);
    }

    #[test]
    fn test_approx_measure_scales_with_size() {
        assert!((ApproxMeasure.text_width("abcd", 10.0) - 24.0).abs() < 0.001);
    }
}
