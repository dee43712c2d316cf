use serde::Deserialize;

/// Straight-alpha RGBA, components in `0.0..=1.0`.
pub type Color = [f32; 4];

pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Parses `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Pencil,
    Pen,
    Highlighter,
    Laser,
    Text,
    Move,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Pencil,
        Tool::Pen,
        Tool::Highlighter,
        Tool::Laser,
        Tool::Text,
        Tool::Move,
    ];

    /// Pen style committed by this tool, `None` for tools that never draw strokes.
    pub fn pen_style(self) -> Option<PenStyle> {
        match self {
            Tool::Pencil => Some(PenStyle::Pencil),
            Tool::Pen => Some(PenStyle::Pen),
            Tool::Highlighter => Some(PenStyle::Highlighter),
            Tool::Laser | Tool::Text | Tool::Move => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Pen => "pen",
            Tool::Highlighter => "highlighter",
            Tool::Laser => "laser",
            Tool::Text => "text",
            Tool::Move => "move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenStyle {
    Pencil,
    Pen,
    Highlighter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Square,
}

/// Resolved rasterization parameters of a stroke. Joins are always round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub opacity: f32,
    pub cap: LineCap,
}

impl PenStyle {
    pub fn stroke_style(self, width: f32, highlighter_opacity: f32) -> StrokeStyle {
        match self {
            PenStyle::Pencil => StrokeStyle {
                width,
                opacity: 1.0,
                cap: LineCap::Round,
            },
            PenStyle::Pen => StrokeStyle {
                width: width * 1.5,
                opacity: 1.0,
                cap: LineCap::Round,
            },
            PenStyle::Highlighter => StrokeStyle {
                width: width * 2.0,
                opacity: highlighter_opacity,
                cap: LineCap::Square,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<[f32; 2]>,
    pub style: PenStyle,
    pub color: Color,
    pub width: f32,
    /// Highlighter opacity in effect when the stroke was committed.
    pub opacity: f32,
}

impl Stroke {
    pub fn stroke_style(&self) -> StrokeStyle {
        self.style.stroke_style(self.width, self.opacity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub content: String,
    /// Left end of the baseline.
    pub anchor: [f32; 2],
    pub color: Color,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Stroke(Stroke),
    Text(TextAnnotation),
}

impl Annotation {
    pub fn as_text(&self) -> Option<&TextAnnotation> {
        match self {
            Annotation::Text(text) => Some(text),
            Annotation::Stroke(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn test_highlighter_defaults() {
        let style = PenStyle::Highlighter.stroke_style(4.0, 0.3);
        assert!(approx(style.width, 8.0));
        assert!(approx(style.opacity, 0.3));
        assert_eq!(style.cap, LineCap::Square);
    }

    #[test]
    fn test_pen_widens_pencil_does_not() {
        let pen = PenStyle::Pen.stroke_style(4.0, 0.3);
        let pencil = PenStyle::Pencil.stroke_style(4.0, 0.3);
        assert!(approx(pen.width, 6.0));
        assert!(approx(pencil.width, 4.0));
        assert!(approx(pen.opacity, 1.0));
        assert_eq!(pencil.cap, LineCap::Round);
    }

    #[test]
    fn test_only_drawing_tools_have_pen_styles() {
        let drawing: Vec<Tool> = Tool::ALL
            .into_iter()
            .filter(|tool| tool.pen_style().is_some())
            .collect();
        assert_eq!(drawing, vec![Tool::Pencil, Tool::Pen, Tool::Highlighter]);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0, 1.0]));
        let c = parse_hex_color("#4299e180").unwrap();
        assert!(approx(c[0], 66.0 / 255.0));
        assert!(approx(c[3], 128.0 / 255.0));
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#ff00"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
