use std::fs;
use std::path::Path;

use ab_glyph::{Font, FontArc, Glyph, GlyphId, PxScale, ScaleFont, point};
use anyhow::Context;

use crate::selection::TextMeasure;

/// Common sans-serif faces, tried in order when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

#[derive(Clone)]
pub struct SansFont {
    font: FontArc,
}

impl SansFont {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
        Self::from_bytes(bytes).with_context(|| format!("failed to parse font {}", path.display()))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let font = FontArc::try_from_vec(bytes)?;
        Ok(Self { font })
    }

    /// The configured font if it loads, otherwise the first system font that does.
    pub fn discover(configured: Option<&Path>) -> Option<Self> {
        if let Some(path) = configured {
            match Self::load(path) {
                Ok(font) => {
                    log::info!("using font {}", path.display());
                    return Some(font);
                }
                Err(err) => log::warn!("{err:#}"),
            }
        }
        for candidate in SYSTEM_FONTS {
            if let Ok(font) = Self::load(candidate) {
                log::info!("using system font {candidate}");
                return Some(font);
            }
        }
        log::warn!("no usable font found, text will be measured approximately and not drawn");
        None
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Line breaks and tabs render as plain spaces.
    pub fn glyph_id(&self, c: char) -> GlyphId {
        let c = if c.is_whitespace() { ' ' } else { c };
        self.font.glyph_id(c)
    }

    /// Positions one line of glyphs with kerning, `origin` on the baseline.
    pub fn layout(&self, text: &str, size: f32, origin: [f32; 2]) -> Vec<Glyph> {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = origin[0];
        let mut prev: Option<GlyphId> = None;
        for c in text.chars().filter(|c| !c.is_control() || c.is_whitespace()) {
            let id = self.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(size, point(caret, origin[1])));
            caret += scaled.h_advance(id);
            prev = Some(id);
        }
        glyphs
    }
}

impl TextMeasure for SansFont {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_size));
        match self.layout(text, font_size, [0.0, 0.0]).last() {
            Some(last) => last.position.x + scaled.h_advance(last.id),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_not_a_font() {
        assert!(SansFont::from_bytes(vec![0, 1, 2, 3]).is_err());
        assert!(SansFont::load("/nonexistent/font.ttf").is_err());
    }

    #[test]
    fn test_measure_with_system_font() {
        // Only meaningful where a system font is installed.
        let Some(font) = SansFont::discover(Some(Path::new("/nonexistent/font.ttf"))) else {
            return;
        };
        assert_eq!(font.text_width("", 16.0), 0.0);
        let short = font.text_width("hi", 16.0);
        let long = font.text_width("hi there", 16.0);
        assert!(short > 0.0);
        assert!(long > short);
        assert!((font.text_width("hi", 32.0) - short * 2.0).abs() < 1.0);
        assert_eq!(font.text_width("a\nb", 16.0), font.text_width("a b", 16.0));
        assert_eq!(font.layout("ab", 16.0, [10.0, 20.0])[0].position, point(10.0, 20.0));
    }
}
