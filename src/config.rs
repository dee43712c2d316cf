use std::{fmt, fs, path::Path, path::PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, de::Visitor};

use crate::drawing::{Color, Tool, parse_hex_color};

pub const WIDTH_RANGE: (f32, f32) = (1.0, 20.0);
pub const OPACITY_RANGE: (f32, f32) = (0.1, 0.5);
pub const FONT_SIZE_RANGE: (f32, f32) = (12.0, 72.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexColor(pub Color);

impl<'a> Deserialize<'a> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        struct HexVisitor;

        impl<'de> Visitor<'de> for HexVisitor {
            type Value = HexColor;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a color written as #rrggbb")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                parse_hex_color(v)
                    .map(HexColor)
                    .ok_or_else(|| E::custom(format_args!("invalid color '{v}'")))
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

fn hex(s: &str) -> HexColor {
    HexColor(parse_hex_color(s).unwrap_or([0.0, 0.0, 0.0, 1.0]))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub tools: ToolConfig,
    pub panel: PanelConfig,
    /// TrueType/OpenType font used for text; system fonts are searched when unset.
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub default_tool: Tool,
    pub stroke_color: HexColor,
    pub laser_color: HexColor,
    pub background: HexColor,
    pub line_width: f32,
    pub highlighter_opacity: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub visible: bool,
    pub stroke_palette: Vec<HexColor>,
    pub background_palette: Vec<HexColor>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scribble".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            default_tool: Tool::Pencil,
            stroke_color: hex("#000000"),
            laser_color: hex("#ff0000"),
            background: hex("#ffffff"),
            line_width: 2.0,
            highlighter_opacity: 0.3,
            font_size: 16.0,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            visible: true,
            stroke_palette: [
                "#000000", "#ffffff", "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6",
                "#a855f7",
            ]
            .into_iter()
            .map(hex)
            .collect(),
            background_palette: [
                "#ffffff", "#f3f4f6", "#fef9c3", "#dcfce7", "#dbeafe", "#1f2937", "#111827",
                "#000000",
            ]
            .into_iter()
            .map(hex)
            .collect(),
        }
    }
}

impl Config {
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let tools = &self.tools;
        check_range("line_width", tools.line_width, WIDTH_RANGE)?;
        check_range("highlighter_opacity", tools.highlighter_opacity, OPACITY_RANGE)?;
        check_range("font_size", tools.font_size, FONT_SIZE_RANGE)?;
        if self.panel.stroke_palette.is_empty() || self.panel.background_palette.is_empty() {
            bail!("swatch palettes must not be empty");
        }
        if self.panel.stroke_palette.len() > 8 || self.panel.background_palette.len() > 8 {
            bail!("swatch palettes hold at most 8 colors");
        }
        if self.window.width == 0 || self.window.height == 0 {
            bail!("window size must be non-zero");
        }
        Ok(())
    }
}

fn check_range(name: &str, value: f32, (min, max): (f32, f32)) -> anyhow::Result<()> {
    if !(min..=max).contains(&value) {
        bail!("`{name}` must be within {min}..={max} (found {value})");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_example_config() {
        let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.toml")).unwrap();
        assert_eq!(config.tools.default_tool, Tool::Pencil);
        assert_eq!(config.tools.laser_color, HexColor([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.tools.line_width, 2.0);
        assert_eq!(config.tools.font_size, 16.0);
        assert!((config.tools.highlighter_opacity - 0.3).abs() < 0.0001);
        assert!(config.panel.visible);
        assert_eq!(config.panel.stroke_palette.len(), 8);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse("[tools]\ndefault_tool = \"highlighter\"\nline_width = 4\n").unwrap();
        assert_eq!(config.tools.default_tool, Tool::Highlighter);
        assert_eq!(config.tools.line_width, 4.0);
        assert_eq!(config.tools.background, HexColor([1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Config::parse("[tools]\nline_width = 21\n").is_err());
        assert!(Config::parse("[tools]\nhighlighter_opacity = 0.9\n").is_err());
        assert!(Config::parse("[tools]\nfont_size = 8\n").is_err());
    }

    #[test]
    fn rejects_bad_colors_and_tools() {
        assert!(Config::parse("[tools]\nstroke_color = \"red\"\n").is_err());
        assert!(Config::parse("[tools]\ndefault_tool = \"eraser\"\n").is_err());
    }
}
