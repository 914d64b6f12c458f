//! Named paragraph styles and the report color palette
//!
//! The theme is applied once when a document is created. Headings and body
//! paragraphs reference the named styles; the table builders and the cover
//! page read colors from the palette.

use crate::report_model::{BorderStyle, Color, FontSize, Length, StyleId};
use serde::{Deserialize, Serialize};

/// Default font family for every run in the report
pub const DEFAULT_FONT: &str = "Arial Unicode MS";

/// Formatting attached to one named paragraph style
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphStyle {
    pub size: FontSize,
    pub color: Option<Color>,
    pub bold: bool,
    pub space_before: Option<Length>,
    pub space_after: Option<Length>,
    /// Line spacing as a multiple of single spacing
    pub line_spacing: Option<f32>,
}

/// Colors used by tables, the cover page and the TOC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub header_fill: Color,
    pub header_text: Color,
    pub stripe_fill: Color,
    pub key_fill: Color,
    pub value_fill: Color,
    pub border: Color,
    pub accent: Color,
    pub muted: Color,
    pub subtle: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            header_fill: Color::rgb(0x1E, 0x3A, 0x5F),
            header_text: Color::WHITE,
            stripe_fill: Color::rgb(0xF8, 0xFA, 0xFC),
            key_fill: Color::rgb(0xF1, 0xF5, 0xF9),
            value_fill: Color::WHITE,
            border: Color::rgb(0xCC, 0xCC, 0xCC),
            accent: Color::rgb(0x25, 0x63, 0xEB),
            muted: Color::rgb(0x64, 0x74, 0x8B),
            subtle: Color::rgb(0x94, 0xA3, 0xB8),
        }
    }
}

/// Complete styling for a report document
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub font_family: String,
    pub heading1: ParagraphStyle,
    pub heading2: ParagraphStyle,
    pub body: ParagraphStyle,
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT.to_string(),
            heading1: ParagraphStyle {
                size: FontSize::pt(16.0),
                color: Some(Color::rgb(0x1E, 0x3A, 0x5F)),
                bold: true,
                space_before: Some(Length::pt(10.0)),
                space_after: Some(Length::pt(6.0)),
                line_spacing: Some(1.0),
            },
            heading2: ParagraphStyle {
                size: FontSize::pt(12.0),
                color: Some(Color::rgb(0x25, 0x63, 0xEB)),
                bold: true,
                space_before: Some(Length::pt(8.0)),
                space_after: Some(Length::pt(4.0)),
                line_spacing: Some(1.0),
            },
            body: ParagraphStyle {
                size: FontSize::pt(10.0),
                color: None,
                bold: false,
                space_before: None,
                space_after: Some(Length::pt(3.0)),
                line_spacing: None,
            },
            palette: Palette::default(),
        }
    }
}

impl Theme {
    /// Look up the formatting for a named style
    pub fn style(&self, id: StyleId) -> &ParagraphStyle {
        match id {
            StyleId::Heading1 => &self.heading1,
            StyleId::Heading2 => &self.heading2,
            StyleId::Normal => &self.body,
        }
    }

    /// The thin light-gray border put around every builder-made table
    pub fn table_border(&self) -> BorderStyle {
        BorderStyle::thin(self.palette.border)
    }
}

/// `[theme]` table of a report config; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOverrides {
    pub font_family: Option<String>,
    pub heading1: StyleOverrides,
    pub heading2: StyleOverrides,
    pub body: StyleOverrides,
    pub palette: PaletteOverrides,
}

/// Optional overrides for one named style (sizes and spacing in points)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub size_pt: Option<f32>,
    pub color: Option<Color>,
    pub bold: Option<bool>,
    pub space_before_pt: Option<f32>,
    pub space_after_pt: Option<f32>,
    pub line_spacing: Option<f32>,
}

/// Optional palette overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteOverrides {
    pub header_fill: Option<Color>,
    pub header_text: Option<Color>,
    pub stripe_fill: Option<Color>,
    pub key_fill: Option<Color>,
    pub value_fill: Option<Color>,
    pub border: Option<Color>,
    pub accent: Option<Color>,
    pub muted: Option<Color>,
    pub subtle: Option<Color>,
}

impl ThemeOverrides {
    /// Produce a theme from the defaults with these overrides applied
    pub fn resolve(&self) -> Theme {
        let defaults = Theme::default();
        Theme {
            font_family: self
                .font_family
                .clone()
                .unwrap_or(defaults.font_family),
            heading1: self.heading1.apply(defaults.heading1),
            heading2: self.heading2.apply(defaults.heading2),
            body: self.body.apply(defaults.body),
            palette: self.palette.apply(defaults.palette),
        }
    }
}

impl StyleOverrides {
    fn apply(&self, mut style: ParagraphStyle) -> ParagraphStyle {
        if let Some(size) = self.size_pt {
            style.size = FontSize::pt(size);
        }
        if let Some(color) = self.color {
            style.color = Some(color);
        }
        if let Some(bold) = self.bold {
            style.bold = bold;
        }
        if let Some(before) = self.space_before_pt {
            style.space_before = Some(Length::pt(before));
        }
        if let Some(after) = self.space_after_pt {
            style.space_after = Some(Length::pt(after));
        }
        if let Some(line) = self.line_spacing {
            style.line_spacing = Some(line);
        }
        style
    }
}

impl PaletteOverrides {
    fn apply(&self, palette: Palette) -> Palette {
        Palette {
            header_fill: self.header_fill.unwrap_or(palette.header_fill),
            header_text: self.header_text.unwrap_or(palette.header_text),
            stripe_fill: self.stripe_fill.unwrap_or(palette.stripe_fill),
            key_fill: self.key_fill.unwrap_or(palette.key_fill),
            value_fill: self.value_fill.unwrap_or(palette.value_fill),
            border: self.border.unwrap_or(palette.border),
            accent: self.accent.unwrap_or(palette.accent),
            muted: self.muted.unwrap_or(palette.muted),
            subtle: self.subtle.unwrap_or(palette.subtle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_named_styles() {
        let theme = Theme::default();

        assert_eq!(theme.font_family, "Arial Unicode MS");

        let h1 = theme.style(StyleId::Heading1);
        assert_eq!(h1.size.as_half_points(), 32);
        assert_eq!(h1.color, Some(Color::rgb(0x1E, 0x3A, 0x5F)));
        assert!(h1.bold);
        assert_eq!(h1.space_before, Some(Length::pt(10.0)));
        assert_eq!(h1.space_after, Some(Length::pt(6.0)));

        let h2 = theme.style(StyleId::Heading2);
        assert_eq!(h2.size.as_half_points(), 24);
        assert_eq!(h2.color, Some(Color::rgb(0x25, 0x63, 0xEB)));

        let body = theme.style(StyleId::Normal);
        assert_eq!(body.size.as_half_points(), 20);
        assert!(!body.bold);
        assert_eq!(body.space_after, Some(Length::pt(3.0)));
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let overrides: ThemeOverrides = toml::from_str(
            r##"
font_family = "Noto Sans KR"

[heading1]
size_pt = 18

[palette]
header_fill = "#000080"
"##,
        )
        .unwrap();

        let theme = overrides.resolve();
        assert_eq!(theme.font_family, "Noto Sans KR");
        assert_eq!(theme.heading1.size.as_half_points(), 36);
        assert_eq!(theme.heading1.color, Some(Color::rgb(0x1E, 0x3A, 0x5F)));
        assert_eq!(theme.palette.header_fill, Color::rgb(0x00, 0x00, 0x80));
        assert_eq!(theme.palette.stripe_fill, Palette::default().stripe_fill);
        assert_eq!(theme.heading2, Theme::default().heading2);
    }

    #[test]
    fn test_invalid_palette_color_is_rejected() {
        let result: Result<ThemeOverrides, _> = toml::from_str(
            r#"
[palette]
border = "not-a-color"
"#,
        );
        assert!(result.is_err());
    }
}
