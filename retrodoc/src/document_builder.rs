//! Append-only builder for report documents
//!
//! The builder owns a [`Document`] for the whole construction phase and
//! only ever appends to it. Table operations validate their input first,
//! so a failed call leaves the document exactly as it was.

use crate::report_model::{
    Alignment, Block, Color, Document, FontSize, Length, PageSetup, Paragraph, Run, StyleId,
};
use crate::table_builder::{build_key_value_table, build_styled_table, ValidationError};
use crate::theme::Theme;

/// Bullet glyph prefixed to plain bullet items
const BULLET: &str = "• ";

/// Space after each bullet paragraph, in points
const BULLET_SPACE_AFTER_PT: f32 = 2.0;

/// Left indent of bullet paragraphs, in centimetres
const BULLET_INDENT_CM: f32 = 0.5;

/// Description of one run for [`DocumentBuilder::add_run_paragraph`]
///
/// Unset fields fall back to the theme's body font size, no bold, no color.
#[derive(Debug, Clone, Default)]
pub struct RunSpec {
    pub text: String,
    pub size_pt: Option<f32>,
    pub bold: bool,
    pub color: Option<Color>,
}

impl RunSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn size(mut self, points: f32) -> Self {
        self.size_pt = Some(points);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Builder that appends styled content to a report document
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a builder for an empty document with the given geometry and styles
    pub fn new(page: PageSetup, theme: Theme) -> Self {
        Self {
            document: Document::new(page, theme),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.document.theme
    }

    /// Number of blocks appended so far
    pub fn len(&self) -> usize {
        self.document.blocks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.blocks().is_empty()
    }

    /// Append a heading paragraph using the Heading1/Heading2 named style
    pub fn add_heading(&mut self, text: &str, level: usize) -> &mut Self {
        let style = StyleId::heading(level);
        // Heading runs carry only text; size, color and weight come from the style
        let run = Run {
            text: text.to_string(),
            font: self.document.theme.font_family.clone(),
            size: self.document.theme.style(style).size,
            bold: false,
            color: None,
        };
        self.push_paragraph(Paragraph::new().style(style).add_run(run))
    }

    /// Append a body paragraph with a single plain run
    pub fn add_paragraph(&mut self, text: &str) -> &mut Self {
        let run = Run::body(text, &self.document.theme);
        self.push_paragraph(Paragraph::new().style(StyleId::Normal).add_run(run))
    }

    /// Append an empty paragraph
    pub fn add_blank(&mut self) -> &mut Self {
        self.push_paragraph(Paragraph::new().style(StyleId::Normal))
    }

    /// Append a body paragraph built from several individually formatted runs
    pub fn add_run_paragraph(&mut self, runs: &[RunSpec], alignment: Alignment) -> &mut Self {
        let theme = &self.document.theme;
        let paragraph = runs.iter().fold(
            Paragraph::new().style(StyleId::Normal).align(alignment),
            |paragraph, spec| {
                let mut run = Run::body(spec.text.as_str(), theme).bold(spec.bold);
                if let Some(points) = spec.size_pt {
                    run = run.size(FontSize::pt(points));
                }
                if let Some(color) = spec.color {
                    run = run.color(color);
                }
                paragraph.add_run(run)
            },
        );
        self.push_paragraph(paragraph)
    }

    /// Append an indented bullet item
    ///
    /// With a non-empty `bold_prefix` the paragraph holds a bold prefix run
    /// followed by the plain text; otherwise it holds a single `• text` run.
    pub fn add_bullet(&mut self, text: &str, bold_prefix: &str) -> &mut Self {
        let theme = &self.document.theme;
        let paragraph = Paragraph::new()
            .style(StyleId::Normal)
            .space_after(Length::pt(BULLET_SPACE_AFTER_PT))
            .indent_left(Length::cm(BULLET_INDENT_CM));

        let paragraph = if bold_prefix.is_empty() {
            paragraph.add_run(Run::body(format!("{BULLET}{text}"), theme))
        } else {
            paragraph
                .add_run(Run::body(bold_prefix, theme).bold(true))
                .add_run(Run::body(text, theme))
        };
        self.push_paragraph(paragraph)
    }

    /// Append a styled table (header row + striped data rows)
    pub fn add_styled_table<S: AsRef<str>>(
        &mut self,
        headers: &[S],
        rows: &[Vec<S>],
    ) -> Result<&mut Self, ValidationError> {
        let table = build_styled_table(&self.document.theme, headers, rows)?;
        self.document.push(Block::Table(table));
        Ok(self)
    }

    /// Append a two-column key-value table
    pub fn add_key_value_table<K: AsRef<str>, V: AsRef<str>>(
        &mut self,
        pairs: &[(K, V)],
    ) -> Result<&mut Self, ValidationError> {
        let table = build_key_value_table(&self.document.theme, pairs)?;
        self.document.push(Block::Table(table));
        Ok(self)
    }

    pub fn add_page_break(&mut self) -> &mut Self {
        self.document.push(Block::PageBreak);
        self
    }

    /// Finish construction and hand over the document
    pub fn build(self) -> Document {
        self.document
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) -> &mut Self {
        self.document.push(Block::Paragraph(paragraph));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(PageSetup::default(), Theme::default())
    }

    fn last_paragraph(doc: &Document) -> &Paragraph {
        match doc.blocks().last() {
            Some(Block::Paragraph(paragraph)) => paragraph,
            other => panic!("expected a paragraph, found {:?}", other),
        }
    }

    #[test]
    fn test_plain_bullet() {
        let mut b = builder();
        b.add_bullet("Sonnet: ~33%", "");
        let doc = b.build();
        let paragraph = last_paragraph(&doc);

        assert_eq!(paragraph.runs.len(), 1);
        assert_eq!(paragraph.runs[0].text, "• Sonnet: ~33%");
        assert!(!paragraph.runs[0].bold);
        assert_eq!(paragraph.space_after, Some(Length::pt(2.0)));
        assert_eq!(paragraph.indent_left, Some(Length::cm(0.5)));
    }

    #[test]
    fn test_prefixed_bullet() {
        let mut b = builder();
        b.add_bullet("P2 was the cheapest", "Efficiency: ");
        let doc = b.build();
        let paragraph = last_paragraph(&doc);

        assert_eq!(paragraph.runs.len(), 2);
        assert_eq!(paragraph.runs[0].text, "Efficiency: ");
        assert!(paragraph.runs[0].bold);
        assert_eq!(paragraph.runs[1].text, "P2 was the cheapest");
        assert!(!paragraph.runs[1].bold);
        assert_eq!(paragraph.text(), "Efficiency: P2 was the cheapest");
    }

    #[test]
    fn test_headings_use_named_styles() {
        let mut b = builder();
        b.add_heading("1. Overview", 1).add_heading("Model share", 2);
        let doc = b.build();
        let styles: Vec<_> = doc.paragraphs().map(|p| p.style).collect();
        assert_eq!(styles, vec![Some(StyleId::Heading1), Some(StyleId::Heading2)]);
    }

    #[test]
    fn test_run_paragraph_formatting() {
        let accent = Color::rgb(0x25, 0x63, 0xEB);
        let mut b = builder();
        b.add_run_paragraph(
            &[
                RunSpec::new("1. ").size(11.0).bold().color(accent),
                RunSpec::new("Overview").size(11.0),
            ],
            Alignment::Center,
        );
        let doc = b.build();
        let paragraph = last_paragraph(&doc);

        assert_eq!(paragraph.alignment, Alignment::Center);
        assert_eq!(paragraph.runs[0].size, FontSize::pt(11.0));
        assert!(paragraph.runs[0].bold);
        assert_eq!(paragraph.runs[0].color, Some(accent));
        assert!(!paragraph.runs[1].bold);
        assert_eq!(paragraph.runs[1].color, None);
    }

    #[test]
    fn test_failed_table_leaves_document_unchanged() {
        let mut b = builder();
        b.add_paragraph("intro");
        b.add_styled_table(&["A", "B"], &[vec!["1", "2"]]).unwrap();
        let before = b.len();

        let result = b.add_styled_table(&["A", "B"], &[vec!["x"]]);
        assert!(matches!(
            result,
            Err(ValidationError::ColumnCountMismatch { .. })
        ));
        assert_eq!(b.len(), before);

        let empty: Vec<(&str, &str)> = Vec::new();
        assert!(b.add_key_value_table(&empty).is_err());
        assert_eq!(b.len(), before);
    }

    #[test]
    fn test_blocks_keep_insertion_order() {
        let mut b = builder();
        assert!(b.is_empty());
        b.add_paragraph("first")
            .add_page_break()
            .add_key_value_table(&[("k", "v")])
            .unwrap()
            .add_blank();
        assert!(!b.is_empty());
        assert_eq!(b.len(), 4);
        let doc = b.build();

        assert!(matches!(doc.blocks()[0], Block::Paragraph(_)));
        assert!(matches!(doc.blocks()[1], Block::PageBreak));
        assert!(matches!(doc.blocks()[2], Block::Table(_)));
        assert!(matches!(doc.blocks()[3], Block::Paragraph(_)));
    }
}
