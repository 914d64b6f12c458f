//! In-memory report document model
//!
//! This module defines the structures the builder appends to and the
//! exporter reads from. Nothing here knows about the DOCX container;
//! measurements are kept in the units Word uses natively (twips and
//! half-points) so the exporter only has to copy numbers across.

use crate::theme::Theme;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Twips (twentieths of a point) per point
const TWIPS_PER_POINT: f32 = 20.0;

/// Twips per centimetre (1440 twips per inch / 2.54)
const TWIPS_PER_CM: f32 = 1440.0 / 2.54;

/// EMUs (English Metric Units) per twip
const EMUS_PER_TWIP: i64 = 635;

/// An exact 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    /// Create a color from its components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a six-digit hex color, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorParseError(hex.to_string()))
        };

        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Upper-case hex form without `#`, as written into OOXML attributes
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Error returned for malformed hex colors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color '{0}' (expected six hex digits, e.g. 1E3A5F)")]
pub struct ColorParseError(String);

/// A distance in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Length(i32);

impl Length {
    pub const fn twips(twips: i32) -> Self {
        Self(twips)
    }

    pub fn pt(points: f32) -> Self {
        Self((points * TWIPS_PER_POINT).round() as i32)
    }

    pub fn cm(cm: f32) -> Self {
        Self((cm * TWIPS_PER_CM).round() as i32)
    }

    /// Convert from EMUs (914400 per inch), truncating to whole twips
    pub fn emu(emu: i64) -> Self {
        Self((emu / EMUS_PER_TWIP) as i32)
    }

    pub fn as_twips(self) -> i32 {
        self.0
    }
}

/// A font size in half-points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontSize(usize);

impl FontSize {
    pub fn pt(points: f32) -> Self {
        Self((points * 2.0).round() as usize)
    }

    pub fn as_half_points(self) -> usize {
        self.0
    }
}

/// Horizontal alignment of a paragraph or table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A span of text with consistent formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: String,
    pub size: FontSize,
    pub bold: bool,
    pub color: Option<Color>,
}

impl Run {
    /// Plain run in the theme's body font and size
    pub fn body(text: impl Into<String>, theme: &Theme) -> Self {
        Self {
            text: text.into(),
            font: theme.font_family.clone(),
            size: theme.body.size,
            bold: false,
            color: None,
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn size(mut self, size: FontSize) -> Self {
        self.size = size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Named paragraph styles known to every report document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleId {
    Heading1,
    Heading2,
    Normal,
}

impl StyleId {
    pub fn id(self) -> &'static str {
        match self {
            StyleId::Heading1 => "Heading1",
            StyleId::Heading2 => "Heading2",
            StyleId::Normal => "Normal",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StyleId::Heading1 => "heading 1",
            StyleId::Heading2 => "heading 2",
            StyleId::Normal => "Normal",
        }
    }

    /// Heading style for a heading level; anything deeper than 2 uses Heading2
    pub fn heading(level: usize) -> Self {
        if level <= 1 {
            StyleId::Heading1
        } else {
            StyleId::Heading2
        }
    }
}

/// A paragraph: runs plus paragraph-level formatting
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub style: Option<StyleId>,
    pub alignment: Alignment,
    pub space_before: Option<Length>,
    pub space_after: Option<Length>,
    pub indent_left: Option<Length>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn space_after(mut self, space: Length) -> Self {
        self.space_after = Some(space);
        self
    }

    pub fn indent_left(mut self, indent: Length) -> Self {
        self.indent_left = Some(indent);
        self
    }

    pub fn add_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).join("")
    }

    pub fn word_count(&self) -> usize {
        self.runs
            .iter()
            .map(|run| run.text.split_whitespace().count())
            .sum()
    }
}

/// Line style of a table border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderKind {
    #[default]
    Single,
}

/// A single border edge: kind, width in eighths of a point, color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderStyle {
    pub kind: BorderKind,
    pub size: usize,
    pub color: Color,
}

impl BorderStyle {
    /// Thin single line of the given color
    pub fn thin(color: Color) -> Self {
        Self {
            kind: BorderKind::Single,
            size: 4,
            color,
        }
    }
}

/// Borders for the outer and inner edges of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBorders {
    pub top: BorderStyle,
    pub left: BorderStyle,
    pub bottom: BorderStyle,
    pub right: BorderStyle,
    pub inside_h: BorderStyle,
    pub inside_v: BorderStyle,
}

impl TableBorders {
    pub fn uniform(border: BorderStyle) -> Self {
        Self {
            top: border,
            left: border,
            bottom: border,
            right: border,
            inside_h: border,
            inside_v: border,
        }
    }
}

/// One table cell: a single paragraph plus optional background fill
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    pub paragraph: Paragraph,
    pub shading: Option<Color>,
}

impl TableCell {
    pub fn text(&self) -> String {
        self.paragraph.text()
    }

    /// True when every run in the cell is bold (and there is at least one)
    pub fn is_bold(&self) -> bool {
        !self.paragraph.runs.is_empty() && self.paragraph.runs.iter().all(|run| run.bold)
    }
}

/// A fixed-size grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<TableCell>>,
    columns: usize,
    pub borders: Option<TableBorders>,
    pub alignment: Alignment,
}

impl Table {
    /// Allocate a `rows × columns` table of empty cells
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![vec![TableCell::default(); columns]; rows],
            columns,
            borders: None,
            alignment: Alignment::Left,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|cells| cells.get_mut(column))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TableCell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Text of every cell in a row, in column order
    pub fn row_texts(&self, row: usize) -> Option<Vec<String>> {
        self.rows
            .get(row)
            .map(|cells| cells.iter().map(TableCell::text).collect())
    }

    pub fn word_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .map(|cell| cell.paragraph.word_count())
            .sum()
    }
}

/// Block-level element of a document
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    PageBreak,
}

/// Page geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub width: Length,
    pub height: Length,
    pub margin_top: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,
    pub margin_right: Length,
}

impl PageSetup {
    /// Width available between the left and right margins
    pub fn content_width(&self) -> Length {
        Length::twips(
            self.width.as_twips() - self.margin_left.as_twips() - self.margin_right.as_twips(),
        )
    }
}

impl Default for PageSetup {
    /// US Letter with 1in top/bottom and 60pt side margins
    fn default() -> Self {
        Self {
            width: Length::emu(7_772_400),
            height: Length::emu(10_058_400),
            margin_top: Length::emu(914_400),
            margin_bottom: Length::emu(914_400),
            margin_left: Length::emu(762_000),
            margin_right: Length::emu(762_000),
        }
    }
}

/// A complete report document ready for export
///
/// Blocks can only be appended (through [`crate::document_builder::DocumentBuilder`]);
/// once built the document is read-only.
#[derive(Debug, Clone)]
pub struct Document {
    pub page: PageSetup,
    pub theme: Theme,
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(page: PageSetup, theme: Theme) -> Self {
        Self {
            page,
            theme,
            blocks: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    pub fn word_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(paragraph) => paragraph.word_count(),
                Block::Table(table) => table.word_count(),
                Block::PageBreak => 0,
            })
            .sum()
    }
}
