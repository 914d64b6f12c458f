//! DOCX export using the docx-rs library
//!
//! This is the only module that knows about OOXML. It maps the report model
//! onto `docx-rs` builders (named styles, page geometry, shading, borders),
//! packs the archive in memory, and writes it to disk in one step so that a
//! failed save never leaves a truncated file at the target path.

use crate::report_model::{
    Alignment, Block, BorderKind, BorderStyle, Document, PageSetup, Paragraph, Run, StyleId,
    Table, TableBorders, TableCell,
};
use crate::theme::{ParagraphStyle, Theme};
use docx_rs::{
    AlignmentType, BorderType, BreakType, Docx, LineSpacing, PageMargin, RunFonts, Shading,
    ShdType, Style, StyleType, TableAlignmentType, TableBorder, TableBorderPosition, WidthType,
};
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Line spacing value for single spacing (240ths of a line)
const SINGLE_LINE: f32 = 240.0;

/// Suffix of the temporary file written next to the target
const PARTIAL_SUFFIX: &str = ".partial";

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error writing {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to pack DOCX: {0}")]
    Package(String),
}

/// Export a report document to Microsoft Word (.docx)
///
/// The parent directory must already exist. The package is serialized in
/// memory, written to `<name>.partial` beside the target and renamed into
/// place; on failure the temporary file is removed.
///
/// # Parameters
/// * `doc` - The composed report document
/// * `output_path` - Path where the .docx file will be written
///
/// # Returns
/// * `Ok(())` - Successfully wrote the document
/// * `Err(ExportError)` - Packing or writing failed
pub fn save(doc: &Document, output_path: &Path) -> Result<(), ExportError> {
    let bytes = to_bytes(doc)?;

    log::info!(
        "Writing DOCX to: {} ({} bytes)",
        output_path.display(),
        bytes.len()
    );

    let partial = partial_path(output_path).ok_or_else(|| ExportError::Io {
        path: output_path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "output path has no file name",
        ),
    })?;

    if let Err(source) = write_then_rename(&bytes, &partial, output_path) {
        if partial.exists() {
            if let Err(e) = fs::remove_file(&partial) {
                log::warn!("Failed to remove {}: {}", partial.display(), e);
            }
        }
        return Err(ExportError::Io {
            path: output_path.to_path_buf(),
            source,
        });
    }

    log::info!("Successfully wrote DOCX with {} blocks", doc.blocks().len());
    Ok(())
}

/// Serialize a report document into DOCX package bytes
pub fn to_bytes(doc: &Document) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    render(doc)
        .build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Package(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Build the docx-rs document for a report
pub fn render(doc: &Document) -> Docx {
    let mut docx = Docx::new()
        .page_size(
            twips_u32(doc.page.width.as_twips()),
            twips_u32(doc.page.height.as_twips()),
        )
        .page_margin(page_margin(&doc.page))
        .default_fonts(run_fonts(&doc.theme.font_family))
        .default_size(doc.theme.body.size.as_half_points());

    docx = add_named_styles(docx, &doc.theme);

    let content_width = twips_usize(doc.page.content_width().as_twips());
    for block in doc.blocks() {
        docx = match block {
            Block::Paragraph(paragraph) => docx.add_paragraph(create_paragraph(paragraph)),
            Block::Table(table) => docx.add_table(create_table(table, content_width)),
            Block::PageBreak => docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_break(BreakType::Page)),
            ),
        };
    }

    docx
}

fn page_margin(page: &PageSetup) -> PageMargin {
    PageMargin::new()
        .top(page.margin_top.as_twips())
        .bottom(page.margin_bottom.as_twips())
        .left(page.margin_left.as_twips())
        .right(page.margin_right.as_twips())
}

/// Register Heading1, Heading2 and Normal with the theme's formatting
///
/// `Docx::new()` seeds an empty `Normal`; an existing entry with the same id
/// is replaced so each style id is declared once.
fn add_named_styles(mut docx: Docx, theme: &Theme) -> Docx {
    for id in [StyleId::Heading1, StyleId::Heading2, StyleId::Normal] {
        docx.styles.styles.retain(|style| style.style_id != id.id());
        docx = docx.add_style(create_style(id, theme.style(id), &theme.font_family));
    }
    docx
}

fn create_style(id: StyleId, format: &ParagraphStyle, font: &str) -> Style {
    let mut style = Style::new(id.id(), StyleType::Paragraph)
        .name(id.display_name())
        .fonts(run_fonts(font))
        .size(format.size.as_half_points());

    if format.bold {
        style = style.bold();
    }
    if let Some(color) = format.color {
        style = style.color(color.to_hex());
    }
    if let Some(spacing) = line_spacing(format) {
        style = style.line_spacing(spacing);
    }

    style
}

/// Spacing for a named style, or `None` when it sets none of before/after/line
fn line_spacing(format: &ParagraphStyle) -> Option<LineSpacing> {
    if format.space_before.is_none() && format.space_after.is_none() && format.line_spacing.is_none()
    {
        return None;
    }

    let mut spacing = LineSpacing::new();
    if let Some(before) = format.space_before {
        spacing = spacing.before(twips_u32(before.as_twips()));
    }
    if let Some(after) = format.space_after {
        spacing = spacing.after(twips_u32(after.as_twips()));
    }
    if let Some(multiple) = format.line_spacing {
        spacing = spacing.line((multiple * SINGLE_LINE).round() as i32);
    }
    Some(spacing)
}

/// Same font for every script so CJK text does not fall back to the theme font
fn run_fonts(font: &str) -> RunFonts {
    RunFonts::new()
        .ascii(font)
        .hi_ansi(font)
        .east_asia(font)
        .cs(font)
}

fn alignment_to_docx_alignment(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
    }
}

fn alignment_to_table_alignment(alignment: Alignment) -> TableAlignmentType {
    match alignment {
        Alignment::Left => TableAlignmentType::Left,
        Alignment::Center => TableAlignmentType::Center,
        Alignment::Right => TableAlignmentType::Right,
    }
}

/// Create a docx Paragraph with its runs and paragraph-level formatting
fn create_paragraph(paragraph: &Paragraph) -> docx_rs::Paragraph {
    let mut para = docx_rs::Paragraph::new();

    if let Some(style) = paragraph.style {
        para = para.style(style.id());
    }
    if paragraph.alignment != Alignment::Left {
        para = para.align(alignment_to_docx_alignment(paragraph.alignment));
    }
    if paragraph.space_before.is_some() || paragraph.space_after.is_some() {
        let mut spacing = LineSpacing::new();
        if let Some(before) = paragraph.space_before {
            spacing = spacing.before(twips_u32(before.as_twips()));
        }
        if let Some(after) = paragraph.space_after {
            spacing = spacing.after(twips_u32(after.as_twips()));
        }
        para = para.line_spacing(spacing);
    }
    if let Some(indent) = paragraph.indent_left {
        para = para.indent(Some(indent.as_twips()), None, None, None);
    }

    for run in &paragraph.runs {
        para = para.add_run(create_run(run));
    }

    para
}

/// Create a docx Run carrying its own font, size, weight and color
fn create_run(run: &Run) -> docx_rs::Run {
    let mut docx_run = docx_rs::Run::new()
        .add_text(&run.text)
        .fonts(run_fonts(&run.font))
        .size(run.size.as_half_points());

    if run.bold {
        docx_run = docx_run.bold();
    }
    if let Some(color) = run.color {
        docx_run = docx_run.color(color.to_hex());
    }

    docx_run
}

/// Create a docx Table with equal column widths spanning the content area
fn create_table(table: &Table, content_width: usize) -> docx_rs::Table {
    let column_width = content_width / table.column_count().max(1);

    let rows: Vec<docx_rs::TableRow> = table
        .rows()
        .map(|cells| {
            let cells = cells
                .iter()
                .map(|cell| create_table_cell(cell, column_width))
                .collect();
            docx_rs::TableRow::new(cells)
        })
        .collect();

    let mut docx_table = docx_rs::Table::new(rows)
        .set_grid(vec![column_width; table.column_count()])
        .align(alignment_to_table_alignment(table.alignment));

    if let Some(borders) = &table.borders {
        docx_table = docx_table.set_borders(create_borders(borders));
    }

    docx_table
}

fn create_table_cell(cell: &TableCell, width: usize) -> docx_rs::TableCell {
    let mut docx_cell = docx_rs::TableCell::new()
        .width(width, WidthType::Dxa)
        .add_paragraph(create_paragraph(&cell.paragraph));

    if let Some(fill) = cell.shading {
        docx_cell = docx_cell.shading(
            Shading::new()
                .shd_type(ShdType::Clear)
                .color("auto")
                .fill(fill.to_hex()),
        );
    }

    docx_cell
}

fn create_borders(borders: &TableBorders) -> docx_rs::TableBorders {
    [
        (TableBorderPosition::Top, borders.top),
        (TableBorderPosition::Left, borders.left),
        (TableBorderPosition::Bottom, borders.bottom),
        (TableBorderPosition::Right, borders.right),
        (TableBorderPosition::InsideH, borders.inside_h),
        (TableBorderPosition::InsideV, borders.inside_v),
    ]
    .into_iter()
    .fold(docx_rs::TableBorders::with_empty(), |acc, (position, style)| {
        acc.set(create_border(position, style))
    })
}

fn create_border(position: TableBorderPosition, style: BorderStyle) -> TableBorder {
    TableBorder::new(position)
        .border_type(border_type(style.kind))
        .size(style.size)
        .color(style.color.to_hex())
}

fn border_type(kind: BorderKind) -> BorderType {
    match kind {
        BorderKind::Single => BorderType::Single,
    }
}

fn twips_u32(twips: i32) -> u32 {
    twips.max(0) as u32
}

fn twips_usize(twips: i32) -> usize {
    twips.max(0) as usize
}

/// `report.docx` -> `report.docx.partial` in the same directory
fn partial_path(target: &Path) -> Option<PathBuf> {
    let name = target.file_name()?.to_str()?;
    Some(target.with_file_name(format!("{name}{PARTIAL_SUFFIX}")))
}

fn write_then_rename(bytes: &[u8], partial: &Path, target: &Path) -> std::io::Result<()> {
    {
        let mut file = File::create(partial)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(partial, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_builder::DocumentBuilder;
    use std::io::Read;

    fn sample_document() -> Document {
        let mut builder = DocumentBuilder::new(PageSetup::default(), Theme::default());
        builder
            .add_heading("1. Scores", 1)
            .add_paragraph("Results per person.");
        builder
            .add_styled_table(&["Name", "Score"], &[vec!["Alice", "10"], vec!["Bob", "20"]])
            .unwrap();
        builder.add_bullet("all passed", "E2E: ").add_page_break();
        builder.add_key_value_table(&[("k1", "v1")]).unwrap();
        builder.build()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_package_contains_content_and_styles() {
        let bytes = to_bytes(&sample_document()).unwrap();

        let document_xml = read_part(&bytes, "word/document.xml");
        assert!(document_xml.contains("Alice"));
        assert!(document_xml.contains("Results per person."));
        assert!(document_xml.contains("1E3A5F"));
        assert!(document_xml.contains("F8FAFC"));
        assert!(document_xml.contains("CCCCCC"));

        let styles_xml = read_part(&bytes, "word/styles.xml");
        assert!(styles_xml.contains("Heading1"));
        assert!(styles_xml.contains("Heading2"));
        assert!(styles_xml.contains("2563EB"));
    }

    /// The `<w:style>` element declaring `style_id`, if any
    fn style_element<'a>(styles_xml: &'a str, style_id: &str) -> Option<&'a str> {
        let marker = format!("w:styleId=\"{}\"", style_id);
        let start = styles_xml.find(&marker)?;
        let end = styles_xml[start..].find("</w:style>")?;
        Some(&styles_xml[start..start + end])
    }

    #[test]
    fn test_named_styles_are_declared_once() {
        let bytes = to_bytes(&sample_document()).unwrap();
        let styles_xml = read_part(&bytes, "word/styles.xml");

        for id in ["Normal", "Heading1", "Heading2"] {
            let marker = format!("w:styleId=\"{}\"", id);
            assert_eq!(
                styles_xml.matches(&marker).count(),
                1,
                "style {} should be declared exactly once",
                id
            );
        }

        let normal = style_element(&styles_xml, "Normal").unwrap();
        assert!(normal.contains("w:after=\"60\""), "Normal style: {}", normal);

        let heading1 = style_element(&styles_xml, "Heading1").unwrap();
        assert!(heading1.contains("w:val=\"heading 1\""), "Heading1 style: {}", heading1);
        assert!(heading1.contains("1E3A5F"));
    }

    #[test]
    fn test_save_writes_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.docx");

        save(&sample_document(), &target).unwrap();

        assert!(target.exists());
        assert!(!dir.path().join("report.docx.partial").exists());
        let bytes = fs::read(&target).unwrap();
        assert!(read_part(&bytes, "word/document.xml").contains("Bob"));
    }

    #[test]
    fn test_save_to_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("report.docx");

        let err = save(&sample_document(), &target).unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }));
        assert!(!target.exists());
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes the final rename fail
        let target = dir.path().join("report.docx");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "existing").unwrap();

        assert!(save(&sample_document(), &target).is_err());

        assert!(target.is_dir());
        assert!(target.join("keep.txt").exists());
        assert!(!dir.path().join("report.docx.partial").exists());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("out/report.docx")),
            Some(PathBuf::from("out/report.docx.partial"))
        );
        assert_eq!(partial_path(Path::new("/")), None);
    }
}
