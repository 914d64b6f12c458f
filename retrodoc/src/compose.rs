//! Turn a report description into a document
//!
//! Composition runs in a fixed order:
//! 1. **Cover page**: centered title lines followed by a page break
//! 2. **Table of contents**: one numbered entry per section
//! 3. **Sections**: heading, optional intro, then the section's blocks
//!
//! Apart from reading CSV table files this stage performs no I/O; the
//! resulting [`Document`] is persisted separately by the exporter.

use crate::document_builder::{DocumentBuilder, RunSpec};
use crate::report_config::{BlockConfig, BulletItem, CoverConfig, ReportConfig, SectionConfig};
use crate::report_model::{Alignment, Document};
use crate::table_builder::ValidationError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Font size of TOC entries, in points
const TOC_ENTRY_PT: f32 = 11.0;

/// Composition errors
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Invalid table in section '{section}' (block {block}): {source}")]
    Table {
        section: String,
        block: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Error reading CSV table {path}: {source}", path = .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Compose a full report document
///
/// # Parameters
/// * `config` - The report description
/// * `base_dir` - Directory that relative CSV table paths resolve against
///
/// # Returns
/// * `Ok(Document)` - The composed document, ready for export
/// * `Err(ComposeError)` - A table was malformed or a CSV file could not be read
pub fn compose(config: &ReportConfig, base_dir: &Path) -> Result<Document, ComposeError> {
    let theme = config.theme.resolve();
    let mut builder = DocumentBuilder::new(config.page.to_page_setup(), theme);

    if config.cover.enabled && config.cover.has_content() {
        log::debug!("Composing cover page");
        append_cover(&mut builder, &config.cover);
    }

    if config.toc.enabled && !config.sections.is_empty() {
        log::debug!("Composing table of contents ({} entries)", config.sections.len());
        append_toc(&mut builder, config);
    }

    for (index, section) in config.sections.iter().enumerate() {
        let number = config.numbered.then_some(index + 1);
        append_section(&mut builder, section, number, base_dir)?;
    }

    let doc = builder.build();
    log::info!(
        "Composed report: {} blocks, {} tables, {} words",
        doc.blocks().len(),
        doc.table_count(),
        doc.word_count()
    );
    Ok(doc)
}

/// Heading text for a section, with its number when numbering is on
pub fn section_heading(title: &str, number: Option<usize>) -> String {
    match number {
        Some(n) => format!("{}. {}", n, title),
        None => title.to_string(),
    }
}

fn append_cover(builder: &mut DocumentBuilder, cover: &CoverConfig) {
    for _ in 0..cover.leading_blank_lines {
        builder.add_blank();
    }

    let palette = builder.theme().palette;
    let title_color = builder
        .theme()
        .heading1
        .color
        .unwrap_or(palette.header_fill);

    let lines = [
        (&cover.context, RunSpec::default().size(14.0).color(palette.muted)),
        (&cover.title, RunSpec::default().size(24.0).bold().color(title_color)),
        (&cover.subtitle, RunSpec::default().size(20.0).bold().color(palette.accent)),
        (&cover.description, RunSpec::default().size(11.0).color(palette.muted)),
    ];
    for (text, spec) in lines {
        if let Some(text) = text {
            builder.add_run_paragraph(&[RunSpec { text: text.clone(), ..spec }], Alignment::Center);
        }
    }

    builder.add_blank();

    let footer_lines = [
        (&cover.date, RunSpec::default().size(11.0).color(palette.subtle)),
        (&cover.byline, RunSpec::default().size(10.0).color(palette.subtle)),
    ];
    for (text, spec) in footer_lines {
        if let Some(text) = text {
            builder.add_run_paragraph(&[RunSpec { text: text.clone(), ..spec }], Alignment::Center);
        }
    }

    builder.add_page_break();
}

fn append_toc(builder: &mut DocumentBuilder, config: &ReportConfig) {
    let accent = builder.theme().palette.accent;

    builder.add_heading(&config.toc.heading, 1);
    builder.add_blank();

    for (index, section) in config.sections.iter().enumerate() {
        let title = section.toc_title.as_deref().unwrap_or(&section.title);
        let mut runs = Vec::with_capacity(2);
        if config.numbered {
            runs.push(
                RunSpec::new(format!("{}. ", index + 1))
                    .size(TOC_ENTRY_PT)
                    .bold()
                    .color(accent),
            );
        }
        runs.push(RunSpec::new(title).size(TOC_ENTRY_PT));
        builder.add_run_paragraph(&runs, Alignment::Left);
    }

    builder.add_page_break();
}

fn append_section(
    builder: &mut DocumentBuilder,
    section: &SectionConfig,
    number: Option<usize>,
    base_dir: &Path,
) -> Result<(), ComposeError> {
    builder.add_heading(&section_heading(&section.title, number), 1);

    if let Some(intro) = &section.intro {
        builder.add_paragraph(intro);
    }

    for (block_index, block) in section.blocks.iter().enumerate() {
        let table_error = |source| ComposeError::Table {
            section: section.title.clone(),
            block: block_index,
            source,
        };

        match block {
            BlockConfig::Paragraph { text } => {
                builder.add_paragraph(text);
            }
            BlockConfig::Subheading { text } => {
                builder.add_heading(text, 2);
            }
            BlockConfig::Bullets { items } => {
                for item in items {
                    match item {
                        BulletItem::Plain(text) => builder.add_bullet(text, ""),
                        BulletItem::Prefixed { prefix, text } => builder.add_bullet(text, prefix),
                    };
                }
            }
            BlockConfig::StyledTable { headers, rows } => {
                builder
                    .add_styled_table(headers, rows)
                    .map_err(table_error)?;
            }
            BlockConfig::KeyValueTable { pairs } => {
                builder.add_key_value_table(pairs).map_err(table_error)?;
            }
            BlockConfig::CsvTable { path } => {
                let path = base_dir.join(path);
                let (headers, rows) = read_csv_table(&path)?;
                log::debug!("Loaded CSV table {} ({} rows)", path.display(), rows.len());
                builder
                    .add_styled_table(&headers, &rows)
                    .map_err(table_error)?;
            }
            BlockConfig::Blank => {
                builder.add_blank();
            }
            BlockConfig::PageBreak => {
                builder.add_page_break();
            }
        }
    }

    Ok(())
}

/// Read a CSV file as a header record plus data records
///
/// Records are read flexibly so a ragged file reaches the table builder
/// and is reported as a column-count mismatch with its row number.
fn read_csv_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), ComposeError> {
    let csv_error = |source| ComposeError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok((headers, rows))
}
