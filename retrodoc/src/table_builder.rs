//! Styled table construction
//!
//! Two table shapes are used throughout a report:
//! - a *styled table*: dark header row, striped data rows, bold first column
//! - a *key-value table*: two columns, shaded bold keys, striped values
//!
//! Both are built from plain strings and validated before anything is
//! allocated, so a caller holding a document never sees a half-built table.

use crate::report_model::{
    Alignment, BorderStyle, Color, Paragraph, Run, Table, TableBorders, TableCell,
};
use crate::theme::Theme;
use thiserror::Error;

/// Malformed input to a table builder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A styled table needs at least one header
    #[error("Table must have at least one header column")]
    EmptyHeaders,

    /// A key-value table needs at least one pair
    #[error("Table must have at least one row")]
    EmptyTable,

    /// A data row does not have one value per header
    #[error("Row {row} has {actual} values but the table has {expected} columns")]
    ColumnCountMismatch {
        /// Zero-based data row index (the header row is not counted)
        row: usize,
        /// Number of header columns
        expected: usize,
        /// Number of values in the offending row
        actual: usize,
    },
}

/// Set a cell's background fill; applying again replaces the previous color
pub fn set_cell_shading(cell: &mut TableCell, color: Color) {
    cell.shading = Some(color);
}

/// Apply the same border to every outer and inner edge of a table
pub fn set_table_borders(table: &mut Table, border: BorderStyle) {
    table.borders = Some(TableBorders::uniform(border));
}

/// Check that a header list and its rows form a rectangular grid
pub fn validate_grid<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Result<(), ValidationError> {
    if headers.is_empty() {
        return Err(ValidationError::EmptyHeaders);
    }

    match rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != headers.len())
    {
        Some((row, values)) => Err(ValidationError::ColumnCountMismatch {
            row,
            expected: headers.len(),
            actual: values.len(),
        }),
        None => Ok(()),
    }
}

/// Build a table with a header row and striped data rows
///
/// # Parameters
/// * `theme` - Source of the font, header fill and stripe colors
/// * `headers` - Header labels; determines the column count
/// * `rows` - Data rows, each with exactly `headers.len()` values
///
/// # Returns
/// * `Ok(Table)` - `(1 + rows.len()) × headers.len()` styled table
/// * `Err(ValidationError)` - Empty headers or a row of the wrong width
pub fn build_styled_table<S: AsRef<str>>(
    theme: &Theme,
    headers: &[S],
    rows: &[Vec<S>],
) -> Result<Table, ValidationError> {
    validate_grid(headers, rows)?;

    let palette = &theme.palette;
    let mut table = Table::new(1 + rows.len(), headers.len());
    table.alignment = Alignment::Center;
    set_table_borders(&mut table, theme.table_border());

    for (col, header) in headers.iter().enumerate() {
        let run = Run::body(header.as_ref(), theme)
            .bold(true)
            .color(palette.header_text);
        fill_cell(&mut table, 0, col, run, Alignment::Center, Some(palette.header_fill));
    }

    for (row_idx, values) in rows.iter().enumerate() {
        let stripe = (row_idx % 2 == 0).then_some(palette.stripe_fill);
        for (col, value) in values.iter().enumerate() {
            let run = Run::body(value.as_ref(), theme).bold(col == 0);
            fill_cell(&mut table, row_idx + 1, col, run, Alignment::Center, stripe);
        }
    }

    Ok(table)
}

/// Build a two-column label/value table, one pair per row
///
/// Row order always matches the input order.
pub fn build_key_value_table<K: AsRef<str>, V: AsRef<str>>(
    theme: &Theme,
    pairs: &[(K, V)],
) -> Result<Table, ValidationError> {
    if pairs.is_empty() {
        return Err(ValidationError::EmptyTable);
    }

    let palette = &theme.palette;
    let mut table = Table::new(pairs.len(), 2);
    table.alignment = Alignment::Center;
    set_table_borders(&mut table, theme.table_border());

    for (row, (key, value)) in pairs.iter().enumerate() {
        let key_run = Run::body(key.as_ref(), theme).bold(true);
        fill_cell(&mut table, row, 0, key_run, Alignment::Left, Some(palette.key_fill));

        let value_fill = if row % 2 == 0 {
            palette.value_fill
        } else {
            palette.stripe_fill
        };
        let value_run = Run::body(value.as_ref(), theme);
        fill_cell(&mut table, row, 1, value_run, Alignment::Left, Some(value_fill));
    }

    Ok(table)
}

/// Put a single run into a cell and optionally shade it
///
/// Callers size the table before filling it, so the cell always exists.
fn fill_cell(
    table: &mut Table,
    row: usize,
    col: usize,
    run: Run,
    alignment: Alignment,
    shading: Option<Color>,
) {
    if let Some(cell) = table.cell_mut(row, col) {
        cell.paragraph = Paragraph::new().align(alignment).add_run(run);
        if let Some(color) = shading {
            set_cell_shading(cell, color);
        }
    }
}
