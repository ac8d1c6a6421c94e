use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::{ExportError, Result};

/// Data rows a worksheet can hold below its header.
pub const MAX_DATA_ROWS: usize = 1_048_575;

pub(crate) enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Adds a sheet with a bold header row followed by `rows`.
pub(crate) fn write_table(
    workbook: &mut Workbook,
    name: &'static str,
    headers: &[&str],
    rows: Vec<Vec<Cell>>,
) -> Result<()> {
    if rows.len() > MAX_DATA_ROWS {
        return Err(ExportError::TooManyRows {
            sheet: name,
            rows: rows.len(),
        });
    }

    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        worksheet.set_column_width(col as u16, column_width(header))?;
    }

    for (idx, cells) in rows.into_iter().enumerate() {
        let row = (idx + 1) as u32;
        write_cells(worksheet, row, cells)?;
    }

    Ok(())
}

fn write_cells(worksheet: &mut Worksheet, row: u32, cells: Vec<Cell>) -> Result<()> {
    for (col, cell) in cells.into_iter().enumerate() {
        let col = col as u16;
        match cell {
            Cell::Text(s) => worksheet.write_string(row, col, s)?,
            Cell::Number(n) => worksheet.write_number(row, col, n)?,
        };
    }
    Ok(())
}

fn column_width(header: &str) -> f64 {
    (header.chars().count() as f64 + 4.0).max(12.0)
}

/// Single-column free text sheet.
pub(crate) fn write_text_sheet(
    workbook: &mut Workbook,
    name: &'static str,
    header: &str,
    lines: &[String],
) -> Result<()> {
    let rows = lines.iter().map(|l| vec![Cell::from(l.clone())]).collect();
    write_table(workbook, name, &[header], rows)?;
    let worksheet = workbook.worksheet_from_name(name)?;
    worksheet.set_column_width(0, 80)?;
    Ok(())
}
