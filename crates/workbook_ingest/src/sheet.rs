use calamine::{Data, Range};

/// A worksheet reduced to what ingestion needs: the header names from the first
/// row and the data rows below it, each tagged with its spreadsheet row number.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based row number as the user sees it in a spreadsheet program.
    pub row: usize,
    pub cells: Vec<Data>,
}

impl SheetRow {
    pub fn get(&self, col: usize) -> Option<&Data> {
        self.cells.get(col)
    }

    /// Lookup for optional columns that may not exist in the sheet.
    pub fn get_opt(&self, col: Option<usize>) -> Option<&Data> {
        col.and_then(|c| self.cells.get(c))
    }
}

impl Sheet {
    /// Builds a sheet from a calamine range. The first row of the used area is the
    /// header row.
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let name = name.into();
        let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        let mut rows_iter = range.rows();
        let headers = rows_iter
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|c| cell_str(Some(c)).unwrap_or_default().trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows_iter
            .enumerate()
            .map(|(idx, cells)| SheetRow {
                // header occupies first_row, data starts one below; +1 for 1-based
                row: first_row + idx + 2,
                cells: cells.to_vec(),
            })
            .collect();

        Self {
            name,
            headers,
            rows,
        }
    }

    /// Convenience constructor with the header in row 1 and data from row 2.
    pub fn new(name: impl Into<String>, headers: &[&str], rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(idx, cells)| SheetRow { row: idx + 2, cells })
                .collect(),
        }
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn has_header(&self) -> bool {
        self.headers.iter().any(|h| !h.is_empty())
    }
}

pub fn cell_str(cell: Option<&Data>) -> Option<String> {
    let c = cell?;
    match c {
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Empty => None,
        _ => Some(c.to_string()),
    }
}

/// Empty cells, whitespace-only strings and spreadsheet error values all count
/// as missing.
pub fn is_blank(cell: Option<&Data>) -> bool {
    match cell {
        None | Some(Data::Empty) | Some(Data::Error(_)) => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Trimmed text of a cell, `None` when blank.
pub fn cell_text(cell: Option<&Data>) -> Option<String> {
    if is_blank(cell) {
        return None;
    }
    cell_str(cell).map(|s| s.trim().to_string())
}

pub fn parse_amount(cell: Option<&Data>) -> Option<f64> {
    let value = match cell? {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => parse_amount_text(s)?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Accepts `1,200.50` and `1.200,50`. With both separators present the last
/// one is the decimal mark. A lone comma followed by one or two digits is a
/// decimal comma (`-150,50`), otherwise commas group thousands.
fn parse_amount_text(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(comma), None) => {
            let decimals = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, _) => cleaned,
    };
    normalized.parse::<f64>().ok()
}
