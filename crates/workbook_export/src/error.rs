use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot build workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Sheet {sheet} would exceed the row limit ({rows} rows)")]
    TooManyRows { sheet: &'static str, rows: usize },

    #[error("Cannot write workbook to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}
