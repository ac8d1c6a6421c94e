//! Writes the workbooks handed back to the user: the starter template and the
//! personal workbook that carries the ledger and goals into the next session.

pub mod error;
pub mod personal;
pub mod sheet_writer;
pub mod template;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_xlsxwriter::Workbook;
use tracing::info;

pub use crate::error::{ExportError, Result};
pub use crate::personal::{build_personal_workbook, personal_workbook_bytes, PersonalExport};
pub use crate::template::{build_template_workbook, template_workbook_bytes};

/// `<prefix>_<YYYYmmdd_HHMM>.xlsx`
pub fn export_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{}_{}.xlsx", prefix, now.format("%Y%m%d_%H%M"))
}

/// A directory target gets a timestamped file name inside it; anything else is
/// used as the file path.
pub fn resolve_output_path(out: &Path, prefix: &str, now: NaiveDateTime) -> PathBuf {
    if out.is_dir() {
        out.join(export_file_name(prefix, now))
    } else {
        out.to_path_buf()
    }
}

pub fn save_workbook(workbook: &mut Workbook, path: &Path) -> Result<()> {
    workbook.save(path).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "workbook written");
    Ok(())
}
