//! Reads a personal finance workbook (`Transacciones`, `Historico`, `Metas`)
//! into a ledger, a goal list and a diagnostics report.
//!
//! ```no_run
//! use workbook_ingest::Ingestor;
//!
//! let outcome = Ingestor::default().ingest_path("mis_finanzas.xlsx")?;
//! println!(
//!     "{} new, {} historical, {} goals",
//!     outcome.diagnostics.new_count,
//!     outcome.diagnostics.historical_count,
//!     outcome.diagnostics.goal_count
//! );
//! # Ok::<(), workbook_ingest::IngestionError>(())
//! ```

pub mod date_normalizer;
pub mod error;
pub mod goal_loader;
pub mod ledger_merger;
pub mod pipeline;
pub mod row_validator;
pub mod sheet;

pub use crate::date_normalizer::{normalize, normalize_str};
pub use crate::error::IngestionError;
pub use crate::goal_loader::GOAL_COLUMNS;
pub use crate::ledger_merger::{merge, MergedLedger};
pub use crate::pipeline::{
    IngestOutcome, Ingestor, SHEET_GOALS, SHEET_HISTORY, SHEET_INSTRUCTIONS, SHEET_NEW,
};
pub use crate::row_validator::{validate_schema, TRANSACTION_COLUMNS};
pub use crate::sheet::Sheet;
