use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Reader, Sheets};
use chrono::{Local, NaiveDate};
use models::{AppState, Diagnostics, Goal, Ledger, Transaction};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{IngestionError, Result};
use crate::goal_loader;
use crate::ledger_merger::{merge, normalize_rows};
use crate::row_validator::{missing_columns, TransactionColumns, TRANSACTION_COLUMNS};
use crate::sheet::Sheet;

pub const SHEET_NEW: &str = "Transacciones";
pub const SHEET_HISTORY: &str = "Historico";
pub const SHEET_GOALS: &str = "Metas";
pub const SHEET_INSTRUCTIONS: &str = "Instrucciones";

const INGESTED_SHEETS: [&str; 3] = [SHEET_NEW, SHEET_HISTORY, SHEET_GOALS];

/// Everything one ingestion call produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub ledger: Ledger,
    pub goals: Vec<Goal>,
    pub diagnostics: Diagnostics,
}

impl IngestOutcome {
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty() && self.goals.is_empty()
    }

    /// Hands the result to the session state (replace-on-load).
    pub fn apply_to(self, state: AppState) -> AppState {
        state.apply_ingestion(self.ledger, self.goals)
    }
}

/// Runs the ingestion pipeline. `today` is used as the creation date for goals
/// that do not carry one.
#[derive(Debug, Clone, Copy)]
pub struct Ingestor {
    today: NaiveDate,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl Ingestor {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Reads a workbook from disk. The format (xlsx, xls, xlsb, ods) is detected
    /// from the extension.
    pub fn ingest_path<P: AsRef<Path>>(&self, path: P) -> Result<IngestOutcome> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let mut workbook =
            open_workbook_auto(path).map_err(|e| IngestionError::unreadable(&origin, e))?;
        let sheets = read_sheets(&mut workbook, &origin)?;
        Ok(self.ingest_sheets(sheets))
    }

    /// Reads an uploaded workbook held in memory.
    pub fn ingest_bytes(&self, bytes: Vec<u8>) -> Result<IngestOutcome> {
        let origin = "<upload>";
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| IngestionError::unreadable(origin, e))?;
        let sheets = read_sheets(&mut workbook, origin)?;
        Ok(self.ingest_sheets(sheets))
    }

    /// Pipeline core over already extracted sheets. Cannot fail: sheet and row
    /// problems end up in the diagnostics.
    pub fn ingest_sheets(&self, sheets: Vec<Sheet>) -> IngestOutcome {
        let mut by_name: HashMap<String, Sheet> =
            sheets.into_iter().map(|s| (s.name.clone(), s)).collect();
        let mut diagnostics = Diagnostics::default();

        let new_sheet = by_name.remove(SHEET_NEW);
        let history_sheet = by_name.remove(SHEET_HISTORY);

        let new_rows = new_sheet
            .as_ref()
            .and_then(|s| read_transactions(s, &mut diagnostics))
            .unwrap_or_default();
        let history_rows = history_sheet
            .as_ref()
            .and_then(|s| read_transactions(s, &mut diagnostics))
            .unwrap_or_default();

        // Old single-sheet files keep everything in Transacciones.
        let legacy = history_sheet.is_none() && new_sheet.is_some();
        let (historical, new) = if legacy {
            info!("no {} sheet, reading {} as history", SHEET_HISTORY, SHEET_NEW);
            (new_rows, Vec::new())
        } else {
            (history_rows, new_rows)
        };

        let merged = merge(historical, new);
        diagnostics.historical_count = merged.historical_count;
        diagnostics.new_count = merged.new_count;
        diagnostics.legacy_format = legacy;

        let goals = by_name
            .remove(SHEET_GOALS)
            .and_then(|sheet| read_goals(&sheet, self.today, &mut diagnostics))
            .unwrap_or_default();
        diagnostics.goal_count = goals.len();

        info!(
            new = diagnostics.new_count,
            historical = diagnostics.historical_count,
            goals = diagnostics.goal_count,
            problems = diagnostics.problem_rows.len(),
            "workbook ingested"
        );

        IngestOutcome {
            ledger: merged.ledger,
            goals,
            diagnostics,
        }
    }
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>, origin: &str) -> Result<Vec<Sheet>> {
    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::new();

    for sheet_name in sheet_names {
        if !INGESTED_SHEETS.contains(&sheet_name.as_str()) {
            debug!(sheet = %sheet_name, "sheet ignored");
            continue;
        }
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            IngestionError::unreadable(origin, format!("sheet '{}': {}", sheet_name, e))
        })?;
        let sheet = Sheet::from_range(sheet_name, &range);
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "sheet read");
        sheets.push(sheet);
    }

    Ok(sheets)
}

/// `None` when the sheet is empty or fails the schema check.
fn read_transactions(sheet: &Sheet, diagnostics: &mut Diagnostics) -> Option<Vec<Transaction>> {
    if !sheet.has_header() {
        debug!(sheet = %sheet.name, "empty sheet");
        return None;
    }
    let Some(columns) = TransactionColumns::resolve(sheet) else {
        warn!(
            sheet = %sheet.name,
            missing = ?missing_columns(&sheet.headers, &TRANSACTION_COLUMNS),
            "sheet skipped: required columns missing"
        );
        diagnostics.skipped_sheets.push(sheet.name.clone());
        return None;
    };

    let outcome = normalize_rows(sheet, &columns);
    if outcome.incomplete > 0 {
        debug!(sheet = %sheet.name, dropped = outcome.incomplete, "incomplete rows dropped");
    }
    diagnostics.problem_rows.extend(outcome.problems);
    Some(outcome.transactions)
}

fn read_goals(sheet: &Sheet, today: NaiveDate, diagnostics: &mut Diagnostics) -> Option<Vec<Goal>> {
    if !sheet.has_header() {
        return None;
    }
    let goals = goal_loader::load(sheet, today);
    if goals.is_none() {
        warn!(sheet = %sheet.name, "goal sheet skipped: no {} column", goal_loader::COL_GOAL_NAME);
        diagnostics.skipped_sheets.push(sheet.name.clone());
    }
    goals
}
