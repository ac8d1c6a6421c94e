use chrono::{NaiveDate, NaiveDateTime};
use models::{AppState, Goal, Transaction};
use rust_xlsxwriter::Workbook;
use tracing::debug;
use workbook_ingest::{
    GOAL_COLUMNS, SHEET_GOALS, SHEET_HISTORY, SHEET_INSTRUCTIONS, SHEET_NEW, TRANSACTION_COLUMNS,
};

use crate::error::Result;
use crate::sheet_writer::{write_table, write_text_sheet, Cell};

pub const SHEET_DATE_FORMAT: &str = "%d/%m/%Y";

/// How the personal workbook is laid out.
#[derive(Debug, Clone, Copy)]
pub struct PersonalExport {
    pub generated_at: NaiveDateTime,
    /// Put one sample row into `Transacciones` as a hint for the user. The
    /// sample is read back as a new transaction on the next upload.
    pub example_row: bool,
    /// When set, only the first `n` ledger entries go to `Historico` and the
    /// rest are written back to `Transacciones` as still pending. No sample row
    /// is added. Used when rewriting a workbook without rolling it over.
    pub pending_from: Option<usize>,
}

impl PersonalExport {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            example_row: true,
            pending_from: None,
        }
    }

    /// Keeps the historical/new split of the workbook the state was read from.
    pub fn keep_pending(mut self, historical_count: usize) -> Self {
        self.pending_from = Some(historical_count);
        self
    }

    pub fn without_example(mut self) -> Self {
        self.example_row = false;
        self
    }
}

/// Builds the workbook the user keeps between sessions: the whole ledger rolls
/// into `Historico` and `Transacciones` is left for new entries, unless
/// [`PersonalExport::keep_pending`] asks for the split to be preserved.
pub fn build_personal_workbook(state: &AppState, options: PersonalExport) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let (history, pending) = match options.pending_from {
        Some(n) => state.ledger.split_at(n.min(state.ledger.len())),
        None => (state.ledger.as_slice(), &[][..]),
    };

    let new_rows = if options.pending_from.is_some() {
        pending.iter().map(transaction_row).collect()
    } else if options.example_row {
        vec![vec![
            Cell::from("17/04/2024"),
            Cell::from("Vivienda"),
            Cell::from("Gasto"),
            Cell::from(-900.0),
        ]]
    } else {
        Vec::new()
    };
    write_table(&mut workbook, SHEET_NEW, &TRANSACTION_COLUMNS, new_rows)?;

    let history_rows = history.iter().map(transaction_row).collect();
    write_table(&mut workbook, SHEET_HISTORY, &TRANSACTION_COLUMNS, history_rows)?;

    let goals = state.goals.iter().map(goal_row).collect();
    write_table(&mut workbook, SHEET_GOALS, &GOAL_COLUMNS, goals)?;

    write_text_sheet(
        &mut workbook,
        SHEET_INSTRUCTIONS,
        "INSTRUCCIONES_ACTUALIZADAS",
        &personal_instructions(history.len(), state.goals.len(), options.generated_at),
    )?;

    debug!(
        history = history.len(),
        pending = pending.len(),
        goals = state.goals.len(),
        "personal workbook built"
    );
    Ok(workbook)
}

pub fn personal_workbook_bytes(state: &AppState, options: PersonalExport) -> Result<Vec<u8>> {
    let mut workbook = build_personal_workbook(state, options)?;
    Ok(workbook.save_to_buffer()?)
}

fn format_date(d: NaiveDate) -> String {
    d.format(SHEET_DATE_FORMAT).to_string()
}

fn transaction_row(t: &Transaction) -> Vec<Cell> {
    vec![
        Cell::from(format_date(t.date)),
        Cell::from(t.category.as_str()),
        Cell::from(t.kind.label()),
        Cell::from(t.amount),
    ]
}

fn goal_row(g: &Goal) -> Vec<Cell> {
    vec![
        Cell::from(g.name.as_str()),
        Cell::from(g.target_amount),
        Cell::from(g.deadline.map(format_date).unwrap_or_default()),
        Cell::from(format_date(g.created_at)),
    ]
}

fn personal_instructions(history: usize, goals: usize, generated_at: NaiveDateTime) -> Vec<String> {
    let mut lines = vec![
        "=== TU ARCHIVO PERSONAL ===".to_string(),
        format!(
            "Archivo generado el: {}",
            generated_at.format("%d/%m/%Y %H:%M")
        ),
        format!("Transacciones en histórico: {}", history),
        format!("Metas activas: {}", goals),
        String::new(),
    ];
    lines.extend(
        [
            "=== CÓMO USAR ===",
            "1. Agrega NUEVAS transacciones SOLO en la hoja \"Transacciones\"",
            "2. ELIMINA el ejemplo antes de agregar tus datos",
            "3. NO modifiques las hojas \"Historico\" ni \"Metas\"",
            "4. La app combinará histórico + nuevos datos automáticamente",
            "",
            "=== FORMATO TRANSACCIONES ===",
            "Fecha: DD/MM/YYYY (ej: 17/04/2024)",
            "Categoria: Vivienda, Alimentación, Transporte, etc.",
            "Tipo: Gasto o Ingreso",
            "Monto: Negativo para gastos (-900), positivo para ingresos",
            "",
            "=== EJEMPLO CORRECTO ===",
            "17/04/2024    Vivienda    Gasto    -900",
            "18/04/2024    Salario     Ingreso   3000",
            "",
            "=== IMPORTANTE FECHAS ===",
            "Excel puede cambiar formato automáticamente.",
            "Si ves fechas raras, verifica que estén en DD/MM/YYYY",
        ]
        .into_iter()
        .map(String::from),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::TransactionKind;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_transaction_row_uses_day_first_dates_and_labels() {
        let t = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            "Salary",
            TransactionKind::Income,
            3000.0,
        );
        let row = transaction_row(&t);
        assert!(matches!(&row[0], Cell::Text(s) if s == "01/02/2024"));
        assert!(matches!(&row[2], Cell::Text(s) if s == "Ingreso"));
        assert!(matches!(row[3], Cell::Number(n) if n == 3000.0));
    }

    #[test]
    fn test_goal_row_blank_deadline() {
        let created = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let goal = Goal::new("Fondo", 500.0, None, created).unwrap();
        let row = goal_row(&goal);
        assert!(matches!(&row[2], Cell::Text(s) if s.is_empty()));
        assert!(matches!(&row[3], Cell::Text(s) if s == "01/03/2024"));
    }

    #[test]
    fn test_instructions_carry_live_counts() {
        let lines = personal_instructions(12, 2, at(2024, 4, 17));
        assert_eq!(lines[1], "Archivo generado el: 17/04/2024 09:30");
        assert_eq!(lines[2], "Transacciones en histórico: 12");
        assert_eq!(lines[3], "Metas activas: 2");
    }

    #[test]
    fn test_instructions_end_with_date_warning() {
        let lines = personal_instructions(0, 0, at(2024, 4, 17));
        let tail = &lines[lines.len() - 3..];
        assert_eq!(tail[0], "=== IMPORTANTE FECHAS ===");
        assert_eq!(tail[1], "Excel puede cambiar formato automáticamente.");
        assert_eq!(tail[2], "Si ves fechas raras, verifica que estén en DD/MM/YYYY");
    }

    #[test]
    fn test_empty_state_still_produces_workbook() {
        let bytes = personal_workbook_bytes(&AppState::new(), PersonalExport::new(at(2024, 4, 17)))
            .unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }
}
