use models::{Ledger, ProblemRow, Transaction, TransactionKind};
use tracing::{debug, warn};

use crate::date_normalizer::normalize;
use crate::row_validator::{complete_rows, TransactionColumns};
use crate::sheet::{cell_str, cell_text, parse_amount, Sheet};

/// Result of reading one transaction sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetOutcome {
    pub transactions: Vec<Transaction>,
    /// Rows dropped because the date could not be read.
    pub problems: Vec<ProblemRow>,
    /// Rows dropped silently: blank required field or non-numeric amount.
    pub incomplete: usize,
}

/// Date-normalizes the complete rows of a schema-valid sheet, keeping their
/// original relative order.
pub fn normalize_rows(sheet: &Sheet, columns: &TransactionColumns) -> SheetOutcome {
    let rows = complete_rows(sheet, columns);
    let mut outcome = SheetOutcome {
        incomplete: sheet.rows.len() - rows.len(),
        ..SheetOutcome::default()
    };

    for row in rows {
        let date_cell = row.get(columns.date);
        let Some(date) = date_cell.and_then(normalize) else {
            outcome.problems.push(ProblemRow {
                sheet: sheet.name.clone(),
                row: row.row,
                raw_value: cell_str(date_cell).unwrap_or_default(),
            });
            continue;
        };

        let Some(amount) = parse_amount(row.get(columns.amount)) else {
            debug!(sheet = %sheet.name, row = row.row, "non-numeric amount, row dropped");
            outcome.incomplete += 1;
            continue;
        };

        let category = cell_text(row.get(columns.category)).unwrap_or_default();
        let label = cell_text(row.get(columns.kind)).unwrap_or_default();
        let kind = TransactionKind::from_label(&label).unwrap_or_else(|| {
            debug!(sheet = %sheet.name, row = row.row, label = %label, "unknown Tipo, using amount sign");
            TransactionKind::from_amount(amount)
        });

        outcome.transactions.push(Transaction {
            date,
            category,
            kind,
            amount,
        });
    }

    if !outcome.problems.is_empty() {
        warn!(
            sheet = %sheet.name,
            dropped = outcome.problems.len(),
            "rows with unreadable dates were skipped"
        );
    }

    outcome
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedLedger {
    pub ledger: Ledger,
    pub historical_count: usize,
    pub new_count: usize,
}

/// Historical rows first, then new rows, each in their original order. No
/// sorting and no deduplication.
pub fn merge(historical: Vec<Transaction>, new: Vec<Transaction>) -> MergedLedger {
    let historical_count = historical.len();
    let new_count = new.len();

    let mut ledger = historical;
    ledger.extend(new);

    MergedLedger {
        ledger,
        historical_count,
        new_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;
    use chrono::NaiveDate;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn txn(y: i32, m: u32, d: u32, category: &str, amount: f64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            category,
            TransactionKind::from_amount(amount),
            amount,
        )
    }

    fn sheet(rows: Vec<Vec<Data>>) -> Sheet {
        Sheet::new("Transacciones", &["Fecha", "Categoria", "Tipo", "Monto"], rows)
    }

    #[test]
    fn test_merge_keeps_historical_then_new_order() {
        let a = txn(2024, 3, 1, "A", -1.0);
        let b = txn(2023, 1, 1, "B", -2.0);
        let c = txn(2022, 6, 1, "C", 3.0);
        let d = txn(2025, 1, 1, "D", -4.0);

        let merged = merge(vec![a.clone(), b.clone()], vec![c.clone(), d.clone()]);
        assert_eq!(merged.ledger, vec![a, b, c, d]);
        assert_eq!(merged.historical_count, 2);
        assert_eq!(merged.new_count, 2);
    }

    #[test]
    fn test_merge_preserves_duplicates() {
        let a = txn(2024, 1, 15, "Food", -150.0);
        let merged = merge(vec![a.clone()], vec![a.clone()]);
        assert_eq!(merged.ledger, vec![a.clone(), a]);
    }

    #[test]
    fn test_normalize_rows_reports_bad_dates_with_row_numbers() {
        let sheet = sheet(vec![
            vec![s("15/01/2024"), s("Food"), s("Gasto"), Data::Float(-150.0)],
            vec![s("someday"), s("Food"), s("Gasto"), Data::Float(-10.0)],
            vec![Data::Float(100.0), s("Rent"), s("Gasto"), Data::Float(-900.0)],
            vec![s("16/01/2024"), s("Transport"), s("Gasto"), Data::Float(-80.0)],
        ]);
        let cols = TransactionColumns::resolve(&sheet).unwrap();
        let outcome = normalize_rows(&sheet, &cols);

        assert_eq!(outcome.transactions.len(), 2);
        assert_eq!(outcome.transactions[1].category, "Transport");
        assert_eq!(outcome.problems.len(), 2);
        assert_eq!(outcome.problems[0].row, 3);
        assert_eq!(outcome.problems[0].raw_value, "someday");
        assert_eq!(outcome.problems[1].row, 4);
        assert_eq!(outcome.problems[1].raw_value, "100");
        assert_eq!(outcome.incomplete, 0);
    }

    #[test]
    fn test_normalize_rows_kind_is_informational() {
        let sheet = sheet(vec![
            vec![s("15/01/2024"), s("Refund"), s("Ingreso"), Data::Float(-40.0)],
            vec![s("15/01/2024"), s("Misc"), s("transfer"), Data::Float(-5.0)],
        ]);
        let cols = TransactionColumns::resolve(&sheet).unwrap();
        let outcome = normalize_rows(&sheet, &cols);

        assert_eq!(outcome.transactions[0].kind, TransactionKind::Income);
        assert_eq!(outcome.transactions[0].amount, -40.0);
        assert_eq!(outcome.transactions[1].kind, TransactionKind::Expense);
    }

    #[test]
    fn test_normalize_rows_counts_incomplete_rows() {
        let sheet = sheet(vec![
            vec![s("15/01/2024"), s("Food"), s("Gasto"), s("lots")],
            vec![s("15/01/2024"), Data::Empty, s("Gasto"), Data::Float(-1.0)],
            vec![s("15/01/2024"), s("Food"), s("Gasto"), s("-12.5")],
        ]);
        let cols = TransactionColumns::resolve(&sheet).unwrap();
        let outcome = normalize_rows(&sheet, &cols);

        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.transactions[0].amount, -12.5);
        assert_eq!(outcome.incomplete, 2);
        assert!(outcome.problems.is_empty());
    }

    #[test]
    fn test_numeric_category_is_kept_as_text() {
        let sheet = sheet(vec![vec![s("15/01/2024"), Data::Int(42), s("Gasto"), Data::Int(-3)]]);
        let cols = TransactionColumns::resolve(&sheet).unwrap();
        let outcome = normalize_rows(&sheet, &cols);
        assert_eq!(outcome.transactions[0].category, "42");
    }
}
