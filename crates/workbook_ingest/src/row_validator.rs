use crate::sheet::{is_blank, Sheet, SheetRow};

pub const COL_DATE: &str = "Fecha";
pub const COL_CATEGORY: &str = "Categoria";
pub const COL_KIND: &str = "Tipo";
pub const COL_AMOUNT: &str = "Monto";

pub const TRANSACTION_COLUMNS: [&str; 4] = [COL_DATE, COL_CATEGORY, COL_KIND, COL_AMOUNT];

/// True only when every required column is present. There is no partial-column
/// salvage: one missing column disqualifies the sheet.
pub fn validate_schema(headers: &[String], required_columns: &[&str]) -> bool {
    missing_columns(headers, required_columns).is_empty()
}

pub fn missing_columns<'a>(headers: &[String], required_columns: &[&'a str]) -> Vec<&'a str> {
    required_columns
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .copied()
        .collect()
}

/// Column positions of a transaction sheet that passed the schema check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionColumns {
    pub date: usize,
    pub category: usize,
    pub kind: usize,
    pub amount: usize,
}

impl TransactionColumns {
    pub fn resolve(sheet: &Sheet) -> Option<Self> {
        if !validate_schema(&sheet.headers, &TRANSACTION_COLUMNS) {
            return None;
        }
        Some(Self {
            date: sheet.column(COL_DATE)?,
            category: sheet.column(COL_CATEGORY)?,
            kind: sheet.column(COL_KIND)?,
            amount: sheet.column(COL_AMOUNT)?,
        })
    }

    fn all(&self) -> [usize; 4] {
        [self.date, self.category, self.kind, self.amount]
    }
}

/// Rows with every required field filled in. Incomplete rows are dropped
/// silently; they are not reported as problems.
///
/// Only the four transaction columns count. Extra columns a user adds (notes,
/// tags) may be blank without dropping the row.
pub fn complete_rows<'s>(sheet: &'s Sheet, columns: &TransactionColumns) -> Vec<&'s SheetRow> {
    sheet
        .rows
        .iter()
        .filter(|row| columns.all().iter().all(|&col| !is_blank(row.get(col))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_validate_schema_requires_every_column() {
        let full: Vec<String> = TRANSACTION_COLUMNS.iter().map(|c| c.to_string()).collect();
        assert!(validate_schema(&full, &TRANSACTION_COLUMNS));

        let without_amount: Vec<String> = vec!["Fecha".into(), "Categoria".into(), "Tipo".into()];
        assert!(!validate_schema(&without_amount, &TRANSACTION_COLUMNS));
        assert_eq!(missing_columns(&without_amount, &TRANSACTION_COLUMNS), vec!["Monto"]);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let sheet = Sheet::new("Historico", &["Monto", "Tipo", "Fecha", "Notas", "Categoria"], vec![]);
        let cols = TransactionColumns::resolve(&sheet).unwrap();
        assert_eq!(cols.amount, 0);
        assert_eq!(cols.date, 2);
        assert_eq!(cols.category, 4);
    }

    #[test]
    fn test_complete_rows_drops_rows_with_missing_fields() {
        let sheet = Sheet::new(
            "Transacciones",
            &["Fecha", "Categoria", "Tipo", "Monto", "Notas"],
            vec![
                vec![s("15/01/2024"), s("Food"), s("Gasto"), Data::Float(-150.0), Data::Empty],
                vec![s("16/01/2024"), Data::Empty, s("Gasto"), Data::Float(-80.0)],
                vec![s("17/01/2024"), s("Rent"), s(" "), Data::Float(-900.0)],
                vec![s("18/01/2024"), s("Salary"), s("Ingreso")],
                vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            ],
        );
        let cols = TransactionColumns::resolve(&sheet).unwrap();
        let rows = complete_rows(&sheet, &cols);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 2);
    }
}
