use rust_xlsxwriter::Workbook;
use workbook_ingest::{GOAL_COLUMNS, SHEET_GOALS, SHEET_INSTRUCTIONS, SHEET_NEW, TRANSACTION_COLUMNS};

use crate::error::Result;
use crate::sheet_writer::{write_table, write_text_sheet, Cell};

const EXAMPLES: [(&str, &str, f64); 3] = [
    ("15/01/2024", "Alimentación", -150.0),
    ("16/01/2024", "Transporte", -80.0),
    ("17/01/2024", "Entretenimiento", -200.0),
];

const INSTRUCTIONS: [&str; 16] = [
    "=== HOJA TRANSACCIONES ===",
    "1. Llena la columna Fecha con formato DD/MM/YYYY",
    "2. Categoria: Alimentación, Transporte, Entretenimiento, Salario, etc.",
    "3. Tipo: Gasto (negativo) o Ingreso (positivo)",
    "4. Monto: Usa números negativos para gastos, positivos para ingresos",
    "5. Elimina estas filas de ejemplo antes de subir tu archivo",
    "",
    "=== HOJA METAS ===",
    "6. Las metas se guardan automáticamente en esta hoja",
    "7. NO modifiques manualmente la hoja de Metas",
    "8. Usa la aplicación para agregar/eliminar metas",
    "",
    "=== IMPORTANTE ===",
    "9. Siempre descarga tu archivo actualizado después de hacer cambios",
    "10. Usa ese archivo actualizado para futuras cargas",
    "11. FORMATO DE FECHA: DD/MM/YYYY (ejemplo: 15/01/2024)",
];

/// Starter workbook for a first-time user.
pub fn build_template_workbook() -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let rows = EXAMPLES
        .iter()
        .map(|(date, category, amount)| {
            vec![
                Cell::from(*date),
                Cell::from(*category),
                Cell::from("Gasto"),
                Cell::from(*amount),
            ]
        })
        .collect();
    write_table(&mut workbook, SHEET_NEW, &TRANSACTION_COLUMNS, rows)?;
    write_table(&mut workbook, SHEET_GOALS, &GOAL_COLUMNS, Vec::new())?;

    let lines: Vec<String> = INSTRUCTIONS.iter().map(|l| l.to_string()).collect();
    write_text_sheet(&mut workbook, SHEET_INSTRUCTIONS, "INSTRUCCIONES", &lines)?;

    Ok(workbook)
}

pub fn template_workbook_bytes() -> Result<Vec<u8>> {
    Ok(build_template_workbook()?.save_to_buffer()?)
}
