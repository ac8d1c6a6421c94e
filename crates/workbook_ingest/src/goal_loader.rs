use chrono::NaiveDate;
use models::Goal;
use tracing::debug;

use crate::date_normalizer::normalize;
use crate::sheet::{cell_text, is_blank, parse_amount, Sheet};

pub const COL_GOAL_NAME: &str = "Nombre_Meta";
pub const COL_GOAL_TARGET: &str = "Monto_Objetivo";
pub const COL_GOAL_DEADLINE: &str = "Fecha_Limite";
pub const COL_GOAL_CREATED: &str = "Fecha_Creacion";

pub const GOAL_COLUMNS: [&str; 4] = [
    COL_GOAL_NAME,
    COL_GOAL_TARGET,
    COL_GOAL_DEADLINE,
    COL_GOAL_CREATED,
];

/// Parses a goals sheet. Returns `None` when the sheet has no `Nombre_Meta`
/// column at all.
///
/// Rows without a name or a usable positive target are skipped. Optional
/// dates degrade instead of failing the row: an unreadable deadline becomes
/// "no deadline", an unreadable creation date becomes `today`.
pub fn load(sheet: &Sheet, today: NaiveDate) -> Option<Vec<Goal>> {
    let c_name = sheet.column(COL_GOAL_NAME)?;
    let c_target = sheet.column(COL_GOAL_TARGET);
    let c_deadline = sheet.column(COL_GOAL_DEADLINE);
    let c_created = sheet.column(COL_GOAL_CREATED);

    let mut goals = Vec::new();

    for row in &sheet.rows {
        let Some(name) = cell_text(row.get(c_name)) else {
            continue;
        };
        let Some(target_amount) = c_target.and_then(|c| parse_amount(row.get(c))) else {
            debug!(row = row.row, goal = %name, "goal without target amount skipped");
            continue;
        };
        if target_amount <= 0.0 {
            debug!(row = row.row, goal = %name, target_amount, "goal with non-positive target skipped");
            continue;
        }

        let deadline = optional_date(row.get_opt(c_deadline));
        let created_at = optional_date(row.get_opt(c_created)).unwrap_or(today);

        goals.push(Goal {
            name,
            target_amount,
            deadline,
            created_at,
        });
    }

    Some(goals)
}

fn optional_date(cell: Option<&calamine::Data>) -> Option<NaiveDate> {
    if is_blank(cell) {
        return None;
    }
    cell.and_then(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goals_sheet(rows: Vec<Vec<Data>>) -> Sheet {
        Sheet::new("Metas", &GOAL_COLUMNS, rows)
    }

    #[test]
    fn test_unparseable_deadline_keeps_goal() {
        let today = date(2024, 5, 1);
        let sheet = goals_sheet(vec![vec![
            s("Vacaciones"),
            Data::Float(2000.0),
            s("pronto"),
            s("01/03/2024"),
        ]]);

        let goals = load(&sheet, today).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].name, "Vacaciones");
        assert_eq!(goals[0].deadline, None);
        assert_eq!(goals[0].created_at, date(2024, 3, 1));
    }

    #[test]
    fn test_missing_name_or_target_skips_row() {
        let today = date(2024, 5, 1);
        let sheet = goals_sheet(vec![
            vec![Data::Empty, Data::Float(100.0), Data::Empty, Data::Empty],
            vec![s("Carro"), Data::Empty, Data::Empty, Data::Empty],
            vec![s("Casa"), s("50000"), s("31/12/2030"), Data::Empty],
        ]);

        let goals = load(&sheet, today).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].name, "Casa");
        assert_eq!(goals[0].target_amount, 50000.0);
        assert_eq!(goals[0].deadline, Some(date(2030, 12, 31)));
    }

    #[test]
    fn test_created_at_defaults_to_today() {
        let today = date(2024, 5, 1);
        let sheet = goals_sheet(vec![
            vec![s("A"), Data::Float(10.0), Data::Empty, Data::Empty],
            vec![s("B"), Data::Float(10.0), Data::Empty, s("garbage")],
        ]);

        let goals = load(&sheet, today).unwrap();
        assert!(goals.iter().all(|g| g.created_at == today));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let today = date(2024, 5, 1);
        let sheet = Sheet::new(
            "Metas",
            &["Nombre_Meta", "Monto_Objetivo"],
            vec![vec![s("Fondo"), Data::Int(500)]],
        );

        let goals = load(&sheet, today).unwrap();
        assert_eq!(goals[0].deadline, None);
        assert_eq!(goals[0].created_at, today);
    }

    #[test]
    fn test_sheet_without_name_column() {
        let sheet = Sheet::new("Metas", &["Meta", "Monto"], vec![vec![s("x"), Data::Int(1)]]);
        assert!(load(&sheet, date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_non_positive_target_skipped() {
        let sheet = goals_sheet(vec![vec![s("Nada"), Data::Float(0.0), Data::Empty, Data::Empty]]);
        assert!(load(&sheet, date(2024, 1, 1)).unwrap().is_empty());
    }
}
