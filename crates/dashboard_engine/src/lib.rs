use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use models::{AppState, Goal, Ledger, Settings, Transaction};
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    path::Path,
};

#[derive(Debug, Serialize)]
pub struct SummaryMetadata {
    pub generated_at: String,
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySpend {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyCashFlow {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net_cash_flow: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Reached,
    OnTrack,
    Overdue,
    NoDeadline,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalProgress {
    pub name: String,
    pub target_amount: f64,
    pub saved: f64,
    pub remaining: f64,
    pub progress_pct: f64,
    pub deadline: Option<NaiveDate>,
    pub days_left: Option<i64>,
    pub daily_saving_needed: Option<f64>,
    pub status: GoalStatus,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub metadata: SummaryMetadata,
    pub totals: Totals,
    pub period: Option<Period>,
    pub expenses_by_category: Vec<CategorySpend>,
    pub monthly_cash_flow: Vec<MonthlyCashFlow>,
    pub average_daily_expense: f64,
    /// Last month with expenses minus the one before it.
    pub expense_trend: Option<f64>,
    pub recent_transactions: Vec<Transaction>,
    pub goals: Vec<GoalProgress>,
    pub insights: Vec<String>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

impl Summary {
    fn finalize(mut self) -> Self {
        self.totals.income = round2(self.totals.income);
        self.totals.expenses = round2(self.totals.expenses);
        self.totals.balance = round2(self.totals.balance);
        for c in self.expenses_by_category.iter_mut() {
            c.amount = round2(c.amount);
        }
        for m in self.monthly_cash_flow.iter_mut() {
            m.income = round2(m.income);
            m.expenses = round2(m.expenses);
            m.net_cash_flow = round2(m.net_cash_flow);
        }
        self.average_daily_expense = round2(self.average_daily_expense);
        self.expense_trend = self.expense_trend.map(round2);
        for g in self.goals.iter_mut() {
            g.saved = round2(g.saved);
            g.remaining = round2(g.remaining);
            g.progress_pct = round1(g.progress_pct);
            g.daily_saving_needed = g.daily_saving_needed.map(round2);
        }
        self
    }
}

/// Income, expenses and balance. Only the sign of the amount matters; the
/// `Tipo` label is ignored.
pub fn totals(ledger: &Ledger) -> Totals {
    let income: f64 = ledger.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    let expenses: f64 = ledger
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .sum::<f64>()
        .abs();
    Totals {
        income,
        expenses,
        balance: income - expenses,
        transaction_count: ledger.len(),
    }
}

/// Absolute spend per category, largest first.
pub fn expenses_by_category(ledger: &Ledger) -> Vec<CategorySpend> {
    let mut map: HashMap<&str, f64> = HashMap::new();
    for t in ledger.iter().filter(|t| t.is_expense()) {
        *map.entry(t.category.as_str()).or_insert(0.0) += t.amount;
    }
    let mut out: Vec<CategorySpend> = map
        .into_iter()
        .map(|(category, total)| CategorySpend {
            category: category.to_string(),
            amount: total.abs(),
        })
        .collect();
    out.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}

pub fn monthly_cash_flow(ledger: &Ledger) -> Vec<MonthlyCashFlow> {
    let mut map: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for t in ledger {
        let entry = map
            .entry(t.date.format("%Y-%m").to_string())
            .or_insert((0.0, 0.0));
        if t.is_income() {
            entry.0 += t.amount;
        } else if t.is_expense() {
            entry.1 += t.amount.abs();
        }
    }
    map.into_iter()
        .map(|(month, (income, expenses))| MonthlyCashFlow {
            month,
            income,
            expenses,
            net_cash_flow: income - expenses,
        })
        .collect()
}

/// Total spend divided by the number of distinct dates in the whole ledger.
pub fn average_daily_expense(ledger: &Ledger) -> f64 {
    if !ledger.iter().any(|t| t.is_expense()) {
        return 0.0;
    }
    let days: BTreeSet<NaiveDate> = ledger.iter().map(|t| t.date).collect();
    totals(ledger).expenses / days.len() as f64
}

pub fn expense_trend(ledger: &Ledger) -> Option<f64> {
    let months: Vec<f64> = monthly_cash_flow(ledger)
        .into_iter()
        .filter(|m| m.expenses > 0.0)
        .map(|m| m.expenses)
        .collect();
    match months.as_slice() {
        [.., prev, last] => Some(last - prev),
        _ => None,
    }
}

pub fn period(ledger: &Ledger) -> Option<Period> {
    let from = ledger.iter().map(|t| t.date).min()?;
    let to = ledger.iter().map(|t| t.date).max()?;
    Some(Period { from, to })
}

/// Latest transactions first; equal dates keep ledger order.
pub fn recent_transactions(ledger: &Ledger, n: usize) -> Vec<Transaction> {
    let mut sorted: Vec<&Transaction> = ledger.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.into_iter().take(n).cloned().collect()
}

/// Progress is measured against the positive part of the ledger balance.
pub fn goal_progress(goal: &Goal, ledger: &Ledger, today: NaiveDate) -> GoalProgress {
    let balance: f64 = ledger.iter().map(|t| t.amount).sum();
    let saved = balance.max(0.0);
    let remaining = (goal.target_amount - saved).max(0.0);
    let progress_pct = (saved / goal.target_amount * 100.0).min(100.0);
    let days_left = goal.deadline.map(|d| (d - today).num_days());

    let status = if remaining <= 0.0 {
        GoalStatus::Reached
    } else {
        match days_left {
            Some(days) if days > 0 => GoalStatus::OnTrack,
            Some(_) => GoalStatus::Overdue,
            None => GoalStatus::NoDeadline,
        }
    };

    let daily_saving_needed = match (status, days_left) {
        (GoalStatus::OnTrack, Some(days)) => Some(remaining / days as f64),
        _ => None,
    };

    GoalProgress {
        name: goal.name.clone(),
        target_amount: goal.target_amount,
        saved,
        remaining,
        progress_pct,
        deadline: goal.deadline,
        days_left,
        daily_saving_needed,
        status,
    }
}

/// Formats `-1234.5` as `-$1,234.50`.
pub fn format_money(symbol: &str, value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, symbol, grouped, cents % 100)
}

/// Plain-language observations, in display order.
pub fn insights(ledger: &Ledger, goals: &[Goal], today: NaiveDate, symbol: &str) -> Vec<String> {
    let money = |v: f64| format_money(symbol, v);
    let mut out = Vec::new();

    if !ledger.is_empty() {
        let t = totals(ledger);
        out.push(format!("Total balance: {}", money(t.balance)));
        out.push(format!("Total income: {}", money(t.income)));
        out.push(format!("Total expenses: {}", money(t.expenses)));

        if let Some(top) = expenses_by_category(ledger).first() {
            out.push(format!(
                "Largest spending category: {} ({})",
                top.category,
                money(top.amount)
            ));
        }
        if ledger.iter().any(|t| t.is_expense()) {
            out.push(format!(
                "Average daily spending: {}",
                money(average_daily_expense(ledger))
            ));
        }
    }

    for goal in goals {
        if ledger.is_empty() {
            out.push(format!(
                "{}: {} to go",
                goal.name,
                money(goal.target_amount)
            ));
            continue;
        }
        let p = goal_progress(goal, ledger, today);
        let line = match p.status {
            GoalStatus::Reached => format!("Goal '{}' reached!", goal.name),
            GoalStatus::OnTrack => format!(
                "{}: {} to go, save {} per day",
                goal.name,
                money(p.remaining),
                money(p.daily_saving_needed.unwrap_or_default())
            ),
            GoalStatus::Overdue => format!(
                "{}: deadline passed, {} to go",
                goal.name,
                money(p.remaining)
            ),
            GoalStatus::NoDeadline => format!("{}: {} to go", goal.name, money(p.remaining)),
        };
        out.push(line);
    }

    out
}

pub fn generate_summary(state: &AppState, settings: &Settings, today: NaiveDate) -> Summary {
    let ledger = &state.ledger;
    Summary {
        metadata: SummaryMetadata {
            generated_at: Local::now().to_rfc3339(),
            currency_symbol: settings.currency_symbol.clone(),
        },
        totals: totals(ledger),
        period: period(ledger),
        expenses_by_category: expenses_by_category(ledger),
        monthly_cash_flow: monthly_cash_flow(ledger),
        average_daily_expense: average_daily_expense(ledger),
        expense_trend: expense_trend(ledger),
        recent_transactions: recent_transactions(ledger, settings.recent_transactions_shown),
        goals: state
            .goals
            .iter()
            .map(|g| goal_progress(g, ledger, today))
            .collect(),
        insights: insights(ledger, &state.goals, today, &settings.currency_symbol),
    }
    .finalize()
}

pub fn write_summary_json(summary: &Summary, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(out_path, json).with_context(|| format!("Writing summary: {}", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::TransactionKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(d: NaiveDate, category: &str, kind: TransactionKind, amount: f64) -> Transaction {
        Transaction::new(d, category, kind, amount)
    }

    fn sample_ledger() -> Ledger {
        vec![
            txn(date(2024, 1, 15), "Food", TransactionKind::Expense, -150.0),
            txn(date(2024, 1, 16), "Transport", TransactionKind::Expense, -80.0),
            txn(date(2024, 1, 31), "Salary", TransactionKind::Income, 3000.0),
            txn(date(2024, 2, 2), "Food", TransactionKind::Expense, -200.0),
            txn(date(2024, 2, 2), "Rent", TransactionKind::Expense, -900.0),
        ]
    }

    #[test]
    fn test_totals() {
        let t = totals(&sample_ledger());
        assert_eq!(t.income, 3000.0);
        assert_eq!(t.expenses, 1330.0);
        assert_eq!(t.balance, 1670.0);
        assert_eq!(t.transaction_count, 5);
    }

    #[test]
    fn test_sign_drives_totals_not_label() {
        let ledger = vec![txn(date(2024, 1, 1), "Refund", TransactionKind::Income, -50.0)];
        let t = totals(&ledger);
        assert_eq!(t.income, 0.0);
        assert_eq!(t.expenses, 50.0);
    }

    #[test]
    fn test_expenses_by_category_sorted() {
        let cats = expenses_by_category(&sample_ledger());
        let names: Vec<&str> = cats.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Transport"]);
        assert_eq!(cats[1].amount, 350.0);
    }

    #[test]
    fn test_monthly_cash_flow_and_trend() {
        let ledger = sample_ledger();
        let months = monthly_cash_flow(&ledger);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2024-01");
        assert_eq!(months[0].income, 3000.0);
        assert_eq!(months[0].expenses, 230.0);
        assert_eq!(months[1].expenses, 1100.0);
        assert_eq!(expense_trend(&ledger), Some(870.0));
    }

    #[test]
    fn test_trend_needs_two_months() {
        let ledger = vec![txn(date(2024, 1, 1), "Food", TransactionKind::Expense, -10.0)];
        assert_eq!(expense_trend(&ledger), None);
    }

    #[test]
    fn test_average_daily_expense_uses_all_dates() {
        // 4 distinct dates, 1330 spent
        let avg = average_daily_expense(&sample_ledger());
        assert!((avg - 332.5).abs() < 1e-9);
        assert_eq!(average_daily_expense(&Vec::new()), 0.0);
    }

    #[test]
    fn test_recent_transactions_latest_first_stable() {
        let recent = recent_transactions(&sample_ledger(), 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].category, "Food");
        assert_eq!(recent[1].category, "Rent");
        assert_eq!(recent[2].category, "Salary");
    }

    #[test]
    fn test_goal_progress_clamps_and_reaches() {
        let today = date(2024, 3, 1);
        let goal = Goal::new("Fund", 1000.0, None, today).unwrap();
        let p = goal_progress(&goal, &sample_ledger(), today);
        assert_eq!(p.progress_pct, 100.0);
        assert_eq!(p.remaining, 0.0);
        assert_eq!(p.status, GoalStatus::Reached);
    }

    #[test]
    fn test_goal_progress_daily_saving() {
        let today = date(2024, 3, 1);
        let goal = Goal::new("Car", 5000.0, Some(date(2024, 3, 11)), today).unwrap();
        let ledger = vec![txn(today, "Salary", TransactionKind::Income, 1000.0)];
        let p = goal_progress(&goal, &ledger, today);
        assert_eq!(p.status, GoalStatus::OnTrack);
        assert_eq!(p.days_left, Some(10));
        assert_eq!(p.daily_saving_needed, Some(400.0));
        assert_eq!(p.progress_pct, 20.0);
    }

    #[test]
    fn test_goal_progress_negative_balance_counts_as_zero() {
        let today = date(2024, 3, 1);
        let goal = Goal::new("Trip", 500.0, Some(date(2024, 2, 1)), today).unwrap();
        let ledger = vec![txn(today, "Food", TransactionKind::Expense, -100.0)];
        let p = goal_progress(&goal, &ledger, today);
        assert_eq!(p.saved, 0.0);
        assert_eq!(p.status, GoalStatus::Overdue);
        assert_eq!(p.daily_saving_needed, None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("$", 1234.5), "$1,234.50");
        assert_eq!(format_money("$", -900.0), "-$900.00");
        assert_eq!(format_money("€", 1234567.891), "€1,234,567.89");
        assert_eq!(format_money("$", 0.0), "$0.00");
    }

    #[test]
    fn test_insights() {
        let today = date(2024, 3, 1);
        let goals = vec![Goal::new("Car", 5000.0, None, today).unwrap()];
        let lines = insights(&sample_ledger(), &goals, today, "$");
        assert_eq!(lines[0], "Total balance: $1,670.00");
        assert_eq!(lines[3], "Largest spending category: Rent ($900.00)");
        assert_eq!(lines.last().unwrap(), "Car: $3,330.00 to go");

        let empty = insights(&Vec::new(), &goals, today, "$");
        assert_eq!(empty, vec!["Car: $5,000.00 to go".to_string()]);
    }

    #[test]
    fn test_generate_summary() {
        let today = date(2024, 3, 1);
        let state = AppState {
            ledger: sample_ledger(),
            goals: vec![Goal::new("Car", 5000.0, None, today).unwrap()],
        };
        let summary = generate_summary(&state, &Settings::default(), today);
        assert_eq!(summary.totals.balance, 1670.0);
        assert_eq!(
            summary.period,
            Some(Period {
                from: date(2024, 1, 15),
                to: date(2024, 2, 2)
            })
        );
        assert_eq!(summary.goals[0].progress_pct, 33.4);
        assert_eq!(summary.recent_transactions.len(), 5);
    }
}
